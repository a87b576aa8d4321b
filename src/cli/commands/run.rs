//! Plays the game host on a terminal: chat lines come from stdin and
//! announcements go to stdout.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinSet};

use crate::chat::{Announcement, ChatMessage, MessageSink, Player};
use crate::config::{ConfigManager, Settings};
use crate::translator::ChatTranslator;

/// Prints announcements, coloring player names unless `NO_COLOR` is set.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub const fn plain() -> Self {
        Self { color: false }
    }

    pub fn render(&self, announcement: &Announcement) -> String {
        if !self.color {
            return announcement.to_string();
        }
        match announcement {
            Announcement::Translation {
                sender,
                color,
                text,
            } => {
                let name = color.map_or_else(
                    || sender.bold().to_string(),
                    |c| sender.truecolor(c.r, c.g, c.b).bold().to_string(),
                );
                format!("{} {name}: {text}", "tr".dimmed())
            }
            Announcement::Failure(_) => announcement.to_string().red().to_string(),
            Announcement::Warning(text) => text.yellow().to_string(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for ConsoleSink {
    fn publish(&self, announcement: Announcement) {
        let line = self.render(&announcement);
        match announcement {
            Announcement::Translation { .. } => println!("{line}"),
            Announcement::Failure(_) | Announcement::Warning(_) => eprintln!("{line}"),
        }
    }
}

/// Parses `name: message`, `name#rrggbb: message` or a bare message.
///
/// Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some((head, text)) = line.split_once(": ") else {
        return Some(ChatMessage::anonymous(line));
    };

    let head = head.trim();
    let player = match head.rsplit_once('#') {
        Some((name, color)) if !name.is_empty() => match color.parse() {
            Ok(color) => Player::new(name, name).with_color(color),
            Err(_) => Player::new(head, head),
        },
        _ => Player::new(head, head),
    };

    Some(ChatMessage::new(player, text))
}

pub async fn run_relay() -> Result<()> {
    let settings = Arc::new(Settings::persistent(ConfigManager::new()?));
    let translator = ChatTranslator::gemini(settings, Arc::new(ConsoleSink::new()));

    translator.on_player_join();

    relay(BufReader::new(tokio::io::stdin()), &translator).await
}

/// Feeds every line of `reader` to `translator` until EOF.
///
/// Lines that are not valid UTF-8 are skipped. Translations still in flight
/// are awaited before returning, also when reading fails.
pub async fn relay<R>(mut reader: R, translator: &ChatTranslator) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut tasks = JoinSet::new();
    let mut buf = Vec::new();

    let read = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(err) => break Err(err),
        }

        match std::str::from_utf8(&buf) {
            Ok(line) => {
                if let Some(event) = parse_line(line)
                    && let Some(task) = translator.on_chat(event)
                {
                    tasks.spawn(task);
                }
            }
            Err(err) => log::warn!("Skipping chat line that is not valid UTF-8: {err}"),
        }

        while let Some(outcome) = tasks.try_join_next() {
            log_outcome(outcome);
        }
    };

    while let Some(outcome) = tasks.join_next().await {
        log_outcome(outcome);
    }

    read.context("Failed to read stdin")
}

fn log_outcome(outcome: Result<Result<(), JoinError>, JoinError>) {
    if let Err(err) = outcome.and_then(|task| task) {
        log::error!("Translation task ended abnormally: {err}");
    }
}
