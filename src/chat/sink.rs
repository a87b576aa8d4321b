//! Outbound chat lines and the sinks that display them.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::event::Color;

/// A structured chat line, before any host styling is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// A translated message attributed to its sender.
    Translation {
        sender: String,
        color: Option<Color>,
        text: String,
    },
    /// A terse failure notice. Never carries message text or credentials.
    Failure(String),
    /// A configuration hint for the local user.
    Warning(String),
}

impl Announcement {
    /// Builds a translation line, collapsing line breaks so it stays on one line.
    pub fn translation(sender: impl Into<String>, color: Option<Color>, text: &str) -> Self {
        Self::Translation {
            sender: single_line(&sender.into()),
            color,
            text: single_line(text),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::Failure(text.into())
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Warning(text.into())
    }
}

fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation { sender, text, .. } => write!(f, "{sender}: {text}"),
            Self::Failure(text) => write!(f, "Chat translator: {text}"),
            Self::Warning(text) => f.write_str(text),
        }
    }
}

/// Where announcements are displayed. Publishing is fire-and-forget.
pub trait MessageSink: Send + Sync {
    fn publish(&self, announcement: Announcement);
}

/// Renders announcements with the game's inline markup.
///
/// `[#rrggbb]` and named tags such as `[white]` set the color, `[]` pops it
/// and `[[` is a literal bracket.
pub fn render_markup(announcement: &Announcement) -> String {
    match announcement {
        Announcement::Translation {
            sender,
            color,
            text,
        } => {
            let name = color.map_or_else(
                || sender.clone(),
                |color| format!("[#{}]{sender}[]", color.hex()),
            );
            format!("[#b5b5b5]tr - [white][[{name}[white]]: {text}")
        }
        Announcement::Failure(_) => format!("[scarlet]{announcement}"),
        Announcement::Warning(text) => format!("[yellow]{text}"),
    }
}

/// Hands rendered markup lines to a host `send_message` callback.
pub struct MarkupSink<F> {
    send_message: F,
}

impl<F> MarkupSink<F>
where
    F: Fn(String) + Send + Sync,
{
    pub const fn new(send_message: F) -> Self {
        Self { send_message }
    }
}

impl<F> MessageSink for MarkupSink<F>
where
    F: Fn(String) + Send + Sync,
{
    fn publish(&self, announcement: Announcement) {
        (self.send_message)(render_markup(&announcement));
    }
}

/// Keeps every announcement in memory, in publish order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    announcements: Mutex<Vec<Announcement>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Plain-text form of every announcement.
    pub fn lines(&self) -> Vec<String> {
        self.announcements()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.announcements()
            .iter()
            .filter(|a| matches!(a, Announcement::Failure(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.announcements().is_empty()
    }
}

impl MessageSink for RecordingSink {
    fn publish(&self, announcement: Announcement) {
        self.announcements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(announcement);
    }
}
