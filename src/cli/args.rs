use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chat-translator")]
#[command(about = "Translate multiplayer chat messages with Gemini")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// Read `name: message` lines from stdin and print translations (default)
    #[default]
    Run,
    /// Translate a single message and print the result
    Translate {
        /// Message text to translate
        text: String,
    },
    /// Configure chat-translator settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Change one setting without prompting
    Set {
        /// Setting name (enabled, api-key, api-key-env, model, endpoint, max-retries, retry-delay)
        key: String,
        /// New value
        value: String,
    },
}
