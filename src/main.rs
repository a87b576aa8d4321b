use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use chat_translator::cli::commands::{configure, run, set, translate};
use chat_translator::cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Args::parse();

    match args.command.unwrap_or_default() {
        Command::Run => {
            run::run_relay().await?;
        }
        Command::Translate { text } => {
            let code = translate::run_translate(translate::TranslateOptions { text }).await?;
            if code != exitcode::OK {
                std::process::exit(code);
            }
        }
        Command::Configure { show } => {
            configure::run_configure(show)?;
        }
        Command::Set { key, value } => {
            set::run_set(&key, &value)?;
        }
    }

    Ok(())
}
