use anyhow::{Result, bail};

use crate::config::{ConfigManager, TranslatorConfig};
use crate::translation::{
    ClientError, GeminiConnector, RetryingRequestRunner, TranslationClient, TranslationRequest,
    TranslationResult,
};
use crate::ui::{Spinner, Style};

pub struct TranslateOptions {
    pub text: String,
}

/// Translates one message through the same retry loop the relay uses.
///
/// Returns the process exit code.
pub async fn run_translate(options: TranslateOptions) -> Result<exitcode::ExitCode> {
    if options.text.trim().is_empty() {
        bail!("Error: Input is empty");
    }

    let config = ConfigManager::new()?.load_or_default();
    let client = build_client(&config)?;
    let runner = RetryingRequestRunner::new(config.retry_policy());
    let request = TranslationRequest::new(options.text, client.model());

    let spinner = Spinner::new("Translating...");
    let result = runner.run(&client, request).await;
    spinner.stop();

    match result {
        TranslationResult::Translated { text, .. } => {
            println!("{text}");
            Ok(exitcode::OK)
        }
        TranslationResult::Skip | TranslationResult::Empty => {
            println!("{}", Style::secondary("(no translation needed)"));
            Ok(exitcode::OK)
        }
        TranslationResult::Failed(err) => {
            eprintln!(
                "{} API error after {} attempts: {err}",
                Style::error("Error:"),
                config.max_retries.max(1)
            );
            Ok(exitcode::UNAVAILABLE)
        }
    }
}

fn build_client(config: &TranslatorConfig) -> Result<TranslationClient> {
    let connector = GeminiConnector::new(config.endpoint.as_str());
    let api_key = config.effective_api_key().unwrap_or_default();

    match TranslationClient::configure(&connector, &api_key, &config.model) {
        Ok(client) => Ok(client),
        Err(ClientError::EmptyKey) => bail!(
            "Error: Missing required configuration: 'api_key'\n\n\
             Please provide it via:\n  \
             - Interactive setup: chat-translator configure\n  \
             - Direct write: chat-translator set api-key <KEY>"
        ),
        Err(err) => Err(err.into()),
    }
}
