//! Error types for client setup and provider calls.

use thiserror::Error;

/// Errors raised while building a [`TranslationClient`](super::TranslationClient).
///
/// Both variants leave the client absent; neither is fatal to the host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key is configured.
    #[error("API key is empty")]
    EmptyKey,

    /// The provider rejected the key or model at construction.
    #[error("failed to initialize client: {0}")]
    InitFailed(String),
}

/// Errors raised by a single provider call. All of them are retried.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = RequestError::Api {
            status: 429,
            message: "quota exhausted".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("quota exhausted"));
    }

    #[test]
    fn test_init_failed_display_includes_cause() {
        let err = ClientError::InitFailed("model name is empty".to_string());
        assert!(err.to_string().contains("model name is empty"));
    }
}
