use std::sync::{Arc, PoisonError, RwLock};

use super::error::{ClientError, RequestError};
use super::prompt::system_instruction;
use super::provider::{Connector, GenerationConfig, Provider};

/// Sampling temperature sent with every request.
pub const FIXED_TEMPERATURE: f32 = 0.4;

/// One chat message on its way to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub original_text: String,
    pub model: String,
    /// 1-based attempt counter, bumped by the retry runner.
    pub attempt: u32,
}

impl TranslationRequest {
    pub fn new(original_text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            model: model.into(),
            attempt: 1,
        }
    }
}

/// A ready connection to the model provider plus the fixed request template.
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    model: String,
    generation: GenerationConfig,
}

impl std::fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationClient")
            .field("model", &self.model)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl TranslationClient {
    /// Builds a client for `api_key` and `model`.
    pub fn configure(
        connector: &dyn Connector,
        api_key: &str,
        model: &str,
    ) -> Result<Self, ClientError> {
        if api_key.trim().is_empty() {
            return Err(ClientError::EmptyKey);
        }

        let provider = connector.connect(api_key.trim(), model)?;

        Ok(Self {
            provider,
            model: model.to_string(),
            generation: GenerationConfig {
                system_instruction: system_instruction(),
                temperature: FIXED_TEMPERATURE,
            },
        })
    }

    /// The model this client was configured for.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub const fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Issues exactly one provider call. `Ok(None)` means the reply had no text.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<Option<String>, RequestError> {
        self.provider
            .generate_content(&request.model, &request.original_text, &self.generation)
            .await
    }
}

/// Slot holding the current client, swapped wholesale on reconfiguration.
///
/// Readers take an `Arc` snapshot, so requests already in flight finish
/// against the client they started with. The lock is only held to clone or
/// replace the `Arc`.
#[derive(Debug, Default)]
pub struct ClientHandle {
    current: RwLock<Option<Arc<TranslationClient>>>,
}

impl ClientHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<TranslationClient>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn store(&self, client: Option<Arc<TranslationClient>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = client;
    }

    /// Rebuilds the client, or clears the slot when that fails.
    pub fn reload(
        &self,
        connector: &dyn Connector,
        api_key: &str,
        model: &str,
    ) -> Result<(), ClientError> {
        match TranslationClient::configure(connector, api_key, model) {
            Ok(client) => {
                self.store(Some(Arc::new(client)));
                log::info!("Client loaded successfully (model: {model})");
                Ok(())
            }
            Err(ClientError::EmptyKey) => {
                self.store(None);
                log::warn!("API key is empty. Translation disabled until configured.");
                Err(ClientError::EmptyKey)
            }
            Err(err) => {
                self.store(None);
                log::error!(
                    "Failed to initialize client. Check if the API key is valid and has access to model '{model}': {err}"
                );
                Err(err)
            }
        }
    }

    pub fn clear(&self) {
        self.store(None);
    }
}
