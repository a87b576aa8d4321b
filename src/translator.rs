//! Wires settings, the client slot, the handler and a sink together.

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::chat::{Announcement, ChatEventHandler, ChatMessage, MessageSink};
use crate::config::{Settings, TranslatorConfig};
use crate::translation::{ClientError, ClientHandle, Connector, GeminiConnector};

/// Shown when a client cannot be built from the current settings.
pub const INIT_FAILURE_NOTICE: &str = "Failed to initialize client. Check API key/settings.";

/// Shown to a joining player while translation is on but no key is set.
pub const MISSING_KEY_WARNING: &str =
    "Chat translator: no API key configured. Set one with `chat-translator configure`.";

type ConnectorSource = dyn Fn(&TranslatorConfig) -> Arc<dyn Connector> + Send + Sync;

/// The add-on as the host sees it: feed it chat events and join events.
pub struct ChatTranslator {
    settings: Arc<Settings>,
    client: Arc<ClientHandle>,
    handler: ChatEventHandler,
    sink: Arc<dyn MessageSink>,
}

impl fmt::Debug for ChatTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatTranslator")
            .field("settings", &self.settings)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl ChatTranslator {
    /// Builds a translator that always connects through `connector`.
    pub fn new(
        settings: Arc<Settings>,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self::with_source(
            settings,
            Arc::new(move |_: &TranslatorConfig| Arc::clone(&connector)),
            sink,
        )
    }

    /// Builds a translator talking to Gemini at the configured endpoint.
    pub fn gemini(settings: Arc<Settings>, sink: Arc<dyn MessageSink>) -> Self {
        Self::with_source(
            settings,
            Arc::new(|config: &TranslatorConfig| {
                Arc::new(GeminiConnector::new(config.endpoint.as_str())) as Arc<dyn Connector>
            }),
            sink,
        )
    }

    fn with_source(
        settings: Arc<Settings>,
        source: Arc<ConnectorSource>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        let client = Arc::new(ClientHandle::new());
        load_client(&client, source.as_ref(), &settings.snapshot(), sink.as_ref());

        {
            let client = Arc::clone(&client);
            let sink = Arc::clone(&sink);
            settings.on_change(move |key, config| {
                if key.affects_client() {
                    log::info!("Setting '{key}' changed; reloading client");
                    load_client(&client, source.as_ref(), config, sink.as_ref());
                }
            });
        }

        let handler =
            ChatEventHandler::new(Arc::clone(&settings), Arc::clone(&client), Arc::clone(&sink));

        Self {
            settings,
            client,
            handler,
            sink,
        }
    }

    /// Handles one chat event. Returns the spawned translation, if any.
    pub fn on_chat(&self, event: ChatMessage) -> Option<JoinHandle<()>> {
        self.handler.dispatch(event)
    }

    /// Reminds the local player to set a key while translation is on without one.
    pub fn on_player_join(&self) {
        let config = self.settings.snapshot();
        if config.enabled && !config.has_api_key() {
            self.sink.publish(Announcement::warning(MISSING_KEY_WARNING));
        }
    }

    pub const fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub const fn client(&self) -> &Arc<ClientHandle> {
        &self.client
    }

    pub const fn handler(&self) -> &ChatEventHandler {
        &self.handler
    }
}

fn load_client(
    client: &ClientHandle,
    source: &ConnectorSource,
    config: &TranslatorConfig,
    sink: &dyn MessageSink,
) {
    let api_key = config.effective_api_key().unwrap_or_default();
    let connector = source(config);

    match client.reload(connector.as_ref(), &api_key, &config.model) {
        Ok(()) | Err(ClientError::EmptyKey) => {}
        Err(ClientError::InitFailed(_)) => {
            sink.publish(Announcement::failure(INIT_FAILURE_NOTICE));
        }
    }
}
