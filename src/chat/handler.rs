//! Filters chat events and turns eligible ones into translation jobs.

use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::event::{ChatMessage, Player};
use super::sink::{Announcement, MessageSink};
use crate::config::Settings;
use crate::translation::{
    ClientHandle, RetryingRequestRunner, TranslationClient, TranslationRequest, TranslationResult,
};

/// Published once when every attempt for a message failed.
pub const FAILURE_NOTICE: &str =
    "API error after multiple retries. Check if the API key is valid and has access to the model.";

/// Published when a translation task dies or cannot be started.
pub const UNEXPECTED_NOTICE: &str = "Unexpected error.";

/// Why a chat event produced no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Disabled,
    NoPlayer,
    ClientUnavailable,
    BlankMessage,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "translation disabled",
            Self::NoPlayer => "no player",
            Self::ClientUnavailable => "client not loaded",
            Self::BlankMessage => "blank message",
        })
    }
}

/// What the handler decided to do with one event.
#[derive(Debug)]
pub enum Effect {
    Ignore(Ignored),
    Translate(TranslationJob),
}

/// One message bound to the client and retry policy current when it arrived.
#[derive(Debug)]
pub struct TranslationJob {
    sender: Player,
    request: TranslationRequest,
    client: Arc<TranslationClient>,
    runner: RetryingRequestRunner,
}

impl TranslationJob {
    pub const fn sender(&self) -> &Player {
        &self.sender
    }

    pub const fn request(&self) -> &TranslationRequest {
        &self.request
    }

    /// Runs the request through the retry loop without publishing anything.
    pub async fn run(self) -> TranslationResult {
        self.runner.run(&self.client, self.request).await
    }

    /// Runs the job and publishes its outcome.
    ///
    /// The work runs in its own task so a panic surfaces here as a
    /// `JoinError` and becomes a single notice.
    pub async fn complete(self, sink: Arc<dyn MessageSink>) {
        let sender = self.sender.clone();
        let original = self.request.original_text.clone();

        match tokio::spawn(self.run()).await {
            Ok(result) => {
                if let Some(announcement) = announce(&sender, &original, result) {
                    sink.publish(announcement);
                }
            }
            Err(err) => {
                log::error!("Translation task for {} failed: {err}", sender.name);
                sink.publish(Announcement::failure(UNEXPECTED_NOTICE));
            }
        }
    }
}

/// Maps a finished result onto the line to publish, if any.
pub fn announce(sender: &Player, original: &str, result: TranslationResult) -> Option<Announcement> {
    match result {
        TranslationResult::Translated { text, language } => {
            log::debug!(
                "Translated message from {} (language: {})",
                sender.name,
                language.as_deref().unwrap_or("unknown")
            );
            Some(Announcement::translation(&sender.name, sender.color, &text))
        }
        TranslationResult::Skip | TranslationResult::Empty => None,
        TranslationResult::Failed(err) => {
            log::error!("API error after all retries for message '{original}': {err}");
            Some(Announcement::failure(FAILURE_NOTICE))
        }
    }
}

/// Entry point for chat events.
pub struct ChatEventHandler {
    settings: Arc<Settings>,
    client: Arc<ClientHandle>,
    sink: Arc<dyn MessageSink>,
}

impl fmt::Debug for ChatEventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatEventHandler")
            .field("settings", &self.settings)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl ChatEventHandler {
    pub fn new(
        settings: Arc<Settings>,
        client: Arc<ClientHandle>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            settings,
            client,
            sink,
        }
    }

    /// Decides what to do with `event` without touching the network.
    pub fn handle(&self, event: ChatMessage) -> Effect {
        let config = self.settings.snapshot();
        if !config.enabled {
            return Effect::Ignore(Ignored::Disabled);
        }

        let Some(sender) = event.player else {
            return Effect::Ignore(Ignored::NoPlayer);
        };

        let Some(client) = self.client.current() else {
            return Effect::Ignore(Ignored::ClientUnavailable);
        };

        let text = match event.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Effect::Ignore(Ignored::BlankMessage),
        };

        let request = TranslationRequest::new(text, client.model());
        Effect::Translate(TranslationJob {
            sender,
            request,
            client,
            runner: RetryingRequestRunner::new(config.retry_policy()),
        })
    }

    /// Spawns the translation for `event` on the current runtime.
    ///
    /// Translations are not ordered: a message that needs retries may be
    /// published after one that arrived later.
    pub fn dispatch(&self, event: ChatMessage) -> Option<JoinHandle<()>> {
        let job = match self.handle(event) {
            Effect::Ignore(reason) => {
                log::trace!("Ignoring chat message: {reason}");
                return None;
            }
            Effect::Translate(job) => job,
        };

        match Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(job.complete(Arc::clone(&self.sink)))),
            Err(err) => {
                log::error!("Cannot start translation: {err}");
                self.sink.publish(Announcement::failure(UNEXPECTED_NOTICE));
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chat::RecordingSink;
    use crate::config::TranslatorConfig;
    use crate::translation::stub::{StubConnector, StubProvider, StubReply};

    struct Fixture {
        handler: ChatEventHandler,
        settings: Arc<Settings>,
        client: Arc<ClientHandle>,
        sink: Arc<RecordingSink>,
        provider: StubProvider,
    }

    fn fixture(provider: StubProvider) -> Fixture {
        let settings = Arc::new(Settings::new(TranslatorConfig {
            api_key: "key".to_string(),
            retry_delay_secs: 0.5,
            ..Default::default()
        }));
        let client = Arc::new(ClientHandle::new());
        client
            .reload(&StubConnector::new(provider.clone()), "key", "gemini-test")
            .unwrap();
        let sink = Arc::new(RecordingSink::new());
        let handler = ChatEventHandler::new(
            Arc::clone(&settings),
            Arc::clone(&client),
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        );
        Fixture {
            handler,
            settings,
            client,
            sink,
            provider,
        }
    }

    fn from_anuke(text: &str) -> ChatMessage {
        ChatMessage::new(Player::new("1", "Anuke"), text)
    }

    fn ignored(effect: Effect) -> Option<Ignored> {
        match effect {
            Effect::Ignore(reason) => Some(reason),
            Effect::Translate(_) => None,
        }
    }

    #[test]
    fn test_filters_apply_in_order() {
        let f = fixture(StubProvider::constant(StubReply::text("x")));

        assert_eq!(
            ignored(f.handler.handle(ChatMessage::anonymous("Bonjour"))),
            Some(Ignored::NoPlayer)
        );
        assert_eq!(ignored(f.handler.handle(from_anuke("   "))), Some(Ignored::BlankMessage));
        assert_eq!(
            ignored(f.handler.handle(ChatMessage {
                player: Some(Player::new("1", "Anuke")),
                text: None,
            })),
            Some(Ignored::BlankMessage)
        );

        f.client.clear();
        assert_eq!(
            ignored(f.handler.handle(from_anuke("Bonjour"))),
            Some(Ignored::ClientUnavailable)
        );
        // Sender check precedes the client check, text check follows it.
        assert_eq!(
            ignored(f.handler.handle(ChatMessage::anonymous("Bonjour"))),
            Some(Ignored::NoPlayer)
        );
        assert_eq!(
            ignored(f.handler.handle(from_anuke("   "))),
            Some(Ignored::ClientUnavailable)
        );

        // Disabled wins over every other filter.
        f.settings.set(crate::config::SettingKey::Enabled, "false").unwrap();
        assert_eq!(
            ignored(f.handler.handle(ChatMessage::default())),
            Some(Ignored::Disabled)
        );
    }

    #[test]
    fn test_job_captures_model_and_policy() {
        let f = fixture(StubProvider::constant(StubReply::text("x")));

        let Effect::Translate(job) = f.handler.handle(from_anuke("Bonjour")) else {
            panic!("expected a job");
        };

        assert_eq!(job.sender().name, "Anuke");
        assert_eq!(job.request().original_text, "Bonjour");
        assert_eq!(job.request().model, "gemini-test");
        assert_eq!(job.request().attempt, 1);
        assert_eq!(job.runner.policy().delay.as_millis(), 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_publishes_translation() {
        let f = fixture(StubProvider::constant(StubReply::text("Hello world [fr]")));

        f.handler
            .dispatch(from_anuke("Bonjour le monde"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(f.sink.lines(), vec!["Anuke: Hello world [fr]"]);
        assert_eq!(f.provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_ignored_event_spawns_nothing() {
        let f = fixture(StubProvider::constant(StubReply::text("x")));

        assert!(f.handler.dispatch(ChatMessage::anonymous("Bonjour")).is_none());
        assert_eq!(f.provider.calls(), 0);
        assert!(f.sink.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_publishes_single_notice() {
        let f = fixture(StubProvider::failing());

        f.handler
            .dispatch(from_anuke("Bonjour"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(f.sink.announcements(), vec![Announcement::failure(FAILURE_NOTICE)]);
        assert_eq!(f.provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_becomes_unexpected_notice() {
        let f = fixture(StubProvider::constant(StubReply::Panic));

        f.handler
            .dispatch(from_anuke("Bonjour"))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            f.sink.announcements(),
            vec![Announcement::failure(UNEXPECTED_NOTICE)]
        );
    }

    #[test]
    fn test_dispatch_without_runtime_reports_once() {
        let f = fixture(StubProvider::constant(StubReply::text("x")));

        assert!(f.handler.dispatch(from_anuke("Bonjour")).is_none());
        assert_eq!(f.sink.failures(), 1);
        assert_eq!(f.provider.calls(), 0);
    }

    #[test]
    fn test_announce_skip_and_empty_are_silent() {
        let sender = Player::new("1", "Anuke");
        assert!(announce(&sender, "Hello", TranslationResult::Skip).is_none());
        assert!(announce(&sender, "Hello", TranslationResult::Empty).is_none());
    }
}
