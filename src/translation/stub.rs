//! Scripted provider for tests and offline demos.
//!
//! A [`StubProvider`] answers each call from a closure that receives the
//! user text and the 1-based number of times that text has been sent, so a
//! script can fail the first attempts of one message while answering another
//! immediately. Clones share their call counters.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::error::{ClientError, RequestError};
use super::provider::{Connector, GenerationConfig, Provider};

/// What the stub does for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubReply {
    Text(String),
    /// A successful reply without any text.
    Null,
    /// A 503 from the provider.
    Fail(String),
    /// Panics inside the provider call.
    Panic,
}

impl StubReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

type Responder = dyn Fn(&str, u32) -> StubReply + Send + Sync;

#[derive(Clone)]
pub struct StubProvider {
    responder: Arc<Responder>,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
    per_text: Arc<Mutex<HashMap<String, u32>>>,
    last_model: Arc<Mutex<Option<String>>>,
    last_config: Arc<Mutex<Option<GenerationConfig>>>,
}

impl std::fmt::Debug for StubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubProvider")
            .field("calls", &self.calls())
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl StubProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, u32) -> StubReply + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            latency: None,
            calls: Arc::new(AtomicUsize::new(0)),
            per_text: Arc::new(Mutex::new(HashMap::new())),
            last_model: Arc::new(Mutex::new(None)),
            last_config: Arc::new(Mutex::new(None)),
        }
    }

    /// Always answers with `reply`.
    pub fn constant(reply: StubReply) -> Self {
        Self::new(move |_, _| reply.clone())
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self::constant(StubReply::fail("service unavailable"))
    }

    /// Suspends every call for `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total number of calls across all texts.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls made for one user text.
    pub fn calls_for(&self, text: &str) -> u32 {
        lock(&self.per_text).get(text).copied().unwrap_or(0)
    }

    pub fn last_model(&self) -> Option<String> {
        lock(&self.last_model).clone()
    }

    pub fn last_config(&self) -> Option<GenerationConfig> {
        lock(&self.last_config).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Provider for StubProvider {
    async fn generate_content(
        &self,
        model: &str,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<Option<String>, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut per_text = lock(&self.per_text);
            let count = per_text.entry(user_text.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        *lock(&self.last_model) = Some(model.to_string());
        *lock(&self.last_config) = Some(config.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match (self.responder)(user_text, call) {
            StubReply::Text(text) => Ok(Some(text)),
            StubReply::Null => Ok(None),
            StubReply::Fail(message) => Err(RequestError::Api {
                status: 503,
                message,
            }),
            StubReply::Panic => panic!("stub provider panicked on call {call}"),
        }
    }
}

/// Hands out a shared [`StubProvider`], optionally refusing to connect.
#[derive(Debug, Clone)]
pub struct StubConnector {
    provider: StubProvider,
    rejection: Option<String>,
    connects: Arc<AtomicUsize>,
}

impl StubConnector {
    pub fn new(provider: StubProvider) -> Self {
        Self {
            provider,
            rejection: None,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every `connect` fail with `InitFailed(reason)`.
    #[must_use]
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }

    /// Number of successful connections made.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub const fn provider(&self) -> &StubProvider {
        &self.provider
    }
}

impl Connector for StubConnector {
    fn connect(&self, _api_key: &str, model: &str) -> Result<Arc<dyn Provider>, ClientError> {
        if let Some(reason) = &self.rejection {
            return Err(ClientError::InitFailed(reason.clone()));
        }
        if model.trim().is_empty() {
            return Err(ClientError::InitFailed("model name is empty".to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.provider.clone()))
    }
}
