//! Bounded retry-with-delay around a single translation.

use std::time::Duration;

use super::client::{TranslationClient, TranslationRequest};
use super::prompt::SKIP_TOKEN;
use super::response::{TranslationResult, interpret};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How many attempts a translation gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    const fn attempts(&self) -> u32 {
        if self.max_retries == 0 {
            1
        } else {
            self.max_retries
        }
    }
}

/// Drives one request through `Attempting(n)` until it succeeds or the
/// policy is exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryingRequestRunner {
    policy: RetryPolicy,
}

impl RetryingRequestRunner {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs the request from attempt 1.
    ///
    /// Intermediate failures are only logged; a terminal failure comes back
    /// once as [`TranslationResult::Failed`]. The delay between attempts is a
    /// timer await, so only this request's task waits.
    pub async fn run(
        &self,
        client: &TranslationClient,
        mut request: TranslationRequest,
    ) -> TranslationResult {
        let attempts = self.policy.attempts();
        request.attempt = 1;

        loop {
            match client.translate(&request).await {
                Ok(raw) => return interpret(raw.as_deref(), SKIP_TOKEN),
                Err(err) if request.attempt < attempts => {
                    log::warn!(
                        "API call failed on attempt {}/{attempts}: {err}. Retrying in {:.1}s...",
                        request.attempt,
                        self.policy.delay.as_secs_f64()
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    request.attempt += 1;
                }
                Err(err) => return TranslationResult::Failed(err),
            }
        }
    }
}
