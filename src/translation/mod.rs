mod client;
mod error;
mod prompt;
mod provider;
mod response;
mod retry;
/// Scripted providers for tests. Not part of the supported API.
#[doc(hidden)]
pub mod stub;

pub use client::{ClientHandle, FIXED_TEMPERATURE, TranslationClient, TranslationRequest};
pub use error::{ClientError, RequestError};
pub use prompt::{SKIP_TOKEN, SYSTEM_INSTRUCTION_TEMPLATE, build_system_instruction, system_instruction};
pub use provider::{
    Connector, DEFAULT_ENDPOINT, GeminiConnector, GeminiProvider, GenerationConfig, Provider,
};
pub use response::{TranslationResult, interpret};
pub use retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, RetryPolicy, RetryingRequestRunner};
