//! Subcommand implementations.

/// Configure command handler.
pub mod configure;

/// Stdin relay that plays the game host.
pub mod run;

/// Non-interactive settings writes.
pub mod set;

/// One-shot translation command handler.
pub mod translate;
