//! Ambient utilities: configuration, logging, identifiers and token accounting.

/// Logging configuration and subscriber setup.
pub mod logging;
/// Conversation identifiers.
pub mod suid;
/// Token counting and budget enforcement.
pub mod token_handler;
/// TOML configuration and the reloadable snapshot manager.
pub mod toml_config;
