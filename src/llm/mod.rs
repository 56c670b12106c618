//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for interacting with the LLM that
//! turns the assembled prompt into an answer. Chain execution itself belongs to
//! the provider; this crate only builds messages and forwards them.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMLoader`] - Resolves provider/model names into clients
//! - [`ConfigBasedLLMLoader`] - Loader backed by `docs-summarizer.toml`
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints

/// Core LLM client trait, provider enum and loader trait.
pub mod client;
/// Loader resolving names through the TOML configuration.
pub mod provider_registry;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{GenerationParams, LLMClient, LLMLoader, LLMResponse, Provider, TokenUsage};
pub use provider_registry::ConfigBasedLLMLoader;
