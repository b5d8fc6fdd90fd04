//! LLM provider layer for Tallybot.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait that all providers implement
//! - [`registry`]: static specs for the supported providers + matching logic
//! - [`http_provider::HttpProvider`]: generic OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`]: convenience builder from model name + config

pub mod http_provider;
pub mod registry;
pub mod traits;

pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig, ProviderError};
