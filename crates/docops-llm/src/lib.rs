//! DocOps LLM — hosted model client for document classification.

pub mod config;
pub mod provider;

pub use config::{LlmConfig, LlmConfigResponse, LlmConfigUpdate, LlmProvider, ResolvedProvider};
pub use provider::LlmClassifier;
