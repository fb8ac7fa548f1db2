//! Seam for the external classification model.

use async_trait::async_trait;
use docops_core::Result;

/// A chat-style model that answers a system + user prompt with a JSON object.
///
/// Implementations make a single attempt and surface every failure
/// (transport, non-success status, empty content) as an error.
#[async_trait]
pub trait ClassificationClient: Send + Sync {
    /// Returns the raw JSON text of the model's answer.
    async fn complete_json(&self, system: &str, user: &str) -> Result<String>;

    /// Provider name for logs, e.g. `groq`.
    fn provider_name(&self) -> &str;

    /// Model identifier for logs.
    fn model_name(&self) -> &str;
}
