//! Analysis orchestrator: picks the heuristic or the model path.

use std::sync::Arc;

use docops_core::{Error, Result};
use tracing::{debug, info, warn};

use crate::client::ClassificationClient;
use crate::mock::mock_analysis;
use crate::normalize::normalize;
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::signals::generate_decision_signals;
use crate::types::{AnalysisResult, DocType, PartialAnalysis};

/// Per-request analysis options.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Use the heuristic path even when a model client is configured.
    pub mock_mode: bool,
    /// Caller's guess at the document type.
    pub doc_type_hint: Option<DocType>,
}

/// Stateless document analyzer.
///
/// Holds the optional model client and the process-wide mock switch. Each
/// call is independent, so one `Analyzer` is shared across requests.
#[derive(Clone, Default)]
pub struct Analyzer {
    client: Option<Arc<dyn ClassificationClient>>,
    force_mock: bool,
}

impl Analyzer {
    pub fn new(client: Option<Arc<dyn ClassificationClient>>, force_mock: bool) -> Self {
        Self { client, force_mock }
    }

    /// Analyzer that only ever uses the heuristic path.
    pub fn heuristic() -> Self {
        Self::default()
    }

    /// True when requests without `mock_mode` would reach the model.
    pub fn uses_model(&self) -> bool {
        !self.force_mock && self.client.is_some()
    }

    /// Analyze `text`.
    ///
    /// The heuristic path never fails. Model failures (transport, empty
    /// response, non-JSON content) are returned as errors, never replaced by
    /// a heuristic result.
    pub async fn analyze(&self, text: &str, options: AnalyzeOptions) -> Result<AnalysisResult> {
        let client = match &self.client {
            Some(client) if !options.mock_mode && !self.force_mock => client,
            _ => {
                info!(chars = text.len(), "Using heuristic analysis");
                return Ok(mock_analysis(text, options.doc_type_hint));
            }
        };

        info!(
            provider = client.provider_name(),
            model = client.model_name(),
            chars = text.len(),
            "Calling model for document analysis"
        );

        let content = client
            .complete_json(SYSTEM_PROMPT, &user_prompt(text, options.doc_type_hint))
            .await?;
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Llm(format!(
                "Empty response from {}",
                client.provider_name()
            )));
        }

        let partial: PartialAnalysis = serde_json::from_str(content).map_err(|e| {
            Error::Llm(format!(
                "Invalid JSON from {}: {e}",
                client.provider_name()
            ))
        })?;

        let mut result = normalize(partial);
        if result.decision_signals.is_empty() {
            debug!("Model returned no decision signals; deriving them from the text");
            result.decision_signals = generate_decision_signals(
                text,
                result.doc_type,
                result.owner_team,
                result.priority,
                &result.entities,
            );
        }

        let entity_count = result.entities.total();
        info!(
            doc_type = %result.doc_type,
            entities = entity_count,
            risks = result.risk_flags.len(),
            confidence = result.confidence,
            "Model analysis complete"
        );
        if entity_count == 0 {
            warn!("Model analysis returned zero entities");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OwnerTeam, Priority};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a canned response and records the prompts it received.
    struct FakeClient {
        response: Result<String>,
        calls: AtomicUsize,
        last_user: Mutex<String>,
    }

    impl FakeClient {
        fn new(response: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                last_user: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl ClassificationClient for FakeClient {
        async fn complete_json(&self, _system: &str, user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user.lock().unwrap() = user.to_string();
            match &self.response {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(Error::Llm(e.to_string())),
            }
        }

        fn provider_name(&self) -> &str {
            "fake"
        }

        fn model_name(&self) -> &str {
            "fake-1"
        }
    }

    #[tokio::test]
    async fn test_no_client_uses_heuristics() {
        let analyzer = Analyzer::heuristic();
        assert!(!analyzer.uses_model());
        let result = analyzer
            .analyze("INVOICE amount due $10.00", AnalyzeOptions::default())
            .await
            .unwrap();
        assert_eq!(result.doc_type, DocType::Invoice);
    }

    #[tokio::test]
    async fn test_mock_mode_skips_client() {
        let fake = FakeClient::new(Ok("{}".into()));
        let analyzer = Analyzer::new(Some(fake.clone()), false);
        let options = AnalyzeOptions {
            mock_mode: true,
            ..Default::default()
        };
        analyzer.analyze("hello there", options).await.unwrap();
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);

        let forced = Analyzer::new(Some(fake.clone()), true);
        assert!(!forced.uses_model());
        forced
            .analyze("hello there", AnalyzeOptions::default())
            .await
            .unwrap();
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_output_normalized() {
        let fake = FakeClient::new(Ok(r#"{
            "docType": "contract",
            "ownerTeam": "Legal",
            "priority": "HIGH",
            "summary": "Lease between A and B",
            "entities": {"people": ["Ana"]},
            "leaseFields": {"effectiveFrom": "15-Nov-2025", "paymentPeriod": "quarterly"}
        }"#
        .into()));
        let analyzer = Analyzer::new(Some(fake.clone()), false);
        let options = AnalyzeOptions {
            mock_mode: false,
            doc_type_hint: Some(DocType::Contract),
        };
        let result = analyzer.analyze("some lease text", options).await.unwrap();

        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert!(fake.last_user.lock().unwrap().contains("some lease text"));
        assert_eq!(result.doc_type, DocType::Contract);
        assert_eq!(result.owner_team, OwnerTeam::Legal);
        assert_eq!(result.priority, Priority::High);
        assert_eq!(result.entities.people, vec!["Ana"]);
        assert!(result.entities.emails.is_empty());
        assert!((3..=4).contains(&result.decision_signals.len()));

        let lease = result.lease_fields.unwrap();
        assert_eq!(lease.end_date.as_deref(), Some("15-Feb-2026"));
        assert_eq!(lease.lease_term.as_deref(), Some("3 months"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let fake = FakeClient::new(Err(Error::Llm("timeout".into())));
        let analyzer = Analyzer::new(Some(fake), false);
        let err = analyzer
            .analyze("text", AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn test_bad_json_and_empty_content_fail() {
        for body in ["not json", "   "] {
            let analyzer = Analyzer::new(Some(FakeClient::new(Ok(body.into()))), false);
            let err = analyzer
                .analyze("text", AnalyzeOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Llm(_)), "{body:?}");
        }
    }
}
