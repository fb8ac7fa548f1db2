//! Shared application state.

use std::sync::Arc;

use docops_analyze::Analyzer;
use docops_core::DocOpsConfig;
use docops_llm::{LlmClassifier, LlmConfig};
use docops_store::SqliteStore;
use parking_lot::RwLock;
use tracing::{info, warn};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DocOpsConfig,
    pub store: SqliteStore,
    pub llm_config: RwLock<LlmConfig>,
    analyzer: RwLock<Analyzer>,
}

impl AppState {
    pub fn new(config: DocOpsConfig, store: SqliteStore) -> Self {
        let llm_config = LlmConfig::load(&config.data_paths.llm_config_file);
        let analyzer = build_analyzer(&llm_config, config.mock_ai);
        Self {
            config,
            store,
            llm_config: RwLock::new(llm_config),
            analyzer: RwLock::new(analyzer),
        }
    }

    /// State with an injected analyzer. The LLM config starts empty.
    pub fn with_analyzer(config: DocOpsConfig, store: SqliteStore, analyzer: Analyzer) -> Self {
        let llm_config = LlmConfig {
            config_path: config.data_paths.llm_config_file.clone(),
            ..Default::default()
        };
        Self {
            config,
            store,
            llm_config: RwLock::new(llm_config),
            analyzer: RwLock::new(analyzer),
        }
    }

    /// Snapshot of the current analyzer; cheap to clone and safe to hold across awaits.
    pub fn analyzer(&self) -> Analyzer {
        self.analyzer.read().clone()
    }

    /// Rebuild the analyzer after the LLM config changed.
    pub fn reload_analyzer(&self) {
        let analyzer = build_analyzer(&self.llm_config.read(), self.config.mock_ai);
        *self.analyzer.write() = analyzer;
    }
}

/// Model-backed analyzer when a provider key is configured, heuristic otherwise.
fn build_analyzer(llm_config: &LlmConfig, force_mock: bool) -> Analyzer {
    match LlmClassifier::from_config(llm_config) {
        Ok(Some(classifier)) => {
            info!(
                provider = %classifier.provider(),
                force_mock,
                "LLM classification enabled"
            );
            Analyzer::new(Some(Arc::new(classifier)), force_mock)
        }
        Ok(None) => {
            info!("No LLM provider configured, using heuristic analysis");
            Analyzer::new(None, force_mock)
        }
        Err(e) => {
            warn!("Failed to build LLM client, using heuristic analysis: {}", e);
            Analyzer::new(None, force_mock)
        }
    }
}
