//! DocOps Analyze — document classification and structured extraction.
//!
//! Turns plain text into an [`AnalysisResult`] either with rule-based
//! heuristics or through an external model behind [`ClassificationClient`].

pub mod analyzer;
pub mod client;
pub mod de;
pub mod extract;
pub mod lease;
pub mod mock;
pub mod normalize;
pub mod prompt;
pub mod signals;
pub mod templates;
pub mod types;

pub use analyzer::{AnalyzeOptions, Analyzer};
pub use client::ClassificationClient;
pub use extract::{detect_document_type, detect_owner_team, detect_priority, extract_entities};
pub use lease::{infer_end_date, infer_lease_fields};
pub use mock::mock_analysis;
pub use normalize::normalize;
pub use types::{
    ActionType, AnalysisResult, ChecklistItem, ComplianceIssue, DocType, DraftEmail, EmailTone,
    Entities, LeaseFields, OwnerTeam, PartialAnalysis, Priority, RiskFlag, RiskSeverity,
    SuggestedAction,
};
