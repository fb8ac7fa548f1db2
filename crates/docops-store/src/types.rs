//! Data types for cases, notes, audit events and dashboard stats.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use docops_analyze::{
    de, AnalysisResult, ChecklistItem, ComplianceIssue, DocType, DraftEmail, Entities,
    LeaseFields, OwnerTeam, PartialAnalysis, Priority, RiskFlag, SuggestedAction,
};
use docops_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snake-case column enum with `as_str`/`FromStr` matching its serde names.
macro_rules! column_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| Error::Validation(format!("unknown {}: {}", stringify!($name), s)))
            }
        }
    };
}

column_enum! {
    /// Workflow state of a case.
    pub enum CaseStatus {
        #[default]
        New => "new",
        InProgress => "in_progress",
        PendingReview => "pending_review",
        Resolved => "resolved",
        Archived => "archived",
    }
}

column_enum! {
    pub enum NoteType {
        #[default]
        General => "general",
        Decision => "decision",
        Followup => "followup",
        Escalation => "escalation",
    }
}

column_enum! {
    pub enum AuditEventType {
        Analyzed => "analyzed",
        #[default]
        Created => "created",
        Edited => "edited",
        StatusChanged => "status_changed",
        Assigned => "assigned",
        NoteAdded => "note_added",
        EmailSent => "email_sent",
    }
}

/// A case row with its JSON columns decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub original_text: String,
    pub document_hash: String,
    pub doc_type: DocType,
    pub summary: String,
    pub entities: Entities,
    pub owner_team: OwnerTeam,
    pub priority: Priority,
    pub confidence: f64,
    pub ai_rationale: String,
    pub missing_fields: Vec<String>,
    pub risk_flags: Vec<RiskFlag>,
    pub compliance_issues: Option<Vec<ComplianceIssue>>,
    pub checklist: Vec<ChecklistItem>,
    pub draft_email: DraftEmail,
    pub suggested_actions: Vec<SuggestedAction>,
    pub lease_fields: Option<LeaseFields>,
    pub user_edits: Option<Value>,
    pub edited_fields: Option<Value>,
    pub tags: Vec<String>,
    pub status: CaseStatus,
    pub assigned_to: Option<String>,
}

/// A case with its notes and audit trail, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: Case,
    pub notes: Vec<Note>,
    pub audit_events: Vec<AuditEvent>,
}

/// The reviewer's confirmation (or override) of team and priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassificationConfirmation {
    #[serde(deserialize_with = "de::lenient")]
    pub owner_team: Option<OwnerTeam>,
    #[serde(deserialize_with = "de::lenient")]
    pub priority: Option<Priority>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "de::lenient_bool")]
    pub has_override: bool,
    #[serde(deserialize_with = "de::lenient_string")]
    pub confirmed_at: Option<String>,
}

/// Input for [`crate::SqliteStore::create_case`].
#[derive(Debug, Clone)]
pub struct NewCase {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub original_text: String,
    pub analysis: AnalysisResult,
    pub user_edits: Option<PartialAnalysis>,
    pub classification: Option<ClassificationConfirmation>,
}

/// Typed partial update of a case. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseUpdate {
    pub status: Option<CaseStatus>,
    /// An empty string unassigns the case.
    pub assigned_to: Option<String>,
    pub doc_type: Option<DocType>,
    pub summary: Option<String>,
    pub owner_team: Option<OwnerTeam>,
    pub priority: Option<Priority>,
    pub entities: Option<Entities>,
    pub missing_fields: Option<Vec<String>>,
    pub risk_flags: Option<Vec<RiskFlag>>,
    pub compliance_issues: Option<Vec<ComplianceIssue>>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub draft_email: Option<DraftEmail>,
    pub suggested_actions: Option<Vec<SuggestedAction>>,
    pub lease_fields: Option<LeaseFields>,
    pub user_edits: Option<Value>,
    pub edited_fields: Option<Value>,
    pub tags: Option<Vec<String>>,
    /// Free-form before/after record, stored on the audit event as given.
    pub changes: Option<Value>,
    pub change_reason: Option<String>,
}

/// Filters, sort and page for [`crate::SqliteStore::list_cases`].
#[derive(Debug, Clone)]
pub struct CaseFilter {
    pub team: Option<OwnerTeam>,
    pub priority: Option<Priority>,
    pub status: Option<CaseStatus>,
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl Default for CaseFilter {
    fn default() -> Self {
        Self {
            team: None,
            priority: None,
            status: None,
            search: None,
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::Validation(format!("unknown sort order: {other}"))),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub case_id: String,
    pub created_at: String,
    pub content: String,
    pub note_type: NoteType,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub case_id: String,
    pub created_at: String,
    pub event_type: AuditEventType,
    pub actor: String,
    pub description: String,
    pub metadata: Option<Value>,
    pub changes: Option<Value>,
}

/// Input for [`crate::SqliteStore::add_audit_event`].
#[derive(Debug, Clone, Default)]
pub struct NewAuditEvent {
    pub event_type: AuditEventType,
    pub actor: String,
    pub description: String,
    pub metadata: Option<Value>,
    pub changes: Option<Value>,
}

impl NewAuditEvent {
    pub fn new(event_type: AuditEventType, description: impl Into<String>) -> Self {
        Self {
            event_type,
            actor: "user".to_string(),
            description: description.into(),
            metadata: None,
            changes: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_changes(mut self, changes: Value) -> Self {
        self.changes = Some(changes);
        self
    }
}

/// Dashboard counters. `by_status` and `by_priority` list every key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: i64,
    pub today: i64,
    pub this_week: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_team: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub by_doc_type: BTreeMap<String, i64>,
}
