//! Analysis result types.
//!
//! `AnalysisResult` is the canonical, fully-populated shape. `PartialAnalysis`
//! is what an external model (or a user edit) supplies; the normalizer turns one
//! into the other.

use std::fmt;
use std::str::FromStr;

use docops_core::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::de;

fn token(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Closed string enum with a single spelling table, shared by serde,
/// `Display` and `FromStr`. Parsing is case-insensitive and treats spaces
/// and dashes as underscores.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident default $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
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
                let wanted = token(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| token(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        Error::Validation(format!("unknown {}: {}", stringify!($name), s))
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// Document category.
    pub enum DocType default Other {
        Invoice => "invoice",
        Contract => "contract",
        Resume => "resume",
        IncidentReport => "incident_report",
        MeetingNotes => "meeting_notes",
        Policy => "policy",
        Email => "email",
        PurchaseOrder => "purchase_order",
        Proposal => "proposal",
        Other => "other",
    }
}

string_enum! {
    /// Team that owns follow-up on a document.
    pub enum OwnerTeam default Unknown {
        Ap => "AP",
        Legal => "Legal",
        Hr => "HR",
        Ops => "Ops",
        Support => "Support",
        Sales => "Sales",
        It => "IT",
        Finance => "Finance",
        Procurement => "Procurement",
        Unknown => "Unknown",
    }
}

string_enum! {
    pub enum Priority default Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

string_enum! {
    pub enum RiskSeverity default Info {
        Info => "info",
        Warning => "warning",
        Critical => "critical",
    }
}

string_enum! {
    pub enum EmailTone default Professional {
        Formal => "formal",
        Professional => "professional",
        Friendly => "friendly",
        Urgent => "urgent",
    }
}

string_enum! {
    pub enum ActionType default Checklist {
        Checklist => "checklist",
        DraftEmail => "draft_email",
        ApprovalRequest => "approval_request",
        Escalation => "escalation",
        Reminder => "reminder",
    }
}

/// Eight entity categories. Every list is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    #[serde(deserialize_with = "de::string_list")]
    pub people: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub organizations: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub dates: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub amounts: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub ids: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub locations: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub emails: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub phones: Vec<String>,
}

impl Entities {
    /// Total number of extracted values across all categories.
    pub fn total(&self) -> usize {
        self.people.len()
            + self.organizations.len()
            + self.dates.len()
            + self.amounts.len()
            + self.ids.len()
            + self.locations.len()
            + self.emails.len()
            + self.phones.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFlag {
    #[serde(deserialize_with = "de::or_default")]
    pub flag: String,
    #[serde(deserialize_with = "de::or_default")]
    pub severity: RiskSeverity,
    #[serde(deserialize_with = "de::or_default")]
    pub description: String,
}

impl RiskFlag {
    pub fn new(flag: &str, severity: RiskSeverity, description: &str) -> Self {
        Self {
            flag: flag.to_string(),
            severity,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceIssue {
    #[serde(deserialize_with = "de::or_default")]
    pub issue: String,
    #[serde(deserialize_with = "de::or_default")]
    pub regulation: String,
    #[serde(deserialize_with = "de::or_default")]
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(deserialize_with = "de::or_default")]
    pub id: String,
    #[serde(deserialize_with = "de::or_default")]
    pub task: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::lenient_bool")]
    pub completed: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub assignee: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub due_date: Option<String>,
}

impl ChecklistItem {
    pub fn new(id: &str, task: &str) -> Self {
        Self {
            id: id.to_string(),
            task: task.to_string(),
            ..Default::default()
        }
    }
}

/// Draft reply. Always fully populated; an "empty" draft has empty lists and strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftEmail {
    #[serde(deserialize_with = "de::string_list")]
    pub to: Vec<String>,
    #[serde(deserialize_with = "de::string_list")]
    pub cc: Vec<String>,
    #[serde(deserialize_with = "de::or_default")]
    pub subject: String,
    #[serde(deserialize_with = "de::or_default")]
    pub body: String,
    #[serde(deserialize_with = "de::or_default")]
    pub tone: EmailTone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestedAction {
    #[serde(rename = "type", deserialize_with = "de::or_default")]
    pub action_type: ActionType,
    #[serde(deserialize_with = "de::or_default")]
    pub title: String,
    #[serde(deserialize_with = "de::or_default")]
    pub priority: Priority,
    #[serde(deserialize_with = "de::string_list")]
    pub steps_or_body: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub due_date: Option<String>,
}

impl SuggestedAction {
    pub fn new(action_type: ActionType, title: &str, priority: Priority, steps: &[&str]) -> Self {
        Self {
            action_type,
            title: title.to_string(),
            priority,
            steps_or_body: steps.iter().map(|s| s.to_string()).collect(),
            due_date: None,
        }
    }
}

/// Lease administration attributes. All 19 keys serialize, `null` when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaseFields {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub lease_id: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub payment_type: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub one_time_payment_amount: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub one_time_payment_due: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub tax_code: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub effective_from: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub previous_meter_reading: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub current_meter_reading: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub payment_period: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub cost_center: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub landlord: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub tenant: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub property_address: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub monthly_rent: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub security_deposit: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub lease_term: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub currency: Option<String>,
}

/// Canonical output of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub doc_type: DocType,
    pub summary: String,
    pub entities: Entities,
    pub owner_team: OwnerTeam,
    pub priority: Priority,
    pub required_fields_missing: Vec<String>,
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_issues: Option<Vec<ComplianceIssue>>,
    pub recommended_actions: Vec<SuggestedAction>,
    pub checklist: Vec<ChecklistItem>,
    pub draft_email: DraftEmail,
    pub confidence: f64,
    pub rationale: String,
    pub decision_signals: Vec<String>,
    pub suggested_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_processing_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_fields: Option<LeaseFields>,
}

impl AnalysisResult {
    /// Apply user edits on top of this result, field by field.
    ///
    /// Fields absent from `edits` keep their analyzed value. Lease fields are
    /// replaced wholesale and re-run through inference.
    pub fn with_overrides(mut self, edits: &PartialAnalysis) -> Self {
        if let Some(v) = edits.doc_type {
            self.doc_type = v;
        }
        if let Some(v) = &edits.summary {
            self.summary = v.clone();
        }
        if let Some(v) = &edits.entities {
            self.entities = v.clone();
        }
        if let Some(v) = edits.owner_team {
            self.owner_team = v;
        }
        if let Some(v) = edits.priority {
            self.priority = v;
        }
        if let Some(v) = &edits.required_fields_missing {
            self.required_fields_missing = v.clone();
        }
        if let Some(v) = &edits.risk_flags {
            self.risk_flags = v.clone();
        }
        if let Some(v) = &edits.compliance_issues {
            self.compliance_issues = Some(v.clone());
        }
        if let Some(v) = &edits.recommended_actions {
            self.recommended_actions = v.clone();
        }
        if let Some(v) = &edits.checklist {
            self.checklist = v.clone();
        }
        if let Some(v) = &edits.draft_email {
            self.draft_email = v.clone();
        }
        if let Some(v) = edits.confidence {
            self.confidence = v.clamp(0.0, 1.0);
        }
        if let Some(v) = &edits.rationale {
            self.rationale = v.clone();
        }
        if let Some(v) = &edits.decision_signals {
            self.decision_signals = v.clone();
        }
        if let Some(v) = &edits.suggested_tags {
            self.suggested_tags = v.clone();
        }
        if let Some(v) = &edits.estimated_processing_time {
            self.estimated_processing_time = Some(v.clone());
        }
        if let Some(v) = &edits.lease_fields {
            self.lease_fields = Some(crate::lease::infer_lease_fields(v.clone()));
        }
        self
    }
}

/// Partially-populated analysis from a model response or a user edit.
///
/// Every field is optional, and a field whose value has the wrong shape is
/// treated as absent rather than failing the whole parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAnalysis {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub doc_type: Option<DocType>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub entities: Option<Entities>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub owner_team: Option<OwnerTeam>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub priority: Option<Priority>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string_list"
    )]
    pub required_fields_missing: Option<Vec<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_list"
    )]
    pub risk_flags: Option<Vec<RiskFlag>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_list"
    )]
    pub compliance_issues: Option<Vec<ComplianceIssue>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_list"
    )]
    pub recommended_actions: Option<Vec<SuggestedAction>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_list"
    )]
    pub checklist: Option<Vec<ChecklistItem>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub draft_email: Option<DraftEmail>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_f64"
    )]
    pub confidence: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub rationale: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string_list"
    )]
    pub decision_signals: Option<Vec<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string_list"
    )]
    pub suggested_tags: Option<Vec<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de::lenient_string"
    )]
    pub estimated_processing_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "de::lenient")]
    pub lease_fields: Option<LeaseFields>,
}

impl PartialAnalysis {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
