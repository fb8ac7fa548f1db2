//! Field-by-field defaulting of a partial analysis into the canonical shape.

use std::collections::HashSet;

use crate::lease::infer_lease_fields;
use crate::types::{AnalysisResult, ChecklistItem, PartialAnalysis};

pub const FALLBACK_SUMMARY: &str = "Unable to generate summary.";
pub const FALLBACK_RATIONALE: &str = "Analysis completed.";
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Upper bound on kept decision signals.
pub const MAX_DECISION_SIGNALS: usize = 5;

/// Build a complete [`AnalysisResult`] from whatever `partial` provides.
///
/// Lists default to empty, enums to their defaults, and lease fields (when
/// present) go through [`infer_lease_fields`]. Absent lease fields stay absent.
pub fn normalize(partial: PartialAnalysis) -> AnalysisResult {
    AnalysisResult {
        doc_type: partial.doc_type.unwrap_or_default(),
        summary: partial
            .summary
            .unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
        entities: partial.entities.unwrap_or_default(),
        owner_team: partial.owner_team.unwrap_or_default(),
        priority: partial.priority.unwrap_or_default(),
        required_fields_missing: partial.required_fields_missing.unwrap_or_default(),
        risk_flags: partial.risk_flags.unwrap_or_default(),
        compliance_issues: partial.compliance_issues,
        recommended_actions: partial.recommended_actions.unwrap_or_default(),
        checklist: normalize_checklist(partial.checklist.unwrap_or_default()),
        draft_email: partial.draft_email.unwrap_or_default(),
        confidence: normalize_confidence(partial.confidence),
        rationale: partial
            .rationale
            .unwrap_or_else(|| FALLBACK_RATIONALE.to_string()),
        decision_signals: dedupe_signals(partial.decision_signals.unwrap_or_default()),
        suggested_tags: partial.suggested_tags.unwrap_or_default(),
        estimated_processing_time: partial.estimated_processing_time,
        lease_fields: partial.lease_fields.map(infer_lease_fields),
    }
}

fn normalize_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Reset `completed` and make ids unique. Missing or repeated ids become `chk_<n>`.
fn normalize_checklist(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .enumerate()
        .map(|(i, mut item)| {
            item.completed = false;
            if item.id.trim().is_empty() || seen.contains(&item.id) {
                let mut n = i + 1;
                while seen.contains(&format!("chk_{n}")) {
                    n += 1;
                }
                item.id = format!("chk_{n}");
            }
            seen.insert(item.id.clone());
            item
        })
        .collect()
}

fn dedupe_signals(signals: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    signals
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .take(MAX_DECISION_SIGNALS)
        .collect()
}
