//! Heuristic analysis path. Never fails and needs no network.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::extract::{detect_document_type, detect_owner_team, detect_priority, extract_entities};
use crate::normalize::normalize;
use crate::signals::generate_decision_signals;
use crate::templates::{generate_checklist, generate_draft_email, template_for};
use crate::types::{AnalysisResult, DocType, PartialAnalysis};

const UNCLASSIFIED_CONFIDENCE: f64 = 0.65;
const BASE_CONFIDENCE: f64 = 0.85;
const JITTER_RANGE: f64 = 0.1;

/// Analyze `text` with the rule-based classifier and canned templates.
///
/// `doc_type_hint` replaces classification when given; routing and priority
/// still come from the text.
pub fn mock_analysis(text: &str, doc_type_hint: Option<DocType>) -> AnalysisResult {
    let doc_type = doc_type_hint.unwrap_or_else(|| detect_document_type(text));
    let owner_team = detect_owner_team(doc_type, text);
    let priority = detect_priority(text);
    let entities = extract_entities(text);

    let template = template_for(doc_type);
    let checklist = generate_checklist(doc_type);
    let draft_email = generate_draft_email(doc_type, &entities, template.summary);
    let decision_signals =
        generate_decision_signals(text, doc_type, owner_team, priority, &entities);

    let rationale = format!(
        "Document classified as {doc_type} based on content analysis. Assigned to {owner_team} \
         team with {priority} priority due to content indicators."
    );

    normalize(PartialAnalysis {
        doc_type: Some(doc_type),
        summary: Some(template.summary.to_string()),
        entities: Some(entities),
        owner_team: Some(owner_team),
        priority: Some(priority),
        required_fields_missing: Some(to_strings(template.required_fields_missing)),
        risk_flags: Some(template.risk_flags),
        compliance_issues: None,
        recommended_actions: Some(template.recommended_actions),
        checklist: Some(checklist),
        draft_email: Some(draft_email),
        confidence: Some(confidence_for(doc_type, text)),
        rationale: Some(rationale),
        decision_signals: Some(decision_signals),
        suggested_tags: Some(to_strings(template.suggested_tags)),
        estimated_processing_time: Some(template.estimated_processing_time.to_string()),
        lease_fields: None,
    })
}

/// Mock confidence: fixed for `other`, otherwise a base plus jitter in
/// `[0, 0.1)` drawn from an RNG seeded by the text's SHA-256.
pub fn confidence_for(doc_type: DocType, text: &str) -> f64 {
    if doc_type == DocType::Other {
        return UNCLASSIFIED_CONFIDENCE;
    }
    let digest = Sha256::digest(text.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    let mut rng = StdRng::from_seed(seed);
    BASE_CONFIDENCE + rng.gen_range(0.0..JITTER_RANGE)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
