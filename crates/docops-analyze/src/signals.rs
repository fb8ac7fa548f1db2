//! Human-readable justifications for a heuristic classification.
//!
//! Signals are re-derived from the text and the final decision rather than
//! taken from classifier internals.

use crate::types::{DocType, Entities, OwnerTeam, Priority};

const MIN_SIGNALS: usize = 3;
const MAX_SIGNALS: usize = 4;

const STRUCTURE_SIGNAL: &str = "Classification based on overall structure and keyword patterns.";

fn type_signal(doc_type: DocType, lower: &str) -> Option<&'static str> {
    let (cues, signal): (&[&str], &str) = match doc_type {
        DocType::Contract => (
            &["agreement", "terms", "obligations", "parties", "whereas"],
            "Detected contract-style language (terms, obligations, parties).",
        ),
        DocType::Invoice => (
            &["invoice", "amount due", "payment terms", "bill to"],
            "Found billing cues like invoice terms and payment language.",
        ),
        DocType::PurchaseOrder => (
            &["purchase order", "po#", "vendor", "unit price"],
            "Purchase order indicators present (PO references, vendor, unit price).",
        ),
        DocType::Resume => (
            &["experience", "education", "skills", "employment"],
            "Resume-like sections detected (experience, education, skills).",
        ),
        DocType::IncidentReport => (
            &["incident", "root cause", "severity", "affected"],
            "Incident language detected (severity, root cause, affected systems).",
        ),
        _ => return None,
    };
    cues.iter().any(|c| lower.contains(c)).then_some(signal)
}

fn team_signal(team: OwnerTeam) -> Option<&'static str> {
    match team {
        OwnerTeam::Unknown => Some("No explicit department keywords found for routing."),
        OwnerTeam::Legal => Some("Legal terminology suggests routing to Legal."),
        OwnerTeam::Ap | OwnerTeam::Finance => {
            Some("Financial terms suggest routing to finance-related teams.")
        }
        _ => None,
    }
}

fn priority_signal(priority: Priority, entities: &Entities) -> Option<&'static str> {
    match priority {
        Priority::Urgent => {
            Some("Urgency inferred from terms like 'urgent', 'ASAP', or 'immediately'.")
        }
        Priority::High => Some("Deadline or high-priority wording suggests elevated urgency."),
        Priority::Medium if !entities.dates.is_empty() => {
            Some("Dates detected without explicit penalties; set to medium urgency.")
        }
        _ => None,
    }
}

fn fillers(entities: &Entities) -> [&'static str; 3] {
    let dates = if entities.dates.is_empty() {
        "No explicit dates or deadlines found in the document."
    } else {
        "Document includes dates and timing indicators."
    };
    let amounts = if entities.amounts.is_empty() {
        "No monetary amounts detected in the document."
    } else {
        "Monetary amounts detected in the document."
    };
    [dates, amounts, STRUCTURE_SIGNAL]
}

/// Explain a classification in 3-4 distinct sentences.
pub fn generate_decision_signals(
    text: &str,
    doc_type: DocType,
    owner_team: OwnerTeam,
    priority: Priority,
    entities: &Entities,
) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut signals: Vec<&str> = [
        type_signal(doc_type, &lower),
        team_signal(owner_team),
        priority_signal(priority, entities),
    ]
    .into_iter()
    .flatten()
    .collect();

    for filler in fillers(entities) {
        if signals.len() >= MIN_SIGNALS {
            break;
        }
        if !signals.contains(&filler) {
            signals.push(filler);
        }
    }

    signals.truncate(MAX_SIGNALS);
    signals.into_iter().map(String::from).collect()
}
