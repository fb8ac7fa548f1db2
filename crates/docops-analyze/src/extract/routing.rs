//! Owner-team routing and priority inference.

use crate::types::{DocType, OwnerTeam, Priority};

/// Keyword fallbacks for types without a fixed owner, checked in order.
const TEAM_KEYWORDS: &[(OwnerTeam, &[&str])] = &[
    (OwnerTeam::Support, &["support", "customer", "ticket"]),
    (OwnerTeam::Sales, &["sales", "proposal", "deal"]),
    (OwnerTeam::Ops, &["operations", "logistics"]),
    (OwnerTeam::Finance, &["finance", "budget", "expense"]),
];

/// Priority triggers, most severe first. The first tier with a hit wins.
const PRIORITY_TRIGGERS: &[(Priority, &[&str])] = &[
    (
        Priority::Urgent,
        &["urgent", "asap", "critical", "emergency", "immediately"],
    ),
    (
        Priority::High,
        &["high priority", "important", "deadline", "overdue"],
    ),
    (Priority::Low, &["low priority", "when possible", "no rush"]),
];

/// Fixed owner for document types that always route to the same team.
pub fn direct_owner(doc_type: DocType) -> Option<OwnerTeam> {
    match doc_type {
        DocType::Invoice => Some(OwnerTeam::Ap),
        DocType::Contract | DocType::Policy => Some(OwnerTeam::Legal),
        DocType::Resume => Some(OwnerTeam::Hr),
        DocType::IncidentReport => Some(OwnerTeam::It),
        DocType::PurchaseOrder => Some(OwnerTeam::Procurement),
        _ => None,
    }
}

pub fn detect_owner_team(doc_type: DocType, text: &str) -> OwnerTeam {
    if let Some(team) = direct_owner(doc_type) {
        return team;
    }

    let lower = text.to_lowercase();
    TEAM_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(team, _)| *team)
        .unwrap_or(OwnerTeam::Unknown)
}

pub fn detect_priority(text: &str) -> Priority {
    let lower = text.to_lowercase();
    PRIORITY_TRIGGERS
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(priority, _)| *priority)
        .unwrap_or(Priority::Medium)
}
