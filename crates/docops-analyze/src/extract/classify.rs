//! Weighted keyword classification of document type.

use crate::types::DocType;

struct TypeRule {
    doc_type: DocType,
    keywords: &'static [&'static str],
    weight: u32,
}

impl TypeRule {
    /// Presence test: each keyword counts once no matter how often it occurs.
    fn score(&self, lower: &str) -> u32 {
        let hits = self.keywords.iter().filter(|kw| lower.contains(*kw)).count() as u32;
        hits * self.weight
    }
}

/// Declaration order breaks ties: an earlier rule keeps the lead on equal scores.
const RULES: &[TypeRule] = &[
    TypeRule {
        doc_type: DocType::Invoice,
        keywords: &["invoice", "inv-", "bill to", "amount due", "payment terms", "total amount"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::Contract,
        keywords: &["agreement", "hereby agree", "terms and conditions", "parties", "whereas", "obligations"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::Resume,
        keywords: &["experience", "education", "skills", "objective", "career", "employment history"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::IncidentReport,
        keywords: &["incident", "occurred", "reported by", "severity", "root cause", "affected"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::MeetingNotes,
        keywords: &["meeting", "attendees", "agenda", "action items", "discussed", "minutes"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::Policy,
        keywords: &["policy", "procedure", "guidelines", "compliance", "effective date", "scope"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::Email,
        keywords: &["subject:", "from:", "to:", "dear", "regards", "sincerely"],
        weight: 1,
    },
    TypeRule {
        doc_type: DocType::PurchaseOrder,
        keywords: &["purchase order", "po#", "vendor", "quantity", "unit price", "delivery"],
        weight: 2,
    },
    TypeRule {
        doc_type: DocType::Proposal,
        keywords: &["proposal", "executive summary", "scope of work", "timeline", "budget", "deliverables"],
        weight: 2,
    },
];

/// Score `text` against every rule and return the strictly best type.
///
/// Returns [`DocType::Other`] when nothing scores above zero.
pub fn detect_document_type(text: &str) -> DocType {
    let lower = text.to_lowercase();

    let mut best = DocType::Other;
    let mut best_score = 0;
    for rule in RULES {
        let score = rule.score(&lower);
        if score > best_score {
            best_score = score;
            best = rule.doc_type;
        }
    }
    best
}
