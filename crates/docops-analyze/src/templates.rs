//! Canned per-type content for the heuristic path: template fields,
//! checklists and draft emails.

use crate::types::{
    ActionType, ChecklistItem, DocType, DraftEmail, EmailTone, Entities, Priority, RiskFlag,
    RiskSeverity, SuggestedAction,
};

/// Placeholder recipient when no email address could be extracted.
pub const FALLBACK_RECIPIENT: &str = "review@example.com";

/// Fixed fields the heuristic path uses for one document type.
#[derive(Debug, Clone)]
pub struct DocTemplate {
    pub summary: &'static str,
    pub required_fields_missing: &'static [&'static str],
    pub risk_flags: Vec<RiskFlag>,
    pub recommended_actions: Vec<SuggestedAction>,
    pub suggested_tags: &'static [&'static str],
    pub estimated_processing_time: &'static str,
}

/// Template for `doc_type`. Every type has one.
pub fn template_for(doc_type: DocType) -> DocTemplate {
    use RiskSeverity::*;

    match doc_type {
        DocType::Invoice => DocTemplate {
            summary: "This is an invoice document requesting payment for goods or services rendered. The document contains billing details, line items, and payment terms.",
            required_fields_missing: &["Purchase order reference"],
            risk_flags: vec![RiskFlag::new("missing_po", Warning, "No purchase order number referenced")],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Checklist,
                "Process Invoice",
                Priority::Medium,
                &["Verify vendor details", "Match to PO", "Approve for payment"],
            )],
            suggested_tags: &["invoice", "accounts-payable", "pending-payment"],
            estimated_processing_time: "2-3 business days",
        },
        DocType::Contract => DocTemplate {
            summary: "This is a contractual agreement document outlining terms, conditions, and obligations between parties. Review required before execution.",
            required_fields_missing: &["Signature date", "Notarization"],
            risk_flags: vec![
                RiskFlag::new("legal_review", Info, "Legal review recommended before signing"),
                RiskFlag::new("missing_signatures", Warning, "Document appears to be unsigned"),
            ],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::ApprovalRequest,
                "Legal Review Required",
                Priority::High,
                &["Route to legal team", "Obtain stakeholder approval", "Schedule signing"],
            )],
            suggested_tags: &["contract", "legal", "requires-review"],
            estimated_processing_time: "5-7 business days",
        },
        DocType::Resume => DocTemplate {
            summary: "This is a candidate resume/CV document containing professional experience, education, and skills information for employment consideration.",
            required_fields_missing: &[],
            risk_flags: vec![],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Checklist,
                "Review Candidate",
                Priority::Medium,
                &["Screen qualifications", "Schedule interview", "Update ATS"],
            )],
            suggested_tags: &["resume", "candidate", "hiring"],
            estimated_processing_time: "1-2 business days",
        },
        DocType::IncidentReport => DocTemplate {
            summary: "This is an incident report documenting an event that requires investigation and follow-up action. Immediate review recommended.",
            required_fields_missing: &["Root cause analysis"],
            risk_flags: vec![
                RiskFlag::new("security_incident", Critical, "May require immediate security review"),
                RiskFlag::new("incomplete_report", Warning, "Root cause analysis not included"),
            ],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Escalation,
                "Incident Response",
                Priority::High,
                &["Investigate incident", "Document findings", "Implement remediation"],
            )],
            suggested_tags: &["incident", "security", "urgent"],
            estimated_processing_time: "1 business day",
        },
        DocType::MeetingNotes => DocTemplate {
            summary: "These are meeting notes containing discussion points, decisions made, and action items. Follow-up on action items recommended.",
            required_fields_missing: &[],
            risk_flags: vec![],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Reminder,
                "Follow Up on Action Items",
                Priority::Medium,
                &["Distribute notes", "Track action items", "Schedule follow-up"],
            )],
            suggested_tags: &["meeting", "notes", "action-items"],
            estimated_processing_time: "Same day",
        },
        DocType::Policy => DocTemplate {
            summary: "This is a policy document outlining organizational guidelines and procedures. Compliance review and distribution may be required.",
            required_fields_missing: &["Approval date", "Review cycle"],
            risk_flags: vec![RiskFlag::new("compliance_review", Info, "Annual compliance review may be due")],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Checklist,
                "Policy Compliance",
                Priority::Low,
                &["Review policy content", "Update if needed", "Distribute to stakeholders"],
            )],
            suggested_tags: &["policy", "compliance", "documentation"],
            estimated_processing_time: "3-5 business days",
        },
        DocType::Email => DocTemplate {
            summary: "This is an email correspondence requiring attention. Review content and respond as appropriate.",
            required_fields_missing: &[],
            risk_flags: vec![],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::DraftEmail,
                "Respond to Email",
                Priority::Medium,
                &["Review content", "Draft response", "Send reply"],
            )],
            suggested_tags: &["email", "correspondence"],
            estimated_processing_time: "Same day",
        },
        DocType::PurchaseOrder => DocTemplate {
            summary: "This is a purchase order document for procurement of goods or services. Processing and approval required.",
            required_fields_missing: &["Budget approval"],
            risk_flags: vec![RiskFlag::new("budget_check", Warning, "Budget approval status unknown")],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::ApprovalRequest,
                "PO Approval",
                Priority::High,
                &["Verify budget", "Get manager approval", "Submit to vendor"],
            )],
            suggested_tags: &["purchase-order", "procurement", "pending-approval"],
            estimated_processing_time: "2-3 business days",
        },
        DocType::Proposal => DocTemplate {
            summary: "This is a business proposal document outlining a project scope, timeline, and budget. Review and stakeholder decision required.",
            required_fields_missing: &["Client signature"],
            risk_flags: vec![RiskFlag::new("pending_review", Info, "Proposal awaiting stakeholder review")],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::ApprovalRequest,
                "Proposal Review",
                Priority::High,
                &["Review scope", "Discuss with team", "Present to client"],
            )],
            suggested_tags: &["proposal", "sales", "pending-decision"],
            estimated_processing_time: "5-7 business days",
        },
        DocType::Other => DocTemplate {
            summary: "This document has been analyzed but could not be classified into a specific category. Manual review recommended.",
            required_fields_missing: &[],
            risk_flags: vec![RiskFlag::new(
                "unclassified",
                Info,
                "Document type could not be automatically determined",
            )],
            recommended_actions: vec![SuggestedAction::new(
                ActionType::Checklist,
                "Manual Review",
                Priority::Medium,
                &["Review document", "Classify manually", "Route appropriately"],
            )],
            suggested_tags: &["unclassified", "needs-review"],
            estimated_processing_time: "1-2 business days",
        },
    }
}

const GENERIC_CHECKLIST: &[(&str, &str)] = &[
    ("1", "Review document content"),
    ("2", "Verify extracted information"),
    ("3", "Take required action"),
];

fn checklist_tasks(doc_type: DocType) -> &'static [(&'static str, &'static str)] {
    match doc_type {
        DocType::Invoice => &[
            ("inv-1", "Verify vendor information"),
            ("inv-2", "Match to purchase order"),
            ("inv-3", "Verify amounts and calculations"),
            ("inv-4", "Submit for approval"),
            ("inv-5", "Schedule payment"),
        ],
        DocType::Contract => &[
            ("con-1", "Review terms and conditions"),
            ("con-2", "Identify key obligations"),
            ("con-3", "Get legal review"),
            ("con-4", "Obtain necessary approvals"),
            ("con-5", "Execute document"),
        ],
        DocType::Resume => &[
            ("res-1", "Screen qualifications"),
            ("res-2", "Compare to job requirements"),
            ("res-3", "Schedule interview"),
            ("res-4", "Update applicant tracking system"),
        ],
        DocType::IncidentReport => &[
            ("inc-1", "Acknowledge incident"),
            ("inc-2", "Investigate root cause"),
            ("inc-3", "Document findings"),
            ("inc-4", "Implement remediation"),
            ("inc-5", "Close incident"),
        ],
        DocType::PurchaseOrder => &[
            ("po-1", "Verify budget availability"),
            ("po-2", "Get manager approval"),
            ("po-3", "Submit to vendor"),
            ("po-4", "Track delivery"),
        ],
        _ => GENERIC_CHECKLIST,
    }
}

/// Checklist for `doc_type`: 3-5 open items with ids unique within the list.
pub fn generate_checklist(doc_type: DocType) -> Vec<ChecklistItem> {
    checklist_tasks(doc_type)
        .iter()
        .map(|(id, task)| ChecklistItem::new(id, task))
        .collect()
}

fn recipients_or(entities: &Entities, fallback: &str) -> Vec<String> {
    if entities.emails.is_empty() {
        vec![fallback.to_string()]
    } else {
        entities.emails.clone()
    }
}

/// Draft reply for `doc_type`, addressed to extracted emails where possible.
pub fn generate_draft_email(doc_type: DocType, entities: &Entities, summary: &str) -> DraftEmail {
    match doc_type {
        DocType::Invoice => {
            let id = entities.ids.first();
            let reference = id.map(|s| format!(" ({s})")).unwrap_or_default();
            let amount = entities
                .amounts
                .first()
                .map(|a| format!("Amount: {a}"))
                .unwrap_or_default();
            DraftEmail {
                to: recipients_or(entities, "vendor@example.com"),
                cc: vec![],
                subject: format!(
                    "RE: Invoice {} - Processing Confirmation",
                    id.map(String::as_str).unwrap_or("Reference")
                ),
                body: format!(
                    "Dear Team,\n\nWe have received and are processing the invoice{reference}.\n\n{amount}\n\n\
                     Please allow 2-3 business days for processing. If you have any questions, \
                     please don't hesitate to reach out.\n\nBest regards"
                ),
                tone: EmailTone::Professional,
            }
        }
        DocType::Contract => DraftEmail {
            to: recipients_or(entities, "legal@example.com"),
            cc: vec![],
            subject: "Contract Review Request".to_string(),
            body: format!(
                "Dear Legal Team,\n\nPlease review the attached contract document. Key details:\n\n\
                 {summary}\n\nPlease provide your assessment at your earliest convenience.\n\nBest regards"
            ),
            tone: EmailTone::Formal,
        },
        DocType::Resume => DraftEmail {
            to: recipients_or(entities, "candidate@example.com"),
            cc: vec!["hr@example.com".to_string()],
            subject: "Application Received - Next Steps".to_string(),
            body: "Dear Candidate,\n\nThank you for your application. We have received your resume \
                   and are reviewing your qualifications.\n\nWe will be in touch within 5-7 business \
                   days regarding next steps.\n\nBest regards,\nHR Team"
                .to_string(),
            tone: EmailTone::Professional,
        },
        DocType::IncidentReport => DraftEmail {
            to: vec!["it-security@example.com".to_string()],
            cc: vec!["management@example.com".to_string()],
            subject: "Incident Report - Immediate Attention Required".to_string(),
            body: format!(
                "Team,\n\nAn incident has been reported that requires immediate attention:\n\n\
                 {summary}\n\nPlease review and coordinate the response effort.\n\nRegards"
            ),
            tone: EmailTone::Urgent,
        },
        _ => DraftEmail {
            to: recipients_or(entities, FALLBACK_RECIPIENT),
            cc: vec![],
            subject: "Document Review Required".to_string(),
            body: format!(
                "Hello,\n\nA document has been submitted for review:\n\n{summary}\n\n\
                 Please take appropriate action.\n\nBest regards"
            ),
            tone: EmailTone::Professional,
        },
    }
}
