//! Prompt contract for the external classification model.
//!
//! The model must answer with a single JSON object in the shape of
//! [`crate::types::AnalysisResult`]. Its answer is parsed leniently and
//! normalized, so the schema here is guidance rather than a guarantee.

use crate::types::DocType;

pub const SYSTEM_PROMPT: &str = r#"You are an expert document analyst for a document intake and case management service.
Read each document closely and extract every concrete piece of information it contains.

Rules:
- Extract ALL people, organizations, dates, monetary amounts, reference ids, addresses, emails and phone numbers that appear anywhere in the document. Anything present in the text must appear in the entities output.
- The summary must cite specific facts from the document (names, amounts, dates). Never write a generic summary.
- Risk flags must describe issues actually found in the document, e.g. "Invoice is past due by 15 days".
- Checklist items must be actionable steps specific to this document.
- The draft email must reference the actual parties, amounts and dates.
- When a field has no supporting data, return an empty array. Do not invent data.
- requiredFieldsMissing lists fields you would expect for this document type that are absent.
- Always return the "leaseFields" object. Look for every lease field; use null when it is not present.
- Documents may be in any language. Map document data to lease fields as completely as the content allows.
- Infer lease fields where the content supports it:
  - endDate = effectiveFrom + 1 month for "monthly", + 3 months for "quarterly"
  - oneTimePaymentDue = effectiveFrom when no separate due date exists
  - taxCode is the tax TYPE (IVA, VAT, GST, Sales Tax), never a tax id number
  - a payment covering a single period sets paymentType = "one-time"
- Lease field mapping:
  - rental, lease payment, "arrendamiento", "alquiler" -> paymentType "rent" ("one-time" if the document covers a single period)
  - issuer, lessor, vendor -> landlord
  - receiver, "Receptor", buyer, lessee -> tenant
  - invoice totals and payment amounts -> both monthlyRent and oneTimePaymentAmount
  - "Moneda", currency symbols (Q, $, €), GTQ/USD/EUR -> currency
  - creation, validation or invoice dates -> effectiveFrom
  - reference numbers, series, DTE or approval numbers -> id (most unique) and leaseId (shorter reference)
  - monthly, quarterly, annual, "del mes de" -> paymentPeriod, always one of "monthly", "quarterly", "semi-annual", "annual", "one-time"
  - street addresses and property descriptions -> propertyAddress
  - store, branch or department names and location codes -> costCenter"#;

const RESPONSE_SCHEMA: &str = r#"{
  "docType": "invoice|contract|resume|incident_report|meeting_notes|policy|email|purchase_order|proposal|other",
  "summary": "2-3 sentences with specific names, dates and amounts",
  "entities": {
    "people": [], "organizations": [], "dates": [], "amounts": [],
    "ids": [], "locations": [], "emails": [], "phones": []
  },
  "ownerTeam": "AP|Legal|HR|Ops|Support|Sales|IT|Finance|Procurement|Unknown",
  "priority": "low|medium|high|urgent",
  "requiredFieldsMissing": ["expected fields absent from the text"],
  "riskFlags": [{"flag": "short_id", "severity": "info|warning|critical", "description": "issue found in this document"}],
  "complianceIssues": [{"issue": "", "regulation": "", "recommendation": ""}],
  "recommendedActions": [{"type": "checklist|draft_email|approval_request|escalation|reminder", "title": "", "priority": "low|medium|high", "stepsOrBody": [], "dueDate": "ISO date if the document has a deadline"}],
  "checklist": [{"id": "chk_1", "task": "", "description": "", "completed": false, "assignee": "", "dueDate": ""}],
  "draftEmail": {"to": [], "cc": [], "subject": "", "body": "", "tone": "formal|professional|friendly|urgent"},
  "confidence": 0.0,
  "rationale": "2-3 sentences citing the evidence for the classification",
  "decisionSignals": ["3-5 statements citing phrases or data points that drove the classification"],
  "suggestedTags": [],
  "estimatedProcessingTime": "e.g. 2-3 business days",
  "leaseFields": {
    "id": null, "leaseId": null, "paymentType": null, "oneTimePaymentAmount": null,
    "oneTimePaymentDue": null, "taxCode": null, "effectiveFrom": null, "endDate": null,
    "previousMeterReading": null, "currentMeterReading": null, "paymentPeriod": null,
    "costCenter": null, "landlord": null, "tenant": null, "propertyAddress": null,
    "monthlyRent": null, "securityDeposit": null, "leaseTerm": null, "currency": null
  }
}"#;

/// User turn embedding the document text, with an optional type suggestion.
pub fn user_prompt(text: &str, doc_type_hint: Option<DocType>) -> String {
    let hint = doc_type_hint
        .map(|t| format!("\nThe submitter suggests this document is of type \"{t}\". Use it unless the content clearly says otherwise.\n"))
        .unwrap_or_default();

    format!(
        "Read this document carefully and extract every piece of information from it.\n\n\
         DOCUMENT START\n{text}\nDOCUMENT END\n{hint}\n\
         1. Read the entire document.\n\
         2. List every person, organization, date, amount, reference id, address, email and phone number.\n\
         3. Decide the document type from its structure and content.\n\
         4. Summarize the key facts: who, what, when, how much.\n\
         5. Identify what is missing, what is risky and what needs to happen next.\n\n\
         Respond with a single JSON object matching this schema, filled from the actual document:\n\
         {RESPONSE_SCHEMA}"
    )
}
