//! Database schema SQL.

/// Cases, their notes, and the audit trail. Timestamps are RFC 3339 UTC text.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS cases (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    file_name TEXT,
    file_type TEXT,
    original_text TEXT NOT NULL,
    document_hash TEXT NOT NULL UNIQUE,
    doc_type TEXT NOT NULL,
    summary TEXT NOT NULL,
    entities TEXT NOT NULL,
    owner_team TEXT NOT NULL,
    priority TEXT NOT NULL,
    confidence REAL NOT NULL,
    ai_rationale TEXT NOT NULL,
    missing_fields TEXT NOT NULL DEFAULT '[]',
    risk_flags TEXT NOT NULL DEFAULT '[]',
    compliance_issues TEXT,
    checklist TEXT NOT NULL DEFAULT '[]',
    draft_email TEXT NOT NULL,
    suggested_actions TEXT NOT NULL DEFAULT '[]',
    lease_fields TEXT,
    user_edits TEXT,
    edited_fields TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'new',
    assigned_to TEXT
);

CREATE INDEX IF NOT EXISTS idx_cases_status ON cases(status);
CREATE INDEX IF NOT EXISTS idx_cases_owner_team ON cases(owner_team);
CREATE INDEX IF NOT EXISTS idx_cases_priority ON cases(priority);
CREATE INDEX IF NOT EXISTS idx_cases_created_at ON cases(created_at);

CREATE TABLE IF NOT EXISTS case_notes (
    id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    content TEXT NOT NULL,
    note_type TEXT NOT NULL DEFAULT 'general',
    author TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_case_notes_case_id ON case_notes(case_id);

CREATE TABLE IF NOT EXISTS audit_events (
    id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL DEFAULT 'user',
    description TEXT NOT NULL,
    metadata TEXT,
    changes TEXT
);

CREATE INDEX IF NOT EXISTS idx_audit_events_case_id ON audit_events(case_id);
"#;
