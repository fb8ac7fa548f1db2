//! SQLite-backed case store.
//!
//! One connection behind a mutex. Multi-row writes (case + audit event,
//! note + audit event) run in a single transaction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, SecondsFormat, TimeZone, Utc};
use docops_analyze::{infer_lease_fields, Priority};
use docops_core::{Error, Result};
use docops_ingest::content_hash;
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::schema::SCHEMA_SQL;
use crate::types::*;

const MAX_PAGE_SIZE: usize = 100;
const NOTE_PREVIEW_CHARS: usize = 50;

const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 WHEN 'urgent' THEN 3 ELSE 1 END";

fn db(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Column expression for a `sortBy` key. Unknown keys sort by creation time.
fn sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "updatedAt" => "updated_at",
        "priority" => PRIORITY_RANK_SQL,
        "status" => "status",
        "ownerTeam" => "owner_team",
        "docType" => "doc_type",
        "confidence" => "confidence",
        _ => "created_at",
    }
}

/// SQLite store for cases, notes and audit events.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/docops.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("docops.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "SqliteStore initialized: {} cases, path={}",
            store.count_cases()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(db)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db)?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn count_cases(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))
            .map_err(db)
    }

    // ---------------------------------------------------------------
    // Cases
    // ---------------------------------------------------------------

    /// Create a case from an analysis plus optional user edits.
    ///
    /// Fails with [`Error::DuplicateContent`] carrying the existing case id
    /// when the same text was already filed.
    pub fn create_case(&self, new_case: NewCase) -> Result<Case> {
        let NewCase {
            file_name,
            file_type,
            original_text,
            analysis,
            user_edits,
            classification,
        } = new_case;

        let document_hash = content_hash(&original_text);
        let mut conn = self.conn.lock();
        if let Some(existing) = Self::find_id_by_hash(&conn, &document_hash)? {
            return Err(Error::DuplicateContent(existing));
        }

        let user_edits = user_edits.filter(|e| !e.is_empty());
        let mut merged = match &user_edits {
            Some(edits) => analysis.clone().with_overrides(edits),
            None => analysis.clone(),
        };

        // Only a confirmation with a timestamp counts.
        let classification = classification.filter(|c| c.confirmed_at.is_some());
        if let Some(c) = &classification {
            if let Some(team) = c.owner_team {
                merged.owner_team = team;
            }
            if let Some(priority) = c.priority {
                merged.priority = priority;
            }
        }
        let edited_fields = classification.as_ref().map(|c| {
            json!({
                "classification": {
                    "ownerTeam": merged.owner_team,
                    "priority": merged.priority,
                    "reason": c.reason.clone().unwrap_or_default(),
                    "confirmedAt": c.confirmed_at,
                    "hasOverride": c.has_override,
                }
            })
        });

        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let user_edits_json = user_edits.as_ref().map(to_json).transpose()?;
        let edited_fields_json = edited_fields.as_ref().map(to_json).transpose()?;
        let compliance_json = merged.compliance_issues.as_ref().map(to_json).transpose()?;
        let lease_json = merged.lease_fields.as_ref().map(to_json).transpose()?;

        let tx = conn.transaction().map_err(db)?;
        tx.execute(
            "INSERT INTO cases (
                id, created_at, updated_at, file_name, file_type, original_text, document_hash,
                doc_type, summary, entities, owner_team, priority, confidence, ai_rationale,
                missing_fields, risk_flags, compliance_issues, checklist, draft_email,
                suggested_actions, lease_fields, user_edits, edited_fields, tags, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
            params![
                id,
                created_at,
                created_at,
                file_name,
                file_type,
                original_text,
                document_hash,
                merged.doc_type.as_str(),
                merged.summary,
                to_json(&merged.entities)?,
                merged.owner_team.as_str(),
                merged.priority.as_str(),
                merged.confidence,
                merged.rationale,
                to_json(&merged.required_fields_missing)?,
                to_json(&merged.risk_flags)?,
                compliance_json,
                to_json(&merged.checklist)?,
                to_json(&merged.draft_email)?,
                to_json(&merged.recommended_actions)?,
                lease_json,
                user_edits_json,
                edited_fields_json,
                to_json(&merged.suggested_tags)?,
                CaseStatus::New.as_str(),
            ],
        )
        .map_err(db)?;

        let created = NewAuditEvent::new(
            AuditEventType::Created,
            "Case created from document analysis",
        )
        .with_metadata(json!({
            "fileName": file_name,
            "fileType": file_type,
            "confidence": merged.confidence,
            "analysisResult": analysis,
        }));
        Self::insert_event(&tx, &id, &created)?;

        if let Some(c) = &classification {
            let description = if c.has_override {
                "Classification overridden"
            } else {
                "Classification confirmed"
            };
            let event = NewAuditEvent::new(AuditEventType::Edited, description)
                .with_metadata(json!({
                    "reason": c.reason.clone().unwrap_or_default(),
                    "confirmedAt": c.confirmed_at,
                }))
                .with_changes(json!({
                    "before": {"ownerTeam": analysis.owner_team, "priority": analysis.priority},
                    "after": {"ownerTeam": merged.owner_team, "priority": merged.priority},
                }));
            Self::insert_event(&tx, &id, &event)?;
        }

        tx.commit().map_err(db)?;
        info!(case_id = %id, doc_type = %merged.doc_type, team = %merged.owner_team, "Case created");

        Self::fetch_case(&conn, &id)?
            .ok_or_else(|| Error::Internal(format!("case {id} vanished after insert")))
    }

    /// A case with its notes and audit events, or `None`.
    pub fn get_case(&self, id: &str) -> Result<Option<CaseDetail>> {
        let conn = self.conn.lock();
        let Some(case) = Self::fetch_case(&conn, id)? else {
            return Ok(None);
        };
        let notes = Self::fetch_notes(&conn, id)?;
        let audit_events = Self::fetch_events(&conn, id)?;
        Ok(Some(CaseDetail {
            case,
            notes,
            audit_events,
        }))
    }

    /// Filtered, sorted, paginated case listing.
    pub fn list_cases(&self, filter: &CaseFilter) -> Result<Paginated<Case>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(team) = filter.team {
            values.push(SqlValue::Text(team.as_str().to_string()));
            clauses.push(format!("owner_team = ?{}", values.len()));
        }
        if let Some(priority) = filter.priority {
            values.push(SqlValue::Text(priority.as_str().to_string()));
            clauses.push(format!("priority = ?{}", values.len()));
        }
        if let Some(status) = filter.status {
            values.push(SqlValue::Text(status.as_str().to_string()));
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            values.push(SqlValue::Text(format!("%{search}%")));
            let n = values.len();
            clauses.push(format!(
                "(summary LIKE ?{n} OR original_text LIKE ?{n} OR file_name LIKE ?{n})"
            ));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let order = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let page = filter.page.max(1);
        let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        // SQLite offsets are signed 64-bit.
        let offset = (page - 1).saturating_mul(limit).min(i64::MAX as usize);

        let conn = self.conn.lock();
        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM cases {where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
            .map_err(db)?;

        let sql = format!(
            "SELECT * FROM cases {where_sql} ORDER BY {} {order}, rowid {order} LIMIT {limit} OFFSET {offset}",
            sort_column(&filter.sort_by)
        );
        debug!(%sql, "Listing cases");
        let mut stmt = conn.prepare(&sql).map_err(db)?;
        let items: Vec<Case> = stmt
            .query_map(params_from_iter(values.iter()), |row| Ok(Self::row_to_case(row)))
            .map_err(db)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(Paginated {
            items,
            total,
            page,
            page_size: limit,
            total_pages: (total.max(0) as usize).div_ceil(limit),
        })
    }

    /// Apply a partial update and record it in the audit trail.
    ///
    /// The event is `status_changed` when the status moves, `assigned` when
    /// only the assignee is touched, `edited` otherwise.
    pub fn update_case(&self, id: &str, update: &CaseUpdate) -> Result<Case> {
        let columns = Self::update_columns(update)?;
        if columns.is_empty() {
            return Err(Error::Validation("No fields to update".into()));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db)?;
        let current = Self::fetch_case(&tx, id)?
            .ok_or_else(|| Error::NotFound(format!("Case {id}")))?;

        let fields: Vec<&str> = columns.iter().map(|(field, _, _)| *field).collect();
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (_, column, _))| format!("{column} = ?{}", i + 1))
            .collect();
        let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, _, v)| v).collect();
        values.push(SqlValue::Text(now()));
        values.push(SqlValue::Text(id.to_string()));
        let sql = format!(
            "UPDATE cases SET {}, updated_at = ?{} WHERE id = ?{}",
            assignments.join(", "),
            values.len() - 1,
            values.len()
        );
        tx.execute(&sql, params_from_iter(values.iter())).map_err(db)?;

        let new_status = update.status.filter(|s| *s != current.status);
        let (event_type, default_description) = if let Some(status) = new_status {
            (
                AuditEventType::StatusChanged,
                format!("Status changed from {} to {}", current.status, status),
            )
        } else if fields == ["assignedTo"] {
            let description = match update.assigned_to.as_deref().map(str::trim) {
                Some(who) if !who.is_empty() => format!("Assigned to {who}"),
                _ => "Case unassigned".to_string(),
            };
            (AuditEventType::Assigned, description)
        } else {
            (AuditEventType::Edited, "Case updated".to_string())
        };

        let mut event = NewAuditEvent::new(
            event_type,
            update
                .change_reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(default_description),
        )
        .with_metadata(json!({ "updatedFields": fields }));
        event.changes = update.changes.clone();
        Self::insert_event(&tx, id, &event)?;

        tx.commit().map_err(db)?;
        debug!(case_id = id, ?fields, "Case updated");

        Self::fetch_case(&conn, id)?.ok_or_else(|| Error::NotFound(format!("Case {id}")))
    }

    /// (field name, column, value) for every field set on `update`.
    fn update_columns(update: &CaseUpdate) -> Result<Vec<(&'static str, &'static str, SqlValue)>> {
        fn text(s: &str) -> SqlValue {
            SqlValue::Text(s.to_string())
        }
        fn json_text<T: Serialize>(v: &T) -> Result<SqlValue> {
            Ok(SqlValue::Text(to_json(v)?))
        }

        let mut cols = Vec::new();
        if let Some(v) = update.status {
            cols.push(("status", "status", text(v.as_str())));
        }
        if let Some(v) = &update.assigned_to {
            let v = v.trim();
            let value = if v.is_empty() { SqlValue::Null } else { text(v) };
            cols.push(("assignedTo", "assigned_to", value));
        }
        if let Some(v) = update.doc_type {
            cols.push(("docType", "doc_type", text(v.as_str())));
        }
        if let Some(v) = &update.summary {
            cols.push(("summary", "summary", text(v)));
        }
        if let Some(v) = update.owner_team {
            cols.push(("ownerTeam", "owner_team", text(v.as_str())));
        }
        if let Some(v) = update.priority {
            cols.push(("priority", "priority", text(v.as_str())));
        }
        if let Some(v) = &update.entities {
            cols.push(("entities", "entities", json_text(v)?));
        }
        if let Some(v) = &update.missing_fields {
            cols.push(("missingFields", "missing_fields", json_text(v)?));
        }
        if let Some(v) = &update.risk_flags {
            cols.push(("riskFlags", "risk_flags", json_text(v)?));
        }
        if let Some(v) = &update.compliance_issues {
            cols.push(("complianceIssues", "compliance_issues", json_text(v)?));
        }
        if let Some(v) = &update.checklist {
            cols.push(("checklist", "checklist", json_text(v)?));
        }
        if let Some(v) = &update.draft_email {
            cols.push(("draftEmail", "draft_email", json_text(v)?));
        }
        if let Some(v) = &update.suggested_actions {
            cols.push(("suggestedActions", "suggested_actions", json_text(v)?));
        }
        if let Some(v) = &update.lease_fields {
            let inferred = infer_lease_fields(v.clone());
            cols.push(("leaseFields", "lease_fields", json_text(&inferred)?));
        }
        if let Some(v) = &update.user_edits {
            cols.push(("userEdits", "user_edits", json_text(v)?));
        }
        if let Some(v) = &update.edited_fields {
            cols.push(("editedFields", "edited_fields", json_text(v)?));
        }
        if let Some(v) = &update.tags {
            cols.push(("tags", "tags", json_text(v)?));
        }
        Ok(cols)
    }

    /// Delete a case with its notes and audit events (cascade).
    pub fn delete_case(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM cases WHERE id = ?1", params![id])
            .map_err(db)?;
        if count > 0 {
            info!(case_id = id, "Case deleted");
        }
        Ok(count > 0)
    }

    // ---------------------------------------------------------------
    // Notes
    // ---------------------------------------------------------------

    /// Add a note and a matching `note_added` audit event.
    pub fn add_note(
        &self,
        case_id: &str,
        content: &str,
        note_type: NoteType,
        author: Option<&str>,
    ) -> Result<Note> {
        if content.trim().is_empty() {
            return Err(Error::Validation("Note content is required".into()));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db)?;
        if !Self::case_exists(&tx, case_id)? {
            return Err(Error::NotFound(format!("Case {case_id}")));
        }

        let note = Note {
            id: Uuid::new_v4().to_string(),
            case_id: case_id.to_string(),
            created_at: now(),
            content: content.to_string(),
            note_type,
            author: author
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("User")
                .to_string(),
        };
        tx.execute(
            "INSERT INTO case_notes (id, case_id, created_at, content, note_type, author)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id,
                note.case_id,
                note.created_at,
                note.content,
                note.note_type.as_str(),
                note.author
            ],
        )
        .map_err(db)?;

        let event = NewAuditEvent::new(
            AuditEventType::NoteAdded,
            format!("Note added: {}", note_preview(content)),
        )
        .with_metadata(json!({ "noteId": note.id, "noteType": note.note_type }));
        Self::insert_event(&tx, case_id, &event)?;

        tx.commit().map_err(db)?;
        Ok(note)
    }

    /// Notes for a case, newest first. Unknown cases have none.
    pub fn list_notes(&self, case_id: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        Self::fetch_notes(&conn, case_id)
    }

    // ---------------------------------------------------------------
    // Audit events
    // ---------------------------------------------------------------

    pub fn add_audit_event(&self, case_id: &str, event: NewAuditEvent) -> Result<AuditEvent> {
        if event.description.trim().is_empty() {
            return Err(Error::Validation(
                "Event type and description are required".into(),
            ));
        }

        let conn = self.conn.lock();
        if !Self::case_exists(&conn, case_id)? {
            return Err(Error::NotFound(format!("Case {case_id}")));
        }
        Self::insert_event(&conn, case_id, &event)
    }

    /// Audit events for a case, newest first.
    pub fn list_audit_events(&self, case_id: &str) -> Result<Vec<AuditEvent>> {
        let conn = self.conn.lock();
        Self::fetch_events(&conn, case_id)
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Dashboard counters. "Today" starts at UTC midnight; "this week" is
    /// the last seven days.
    pub fn stats(&self) -> Result<Stats> {
        let now = Utc::now();
        let midnight = Utc
            .from_utc_datetime(&now.date_naive().and_time(chrono::NaiveTime::MIN))
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let week_ago = (now - Duration::days(7)).to_rfc3339_opts(SecondsFormat::Millis, true);

        let conn = self.conn.lock();
        let count_since = |since: &str| -> Result<i64> {
            conn.query_row(
                "SELECT COUNT(*) FROM cases WHERE created_at >= ?1",
                params![since],
                |row| row.get(0),
            )
            .map_err(db)
        };
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))
            .map_err(db)?;
        let today = count_since(&midnight)?;
        let this_week = count_since(&week_ago)?;

        let mut by_status: BTreeMap<String, i64> = CaseStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        by_status.extend(Self::group_counts(&conn, "status")?);

        let mut by_priority: BTreeMap<String, i64> = Priority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        by_priority.extend(Self::group_counts(&conn, "priority")?);

        Ok(Stats {
            total,
            today,
            this_week,
            by_status,
            by_team: Self::group_counts(&conn, "owner_team")?,
            by_priority,
            by_doc_type: Self::group_counts(&conn, "doc_type")?,
        })
    }

    fn group_counts(conn: &Connection, column: &str) -> Result<BTreeMap<String, i64>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {column}, COUNT(*) FROM cases GROUP BY {column}"
            ))
            .map_err(db)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(db)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Connection-level helpers
    // ---------------------------------------------------------------

    fn find_id_by_hash(conn: &Connection, document_hash: &str) -> Result<Option<String>> {
        conn.prepare_cached("SELECT id FROM cases WHERE document_hash = ?1")
            .map_err(db)?
            .query_row(params![document_hash], |row| row.get(0))
            .optional()
            .map_err(db)
    }

    fn case_exists(conn: &Connection, id: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .prepare_cached("SELECT 1 FROM cases WHERE id = ?1")
            .map_err(db)?
            .query_row(params![id], |row| row.get(0))
            .optional()
            .map_err(db)?;
        Ok(found.is_some())
    }

    fn fetch_case(conn: &Connection, id: &str) -> Result<Option<Case>> {
        conn.prepare_cached("SELECT * FROM cases WHERE id = ?1")
            .map_err(db)?
            .query_row(params![id], |row| Ok(Self::row_to_case(row)))
            .optional()
            .map_err(db)
    }

    fn fetch_notes(conn: &Connection, case_id: &str) -> Result<Vec<Note>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM case_notes WHERE case_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(db)?;
        let rows = stmt
            .query_map(params![case_id], |row| Ok(Self::row_to_note(row)))
            .map_err(db)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn fetch_events(conn: &Connection, case_id: &str) -> Result<Vec<AuditEvent>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM audit_events WHERE case_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(db)?;
        let rows = stmt
            .query_map(params![case_id], |row| Ok(Self::row_to_event(row)))
            .map_err(db)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn insert_event(conn: &Connection, case_id: &str, event: &NewAuditEvent) -> Result<AuditEvent> {
        let actor = if event.actor.trim().is_empty() {
            "user".to_string()
        } else {
            event.actor.clone()
        };
        let stored = AuditEvent {
            id: Uuid::new_v4().to_string(),
            case_id: case_id.to_string(),
            created_at: now(),
            event_type: event.event_type,
            actor,
            description: event.description.clone(),
            metadata: event.metadata.clone(),
            changes: event.changes.clone(),
        };
        conn.execute(
            "INSERT INTO audit_events (id, case_id, created_at, event_type, actor, description, metadata, changes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stored.id,
                stored.case_id,
                stored.created_at,
                stored.event_type.as_str(),
                stored.actor,
                stored.description,
                stored.metadata.as_ref().map(to_json).transpose()?,
                stored.changes.as_ref().map(to_json).transpose()?,
            ],
        )
        .map_err(db)?;
        Ok(stored)
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    fn row_to_case(row: &rusqlite::Row<'_>) -> Case {
        Case {
            id: row.get("id").unwrap_or_default(),
            created_at: row.get("created_at").unwrap_or_default(),
            updated_at: row.get("updated_at").unwrap_or_default(),
            file_name: row.get("file_name").ok().flatten(),
            file_type: row.get("file_type").ok().flatten(),
            original_text: row.get("original_text").unwrap_or_default(),
            document_hash: row.get("document_hash").unwrap_or_default(),
            doc_type: enum_column(row, "doc_type"),
            summary: row.get("summary").unwrap_or_default(),
            entities: json_column(row, "entities").unwrap_or_default(),
            owner_team: enum_column(row, "owner_team"),
            priority: enum_column(row, "priority"),
            confidence: row.get("confidence").unwrap_or(0.0),
            ai_rationale: row.get("ai_rationale").unwrap_or_default(),
            missing_fields: json_column(row, "missing_fields").unwrap_or_default(),
            risk_flags: json_column(row, "risk_flags").unwrap_or_default(),
            compliance_issues: json_column(row, "compliance_issues"),
            checklist: json_column(row, "checklist").unwrap_or_default(),
            draft_email: json_column(row, "draft_email").unwrap_or_default(),
            suggested_actions: json_column(row, "suggested_actions").unwrap_or_default(),
            lease_fields: json_column(row, "lease_fields"),
            user_edits: json_column(row, "user_edits"),
            edited_fields: json_column(row, "edited_fields"),
            tags: json_column(row, "tags").unwrap_or_default(),
            status: enum_column(row, "status"),
            assigned_to: row.get("assigned_to").ok().flatten(),
        }
    }

    fn row_to_note(row: &rusqlite::Row<'_>) -> Note {
        Note {
            id: row.get("id").unwrap_or_default(),
            case_id: row.get("case_id").unwrap_or_default(),
            created_at: row.get("created_at").unwrap_or_default(),
            content: row.get("content").unwrap_or_default(),
            note_type: enum_column(row, "note_type"),
            author: row.get("author").unwrap_or_default(),
        }
    }

    fn row_to_event(row: &rusqlite::Row<'_>) -> AuditEvent {
        AuditEvent {
            id: row.get("id").unwrap_or_default(),
            case_id: row.get("case_id").unwrap_or_default(),
            created_at: row.get("created_at").unwrap_or_default(),
            event_type: enum_column(row, "event_type"),
            actor: row.get("actor").unwrap_or_default(),
            description: row.get("description").unwrap_or_default(),
            metadata: json_column(row, "metadata"),
            changes: json_column(row, "changes"),
        }
    }
}

/// JSON text column; NULL or unparseable text reads as `None`.
fn json_column<T: DeserializeOwned>(row: &rusqlite::Row<'_>, column: &str) -> Option<T> {
    row.get::<_, Option<String>>(column)
        .ok()
        .flatten()
        .and_then(|s| serde_json::from_str(&s).ok())
}

fn enum_column<T: FromStr + Default>(row: &rusqlite::Row<'_>, column: &str) -> T {
    row.get::<_, String>(column)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn note_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(NOTE_PREVIEW_CHARS).collect();
    if content.chars().count() > NOTE_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use docops_analyze::{mock_analysis, DocType, OwnerTeam, PartialAnalysis};
    use tempfile::TempDir;

    const INVOICE: &str = "INVOICE INV-2024-0315\nAmount due: $4,500.00 by March 15, 2024.\nPlease remit to billing@acme.com";
    const CONTRACT: &str = "This Agreement is entered into by the parties. Terms and conditions apply. Governing law: Delaware.";

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn new_case(text: &str) -> NewCase {
        NewCase {
            file_name: Some("doc.txt".into()),
            file_type: Some("txt".into()),
            original_text: text.to_string(),
            analysis: mock_analysis(text, None),
            user_edits: None,
            classification: None,
        }
    }

    #[test]
    fn test_create_and_get_case() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();

        assert_eq!(case.status, CaseStatus::New);
        assert_eq!(case.doc_type, DocType::Invoice);
        assert_eq!(case.document_hash, content_hash(INVOICE));
        assert!(case.entities.emails.contains(&"billing@acme.com".to_string()));
        assert!(case.user_edits.is_none());

        let detail = store.get_case(&case.id).unwrap().unwrap();
        assert_eq!(detail.case, case);
        assert!(detail.notes.is_empty());
        assert_eq!(detail.audit_events.len(), 1);
        let created = &detail.audit_events[0];
        assert_eq!(created.event_type, AuditEventType::Created);
        let meta = created.metadata.as_ref().unwrap();
        assert_eq!(meta["fileName"], "doc.txt");
        assert_eq!(meta["analysisResult"]["docType"], "invoice");

        assert!(store.get_case("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_document_hash() {
        let (store, _dir) = test_store();
        let first = store.create_case(new_case(INVOICE)).unwrap();
        let err = store.create_case(new_case(INVOICE)).unwrap_err();
        match err {
            Error::DuplicateContent(existing) => assert_eq!(existing, first.id),
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(store.count_cases().unwrap(), 1);
    }

    #[test]
    fn test_user_edits_and_classification_confirmation() {
        let (store, _dir) = test_store();
        let mut input = new_case(INVOICE);
        input.user_edits = Some(PartialAnalysis {
            summary: Some("Edited summary".into()),
            ..Default::default()
        });
        input.classification = Some(ClassificationConfirmation {
            owner_team: Some(OwnerTeam::Finance),
            priority: Some(Priority::Urgent),
            reason: Some("vendor escalation".into()),
            has_override: true,
            confirmed_at: Some("2025-01-01T00:00:00Z".into()),
        });

        let case = store.create_case(input).unwrap();
        assert_eq!(case.summary, "Edited summary");
        assert_eq!(case.owner_team, OwnerTeam::Finance);
        assert_eq!(case.priority, Priority::Urgent);
        assert_eq!(case.user_edits.as_ref().unwrap()["summary"], "Edited summary");
        let classification = &case.edited_fields.as_ref().unwrap()["classification"];
        assert_eq!(classification["ownerTeam"], "Finance");
        assert_eq!(classification["hasOverride"], true);

        let events = store.list_audit_events(&case.id).unwrap();
        assert_eq!(events.len(), 2);
        let edited = &events[0];
        assert_eq!(edited.event_type, AuditEventType::Edited);
        assert_eq!(edited.description, "Classification overridden");
        let changes = edited.changes.as_ref().unwrap();
        assert_eq!(changes["before"]["ownerTeam"], "AP");
        assert_eq!(changes["after"]["priority"], "urgent");
    }

    #[test]
    fn test_confirmation_without_timestamp_is_ignored() {
        let (store, _dir) = test_store();
        let mut input = new_case(INVOICE);
        input.classification = Some(ClassificationConfirmation {
            owner_team: Some(OwnerTeam::Legal),
            ..Default::default()
        });
        let case = store.create_case(input).unwrap();
        assert_eq!(case.owner_team, OwnerTeam::Ap);
        assert!(case.edited_fields.is_none());
        assert_eq!(store.list_audit_events(&case.id).unwrap().len(), 1);
    }

    #[test]
    fn test_list_filters_search_and_pagination() {
        let (store, _dir) = test_store();
        store.create_case(new_case(INVOICE)).unwrap();
        store.create_case(new_case(CONTRACT)).unwrap();
        for i in 0..3 {
            store
                .create_case(new_case(&format!("Meeting notes number {i}: agenda and attendees")))
                .unwrap();
        }

        let all = store.list_cases(&CaseFilter::default()).unwrap();
        assert_eq!(all.total, 5);
        assert_eq!(all.total_pages, 1);
        // Newest first by default.
        assert!(all.items[0].original_text.starts_with("Meeting notes number 2"));

        let legal = store
            .list_cases(&CaseFilter {
                team: Some(OwnerTeam::Legal),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(legal.total, 1);
        assert_eq!(legal.items[0].doc_type, DocType::Contract);

        let search = store
            .list_cases(&CaseFilter {
                search: Some("inv-2024".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(search.total, 1);

        let page = store
            .list_cases(&CaseFilter {
                page: 2,
                limit: 2,
                sort_order: SortOrder::Asc,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_size, 2);
        assert!(page.items[0].original_text.starts_with("Meeting notes number 0"));
    }

    #[test]
    fn test_list_page_beyond_range_is_empty() {
        let (store, _dir) = test_store();
        store.create_case(new_case(INVOICE)).unwrap();

        for page in [usize::MAX, usize::MAX / 2, 1 << 62] {
            let result = store
                .list_cases(&CaseFilter {
                    page,
                    limit: 100,
                    ..Default::default()
                })
                .unwrap();
            assert!(result.items.is_empty());
            assert_eq!(result.total, 1);
            assert_eq!(result.page, page);
        }
    }

    #[test]
    fn test_update_case_audit_event_types() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();

        let updated = store
            .update_case(
                &case.id,
                &CaseUpdate {
                    status: Some(CaseStatus::InProgress),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, CaseStatus::InProgress);

        let assigned = store
            .update_case(
                &case.id,
                &CaseUpdate {
                    assigned_to: Some("dana".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(assigned.assigned_to.as_deref(), Some("dana"));

        store
            .update_case(
                &case.id,
                &CaseUpdate {
                    summary: Some("New summary".into()),
                    change_reason: Some("Clarified summary".into()),
                    changes: Some(json!({"summary": {"before": "x", "after": "New summary"}})),
                    ..Default::default()
                },
            )
            .unwrap();

        let events = store.list_audit_events(&case.id).unwrap();
        let types: Vec<AuditEventType> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                AuditEventType::Edited,
                AuditEventType::Assigned,
                AuditEventType::StatusChanged,
                AuditEventType::Created,
            ]
        );
        assert_eq!(events[0].description, "Clarified summary");
        assert_eq!(events[0].metadata.as_ref().unwrap()["updatedFields"][0], "summary");
        assert!(events[0].changes.is_some());
        assert_eq!(events[2].description, "Status changed from new to in_progress");
    }

    #[test]
    fn test_update_case_errors() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();
        assert!(matches!(
            store.update_case(&case.id, &CaseUpdate::default()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.update_case(
                "missing",
                &CaseUpdate {
                    summary: Some("x".into()),
                    ..Default::default()
                }
            ),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_notes() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();
        let long = "a".repeat(60);

        let note = store
            .add_note(&case.id, &long, NoteType::Decision, None)
            .unwrap();
        assert_eq!(note.author, "User");
        assert_eq!(note.note_type, NoteType::Decision);
        store
            .add_note(&case.id, "short", NoteType::General, Some("ops"))
            .unwrap();

        let notes = store.list_notes(&case.id).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "short");

        let events = store.list_audit_events(&case.id).unwrap();
        assert_eq!(events[0].description, "Note added: short");
        assert_eq!(
            events[1].description,
            format!("Note added: {}...", "a".repeat(50))
        );
        assert_eq!(events[1].metadata.as_ref().unwrap()["noteId"], note.id);

        assert!(matches!(
            store.add_note(&case.id, "  ", NoteType::General, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.add_note("missing", "hi", NoteType::General, None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_audit_event() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();
        let event = store
            .add_audit_event(
                &case.id,
                NewAuditEvent::new(AuditEventType::EmailSent, "Sent reply to vendor")
                    .with_metadata(json!({"to": ["billing@acme.com"]})),
            )
            .unwrap();
        assert_eq!(event.actor, "user");
        assert_eq!(store.list_audit_events(&case.id).unwrap()[0], event);

        assert!(matches!(
            store.add_audit_event("missing", NewAuditEvent::new(AuditEventType::Edited, "x")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.add_audit_event(&case.id, NewAuditEvent::new(AuditEventType::Edited, "")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_delete_case_cascades() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();
        store
            .add_note(&case.id, "note", NoteType::General, None)
            .unwrap();

        assert!(store.delete_case(&case.id).unwrap());
        assert!(!store.delete_case(&case.id).unwrap());
        assert!(store.list_notes(&case.id).unwrap().is_empty());
        assert!(store.list_audit_events(&case.id).unwrap().is_empty());

        // The same document can be filed again once deleted.
        store.create_case(new_case(INVOICE)).unwrap();
    }

    #[test]
    fn test_stats() {
        let (store, _dir) = test_store();
        let empty = store.stats().unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.by_status.len(), 5);
        assert_eq!(empty.by_priority["urgent"], 0);
        assert!(empty.by_team.is_empty());

        let case = store.create_case(new_case(INVOICE)).unwrap();
        store.create_case(new_case(CONTRACT)).unwrap();
        store
            .update_case(
                &case.id,
                &CaseUpdate {
                    status: Some(CaseStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.today, 2);
        assert_eq!(stats.this_week, 2);
        assert_eq!(stats.by_status["new"], 1);
        assert_eq!(stats.by_status["resolved"], 1);
        assert_eq!(stats.by_status["archived"], 0);
        assert_eq!(stats.by_team["AP"], 1);
        assert_eq!(stats.by_team["Legal"], 1);
        assert_eq!(stats.by_doc_type["contract"], 1);
    }

    #[test]
    fn test_corrupt_json_columns_fall_back() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(INVOICE)).unwrap();
        {
            let conn = store.conn.lock();
            conn.execute(
                "UPDATE cases SET entities = 'not json', checklist = '{', status = 'bogus' WHERE id = ?1",
                params![case.id],
            )
            .unwrap();
        }
        let reloaded = store.get_case(&case.id).unwrap().unwrap().case;
        assert_eq!(reloaded.entities, Default::default());
        assert!(reloaded.checklist.is_empty());
        assert_eq!(reloaded.status, CaseStatus::New);
    }

    #[test]
    fn test_lease_fields_update_is_inferred() {
        let (store, _dir) = test_store();
        let case = store.create_case(new_case(CONTRACT)).unwrap();
        let updated = store
            .update_case(
                &case.id,
                &CaseUpdate {
                    lease_fields: Some(docops_analyze::LeaseFields {
                        effective_from: Some("01-Jan-2025".into()),
                        payment_period: Some("monthly".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        let lease = updated.lease_fields.unwrap();
        assert_eq!(lease.end_date.as_deref(), Some("01-Feb-2025"));
    }
}
