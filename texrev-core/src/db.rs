use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::types::Type;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::types::{DocumentRecord, SuggestionRecord, SuggestionStatus};

/// How a pending suggestion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    Rejected,
}

impl Resolution {
    fn status(self) -> SuggestionStatus {
        match self {
            Resolution::Accepted => SuggestionStatus::Accepted,
            Resolution::Rejected => SuggestionStatus::Rejected,
        }
    }
}

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// `busy_timeout` is set through the `Connection` method rather than a PRAGMA
/// string so it takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok(())
    })
    .await?;

    // Fold any WAL left behind by a previous run back into the main file.
    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await?;

    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    debug!(path, "document store opened");
    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn document_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: r.get(0)?,
        path: r.get(1)?,
        content: r.get(2)?,
        created_at: r.get(3)?,
        updated_at: r.get(4)?,
    })
}

fn suggestion_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<SuggestionRecord> {
    let status: String = r.get(4)?;
    let status = SuggestionStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown suggestion status '{status}'").into(),
        )
    })?;
    Ok(SuggestionRecord {
        id: r.get(0)?,
        document_id: r.get(1)?,
        prompt: r.get(2)?,
        suggested_text: r.get(3)?,
        status,
        created_at: r.get(5)?,
        resolved_at: r.get(6)?,
    })
}

/// Loads the stored document for `path`, if any.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn load_document(
    conn: &Connection,
    path: &str,
) -> Result<Option<DocumentRecord>, tokio_rusqlite::Error> {
    let path = path.to_owned();

    conn.call(move |db| {
        let doc = db
            .query_row(
                "SELECT id, path, content, created_at, updated_at
                 FROM documents WHERE path = ?1",
                rusqlite::params![&path],
                document_from_row,
            )
            .optional()?;
        Ok(doc)
    })
    .await
}

/// Finds the document stored for `path`, or creates it.
///
/// An existing row has its `content` brought up to date with `content` (the
/// file on disk is authoritative when a review starts). Both branches write
/// inside `BEGIN IMMEDIATE`.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query or write transaction fails.
pub async fn detect_or_create_document(
    conn: &Connection,
    path: &str,
    content: &str,
) -> Result<DocumentRecord, tokio_rusqlite::Error> {
    let path = path.to_owned();
    let content = content.to_owned();

    conn.call(move |db| {
        let existing: Option<DocumentRecord> = db
            .query_row(
                "SELECT id, path, content, created_at, updated_at
                 FROM documents WHERE path = ?1",
                rusqlite::params![&path],
                document_from_row,
            )
            .optional()?;

        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let doc = match existing {
            Some(mut doc) => {
                tx.execute(
                    "UPDATE documents SET content = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![&content, now, &doc.id],
                )?;
                doc.content = content;
                doc.updated_at = now;
                doc
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO documents (id, path, content, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    rusqlite::params![&id, &path, &content, now],
                )?;
                DocumentRecord { id, path, content, created_at: now, updated_at: now }
            }
        };
        tx.commit()?;
        Ok(doc)
    })
    .await
}

/// Overwrites the stored content of `document_id`.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the `BEGIN IMMEDIATE` transaction fails.
pub async fn update_document_content(
    conn: &Connection,
    document_id: &str,
    content: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let document_id = document_id.to_owned();
    let content = content.to_owned();

    conn.call(move |db| {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE documents SET content = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![&content, now_secs(), &document_id],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await
}

/// Stores a new pending suggestion for `document_id` and returns its id.
///
/// Any suggestion still pending for the same document is marked `rejected`
/// first, so at most one row per document is ever pending.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the write transaction fails (including a
/// foreign-key failure for an unknown document).
pub async fn record_suggestion(
    conn: &Connection,
    document_id: &str,
    prompt: &str,
    suggested_text: &str,
) -> Result<String, tokio_rusqlite::Error> {
    let document_id = document_id.to_owned();
    let prompt = prompt.to_owned();
    let suggested_text = suggested_text.to_owned();

    conn.call(move |db| {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE suggestions SET status = 'rejected', resolved_at = ?1
             WHERE document_id = ?2 AND status = 'pending'",
            rusqlite::params![now, &document_id],
        )?;
        tx.execute(
            "INSERT INTO suggestions
                 (id, document_id, prompt, suggested_text, status, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
            rusqlite::params![&id, &document_id, &prompt, &suggested_text, now],
        )?;
        tx.commit()?;
        Ok(id)
    })
    .await
}

/// Resolves a pending suggestion.
///
/// On `Accepted` the owning document's content becomes the suggestion text in
/// the same transaction. Returns `false` without writing anything when the
/// suggestion does not exist or was already resolved.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the `BEGIN IMMEDIATE` transaction fails.
pub async fn resolve_suggestion(
    conn: &Connection,
    suggestion_id: &str,
    resolution: Resolution,
) -> Result<bool, tokio_rusqlite::Error> {
    let suggestion_id = suggestion_id.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE suggestions SET status = ?1, resolved_at = ?2
             WHERE id = ?3 AND status = 'pending'",
            rusqlite::params![resolution.status().as_str(), now, &suggestion_id],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        if resolution == Resolution::Accepted {
            tx.execute(
                "UPDATE documents
                 SET content = (SELECT suggested_text FROM suggestions WHERE id = ?1),
                     updated_at = ?2
                 WHERE id = (SELECT document_id FROM suggestions WHERE id = ?1)",
                rusqlite::params![&suggestion_id, now],
            )?;
        }
        tx.commit()?;
        Ok(true)
    })
    .await
}

/// Loads every suggestion made against `document_id`, oldest first.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails or a row carries an
/// unknown status.
pub async fn load_suggestions(
    conn: &Connection,
    document_id: &str,
) -> Result<Vec<SuggestionRecord>, tokio_rusqlite::Error> {
    let document_id = document_id.to_owned();

    conn.call(move |db| {
        let mut stmt = db.prepare(
            "SELECT id, document_id, prompt, suggested_text, status, created_at, resolved_at
             FROM suggestions
             WHERE document_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![&document_id], suggestion_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    })
    .await
}
