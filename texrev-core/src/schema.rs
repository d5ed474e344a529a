/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema.
///
/// - `documents`: one row per reviewed file, keyed by UUID v4 text; `content`
///   is the last authoritative text the store saw.
/// - `suggestions`: every proposal made against a document and how it ended.
///
/// Deleting a document cascades to its suggestions.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id          TEXT    PRIMARY KEY,
        path        TEXT    NOT NULL UNIQUE,
        content     TEXT    NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS suggestions (
        id             TEXT    PRIMARY KEY,
        document_id    TEXT    NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
        prompt         TEXT    NOT NULL,
        suggested_text TEXT    NOT NULL,
        status         TEXT    NOT NULL DEFAULT 'pending'
                               CHECK(status IN ('pending', 'accepted', 'rejected')),
        created_at     INTEGER NOT NULL,
        resolved_at    INTEGER
    ) STRICT;

    CREATE INDEX IF NOT EXISTS suggestions_by_document
        ON suggestions(document_id, created_at);
";

/// Runs forward-only schema migration to the latest version.
///
/// Idempotent: reads the current version (`0` when the table is empty) and
/// applies `SCHEMA_V1_SQL` inside `BEGIN IMMEDIATE` only when below 1.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
