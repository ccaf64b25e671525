//! SQL schema for the Warden SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    is_active   INTEGER NOT NULL,  -- 0 | 1
    expires_at  TEXT,              -- RFC 3339 UTC; NULL means no expiry
    reference   TEXT,              -- JSON array of f32; NULL if not enrolled
    created_at  TEXT NOT NULL      -- RFC 3339 UTC; store-assigned
);

-- The audit trail is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- subject_id is deliberately not a foreign key: the trail outlives deleted
-- identities.
CREATE TABLE IF NOT EXISTS access_log (
    record_id   TEXT PRIMARY KEY,
    recorded_at TEXT NOT NULL,     -- RFC 3339 UTC; sink-assigned
    decision    TEXT NOT NULL,     -- 'GRANTED' | 'DENIED'
    reason      TEXT NOT NULL,     -- reason-code discriminant
    subject_id  TEXT,
    distance    REAL
);

CREATE INDEX IF NOT EXISTS access_log_subject_idx  ON access_log(subject_id);
CREATE INDEX IF NOT EXISTS access_log_recorded_idx ON access_log(recorded_at);
CREATE INDEX IF NOT EXISTS access_log_decision_idx ON access_log(decision);

PRAGMA user_version = 1;
";
