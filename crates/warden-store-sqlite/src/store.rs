//! [`SqliteStore`] — the SQLite implementation of [`IdentityDirectory`] and
//! [`AuditSink`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use warden_core::{
  identity::{IdentityRecord, IdentityUpdate, NewIdentity},
  outcome::{AuditRecord, NewAuditRecord},
  store::{AuditQuery, AuditSink, IdentityDirectory},
};

use crate::{
  Error, Result,
  encode::{
    RawAuditRecord, RawIdentity, encode_descriptor, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Warden identity directory and audit sink backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`IdentityRecord`] into the `identities` table.
  async fn insert_identity(&self, record: &IdentityRecord) -> Result<()> {
    let id_str         = encode_uuid(record.id);
    let name           = record.name.clone();
    let email          = record.email.clone();
    let is_active      = record.is_active;
    let expires_at_str = record.expires_at.map(encode_dt);
    let reference_str  = record
      .reference
      .as_ref()
      .map(encode_descriptor)
      .transpose()?;
    let created_at_str = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (
             identity_id, name, email, is_active, expires_at, reference,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            name,
            email,
            is_active,
            expires_at_str,
            reference_str,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── IdentityDirectory impl ──────────────────────────────────────────────────

impl IdentityDirectory for SqliteStore {
  type Error = Error;

  async fn resolve(&self, id: Uuid) -> Result<Option<IdentityRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT identity_id, name, email, is_active, expires_at,
                    reference, created_at
             FROM identities WHERE identity_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawIdentity {
                identity_id: row.get(0)?,
                name:        row.get(1)?,
                email:       row.get(2)?,
                is_active:   row.get(3)?,
                expires_at:  row.get(4)?,
                reference:   row.get(5)?,
                created_at:  row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawIdentity::into_record).transpose()
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>> {
    let email = email.to_owned();

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT identity_id, name, email, is_active, expires_at,
                    reference, created_at
             FROM identities WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok(RawIdentity {
                identity_id: row.get(0)?,
                name:        row.get(1)?,
                email:       row.get(2)?,
                is_active:   row.get(3)?,
                expires_at:  row.get(4)?,
                reference:   row.get(5)?,
                created_at:  row.get(6)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawIdentity::into_record).transpose()
  }

  async fn create(&self, input: NewIdentity) -> Result<IdentityRecord> {
    let record = IdentityRecord {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      is_active:  input.is_active,
      expires_at: input.expires_at,
      reference:  input.reference,
      created_at: Utc::now(),
    };

    self.insert_identity(&record).await?;
    Ok(record)
  }

  async fn update(
    &self,
    id: Uuid,
    update: IdentityUpdate,
  ) -> Result<Option<IdentityRecord>> {
    let mut record = match self.resolve(id).await? {
      Some(record) => record,
      None => return Ok(None),
    };

    if let Some(name) = update.name {
      record.name = name;
    }
    if let Some(email) = update.email {
      record.email = email;
    }
    if let Some(is_active) = update.is_active {
      record.is_active = is_active;
    }
    if let Some(expires_at) = update.expires_at {
      record.expires_at = Some(expires_at);
    }
    if let Some(reference) = update.reference {
      record.reference = Some(reference);
    }

    let id_str         = encode_uuid(record.id);
    let name           = record.name.clone();
    let email          = record.email.clone();
    let is_active      = record.is_active;
    let expires_at_str = record.expires_at.map(encode_dt);
    let reference_str  = record
      .reference
      .as_ref()
      .map(encode_descriptor)
      .transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE identities
           SET name = ?2, email = ?3, is_active = ?4, expires_at = ?5,
               reference = ?6
           WHERE identity_id = ?1",
          rusqlite::params![
            id_str,
            name,
            email,
            is_active,
            expires_at_str,
            reference_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(Some(record))
  }

  async fn remove(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM identities WHERE identity_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn list(&self) -> Result<Vec<IdentityRecord>> {
    let raws: Vec<RawIdentity> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT identity_id, name, email, is_active, expires_at,
                  reference, created_at
           FROM identities ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawIdentity {
              identity_id: row.get(0)?,
              name:        row.get(1)?,
              email:       row.get(2)?,
              is_active:   row.get(3)?,
              expires_at:  row.get(4)?,
              reference:   row.get(5)?,
              created_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_record).collect()
  }
}

// ─── AuditSink impl ──────────────────────────────────────────────────────────

impl AuditSink for SqliteStore {
  type Error = Error;

  async fn append(&self, input: NewAuditRecord) -> Result<AuditRecord> {
    let record = AuditRecord {
      record_id:   Uuid::new_v4(),
      recorded_at: Utc::now(),
      decision:    input.decision,
      reason:      input.reason,
      subject_id:  input.subject_id,
      distance:    input.distance,
    };

    let record_id_str   = encode_uuid(record.record_id);
    let recorded_at_str = encode_dt(record.recorded_at);
    let decision_str    = record.decision.as_str();
    let reason_str      = record.reason.as_str();
    let subject_id_str  = record.subject_id.map(encode_uuid);
    let distance_val    = record.distance.map(f64::from);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO access_log (
             record_id, recorded_at, decision, reason, subject_id, distance
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            record_id_str,
            recorded_at_str,
            decision_str,
            reason_str,
            subject_id_str,
            distance_val,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>> {
    let decision_str = query.decision.map(|d| d.as_str().to_owned());
    let reason_str   = query.reason.map(|r| r.as_str().to_owned());
    let subject_str  = query.subject_id.map(encode_uuid);
    let after_str    = query.recorded_after.map(encode_dt);
    let before_str   = query.recorded_before.map(encode_dt);
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawAuditRecord> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if decision_str.is_some() {
          conds.push("decision = ?1");
        }
        if reason_str.is_some() {
          conds.push("reason = ?2");
        }
        if subject_str.is_some() {
          conds.push("subject_id = ?3");
        }
        if after_str.is_some() {
          conds.push("recorded_at >= ?4");
        }
        if before_str.is_some() {
          conds.push("recorded_at <= ?5");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT record_id, recorded_at, decision, reason, subject_id,
                  distance
           FROM access_log
           {where_clause}
           ORDER BY recorded_at DESC
           LIMIT ?6 OFFSET ?7"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              decision_str.as_deref(),
              reason_str.as_deref(),
              subject_str.as_deref(),
              after_str.as_deref(),
              before_str.as_deref(),
              limit_val,
              offset_val,
            ],
            |row| {
              Ok(RawAuditRecord {
                record_id:   row.get(0)?,
                recorded_at: row.get(1)?,
                decision:    row.get(2)?,
                reason:      row.get(3)?,
                subject_id:  row.get(4)?,
                distance:    row.get(5)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditRecord::into_record).collect()
  }
}
