use crate::enums::EntityKind;
use crate::query::{Sort, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use std::fmt::Debug;

/// Identity, audit timestamps and the soft-delete marker shared by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Audit {
    /// Audit block for a record that has not been stored yet. The store
    /// assigns the id and both timestamps on insert.
    pub fn pending() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// The audit columns every table carries, in addition to `Entity::COLUMNS`.
pub const AUDIT_COLUMNS: &[&str] = &["id", "created_at", "updated_at", "deleted_at"];

/// A record the storage layer knows how to persist, filter and order.
///
/// `COLUMNS` lists the writable columns in bind order; `field` must answer for
/// each of them so that the in-memory store and the SQL store see the same data.
pub trait Entity:
    Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + Unpin
    + 'static
    + for<'r> FromRow<'r, PgRow>
{
    const KIND: EntityKind;

    /// Writable columns in bind order. Excludes `id` and the audit columns.
    const COLUMNS: &'static [&'static str];

    /// Column sets that must be unique among live (not soft-deleted) rows.
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    /// The stable ordering used for collections of this kind.
    fn default_sort() -> Sort;

    fn audit(&self) -> &Audit;

    fn audit_mut(&mut self) -> &mut Audit;

    /// Value of one of `COLUMNS`, or `None` for an unknown column.
    fn field(&self, column: &str) -> Option<Value>;

    /// The records this one points at, as `(kind, id)` pairs.
    fn references(&self) -> Vec<(EntityKind, i64)> {
        Vec::new()
    }

    fn id(&self) -> i64 {
        self.audit().id
    }

    /// Value of any column, audit columns included.
    fn column(&self, column: &str) -> Option<Value> {
        let audit = self.audit();
        match column {
            "id" => Some(Value::BigInt(Some(audit.id))),
            "created_at" => Some(Value::Timestamp(Some(audit.created_at))),
            "updated_at" => Some(Value::Timestamp(Some(audit.updated_at))),
            "deleted_at" => Some(Value::Timestamp(audit.deleted_at)),
            other => self.field(other),
        }
    }

    /// Values of `COLUMNS`, in bind order.
    fn values(&self) -> Vec<Value> {
        Self::COLUMNS
            .iter()
            .map(|column| self.field(column).unwrap_or(Value::Text(None)))
            .collect()
    }
}
