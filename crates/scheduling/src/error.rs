use core_types::EntityKind;
use database::DbError;
use thiserror::Error;

/// Every way a scheduling operation can be rejected.
///
/// The display text of each variant is the single human-readable message
/// surfaced to clients.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{}", primary(.messages))]
    Validation { messages: Vec<String> },

    #[error("{entity} still referenced by {count} {relationship}")]
    DependencyConflict {
        entity: EntityKind,
        relationship: &'static str,
        count: u64,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("{entity} with the same {key} already exists")]
    DuplicateKey { entity: EntityKind, key: String },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store already seeded: {kind} holds {rows} rows")]
    AlreadySeeded { kind: EntityKind, rows: u64 },

    #[error("Storage error: {0}")]
    Storage(DbError),
}

fn primary(messages: &[String]) -> &str {
    messages.first().map(String::as_str).unwrap_or("validation failed")
}

impl ServiceError {
    /// The one message a client sees, taken from the first failing rule when
    /// several failed.
    pub fn primary_message(&self) -> String {
        self.to_string()
    }

    /// A stable machine-readable tag for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "validation",
            ServiceError::DependencyConflict { .. } => "dependency_conflict",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::DuplicateKey { .. } => "duplicate_key",
            ServiceError::InvalidReference(_) => "invalid_reference",
            ServiceError::StoreUnavailable(_) => "store_unavailable",
            ServiceError::AlreadySeeded { .. } => "already_seeded",
            ServiceError::Storage(_) => "storage",
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::DuplicateKey { entity, key } => ServiceError::DuplicateKey { entity, key },
            DbError::MissingReference { .. } | DbError::ReferenceViolation { .. } => {
                ServiceError::InvalidReference(err.to_string())
            }
            DbError::Unavailable(reason) => ServiceError::StoreUnavailable(reason),
            other => ServiceError::Storage(other),
        }
    }
}
