use core_types::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("{entity} with the same {key} already exists")]
    DuplicateKey { entity: EntityKind, key: String },

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: EntityKind, id: i64 },

    #[error("{entity} references a record that does not exist ({constraint})")]
    ReferenceViolation { entity: EntityKind, constraint: String },

    #[error("The store is unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Maps a failed write on `entity` to the most specific variant.
    ///
    /// Unique and foreign-key violations are recognised by their SQLSTATE;
    /// pool and transport failures mean the store cannot be reached.
    pub fn from_write(err: sqlx::Error, entity: EntityKind, unique: &[&[&str]]) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some("23505") => {
                    return DbError::DuplicateKey {
                        entity,
                        key: unique_key(entity, unique, &constraint),
                    };
                }
                Some("23503") => {
                    return DbError::ReferenceViolation { entity, constraint };
                }
                _ => {}
            }
        }
        Self::from_read(err)
    }

    /// Maps a failed read, separating an unreachable store from other failures.
    pub fn from_read(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => DbError::Unavailable(err.to_string()),
            other => DbError::ConnectionError(other),
        }
    }

    /// True when the failure means the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::Unavailable(_))
    }
}

/// Unique indexes are named `<table>_<columns>_live`; recover the column list
/// for the message, or fall back to the raw constraint name.
fn unique_key(entity: EntityKind, unique: &[&[&str]], constraint: &str) -> String {
    unique
        .iter()
        .find(|columns| format!("{}_{}_live", entity.table(), columns.join("_")) == constraint)
        .map(|columns| columns.join(", "))
        .unwrap_or_else(|| constraint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_key_recovers_columns_from_index_name() {
        let unique: &[&[&str]] = &[&["team_id", "user_id"]];
        assert_eq!(
            unique_key(EntityKind::TeamMember, unique, "team_members_team_id_user_id_live"),
            "team_id, user_id"
        );
        assert_eq!(unique_key(EntityKind::User, &[], "users_pkey"), "users_pkey");
    }

    #[test]
    fn pool_failures_are_unavailable() {
        assert!(DbError::from_read(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(!DbError::from_read(sqlx::Error::RowNotFound).is_unavailable());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = DbError::DuplicateKey {
            entity: EntityKind::User,
            key: "username".into(),
        };
        assert_eq!(err.to_string(), "User with the same username already exists");
        let err = DbError::NotFound {
            entity: EntityKind::Schedule,
            id: 7,
        };
        assert_eq!(err.to_string(), "Schedule 7 not found");
    }
}
