//! Dependency-guarded deletes.
//!
//! A record may only be deleted while nothing live points at it. The count
//! and the delete run in one transaction with the target row locked, and
//! every insert locks the parents it references, so no dependent can slip in
//! between the check and the delete.

use crate::error::ServiceError;
use core_types::{EntityKind, Filter, Value, WEEKDAY_COLUMNS};
use database::{Store, StoreTx, Stored};
use tracing::{info, warn};

/// One blocking relationship: rows of `kind` whose `columns` may hold the id
/// of the record being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent {
    /// Name used in the conflict message, e.g. "shifts".
    pub relationship: &'static str,
    pub kind: EntityKind,
    /// Any match among these columns counts as a reference.
    pub columns: &'static [&'static str],
}

const SHIFT_TYPE_DEPENDENTS: &[Dependent] = &[
    Dependent {
        relationship: "shifts",
        kind: EntityKind::Shift,
        columns: &["shift_type_id"],
    },
    Dependent {
        relationship: "shift templates",
        kind: EntityKind::ShiftTemplate,
        columns: WEEKDAY_COLUMNS,
    },
];

const TEAM_DEPENDENTS: &[Dependent] = &[
    Dependent {
        relationship: "users",
        kind: EntityKind::User,
        columns: &["team_id"],
    },
    Dependent {
        relationship: "team members",
        kind: EntityKind::TeamMember,
        columns: &["team_id"],
    },
    Dependent {
        relationship: "shift types",
        kind: EntityKind::ShiftType,
        columns: &["team_id"],
    },
];

const DEPARTMENT_DEPENDENTS: &[Dependent] = &[Dependent {
    relationship: "users",
    kind: EntityKind::User,
    columns: &["department_id"],
}];

const USER_DEPENDENTS: &[Dependent] = &[
    Dependent {
        relationship: "shifts",
        kind: EntityKind::Shift,
        columns: &["user_id"],
    },
    Dependent {
        relationship: "team memberships",
        kind: EntityKind::TeamMember,
        columns: &["user_id"],
    },
];

const SCHEDULE_DEPENDENTS: &[Dependent] = &[Dependent {
    relationship: "shifts",
    kind: EntityKind::Shift,
    columns: &["schedule_id"],
}];

/// The relationships that block deleting a record of `kind`, in check order.
pub fn dependents_of(kind: EntityKind) -> &'static [Dependent] {
    match kind {
        EntityKind::ShiftType => SHIFT_TYPE_DEPENDENTS,
        EntityKind::Team => TEAM_DEPENDENTS,
        EntityKind::Department => DEPARTMENT_DEPENDENTS,
        EntityKind::User => USER_DEPENDENTS,
        EntityKind::Schedule => SCHEDULE_DEPENDENTS,
        EntityKind::ShiftTemplate | EntityKind::Shift | EntityKind::TeamMember => &[],
    }
}

/// Live rows of `dependent` that point at `id`.
pub async fn count_dependents<T: StoreTx>(
    tx: &mut T,
    dependent: &Dependent,
    id: i64,
) -> Result<u64, ServiceError> {
    let filter = Filter::new().any_eq(dependent.columns, Value::id(id));
    Ok(tx.count(dependent.kind, &filter).await?)
}

/// Fails with `DependencyConflict` on the first relationship that still has rows.
pub async fn ensure_unreferenced<T: StoreTx>(
    tx: &mut T,
    kind: EntityKind,
    id: i64,
) -> Result<(), ServiceError> {
    for dependent in dependents_of(kind) {
        let count = count_dependents(tx, dependent, id).await?;
        if count > 0 {
            warn!(
                entity = %kind,
                id,
                relationship = dependent.relationship,
                count,
                "delete blocked by dependents"
            );
            return Err(ServiceError::DependencyConflict {
                entity: kind,
                relationship: dependent.relationship,
                count,
            });
        }
    }
    Ok(())
}

/// Soft-deletes `id` if nothing live references it.
pub async fn guarded_delete<S: Store, E: Stored>(store: &S, id: i64) -> Result<(), ServiceError> {
    let mut tx = store.begin().await?;
    tx.lock::<E>(id).await?;
    ensure_unreferenced(&mut tx, E::KIND, id).await?;
    tx.soft_delete::<E>(id).await?;
    tx.commit().await?;
    info!(entity = %E::KIND, id, "record deleted");
    Ok(())
}
