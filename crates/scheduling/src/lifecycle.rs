use crate::dataset::{SeedCounts, insert_reference_data};
use crate::error::ServiceError;
use core_types::{EntityKind, Filter};
use database::{Store, StoreTx};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Row count of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCount {
    pub kind: EntityKind,
    pub table: &'static str,
    pub rows: u64,
}

fn summarize(counts: &SeedCounts) -> Vec<TableCount> {
    EntityKind::ALL
        .iter()
        .map(|kind| TableCount {
            kind: *kind,
            table: kind.table(),
            rows: counts.get(kind).copied().unwrap_or_default(),
        })
        .collect()
}

/// Moves the store between its two well-defined states: empty, and holding
/// exactly the reference dataset. Each operation is one transaction.
#[derive(Debug, Clone)]
pub struct Lifecycle<S> {
    store: S,
}

impl<S: Store> Lifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Deletes every row of every table and restarts the id counters.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), ServiceError> {
        let mut tx = self.store.begin().await?;
        tx.lock_all().await?;
        tx.purge_all().await?;
        tx.commit().await?;
        info!("store reset");
        Ok(())
    }

    /// Writes the reference dataset into an empty store.
    ///
    /// Fails with `AlreadySeeded` and writes nothing when any table already
    /// holds rows, soft-deleted ones included.
    #[instrument(skip(self))]
    pub async fn seed(&self) -> Result<Vec<TableCount>, ServiceError> {
        let mut tx = self.store.begin().await?;
        // Concurrent seeds and creates wait here, so the emptiness check holds until commit.
        tx.lock_all().await?;
        for kind in EntityKind::ALL {
            let rows = tx.count(kind, &Filter::new().with_deleted()).await?;
            if rows > 0 {
                warn!(%kind, rows, "seed rejected, store is not empty");
                return Err(ServiceError::AlreadySeeded { kind, rows });
            }
        }
        let counts = insert_reference_data(&mut tx).await?;
        tx.commit().await?;
        info!(rows = counts.values().sum::<u64>(), "store seeded");
        Ok(summarize(&counts))
    }

    /// Empties the store and writes the reference dataset in one transaction.
    #[instrument(skip(self))]
    pub async fn reset_and_seed(&self) -> Result<Vec<TableCount>, ServiceError> {
        let mut tx = self.store.begin().await?;
        tx.lock_all().await?;
        tx.purge_all().await?;
        let counts = insert_reference_data(&mut tx).await?;
        tx.commit().await?;
        info!(rows = counts.values().sum::<u64>(), "store reset and seeded");
        Ok(summarize(&counts))
    }

    /// Live rows per table, parents first.
    pub async fn status(&self) -> Result<Vec<TableCount>, ServiceError> {
        let mut counts = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let rows = self.store.count_rows(kind, &Filter::new()).await?;
            counts.push(TableCount {
                kind,
                table: kind.table(),
                rows,
            });
        }
        Ok(counts)
    }
}
