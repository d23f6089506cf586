//! In-memory store.
//!
//! All tables sit behind one `tokio::sync::RwLock`. Reads take the shared
//! lock. A transaction takes the exclusive lock for its whole lifetime and
//! works on a copy of the tables that replaces the original on commit, so an
//! abandoned transaction leaves nothing behind.

use crate::error::DbError;
use crate::store::{Store, StoreTx, Stored};
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    Department, Entity, EntityKind, Filter, Schedule, Shift, ShiftTemplate, ShiftType, Sort, Team,
    TeamMember, User, Value, Window,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

/// Rows of one kind keyed by id, plus the next id to hand out.
#[derive(Debug, Clone)]
pub struct Table<E> {
    rows: BTreeMap<i64, E>,
    next_id: i64,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> Table<E> {
    fn live(&self, id: i64) -> Option<&E> {
        self.rows.get(&id).filter(|row| !row.audit().is_deleted())
    }

    fn count(&self, filter: &Filter) -> u64 {
        self.rows.values().filter(|row| filter.matches(*row)).count() as u64
    }

    fn find(&self, filter: &Filter, sort: &Sort, window: Option<Window>) -> (Vec<E>, u64) {
        let mut matching: Vec<E> = self
            .rows
            .values()
            .filter(|row| filter.matches(*row))
            .cloned()
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));
        let total = matching.len() as u64;
        match window {
            Some(window) => (window.slice(&matching), total),
            None => (matching, total),
        }
    }

    /// Fails when a live row other than `record` shares one of its unique keys.
    fn check_unique(&self, record: &E) -> Result<(), DbError> {
        for columns in E::UNIQUE {
            let key: Vec<Option<Value>> = columns.iter().map(|c| record.column(c)).collect();
            let taken = self.rows.values().any(|row| {
                row.id() != record.id()
                    && !row.audit().is_deleted()
                    && columns.iter().map(|c| row.column(c)).eq(key.iter().cloned())
            });
            if taken {
                return Err(DbError::DuplicateKey {
                    entity: E::KIND,
                    key: columns.join(", "),
                });
            }
        }
        Ok(())
    }
}

/// Every domain table.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) departments: Table<Department>,
    pub(crate) teams: Table<Team>,
    pub(crate) users: Table<User>,
    pub(crate) shift_types: Table<ShiftType>,
    pub(crate) shift_templates: Table<ShiftTemplate>,
    pub(crate) schedules: Table<Schedule>,
    pub(crate) shifts: Table<Shift>,
    pub(crate) team_members: Table<TeamMember>,
}

impl Tables {
    fn count_kind(&self, kind: EntityKind, filter: &Filter) -> u64 {
        match kind {
            EntityKind::Department => self.departments.count(filter),
            EntityKind::Team => self.teams.count(filter),
            EntityKind::User => self.users.count(filter),
            EntityKind::ShiftType => self.shift_types.count(filter),
            EntityKind::ShiftTemplate => self.shift_templates.count(filter),
            EntityKind::Schedule => self.schedules.count(filter),
            EntityKind::Shift => self.shifts.count(filter),
            EntityKind::TeamMember => self.team_members.count(filter),
        }
    }

    fn is_live(&self, kind: EntityKind, id: i64) -> bool {
        match kind {
            EntityKind::Department => self.departments.live(id).is_some(),
            EntityKind::Team => self.teams.live(id).is_some(),
            EntityKind::User => self.users.live(id).is_some(),
            EntityKind::ShiftType => self.shift_types.live(id).is_some(),
            EntityKind::ShiftTemplate => self.shift_templates.live(id).is_some(),
            EntityKind::Schedule => self.schedules.live(id).is_some(),
            EntityKind::Shift => self.shifts.live(id).is_some(),
            EntityKind::TeamMember => self.team_members.live(id).is_some(),
        }
    }

    fn check_references<E: Entity>(&self, record: &E) -> Result<(), DbError> {
        for (entity, id) in record.references() {
            if !self.is_live(entity, id) {
                return Err(DbError::MissingReference { entity, id });
            }
        }
        Ok(())
    }
}

/// The in-memory deployment of the store. Cheap to clone; clones share tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), DbError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, DbError> {
        self.ensure_available()?;
        let guard = self.tables.clone().write_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }

    async fn find<E: Stored>(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: Option<Window>,
    ) -> Result<(Vec<E>, u64), DbError> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        debug!(table = E::KIND.table(), "memory find");
        Ok(E::table(&tables).find(filter, sort, window))
    }

    async fn find_by_id<E: Stored>(&self, id: i64) -> Result<E, DbError> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        E::table(&tables)
            .live(id)
            .cloned()
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })
    }

    async fn count<E: Stored>(&self, filter: &Filter) -> Result<u64, DbError> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(E::table(&tables).count(filter))
    }

    async fn count_rows(&self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables.count_kind(kind, filter))
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.ensure_available()
    }
}

/// A unit of work over a private copy of the tables.
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedRwLockWriteGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock<E: Stored>(&mut self, id: i64) -> Result<E, DbError> {
        // The exclusive guard already keeps every row away from other writers.
        E::table(&self.work)
            .live(id)
            .cloned()
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })
    }

    async fn insert<E: Stored>(&mut self, mut record: E) -> Result<E, DbError> {
        self.work.check_references(&record)?;
        let table = E::table_mut(&mut self.work);
        let now = Utc::now();
        {
            let audit = record.audit_mut();
            audit.id = table.next_id;
            audit.created_at = now;
            audit.updated_at = now;
            audit.deleted_at = None;
        }
        table.check_unique(&record)?;
        table.next_id += 1;
        table.rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update<E: Stored>(&mut self, mut record: E) -> Result<E, DbError> {
        self.work.check_references(&record)?;
        let table = E::table_mut(&mut self.work);
        let id = record.id();
        let created_at = table
            .live(id)
            .map(|existing| existing.audit().created_at)
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })?;
        {
            let audit = record.audit_mut();
            audit.created_at = created_at;
            audit.updated_at = Utc::now();
            audit.deleted_at = None;
        }
        table.check_unique(&record)?;
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn soft_delete<E: Stored>(&mut self, id: i64) -> Result<u64, DbError> {
        let table = E::table_mut(&mut self.work);
        match table.rows.get_mut(&id) {
            Some(row) if !row.audit().is_deleted() => {
                let now = Utc::now();
                let audit = row.audit_mut();
                audit.deleted_at = Some(now);
                audit.updated_at = now;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn count(&mut self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError> {
        Ok(self.work.count_kind(kind, filter))
    }

    async fn lock_all(&mut self) -> Result<(), DbError> {
        // The transaction already holds the only write guard.
        Ok(())
    }

    async fn purge_all(&mut self) -> Result<(), DbError> {
        self.work = Tables::default();
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        let MemoryTx { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}
