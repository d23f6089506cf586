use crate::error::DbError;
use crate::memory::{Table, Tables};
use async_trait::async_trait;
use core_types::{
    Department, Entity, EntityKind, Filter, Schedule, Shift, ShiftTemplate, ShiftType, Sort, Team,
    TeamMember, User, Window,
};

/// A persisted entity. Ties each record type to its in-memory table so both
/// store implementations can be driven by the same generic calls.
pub trait Stored: Entity {
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

macro_rules! stored {
    ($($entity:ty => $field:ident),* $(,)?) => {
        $(
            impl Stored for $entity {
                fn table(tables: &Tables) -> &Table<Self> {
                    &tables.$field
                }

                fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                    &mut tables.$field
                }
            }
        )*
    };
}

stored! {
    Department => departments,
    Team => teams,
    User => users,
    ShiftType => shift_types,
    ShiftTemplate => shift_templates,
    Schedule => schedules,
    Shift => shifts,
    TeamMember => team_members,
}

/// Read access plus the ability to open a unit of work.
///
/// Reads never see soft-deleted rows unless the filter asks for them.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    /// Opens a transaction. Dropping it without `commit` rolls it back.
    async fn begin(&self) -> Result<Self::Tx, DbError>;

    /// Matching rows in `sort` order, windowed, together with the unwindowed total.
    async fn find<E: Stored>(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: Option<Window>,
    ) -> Result<(Vec<E>, u64), DbError>;

    /// A live row by id.
    async fn find_by_id<E: Stored>(&self, id: i64) -> Result<E, DbError>;

    async fn count<E: Stored>(&self, filter: &Filter) -> Result<u64, DbError>;

    /// Counts rows of a kind chosen at runtime.
    async fn count_rows(&self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError>;

    /// Fails with `Unavailable` when the store cannot be reached.
    async fn ping(&self) -> Result<(), DbError>;
}

/// A unit of work. Everything done through one `StoreTx` becomes visible
/// atomically on `commit`.
#[async_trait]
pub trait StoreTx: Send {
    /// Reads a live row and holds it against concurrent writers until the
    /// transaction ends.
    async fn lock<E: Stored>(&mut self, id: i64) -> Result<E, DbError>;

    /// Stores a new record and returns it with its id and timestamps. Every
    /// referenced parent must be live; it stays locked against deletion until
    /// the transaction ends.
    async fn insert<E: Stored>(&mut self, record: E) -> Result<E, DbError>;

    /// Overwrites the writable columns of a live record.
    async fn update<E: Stored>(&mut self, record: E) -> Result<E, DbError>;

    /// Marks a live record deleted. Returns the number of rows affected.
    async fn soft_delete<E: Stored>(&mut self, id: i64) -> Result<u64, DbError>;

    async fn count(&mut self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError>;

    /// Blocks every other writer on every table until the transaction ends.
    /// Concurrent callers of this method run one after the other.
    async fn lock_all(&mut self) -> Result<(), DbError>;

    /// Removes every row of every table, children first, and restarts the id counters.
    async fn purge_all(&mut self) -> Result<(), DbError>;

    async fn commit(self) -> Result<(), DbError>;
}
