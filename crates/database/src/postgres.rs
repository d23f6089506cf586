use crate::error::DbError;
use crate::store::{Store, StoreTx, Stored};
use async_trait::async_trait;
use core_types::{Condition, Entity, EntityKind, Filter, Sort, Value, Window};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

/// The PostgreSQL deployment of the store. It encapsulates all SQL and holds
/// the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Binds a typed value. Nulls are bound with their column type.
fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &Value) {
    match value.clone() {
        Value::Bool(v) => builder.push_bind(v),
        Value::Int(v) => builder.push_bind(v),
        Value::BigInt(v) => builder.push_bind(v),
        Value::Text(v) => builder.push_bind(v),
        Value::Date(v) => builder.push_bind(v),
        Value::Time(v) => builder.push_bind(v),
        Value::Timestamp(v) => builder.push_bind(v),
    };
}

/// Appends the `WHERE` clause for a filter. Column names come from code,
/// values are always bound.
fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    builder.push(" WHERE TRUE");
    if !filter.includes_deleted() {
        builder.push(" AND deleted_at IS NULL");
    }
    for condition in filter.conditions() {
        match condition {
            Condition::Eq(column, value) if value.is_null() => {
                builder.push(format!(" AND {column} IS NULL"));
            }
            Condition::Eq(column, value) => {
                builder.push(format!(" AND {column} = "));
                push_value(builder, value);
            }
            Condition::AnyEq(columns, value) => {
                builder.push(" AND (");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(format!("{column} = "));
                    push_value(builder, value);
                }
                builder.push(")");
            }
            Condition::AtLeast(column, value) => {
                builder.push(format!(" AND {column} >= "));
                push_value(builder, value);
            }
            Condition::AtMost(column, value) => {
                builder.push(format!(" AND {column} <= "));
                push_value(builder, value);
            }
            Condition::Before(column, value) => {
                builder.push(format!(" AND {column} < "));
                push_value(builder, value);
            }
        }
    }
}

fn count_query(kind: EntityKind, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", kind.table()));
    push_filter(&mut builder, filter);
    builder
}

fn to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, DbError> {
        let tx = self.pool.begin().await.map_err(DbError::from_read)?;
        Ok(PgTx { tx })
    }

    async fn find<E: Stored>(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: Option<Window>,
    ) -> Result<(Vec<E>, u64), DbError> {
        let table = E::KIND.table();
        debug!(table, ?window, "find");

        let total: i64 = count_query(E::KIND, filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from_read)?;

        let mut select = QueryBuilder::new(format!("SELECT * FROM {table}"));
        push_filter(&mut select, filter);
        select.push(" ORDER BY ").push(sort.to_sql());
        if let Some(window) = window {
            select
                .push(" LIMIT ")
                .push_bind(to_i64(window.limit))
                .push(" OFFSET ")
                .push_bind(to_i64(window.offset));
        }
        let rows = select
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from_read)?;

        Ok((rows, to_u64(total)))
    }

    async fn find_by_id<E: Stored>(&self, id: i64) -> Result<E, DbError> {
        let mut select =
            QueryBuilder::new(format!("SELECT * FROM {} WHERE id = ", E::KIND.table()));
        select.push_bind(id).push(" AND deleted_at IS NULL");
        select
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from_read)?
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })
    }

    async fn count<E: Stored>(&self, filter: &Filter) -> Result<u64, DbError> {
        self.count_rows(E::KIND, filter).await
    }

    async fn count_rows(&self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError> {
        let total: i64 = count_query(kind, filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from_read)?;
        Ok(to_u64(total))
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::from_read)?;
        Ok(())
    }
}

/// A PostgreSQL transaction. Dropping it without `commit` rolls it back.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

impl PgTx {
    /// Takes a shared lock on every parent the record points at, so none of
    /// them can be deleted before this transaction ends.
    async fn lock_parents<E: Entity>(&mut self, record: &E) -> Result<(), DbError> {
        for (entity, id) in record.references() {
            let mut select =
                QueryBuilder::new(format!("SELECT id FROM {} WHERE id = ", entity.table()));
            select.push_bind(id).push(" AND deleted_at IS NULL FOR SHARE");
            let found: Option<i64> = select
                .build_query_scalar()
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(DbError::from_read)?;
            if found.is_none() {
                return Err(DbError::MissingReference { entity, id });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock<E: Stored>(&mut self, id: i64) -> Result<E, DbError> {
        let mut select =
            QueryBuilder::new(format!("SELECT * FROM {} WHERE id = ", E::KIND.table()));
        select.push_bind(id).push(" AND deleted_at IS NULL FOR UPDATE");
        select
            .build_query_as::<E>()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(DbError::from_read)?
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })
    }

    async fn insert<E: Stored>(&mut self, record: E) -> Result<E, DbError> {
        self.lock_parents(&record).await?;

        let mut insert = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            E::KIND.table(),
            E::COLUMNS.join(", ")
        ));
        for (i, value) in record.values().iter().enumerate() {
            if i > 0 {
                insert.push(", ");
            }
            push_value(&mut insert, value);
        }
        insert.push(") RETURNING *");

        insert
            .build_query_as::<E>()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| DbError::from_write(e, E::KIND, E::UNIQUE))
    }

    async fn update<E: Stored>(&mut self, record: E) -> Result<E, DbError> {
        self.lock_parents(&record).await?;

        let mut update = QueryBuilder::new(format!("UPDATE {} SET ", E::KIND.table()));
        for (column, value) in E::COLUMNS.iter().zip(record.values()) {
            update.push(format!("{column} = "));
            push_value(&mut update, &value);
            update.push(", ");
        }
        update
            .push("updated_at = NOW() WHERE id = ")
            .push_bind(record.id())
            .push(" AND deleted_at IS NULL RETURNING *");

        update
            .build_query_as::<E>()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DbError::from_write(e, E::KIND, E::UNIQUE))?
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id: record.id(),
            })
    }

    async fn soft_delete<E: Stored>(&mut self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
            E::KIND.table()
        ))
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(DbError::from_read)?;
        Ok(result.rows_affected())
    }

    async fn count(&mut self, kind: EntityKind, filter: &Filter) -> Result<u64, DbError> {
        let total: i64 = count_query(kind, filter)
            .build_query_scalar()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(DbError::from_read)?;
        Ok(to_u64(total))
    }

    async fn lock_all(&mut self) -> Result<(), DbError> {
        debug!("locking every table");
        sqlx::query(&lock_all_sql())
            .execute(&mut *self.tx)
            .await
            .map_err(DbError::from_read)?;
        Ok(())
    }

    async fn purge_all(&mut self) -> Result<(), DbError> {
        for kind in EntityKind::PURGE_ORDER {
            let table = kind.table();
            debug!(table, "purging");
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *self.tx)
                .await
                .map_err(DbError::from_read)?;
            sqlx::query(&format!("ALTER SEQUENCE {table}_id_seq RESTART WITH 1"))
                .execute(&mut *self.tx)
                .await
                .map_err(DbError::from_read)?;
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await.map_err(DbError::from_read)
    }
}

/// `SHARE ROW EXCLUSIVE` conflicts with itself and with every row write, but
/// not with the `FOR SHARE`/`FOR UPDATE` reads other transactions take.
fn lock_all_sql() -> String {
    let tables: Vec<&str> = EntityKind::PURGE_ORDER.iter().map(|k| k.table()).collect();
    format!("LOCK TABLE {} IN SHARE ROW EXCLUSIVE MODE", tables.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_all_covers_every_table_in_one_statement() {
        assert_eq!(
            lock_all_sql(),
            "LOCK TABLE team_members, shifts, shift_templates, schedules, users, \
             shift_types, teams, departments IN SHARE ROW EXCLUSIVE MODE"
        );
    }

    #[test]
    fn filters_render_bound_parameters() {
        let filter = Filter::new()
            .eq("team_id", Value::id(3))
            .eq("department_id", Value::BigInt(None))
            .any_eq(&["a_id", "b_id"], Value::id(5))
            .at_least("start_time", Value::Timestamp(Some(chrono::Utc::now())));
        let mut builder = QueryBuilder::new("SELECT * FROM users");
        push_filter(&mut builder, &filter);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE TRUE AND deleted_at IS NULL AND team_id = $1 \
             AND department_id IS NULL AND (a_id = $2 OR b_id = $3) AND start_time >= $4"
        );
    }

    #[test]
    fn deleted_rows_can_be_counted() {
        let builder = count_query(EntityKind::Shift, &Filter::new().with_deleted());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM shifts WHERE TRUE");
    }
}
