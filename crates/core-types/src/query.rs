use crate::entity::Entity;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A typed column value. Nullable columns carry an `Option` so the storage
/// layer can bind a correctly typed NULL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Bool(bool),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Timestamp(Option<DateTime<Utc>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Int(None)
                | Value::BigInt(None)
                | Value::Text(None)
                | Value::Date(None)
                | Value::Time(None)
                | Value::Timestamp(None)
        )
    }

    pub fn id(id: i64) -> Self {
        Value::BigInt(Some(id))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Some(value.into()))
    }
}

/// One predicate over a column. Column names are static identifiers chosen
/// by code, never taken from request input.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`, or `column IS NULL` for a null value.
    Eq(&'static str, Value),
    /// True when any of the columns equals the value.
    AnyEq(&'static [&'static str], Value),
    /// `column >= value`; null columns never match.
    AtLeast(&'static str, Value),
    /// `column <= value`; null columns never match.
    AtMost(&'static str, Value),
    /// `column < value`; null columns never match.
    Before(&'static str, Value),
}

impl Condition {
    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        match self {
            Condition::Eq(column, value) => record.column(column).as_ref() == Some(value),
            Condition::AnyEq(columns, value) => columns
                .iter()
                .any(|column| record.column(column).as_ref() == Some(value)),
            Condition::AtLeast(column, value) => match record.column(column) {
                Some(found) if !found.is_null() => found >= *value,
                _ => false,
            },
            Condition::AtMost(column, value) => match record.column(column) {
                Some(found) if !found.is_null() => found <= *value,
                _ => false,
            },
            Condition::Before(column, value) => match record.column(column) {
                Some(found) if !found.is_null() => found < *value,
                _ => false,
            },
        }
    }
}

/// A conjunction of conditions. Soft-deleted rows are excluded unless
/// `with_deleted` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    include_deleted: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: Value) -> Self {
        self.conditions.push(Condition::Eq(column, value));
        self
    }

    pub fn any_eq(mut self, columns: &'static [&'static str], value: Value) -> Self {
        self.conditions.push(Condition::AnyEq(columns, value));
        self
    }

    pub fn at_least(mut self, column: &'static str, value: Value) -> Self {
        self.conditions.push(Condition::AtLeast(column, value));
        self
    }

    pub fn at_most(mut self, column: &'static str, value: Value) -> Self {
        self.conditions.push(Condition::AtMost(column, value));
        self
    }

    pub fn before(mut self, column: &'static str, value: Value) -> Self {
        self.conditions.push(Condition::Before(column, value));
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Also match soft-deleted rows.
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn includes_deleted(&self) -> bool {
        self.include_deleted
    }

    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        if !self.include_deleted && record.audit().is_deleted() {
            return false;
        }
        self.conditions.iter().all(|c| c.matches(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub direction: Direction,
}

/// An ordered list of sort keys. Every sort ends in `id` so that pages are
/// stable even when the leading keys tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort(Vec<SortKey>);

impl Sort {
    /// Ascending on each column, then on `id`.
    pub fn ascending(columns: &[&'static str]) -> Self {
        let mut keys: Vec<SortKey> = columns
            .iter()
            .map(|&column| SortKey {
                column,
                direction: Direction::Asc,
            })
            .collect();
        if !columns.contains(&"id") {
            keys.push(SortKey {
                column: "id",
                direction: Direction::Asc,
            });
        }
        Self(keys)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Renders the keys as the body of an `ORDER BY` clause.
    pub fn to_sql(&self) -> String {
        self.0
            .iter()
            .map(|key| match key.direction {
                Direction::Asc => format!("{} ASC", key.column),
                Direction::Desc => format!("{} DESC", key.column),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        for key in &self.0 {
            let ordering = a.column(key.column).cmp(&b.column(key.column));
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// The slice of an ordered collection a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

impl Window {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T: Clone>(&self, ordered: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(ordered.len());
        let len = usize::try_from(self.limit).unwrap_or(usize::MAX);
        ordered[start..].iter().take(len).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Team, TeamDraft};

    fn team(id: i64, name: &str, sort_order: i32) -> Team {
        let mut team = TeamDraft {
            name: name.to_string(),
            description: String::new(),
            color: String::new(),
            is_active: true,
            sort_order,
        }
        .into_record();
        team.audit.id = id;
        team
    }

    #[test]
    fn sort_orders_by_sort_order_then_name_then_id() {
        let sort = Team::default_sort();
        let mut teams = vec![team(3, "b", 1), team(1, "c", 0), team(2, "a", 1), team(4, "a", 1)];
        teams.sort_by(|a, b| sort.compare(a, b));
        let ids: Vec<i64> = teams.iter().map(|t| t.audit.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(sort.to_sql(), "sort_order ASC, name ASC, id ASC");
    }

    #[test]
    fn filter_excludes_soft_deleted_rows_by_default() {
        let mut gone = team(1, "gone", 0);
        gone.audit.deleted_at = Some(Utc::now());
        assert!(!Filter::new().matches(&gone));
        assert!(Filter::new().with_deleted().matches(&gone));
    }

    #[test]
    fn range_conditions_never_match_null_columns() {
        let t = team(1, "x", 0);
        assert!(Condition::AtMost("name", Value::text("zzz")).matches(&t));
        assert!(!Condition::AtLeast("name", Value::text("zzz")).matches(&t));
        assert!(!Condition::AtMost("no_such_column", Value::text("zzz")).matches(&t));
    }

    #[test]
    fn before_excludes_the_bound_itself() {
        let t = team(1, "m", 0);
        assert!(Condition::AtMost("name", Value::text("m")).matches(&t));
        assert!(!Condition::Before("name", Value::text("m")).matches(&t));
        assert!(Condition::Before("name", Value::text("n")).matches(&t));
    }

    #[test]
    fn window_slices_past_the_end_to_empty() {
        let items = vec![1, 2, 3];
        assert_eq!(Window::new(2, 1).slice(&items), vec![2, 3]);
        assert!(Window::new(5, 100).slice(&items).is_empty());
    }
}
