//! Per-entity glue between request payloads and records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use core_types::{
    Condition, Department, DepartmentDraft, DepartmentPatch, Filter, Role, Schedule,
    ScheduleDraft, SchedulePatch, Shift, ShiftDraft, ShiftPatch, ShiftTemplate,
    ShiftTemplateDraft, ShiftTemplatePatch, ShiftType, ShiftTypeDraft, ShiftTypePatch, Team,
    TeamDraft, TeamMember, TeamMemberDraft, TeamMemberPatch, TeamPatch, User, UserDraft,
    UserPatch, Value,
};
use database::Stored;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Debug;
use validation::Validate;

/// Query parameters of a collection request.
pub type Params = HashMap<String, String>;

/// A record exposed as a CRUD collection.
pub trait Resource: Stored + Validate {
    /// Creation payload.
    type Draft: DeserializeOwned + Debug + Send + 'static;
    /// Partial-update payload.
    type Patch: DeserializeOwned + Debug + Send + 'static;

    fn from_draft(draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// The list filter for a collection request. Unknown or malformed
    /// parameters are ignored.
    fn list_filter(params: &Params) -> Filter;
}

fn flag(params: &Params, key: &str) -> Option<bool> {
    match params.get(key)?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn id(params: &Params, key: &str) -> Option<i64> {
    params
        .get(key)?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
}

enum Moment {
    Exact(DateTime<Utc>),
    Day(NaiveDate),
}

/// Accepts an RFC 3339 timestamp or a plain date.
fn instant(params: &Params, key: &str) -> Option<Moment> {
    let raw = params.get(key)?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(Moment::Exact(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(Moment::Day)
}

fn midnight(date: NaiveDate) -> Option<Value> {
    let time = NaiveTime::from_hms_opt(0, 0, 0)?;
    Some(Value::Timestamp(Some(date.and_time(time).and_utc())))
}

/// `column >= from`, where a plain date starts at its midnight.
fn since(params: &Params, key: &str, column: &'static str) -> Option<Condition> {
    match instant(params, key)? {
        Moment::Exact(ts) => Some(Condition::AtLeast(column, Value::Timestamp(Some(ts)))),
        Moment::Day(date) => Some(Condition::AtLeast(column, midnight(date)?)),
    }
}

/// Upper bound on `column`. A plain date covers the whole day, fractional
/// seconds included, so it becomes `column < next midnight`.
fn until(params: &Params, key: &str, column: &'static str) -> Option<Condition> {
    match instant(params, key)? {
        Moment::Exact(ts) => Some(Condition::AtMost(column, Value::Timestamp(Some(ts)))),
        Moment::Day(date) => Some(Condition::Before(column, midnight(date.succ_opt()?)?)),
    }
}

fn active(params: &Params) -> Filter {
    match flag(params, "active") {
        Some(active) => Filter::new().eq("is_active", Value::Bool(active)),
        None => Filter::new(),
    }
}

fn with_id(filter: Filter, params: &Params, key: &str, column: &'static str) -> Filter {
    match id(params, key) {
        Some(id) => filter.eq(column, Value::id(id)),
        None => filter,
    }
}

macro_rules! crud {
    ($draft:ty, $patch:ty) => {
        type Draft = $draft;
        type Patch = $patch;

        fn from_draft(draft: $draft) -> Self {
            draft.into_record()
        }

        fn apply_patch(&mut self, patch: $patch) {
            patch.apply(self)
        }
    };
}

impl Resource for User {
    crud!(UserDraft, UserPatch);

    fn list_filter(params: &Params) -> Filter {
        let mut filter = active(params);
        filter = with_id(filter, params, "teamId", "team_id");
        filter = with_id(filter, params, "departmentId", "department_id");
        if let Some(role) = params.get("role").and_then(|r| r.parse::<Role>().ok()) {
            filter = filter.eq("role", Value::text(role.as_str()));
        }
        filter
    }
}

impl Resource for Team {
    crud!(TeamDraft, TeamPatch);

    fn list_filter(params: &Params) -> Filter {
        active(params)
    }
}

impl Resource for Department {
    crud!(DepartmentDraft, DepartmentPatch);

    fn list_filter(params: &Params) -> Filter {
        active(params)
    }
}

impl Resource for ShiftType {
    crud!(ShiftTypeDraft, ShiftTypePatch);

    fn list_filter(params: &Params) -> Filter {
        with_id(active(params), params, "teamId", "team_id")
    }
}

impl Resource for ShiftTemplate {
    crud!(ShiftTemplateDraft, ShiftTemplatePatch);

    fn list_filter(params: &Params) -> Filter {
        active(params)
    }
}

impl Resource for Schedule {
    crud!(ScheduleDraft, SchedulePatch);

    fn list_filter(params: &Params) -> Filter {
        active(params)
    }
}

impl Resource for Shift {
    crud!(ShiftDraft, ShiftPatch);

    fn list_filter(params: &Params) -> Filter {
        let mut filter = active(params);
        filter = with_id(filter, params, "userId", "user_id");
        filter = with_id(filter, params, "scheduleId", "schedule_id");
        filter = with_id(filter, params, "shiftTypeId", "shift_type_id");
        if let Some(from) = since(params, "from", "start_time") {
            filter.push(from);
        }
        if let Some(to) = until(params, "to", "start_time") {
            filter.push(to);
        }
        filter
    }
}

impl Resource for TeamMember {
    crud!(TeamMemberDraft, TeamMemberPatch);

    fn list_filter(params: &Params) -> Filter {
        let filter = with_id(Filter::new(), params, "teamId", "team_id");
        with_id(filter, params, "userId", "user_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn malformed_filters_are_ignored() {
        let filter = User::list_filter(&params(&[
            ("active", "maybe"),
            ("teamId", "abc"),
            ("departmentId", "-3"),
            ("role", "owner"),
        ]));
        assert!(filter.conditions().is_empty());
    }

    #[test]
    fn user_filters_combine() {
        let filter = User::list_filter(&params(&[
            ("active", "true"),
            ("teamId", "2"),
            ("role", "Manager"),
        ]));
        assert_eq!(
            filter.conditions(),
            &[
                Condition::Eq("is_active", Value::Bool(true)),
                Condition::Eq("team_id", Value::id(2)),
                Condition::Eq("role", Value::text("manager")),
            ]
        );
    }

    #[test]
    fn shift_date_range_covers_whole_days() {
        let filter = Shift::list_filter(&params(&[("from", "2024-01-01"), ("to", "2024-01-07")]));
        let bounds: Vec<_> = filter.conditions().to_vec();
        assert_eq!(bounds.len(), 2);
        match &bounds[0] {
            Condition::AtLeast("start_time", Value::Timestamp(Some(from))) => {
                assert_eq!(from.to_rfc3339(), "2024-01-01T00:00:00+00:00");
            }
            other => panic!("unexpected condition {other:?}"),
        }
        match &bounds[1] {
            Condition::Before("start_time", Value::Timestamp(Some(to))) => {
                assert_eq!(to.to_rfc3339(), "2024-01-08T00:00:00+00:00");
            }
            other => panic!("unexpected condition {other:?}"),
        }
    }

    #[test]
    fn explicit_timestamps_bound_inclusively() {
        let filter = Shift::list_filter(&params(&[("to", "2024-01-07T12:00:00Z")]));
        match filter.conditions() {
            [Condition::AtMost("start_time", Value::Timestamp(Some(to)))] => {
                assert_eq!(to.to_rfc3339(), "2024-01-07T12:00:00+00:00");
            }
            other => panic!("unexpected conditions {other:?}"),
        }
    }
}
