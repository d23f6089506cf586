use crate::entity::{Audit, Entity};
use crate::enums::{EntityKind, Role};
use crate::patch::{assign, double_option};
use crate::query::{Sort, Value};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The seven weekday reference columns of a shift template, Monday first.
pub const WEEKDAY_COLUMNS: &[&str] = &[
    "monday_shift_type_id",
    "tuesday_shift_type_id",
    "wednesday_shift_type_id",
    "thursday_shift_type_id",
    "friday_shift_type_id",
    "saturday_shift_type_id",
    "sunday_shift_type_id",
];

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    Role::Employee.as_str().to_string()
}

fn default_member_role() -> String {
    "member".to_string()
}

fn push_ref(refs: &mut Vec<(EntityKind, i64)>, kind: EntityKind, id: Option<i64>) {
    if let Some(id) = id {
        refs.push((kind, id));
    }
}

// ==============================================================================
// User
// ==============================================================================

/// An employee. Soft-deleted on delete; optionally points at a team and a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub team_id: Option<i64>,
    pub department_id: Option<i64>,
}

/// Known roles are stored in their lowercase form; anything else is kept as
/// given so validation can reject it.
fn canonical_role(raw: String) -> String {
    match raw.parse::<Role>() {
        Ok(role) => role.as_str().to_string(),
        Err(_) => raw,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

impl UserDraft {
    pub fn into_record(self) -> User {
        User {
            audit: Audit::pending(),
            name: self.name,
            username: self.username,
            email: self.email,
            role: canonical_role(self.role),
            is_active: self.is_active,
            team_id: self.team_id,
            department_id: self.department_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub team_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i64>>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        assign(&mut user.name, self.name);
        assign(&mut user.username, self.username);
        assign(&mut user.email, self.email);
        assign(&mut user.role, self.role.map(canonical_role));
        assign(&mut user.is_active, self.is_active);
        assign(&mut user.team_id, self.team_id);
        assign(&mut user.department_id, self.department_id);
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "username",
        "email",
        "role",
        "is_active",
        "team_id",
        "department_id",
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["username"], &["email"]];

    fn default_sort() -> Sort {
        Sort::ascending(&["name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "name" => Value::text(&self.name),
            "username" => Value::text(&self.username),
            "email" => Value::text(&self.email),
            "role" => Value::text(&self.role),
            "is_active" => Value::Bool(self.is_active),
            "team_id" => Value::BigInt(self.team_id),
            "department_id" => Value::BigInt(self.department_id),
            _ => return None,
        })
    }

    fn references(&self) -> Vec<(EntityKind, i64)> {
        let mut refs = Vec::new();
        push_ref(&mut refs, EntityKind::Team, self.team_id);
        push_ref(&mut refs, EntityKind::Department, self.department_id);
        refs
    }
}

// ==============================================================================
// Team
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: String,
    pub color: String,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl TeamDraft {
    pub fn into_record(self) -> Team {
        Team {
            audit: Audit::pending(),
            name: self.name,
            description: self.description,
            color: self.color,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl TeamPatch {
    pub fn apply(self, team: &mut Team) {
        assign(&mut team.name, self.name);
        assign(&mut team.description, self.description);
        assign(&mut team.color, self.color);
        assign(&mut team.is_active, self.is_active);
        assign(&mut team.sort_order, self.sort_order);
    }
}

impl Entity for Team {
    const KIND: EntityKind = EntityKind::Team;
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "color", "is_active", "sort_order"];

    fn default_sort() -> Sort {
        Sort::ascending(&["sort_order", "name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "name" => Value::text(&self.name),
            "description" => Value::text(&self.description),
            "color" => Value::text(&self.color),
            "is_active" => Value::Bool(self.is_active),
            "sort_order" => Value::Int(Some(self.sort_order)),
            _ => return None,
        })
    }
}

// ==============================================================================
// Department
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl DepartmentDraft {
    pub fn into_record(self) -> Department {
        Department {
            audit: Audit::pending(),
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl DepartmentPatch {
    pub fn apply(self, department: &mut Department) {
        assign(&mut department.name, self.name);
        assign(&mut department.description, self.description);
        assign(&mut department.is_active, self.is_active);
        assign(&mut department.sort_order, self.sort_order);
    }
}

impl Entity for Department {
    const KIND: EntityKind = EntityKind::Department;
    const COLUMNS: &'static [&'static str] = &["name", "description", "is_active", "sort_order"];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn default_sort() -> Sort {
        Sort::ascending(&["sort_order", "name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "name" => Value::text(&self.name),
            "description" => Value::text(&self.description),
            "is_active" => Value::Bool(self.is_active),
            "sort_order" => Value::Int(Some(self.sort_order)),
            _ => return None,
        })
    }
}

// ==============================================================================
// ShiftType
// ==============================================================================

/// A named kind of shift with default times and duration bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftType {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: String,
    pub color: String,
    pub team_id: Option<i64>,
    pub default_start_time: Option<NaiveTime>,
    pub default_end_time: Option<NaiveTime>,
    pub default_break_minutes: i32,
    pub min_duration_minutes: Option<i32>,
    pub max_duration_minutes: Option<i32>,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTypeDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub default_start_time: Option<NaiveTime>,
    #[serde(default)]
    pub default_end_time: Option<NaiveTime>,
    #[serde(default)]
    pub default_break_minutes: i32,
    #[serde(default)]
    pub min_duration_minutes: Option<i32>,
    #[serde(default)]
    pub max_duration_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl ShiftTypeDraft {
    pub fn into_record(self) -> ShiftType {
        ShiftType {
            audit: Audit::pending(),
            name: self.name,
            description: self.description,
            color: self.color,
            team_id: self.team_id,
            default_start_time: self.default_start_time,
            default_end_time: self.default_end_time,
            default_break_minutes: self.default_break_minutes,
            min_duration_minutes: self.min_duration_minutes,
            max_duration_minutes: self.max_duration_minutes,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTypePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub team_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub default_start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "double_option")]
    pub default_end_time: Option<Option<NaiveTime>>,
    pub default_break_minutes: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub min_duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_duration_minutes: Option<Option<i32>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl ShiftTypePatch {
    pub fn apply(self, shift_type: &mut ShiftType) {
        assign(&mut shift_type.name, self.name);
        assign(&mut shift_type.description, self.description);
        assign(&mut shift_type.color, self.color);
        assign(&mut shift_type.team_id, self.team_id);
        assign(&mut shift_type.default_start_time, self.default_start_time);
        assign(&mut shift_type.default_end_time, self.default_end_time);
        assign(&mut shift_type.default_break_minutes, self.default_break_minutes);
        assign(&mut shift_type.min_duration_minutes, self.min_duration_minutes);
        assign(&mut shift_type.max_duration_minutes, self.max_duration_minutes);
        assign(&mut shift_type.is_active, self.is_active);
        assign(&mut shift_type.sort_order, self.sort_order);
    }
}

impl Entity for ShiftType {
    const KIND: EntityKind = EntityKind::ShiftType;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "color",
        "team_id",
        "default_start_time",
        "default_end_time",
        "default_break_minutes",
        "min_duration_minutes",
        "max_duration_minutes",
        "is_active",
        "sort_order",
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn default_sort() -> Sort {
        Sort::ascending(&["sort_order", "name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "name" => Value::text(&self.name),
            "description" => Value::text(&self.description),
            "color" => Value::text(&self.color),
            "team_id" => Value::BigInt(self.team_id),
            "default_start_time" => Value::Time(self.default_start_time),
            "default_end_time" => Value::Time(self.default_end_time),
            "default_break_minutes" => Value::Int(Some(self.default_break_minutes)),
            "min_duration_minutes" => Value::Int(self.min_duration_minutes),
            "max_duration_minutes" => Value::Int(self.max_duration_minutes),
            "is_active" => Value::Bool(self.is_active),
            "sort_order" => Value::Int(Some(self.sort_order)),
            _ => return None,
        })
    }

    fn references(&self) -> Vec<(EntityKind, i64)> {
        let mut refs = Vec::new();
        push_ref(&mut refs, EntityKind::Team, self.team_id);
        refs
    }
}

// ==============================================================================
// ShiftTemplate
// ==============================================================================

/// A reusable weekly pattern: one optional shift type per weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplate {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: String,
    pub color: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub min_duration_minutes: Option<i32>,
    pub max_duration_minutes: Option<i32>,
    pub monday_shift_type_id: Option<i64>,
    pub tuesday_shift_type_id: Option<i64>,
    pub wednesday_shift_type_id: Option<i64>,
    pub thursday_shift_type_id: Option<i64>,
    pub friday_shift_type_id: Option<i64>,
    pub saturday_shift_type_id: Option<i64>,
    pub sunday_shift_type_id: Option<i64>,
}

impl ShiftTemplate {
    /// The shift type for each weekday, Monday first. `None` means no shift that day.
    pub fn days(&self) -> [Option<i64>; 7] {
        [
            self.monday_shift_type_id,
            self.tuesday_shift_type_id,
            self.wednesday_shift_type_id,
            self.thursday_shift_type_id,
            self.friday_shift_type_id,
            self.saturday_shift_type_id,
            self.sunday_shift_type_id,
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplateDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub min_duration_minutes: Option<i32>,
    #[serde(default)]
    pub max_duration_minutes: Option<i32>,
    #[serde(default)]
    pub monday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub tuesday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub wednesday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub thursday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub friday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub saturday_shift_type_id: Option<i64>,
    #[serde(default)]
    pub sunday_shift_type_id: Option<i64>,
}

impl ShiftTemplateDraft {
    pub fn into_record(self) -> ShiftTemplate {
        ShiftTemplate {
            audit: Audit::pending(),
            name: self.name,
            description: self.description,
            color: self.color,
            is_active: self.is_active,
            sort_order: self.sort_order,
            min_duration_minutes: self.min_duration_minutes,
            max_duration_minutes: self.max_duration_minutes,
            monday_shift_type_id: self.monday_shift_type_id,
            tuesday_shift_type_id: self.tuesday_shift_type_id,
            wednesday_shift_type_id: self.wednesday_shift_type_id,
            thursday_shift_type_id: self.thursday_shift_type_id,
            friday_shift_type_id: self.friday_shift_type_id,
            saturday_shift_type_id: self.saturday_shift_type_id,
            sunday_shift_type_id: self.sunday_shift_type_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub min_duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub monday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tuesday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub wednesday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub thursday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub friday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub saturday_shift_type_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sunday_shift_type_id: Option<Option<i64>>,
}

impl ShiftTemplatePatch {
    pub fn apply(self, template: &mut ShiftTemplate) {
        assign(&mut template.name, self.name);
        assign(&mut template.description, self.description);
        assign(&mut template.color, self.color);
        assign(&mut template.is_active, self.is_active);
        assign(&mut template.sort_order, self.sort_order);
        assign(&mut template.min_duration_minutes, self.min_duration_minutes);
        assign(&mut template.max_duration_minutes, self.max_duration_minutes);
        assign(&mut template.monday_shift_type_id, self.monday_shift_type_id);
        assign(&mut template.tuesday_shift_type_id, self.tuesday_shift_type_id);
        assign(&mut template.wednesday_shift_type_id, self.wednesday_shift_type_id);
        assign(&mut template.thursday_shift_type_id, self.thursday_shift_type_id);
        assign(&mut template.friday_shift_type_id, self.friday_shift_type_id);
        assign(&mut template.saturday_shift_type_id, self.saturday_shift_type_id);
        assign(&mut template.sunday_shift_type_id, self.sunday_shift_type_id);
    }
}

impl Entity for ShiftTemplate {
    const KIND: EntityKind = EntityKind::ShiftTemplate;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "color",
        "is_active",
        "sort_order",
        "min_duration_minutes",
        "max_duration_minutes",
        "monday_shift_type_id",
        "tuesday_shift_type_id",
        "wednesday_shift_type_id",
        "thursday_shift_type_id",
        "friday_shift_type_id",
        "saturday_shift_type_id",
        "sunday_shift_type_id",
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn default_sort() -> Sort {
        Sort::ascending(&["sort_order", "name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        if let Some(day) = WEEKDAY_COLUMNS.iter().position(|c| *c == column) {
            return Some(Value::BigInt(self.days()[day]));
        }
        Some(match column {
            "name" => Value::text(&self.name),
            "description" => Value::text(&self.description),
            "color" => Value::text(&self.color),
            "is_active" => Value::Bool(self.is_active),
            "sort_order" => Value::Int(Some(self.sort_order)),
            "min_duration_minutes" => Value::Int(self.min_duration_minutes),
            "max_duration_minutes" => Value::Int(self.max_duration_minutes),
            _ => return None,
        })
    }

    fn references(&self) -> Vec<(EntityKind, i64)> {
        let mut refs = Vec::new();
        for day in self.days() {
            push_ref(&mut refs, EntityKind::ShiftType, day);
        }
        refs.sort_unstable();
        refs.dedup();
        refs
    }
}

// ==============================================================================
// Schedule
// ==============================================================================

/// A dated planning period that owns its shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ScheduleDraft {
    /// Missing dates become the zero date, which the validator reports as missing.
    pub fn into_record(self) -> Schedule {
        Schedule {
            audit: Audit::pending(),
            name: self.name,
            description: self.description,
            start_date: self.start_date.unwrap_or_default(),
            end_date: self.end_date.unwrap_or_default(),
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl SchedulePatch {
    pub fn apply(self, schedule: &mut Schedule) {
        assign(&mut schedule.name, self.name);
        assign(&mut schedule.description, self.description);
        assign(&mut schedule.start_date, self.start_date);
        assign(&mut schedule.end_date, self.end_date);
        assign(&mut schedule.is_active, self.is_active);
    }
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "start_date", "end_date", "is_active"];

    fn default_sort() -> Sort {
        Sort::ascending(&["start_date", "name"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "name" => Value::text(&self.name),
            "description" => Value::text(&self.description),
            "start_date" => Value::Date(Some(self.start_date)),
            "end_date" => Value::Date(Some(self.end_date)),
            "is_active" => Value::Bool(self.is_active),
            _ => return None,
        })
    }
}

// ==============================================================================
// Shift
// ==============================================================================

/// One worked interval of one user inside one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub user_id: i64,
    pub schedule_id: i64,
    pub shift_type_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub break_minutes: i32,
    pub description: String,
    pub is_active: bool,
}

impl Shift {
    /// Length of the shift in whole minutes; negative when the times are inverted.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDraft {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub schedule_id: Option<i64>,
    #[serde(default)]
    pub shift_type_id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub break_minutes: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ShiftDraft {
    /// Missing ids and times become zero values, which the validator reports as missing.
    pub fn into_record(self) -> Shift {
        Shift {
            audit: Audit::pending(),
            user_id: self.user_id.unwrap_or_default(),
            schedule_id: self.schedule_id.unwrap_or_default(),
            shift_type_id: self.shift_type_id,
            start_time: self.start_time.unwrap_or_default(),
            end_time: self.end_time.unwrap_or_default(),
            break_minutes: self.break_minutes,
            description: self.description,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    pub user_id: Option<i64>,
    pub schedule_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub shift_type_id: Option<Option<i64>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub break_minutes: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ShiftPatch {
    pub fn apply(self, shift: &mut Shift) {
        assign(&mut shift.user_id, self.user_id);
        assign(&mut shift.schedule_id, self.schedule_id);
        assign(&mut shift.shift_type_id, self.shift_type_id);
        assign(&mut shift.start_time, self.start_time);
        assign(&mut shift.end_time, self.end_time);
        assign(&mut shift.break_minutes, self.break_minutes);
        assign(&mut shift.description, self.description);
        assign(&mut shift.is_active, self.is_active);
    }
}

impl Entity for Shift {
    const KIND: EntityKind = EntityKind::Shift;
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "schedule_id",
        "shift_type_id",
        "start_time",
        "end_time",
        "break_minutes",
        "description",
        "is_active",
    ];

    fn default_sort() -> Sort {
        Sort::ascending(&["start_time"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "user_id" => Value::id(self.user_id),
            "schedule_id" => Value::id(self.schedule_id),
            "shift_type_id" => Value::BigInt(self.shift_type_id),
            "start_time" => Value::Timestamp(Some(self.start_time)),
            "end_time" => Value::Timestamp(Some(self.end_time)),
            "break_minutes" => Value::Int(Some(self.break_minutes)),
            "description" => Value::text(&self.description),
            "is_active" => Value::Bool(self.is_active),
            _ => return None,
        })
    }

    fn references(&self) -> Vec<(EntityKind, i64)> {
        let mut refs = vec![
            (EntityKind::User, self.user_id),
            (EntityKind::Schedule, self.schedule_id),
        ];
        push_ref(&mut refs, EntityKind::ShiftType, self.shift_type_id);
        refs
    }
}

// ==============================================================================
// TeamMember
// ==============================================================================

/// Join record between a team and a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub team_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberDraft {
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "default_member_role")]
    pub role: String,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl TeamMemberDraft {
    /// A missing `joined_at` means "joined now".
    pub fn into_record(self) -> TeamMember {
        let audit = Audit::pending();
        TeamMember {
            joined_at: self.joined_at.unwrap_or(audit.created_at),
            audit,
            team_id: self.team_id.unwrap_or_default(),
            user_id: self.user_id.unwrap_or_default(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPatch {
    pub role: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl TeamMemberPatch {
    pub fn apply(self, member: &mut TeamMember) {
        assign(&mut member.role, self.role);
        assign(&mut member.joined_at, self.joined_at);
    }
}

impl Entity for TeamMember {
    const KIND: EntityKind = EntityKind::TeamMember;
    const COLUMNS: &'static [&'static str] = &["team_id", "user_id", "role", "joined_at"];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["team_id", "user_id"]];

    fn default_sort() -> Sort {
        Sort::ascending(&["joined_at"])
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn field(&self, column: &str) -> Option<Value> {
        Some(match column {
            "team_id" => Value::id(self.team_id),
            "user_id" => Value::id(self.user_id),
            "role" => Value::text(&self.role),
            "joined_at" => Value::Timestamp(Some(self.joined_at)),
            _ => return None,
        })
    }

    fn references(&self) -> Vec<(EntityKind, i64)> {
        vec![(EntityKind::Team, self.team_id), (EntityKind::User, self.user_id)]
    }
}
