//! The fixed reference dataset written by `seed`.
//!
//! Values are literal so that two seeded stores are indistinguishable. Ids are
//! not hard-coded: children are linked to whatever ids their parents received.

use crate::error::ServiceError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use core_types::{
    DepartmentDraft, EntityKind, Role, ScheduleDraft, ShiftDraft, ShiftTemplateDraft,
    ShiftTypeDraft, TeamDraft, TeamMemberDraft, UserDraft,
};
use database::{StoreTx, Stored};
use std::collections::BTreeMap;
use validation::Validate;

fn time(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn at(y: i32, m: u32, d: u32, h: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single()
}

/// Rows written per table by the reference dataset.
pub type SeedCounts = BTreeMap<EntityKind, u64>;

/// Validates and inserts one record, tallying it per kind.
async fn put<T: StoreTx, E: Stored + Validate>(
    tx: &mut T,
    counts: &mut SeedCounts,
    record: E,
) -> Result<i64, ServiceError> {
    let outcome = record.validate();
    if !outcome.valid {
        return Err(ServiceError::Validation {
            messages: outcome.messages(),
        });
    }
    let stored = tx.insert(record).await?;
    *counts.entry(E::KIND).or_default() += 1;
    Ok(stored.id())
}

fn team(name: &str, description: &str, color: &str, sort_order: i32) -> TeamDraft {
    TeamDraft {
        name: name.into(),
        description: description.into(),
        color: color.into(),
        is_active: true,
        sort_order,
    }
}

fn user(name: &str, username: &str, role: Role, team_id: i64, department_id: i64) -> UserDraft {
    UserDraft {
        name: name.into(),
        username: username.into(),
        email: format!("{username}@shiftboard.example"),
        role: role.as_str().into(),
        is_active: true,
        team_id: Some(team_id),
        department_id: Some(department_id),
    }
}

#[allow(clippy::too_many_arguments)]
fn shift_type(
    name: &str,
    color: &str,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    break_minutes: i32,
    durations: (Option<i32>, Option<i32>),
    team_id: Option<i64>,
    sort_order: i32,
) -> ShiftTypeDraft {
    ShiftTypeDraft {
        name: name.into(),
        description: format!("{name} shift"),
        color: color.into(),
        team_id,
        default_start_time: start,
        default_end_time: end,
        default_break_minutes: break_minutes,
        min_duration_minutes: durations.0,
        max_duration_minutes: durations.1,
        is_active: true,
        sort_order,
    }
}

/// `(day, start_hour, end_hour)` within January 2024.
fn shift(
    user_id: i64,
    schedule_id: i64,
    shift_type_id: i64,
    (day, start_hour, end_hour): (u32, u32, u32),
    break_minutes: i32,
) -> ShiftDraft {
    ShiftDraft {
        user_id: Some(user_id),
        schedule_id: Some(schedule_id),
        shift_type_id: Some(shift_type_id),
        start_time: at(2024, 1, day, start_hour),
        end_time: at(2024, 1, day, end_hour),
        break_minutes,
        description: String::new(),
        is_active: true,
    }
}

/// Writes the whole reference dataset through `tx`, parents first.
pub async fn insert_reference_data<T: StoreTx>(tx: &mut T) -> Result<SeedCounts, ServiceError> {
    let mut counts = SeedCounts::new();
    let c = &mut counts;

    // --- 1. Organisation ---
    let operations = put(
        tx,
        c,
        DepartmentDraft {
            name: "Operations".into(),
            description: "Kitchen, housekeeping and maintenance".into(),
            is_active: true,
            sort_order: 1,
        }
        .into_record(),
    )
    .await?;
    let guest_services = put(
        tx,
        c,
        DepartmentDraft {
            name: "Guest Services".into(),
            description: "Everything guests see first".into(),
            is_active: true,
            sort_order: 2,
        }
        .into_record(),
    )
    .await?;

    let front_desk = put(
        tx,
        c,
        team("Front Desk", "Reception and check-in", "#3B82F6", 1).into_record(),
    )
    .await?;
    let kitchen = put(
        tx,
        c,
        team("Kitchen", "Food preparation", "#EF4444", 2).into_record(),
    )
    .await?;
    let housekeeping = put(
        tx,
        c,
        team("Housekeeping", "Rooms and public areas", "#10B981", 3).into_record(),
    )
    .await?;
    let maintenance = put(
        tx,
        c,
        team("Maintenance", "Repairs and facilities", "#F59E0B", 4).into_record(),
    )
    .await?;

    // --- 2. People ---
    let alice = put(
        tx,
        c,
        user(
            "Alice Johnson",
            "alice",
            Role::Admin,
            front_desk,
            guest_services,
        )
        .into_record(),
    )
    .await?;
    let bob = put(
        tx,
        c,
        user("Bob Smith", "bob", Role::Manager, kitchen, operations).into_record(),
    )
    .await?;
    let carol = put(
        tx,
        c,
        user(
            "Carol Davis",
            "carol",
            Role::Employee,
            front_desk,
            guest_services,
        )
        .into_record(),
    )
    .await?;
    let david = put(
        tx,
        c,
        user(
            "David Wilson",
            "david",
            Role::Employee,
            housekeeping,
            operations,
        )
        .into_record(),
    )
    .await?;
    let eva = put(
        tx,
        c,
        user("Eva Brown", "eva", Role::Employee, maintenance, operations).into_record(),
    )
    .await?;

    // --- 3. Shift types and templates ---
    let morning = put(
        tx,
        c,
        shift_type(
            "Morning",
            "#FDE68A",
            time(6, 0),
            time(14, 0),
            30,
            (Some(360), Some(480)),
            None,
            1,
        )
        .into_record(),
    )
    .await?;
    let day = put(
        tx,
        c,
        shift_type(
            "Day",
            "#93C5FD",
            time(9, 0),
            time(17, 0),
            60,
            (Some(420), Some(540)),
            None,
            2,
        )
        .into_record(),
    )
    .await?;
    let evening = put(
        tx,
        c,
        shift_type(
            "Evening",
            "#C4B5FD",
            time(14, 0),
            time(22, 0),
            30,
            (Some(360), Some(480)),
            None,
            3,
        )
        .into_record(),
    )
    .await?;
    let night = put(
        tx,
        c,
        shift_type(
            "Night",
            "#1E3A8A",
            time(0, 0),
            time(8, 0),
            45,
            (Some(420), Some(480)),
            Some(front_desk),
            4,
        )
        .into_record(),
    )
    .await?;
    put(
        tx,
        c,
        shift_type(
            "On Call",
            "#9CA3AF",
            None,
            None,
            0,
            (None, None),
            Some(maintenance),
            5,
        )
        .into_record(),
    )
    .await?;

    put(
        tx,
        c,
        ShiftTemplateDraft {
            name: "Standard Week".into(),
            description: "Day shifts Monday to Friday".into(),
            color: "#93C5FD".into(),
            is_active: true,
            sort_order: 1,
            min_duration_minutes: Some(420),
            max_duration_minutes: Some(540),
            monday_shift_type_id: Some(day),
            tuesday_shift_type_id: Some(day),
            wednesday_shift_type_id: Some(day),
            thursday_shift_type_id: Some(day),
            friday_shift_type_id: Some(day),
            saturday_shift_type_id: None,
            sunday_shift_type_id: None,
        }
        .into_record(),
    )
    .await?;
    put(
        tx,
        c,
        ShiftTemplateDraft {
            name: "Rotating Early".into(),
            description: "Early start, late finish, short Saturday".into(),
            color: "#FDE68A".into(),
            is_active: true,
            sort_order: 2,
            min_duration_minutes: Some(360),
            max_duration_minutes: Some(480),
            monday_shift_type_id: Some(morning),
            tuesday_shift_type_id: Some(morning),
            wednesday_shift_type_id: Some(morning),
            thursday_shift_type_id: Some(evening),
            friday_shift_type_id: Some(evening),
            saturday_shift_type_id: Some(morning),
            sunday_shift_type_id: None,
        }
        .into_record(),
    )
    .await?;

    // --- 4. Schedules and shifts ---
    let schedule = |name: &str, description: &str, start, end| ScheduleDraft {
        name: name.into(),
        description: description.into(),
        start_date: start,
        end_date: end,
        is_active: true,
    };
    let week_one = put(
        tx,
        c,
        schedule(
            "Week 1",
            "First week of January",
            date(2024, 1, 1),
            date(2024, 1, 7),
        )
        .into_record(),
    )
    .await?;
    let week_two = put(
        tx,
        c,
        schedule(
            "Week 2",
            "Second week of January",
            date(2024, 1, 8),
            date(2024, 1, 14),
        )
        .into_record(),
    )
    .await?;
    put(
        tx,
        c,
        schedule(
            "January 2024",
            "Monthly overview",
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .into_record(),
    )
    .await?;

    // Every shift starts and ends on the same January 2024 day.
    let shifts = [
        shift(alice, week_one, day, (1, 9, 17), 60),
        shift(carol, week_one, morning, (1, 6, 14), 30),
        shift(bob, week_one, evening, (2, 14, 22), 30),
        shift(david, week_one, day, (3, 9, 17), 60),
        shift(eva, week_one, night, (4, 0, 8), 45),
        shift(alice, week_two, morning, (8, 6, 14), 30),
        shift(carol, week_two, evening, (9, 14, 22), 30),
        shift(bob, week_two, day, (10, 9, 17), 60),
    ];
    for draft in shifts {
        put(tx, c, draft.into_record()).await?;
    }

    // --- 5. Memberships ---
    let joined = at(2024, 1, 1, 0);
    let memberships = [
        (front_desk, alice, "lead"),
        (kitchen, bob, "lead"),
        (front_desk, carol, "member"),
        (housekeeping, david, "member"),
        (maintenance, eva, "member"),
    ];
    for (team_id, user_id, role) in memberships {
        let draft = TeamMemberDraft {
            team_id: Some(team_id),
            user_id: Some(user_id),
            role: role.into(),
            joined_at: joined,
        };
        put(tx, c, draft.into_record()).await?;
    }

    Ok(counts)
}
