use crate::rule::{Presence, ValidationOutcome, Validator};
use core_types::{
    Department, Role, Schedule, Shift, ShiftTemplate, ShiftType, Team, TeamMember, User,
};

/// The rule set of one kind of record.
pub trait Validate {
    fn validator(&self) -> Validator;

    fn validate(&self) -> ValidationOutcome {
        self.validator().evaluate()
    }
}

impl Validate for User {
    fn validator(&self) -> Validator {
        Validator::new()
            .require("name", &self.name)
            .require("username", &self.username)
            .require("email", &self.email)
            .one_of("role", self.role.as_str(), Role::NAMES)
    }
}

impl Validate for Team {
    fn validator(&self) -> Validator {
        Validator::new().require("name", &self.name)
    }
}

impl Validate for Department {
    fn validator(&self) -> Validator {
        Validator::new().require("name", &self.name)
    }
}

impl Validate for ShiftType {
    fn validator(&self) -> Validator {
        Validator::new()
            .require("name", &self.name)
            .time_range(
                "defaultStartTime",
                "defaultEndTime",
                self.default_start_time,
                self.default_end_time,
            )
            .number_range(
                "minDurationMinutes",
                "maxDurationMinutes",
                self.min_duration_minutes,
                self.max_duration_minutes,
            )
    }
}

impl Validate for ShiftTemplate {
    fn validator(&self) -> Validator {
        Validator::new()
            .require("name", &self.name)
            .number_range(
                "minDurationMinutes",
                "maxDurationMinutes",
                self.min_duration_minutes,
                self.max_duration_minutes,
            )
    }
}

impl Validate for Schedule {
    fn validator(&self) -> Validator {
        Validator::new()
            .require("name", &self.name)
            .require("startDate", self.start_date)
            .require("endDate", self.end_date)
            .time_range(
                "startDate",
                "endDate",
                Some(self.start_date),
                Some(self.end_date),
            )
    }
}

impl Validate for Shift {
    fn validator(&self) -> Validator {
        // The break is only bounded once both ends are set and in order; an
        // inverted or incomplete shift already fails on its times.
        let timed = self.start_time.is_present()
            && self.end_time.is_present()
            && self.start_time <= self.end_time;
        Validator::new()
            .require("userId", self.user_id)
            .require("scheduleId", self.schedule_id)
            .require("startTime", self.start_time)
            .require("endTime", self.end_time)
            .time_range("startTime", "endTime", Some(self.start_time), Some(self.end_time))
            .within(
                "breakMinutes",
                "shift duration",
                self.break_minutes,
                timed.then(|| self.duration_minutes()),
            )
    }
}

impl Validate for TeamMember {
    fn validator(&self) -> Validator {
        Validator::new()
            .require("teamId", self.team_id)
            .require("userId", self.user_id)
            .require("role", &self.role)
    }
}
