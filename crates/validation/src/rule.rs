use crate::error::RuleFailure;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Values a `Required` rule can inspect. A value is absent when it is the
/// zero value of its type.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl Presence for i32 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

impl Presence for i64 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

impl Presence for NaiveDate {
    fn is_present(&self) -> bool {
        *self != NaiveDate::default()
    }
}

impl Presence for DateTime<Utc> {
    fn is_present(&self) -> bool {
        *self != DateTime::<Utc>::default()
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// A point in time a `TimeRange` rule can order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub enum Moment {
    TimeOfDay(NaiveTime),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Moment {
    /// Zero dates and timestamps mean "not set". Midnight is a real time of day.
    pub fn is_zero(&self) -> bool {
        match self {
            Moment::TimeOfDay(_) => false,
            Moment::Date(date) => *date == NaiveDate::default(),
            Moment::Timestamp(ts) => *ts == DateTime::<Utc>::default(),
        }
    }
}

impl From<NaiveTime> for Moment {
    fn from(value: NaiveTime) -> Self {
        Moment::TimeOfDay(value)
    }
}

impl From<NaiveDate> for Moment {
    fn from(value: NaiveDate) -> Self {
        Moment::Date(value)
    }
}

impl From<DateTime<Utc>> for Moment {
    fn from(value: DateTime<Utc>) -> Self {
        Moment::Timestamp(value)
    }
}

/// One registered rule with the values it was bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required {
        field: &'static str,
        present: bool,
    },
    TimeRange {
        start_label: &'static str,
        end_label: &'static str,
        start: Option<Moment>,
        end: Option<Moment>,
    },
    NumberRange {
        min_label: &'static str,
        max_label: &'static str,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// A non-negative quantity that must also fit inside `bound` when known.
    Within {
        field: &'static str,
        bound_label: &'static str,
        value: i64,
        bound: Option<i64>,
    },
    OneOf {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

impl Rule {
    /// Evaluates the rule. `None` means it passed or was skipped.
    pub fn check(&self) -> Option<RuleFailure> {
        match self {
            Rule::Required { field, present } => {
                (!*present).then_some(RuleFailure::MissingField { field: *field })
            }
            Rule::TimeRange {
                start_label,
                end_label,
                start,
                end,
            } => match (start, end) {
                (Some(start), Some(end)) if !start.is_zero() && !end.is_zero() => {
                    (start > end).then_some(RuleFailure::InvalidOrder {
                        start: *start_label,
                        end: *end_label,
                        numeric: false,
                    })
                }
                _ => None,
            },
            Rule::NumberRange {
                min_label,
                max_label,
                min,
                max,
            } => match (min, max) {
                (Some(min), Some(max)) if *min != 0 && *max != 0 => {
                    (min > max).then_some(RuleFailure::InvalidOrder {
                        start: *min_label,
                        end: *max_label,
                        numeric: true,
                    })
                }
                _ => None,
            },
            Rule::Within {
                field,
                bound_label,
                value,
                bound,
            } => {
                if *value < 0 {
                    return Some(RuleFailure::Negative { field: *field });
                }
                match bound {
                    Some(bound) if value > bound => Some(RuleFailure::InvalidOrder {
                        start: *field,
                        end: *bound_label,
                        numeric: true,
                    }),
                    _ => None,
                }
            }
            Rule::OneOf {
                field,
                value,
                allowed,
            } => {
                let known = allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim()));
                (!known).then(|| RuleFailure::NotAllowed {
                    field: *field,
                    value: value.clone(),
                    allowed: *allowed,
                })
            }
        }
    }
}

/// Accumulates rules against one candidate record.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: Vec<Rule>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `MissingField` when `value` is its type's zero value.
    pub fn require(mut self, field: &'static str, value: impl Presence) -> Self {
        self.rules.push(Rule::Required {
            field,
            present: value.is_present(),
        });
        self
    }

    /// Fails with `InvalidOrder` when `start` is strictly after `end`.
    /// Skipped when either side is unset or zero.
    pub fn time_range<T: Into<Moment>>(
        mut self,
        start_label: &'static str,
        end_label: &'static str,
        start: Option<T>,
        end: Option<T>,
    ) -> Self {
        self.rules.push(Rule::TimeRange {
            start_label,
            end_label,
            start: start.map(Into::into),
            end: end.map(Into::into),
        });
        self
    }

    /// Fails with `InvalidOrder` when `min > max`. Skipped when either side
    /// is unset or zero.
    pub fn number_range<N: Into<i64>>(
        mut self,
        min_label: &'static str,
        max_label: &'static str,
        min: Option<N>,
        max: Option<N>,
    ) -> Self {
        self.rules.push(Rule::NumberRange {
            min_label,
            max_label,
            min: min.map(Into::into),
            max: max.map(Into::into),
        });
        self
    }

    /// Fails with `Negative` below zero, and with `InvalidOrder` above
    /// `bound`. Unlike `number_range`, zero is an ordinary value on both sides.
    pub fn within<N: Into<i64>>(
        mut self,
        field: &'static str,
        bound_label: &'static str,
        value: N,
        bound: Option<i64>,
    ) -> Self {
        self.rules.push(Rule::Within {
            field,
            bound_label,
            value: value.into(),
            bound,
        });
        self
    }

    /// Fails with `NotAllowed` when `value` is not one of `allowed` (case-insensitive).
    pub fn one_of(
        mut self,
        field: &'static str,
        value: impl Into<String>,
        allowed: &'static [&'static str],
    ) -> Self {
        self.rules.push(Rule::OneOf {
            field,
            value: value.into(),
            allowed,
        });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule in registration order.
    pub fn evaluate(&self) -> ValidationOutcome {
        let failures: Vec<RuleFailure> = self.rules.iter().filter_map(Rule::check).collect();
        ValidationOutcome {
            valid: failures.is_empty(),
            failures,
        }
    }
}

/// The result of a batch evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub failures: Vec<RuleFailure>,
}

impl ValidationOutcome {
    /// One message per failed rule, in registration order.
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    /// The message of the first rule that failed.
    pub fn first_message(&self) -> Option<String> {
        self.failures.first().map(ToString::to_string)
    }

    /// `Ok(())` when valid, otherwise every message.
    pub fn into_result(self) -> Result<(), Vec<String>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.messages())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn require_rejects_zero_values() {
        let outcome = Validator::new()
            .require("name", "   ")
            .require("userId", 0i64)
            .require("startDate", NaiveDate::default())
            .require("teamId", None::<i64>)
            .require("email", "a@b.c")
            .evaluate();

        assert!(!outcome.valid);
        assert_eq!(
            outcome.messages(),
            vec![
                "name is required",
                "userId is required",
                "startDate is required",
                "teamId is required",
            ]
        );
    }

    #[test]
    fn first_message_follows_registration_order() {
        let outcome = Validator::new()
            .time_range("startTime", "endTime", Some(hm(17, 0)), Some(hm(9, 0)))
            .require("name", "")
            .evaluate();

        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(
            outcome.first_message().as_deref(),
            Some("startTime must not be after endTime")
        );
    }

    #[test]
    fn time_range_is_skipped_for_unset_or_zero_sides() {
        let outcome = Validator::new()
            .time_range("start", "end", None, Some(hm(9, 0)))
            .time_range(
                "startDate",
                "endDate",
                Some(NaiveDate::default()),
                NaiveDate::from_ymd_opt(2024, 1, 1),
            )
            .time_range(
                "startTime",
                "endTime",
                Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
                Some(DateTime::<Utc>::default()),
            )
            .evaluate();
        assert!(outcome.valid);
        assert_eq!(outcome.first_message(), None);
    }

    #[test]
    fn equal_bounds_are_valid() {
        let outcome = Validator::new()
            .time_range("start", "end", Some(hm(8, 0)), Some(hm(8, 0)))
            .number_range("min", "max", Some(60), Some(60))
            .evaluate();
        assert!(outcome.valid);
    }

    #[test]
    fn number_range_treats_zero_as_unset() {
        let outcome = Validator::new()
            .number_range("minDurationMinutes", "maxDurationMinutes", Some(480), Some(0))
            .evaluate();
        assert!(outcome.valid);

        let outcome = Validator::new()
            .number_range("minDurationMinutes", "maxDurationMinutes", Some(480), Some(240))
            .evaluate();
        assert_eq!(
            outcome.into_result(),
            Err(vec!["minDurationMinutes must not exceed maxDurationMinutes".to_string()])
        );
    }

    #[test]
    fn one_of_lists_the_allowed_values() {
        let outcome = Validator::new()
            .one_of("role", "Manager", &["admin", "manager", "employee"])
            .one_of("role", "owner", &["admin", "manager", "employee"])
            .evaluate();
        assert_eq!(
            outcome.messages(),
            vec!["role must be one of: admin, manager, employee"]
        );
    }

    #[test]
    fn within_treats_zero_as_a_real_bound() {
        let check = |value: i64, bound: Option<i64>| {
            Validator::new()
                .within("breakMinutes", "shift duration", value, bound)
                .evaluate()
                .messages()
        };
        assert_eq!(check(30, Some(0)), vec!["breakMinutes must not exceed shift duration"]);
        assert_eq!(check(-1, Some(60)), vec!["breakMinutes must not be negative"]);
        assert_eq!(check(-1, None), vec!["breakMinutes must not be negative"]);
        assert!(check(0, Some(0)).is_empty());
        assert!(check(500, None).is_empty());
    }

    #[test]
    fn rules_are_introspectable() {
        let validator = Validator::new()
            .require("name", "x")
            .number_range("min", "max", Some(1), None::<i32>);
        assert!(matches!(validator.rules()[0], Rule::Required { field: "name", present: true }));
        assert!(matches!(validator.rules()[1], Rule::NumberRange { max: None, .. }));
    }

    proptest! {
        #[test]
        fn time_range_passes_iff_start_not_after_end(a in 0u32..86_400, b in 0u32..86_400) {
            let start = NaiveTime::from_num_seconds_from_midnight_opt(a, 0).unwrap();
            let end = NaiveTime::from_num_seconds_from_midnight_opt(b, 0).unwrap();
            let outcome = Validator::new()
                .time_range("start", "end", Some(start), Some(end))
                .evaluate();
            prop_assert_eq!(outcome.valid, a <= b);
        }

        #[test]
        fn number_range_passes_iff_min_not_above_max(min in 1i32..10_000, max in 1i32..10_000) {
            let outcome = Validator::new()
                .number_range("min", "max", Some(min), Some(max))
                .evaluate();
            prop_assert_eq!(outcome.valid, min <= max);
        }
    }
}
