use serde::Serialize;
use thiserror::Error;

/// A single failed rule. The display text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RuleFailure {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{start} must not {} {end}", order_verb(.numeric))]
    InvalidOrder {
        start: &'static str,
        end: &'static str,
        numeric: bool,
    },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be one of: {}", .allowed.join(", "))]
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

fn order_verb(numeric: &bool) -> &'static str {
    if *numeric { "exceed" } else { "be after" }
}
