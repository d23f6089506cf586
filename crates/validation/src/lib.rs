//! # Validation
//!
//! A small rule engine that keeps scheduling records internally consistent.
//!
//! Rules are registered on a [`Validator`] as tagged [`Rule`] values and
//! evaluated as a batch. Every failure is reported, in registration order, so
//! callers can surface either the first message or all of them.
//!
//! Each entity's rule set lives behind the [`Validate`] trait.

pub mod entities;
pub mod error;
pub mod rule;

pub use entities::Validate;
pub use error::RuleFailure;
pub use rule::{Moment, Presence, Rule, ValidationOutcome, Validator};
