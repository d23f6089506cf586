//! # Scheduling
//!
//! The domain services of Shiftboard, written against the storage contract of
//! the `database` crate so they run unchanged on PostgreSQL and in memory.
//!
//! - [`Scheduling`]: validated CRUD for every collection, paginated listing,
//!   and the preloaded detail views.
//! - [`guard`]: the catalogue of relationships that block a delete, and the
//!   transactional guarded delete.
//! - [`Lifecycle`]: reset, seed and reset-and-seed of the reference dataset.

pub mod dataset;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod resource;
pub mod service;

pub use error::ServiceError;
pub use guard::{Dependent, dependents_of, guarded_delete};
pub use lifecycle::{Lifecycle, TableCount};
pub use resource::{Params, Resource};
pub use service::{ScheduleDetail, Scheduling, TeamDetail, TemplateDay, TemplateDetail};
