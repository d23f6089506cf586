//! # Pagination
//!
//! Turns raw collection query parameters into a storage [`Window`] and wraps
//! the resulting rows in a [`Page`] envelope.
//!
//! Two request forms are accepted. The page form (`page`, `pageSize`) is used
//! whenever either of its parameters is present; otherwise the slice form
//! (`limit`, `offset`) applies. Malformed values never fail a request, they
//! fall back to the defaults.

pub mod page;
pub mod request;

pub use core_types::Window;
pub use page::{Page, total_pages};
pub use request::{PageLimits, PageRequest};
