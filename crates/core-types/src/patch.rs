//! Helpers for partial updates.
//!
//! A patch field of type `Option<Option<T>>` distinguishes a field that was
//! left out of the request (`None`) from one explicitly set to null
//! (`Some(None)`). Serde collapses both into `None` unless the field is
//! deserialized through [`double_option`].

use serde::{Deserialize, Deserializer};

/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrites `target` when the patch carries a value.
pub fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
