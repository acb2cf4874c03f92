//! Row types for the reference data tables.
//!
//! Every type serializes in camelCase, the shape the HTTP API and import
//! files use. [`crate::record::Record::from_serialize`] maps those keys back
//! to column names.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub mod continent;
pub mod country;

pub use continent::{Continent, ContinentFilters, ContinentUpdate, NewContinent};
pub use country::{Country, CountryFilters, CountryUpdate, NewCountry};

/// A fresh random identifier for rows created without one.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing field (`None`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
