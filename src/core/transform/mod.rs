//! Data transformation logic
//!
//! Turns the raw search API response into the flat [`crate::domain::Table`]
//! that every sink consumes.

pub mod flatten;

pub use flatten::{flatten_hits, SOURCE_KEYS};
