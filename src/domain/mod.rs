//! Domain models and types for the SUS extract.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record types** ([`RawResult`], [`FlatRecord`], [`Table`])
//! - **Error types** ([`EtlError`], [`SourceError`]) and the [`Stage`] they are attributed to
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]. Stage failures keep their
//! underlying cause:
//!
//! ```rust
//! use sus_etl::domain::{EtlError, Stage};
//!
//! let err = EtlError::StructuralMismatch("missing hits.hits".to_string())
//!     .in_stage(Stage::Flatten);
//! assert_eq!(err.stage(), Some(Stage::Flatten));
//! ```

pub mod errors;
pub mod record;
pub mod result;

pub use errors::{EtlError, SourceError, Stage};
pub use record::{FlatRecord, RawResult, Table};
pub use result::Result;
