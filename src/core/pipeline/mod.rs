//! Pipeline driver
//!
//! Runs the stages of one extract in order and reports their outcome.
//!
//! Fetch and flatten failures always halt the run. Sink failures halt it
//! under [`crate::config::ErrorPolicy::FailFast`] and are recorded under
//! [`crate::config::ErrorPolicy::Continue`].

pub mod coordinator;
pub mod summary;

pub use coordinator::{Pipeline, PipelineBuilder};
pub use summary::{RunSummary, StageReport, StageStatus};
