//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one pipeline run, stage by stage.

use crate::config::ErrorPolicy;
use crate::domain::Stage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Succeeded,
    Skipped,
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageStatus::Succeeded => "succeeded",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Report for one stage of a run
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Human-readable detail: what was written, why it was skipped, or the error
    pub detail: String,
    pub duration: Duration,
}

impl StageReport {
    pub fn succeeded(stage: Stage, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            stage,
            status: StageStatus::Succeeded,
            detail: detail.into(),
            duration,
        }
    }

    pub fn skipped(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            detail: reason.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn failed(stage: Stage, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            detail: error.into(),
            duration,
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique id of this run, attached to every log line of the summary
    pub run_id: Uuid,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Number of flattened records
    pub record_count: usize,

    pub dry_run: bool,

    pub on_error: ErrorPolicy,

    /// Stage outcomes in execution order
    pub stages: Vec<StageReport>,
}

impl RunSummary {
    /// Start a new summary
    pub fn new(dry_run: bool, on_error: ErrorPolicy) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            record_count: 0,
            dry_run,
            on_error,
            stages: Vec::new(),
        }
    }

    /// Record the outcome of a stage
    pub fn record(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    /// Mark the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Report for `stage`, if it was reached
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Status of `stage`, if it was reached
    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.stage(stage).map(|r| r.status)
    }

    /// Stages that failed
    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Failed)
            .map(|r| r.stage)
            .collect()
    }

    /// True when no stage failed
    pub fn is_successful(&self) -> bool {
        self.stages.iter().all(|r| r.status != StageStatus::Failed)
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|finished| (finished - self.started_at).to_std().ok())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            records = self.record_count,
            dry_run = self.dry_run,
            on_error = %self.on_error,
            duration_ms = self.duration().map(|d| d.as_millis() as u64).unwrap_or(0),
            successful = self.is_successful(),
            "Run completed"
        );

        for report in &self.stages {
            match report.status {
                StageStatus::Failed => tracing::warn!(
                    run_id = %self.run_id,
                    stage = %report.stage,
                    status = %report.status,
                    detail = %report.detail,
                    "Stage outcome"
                ),
                _ => tracing::info!(
                    run_id = %self.run_id,
                    stage = %report.stage,
                    status = %report.status,
                    detail = %report.detail,
                    duration_ms = report.duration.as_millis() as u64,
                    "Stage outcome"
                ),
            }
        }
    }
}
