//! Pipeline coordinator
//!
//! Drives one run: fetch, flatten, file, bucket, relational, documents.

use crate::adapters::cosmosdb::write_documents;
use crate::adapters::factory;
use crate::adapters::file::{write_outputs, FileOutputs};
use crate::adapters::postgresql::replace_load;
use crate::adapters::sink::{DocumentStore, ObjectStore, RecordSource, RelationalStore};
use crate::adapters::storage::upload_outputs;
use crate::config::{EtlConfig, ErrorPolicy, OutputConfig, StorageConfig};
use crate::core::pipeline::summary::{RunSummary, StageReport};
use crate::core::transform::flatten_hits;
use crate::domain::{EtlError, Result, Stage, Table};
use std::sync::Arc;
use std::time::Instant;

const NOT_CONFIGURED: &str = "not configured";
const DRY_RUN: &str = "dry run";

/// One configured extract
pub struct Pipeline {
    source: Arc<dyn RecordSource>,
    output: OutputConfig,
    object_store: Option<(Arc<dyn ObjectStore>, StorageConfig)>,
    relational_store: Option<Arc<dyn RelationalStore>>,
    document_store: Option<Arc<dyn DocumentStore>>,
    on_error: ErrorPolicy,
    dry_run: bool,
}

impl Pipeline {
    /// Start building a pipeline around `source`
    pub fn builder(source: Arc<dyn RecordSource>, output: OutputConfig) -> PipelineBuilder {
        PipelineBuilder {
            pipeline: Pipeline {
                source,
                output,
                object_store: None,
                relational_store: None,
                document_store: None,
                on_error: ErrorPolicy::default(),
                dry_run: false,
            },
        }
    }

    /// Build the production pipeline from configuration
    ///
    /// Remote clients are not created in dry-run mode.
    pub async fn from_config(config: &EtlConfig) -> Result<Self> {
        let source = factory::create_record_source(config)?;
        let dry_run = config.application.dry_run;

        let mut builder = Pipeline::builder(source, config.output.clone())
            .on_error(config.pipeline.on_error)
            .dry_run(dry_run);

        if dry_run {
            return Ok(builder.build());
        }

        if let (Some(store), Some(storage)) = (
            factory::create_object_store(config).await?,
            config.storage.clone(),
        ) {
            builder = builder.object_store(store, storage);
        }
        if let Some(store) = factory::create_relational_store(config).await? {
            builder = builder.relational_store(store);
        }
        if let Some(store) = factory::create_document_store(config).await? {
            builder = builder.document_store(store);
        }

        Ok(builder.build())
    }

    pub fn on_error_policy(&self) -> ErrorPolicy {
        self.on_error
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Returns `EtlError::Stage` when fetch or flatten fails, or when a sink
    /// fails under [`ErrorPolicy::FailFast`]. Under [`ErrorPolicy::Continue`]
    /// sink failures are only recorded in the returned summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::new(self.dry_run, self.on_error);

        tracing::info!(
            run_id = %summary.run_id,
            endpoint = %self.source.endpoint(),
            dry_run = self.dry_run,
            on_error = %self.on_error,
            "Starting run"
        );

        let outcome = self.execute(&mut summary).await;

        summary.finish();
        summary.log_summary();

        outcome.map(|()| summary)
    }

    async fn execute(&self, summary: &mut RunSummary) -> Result<()> {
        let started = Instant::now();
        let raw = self
            .source
            .fetch()
            .await
            .map_err(|e| halt(summary, Stage::Fetch, started, e))?;
        summary.record(StageReport::succeeded(
            Stage::Fetch,
            format!("fetched from {}", self.source.endpoint()),
            started.elapsed(),
        ));

        let started = Instant::now();
        let table = flatten_hits(&raw).map_err(|e| halt(summary, Stage::Flatten, started, e))?;
        summary.record_count = table.len();
        summary.record(StageReport::succeeded(
            Stage::Flatten,
            format!("{} records", table.len()),
            started.elapsed(),
        ));

        let started = Instant::now();
        let outcome = write_outputs(&table, &self.output);
        let outputs = self.settle(summary, Stage::File, started, outcome, |o| {
            format!("wrote {}", o.csv.path.display())
        })?;

        self.bucket_stage(summary, outputs.as_ref()).await?;
        self.relational_stage(summary, &table).await?;
        self.documents_stage(summary, &table).await?;

        Ok(())
    }

    async fn bucket_stage(
        &self,
        summary: &mut RunSummary,
        outputs: Option<&FileOutputs>,
    ) -> Result<()> {
        if let Some(reason) = self.skip_reason(self.object_store.is_some()) {
            return skip(summary, Stage::Bucket, reason);
        }
        let Some((ref store, ref storage)) = self.object_store else {
            return Ok(());
        };
        let Some(outputs) = outputs else {
            return skip(summary, Stage::Bucket, "local files were not written");
        };

        let started = Instant::now();
        let outcome = upload_outputs(store.as_ref(), outputs, storage).await;
        self.settle(summary, Stage::Bucket, started, outcome, |uploaded| {
            format!("{} objects to {}", uploaded.len(), store.bucket())
        })?;
        Ok(())
    }

    async fn relational_stage(&self, summary: &mut RunSummary, table: &Table) -> Result<()> {
        if let Some(reason) = self.skip_reason(self.relational_store.is_some()) {
            return skip(summary, Stage::Relational, reason);
        }
        let Some(ref store) = self.relational_store else {
            return Ok(());
        };

        let started = Instant::now();
        let outcome = replace_load(store.as_ref(), table).await;
        self.settle(summary, Stage::Relational, started, outcome, |rows| {
            format!("{rows} rows into {}", store.table_name())
        })?;
        Ok(())
    }

    async fn documents_stage(&self, summary: &mut RunSummary, table: &Table) -> Result<()> {
        if let Some(reason) = self.skip_reason(self.document_store.is_some()) {
            return skip(summary, Stage::Documents, reason);
        }
        let Some(ref store) = self.document_store else {
            return Ok(());
        };

        let started = Instant::now();
        let outcome = write_documents(store.as_ref(), table).await;
        self.settle(summary, Stage::Documents, started, outcome, |written| {
            format!("{written} documents into {}", store.container_name())
        })?;
        Ok(())
    }

    /// Reason to skip a remote sink, if any
    fn skip_reason(&self, configured: bool) -> Option<&'static str> {
        if self.dry_run {
            Some(DRY_RUN)
        } else if !configured {
            Some(NOT_CONFIGURED)
        } else {
            None
        }
    }

    /// Record a sink outcome and apply the error policy
    fn settle<T>(
        &self,
        summary: &mut RunSummary,
        stage: Stage,
        started: Instant,
        outcome: Result<T>,
        detail: impl FnOnce(&T) -> String,
    ) -> Result<Option<T>> {
        match outcome {
            Ok(value) => {
                summary.record(StageReport::succeeded(
                    stage,
                    detail(&value),
                    started.elapsed(),
                ));
                Ok(Some(value))
            }
            Err(e) => match self.on_error {
                ErrorPolicy::FailFast => Err(halt(summary, stage, started, e)),
                ErrorPolicy::Continue => {
                    tracing::warn!(stage = %stage, error = %e, "Stage failed, continuing");
                    summary.record(StageReport::failed(stage, e.to_string(), started.elapsed()));
                    Ok(None)
                }
            },
        }
    }
}

fn halt(
    summary: &mut RunSummary,
    stage: Stage,
    started: Instant,
    error: EtlError,
) -> EtlError {
    tracing::error!(stage = %stage, error = %error, "Stage failed, halting run");
    summary.record(StageReport::failed(
        stage,
        error.to_string(),
        started.elapsed(),
    ));
    error.in_stage(stage)
}

fn skip(summary: &mut RunSummary, stage: Stage, reason: &str) -> Result<()> {
    tracing::info!(stage = %stage, reason = %reason, "Stage skipped");
    summary.record(StageReport::skipped(stage, reason));
    Ok(())
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn object_store(mut self, store: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        self.pipeline.object_store = Some((store, config));
        self
    }

    pub fn relational_store(mut self, store: Arc<dyn RelationalStore>) -> Self {
        self.pipeline.relational_store = Some(store);
        self
    }

    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.pipeline.document_store = Some(store);
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.pipeline.on_error = policy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.pipeline.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}
