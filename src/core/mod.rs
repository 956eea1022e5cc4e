//! Core business logic for the SUS extract.
//!
//! # Modules
//!
//! - [`transform`] - Flattening of search hits into a [`crate::domain::Table`]
//! - [`pipeline`] - Stage orchestration and run summaries
//!
//! # Run Workflow
//!
//! 1. **Fetch**: Query the search API once
//! 2. **Flatten**: Project every hit onto the eleven record fields
//! 3. **File**: Write CSV and, if enabled, Parquet
//! 4. **Bucket**: Upload the files to object storage
//! 5. **Relational**: Replace the PostgreSQL table contents
//! 6. **Documents**: Upsert one Cosmos DB document per record
//!
//! # Example
//!
//! ```rust,no_run
//! use sus_etl::config::load_config;
//! use sus_etl::core::pipeline::Pipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sus-etl.toml")?;
//! let pipeline = Pipeline::from_config(&config).await?;
//!
//! let summary = pipeline.run().await?;
//! println!("Records: {}", summary.record_count);
//! println!("Successful: {}", summary.is_successful());
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod transform;
