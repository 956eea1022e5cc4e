// SUS immunization extract
// Copyright (c) 2025 SUS ETL Contributors
// Licensed under the MIT License

//! # SUS immunization extract
//!
//! Pulls immunization records from the Brazilian SUS search API and loads
//! them into every configured destination.
//!
//! ## Overview
//!
//! One run performs a single query and then:
//! - **Flattens** each hit into an eleven-field [`domain::FlatRecord`]
//! - **Writes** a CSV file and, optionally, a Snappy-compressed Parquet file
//! - **Uploads** both files to an S3-compatible bucket
//! - **Replaces** the contents of a PostgreSQL table
//! - **Upserts** one Cosmos DB document per record
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Flattening and the pipeline driver
//! - [`adapters`] - Search API, files, object storage, PostgreSQL, Cosmos DB
//! - [`domain`] - Record types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sus_etl::config::load_config;
//! use sus_etl::core::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sus-etl.toml")?;
//!     let pipeline = Pipeline::from_config(&config).await?;
//!
//!     let summary = pipeline.run().await?;
//!     println!("Loaded {} records", summary.record_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. A failed run says
//! which stage broke:
//!
//! ```rust,no_run
//! use sus_etl::domain::{EtlError, Stage};
//!
//! fn report(err: &EtlError) {
//!     match err.stage() {
//!         Some(Stage::Fetch) => eprintln!("search API unavailable: {}", err.root()),
//!         Some(stage) => eprintln!("{stage} failed: {}", err.root()),
//!         None => eprintln!("{err}"),
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
