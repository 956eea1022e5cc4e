//! SUS immunization search API integration

pub mod client;

pub use client::SusClient;
