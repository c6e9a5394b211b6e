//! Data ingestion layer for the company-wise dataset.
//!
//! Responsible for discovering company directories, reading the per-timeframe
//! CSV files, building the consolidated document and writing it to disk.

pub mod builder;
pub mod reader;
pub mod writer;

pub use companywise_core as core;
