//! Shared model, parsing and query layer for the company-wise question
//! dataset.
//!
//! Holds the document types, the CSV line scanner, name formatting, the
//! client-side filter/sort helpers, the error taxonomy, atomic JSON
//! persistence and CLI settings.

pub mod csv;
pub mod error;
pub mod filters;
pub mod formatting;
pub mod models;
pub mod persist;
pub mod settings;

pub use error::{CompanywiseError, Result};
