//! Solved-status sync for the company-wise question browser.
//!
//! Auth and the per-user document store are collaborators behind traits;
//! [`tracker::ProgressTracker`] ties them together with a local fallback
//! file for when the store cannot be reached.

pub mod auth;
pub mod fallback;
pub mod store;
pub mod subscription;
pub mod tracker;

pub use companywise_core as core;
