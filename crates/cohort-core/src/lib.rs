//! Cohort user groups service - core types.
//!
//! Configuration, error types, domain models, and the storage-facing traits
//! shared by every other crate in the workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod store;
pub mod types;
