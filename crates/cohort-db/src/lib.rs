//! Cohort user groups service - Postgres persistence.
//!
//! Diesel schema, row models, query builders, embedded migrations, and the
//! Postgres implementations of the `cohort-core` storage traits.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
