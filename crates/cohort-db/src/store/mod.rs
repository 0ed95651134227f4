//! Postgres implementations of the `cohort-core` storage traits.

pub mod directory;
pub mod group;

pub use directory::PgUserDirectory;
pub use group::PgGroupStore;
