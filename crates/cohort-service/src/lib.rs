//! Cohort user groups service - domain logic.
//!
//! [`GroupCoordinator`] owns every cross-record rule of the groups module:
//! name uniqueness, the one-default-per-tenant invariant, membership and
//! current-group-reference sync, and the platform event hooks.

pub mod coordinator;
pub mod error;

pub use coordinator::GroupCoordinator;
pub use error::{GroupsError, GroupsResult};
