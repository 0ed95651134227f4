//! HTTP front end for the user groups module.
//!
//! Exposes the RPC-style operations under `/api/groups`, resolves the caller
//! identity forwarded by the host platform's gateway, and wires the
//! coordinator over its Postgres stores.

pub mod app;
pub mod error;
pub mod middleware;
pub mod service_handler;
