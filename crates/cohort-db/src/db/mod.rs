pub mod connection;
pub mod migrate;
pub mod query;
pub mod schema;
