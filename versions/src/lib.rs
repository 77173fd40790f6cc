pub mod cache;
pub mod catalog;
pub mod fetch;
pub mod metrics_defs;
pub mod store;
pub mod testutils;
pub mod ttl;
pub mod types;
