pub mod api;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
pub mod utils;
