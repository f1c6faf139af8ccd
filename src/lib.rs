pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod query;
pub mod report;
pub mod roles;
pub mod similarity;
pub mod source;
pub mod store;
