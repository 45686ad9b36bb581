pub mod chart;
pub mod gallery;
pub mod ingestion;
pub mod notifications;
pub mod products;
pub mod query;
