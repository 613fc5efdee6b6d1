pub mod metrics;
pub mod statistics;
