pub mod allocation;
pub mod scoring;
