pub mod advisor;
pub mod market;
pub mod plan;
pub mod profile;
pub mod simulate;
pub mod sip;
