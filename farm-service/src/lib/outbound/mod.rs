pub mod repositories;
pub mod telemetry;
