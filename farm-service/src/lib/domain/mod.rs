pub mod farmer;
pub mod telemetry;
