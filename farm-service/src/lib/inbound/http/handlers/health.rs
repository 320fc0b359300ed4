/// Liveness probe.
pub async fn health() -> &'static str {
    "Smart Farm API is running!"
}
