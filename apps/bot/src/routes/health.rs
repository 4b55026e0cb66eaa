/// GET / and GET /health
/// Static liveness body for the hosting platform's probe.
pub async fn health_handler() -> &'static str {
    "Bot is running!"
}
