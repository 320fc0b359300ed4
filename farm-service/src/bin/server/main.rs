use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use farm_service::config::Config;
use farm_service::domain::farmer::ports::FarmerRepository;
use farm_service::domain::farmer::service::FarmerService;
use farm_service::inbound::http::router::create_router;
use farm_service::outbound::repositories::PostgresFarmerRepository;
use farm_service::outbound::telemetry::ThingSpeakClient;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "farm-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        telemetry_base_url = %config.telemetry.base_url,
        telemetry_timeout_secs = config.telemetry.timeout_secs,
        token_expiration_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let authenticator = Arc::new(Authenticator::with_hasher(
        config.jwt.secret.as_bytes(),
        password_hasher,
    ));

    let farmer_repository = Arc::new(PostgresFarmerRepository::new(pg_pool));
    let registered = farmer_repository.count().await?;
    tracing::info!(farmers = registered, "Farmer store ready");

    let telemetry = Arc::new(ThingSpeakClient::new(&config.telemetry)?);

    let farmer_service = Arc::new(FarmerService::new(
        farmer_repository,
        telemetry,
        Arc::clone(&authenticator),
        config.jwt.expiration_hours,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(farmer_service, authenticator);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
