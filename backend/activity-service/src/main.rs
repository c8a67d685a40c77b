use activity_service::config::{Config, StoreBackend};
use activity_service::consumers::ActivityEventsConsumer;
use activity_service::metrics;
use activity_service::repository::{
    ActivityRepository, InMemoryActivityRepository, PgActivityRepository,
};
use activity_service::services::ActivityStore;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,activity_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting activity-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env = {}, store = {:?}, kafka = {}",
        config.app.env,
        config.store,
        config.kafka.is_some()
    );

    let repository: Arc<dyn ActivityRepository> = match config.store {
        StoreBackend::Postgres => {
            let db = config
                .database
                .as_ref()
                .ok_or_else(|| anyhow!("postgres store selected without database config"))?;

            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .min_connections(db.min_connections)
                .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
                .connect(&db.url)
                .await
                .context("Failed to create database pool")?;
            info!("Database pool created successfully");

            let repository = PgActivityRepository::new(pool);
            info!("Running database migrations...");
            repository
                .migrate()
                .await
                .context("Failed to run migrations")?;
            info!("Migrations completed successfully");

            Arc::new(repository)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory activity store - records are lost on restart");
            Arc::new(InMemoryActivityRepository::new())
        }
    };

    let store = ActivityStore::new(repository)
        .with_span(info_span!("activity_store", backend = ?config.store));

    match config.kafka.clone() {
        Some(kafka_config) => match ActivityEventsConsumer::new(kafka_config, store.clone()) {
            Ok(consumer) => {
                tokio::spawn(consumer.run());
            }
            Err(e) => {
                error!("Failed to create activity events consumer: {}", e);
                warn!("activity-service will run without Kafka ingestion");
            }
        },
        None => warn!("KAFKA_BROKERS not set - activity ingestion disabled"),
    }

    let bind = (config.app.host.clone(), config.app.http_port);
    info!("Starting HTTP server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(|| async { "READY" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
    })
    .bind(bind)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
