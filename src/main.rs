//! Shelfkeeper Server - Library Catalog and Lending
//!
//! JSON HTTP server for books, borrowers and loans.

use anyhow::Context;
use axum::{
    routing::{get, patch},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfkeeper::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    tracing::info!("Starting Shelfkeeper Server v{}", env!("CARGO_PKG_VERSION"));

    // Fail fast on a bad clock offset rather than on the first form submission
    config.lending.clock_offset()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let repository = Repository::new(pool);
    let services = Services::new(&repository, config.lending.clone());

    let state = AppState {
        services: Arc::new(services),
        repository,
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfkeeper={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books
        .route(
            "/books",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route("/books/new", get(api::books::new_book))
        .route(
            "/books/search",
            get(api::books::search_page).post(api::books::search_results),
        )
        .route(
            "/books/:id",
            get(api::books::show_book)
                .patch(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/books/:id/edit", get(api::books::edit_book))
        .route("/books/:id/assign", patch(api::books::assign_book))
        .route("/books/:id/release", patch(api::books::release_book))
        // People
        .route(
            "/people",
            get(api::people::list_people).post(api::people::create_person),
        )
        .route("/people/new", get(api::people::new_person))
        .route(
            "/people/:id",
            get(api::people::show_person)
                .patch(api::people::update_person)
                .delete(api::people::delete_person),
        )
        .route("/people/:id/edit", get(api::people::edit_person))
        .route("/people/:id/books", get(api::people::held_books))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
