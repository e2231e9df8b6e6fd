mod aggregate;
mod config;
mod db;
mod error;
mod extractors;
mod handlers;
mod models;
mod state;
mod views;

use axum::{
    Router,
    extract::State,
    handler::HandlerWithoutStateExt,
    response::Html,
    routing::{get, post},
};
use config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use state::AppState;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Clone)]
struct StaticDir(PathBuf);

async fn root_handler(State(StaticDir(dir)): State<StaticDir>) -> Html<String> {
    tokio::fs::read_to_string(dir.join("index.html"))
        .await
        .map(Html)
        .unwrap_or_else(|_| Html("<h1>Fyyur</h1><p>See /api/venues, /api/artists and /api/shows.</p>".to_string()))
}

fn app(app_state: AppState, static_dir: &str) -> Router {
    let api = Router::new()
        .route(
            "/api/venues",
            get(handlers::list_venues).post(handlers::create_venue),
        )
        .route("/api/venues/search", post(handlers::search_venues))
        .route(
            "/api/venues/{venue_id}",
            get(handlers::get_venue)
                .put(handlers::update_venue)
                .delete(handlers::delete_venue),
        )
        .route(
            "/api/artists",
            get(handlers::list_artists).post(handlers::create_artist),
        )
        .route("/api/artists/search", post(handlers::search_artists))
        .route(
            "/api/artists/{artist_id}",
            get(handlers::get_artist)
                .put(handlers::update_artist)
                .delete(handlers::delete_artist),
        )
        .route(
            "/api/shows",
            get(handlers::list_shows).post(handlers::create_show),
        )
        .with_state(app_state);

    Router::new()
        .route("/", get(root_handler))
        .with_state(StaticDir(PathBuf::from(static_dir)))
        .nest_service(
            "/static",
            ServeDir::new(static_dir).not_found_service(handlers::route_not_found.into_service()),
        )
        .merge(api)
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("failed to parse DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await
        .expect("failed to connect to db");

    db::migrate(&pool).await.expect("failed to create tables");

    if config.seed_database {
        match db::seed_database_if_empty(&pool).await {
            Ok(true) => info!("Database was empty, sample venues, artists and shows added"),
            Ok(false) => {}
            Err(e) => error!("Failed to seed database: {e}"),
        }
    }

    let app = app(AppState { pool }, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
