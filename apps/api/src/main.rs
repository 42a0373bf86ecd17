mod config;
mod editor;
mod errors;
mod export;
mod generation;
mod guard;
mod layout;
mod models;
mod render;
mod routes;
mod session;
mod state;
mod theme;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::SvgRasterizer;
use crate::generation::GenerationClient;
use crate::layout::default_canvas_config;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::theme::ThemeState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Remote generation service
    let generation = GenerationClient::new(&config.generation_api_url, config.generation_timeout)?;
    info!(
        "Generation client initialized ({}, timeout {}s)",
        generation.endpoint(),
        config.generation_timeout.as_secs()
    );

    // Font loading scans the filesystem; keep it off the async workers.
    let font_dir = config.font_dir.clone();
    let rasterizer = tokio::task::spawn_blocking(move || SvgRasterizer::new(font_dir.as_deref())).await?;

    let canvas = default_canvas_config();
    info!("Capture canvas: {}px wide", canvas.width_px);

    // Process-wide theme; the preview chrome reads it on every render
    let theme = ThemeState::default();
    let mut theme_changes = theme.subscribe();
    tokio::spawn(async move {
        while theme_changes.changed().await.is_ok() {
            let current = *theme_changes.borrow_and_update();
            info!("Theme set to {current}");
        }
    });

    // Build app state
    let state = AppState {
        config: config.clone(),
        sessions: SessionStore::new(),
        generator: Arc::new(generation),
        rasterizer: Arc::new(rasterizer),
        theme,
        canvas,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
