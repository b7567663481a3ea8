//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::mail::{Mailer, MailTransportFactory, SmtpTransportFactory, TemplateStore};
use anyhow::Result;
use axum::{routing::any, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Every exchange must produce a response within this window.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<Mailer>,
}

/// Build the HTTP router.
///
/// `/send` is registered for every method: the handler itself answers
/// non-POST with the same body as the fallback.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(api::relay::index))
        .route("/send", any(api::relay::send))
        .fallback(api::relay::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(RESPONSE_TIMEOUT))
        .with_state(state)
}

/// Wire the mailer from configuration and produce the shared state.
pub fn build_state(config: Config, factory: Arc<dyn MailTransportFactory>) -> AppState {
    let templates = TemplateStore::new(&config.template_dir);
    let mailer = Arc::new(Mailer::new(&config, templates, factory));

    AppState {
        config: Arc::new(config),
        mailer,
    }
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    let addr = config.http_addr();
    let state = build_state(config, Arc::new(SmtpTransportFactory));
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server started on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
