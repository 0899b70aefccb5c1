use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::consultation::{ConsultationReply, ConsultationRequest};
use crate::constants;
use crate::error::ConsultError;
use crate::gateway::Gateway;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env()),
            gateway,
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env() -> AutoReloader {
    AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        notifier.watch_path("templates", true);
        Ok(env)
    })
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, Html<String>> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => "Firm AI",
                    welcome => constants::WELCOME_TEXT,
                    suggestions => constants::QUERY_SUGGESTIONS,
                    fallback => constants::CLIENT_FALLBACK,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            Html(format!("Internal Server Error: {}", e))
        })
}

async fn consult_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConsultationRequest>, JsonRejection>,
) -> Result<Json<ConsultationReply>, ConsultError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(%rejection, "Rejecting undecodable consultation body");
        ConsultError::InvalidBody(rejection.body_text())
    })?;

    let response = state.gateway.consult(request).await?;
    Ok(Json(ConsultationReply { response }))
}

/// Builds the application router around an already-wired gateway.
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/consult", post(consult_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(AppState::new(gateway))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16, gateway: Arc<Gateway>) -> Result<()> {
    let app = router(gateway);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
