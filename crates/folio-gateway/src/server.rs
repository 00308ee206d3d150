//! HTTP gateway server.

use crate::error::GatewayError;
use crate::handlers;
use crate::mail::Mailer;
use crate::session::SessionRegistry;
use crate::Result;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use folio_chat::ChatResources;
use folio_core::config::GatewayConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Live chat sessions.
    pub sessions: Arc<SessionRegistry>,

    /// Chatbot resources; `None` when startup failed.
    pub resources: Option<Arc<ChatResources>>,

    /// Contact form delivery; `None` when mail is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,

    /// Gateway configuration.
    pub config: Arc<GatewayConfig>,
}

/// The portfolio HTTP server.
pub struct Gateway {
    state: AppState,
}

impl Gateway {
    /// Create a gateway. Pass `None` resources to serve in degraded mode.
    pub fn new(config: GatewayConfig, resources: Option<Arc<ChatResources>>) -> Self {
        let sessions = Arc::new(SessionRegistry::from_config(&config));
        Self {
            state: AppState {
                sessions,
                resources,
                mailer: None,
                config: Arc::new(config),
            },
        }
    }

    /// Deliver contact forms through `mailer`.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.state.mailer = Some(mailer);
        self
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let static_files = ServeDir::new(&config.static_dir)
            .not_found_service(handlers::not_found.into_service());

        Router::new()
            .route("/", get(handlers::index))
            .route("/video", get(handlers::video))
            .route("/chat", get(handlers::chat_status).post(handlers::chat))
            .route("/contact", post(handlers::contact))
            .route("/health", get(handlers::health))
            .nest_service("/static", static_files)
            .fallback(handlers::not_found)
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&config.cors_origins))
            .with_state(self.state.clone())
    }

    /// Run the gateway server until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let config = &self.state.config;
        let addr = format!("{}:{}", config.host, config.port);

        if self.state.resources.is_none() {
            warn!("Chatbot unavailable; /chat will answer with 500");
        }
        if self.state.mailer.is_none() {
            warn!("Mail not configured; /contact will answer with 500");
        }

        let sweeper = self
            .state
            .sessions
            .spawn_sweeper(Duration::from_secs(config.session_sweep_secs));

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(GatewayError::Io)?;
        info!("Starting gateway server on http://{}", addr);

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()));

        sweeper.abort();
        info!("Gateway stopped");
        served
    }
}

/// CORS for the configured origins; `*` allows any.
fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(handlers::SESSION_HEADER),
        ])
        .max_age(Duration::from_secs(3600))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
