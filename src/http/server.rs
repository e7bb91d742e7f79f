//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener
//! - Run the dispatcher against the shared path table
//! - Apply reloaded dispatch settings without a restart

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{error_chain, ErrorDescriptor};
use crate::http::request::{extract_snapshot, request_id, request_id_header, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{DispatchReport, ErrorReport};
use crate::keyring::{RequestSnapshot, RequestSources};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{DispatchSettings, Dispatcher, PathTable, RequestContext};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<PathTable>,
    pub settings: Arc<ArcSwap<DispatchSettings>>,
    pub max_body_size: usize,
}

/// HTTP server exposing the path table.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    settings: Arc<ArcSwap<DispatchSettings>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, table: PathTable) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(config.dispatch.settings()));
        let state = AppState {
            table: Arc::new(table),
            settings: settings.clone(),
            max_body_size: config.listener.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            settings,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id
                )
            }))
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
    }

    /// The configured router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Live dispatch settings; storing new settings affects later requests.
    pub fn settings(&self) -> Arc<ArcSwap<DispatchSettings>> {
        self.settings.clone()
    }

    /// Run the server until `shutdown` fires, accepting connections on the
    /// given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.signalled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Stores every reloaded set of dispatch settings; requests already running
/// keep the settings they started with.
pub fn spawn_settings_reload(
    settings: Arc<ArcSwap<DispatchSettings>>,
    mut updates: mpsc::UnboundedReceiver<DispatchSettings>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(next) = updates.recv().await {
            settings.store(Arc::new(next));
            metrics::record_settings_reload();
        }
    })
}

/// Main handler: snapshot the request, dispatch, report.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().to_string();

    let response = match extract_snapshot(request, state.max_body_size).await {
        Ok(snapshot) => match run_dispatch(&state, snapshot) {
            Ok(ctx) => DispatchReport::from_context(&request_id, &ctx).into_response(),
            Err(errors) => {
                ErrorReport::new(&request_id, StatusCode::INTERNAL_SERVER_ERROR, errors).into_response()
            }
        },
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request");
            let status = e.status();
            ErrorReport::new(&request_id, status, error_chain(&e, None)).into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

/// Synchronous part of a request: nothing here crosses an await.
fn run_dispatch(state: &AppState, snapshot: RequestSnapshot) -> Result<RequestContext, Vec<ErrorDescriptor>> {
    let settings = state.settings.load();
    let dispatcher = Dispatcher::with_settings(
        state.table.clone(),
        RequestSources::from_snapshot(snapshot),
        &settings,
    );

    let mut chain = Vec::new();
    match dispatcher.dispatch_with_error_handling(|errors| chain = errors, None) {
        Some(ctx) => {
            tracing::debug!(passes = ctx.passes(), handled = ctx.handled().len(), "Request dispatched");
            Ok(ctx)
        }
        None => Err(chain),
    }
}
