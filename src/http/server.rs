//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: `/health` plus one catch-all gateway handler
//! - Wire up middleware (request ID, tracing, CORS, body limit)
//! - Resolve each request against the route table
//! - Serve catalog lookups locally, forward everything else upstream
//! - Emit one summary log line and metrics per request
//!
//! # Design Decisions
//! - Every failure is a `GatewayError` rendered at a single point
//! - Upstream bodies are streamed in both directions; only small JSON bodies
//!   are buffered for validation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, State},
    http::{header, Method, Request, StatusCode},
    middleware::map_response_with_state,
    response::{IntoResponse, Response},
    routing::any,
    BoxError, Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::catalog::{CatalogError, CatalogStore};
use crate::config::{GatewayConfig, LimitsConfig};
use crate::error::GatewayError;
use crate::http::payload::prepare_body;
use crate::http::request::{build_upstream_request, request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::json_bytes;
use crate::observability::metrics;
use crate::routing::{ResolvedRoute, RouteTarget, Router as ProxyRouter};
use crate::security::cors::cors_layer;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub upstream: UpstreamClient,
    pub catalog: Arc<CatalogStore>,
    pub limits: LimitsConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create the server. Fails when a configured catalog directory cannot be loaded.
    pub fn new(config: GatewayConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog.static_dir {
            Some(dir) => CatalogStore::load(dir)?,
            None => CatalogStore::default(),
        };

        let state = AppState {
            router: Arc::new(ProxyRouter::from_config(&config)),
            upstream: UpstreamClient::new(&config.timeouts, &config.limits),
            catalog: Arc::new(catalog),
            limits: config.limits.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The body limit's plain-text 413 is re-rendered as a gateway error
    /// before CORS sees it; CORS needs an inner body with a `Default`.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let max_upload_bytes = config.limits.max_upload_bytes;
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(cors_layer(&config.cors))
            .layer(map_response_with_state(max_upload_bytes, render_body_limit))
            .layer(RequestBodyLimitLayer::new(max_upload_bytes));

        Router::new()
            .route("/health", any(health_handler))
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            data_collector = %self.config.upstreams.data_collector_url,
            script_generator = %self.config.upstreams.script_generator_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router without a listener, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn health_handler(method: Method) -> Result<Json<serde_json::Value>, GatewayError> {
    if method != Method::GET {
        return Err(GatewayError::MethodNotAllowed {
            method,
            path: "/health".to_string(),
            allowed: vec![Method::GET],
        });
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// Replace the body limit layer's plain-text 413 with the JSON error body.
///
/// Gateway errors are already JSON, so an upstream 413 passes unchanged.
async fn render_body_limit<B>(State(limit): State<usize>, response: Response<B>) -> Response
where
    B: HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        tracing::info!(limit, "Request body exceeds upload limit");
        return GatewayError::PayloadTooLarge { limit }.into_response();
    }
    response.map(Body::new)
}

/// Gateway handler: resolve, dispatch, render, log.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let (route, target, result) = match state.router.resolve(&method, &path, query.as_deref()) {
        Ok(resolved) => {
            let route = resolved.endpoint.name;
            let target = resolved.target.to_string();
            tracing::debug!(request_id = %request_id, route, target = %target, "Route resolved");
            (route, target, dispatch(&state, resolved, request, client).await)
        }
        Err(err) => ("none", "-".to_string(), Err(err)),
    };

    let (response, error_kind) = match result {
        Ok(response) => (response, None),
        Err(err) => {
            let kind = err.kind();
            (err.into_response(), Some(kind.as_str()))
        }
    };

    let status = response.status().as_u16();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route,
        target = %target,
        status,
        error = error_kind,
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(&method, route, status, start);

    response
}

async fn dispatch(
    state: &AppState,
    resolved: ResolvedRoute<'_>,
    request: Request<Body>,
    client: Option<SocketAddr>,
) -> Result<Response, GatewayError> {
    match resolved.target {
        RouteTarget::Catalog(kind) => Ok(json_bytes(state.catalog.get(kind))),
        RouteTarget::Upstream { backend, uri } => {
            let (mut parts, body) = request.into_parts();
            let body = prepare_body(
                &resolved.endpoint.body,
                &mut parts.headers,
                body,
                state.limits.max_json_body_bytes,
            )
            .await?;
            let upstream_request = build_upstream_request(&parts, uri, body, client);
            state.upstream.send(backend, upstream_request).await
        }
    }
}
