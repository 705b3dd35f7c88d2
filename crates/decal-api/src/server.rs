//! Webhook ingestion server.
//!
//! Provides health, ready, and the order-creation webhook endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use decal_core::storage::BucketClass;
use decal_core::{Config, Error, ObjectStore, Result};
use decal_flow::{Fulfillment, OrderReport, RunOptions};
use decal_orders::OrderPayload;

use crate::error::{ApiError, ApiResult};
use crate::signature::{SIGNATURE_HEADER, verify_signature};

/// Key probed by the readiness check; its absence is the expected state.
const READY_CHECK_KEY: &str = "__decal/ready-check";

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
    /// Optional message about readiness state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Shared application state for all request handlers.
pub struct AppState {
    /// The shared fulfillment pipeline.
    fulfillment: Arc<Fulfillment>,
    /// Storage gateway, used directly only by the readiness check.
    store: Arc<dyn ObjectStore>,
    /// Webhook signing secret; absent only in misconfigured deployments.
    webhook_secret: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("webhook_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Health check endpoint handler.
///
/// Returns 200 OK if the service is alive. This is a shallow check
/// that doesn't verify dependencies.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check endpoint handler.
///
/// Probes the templates bucket with a fetch of a key that is never
/// uploaded: a clean not-found proves credentials and network path,
/// anything else marks the service not ready.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state
        .store
        .fetch(BucketClass::Templates, READY_CHECK_KEY)
        .await
    {
        Ok(_) | Err(Error::AssetNotFound { .. }) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                message: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                message: Some(format!("storage check failed: {e}")),
            }),
        ),
    }
}

/// Order-creation webhook handler.
///
/// Verifies the delivery signature over the raw body before parsing,
/// then runs the fulfillment pipeline. The response is always 200 with
/// the full order report once the signature and payload are accepted;
/// item and annotation failures are inside the report, never an HTTP
/// error, so the event source does not retry work that was contained.
async fn orders_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<OrderReport>> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Err(ApiError::internal("webhook secret not configured"));
    };
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::missing_signature)?;
    if !verify_signature(secret, &body, signature) {
        tracing::warn!("webhook delivery rejected, signature did not verify");
        return Err(ApiError::invalid_signature());
    }

    let payload: OrderPayload = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid order payload: {e}")))?;

    let report = state
        .fulfillment
        .process(&payload, &RunOptions::default())
        .await;
    Ok(Json(report))
}

/// The webhook ingestion server.
pub struct Server {
    config: Config,
    fulfillment: Arc<Fulfillment>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a new server over an assembled pipeline.
    #[must_use]
    pub fn new(config: Config, fulfillment: Arc<Fulfillment>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            fulfillment,
            store,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::new(AppState {
            fulfillment: Arc::clone(&self.fulfillment),
            store: Arc::clone(&self.store),
            webhook_secret: self.config.webhook_secret.clone(),
        });

        Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
            .route("/webhooks/orders/create", post(orders_create))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the port
    /// cannot be bound.
    pub async fn serve(&self) -> Result<()> {
        self.config.validate_for_server()?;

        decal_flow::metrics::register_metrics();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(http_port = self.config.http_port, "Starting webhook server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal {
                message: format!("failed to bind to {addr}: {e}"),
            })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to test
    /// the routes without actually binding to a port.
    #[doc(hidden)]
    #[must_use]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }
}
