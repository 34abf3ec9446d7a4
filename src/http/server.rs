//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request id, tracing, timeout, body limit,
//!   request log, bearer auth)
//! - Bind server to listener and drain on shutdown
//! - Flush the store once the listener has stopped

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::AdmissionController;
use crate::audit::AuditLog;
use crate::config::OccupancyConfig;
use crate::http::handlers;
use crate::http::middleware::request_log::{request_log_middleware, RequestLogState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::query::QueryEngine;
use crate::rooms::RoomRegistry;
use crate::security::{access_control_middleware, AccessControlState};
use crate::storage::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub admission: AdmissionController,
    pub rooms: RoomRegistry,
    pub queries: QueryEngine,
}

impl AppState {
    pub fn new(store: Arc<Store>, audit: AuditLog) -> Self {
        Self {
            admission: AdmissionController::new(store.clone(), audit.clone()),
            rooms: RoomRegistry::new(store.clone(), audit.clone()),
            queries: QueryEngine::new(store, audit),
        }
    }
}

/// HTTP server for the occupancy service.
pub struct HttpServer {
    router: Router,
    config: OccupancyConfig,
    state: AppState,
    store: Arc<Store>,
}

impl HttpServer {
    /// Create a new HTTP server over an opened store and audit log.
    pub fn new(config: OccupancyConfig, store: Arc<Store>, audit: AuditLog) -> Self {
        let state = AppState::new(store.clone(), audit.clone());
        let router = Self::build_router(&config, state.clone(), audit);
        Self {
            router,
            config,
            state,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &OccupancyConfig, state: AppState, audit: AuditLog) -> Router {
        let access = AccessControlState::from_config(&config.auth);
        let request_log = RequestLogState {
            audit,
            config: Arc::new(config.request_log.clone()),
            body_limit: config.security.max_body_size,
        };

        let protected = Router::new()
            .route("/rooms", get(handlers::list_rooms).post(handlers::create_room))
            .route("/rooms/{id}", patch(handlers::update_room))
            .route("/visitors", post(handlers::check_in))
            .route("/visitors/active", get(handlers::active_visitors))
            .route("/visitors/{id}", get(handlers::get_visit))
            .route("/visitors/{id}/checkout", post(handlers::check_out))
            .route("/visits/history", get(handlers::history))
            .route("/logs", get(handlers::logs))
            .route_layer(middleware::from_fn_with_state(
                access,
                access_control_middleware,
            ));

        Router::new()
            .route("/healthz", get(handlers::healthz))
            .merge(protected)
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(
                request_log,
                request_log_middleware,
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires, then flush the store.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Err(e) = self.store.save().await {
            tracing::error!(error = %e, "Failed to flush store on shutdown");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &OccupancyConfig {
        &self.config
    }
}
