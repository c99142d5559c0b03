//! Axum router and server loop.

use std::future::Future;
use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_admin;
use crate::handlers::{admin, public, verify};
use crate::{AppState, RpcError};

/// Upper bound on a multipart image upload.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the full application router.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let admin_routes = Router::new()
        .route(
            "/brands",
            get(admin::list_brands).post(admin::create_brand),
        )
        .route(
            "/brands/:id",
            put(admin::update_brand).delete(admin::delete_brand),
        )
        .route(
            "/code-patterns",
            get(admin::list_code_patterns).post(admin::create_code_pattern),
        )
        .route("/code-patterns/:id", delete(admin::delete_code_pattern))
        .route(
            "/fake-patterns",
            get(admin::list_fake_patterns).post(admin::create_fake_pattern),
        )
        .route("/fake-patterns/:id", delete(admin::delete_fake_pattern))
        .route("/history", get(admin::history))
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let app = Router::new()
        .route("/api/health", get(public::health))
        .route("/api/verify/code", post(verify::verify_code))
        .route(
            "/api/verify/image",
            post(verify::verify_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/brands", get(public::list_brands))
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http());

    let app = if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };

    app.with_state(state)
}

/// Binds the router to a socket and serves it.
pub struct RpcServer {
    pub addr: SocketAddr,
    pub enable_cors: bool,
}

impl RpcServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            enable_cors: true,
        }
    }

    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Serve until `shutdown` resolves.
    pub async fn start<F>(&self, state: AppState, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(state, self.enable_cors);
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.addr)))?;
        info!(addr = %self.addr, "HTTP API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("HTTP API stopped");
        Ok(())
    }
}
