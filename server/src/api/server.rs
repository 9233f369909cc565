//! API server initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{analytics, courses, health, orders, users};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::TransactionalService;
use crate::data::cache::CacheService;
use crate::domain::AnalyticsService;

/// Services the HTTP layer needs
#[derive(Clone)]
pub struct ApiServices {
    pub database: Arc<TransactionalService>,
    pub cache: Arc<CacheService>,
    pub analytics: Arc<AnalyticsService>,
}

/// Build the full application router
pub fn router(services: ApiServices, allowed_origins: &AllowedOrigins) -> Router {
    let ApiServices {
        database,
        cache,
        analytics,
    } = services;

    Router::new()
        .route("/ping", get(health::ping))
        .route("/api/v1/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/api/v1/analytics", analytics::routes(analytics))
        .nest(
            "/api/v1/users",
            users::routes(database.clone(), cache.clone()),
        )
        .nest(
            "/api/v1/courses",
            courses::routes(database.clone(), cache.clone()),
        )
        .nest("/api/v1/orders", orders::routes(database, cache))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let host = app.config.server.host.clone();
        let port = app.config.server.port;

        let router = router(
            ApiServices {
                database: app.database.clone(),
                cache: app.cache.clone(),
                analytics: app.analytics.clone(),
            },
            &allowed_origins,
        );

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", host, port))?;
        tracing::info!(
            address = %listener.local_addr()?,
            "Server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
