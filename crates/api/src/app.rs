use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::notification::Notifier;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{activities, delist_requests, events, health, members, reports};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub notifier: Arc<dyn Notifier>,
}

pub fn create_app(config: Config, pool: PgPool, notifier: Arc<dyn Notifier>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        notifier,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Versioned API routes. Caller identity is asserted per handler via the
    // Caller extractor.
    let api_routes = Router::new()
        // Events and reference data
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:event_id", get(events::get_event))
        .route(
            "/api/v1/events/:event_id/activities",
            get(events::list_event_activities),
        )
        .route("/api/v1/event-types", get(events::list_event_types))
        // Activities and bookings
        .route("/api/v1/activities/:activity_id", get(activities::get_activity))
        .route(
            "/api/v1/activities/:activity_id/enlist",
            post(activities::enlist),
        )
        .route(
            "/api/v1/activities/:activity_id/delist",
            post(activities::delist),
        )
        .route(
            "/api/v1/activities/:activity_id/confirm",
            post(activities::confirm),
        )
        .route(
            "/api/v1/activities/:activity_id/completed",
            patch(activities::set_completed),
        )
        // Delist requests
        .route(
            "/api/v1/delist-requests",
            post(delist_requests::create_delist_request)
                .get(delist_requests::list_delist_requests),
        )
        .route(
            "/api/v1/delist-requests/:request_id",
            get(delist_requests::get_delist_request)
                .patch(delist_requests::resolve_delist_request),
        )
        // Members and verification
        .route("/api/v1/members", post(members::register_member))
        .route(
            "/api/v1/members/:member_id",
            get(members::get_member).patch(members::update_member),
        )
        .route(
            "/api/v1/members/:member_id/activities",
            get(members::list_member_activities),
        )
        .route(
            "/api/v1/members/:member_id/verify/:channel/request",
            post(members::request_verification),
        )
        .route(
            "/api/v1/members/:member_id/verify/:channel/confirm",
            post(members::confirm_verification),
        )
        // Staff reports
        .route("/api/v1/reports/double-booked", get(reports::double_booked))
        .route("/api/v1/reports/members/ready", get(reports::members_ready))
        .route(
            "/api/v1/reports/members/not-ready",
            get(reports::members_not_ready),
        )
        .route(
            "/api/v1/reports/members/has-card",
            get(reports::members_has_card),
        )
        .route("/api/v1/reports/completion", get(reports::completion));

    // Public routes (no caller identity required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
