use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
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

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes::{
    audit_logs, auth, categories, departments, health, issue_records, issue_requests, items,
    settings, transfers, users,
};
use crate::services::email::EmailService;
use shared::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub email: EmailService,
}

pub fn create_app(config: Config, pool: PgPool, email: EmailService) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let jwt = JwtConfig::new(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.access_token_expiry_secs,
        config.jwt.refresh_token_expiry_secs,
        config.jwt.leeway_secs,
    )
    .context("invalid JWT key configuration")?;

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: Arc::new(jwt),
        email,
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

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password));

    // Authenticated routes. Authentication happens in the UserAuth
    // extractor, capability checks in the handlers.
    let user_routes = Router::new()
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/me", get(users::current_user))
        .route("/api/v1/users/:user_id", get(users::get_user))
        .route("/api/v1/users/:user_id", delete(users::delete_user))
        .route("/api/v1/users/:user_id/approve", post(users::approve_user))
        .route("/api/v1/users/:user_id/role", put(users::change_role))
        .route("/api/v1/users/:user_id/activate", post(users::activate_user))
        .route(
            "/api/v1/users/:user_id/deactivate",
            post(users::deactivate_user),
        )
        .route("/api/v1/users/:user_id/ban", post(users::ban_user))
        .route("/api/v1/users/:user_id/unban", post(users::unban_user));

    let department_routes = Router::new()
        .route("/api/v1/departments", post(departments::create_department))
        .route("/api/v1/departments", get(departments::list_departments))
        .route(
            "/api/v1/departments/:department_id",
            get(departments::get_department),
        )
        .route(
            "/api/v1/departments/:department_id",
            put(departments::update_department),
        )
        .route(
            "/api/v1/departments/:department_id",
            delete(departments::delete_department),
        )
        .route(
            "/api/v1/departments/:department_id/incharge",
            put(departments::assign_incharge),
        )
        .route(
            "/api/v1/departments/:department_id/incharge",
            delete(departments::remove_incharge),
        );

    let category_routes = Router::new()
        .route("/api/v1/categories", post(categories::create_category))
        .route("/api/v1/categories", get(categories::list_categories))
        .route(
            "/api/v1/categories/:category_id",
            get(categories::get_category),
        )
        .route(
            "/api/v1/categories/:category_id",
            put(categories::update_category),
        )
        .route(
            "/api/v1/categories/:category_id",
            delete(categories::delete_category),
        );

    let item_routes = Router::new()
        .route("/api/v1/items", post(items::create_item))
        .route("/api/v1/items", get(items::list_items))
        .route("/api/v1/items/low-stock", get(items::list_low_stock))
        .route("/api/v1/items/:item_id", get(items::get_item))
        .route("/api/v1/items/:item_id", put(items::update_item))
        .route("/api/v1/items/:item_id", delete(items::delete_item))
        .route("/api/v1/items/:item_id/access", post(items::grant_access))
        .route("/api/v1/items/:item_id/access", get(items::list_access))
        .route(
            "/api/v1/items/:item_id/access/:department_id",
            delete(items::revoke_access),
        );

    let issue_routes = Router::new()
        .route(
            "/api/v1/issue-requests",
            post(issue_requests::submit_request),
        )
        .route("/api/v1/issue-requests", get(issue_requests::list_requests))
        .route(
            "/api/v1/issue-requests/:request_id",
            get(issue_requests::get_request),
        )
        .route(
            "/api/v1/issue-requests/:request_id/approve",
            post(issue_requests::approve_request),
        )
        .route(
            "/api/v1/issue-requests/:request_id/reject",
            post(issue_requests::reject_request),
        )
        .route(
            "/api/v1/issue-requests/:request_id/cancel",
            post(issue_requests::cancel_request),
        )
        .route(
            "/api/v1/issue-requests/:request_id/issue",
            post(issue_requests::issue_item),
        )
        .route("/api/v1/issue-records", get(issue_records::list_records))
        .route(
            "/api/v1/issue-records/:record_id",
            get(issue_records::get_record),
        )
        .route(
            "/api/v1/issue-records/:record_id/return",
            post(issue_records::return_item),
        );

    let transfer_routes = Router::new()
        .route("/api/v1/transfers", post(transfers::create_transfer))
        .route("/api/v1/transfers", get(transfers::list_transfers))
        .route(
            "/api/v1/transfers/records",
            get(transfers::list_transfer_records),
        )
        .route(
            "/api/v1/transfers/:transfer_id",
            get(transfers::get_transfer),
        )
        .route(
            "/api/v1/transfers/:transfer_id/approve",
            post(transfers::approve_transfer),
        )
        .route(
            "/api/v1/transfers/:transfer_id/reject",
            post(transfers::reject_transfer),
        )
        .route(
            "/api/v1/transfers/:transfer_id/complete",
            post(transfers::complete_transfer),
        );

    let admin_routes = Router::new()
        .route("/api/v1/settings", get(settings::list_settings))
        .route("/api/v1/settings/:key", put(settings::update_setting))
        .route("/api/v1/audit-logs", get(audit_logs::list_audit_logs));

    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(department_routes)
        .merge(category_routes)
        .merge(item_routes)
        .merge(issue_routes)
        .merge(transfer_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}
