use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use config::AppConfig;
use services::token::TokenService;

// 全局状态：连接池与 token 服务，请求之间只读共享
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: PgPool, config: &AppConfig) -> Self {
        Self {
            db,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl),
        }
    }
}

/// 健康检查 Handler：用于运维平台监测服务可用性
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "up", "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: database error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "down", "error": "database_error" })),
            )
        }
    }
}

pub async fn connect_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// 配置了来源时只放行该来源并允许携带 Cookie，否则放行任意来源
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    match allowed_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/register", post(handlers::auth_handler::register))
        .route("/login", post(handlers::auth_handler::login))
        .route("/logout", post(handlers::auth_handler::logout))
        .route("/health", get(health_check));

    let protected_routes = Router::new()
        .route("/userInfo", get(handlers::auth_handler::user_info))
        .route(
            "/reminders",
            get(handlers::reminder_handler::list_reminders),
        )
        .route(
            "/reminders/create",
            post(handlers::reminder_handler::create_reminder),
        )
        .route(
            "/reminders/delete/:id",
            delete(handlers::reminder_handler::delete_reminder),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::guard,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
