use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use tracing::Level;

use crate::error::{AppError, AppResult};
use crate::handlers::json_body;
use crate::middleware::auth::TOKEN_COOKIE;
use crate::models::response::ApiResponse;
use crate::models::user::{
    CurrentUser, LoginRequest, LoginResponse, RegisterRequest, UserInfoResult, UserResult,
};
use crate::services::user_service;
use crate::AppState;

/// 用户注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResult>>)> {
    let payload = json_body(payload)?;
    tracing::info!(">>> 注册请求: username={}", payload.username);

    let user = user_service::register(&state.db, &payload).await?;

    tracing::info!("<<< 注册成功: id={}, username={}", user.id, user.username);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResult { user })),
    ))
}

/// 用户登录：token 同时写入响应体与 HttpOnly Cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let payload = json_body(payload)?;

    let (issued, user) = user_service::authenticate(&state.db, &state.tokens, &payload)
        .await
        .inspect_err(|e| log_login_failure(&payload.username, e))?;

    tracing::info!("登录成功: id={}, username={}", user.id, user.username);

    let cookie = Cookie::build((TOKEN_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            status: "success",
            message: "Logged in successfully".to_string(),
            token: issued.token,
            expires_in: issued.expires_at,
            user,
        }),
    ))
}

/// 只有凭据错误按普通登录失败记录，库/内部故障单独报错
fn login_failure_level(err: &AppError) -> Level {
    match err {
        AppError::InvalidCredentials => Level::INFO,
        AppError::Database(_) | AppError::Internal(_) => Level::ERROR,
        _ => Level::DEBUG,
    }
}

fn log_login_failure(username: &str, err: &AppError) {
    let level = login_failure_level(err);
    if level == Level::INFO {
        tracing::info!("登录失败: username={}", username);
    } else if level == Level::ERROR {
        tracing::error!("登录异常: username={}, error={}", username, err);
    } else {
        tracing::debug!("登录请求被拒绝: username={}, {}", username, err);
    }
}

/// 退出登录：用已过期的同名 Cookie 覆盖，服务端无状态
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    let mut cookie = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();

    (
        jar.add(cookie),
        Json(ApiResponse::message("Logged out successfully")),
    )
}

pub async fn user_info(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<UserInfoResult>> {
    Json(ApiResponse::success(UserInfoResult { user_info: user }))
}
