use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::Utc;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::user::CurrentUser;
use crate::services::user_service;
use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// 登录态守卫：解析 token -> 校验签名与有效期 -> 回查用户 -> 注入 CurrentUser
pub async fn guard(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 1. 提取 token（Authorization 头优先，其次 Cookie）
    let token = extract_token(req.headers()).ok_or(AppError::Unauthorized)?;

    // 2. 校验签名、nbf、exp
    let claims = state.tokens.verify(&token, Utc::now()).map_err(|e| {
        tracing::warn!("token 校验失败: {}", e);
        AppError::from(e)
    })?;

    // 3. 回查用户，查不到或 id 不一致一律拒绝
    let user = match user_service::find_by_id(&state.db, claims.sub).await? {
        Some(user) if user.id == claims.sub => user,
        _ => {
            tracing::warn!("token 主体无法解析为有效用户: sub={}", claims.sub);
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }
    };

    req.extensions_mut().insert(CurrentUser(user.into()));
    Ok(next.run(req).await)
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token);
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_bearer_header() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_cookie_fallback() {
        let h = headers(&[(header::COOKIE, "theme=dark; token=from-cookie")]);
        assert_eq!(extract_token(&h).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_header_takes_precedence_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        assert_eq!(extract_token(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_scheme_falls_back_to_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwdw=="),
            (header::COOKIE, "token=from-cookie"),
        ]);
        assert_eq!(extract_token(&h).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let h = headers(&[(header::AUTHORIZATION, "bearer lower-case")]);
        assert_eq!(extract_token(&h).as_deref(), Some("lower-case"));
    }

    #[test]
    fn test_missing_everything() {
        assert!(extract_token(&HeaderMap::new()).is_none());
        assert!(extract_token(&headers(&[(header::AUTHORIZATION, "Bearer ")])).is_none());
        assert!(extract_token(&headers(&[(header::COOKIE, "token=")])).is_none());
    }
}
