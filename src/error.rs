use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::response::ApiResponse;
use crate::services::password::PasswordError;
use crate::services::token::TokenError;

/// 登录失败统一使用同一提示，不区分“用户不存在”与“密码错误”
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// 所有 handler 的统一错误类型，最终渲染为 `{status, message}` 信封
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// 注册写库的非约束类失败
    #[error("{0}")]
    BadGateway(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 信封里的 status 字段：凭据错误为 "fail"，其余为 "error"
    fn envelope_status(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "fail",
            _ => "error",
        }
    }

    /// 对外消息，内部错误细节只进日志
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "Database error.".to_string(),
            AppError::Internal(_) => "Internal server error.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => AppError::Internal(format!("generating token failed: {}", msg)),
            TokenError::Expired | TokenError::NotYetValid | TokenError::Invalid => {
                AppError::Unauthorized
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Database(e) => tracing::error!("数据库操作失败: {}", e),
            AppError::Internal(msg) => tracing::error!("内部错误: {}", msg),
            AppError::BadGateway(msg) => tracing::error!("写库失败: {}", msg),
            _ => tracing::debug!("请求被拒绝 [{}]: {}", status, self),
        }

        let body: ApiResponse<()> = ApiResponse {
            status: self.envelope_status(),
            message: Some(self.public_message()),
            result: None,
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
