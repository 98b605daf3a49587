use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 对外输出的用户信息，不含密码哈希
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 认证中间件解析出的当前用户，作为请求扩展传给 handler
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserResponse);

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    /// 校验通过后返回小写化的邮箱
    pub fn validate(&self) -> Result<String, AppError> {
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::validation(
                "Username must be at least 3 characters.",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "Password must be at least 6 characters.",
            ));
        }
        if self.password != self.confirm_password {
            return Err(AppError::validation("Passwords do not match"));
        }

        let email = normalize_email(&self.email);
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
            _ => Err(AppError::validation("A valid email address is required.")),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    /// 长度预检不涉及数据库，不会泄露用户是否存在
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::validation(
                "Username must be at least 3 characters.",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "Password must be at least 6 characters.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: String,
    pub token: String,
    /// token 的 exp（Unix 秒）
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResult {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResult {
    pub user_info: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_register_valid_normalizes_email() {
        let req = register("alice", "  Alice@Example.COM ", "secret1", "secret1");
        assert_eq!(req.validate().unwrap(), "alice@example.com");
    }

    #[test]
    fn test_register_short_username() {
        let req = register("al", "a@b.c", "secret1", "secret1");
        assert_eq!(
            message(req.validate().unwrap_err()),
            "Username must be at least 3 characters."
        );
    }

    #[test]
    fn test_register_short_password() {
        let req = register("alice", "a@b.c", "12345", "12345");
        assert_eq!(
            message(req.validate().unwrap_err()),
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn test_register_password_mismatch() {
        let req = register("alice", "a@b.c", "secret1", "secret2");
        assert_eq!(
            message(req.validate().unwrap_err()),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_register_rejects_email_without_at() {
        let req = register("alice", "alice.example.com", "secret1", "secret1");
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_register_request_camel_case_and_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"bob","email":"b@x.io","password":"pw1234","confirmPassword":"pw1234"}"#,
        )
        .unwrap();
        assert_eq!(req.confirm_password, "pw1234");

        let empty: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(empty.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_login_validation() {
        let ok = LoginRequest {
            username: "alice".into(),
            password: "secret1".into(),
        };
        assert!(ok.validate().is_ok());

        let short = LoginRequest {
            username: "al".into(),
            password: "secret1".into(),
        };
        assert!(matches!(short.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let now = Utc::now();
        let user = User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["id"], 7);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(!json.to_string().contains("argon2"));
    }
}
