use chrono::Utc;
use once_cell::sync::Lazy;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::user::{LoginRequest, RegisterRequest, User, UserResponse};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{IssuedToken, TokenService};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at, updated_at, deleted_at";

const USERNAME_TAKEN: &str = "Username already exists.";
const EMAIL_TAKEN: &str = "Email already exists.";

// 用户不存在时也跑一次完整的 Argon2 校验，使两种失败耗时一致
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("reminder-backend-dummy-password").ok());

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1 AND deleted_at IS NULL",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// 查找与用户名或（小写）邮箱冲突的现存用户
async fn find_conflicting(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users
         WHERE (username = $1 OR LOWER(email) = $2) AND deleted_at IS NULL
         LIMIT 1",
        USER_COLUMNS
    ))
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// 直接写库，唯一索引冲突映射为与预检相同的 409
pub async fn insert_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<User> {
    let result = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        // 预检与插入之间的并发注册由唯一索引兜底
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let message = match db_err.constraint() {
                Some(name) if name.contains("email") => EMAIL_TAKEN,
                _ => USERNAME_TAKEN,
            };
            Err(AppError::Conflict(message.to_string()))
        }
        Err(e) => Err(AppError::BadGateway(format!("Registration failed: {}", e))),
    }
}

/// 注册：校验 -> 冲突预检 -> 哈希 -> 写库
pub async fn register(pool: &PgPool, payload: &RegisterRequest) -> AppResult<UserResponse> {
    let email = payload.validate()?;

    if let Some(existing) = find_conflicting(pool, &payload.username, &email).await? {
        let message = if existing.username == payload.username {
            USERNAME_TAKEN
        } else {
            EMAIL_TAKEN
        };
        return Err(AppError::Conflict(message.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = insert_user(pool, &payload.username, &email, &password_hash).await?;
    Ok(user.into())
}

/// 登录：用户不存在与密码错误返回同一个错误
pub async fn authenticate(
    pool: &PgPool,
    tokens: &TokenService,
    payload: &LoginRequest,
) -> AppResult<(IssuedToken, UserResponse)> {
    payload.validate()?;

    let Some(user) = find_by_username(pool, &payload.username).await? else {
        if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
            verify_password(&payload.password, dummy);
        }
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let issued = tokens.issue(user.id, Utc::now())?;
    Ok((issued, user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        let dummy = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        // 任意用户输入都不应通过
        assert!(!verify_password("secret123", dummy));
        assert!(!verify_password("", dummy));
    }
}
