//! 运行配置：启动时从环境变量（以及 `.env`）一次性加载，之后显式传递给各组件。

use chrono::Duration;
use std::net::SocketAddr;

const DEFAULT_SERVER_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080); // 监听所有网卡
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: SocketAddr,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub token_ttl: Duration,
    /// 为空时 CORS 放行任意来源（不携带凭据）
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    /// 调用前先执行 `dotenvy::dotenv()`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值来源构造配置，测试中无需修改进程环境
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => postgres_url_from_parts(&get)?,
        };

        let jwt_secret = get("JWT_SECRET_KEY").ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;

        let server_addr = parse_or("SERVER_ADDR", get("SERVER_ADDR"), || {
            SocketAddr::from(DEFAULT_SERVER_ADDR)
        })?;
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            || DEFAULT_MAX_CONNECTIONS,
        )?;
        let acquire_timeout_secs = parse_or(
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            get("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            || DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?;
        let ttl_hours: i64 = parse_or("TOKEN_TTL_HOURS", get("TOKEN_TTL_HOURS"), || {
            DEFAULT_TOKEN_TTL_HOURS
        })?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            max_connections,
            acquire_timeout_secs,
            token_ttl: Duration::hours(ttl_hours),
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        })
    }
}

/// 未设置 DATABASE_URL 时，由 POSTGRES_* 分项拼出连接串
fn postgres_url_from_parts<G>(get: &G) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let host = get("POSTGRES_DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let port = get("POSTGRES_DB_PORT").unwrap_or_else(|| "5432".to_string());
    let user = get("POSTGRES_USER").ok_or(ConfigError::Missing("POSTGRES_USER"))?;
    let password = get("POSTGRES_PASSWORD").unwrap_or_default();
    let db = get("POSTGRES_DB").ok_or(ConfigError::Missing("POSTGRES_DB"))?;

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        user, password, host, port, db
    ))
}

fn parse_or<T, D>(key: &'static str, raw: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    D: FnOnce() -> T,
{
    match raw {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
        None => Ok(default()),
    }
}
