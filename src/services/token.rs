//! JWT 签发与校验（HS256）。
//!
//! 时间窗口（`nbf` / `exp`）由本模块按调用方传入的时间判断，便于在测试中固定时钟。

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user_id
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid token")]
    Invalid,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Unix 秒
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: user_id,
            iat: issued_at,
            nbf: issued_at,
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// 校验签名与时间窗口，`now` 恰好等于 exp 时仍视为有效
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        let now = now.timestamp();
        if claims.nbf > now {
            return Err(TokenError::NotYetValid);
        }
        if claims.exp < now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
