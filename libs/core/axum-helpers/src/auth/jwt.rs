use super::config::JwtConfig;
use super::role::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Default token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub exp: i64,
    pub iat: i64,
}

impl JwtClaims {
    /// Unknown role names in the token are ignored.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles
            .iter()
            .filter_map(|r| r.parse::<Role>().ok())
            .any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies HS256 tokens. Cheap to clone.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            ttl_seconds: config.ttl_seconds,
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        roles: &[String],
        email_verified: bool,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            email: email.to_string(),
            roles: roles.to_vec(),
            email_verified,
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;
        Ok(token)
    }

    /// Checks the signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> eyre::Result<JwtClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.keys.decoding, &validation)?;
        Ok(data.claims)
    }
}
