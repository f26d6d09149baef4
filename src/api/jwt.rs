use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::identity::SessionPrincipal;

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
///
/// Uses OnceLock for thread-safe lazy initialization.
/// The service is initialized once on first use and reused for all subsequent requests.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

/// Session Token Claims
///
/// Carries the tenant scope (org) alongside the user identity so every
/// analytics query can be scoped without a database round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Organization id
    pub org: String,
    pub org_name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// JWT Service for generating and validating session tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_hours: u64,
}

impl JwtService {
    pub fn new(secret: &str, session_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_hours,
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        // Use the configured secret; generate a secure random one when empty
        let jwt_secret = if config.api.jwt_secret.is_empty() {
            use tracing::warn;
            warn!("JWT secret not configured or empty, generating secure random token");
            crate::utils::generate_secure_token(32)
        } else {
            config.api.jwt_secret.clone()
        };

        Self::new(&jwt_secret, config.api.session_hours)
    }

    /// Generate a session token for an authenticated principal
    pub fn generate_session_token(
        &self,
        principal: &SessionPrincipal,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: principal.user_id.to_string(),
            email: principal.email.clone(),
            name: principal.full_name.clone(),
            role: principal.role.clone(),
            org: principal.organization_id.to_string(),
            org_name: principal.organization_name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.session_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "session".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a session token
    pub fn validate_session_token(
        &self,
        token: &str,
    ) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;

        // Verify token type
        if token_data.claims.token_type != "session" {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}
