//! Identity gate
//!
//! Credential validation and session establishment. A successful login
//! yields a [`SessionPrincipal`] carrying the org/user/role claims that
//! scope every analytics query to the caller's tenant.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::jwt::{SessionClaims, get_jwt_service};
use crate::errors::{CardtraceError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::password::verify_password;

/// Authenticated caller identity and tenant scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrincipal {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub organization_id: Uuid,
    pub organization_name: String,
}

impl TryFrom<SessionClaims> for SessionPrincipal {
    type Error = CardtraceError;

    fn try_from(claims: SessionClaims) -> Result<Self> {
        Ok(Self {
            user_id: Uuid::from_str(&claims.sub)
                .map_err(|_| CardtraceError::unauthorized("Malformed user id in token"))?,
            email: claims.email,
            full_name: claims.name,
            role: claims.role,
            organization_id: Uuid::from_str(&claims.org)
                .map_err(|_| CardtraceError::unauthorized("Malformed organization id in token"))?,
            organization_name: claims.org_name,
        })
    }
}

/// Validates credentials and issues/verifies session tokens
pub struct IdentityGate {
    storage: Arc<SeaOrmStorage>,
}

impl IdentityGate {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Validate credentials against the user table.
    ///
    /// Unknown email, inactive account and wrong password all produce
    /// the same unauthorized error so the response does not reveal
    /// which part failed.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionPrincipal> {
        let Some(user) = self.storage.find_active_user_by_email(email).await? else {
            debug!("Login rejected: no active user for email");
            return Err(CardtraceError::unauthorized("Invalid email or password"));
        };

        let matches = verify_password(password, &user.password_hash)
            .map_err(|e| CardtraceError::unauthorized(e.to_string()))?;
        if !matches {
            debug!("Login rejected: password mismatch");
            return Err(CardtraceError::unauthorized("Invalid email or password"));
        }

        let organization_name = self
            .storage
            .find_organization(user.organization_id)
            .await?
            .map(|org| org.name)
            .unwrap_or_default();

        Ok(SessionPrincipal {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            organization_id: user.organization_id,
            organization_name,
        })
    }

    /// Issue a signed session token for an authenticated principal
    pub fn issue_session(&self, principal: &SessionPrincipal) -> Result<String> {
        Ok(get_jwt_service().generate_session_token(principal)?)
    }

    /// Verify a session token and rebuild the principal it carries
    pub fn verify(&self, token: &str) -> Result<SessionPrincipal> {
        let claims = get_jwt_service().validate_session_token(token)?;
        SessionPrincipal::try_from(claims)
    }
}
