//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::AgentId;
use domain_agents::AgentRole;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (agent ID)
    pub sub: String,
    /// Agent's role
    pub role: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Parses the subject as an agent identifier
    pub fn agent_id(&self) -> Result<AgentId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// Parses the role claim
    pub fn agent_role(&self) -> Result<AgentRole, AuthError> {
        AgentRole::from_code(&self.role).ok_or(AuthError::InvalidToken)
    }

    /// Whether the token carries the admin role
    pub fn is_admin(&self) -> bool {
        matches!(self.agent_role(), Ok(role) if role.is_admin())
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `agent_id` - Agent identifier
/// * `role` - Agent's role
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    agent_id: AgentId,
    role: AgentRole,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: agent_id.to_string(),
        role: role.code().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let agent_id = AgentId::new();
        let token = create_token(agent_id, AgentRole::Dra, "secret", 3600).unwrap();
        let claims = validate_token(&token, "secret").unwrap();

        assert_eq!(claims.agent_id().unwrap(), agent_id);
        assert_eq!(claims.agent_role().unwrap(), AgentRole::Dra);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(AgentId::new(), AgentRole::Admin, "secret", 3600).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }
}
