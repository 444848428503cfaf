//! Request handlers

pub mod bills;
pub mod health;
pub mod payments;
pub mod routes;

use core_kernel::AgentId;
use domain_agents::AgentRole;

use crate::auth::Claims;
use crate::error::ApiError;

/// Requires the caller to hold the admin role
pub(crate) fn require_admin(claims: &Claims) -> Result<AgentId, ApiError> {
    let role = claims.agent_role().map_err(|_| ApiError::Unauthorized)?;
    if !role.is_admin() {
        return Err(ApiError::Forbidden("administrator role required".to_string()));
    }
    claims.agent_id().map_err(|_| ApiError::Unauthorized)
}

/// Requires the caller to be a debt recovery agent
pub(crate) fn require_dra(claims: &Claims) -> Result<AgentId, ApiError> {
    let role = claims.agent_role().map_err(|_| ApiError::Unauthorized)?;
    if role != AgentRole::Dra {
        return Err(ApiError::Forbidden(
            "debt recovery agent role required".to_string(),
        ));
    }
    claims.agent_id().map_err(|_| ApiError::Unauthorized)
}

/// Resolves the caller's identity and role, any role accepted
pub(crate) fn authenticated(claims: &Claims) -> Result<(AgentId, AgentRole), ApiError> {
    let role = claims.agent_role().map_err(|_| ApiError::Unauthorized)?;
    let id = claims.agent_id().map_err(|_| ApiError::Unauthorized)?;
    Ok((id, role))
}
