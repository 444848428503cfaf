//! Agent repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::AgentId;
use domain_agents::{Agent, AgentRole};

use crate::error::DatabaseError;

/// Database row for an agent
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    pub agent_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl AgentRow {
    fn into_domain(self) -> Result<Agent, DatabaseError> {
        let role = AgentRole::from_code(&self.role)
            .ok_or_else(|| DatabaseError::bad_column("role", &self.role))?;

        Ok(Agent {
            id: self.agent_id.into(),
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            role,
            created_at: self.created_at,
        })
    }
}

/// Repository for agent records
#[derive(Debug, Clone)]
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    /// Creates a new AgentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an agent
    pub async fn create(&self, agent: &Agent) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO agents (agent_id, username, email, full_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(agent.id.as_uuid())
        .bind(&agent.username)
        .bind(&agent.email)
        .bind(&agent.full_name)
        .bind(agent.role.code())
        .bind(agent.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves an agent by id
    pub async fn find_by_id(&self, id: AgentId) -> Result<Agent, DatabaseError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT agent_id, username, email, full_name, role, created_at
            FROM agents
            WHERE agent_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Agent", id))?;

        row.into_domain()
    }

    /// Retrieves an agent by username, falling back to email
    ///
    /// Import sheets identify the collecting agent by either value.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Agent, DatabaseError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT agent_id, username, email, full_name, role, created_at
            FROM agents
            WHERE username = $1 OR email = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Agent", identifier))?;

        row.into_domain()
    }

    /// Lists agents with the DRA role, ordered by username
    pub async fn list_collection_agents(&self) -> Result<Vec<Agent>, DatabaseError> {
        let rows = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT agent_id, username, email, full_name, role, created_at
            FROM agents
            WHERE role = 'dra'
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AgentRow::into_domain).collect()
    }
}
