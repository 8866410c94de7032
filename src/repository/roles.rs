//! User roles lookup (roles are granted by the external auth service)

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Clone)]
pub struct RolesRepository {
    pool: Pool<Postgres>,
}

impl RolesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether `user_id` holds `role` ("admin" or "user")
    pub async fn has_role(&self, user_id: Uuid, role: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role::text = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
