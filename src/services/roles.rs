//! Role checks for signed-in users

use uuid::Uuid;

use crate::{error::AppResult, repository::Repository};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct RolesService {
    repository: Repository,
}

impl RolesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        self.repository.roles.has_role(user_id, ADMIN_ROLE).await
    }
}
