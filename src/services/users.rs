//! User administration service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, UpdateUser, User, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List accounts matching the filters
    pub async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let search = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        self.repository
            .users
            .list(search, query.role, query.is_active)
            .await
    }

    /// Get user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Edit name, email or role. `actor_id` is the librarian making the change.
    pub async fn update_user(&self, actor_id: i32, id: i32, changes: UpdateUser) -> AppResult<User> {
        changes.validate()?;

        let mut user = self.get_user(id).await?;

        if actor_id == id && changes.role.is_some_and(|role| role != Role::Librarian) {
            return Err(AppError::Validation(
                "Cannot remove the librarian role from your own account".to_string(),
            ));
        }

        user.apply_changes(&changes);

        if changes.email.is_some() {
            if let Some(other) = self.repository.users.get_by_email(&user.email).await? {
                if other.id != id {
                    return Err(AppError::Conflict("Email already registered".to_string()));
                }
            }
        }

        let updated = self.save(&user).await?;
        tracing::info!("User {} updated by {}", id, actor_id);
        Ok(updated)
    }

    /// Activate or deactivate an account. Inactive accounts cannot log in or borrow.
    pub async fn set_active(&self, actor_id: i32, id: i32, is_active: bool) -> AppResult<User> {
        if actor_id == id && !is_active {
            return Err(AppError::Validation(
                "Cannot deactivate your own account".to_string(),
            ));
        }

        let mut user = self.get_user(id).await?;
        user.is_active = is_active;

        let updated = self.save(&user).await?;
        tracing::info!(
            "User {} {} by {}",
            id,
            if is_active { "activated" } else { "deactivated" },
            actor_id
        );
        Ok(updated)
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        self.repository
            .users
            .update(user)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))
    }
}
