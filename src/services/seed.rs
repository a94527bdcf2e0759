//! Startup seeding of roles and the administrator account.

use crate::config::SeedConfig;
use crate::error::AppResult;
use crate::models::{NewUser, User};
use crate::repositories::{Store, UserFilter};
use crate::services::persist::insert_one;
use crate::utils::password::hash_password_blocking;

pub const ADMIN_ROLE: &str = "Admin";

pub const ROLES: &[&str] = &[ADMIN_ROLE, super::auth_service::DEFAULT_ROLE];

/// Ensures every role exists and creates the administrator when no user has
/// the configured email. Safe to run on every start.
pub async fn seed_identity(store: &dyn Store, seed: &SeedConfig) -> AppResult<()> {
    let mut users = store.users();
    for role in ROLES {
        users.ensure_role(role).await?;
    }

    let existing = users.find(&UserFilter::by_email(seed.admin_email.as_str())).await?;
    if !existing.is_empty() {
        tracing::debug!(email = %seed.admin_email, "Admin user already present");
        return Ok(());
    }

    let password_hash = hash_password_blocking(seed.admin_password.clone()).await?;
    let admin: User = insert_one(
        users.as_mut(),
        NewUser {
            username: seed.admin_username.clone(),
            email: seed.admin_email.clone(),
            full_name: seed.admin_full_name.clone(),
            password_hash,
            refresh_token: None,
            refresh_token_expiry_time: None,
        },
    )
    .await?;
    users.assign_role(admin.id, ADMIN_ROLE).await?;

    tracing::info!(user_id = admin.id, username = %admin.username, "Admin user created");
    Ok(())
}
