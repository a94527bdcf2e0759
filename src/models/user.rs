use diesel::prelude::*;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;

/// Application user as seen by services.
///
/// The refresh token and its expiry travel together: a stored token always
/// has an expiry, while the expiry may outlive a cleared token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert payload for a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<Timestamp>,
}

/// A freshly issued refresh token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub token: String,
    pub expires_at: Timestamp,
}

impl RefreshSession {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    pub id: i32,
    pub name: String,
}

// ============================================================================
// Diesel row types
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<jiff_diesel::Timestamp>,
    pub created_at: jiff_diesel::Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            refresh_token: row.refresh_token,
            refresh_token_expiry_time: row.refresh_token_expiry_time.map(|t| t.to_jiff()),
            created_at: row.created_at.to_jiff(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub(crate) struct NewUserRow {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<jiff_diesel::Timestamp>,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            refresh_token: user.refresh_token,
            refresh_token_expiry_time: user.refresh_token_expiry_time.map(|t| t.to_diesel()),
        }
    }
}

/// Full replacement of a user's mutable columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<jiff_diesel::Timestamp>,
}

impl From<&User> for UserChangeset {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            refresh_token: user.refresh_token.clone(),
            refresh_token_expiry_time: user.refresh_token_expiry_time.map(|t| t.to_diesel()),
        }
    }
}

/// Writes both session columns together so the token never outlives its expiry.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RefreshSessionChangeset {
    pub refresh_token: Option<String>,
    pub refresh_token_expiry_time: Option<jiff_diesel::Timestamp>,
}

impl From<&RefreshSession> for RefreshSessionChangeset {
    fn from(session: &RefreshSession) -> Self {
        Self {
            refresh_token: Some(session.token.clone()),
            refresh_token_expiry_time: Some(session.expires_at.to_diesel()),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::user_roles)]
pub(crate) struct NewUserRole {
    pub user_id: i32,
    pub role_id: i32,
}
