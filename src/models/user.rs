use crate::api_error::ApiError;
use crate::db;
use crate::schema::user;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// Role is decided once, at row creation, from the configured allow-list.
pub fn assign_role(email: &str, admin_emails: &[String]) -> Role {
    if admin_emails.iter().any(|allowed| allowed == email) {
        Role::Admin
    } else {
        Role::User
    }
}

#[derive(Serialize, Deserialize, Queryable, Insertable)]
#[table_name = "user"]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Identity carried by the session cookie. Issued by the external auth
/// provider; this service only reads it. The role claim is a hint only:
/// every privileged action re-reads the role from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl User {
    /// Materializes the row behind a session identity on first sight.
    /// Subsequent calls return the stored row untouched, so the role
    /// decision made at creation sticks.
    pub fn ensure(identity: &AuthUser, admin_emails: &[String]) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let existing = user::table
            .filter(user::email.eq(&identity.email))
            .first::<User>(&conn)
            .optional()?;

        if let Some(user) = existing {
            return Ok(user);
        }

        let role = assign_role(&identity.email, admin_emails);
        let user = User {
            id: identity.id,
            email: identity.email.clone(),
            name: identity
                .name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string()),
            image: None,
            role: role.as_str().to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        };

        let user = diesel::insert_into(user::table)
            .values(user)
            .get_result(&conn)?;

        Ok(user)
    }

    /// Authorization gate for admin actions. Always reads the store; a role
    /// cached on the session cookie can go stale and must never authorize.
    pub fn require_admin(id: Uuid) -> Result<Self, ApiError> {
        let conn = db::connection()?;

        let user = user::table
            .filter(user::id.eq(id))
            .first::<User>(&conn)
            .optional()?;

        match user {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(ApiError::new(401, "Unauthorized".to_string())),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

/// Creator or submitter info embedded in read views.
#[derive(Serialize, Queryable)]
pub struct UserRef {
    pub name: String,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        vec![
            "admin@vibebench.ai".to_string(),
            "ops@vibebench.ai".to_string(),
        ]
    }

    #[test]
    fn allow_listed_email_becomes_admin() {
        assert_eq!(assign_role("admin@vibebench.ai", &allow_list()), Role::Admin);
    }

    #[test]
    fn other_email_stays_user() {
        assert_eq!(assign_role("someone@example.com", &allow_list()), Role::User);
    }

    #[test]
    fn empty_allow_list_never_grants_admin() {
        assert_eq!(assign_role("admin@vibebench.ai", &[]), Role::User);
    }

    #[test]
    fn match_is_exact_not_substring() {
        assert_eq!(assign_role("admin@vibebench.ai.evil.com", &allow_list()), Role::User);
    }

    #[test]
    fn auth_user_parses_cookie_payload() {
        let json = r#"{
            "id": "6f2b2c1e-0d9f-4b83-9a39-27a7f0a2e9c1",
            "email": "dev@example.com",
            "name": "Dev",
            "role": "USER"
        }"#;

        let identity: AuthUser = serde_json::from_str(json).unwrap();

        assert_eq!(identity.email, "dev@example.com");
        assert_eq!(identity.name.as_deref(), Some("Dev"));
    }

    #[test]
    fn auth_user_tolerates_missing_optional_claims() {
        let json = r#"{"id": "6f2b2c1e-0d9f-4b83-9a39-27a7f0a2e9c1", "email": "dev@example.com", "name": null, "role": null}"#;

        let identity: AuthUser = serde_json::from_str(json).unwrap();

        assert!(identity.name.is_none());
        assert!(identity.role.is_none());
    }
}
