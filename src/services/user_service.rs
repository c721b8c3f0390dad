use bcrypt::{hash, verify, DEFAULT_COST};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::database::entities::users;
use crate::errors::{AuthError, AuthResult, CoreError, CoreResult};
use crate::mutation::record::Record;

/// Lower-case the domain part of an email address
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.trim().to_string(),
    }
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> AuthResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash; malformed hashes never match
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            is_active: true,
            is_staff: false,
            is_admin: false,
        }
    }
}

/// Account creation and credential checks
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, new_user: NewUser) -> CoreResult<users::Model> {
        if new_user.email.is_empty() {
            return Err(CoreError::validation("User must contain an email"));
        }
        if new_user.password.is_empty() {
            return Err(CoreError::validation("User must contain an password"));
        }

        let mut user = users::ActiveModel::blank();
        user.email = Set(normalize_email(&new_user.email));
        user.username = Set(new_user.username);
        user.password = Set(new_user.password);
        user.is_active = Set(new_user.is_active);
        user.is_staff = Set(new_user.is_staff);
        user.is_admin = Set(new_user.is_admin);

        let errors = user
            .full_clean(&self.db)
            .await
            .map_err(|e| CoreError::database("validate user", e))?;
        if !errors.is_empty() {
            let fields: BTreeMap<String, String> = errors
                .into_iter()
                .map(|(field, messages)| (field, messages.join(" ")))
                .collect();
            return Err(CoreError::validation("Invalid user").with_fields(fields));
        }

        if let sea_orm::ActiveValue::Set(password) = &user.password {
            user.password = Set(hash_password(password)?);
        }

        let created = user.persist(&self.db).await.map_err(|e| {
            match users::ActiveModel::constraint_error(&e) {
                Some((field, message)) => {
                    let fields = BTreeMap::from([(field.to_string(), message.to_string())]);
                    CoreError::validation("Invalid user").with_fields(fields)
                }
                None => CoreError::database("create user", e),
            }
        })?;
        info!("Created user {} ({})", created.id, created.email);
        Ok(created)
    }

    pub async fn create_staffuser(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> CoreResult<users::Model> {
        let mut new_user = NewUser::new(email, username, password);
        new_user.is_staff = true;
        self.create_user(new_user).await
    }

    pub async fn create_superuser(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> CoreResult<users::Model> {
        let mut new_user = NewUser::new(email, username, password);
        new_user.is_staff = true;
        new_user.is_admin = true;
        self.create_user(new_user).await
    }

    pub async fn find_by_email(&self, email: &str) -> CoreResult<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::database("find user by email", e))
    }

    /// Active user with matching credentials, if any
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> CoreResult<Option<users::Model>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active {
            warn!("Login attempt for inactive user {}", user.id);
            return Ok(None);
        }
        if !verify_password(password, &user.password) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub async fn record_login(&self, user: users::Model) -> CoreResult<users::Model> {
        let active: users::ActiveModel = user.into();
        active
            .set_last_login()
            .update(&self.db)
            .await
            .map_err(|e| CoreError::database("record login", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_domain_is_lowercased() {
        assert_eq!(normalize_email("Ann.Lee@EXAMPLE.Com"), "Ann.Lee@example.com");
        assert_eq!(normalize_email(" bob@Mail.ORG "), "bob@mail.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn password_hashing() {
        let hashed = hash_password("s3cret-pass").expect("hash");
        assert_ne!(hashed, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hashed));
        assert!(!verify_password("wrong", &hashed));
        assert!(!verify_password("s3cret-pass", "not-a-hash"));
    }
}
