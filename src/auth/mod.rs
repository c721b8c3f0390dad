//! Request identity and token authentication

pub mod token;

pub use token::{IssuedToken, TokenPayload, TokenService, TokenSettings};

use crate::database::entities::users;

/// Identity of the caller of one request; never changes while the request runs
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Principal {
    pub id: Option<i32>,
    pub is_authenticated: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i32) -> Self {
        Self {
            id: Some(user_id),
            is_authenticated: true,
            is_staff: false,
            is_admin: false,
        }
    }

    pub fn with_staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn with_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// True when the principal is the given user
    pub fn is(&self, user_id: i32) -> bool {
        self.is_authenticated && self.id == Some(user_id)
    }

    pub fn is_privileged(&self) -> bool {
        self.is_authenticated && (self.is_staff || self.is_admin)
    }
}

impl From<&users::Model> for Principal {
    fn from(user: &users::Model) -> Self {
        Self {
            id: Some(user.id),
            is_authenticated: true,
            is_staff: user.is_staff,
            is_admin: user.is_admin,
        }
    }
}
