use async_graphql::*;
use chrono::{DateTime, Utc};

use super::post::PostStatusEnum;
use crate::database::entities::PostStatus;
use crate::mutation::RawInput;

/// Fields required to register user
#[derive(InputObject)]
pub struct UserRegisterInput {
    /// User email
    pub email: String,
    /// User unique username
    pub username: String,
    /// User password
    pub password: String,
    /// User is active
    pub is_active: MaybeUndefined<bool>,
}

impl UserRegisterInput {
    pub fn into_raw(self) -> RawInput {
        let mut raw = RawInput::new()
            .with("email", self.email)
            .with("username", self.username)
            .with("password", self.password);
        raw.insert_maybe("is_active", self.is_active);
        raw
    }
}

/// Flags an authorized caller may change on a user
#[derive(InputObject)]
pub struct UserUpdateInput {
    pub is_staff: MaybeUndefined<bool>,
    pub is_admin: MaybeUndefined<bool>,
    pub is_active: MaybeUndefined<bool>,
}

impl UserUpdateInput {
    pub fn into_raw(self) -> RawInput {
        let mut raw = RawInput::new();
        raw.insert_maybe("is_staff", self.is_staff);
        raw.insert_maybe("is_admin", self.is_admin);
        raw.insert_maybe("is_active", self.is_active);
        raw
    }
}

fn status_value(status: PostStatusEnum) -> i64 {
    i64::from(PostStatus::from(status).value())
}

/// Input for create post
#[derive(InputObject)]
pub struct PostCreateInput {
    /// Post title
    pub title: MaybeUndefined<String>,
    /// Post body
    pub body: MaybeUndefined<String>,
    /// DateTime when Post will be published
    pub published_date: MaybeUndefined<DateTime<Utc>>,
    pub status: MaybeUndefined<PostStatusEnum>,
    /// Author id for post
    pub author_id: ID,
}

impl PostCreateInput {
    pub fn into_raw(self) -> RawInput {
        let mut raw = RawInput::new();
        raw.insert_maybe("title", self.title);
        raw.insert_maybe("body", self.body);
        raw.insert_maybe("published_date", self.published_date.map_value(|d| d.to_rfc3339()));
        raw.insert_maybe("status", self.status.map_value(status_value));
        raw.insert("author_id", self.author_id.0);
        raw
    }
}

/// Input for update post
#[derive(InputObject)]
pub struct PostUpdateInput {
    /// Post title
    pub title: MaybeUndefined<String>,
    /// Post body
    pub body: MaybeUndefined<String>,
    /// DateTime when Post will be published
    pub published_date: MaybeUndefined<DateTime<Utc>>,
    pub status: MaybeUndefined<PostStatusEnum>,
}

impl PostUpdateInput {
    pub fn into_raw(self) -> RawInput {
        let mut raw = RawInput::new();
        raw.insert_maybe("title", self.title);
        raw.insert_maybe("body", self.body);
        raw.insert_maybe("published_date", self.published_date.map_value(|d| d.to_rfc3339()));
        raw.insert_maybe("status", self.status.map_value(status_value));
        raw
    }
}
