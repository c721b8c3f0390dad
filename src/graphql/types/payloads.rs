use async_graphql::*;

use super::post::PostType;
use super::user::UserType;
use crate::database::entities::{posts, users};
use crate::mutation::{FieldError, MutationResult};

/// This mutation registers a user
#[derive(SimpleObject)]
pub struct RegisterUserPayload {
    pub user: Option<UserType>,
    /// List of errors that occurred executing the mutation
    pub errors: Vec<FieldError>,
}

#[derive(SimpleObject)]
pub struct UpdateUserPayload {
    pub user: Option<UserType>,
    pub errors: Vec<FieldError>,
}

#[derive(SimpleObject)]
pub struct DeleteUserPayload {
    pub user: Option<UserType>,
    pub errors: Vec<FieldError>,
}

/// Mutation for create post
#[derive(SimpleObject)]
pub struct CreatePostPayload {
    pub post: Option<PostType>,
    /// List of errors that occurred executing the mutation
    pub errors: Vec<FieldError>,
}

/// Mutation for update post
#[derive(SimpleObject)]
pub struct UpdatePostPayload {
    pub post: Option<PostType>,
    pub errors: Vec<FieldError>,
}

/// Mutation for delete post
#[derive(SimpleObject)]
pub struct DeletePostPayload {
    pub post: Option<PostType>,
    pub errors: Vec<FieldError>,
}

fn split_user(result: MutationResult<users::Model>) -> (Option<UserType>, Vec<FieldError>) {
    (result.instance.map(UserType::from), result.errors)
}

fn split_post(result: MutationResult<posts::Model>) -> (Option<PostType>, Vec<FieldError>) {
    (result.instance.map(PostType::from), result.errors)
}

impl From<MutationResult<users::Model>> for RegisterUserPayload {
    fn from(result: MutationResult<users::Model>) -> Self {
        let (user, errors) = split_user(result);
        Self { user, errors }
    }
}

impl From<MutationResult<users::Model>> for UpdateUserPayload {
    fn from(result: MutationResult<users::Model>) -> Self {
        let (user, errors) = split_user(result);
        Self { user, errors }
    }
}

impl From<MutationResult<users::Model>> for DeleteUserPayload {
    fn from(result: MutationResult<users::Model>) -> Self {
        let (user, errors) = split_user(result);
        Self { user, errors }
    }
}

impl From<MutationResult<posts::Model>> for CreatePostPayload {
    fn from(result: MutationResult<posts::Model>) -> Self {
        let (post, errors) = split_post(result);
        Self { post, errors }
    }
}

impl From<MutationResult<posts::Model>> for UpdatePostPayload {
    fn from(result: MutationResult<posts::Model>) -> Self {
        let (post, errors) = split_post(result);
        Self { post, errors }
    }
}

impl From<MutationResult<posts::Model>> for DeletePostPayload {
    fn from(result: MutationResult<posts::Model>) -> Self {
        let (post, errors) = split_post(result);
        Self { post, errors }
    }
}
