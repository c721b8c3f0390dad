use async_graphql::*;
use chrono::{DateTime, Utc};
use sea_orm::EntityTrait;

use super::global_id;
use super::user::UserType;
use crate::database::entities::{posts, users, PostStatus};
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::errors::CoreError;
use crate::node::EntityKind;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "PostStatus")]
pub enum PostStatusEnum {
    /// Draft status
    Draft,
    /// Published status
    Published,
    /// Archived status
    Archived,
}

impl From<PostStatus> for PostStatusEnum {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => PostStatusEnum::Draft,
            PostStatus::Published => PostStatusEnum::Published,
            PostStatus::Archived => PostStatusEnum::Archived,
        }
    }
}

impl From<PostStatusEnum> for PostStatus {
    fn from(status: PostStatusEnum) -> Self {
        match status {
            PostStatusEnum::Draft => PostStatus::Draft,
            PostStatusEnum::Published => PostStatus::Published,
            PostStatusEnum::Archived => PostStatus::Archived,
        }
    }
}

/// Represents a post
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex, name = "PostType")]
pub struct PostType {
    #[graphql(skip)]
    pub pk: i32,
    #[graphql(skip)]
    pub author_id: i32,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub status: PostStatusEnum,
}

impl From<posts::Model> for PostType {
    fn from(model: posts::Model) -> Self {
        let status = model.post_status().unwrap_or_default().into();
        Self {
            pk: model.id,
            author_id: model.author_id,
            title: model.title,
            body: model.body,
            created: model.created,
            modified: model.modified,
            published_date: model.published_date,
            status,
        }
    }
}

#[ComplexObject]
impl PostType {
    /// The ID of the object
    async fn id(&self, ctx: &Context<'_>) -> Result<ID> {
        global_id(ctx, EntityKind::Post, self.pk)
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<UserType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let author = users::Entity::find_by_id(self.author_id)
            .one(&context.db)
            .await
            .map_err(|e| core_error_to_graphql_error(CoreError::database("load post author", e)))?;
        Ok(author.map(UserType::from))
    }
}
