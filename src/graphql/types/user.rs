use async_graphql::*;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::global_id;
use super::post::PostType;
use crate::database::entities::{posts, users};
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::errors::CoreError;
use crate::node::EntityKind;

/// Represents a user
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex, name = "UserType")]
pub struct UserType {
    #[graphql(skip)]
    pub pk: i32,
    pub last_login: Option<DateTime<Utc>>,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl From<users::Model> for UserType {
    fn from(model: users::Model) -> Self {
        Self {
            pk: model.id,
            last_login: model.last_login,
            email: model.email,
            username: model.username,
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_admin: model.is_admin,
        }
    }
}

#[ComplexObject]
impl UserType {
    /// The ID of the object
    async fn id(&self, ctx: &Context<'_>) -> Result<ID> {
        global_id(ctx, EntityKind::User, self.pk)
    }

    /// Posts written by this user
    async fn post_set(&self, ctx: &Context<'_>) -> Result<Vec<PostType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let rows = posts::Entity::find()
            .filter(posts::Column::AuthorId.eq(self.pk))
            .order_by_asc(posts::Column::Id)
            .all(&context.db)
            .await
            .map_err(|e| core_error_to_graphql_error(CoreError::database("load user posts", e)))?;
        Ok(rows.into_iter().map(PostType::from).collect())
    }
}
