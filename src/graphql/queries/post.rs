use async_graphql::*;
use sea_orm::{EntityTrait, QueryOrder};

use crate::database::entities::posts;
use crate::errors::CoreError;
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::PostType;
use crate::node::{EntityKind, Node, ResolveError};

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// Look up a post by global id
    async fn post(&self, ctx: &Context<'_>, id: Option<ID>) -> Result<Option<PostType>> {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let context = ctx.data::<GraphQLContext>()?;
        match context.resolver().resolve(&id, Some(EntityKind::Post)).await {
            Ok(Node::Post(post)) => Ok(Some(post.into())),
            Ok(_) | Err(ResolveError::Unresolved(_)) => Ok(None),
            Err(ResolveError::Database(e)) => Err(core_error_to_graphql_error(
                CoreError::database("resolve post", e),
            )),
        }
    }

    async fn all_posts(&self, ctx: &Context<'_>) -> Result<Vec<PostType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let rows = posts::Entity::find()
            .order_by_asc(posts::Column::Id)
            .all(&context.db)
            .await
            .map_err(|e| core_error_to_graphql_error(CoreError::database("list posts", e)))?;
        Ok(rows.into_iter().map(PostType::from).collect())
    }
}
