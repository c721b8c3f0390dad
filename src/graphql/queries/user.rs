use async_graphql::*;
use sea_orm::{EntityTrait, QueryOrder};

use crate::database::entities::users;
use crate::errors::CoreError;
use crate::graphql::context::{current_principal, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::UserType;
use crate::node::{EntityKind, Node, ResolveError};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// Look up a user by global id
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UserType>> {
        let context = ctx.data::<GraphQLContext>()?;
        match context.resolver().resolve(&id, Some(EntityKind::User)).await {
            Ok(Node::User(user)) => Ok(Some(user.into())),
            Ok(_) | Err(ResolveError::Unresolved(_)) => Ok(None),
            Err(ResolveError::Database(e)) => Err(core_error_to_graphql_error(
                CoreError::database("resolve user", e),
            )),
        }
    }

    /// The authenticated caller, if any
    async fn current_user(&self, ctx: &Context<'_>) -> Result<Option<UserType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let principal = current_principal(ctx);
        let Some(id) = principal.id.filter(|_| principal.is_authenticated) else {
            return Ok(None);
        };
        let user = users::Entity::find_by_id(id)
            .one(&context.db)
            .await
            .map_err(|e| core_error_to_graphql_error(CoreError::database("load current user", e)))?;
        Ok(user.map(UserType::from))
    }

    async fn all_users(&self, ctx: &Context<'_>) -> Result<Vec<UserType>> {
        let context = ctx.data::<GraphQLContext>()?;
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&context.db)
            .await
            .map_err(|e| core_error_to_graphql_error(CoreError::database("list users", e)))?;
        Ok(rows.into_iter().map(UserType::from).collect())
    }
}
