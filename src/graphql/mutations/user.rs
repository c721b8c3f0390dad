use async_graphql::*;

use crate::graphql::context::{current_principal, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    DeleteUserPayload, RegisterUserPayload, UpdateUserPayload, UserRegisterInput, UserUpdateInput,
};
use crate::mutation::{users, MutationArgs};

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// This mutation registers a user
    async fn register_user(
        &self,
        ctx: &Context<'_>,
        input: UserRegisterInput,
    ) -> Result<RegisterUserPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .mutate(
                &users::register_user(),
                &current_principal(ctx),
                MutationArgs::create(input.into_raw()),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }

    /// Change the active, staff or admin flags of a user
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UserUpdateInput,
    ) -> Result<UpdateUserPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .mutate(
                &users::update_user(),
                &current_principal(ctx),
                MutationArgs::update(id.0, input.into_raw()),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<DeleteUserPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .delete(
                &users::delete_user(),
                &current_principal(ctx),
                MutationArgs::delete(id.0),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }
}
