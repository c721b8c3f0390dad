use async_graphql::*;

use crate::graphql::context::{current_principal, GraphQLContext};
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    CreatePostPayload, DeletePostPayload, PostCreateInput, PostUpdateInput, UpdatePostPayload,
};
use crate::mutation::{posts, MutationArgs};

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    /// Mutation for create post
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        input: PostCreateInput,
    ) -> Result<CreatePostPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .mutate(
                &posts::create_post(),
                &current_principal(ctx),
                MutationArgs::create(input.into_raw()),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }

    /// Mutation for update post
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: PostUpdateInput,
    ) -> Result<UpdatePostPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .mutate(
                &posts::update_post(),
                &current_principal(ctx),
                MutationArgs::update(id.0, input.into_raw()),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }

    /// Mutation for delete post
    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> Result<DeletePostPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let result = context
            .engine
            .delete(
                &posts::delete_post(),
                &current_principal(ctx),
                MutationArgs::delete(id.0),
            )
            .await
            .map_err(core_error_to_graphql_error)?;
        Ok(result.into())
    }
}
