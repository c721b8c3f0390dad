pub mod inputs;
pub mod payloads;
pub mod post;
pub mod token;
pub mod user;

pub use inputs::{PostCreateInput, PostUpdateInput, UserRegisterInput, UserUpdateInput};
pub use payloads::{
    CreatePostPayload, DeletePostPayload, DeleteUserPayload, RegisterUserPayload,
    UpdatePostPayload, UpdateUserPayload,
};
pub use post::{PostStatusEnum, PostType};
pub use token::{ObtainTokenPayload, RefreshTokenPayload, TokenPayloadType, VerifyTokenPayload};
pub use user::UserType;

use async_graphql::{Context, Result, ID};

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::errors::CoreError;
use crate::node::EntityKind;

/// Relay global id for a row of the given kind
pub(crate) fn global_id(ctx: &Context<'_>, kind: EntityKind, pk: i32) -> Result<ID> {
    let context = ctx.data::<GraphQLContext>()?;
    context
        .resolver()
        .global_id(kind, pk)
        .map(ID::from)
        .ok_or_else(|| {
            core_error_to_graphql_error(CoreError::internal(format!(
                "No GraphQL type registered for {:?}",
                kind
            )))
        })
}
