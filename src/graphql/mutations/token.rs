use async_graphql::*;
use tracing::info;

use crate::errors::AuthError;
use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::{auth_error_to_graphql_error, core_error_to_graphql_error};
use crate::graphql::types::{ObtainTokenPayload, RefreshTokenPayload, UserType, VerifyTokenPayload};

#[derive(Default)]
pub struct TokenMutation;

#[Object]
impl TokenMutation {
    /// Obtain a token for an email and password
    async fn token_auth(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<ObtainTokenPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let user = context
            .users
            .authenticate(&email, &password)
            .await
            .map_err(core_error_to_graphql_error)?
            .ok_or_else(|| auth_error_to_graphql_error(AuthError::InvalidCredentials))?;

        let user = context
            .users
            .record_login(user)
            .await
            .map_err(core_error_to_graphql_error)?;
        let issued = context
            .tokens
            .issue(&user.email)
            .map_err(auth_error_to_graphql_error)?;

        info!("Issued token for user {}", user.id);
        Ok(ObtainTokenPayload::new(issued, UserType::from(user)))
    }

    async fn verify_token(&self, ctx: &Context<'_>, token: String) -> Result<VerifyTokenPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let payload = context
            .tokens
            .verify(&token)
            .map_err(auth_error_to_graphql_error)?;
        Ok(VerifyTokenPayload {
            payload: payload.into(),
        })
    }

    /// Issue a fresh token while the refresh window is open
    async fn refresh_token(&self, ctx: &Context<'_>, token: String) -> Result<RefreshTokenPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let issued = context
            .tokens
            .refresh(&token)
            .map_err(auth_error_to_graphql_error)?;

        let user = context
            .users
            .find_by_email(&issued.payload.email)
            .await
            .map_err(core_error_to_graphql_error)?
            .ok_or_else(|| auth_error_to_graphql_error(AuthError::InvalidPayload))?;
        if !user.is_active {
            return Err(auth_error_to_graphql_error(AuthError::UserDisabled));
        }

        Ok(issued.into())
    }
}
