use async_graphql::*;

use super::user::UserType;
use crate::auth::{IssuedToken, TokenPayload};

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "TokenPayload")]
pub struct TokenPayloadType {
    pub email: String,
    pub exp: i64,
    pub orig_iat: i64,
}

impl From<TokenPayload> for TokenPayloadType {
    fn from(payload: TokenPayload) -> Self {
        Self {
            email: payload.email,
            exp: payload.exp,
            orig_iat: payload.orig_iat,
        }
    }
}

/// Obtain JSON Web Token mutation
#[derive(SimpleObject)]
#[graphql(name = "ObtainJSONWebToken")]
pub struct ObtainTokenPayload {
    pub token: String,
    pub payload: TokenPayloadType,
    pub refresh_expires_in: i64,
    pub user: UserType,
}

impl ObtainTokenPayload {
    pub fn new(issued: IssuedToken, user: UserType) -> Self {
        Self {
            token: issued.token,
            payload: issued.payload.into(),
            refresh_expires_in: issued.refresh_expires_in,
            user,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Verify")]
pub struct VerifyTokenPayload {
    pub payload: TokenPayloadType,
}

#[derive(SimpleObject)]
#[graphql(name = "Refresh")]
pub struct RefreshTokenPayload {
    pub token: String,
    pub payload: TokenPayloadType,
    pub refresh_expires_in: i64,
}

impl From<IssuedToken> for RefreshTokenPayload {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            payload: issued.payload.into(),
            refresh_expires_in: issued.refresh_expires_in,
        }
    }
}
