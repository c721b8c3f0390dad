use std::sync::Arc;

use async_graphql::Context;
use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::auth::{Principal, TokenService};
use crate::mutation::MutationEngine;
use crate::node::{NodeResolver, TypeRegistry};
use crate::services::UserService;

#[derive(Clone)]
pub struct GraphQLContext {
    pub db: DatabaseConnection,
    pub engine: Arc<MutationEngine>,
    pub users: Arc<UserService>,
    pub tokens: Arc<TokenService>,
}

impl GraphQLContext {
    pub fn new(db: DatabaseConnection, registry: Arc<TypeRegistry>, tokens: TokenService) -> Self {
        Self {
            engine: Arc::new(MutationEngine::new(db.clone(), registry)),
            users: Arc::new(UserService::new(db.clone())),
            tokens: Arc::new(tokens),
            db,
        }
    }

    pub fn resolver(&self) -> &NodeResolver {
        self.engine.resolver()
    }

    /// Identify the caller from an `Authorization` header value.
    ///
    /// Anything short of a valid token for an active user is anonymous.
    pub async fn principal_for(&self, authorization: Option<&str>) -> Principal {
        let Some(token) = authorization.and_then(|value| self.tokens.token_from_header(value))
        else {
            return Principal::anonymous();
        };

        let payload = match self.tokens.verify(token) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Ignoring authorization header: {}", e);
                return Principal::anonymous();
            }
        };

        match self.users.find_by_email(&payload.email).await {
            Ok(Some(user)) if user.is_active => Principal::from(&user),
            Ok(_) => Principal::anonymous(),
            Err(e) => {
                debug!("Principal lookup failed: {}", e);
                Principal::anonymous()
            }
        }
    }
}

/// The principal attached to the current request
pub fn current_principal(ctx: &Context<'_>) -> Principal {
    ctx.data_opt::<Principal>().cloned().unwrap_or_default()
}
