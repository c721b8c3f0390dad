mod post;
mod token;
mod user;

use async_graphql::*;

/// Mutation root combining the user, post and token mutations
#[derive(Default, MergedObject)]
pub struct Mutation(
    pub post::PostMutation,
    pub user::UserMutation,
    pub token::TokenMutation,
);
