use async_graphql::{EmptySubscription, Schema};

use super::context::GraphQLContext;
use super::mutations::Mutation;
use super::queries::Query;

pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(context: GraphQLContext) -> GraphQLSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(context)
        .finish()
}
