mod post;
mod user;

use async_graphql::*;

pub use post::PostQuery;
pub use user::UserQuery;

#[derive(Default, MergedObject)]
pub struct Query(pub PostQuery, pub UserQuery);
