use std::collections::BTreeSet;
use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use thiserror::Error;
use tracing::debug;

use super::global_id::GlobalId;
use super::registry::{EntityKind, TypeRegistry};
use crate::database::entities::{posts, users};

/// A row fetched through its global id
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    User(users::Model),
    Post(posts::Model),
}

impl Node {
    pub fn kind(&self) -> EntityKind {
        match self {
            Node::User(_) => EntityKind::User,
            Node::Post(_) => EntityKind::Post,
        }
    }

    pub fn pk(&self) -> i32 {
        match self {
            Node::User(user) => user.id,
            Node::Post(post) => post.id,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The id could not be turned into a row; reported to clients as a field error
    #[error("{0}")]
    Unresolved(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl ResolveError {
    fn unresolved(message: impl Into<String>) -> Self {
        ResolveError::Unresolved(message.into())
    }

    fn no_node(global_id: &str) -> Self {
        Self::unresolved(format!("Couldn't resolve to a node: {}", global_id))
    }

    fn no_nodes<S: AsRef<str>>(ids: &[S]) -> Self {
        let ids: Vec<String> = ids.iter().map(|id| format!("'{}'", id.as_ref())).collect();
        Self::unresolved(format!(
            "Could not resolve to a nodes with the global id list of '[{}]'.",
            ids.join(", ")
        ))
    }

    fn wrong_type(type_name: &str) -> Self {
        Self::unresolved(format!("Must receive a {} id.", type_name))
    }
}

/// Decodes global ids and loads the rows they point at
#[derive(Clone)]
pub struct NodeResolver {
    db: DatabaseConnection,
    registry: Arc<TypeRegistry>,
}

impl NodeResolver {
    pub fn new(db: DatabaseConnection, registry: Arc<TypeRegistry>) -> Self {
        Self { db, registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn type_name(&self, kind: EntityKind) -> Result<&'static str, ResolveError> {
        self.registry
            .type_name(kind)
            .ok_or_else(|| ResolveError::unresolved(format!("No GraphQL type registered for {:?}", kind)))
    }

    /// Encode a primary key of the given kind as a global id
    pub fn global_id(&self, kind: EntityKind, pk: i32) -> Option<String> {
        self.registry
            .type_name(kind)
            .map(|type_name| GlobalId::new(type_name, pk).encode())
    }

    pub async fn resolve(
        &self,
        global_id: &str,
        expected: Option<EntityKind>,
    ) -> Result<Node, ResolveError> {
        let id = GlobalId::decode(global_id).ok_or_else(|| ResolveError::no_node(global_id))?;

        if let Some(kind) = expected {
            let expected_name = self.type_name(kind)?;
            if id.type_name != expected_name {
                return Err(ResolveError::wrong_type(expected_name));
            }
        }

        let kind = self
            .registry
            .kind_for(&id.type_name)
            .ok_or_else(|| ResolveError::no_node(global_id))?;

        debug!("Resolving {:?} node {}", kind, id.pk);
        self.fetch(kind, id.pk)
            .await?
            .ok_or_else(|| ResolveError::no_node(global_id))
    }

    /// Resolve a list of ids with one query, returning rows in input order
    pub async fn resolve_many<S: AsRef<str>>(
        &self,
        ids: &[S],
        expected: Option<EntityKind>,
    ) -> Result<Vec<Node>, ResolveError> {
        let mut decoded = Vec::with_capacity(ids.len());
        let mut invalid = Vec::new();
        for raw in ids.iter().map(AsRef::as_ref).filter(|raw| !raw.is_empty()) {
            match GlobalId::decode(raw) {
                Some(id) => decoded.push(id),
                None => invalid.push(raw),
            }
        }
        if !invalid.is_empty() {
            return Err(ResolveError::no_nodes(&invalid));
        }

        let type_name = match expected {
            Some(kind) => {
                let expected_name = self.type_name(kind)?;
                if decoded.iter().any(|id| id.type_name != expected_name) {
                    return Err(ResolveError::wrong_type(expected_name));
                }
                expected_name.to_string()
            }
            None => {
                let names: BTreeSet<&str> =
                    decoded.iter().map(|id| id.type_name.as_str()).collect();
                if names.len() > 1 {
                    return Err(ResolveError::unresolved("Received IDs of more than one type."));
                }
                match names.into_iter().next() {
                    Some(name) => name.to_string(),
                    None => return Err(ResolveError::no_nodes(ids)),
                }
            }
        };

        let kind = self
            .registry
            .kind_for(&type_name)
            .ok_or_else(|| ResolveError::no_nodes(ids))?;
        let pks: Vec<i32> = decoded.iter().map(|id| id.pk).collect();

        let mut nodes = self.fetch_many(kind, &pks).await?;
        nodes.sort_by_key(|node| {
            pks.iter()
                .position(|pk| *pk == node.pk())
                .unwrap_or(usize::MAX)
        });

        if nodes.is_empty() {
            return Err(ResolveError::no_nodes(ids));
        }
        if let Some(missing) = pks.iter().find(|pk| !nodes.iter().any(|n| n.pk() == **pk)) {
            return Err(ResolveError::unresolved(format!(
                "There is no node of type {} with pk {}",
                type_name, missing
            )));
        }

        Ok(nodes)
    }

    async fn fetch(&self, kind: EntityKind, pk: i32) -> Result<Option<Node>, DbErr> {
        let node = match kind {
            EntityKind::User => users::Entity::find_by_id(pk)
                .one(&self.db)
                .await?
                .map(Node::User),
            EntityKind::Post => posts::Entity::find_by_id(pk)
                .one(&self.db)
                .await?
                .map(Node::Post),
        };
        Ok(node)
    }

    async fn fetch_many(&self, kind: EntityKind, pks: &[i32]) -> Result<Vec<Node>, DbErr> {
        let nodes = match kind {
            EntityKind::User => users::Entity::find()
                .filter(users::Column::Id.is_in(pks.iter().copied()))
                .all(&self.db)
                .await?
                .into_iter()
                .map(Node::User)
                .collect(),
            EntityKind::Post => posts::Entity::find()
                .filter(posts::Column::Id.is_in(pks.iter().copied()))
                .all(&self.db)
                .await?
                .into_iter()
                .map(Node::Post)
                .collect(),
        };
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_lists_quote_each_id() {
        let err = ResolveError::no_nodes(&["garbage", "VXNlclR5cGU6MQ=="]);
        assert_eq!(
            err.to_string(),
            "Could not resolve to a nodes with the global id list of '['garbage', 'VXNlclR5cGU6MQ==']'."
        );
    }
}
