use std::collections::HashMap;

/// Entity tables that can be addressed through a global id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Post,
}

/// Explicit mapping between entity kinds and their GraphQL object type names.
///
/// Built once at startup and handed to the resolver and mutation engine.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    type_names: HashMap<EntityKind, &'static str>,
    kinds: HashMap<&'static str, EntityKind>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: EntityKind, type_name: &'static str) -> Self {
        self.register(kind, type_name);
        self
    }

    pub fn register(&mut self, kind: EntityKind, type_name: &'static str) {
        if let Some(previous) = self.type_names.insert(kind, type_name) {
            self.kinds.remove(previous);
        }
        self.kinds.insert(type_name, kind);
    }

    /// Registry for the blog schema
    pub fn blog() -> Self {
        Self::new()
            .with_type(EntityKind::User, "UserType")
            .with_type(EntityKind::Post, "PostType")
    }

    pub fn type_name(&self, kind: EntityKind) -> Option<&'static str> {
        self.type_names.get(&kind).copied()
    }

    pub fn kind_for(&self, type_name: &str) -> Option<EntityKind> {
        self.kinds.get(type_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        let registry = TypeRegistry::blog();
        assert_eq!(registry.type_name(EntityKind::Post), Some("PostType"));
        assert_eq!(registry.kind_for("UserType"), Some(EntityKind::User));
        assert_eq!(registry.kind_for("CommentType"), None);
    }

    #[test]
    fn re_registering_replaces_old_name() {
        let registry = TypeRegistry::new()
            .with_type(EntityKind::User, "Account")
            .with_type(EntityKind::User, "UserType");
        assert_eq!(registry.kind_for("Account"), None);
        assert_eq!(registry.type_name(EntityKind::User), Some("UserType"));
    }
}
