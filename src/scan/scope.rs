use std::collections::{HashMap, HashSet};

use super::entity::Entity;
use super::identifier::Identifier;

/// A lexical namespace: identifier-to-entity bindings plus the identifiers
/// referenced within this scope that stayed unresolved when it closed.
/// Parent links are implicit in the traversal's scope stack.
#[derive(Debug, Default)]
pub struct Scope {
    entities: HashMap<Identifier, Entity>,
    unresolved: HashSet<Identifier>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an entity under its own name; a later binding with the same
    /// name replaces the earlier one.
    pub fn declare(&mut self, entity: Entity) {
        self.entities.insert(entity.name().clone(), entity);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn record_unresolved(&mut self, name: impl Into<Identifier>) {
        self.unresolved.insert(name.into());
    }

    #[must_use]
    pub fn unresolved(&self) -> &HashSet<Identifier> {
        &self.unresolved
    }

    pub fn take_unresolved(&mut self) -> HashSet<Identifier> {
        std::mem::take(&mut self.unresolved)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &Identifier> {
        self.entities.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_and_looks_up_by_str() {
        let mut scope = Scope::new();
        scope.declare(Entity::local("value"));
        assert!(scope.declares("value"));
        assert!(scope.lookup("value").is_some());
        assert!(scope.lookup("other").is_none());
    }

    #[test]
    fn unresolved_set_collapses_duplicates() {
        let mut scope = Scope::new();
        scope.record_unresolved("b");
        scope.record_unresolved("b");
        assert_eq!(scope.unresolved().len(), 1);
        let taken = scope.take_unresolved();
        assert!(taken.contains("b"));
        assert!(scope.unresolved().is_empty());
    }
}
