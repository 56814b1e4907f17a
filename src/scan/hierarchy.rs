use std::collections::HashMap;

use super::entity::ClassEntity;
use super::identifier::Identifier;
use super::selector::Selector;

/// A read-through lookup from class selectors to class entities, stored as
/// a segment tree so nested class paths resolve naturally. Populated from
/// parsed project files and artifact indexes; read-only during extension.
#[derive(Debug, Default)]
pub struct ClassHierarchy {
    root: Node,
    size: usize,
}

#[derive(Debug, Default)]
struct Node {
    entity: Option<ClassEntity>,
    children: HashMap<Identifier, Node>,
}

impl ClassHierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under its full path, replacing any previous entry.
    pub fn insert(&mut self, path: &Selector, entity: ClassEntity) {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        if node.entity.replace(entity).is_none() {
            self.size += 1;
        }
    }

    /// Exact segment-for-segment lookup; case-sensitive. A selector naming
    /// only part of a nested path hits only when a class is registered at
    /// exactly that prefix.
    #[must_use]
    pub fn find(&self, selector: &Selector) -> Option<&ClassEntity> {
        let mut node = &self.root;
        for segment in selector.segments() {
            node = node.children.get(segment)?;
        }
        node.entity.as_ref()
    }

    /// Number of registered classes, which also bounds extension hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entity(name: &str, superclass: Option<&str>, members: &[&str]) -> ClassEntity {
        let members: HashSet<Identifier> = members.iter().map(|m| Identifier::new(*m)).collect();
        ClassEntity::new(name, superclass.map(Selector::single), members)
    }

    fn sel(path: &str) -> Selector {
        Selector::of(path.split('.')).expect("non-empty selector")
    }

    #[test]
    fn exact_match_returns_the_entity() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&sel("Test.Parent"), entity("Parent", None, &["a", "g"]));
        let found = hierarchy.find(&sel("Test.Parent")).expect("hit");
        assert_eq!(found.name.as_str(), "Parent");
        assert!(hierarchy.find(&sel("Test.Other")).is_none());
    }

    #[test]
    fn partial_prefix_without_registered_class_misses() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&sel("Test.Parent"), entity("Parent", None, &[]));
        assert!(
            hierarchy.find(&sel("Test")).is_none(),
            "no class registered at the bare prefix"
        );
        hierarchy.insert(&sel("Test"), entity("Test", None, &["Parent"]));
        assert!(hierarchy.find(&sel("Test")).is_some());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&sel("pkg.Widget"), entity("Widget", None, &[]));
        assert!(hierarchy.find(&sel("pkg.widget")).is_none());
        assert!(hierarchy.find(&sel("pkg.Widget")).is_some());
    }

    #[test]
    fn reinsertion_replaces_without_growing() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&sel("A"), entity("A", None, &[]));
        hierarchy.insert(&sel("A"), entity("A", Some("B"), &["m"]));
        assert_eq!(hierarchy.len(), 1);
        let found = hierarchy.find(&sel("A")).expect("hit");
        assert!(found.superclass().is_some());
    }
}
