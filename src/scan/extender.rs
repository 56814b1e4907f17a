use std::collections::HashSet;

use tracing::trace;

use super::CancellationToken;
use super::entity::ClassEntity;
use super::hierarchy::ClassHierarchy;
use super::identifier::Identifier;
use super::selector::Selector;
use crate::error::{Error, Result};

/// A class whose unresolved identifiers cannot be finalized inside its file:
/// at least one superclass link escapes it. `next_superclass` is the next
/// link to consult, updated as the extender climbs.
#[derive(Debug, Clone)]
pub struct OrphanClass {
    selector: Selector,
    unresolved: HashSet<Identifier>,
    next_superclass: Selector,
}

impl OrphanClass {
    #[must_use]
    pub fn new(
        selector: Selector,
        unresolved: HashSet<Identifier>,
        next_superclass: Selector,
    ) -> Self {
        Self {
            selector,
            unresolved,
            next_superclass,
        }
    }

    /// Path of the orphaned class within its file.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    #[must_use]
    pub fn unresolved(&self) -> &HashSet<Identifier> {
        &self.unresolved
    }

    #[must_use]
    pub fn next_superclass(&self) -> &Selector {
        &self.next_superclass
    }
}

/// Outcome of driving an extension to its stopping point.
#[derive(Debug)]
pub enum Extension {
    /// The superclass chain was fully consumed; these residuals remain.
    Complete(HashSet<Identifier>),
    /// A link is still missing; the orphan records where to resume.
    Orphaned(OrphanClass),
}

/// Progressive superclass walk that shrinks an unresolved set using member
/// lists from parent classes. Holds the hierarchy only for the duration of
/// one extension call.
#[derive(Debug)]
pub struct ClassExtender {
    selector: Selector,
    not_yet_resolved: HashSet<Identifier>,
    next_superclass: Option<Selector>,
}

impl ClassExtender {
    #[must_use]
    pub fn of(orphan: OrphanClass) -> Self {
        let OrphanClass {
            selector,
            unresolved,
            next_superclass,
        } = orphan;
        Self {
            selector,
            not_yet_resolved: unresolved,
            next_superclass: Some(next_superclass),
        }
    }

    /// Start an extension for a class not yet orphaned: its declared
    /// superclass may still be absent.
    #[must_use]
    pub fn for_class(
        selector: Selector,
        unresolved: HashSet<Identifier>,
        superclass: Option<Selector>,
    ) -> Self {
        Self {
            selector,
            not_yet_resolved: unresolved,
            next_superclass: superclass,
        }
    }

    /// Subtract an externally supplied identifier set, independently of any
    /// superclass extension.
    pub fn resolve_using(&mut self, identifiers: &HashSet<Identifier>) {
        self.not_yet_resolved
            .retain(|name| !identifiers.contains(name));
    }

    /// True when no superclass link remains to consult.
    #[must_use]
    pub fn is_fully_extended(&self) -> bool {
        self.next_superclass.is_none()
    }

    /// Current residual set.
    #[must_use]
    pub fn not_yet_resolved(&self) -> &HashSet<Identifier> {
        &self.not_yet_resolved
    }

    #[must_use]
    pub fn into_not_yet_resolved(self) -> HashSet<Identifier> {
        self.not_yet_resolved
    }

    /// Walk the superclass chain as far as the hierarchy allows, looking
    /// links up by their exact selector.
    pub fn extend_using(
        &mut self,
        hierarchy: &ClassHierarchy,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.extend_within(hierarchy, &[], cancel)
    }

    /// Walk the superclass chain, resolving each link relative to the given
    /// enclosing paths (innermost first) before trying it bare. Visited
    /// links are tracked so malformed cyclic chains still terminate.
    pub fn extend_within(
        &mut self,
        hierarchy: &ClassHierarchy,
        contexts: &[Selector],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut visited: HashSet<Selector> = HashSet::new();
        let mut contexts: Vec<Selector> = contexts.to_vec();
        while let Some(next) = self.next_superclass.clone() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if !visited.insert(next.clone()) {
                trace!(class = %self.selector, link = %next, "superclass cycle, stopping");
                return Ok(());
            }
            let Some((full_path, parent)) = find_in_context(hierarchy, &next, &contexts) else {
                trace!(class = %self.selector, link = %next, "superclass not in hierarchy");
                return Ok(());
            };
            if full_path != next && !visited.insert(full_path.clone()) {
                return Ok(());
            }
            trace!(class = %self.selector, parent = %full_path, "extending");
            self.extend_with(parent);
            self.next_superclass = parent.superclass().cloned();
            contexts = full_path.prefixes();
        }
        Ok(())
    }

    /// Consume the extender, reporting either the final residuals or the
    /// orphan to hand to a later extension.
    #[must_use]
    pub fn finish(self) -> Extension {
        let Self {
            selector,
            not_yet_resolved,
            next_superclass,
        } = self;
        match next_superclass {
            None => Extension::Complete(not_yet_resolved),
            Some(next) => Extension::Orphaned(OrphanClass::new(selector, not_yet_resolved, next)),
        }
    }

    fn extend_with(&mut self, parent: &ClassEntity) {
        self.not_yet_resolved
            .retain(|name| !parent.members().contains(name));
    }
}

fn find_in_context<'h>(
    hierarchy: &'h ClassHierarchy,
    selector: &Selector,
    contexts: &[Selector],
) -> Option<(Selector, &'h ClassEntity)> {
    for context in contexts {
        let candidate = context.joined(selector);
        if let Some(entity) = hierarchy.find(&candidate) {
            return Some((candidate, entity));
        }
    }
    hierarchy
        .find(selector)
        .map(|entity| (selector.clone(), entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idents(names: &[&str]) -> HashSet<Identifier> {
        names.iter().map(|name| Identifier::new(*name)).collect()
    }

    fn entity(name: &str, superclass: Option<&str>, members: &[&str]) -> ClassEntity {
        ClassEntity::new(name, superclass.map(Selector::single), idents(members))
    }

    fn orphan(unresolved: &[&str], next: &str) -> OrphanClass {
        OrphanClass::new(Selector::single("Child"), idents(unresolved), Selector::single(next))
    }

    #[test]
    fn extension_subtracts_members_along_the_chain() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(
            &Selector::single("Parent"),
            entity("Parent", Some("Grandparent"), &["g", "h"]),
        );
        hierarchy.insert(
            &Selector::single("Grandparent"),
            entity("Grandparent", None, &["a"]),
        );

        let mut extender = ClassExtender::of(orphan(&["g", "a", "b"], "Parent"));
        extender
            .extend_using(&hierarchy, &CancellationToken::new())
            .expect("extension");
        assert!(extender.is_fully_extended());
        assert_eq!(extender.not_yet_resolved(), &idents(&["b"]));
    }

    #[test]
    fn missing_link_stops_partially_extended() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(
            &Selector::single("Parent"),
            entity("Parent", Some("Absent"), &["g"]),
        );

        let mut extender = ClassExtender::of(orphan(&["g", "b"], "Parent"));
        extender
            .extend_using(&hierarchy, &CancellationToken::new())
            .expect("extension");
        assert!(!extender.is_fully_extended());
        assert_eq!(extender.not_yet_resolved(), &idents(&["b"]));
        match extender.finish() {
            Extension::Orphaned(orphan) => {
                assert_eq!(orphan.next_superclass().to_string(), "Absent");
            }
            Extension::Complete(_) => panic!("chain had a missing link"),
        }
    }

    #[test]
    fn extension_never_adds_identifiers() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(
            &Selector::single("Parent"),
            entity("Parent", None, &["everything", "else"]),
        );
        let before = idents(&["x"]);
        let mut extender = ClassExtender::of(orphan(&["x"], "Parent"));
        extender
            .extend_using(&hierarchy, &CancellationToken::new())
            .expect("extension");
        assert!(extender.not_yet_resolved().is_subset(&before));
    }

    #[test]
    fn cyclic_inheritance_terminates() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&Selector::single("A"), entity("A", Some("B"), &["a"]));
        hierarchy.insert(&Selector::single("B"), entity("B", Some("A"), &["b"]));

        let mut extender = ClassExtender::of(orphan(&["a", "b", "c"], "A"));
        extender
            .extend_using(&hierarchy, &CancellationToken::new())
            .expect("extension");
        assert!(!extender.is_fully_extended(), "cycles end as partially extended");
        assert_eq!(extender.not_yet_resolved(), &idents(&["c"]));
    }

    #[test]
    fn self_inheritance_terminates_immediately() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&Selector::single("A"), entity("A", Some("A"), &["a"]));
        let mut extender = ClassExtender::of(orphan(&["x"], "A"));
        extender
            .extend_using(&hierarchy, &CancellationToken::new())
            .expect("extension");
        assert!(!extender.is_fully_extended());
    }

    #[test]
    fn resolve_using_is_independent_of_extension() {
        let mut extender = ClassExtender::of(orphan(&["a", "b", "c"], "Missing"));
        extender.resolve_using(&idents(&["b", "unrelated"]));
        assert_eq!(extender.not_yet_resolved(), &idents(&["a", "c"]));
    }

    #[test]
    fn context_resolution_prefers_inner_paths() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(
            &Selector::of(["Test", "Parent"]).expect("selector"),
            entity("Parent", None, &["inner"]),
        );
        hierarchy.insert(&Selector::single("Parent"), entity("Parent", None, &["outer"]));

        let mut extender = ClassExtender::of(orphan(&["inner", "outer"], "Parent"));
        extender
            .extend_within(
                &hierarchy,
                &[Selector::single("Test")],
                &CancellationToken::new(),
            )
            .expect("extension");
        assert!(extender.is_fully_extended());
        assert_eq!(extender.not_yet_resolved(), &idents(&["outer"]));
    }

    #[test]
    fn cancellation_surfaces_between_hops() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert(&Selector::single("Parent"), entity("Parent", None, &[]));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut extender = ClassExtender::of(orphan(&["x"], "Parent"));
        let err = extender
            .extend_using(&hierarchy, &cancel)
            .expect_err("cancelled");
        assert!(err.is_cancelled());
    }
}
