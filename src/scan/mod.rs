//! The core analysis: an unresolved-identifier scanner over parsed
//! compilation units, and progressive class extension against a hierarchy
//! of known classes.

mod entity;
mod extender;
mod hierarchy;
mod identifier;
mod scanner;
mod scope;
mod selector;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use entity::{ClassEntity, Entity, EntityKind, MemberEntity};
pub use extender::{ClassExtender, Extension, OrphanClass};
pub use hierarchy::ClassHierarchy;
pub use identifier::Identifier;
pub use scanner::UnresolvedIdentifierScanner;
pub use scope::Scope;
pub use selector::Selector;

use crate::error::Result;
use crate::frontend::ast::CompilationUnit;

/// Cooperative cancellation shared between a driver and the core.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Output of scanning one compilation unit.
#[derive(Debug)]
pub struct ScanResult {
    /// The package scope, populated with imports and top-level declarations.
    pub package_scope: Scope,
    /// Identifiers that resolved to nothing visible in the file.
    pub unresolved: HashSet<Identifier>,
    /// Classes whose unresolved sets await superclass information.
    pub orphans: Vec<OrphanClass>,
}

impl ScanResult {
    /// The file-level set united with every orphan's residuals.
    #[must_use]
    pub fn all_unresolved(&self) -> HashSet<Identifier> {
        let mut all = self.unresolved.clone();
        for orphan in &self.orphans {
            all.extend(orphan.unresolved().iter().cloned());
        }
        all
    }
}

/// Output of extending one orphan class.
#[derive(Debug)]
pub struct ExtendResult {
    pub unresolved: HashSet<Identifier>,
    pub fully_extended: bool,
}

/// Scan a parsed compilation unit.
pub fn scan(unit: &CompilationUnit) -> Result<ScanResult> {
    scan_with_cancel(unit, &CancellationToken::default())
}

/// Scan with a caller-supplied cancellation token, checked at every scope
/// open.
pub fn scan_with_cancel(unit: &CompilationUnit, cancel: &CancellationToken) -> Result<ScanResult> {
    UnresolvedIdentifierScanner::new(cancel).scan(unit)
}

/// Extend an orphan class as far as the hierarchy allows.
pub fn extend(orphan: &OrphanClass, hierarchy: &ClassHierarchy) -> Result<ExtendResult> {
    extend_with_cancel(orphan, hierarchy, &CancellationToken::default())
}

/// Extend with a caller-supplied cancellation token, checked between hops.
pub fn extend_with_cancel(
    orphan: &OrphanClass,
    hierarchy: &ClassHierarchy,
    cancel: &CancellationToken,
) -> Result<ExtendResult> {
    let mut extender = ClassExtender::of(orphan.clone());
    extender.extend_using(hierarchy, cancel)?;
    Ok(ExtendResult {
        fully_extended: extender.is_fully_extended(),
        unresolved: extender.into_not_yet_resolved(),
    })
}
