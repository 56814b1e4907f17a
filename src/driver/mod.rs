//! End-to-end pipeline: parse a file, scan it, assemble the surrounding
//! hierarchy, extend orphans, and compute the import block the file needs.

mod lang;
mod report;

pub use report::{FixReport, ImportLine};

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use crate::diagnostics::Span;
use crate::environment::ProjectEnvironment;
use crate::error::{Error, Result};
use crate::frontend::ast::{CompilationUnit, Member, TypeDecl};
use crate::frontend::parser::parse_unit;
use crate::scan::{
    CancellationToken, ClassEntity, ClassExtender, ClassHierarchy, Identifier, Selector,
    scan_with_cancel,
};

/// Drives import fixing for one or many files. Workers share the
/// cancellation token; everything else stays per-file.
#[derive(Debug, Default)]
pub struct ImportDriver {
    cancel: CancellationToken,
}

impl ImportDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fix a single file's imports.
    pub fn fix_file(&self, path: &Path) -> Result<FixReport> {
        let source = fs::read_to_string(path)?;
        let mut env = ProjectEnvironment::discover(path);
        self.fix_with_env(&mut env, path, &source)
    }

    /// Fix several files, fanning out one worker thread per file. The
    /// environment stays read-only per worker; results come back in input
    /// order.
    pub fn fix_paths(&self, paths: &[PathBuf]) -> Vec<Result<FixReport>> {
        if paths.len() <= 1 {
            return paths.iter().map(|path| self.fix_file(path)).collect();
        }
        info!(files = paths.len(), "fixing files concurrently");
        thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| scope.spawn(move || self.fix_file(path)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(Error::internal("fix worker panicked")))
                })
                .collect()
        })
    }

    fn fix_with_env(
        &self,
        env: &mut ProjectEnvironment,
        path: &Path,
        source: &str,
    ) -> Result<FixReport> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let parsed = parse_unit(source)
            .map_err(|err| Error::Parse(err.with_file(path.to_path_buf(), source.to_string())))?;
        let scan_result = scan_with_cancel(&parsed.unit, &self.cancel)?;
        debug!(
            file = %path.display(),
            unresolved = scan_result.unresolved.len(),
            orphans = scan_result.orphans.len(),
            "scanned"
        );

        let sibling_units = env.sibling_units(path);
        let package_classes = ProjectEnvironment::classes_in_package(&sibling_units);

        let mut hierarchy = ClassHierarchy::new();
        register_unit_types(&mut hierarchy, &parsed.unit);
        for unit in &sibling_units {
            register_unit_types(&mut hierarchy, unit);
        }

        // Imported names alias their fully qualified artifact entries, so
        // orphan superclass links written as simple names still resolve.
        let import_paths: Vec<(String, String)> = parsed
            .unit
            .imports
            .iter()
            .filter(|import| !import.is_static && !import.is_wildcard)
            .filter_map(|import| {
                import
                    .simple_name()
                    .map(|simple| (simple.to_string(), import.path.to_string()))
            })
            .collect();

        let mut candidates: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for artifact in env.dependency_artifacts() {
            for (full_path, entity) in artifact.classes() {
                let full = full_path.to_string();
                let simple = full_path.last().as_str().to_string();
                for (alias, imported) in &import_paths {
                    if &full == imported {
                        hierarchy.insert(&Selector::single(alias.clone()), entity.clone());
                    } else if let Some(rest) = full.strip_prefix(&format!("{imported}.")) {
                        let alias_path = format!("{alias}.{rest}");
                        if let Some(selector) = Selector::of(alias_path.split('.')) {
                            hierarchy.insert(&selector, entity.clone());
                        }
                    }
                }
                candidates.entry(simple).or_default().insert(full);
                hierarchy.insert(&full_path, entity);
            }
        }

        let mut residuals: HashSet<Identifier> = scan_result.unresolved.clone();
        for orphan in &scan_result.orphans {
            let mut extender = ClassExtender::of(orphan.clone());
            extender.resolve_using(&package_classes);
            extender.extend_using(&hierarchy, &self.cancel)?;
            residuals.extend(extender.into_not_yet_resolved());
        }

        residuals.retain(|name| {
            let name = name.as_str();
            name != "this" && name != "super"
        });
        residuals.retain(|name| !package_classes.contains(name.as_str()));
        residuals.retain(|name| !lang::is_core_type(name.as_str()));

        let mut names: Vec<&Identifier> = residuals.iter().collect();
        names.sort_unstable();
        let mut added = Vec::new();
        let mut unresolvable = Vec::new();
        for name in names {
            match candidates.get(name.as_str()).and_then(|c| c.iter().next()) {
                Some(best) => added.push(ImportLine::single(best.clone())),
                None => unresolvable.push(name.as_str().to_string()),
            }
        }

        let removed = self.unused_imports(&parsed.unit)?;

        let mut final_imports: Vec<ImportLine> = parsed
            .unit
            .imports
            .iter()
            .map(|import| ImportLine {
                path: import.path.to_string(),
                is_static: import.is_static,
                is_wildcard: import.is_wildcard,
            })
            .filter(|line| !removed.contains(line))
            .collect();
        final_imports.extend(added.iter().cloned());
        let rewritten = rewrite_imports(source, &parsed.unit, &mut final_imports);

        let report = FixReport {
            file: path.to_path_buf(),
            added,
            removed,
            unresolvable,
            rewritten,
            diagnostics: env.diagnostics().to_vec(),
        };
        info!(file = %path.display(), summary = %report.summary(), "fixed");
        Ok(report)
    }

    /// An import is superfluous when a scan of the import-less unit never
    /// misses its name; top-level types shadowing an import keep it out of
    /// the report.
    fn unused_imports(&self, unit: &CompilationUnit) -> Result<Vec<ImportLine>> {
        if unit.imports.is_empty() {
            return Ok(Vec::new());
        }
        let mut bare = unit.clone();
        bare.imports.clear();
        let bare_result = scan_with_cancel(&bare, &self.cancel)?;
        let wanted = bare_result.all_unresolved();
        let shadowed: HashSet<&str> = unit.types.iter().map(|decl| decl.name.as_str()).collect();
        Ok(unit
            .imports
            .iter()
            .filter(|import| !import.is_wildcard)
            .filter(|import| {
                import.simple_name().is_some_and(|simple| {
                    !wanted.contains(simple) && !shadowed.contains(simple)
                })
            })
            .map(|import| ImportLine {
                path: import.path.to_string(),
                is_static: import.is_static,
                is_wildcard: false,
            })
            .collect())
    }
}

/// Register a unit's type declarations, nested ones included, under their
/// simple-name paths.
fn register_unit_types(hierarchy: &mut ClassHierarchy, unit: &CompilationUnit) {
    fn walk(hierarchy: &mut ClassHierarchy, decl: &TypeDecl, path: &mut Vec<String>) {
        path.push(decl.name.clone());
        if let Some(selector) = Selector::of(path.iter().cloned()) {
            hierarchy.insert(&selector, ClassEntity::from_decl(decl));
        }
        for member in &decl.members {
            if let Member::Type(nested) = member {
                walk(hierarchy, nested, path);
            }
        }
        path.pop();
    }
    let mut path = Vec::new();
    for decl in &unit.types {
        walk(hierarchy, decl, &mut path);
    }
}

/// Replace (or insert) the file's import block with the final set, sorted
/// with static imports last.
fn rewrite_imports(
    source: &str,
    unit: &CompilationUnit,
    imports: &mut Vec<ImportLine>,
) -> String {
    imports.sort_by(|a, b| {
        (a.is_static, &a.path, a.is_wildcard).cmp(&(b.is_static, &b.path, b.is_wildcard))
    });
    imports.dedup();
    let block: String = imports
        .iter()
        .map(|line| format!("{line}\n"))
        .collect();

    let spans: Vec<Span> = unit.imports.iter().filter_map(|import| import.span).collect();
    if let (Some(start), Some(end)) = (
        spans.iter().map(|span| span.start).min(),
        spans.iter().map(|span| span.end).max(),
    ) {
        let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = source[end..]
            .find('\n')
            .map(|i| end + i + 1)
            .unwrap_or(source.len());
        return format!("{}{block}{}", &source[..line_start], &source[line_end..]);
    }

    if imports.is_empty() {
        return source.to_string();
    }
    match unit.package.as_ref().and_then(|package| package.span) {
        Some(span) => {
            let after_semi = source[span.end..]
                .find(';')
                .map(|i| span.end + i + 1)
                .unwrap_or(span.end);
            let line_end = source[after_semi..]
                .find('\n')
                .map(|i| after_semi + i + 1)
                .unwrap_or(source.len());
            format!(
                "{}\n{block}{}",
                &source[..line_end],
                &source[line_end..]
            )
        }
        None => format!("{block}\n{source}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::manifest::PROJECT_MANIFEST_BASENAME;
    use std::fs;

    fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    fn write_guava_index(cache: &Path) {
        write_file(
            cache,
            "com/google/guava/guava/31.1-jre/classes.json",
            r#"{"classes": [
                {"name": "com.google.common.collect.ImmutableList",
                 "members": ["of", "copyOf"]},
                {"name": "com.google.common.collect.ImmutableCollection",
                 "members": ["size", "toArray"]}
            ]}"#,
        );
    }

    fn project(source: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        write_file(
            temp.path(),
            PROJECT_MANIFEST_BASENAME,
            "package: com.example.app\n\
             dependencies:\n\
             - group: com.google.guava\n\
             \x20 artifact: guava\n\
             \x20 version: 31.1-jre\n",
        );
        write_guava_index(&temp.path().join("cache"));
        let file = write_file(temp.path(), "src/com/example/app/App.java", source);
        (temp, file)
    }

    fn fix(temp: &tempfile::TempDir, file: &Path) -> FixReport {
        let driver = ImportDriver::new();
        let source = fs::read_to_string(file).expect("read source");
        let mut env = ProjectEnvironment::discover(file);
        env.set_cache_dir(temp.path().join("cache"));
        driver
            .fix_with_env(&mut env, file, &source)
            .expect("fix succeeds")
    }

    #[test]
    fn adds_missing_imports_from_artifacts() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             class App {\n\
               void f() {\n\
                 ImmutableList list = ImmutableList.of();\n\
               }\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert_eq!(
            report.added,
            vec![ImportLine::single("com.google.common.collect.ImmutableList")]
        );
        assert!(report.removed.is_empty());
        assert!(report.unresolvable.is_empty());
        assert!(
            report
                .rewritten
                .contains("import com.google.common.collect.ImmutableList;\n"),
            "rewritten source carries the new import:\n{}",
            report.rewritten
        );
        assert!(report.rewritten.starts_with("package com.example.app;\n"));
    }

    #[test]
    fn orphan_extension_uses_artifact_hierarchy() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             import com.google.common.collect.ImmutableCollection;\n\
             \n\
             class Custom extends ImmutableCollection {\n\
               int count() {\n\
                 return size();\n\
               }\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert!(
            report.added.is_empty(),
            "size() is inherited, nothing to import: {:?}",
            report.added
        );
        assert!(report.unresolvable.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn sibling_classes_need_no_import() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             class App {\n\
               Helper helper = new Helper();\n\
             }\n",
        );
        write_file(
            temp.path(),
            "src/com/example/app/Helper.java",
            "package com.example.app;\n\nclass Helper {}\n",
        );
        let report = fix(&temp, &file);
        assert!(report.added.is_empty(), "unexpected: {:?}", report.added);
        assert!(report.unresolvable.is_empty());
    }

    #[test]
    fn unused_single_imports_are_removed() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             import com.google.common.collect.ImmutableList;\n\
             import java.util.List;\n\
             import java.util.*;\n\
             \n\
             class App {\n\
               List<String> names;\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert_eq!(
            report.removed,
            vec![ImportLine::single("com.google.common.collect.ImmutableList")]
        );
        assert!(
            report.rewritten.contains("import java.util.List;"),
            "used imports survive"
        );
        assert!(
            report.rewritten.contains("import java.util.*;"),
            "wildcards are never removed"
        );
        assert!(
            !report
                .rewritten
                .contains("import com.google.common.collect.ImmutableList;"),
            "unused import dropped:\n{}",
            report.rewritten
        );
    }

    #[test]
    fn unknown_identifiers_are_reported_unresolvable() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             class App {\n\
               Widget widget;\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert!(report.added.is_empty());
        assert_eq!(report.unresolvable, vec!["Widget".to_string()]);
    }

    #[test]
    fn core_package_names_never_need_imports() {
        let (temp, file) = project(
            "package com.example.app;\n\
             \n\
             class App {\n\
               String name = System.lineSeparator();\n\
               @Override\n\
               public String toString() { return name; }\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert!(report.is_clean());
        assert!(report.unresolvable.is_empty());
    }

    #[test]
    fn parse_failures_surface_as_parse_errors() {
        let temp = tempfile::tempdir().expect("temp dir");
        let file = write_file(temp.path(), "Broken.java", "class {");
        let driver = ImportDriver::new();
        let err = driver.fix_file(&file).expect_err("parse failure");
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn cancellation_aborts_the_pipeline() {
        let (temp, file) = project("package com.example.app;\nclass App {}\n");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let driver = ImportDriver::with_cancellation(cancel);
        let source = fs::read_to_string(&file).expect("read source");
        let mut env = ProjectEnvironment::discover(&file);
        env.set_cache_dir(temp.path().join("cache"));
        let err = driver
            .fix_with_env(&mut env, &file, &source)
            .expect_err("cancelled");
        assert!(err.is_cancelled());
    }

    #[test]
    fn fix_paths_processes_files_in_order() {
        let temp = tempfile::tempdir().expect("temp dir");
        let first = write_file(temp.path(), "pkg/A.java", "package pkg;\nclass A {}\n");
        let second = write_file(temp.path(), "pkg/B.java", "package pkg;\nclass B {}\n");
        let driver = ImportDriver::new();
        let reports = driver.fix_paths(&[first.clone(), second.clone()]);
        assert_eq!(reports.len(), 2);
        let paths: Vec<PathBuf> = reports
            .into_iter()
            .map(|report| report.expect("fix succeeds").file)
            .collect();
        assert_eq!(paths, vec![first, second]);
    }

    #[test]
    fn insertion_without_existing_imports_lands_after_the_package() {
        let (temp, file) = project(
            "package com.example.app;\n\
             class App {\n\
               ImmutableList list;\n\
             }\n",
        );
        let report = fix(&temp, &file);
        assert_eq!(
            report.rewritten,
            "package com.example.app;\n\
             \n\
             import com.google.common.collect.ImmutableList;\n\
             class App {\n\
             ImmutableList list;\n\
             }\n"
        );
    }
}
