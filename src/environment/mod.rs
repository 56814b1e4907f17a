//! Project surroundings of a scanned file: the manifest, sibling sources
//! in the same package, and dependency artifacts from the local cache.

pub mod artifacts;
pub mod manifest;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

pub use artifacts::{Artifact, default_cache_dir, load_artifact};
pub use manifest::{Coordinate, Manifest, PROJECT_MANIFEST_BASENAME};

use crate::diagnostics::Diagnostic;
use crate::frontend::ast::CompilationUnit;
use crate::frontend::parser::parse_unit;
use crate::scan::Identifier;

/// The discovered project around one source file.
#[derive(Debug)]
pub struct ProjectEnvironment {
    root: PathBuf,
    manifest: Manifest,
    cache_dir: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl ProjectEnvironment {
    /// Walk upwards from the file for a `jimports.yaml`; without one the
    /// file's directory is the root and there are no dependencies.
    #[must_use]
    pub fn discover(file: &Path) -> Self {
        let start = file.parent().unwrap_or_else(|| Path::new("."));
        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(PROJECT_MANIFEST_BASENAME);
            if candidate.is_file() {
                let (manifest, diagnostics) = Manifest::load(&candidate);
                debug!(root = %dir.display(), dependencies = manifest.dependencies.len(), "project root found");
                return Self {
                    root: dir.to_path_buf(),
                    manifest,
                    cache_dir: default_cache_dir(),
                    diagnostics,
                };
            }
            current = dir.parent();
        }
        debug!(root = %start.display(), "no manifest, treating file directory as root");
        Self {
            root: start.to_path_buf(),
            manifest: Manifest::default(),
            cache_dir: default_cache_dir(),
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Diagnostics accumulated while discovering and loading.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn set_cache_dir(&mut self, cache_dir: PathBuf) {
        self.cache_dir = cache_dir;
    }

    /// Source files sharing the file's package, which by convention is its
    /// directory. The file itself is excluded.
    #[must_use]
    pub fn siblings(&self, file: &Path) -> Vec<PathBuf> {
        let Some(dir) = file.parent() else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "java") && path.as_path() != file
            })
            .collect();
        paths.sort();
        paths
    }

    /// Parse the siblings of a file, skipping ones that fail to parse.
    pub fn sibling_units(&mut self, file: &Path) -> Vec<CompilationUnit> {
        let mut units = Vec::new();
        for path in self.siblings(file) {
            match fs::read_to_string(&path) {
                Ok(source) => match parse_unit(&source) {
                    Ok(parsed) => units.push(parsed.unit),
                    Err(err) => {
                        warn!(file = %path.display(), "sibling failed to parse, skipping");
                        self.diagnostics.push(Diagnostic::warning(
                            format!("sibling `{}` skipped: {err}", path.display()),
                            None,
                        ));
                    }
                },
                Err(err) => {
                    self.diagnostics.push(Diagnostic::warning(
                        format!("sibling `{}` unreadable: {err}", path.display()),
                        None,
                    ));
                }
            }
        }
        units
    }

    /// Identifiers declared at the top level of the package, from siblings.
    #[must_use]
    pub fn classes_in_package(units: &[CompilationUnit]) -> HashSet<Identifier> {
        units
            .iter()
            .flat_map(|unit| unit.types.iter())
            .map(|decl| Identifier::new(decl.name.clone()))
            .collect()
    }

    /// Every declared dependency with a cached index. Misses are normal;
    /// malformed indexes become diagnostics.
    pub fn dependency_artifacts(&mut self) -> Vec<Artifact> {
        let mut loaded = Vec::new();
        for coordinate in self.manifest.dependencies.clone() {
            match load_artifact(&self.cache_dir, &coordinate) {
                Ok(Some(artifact)) => loaded.push(artifact),
                Ok(None) => {}
                Err(diagnostic) => self.diagnostics.push(diagnostic),
            }
        }
        loaded
    }

    /// All project source files under the root, for directory-wide runs.
    #[must_use]
    pub fn project_sources(root: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "java"))
            .collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    #[test]
    fn discovers_the_manifest_upwards() {
        let temp = tempfile::tempdir().expect("temp dir");
        write_file(
            temp.path(),
            PROJECT_MANIFEST_BASENAME,
            "package: com.example\ndependencies: []\n",
        );
        let file = write_file(
            temp.path(),
            "src/com/example/App.java",
            "package com.example; class App {}",
        );
        let env = ProjectEnvironment::discover(&file);
        assert_eq!(env.root(), temp.path());
        assert_eq!(env.manifest().package.as_deref(), Some("com.example"));
    }

    #[test]
    fn missing_manifest_defaults_to_the_file_directory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let file = write_file(temp.path(), "App.java", "class App {}");
        let env = ProjectEnvironment::discover(&file);
        assert_eq!(env.root(), temp.path());
        assert!(env.manifest().dependencies.is_empty());
        assert!(env.diagnostics().is_empty());
    }

    #[test]
    fn siblings_are_same_directory_java_files() {
        let temp = tempfile::tempdir().expect("temp dir");
        let file = write_file(temp.path(), "pkg/A.java", "package pkg; class A {}");
        write_file(temp.path(), "pkg/B.java", "package pkg; class B {}");
        write_file(temp.path(), "pkg/notes.txt", "not a source file");
        write_file(temp.path(), "other/C.java", "package other; class C {}");

        let mut env = ProjectEnvironment::discover(&file);
        let siblings = env.siblings(&file);
        assert_eq!(siblings.len(), 1);
        assert!(siblings[0].ends_with("B.java"));

        let units = env.sibling_units(&file);
        let names = ProjectEnvironment::classes_in_package(&units);
        assert!(names.contains("B"));
        assert!(!names.contains("A"), "the file itself is excluded");
        assert!(!names.contains("C"), "other packages are not siblings");
    }

    #[test]
    fn unparseable_siblings_are_skipped_with_a_warning() {
        let temp = tempfile::tempdir().expect("temp dir");
        let file = write_file(temp.path(), "pkg/A.java", "package pkg; class A {}");
        write_file(temp.path(), "pkg/Broken.java", "class {");
        let mut env = ProjectEnvironment::discover(&file);
        let units = env.sibling_units(&file);
        assert!(units.is_empty());
        assert_eq!(env.diagnostics().len(), 1);
    }

    #[test]
    fn project_sources_walk_the_tree() {
        let temp = tempfile::tempdir().expect("temp dir");
        write_file(temp.path(), "a/A.java", "class A {}");
        write_file(temp.path(), "a/b/B.java", "class B {}");
        write_file(temp.path(), "a/b/readme.md", "docs");
        let sources = ProjectEnvironment::project_sources(temp.path());
        assert_eq!(sources.len(), 2);
    }
}
