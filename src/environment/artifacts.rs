use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::debug;

use super::manifest::Coordinate;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::scan::{ClassEntity, Selector};

const ARTIFACT_MALFORMED: &str = "ENV2001";

static DEFAULT_CACHE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if let Some(dir) = env::var_os("JIMPORTS_ARTIFACT_CACHE") {
        return PathBuf::from(dir);
    }
    let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".cache").join("jimports").join("artifacts")
});

/// Artifact cache root: `JIMPORTS_ARTIFACT_CACHE` or a per-user default.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    DEFAULT_CACHE_DIR.clone()
}

/// Index location for one coordinate inside a cache root.
#[must_use]
pub fn index_path(cache_dir: &Path, coordinate: &Coordinate) -> PathBuf {
    let mut path = cache_dir.to_path_buf();
    for segment in coordinate.group.split('.') {
        path.push(segment);
    }
    path.push(&coordinate.artifact);
    path.push(&coordinate.version);
    path.push("classes.json");
    path
}

/// A resolved dependency artifact: the class shapes its index declares.
#[derive(Debug)]
pub struct Artifact {
    pub coordinate: Coordinate,
    classes: Vec<ArtifactClass>,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    classes: Vec<ArtifactClass>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactClass {
    /// Fully qualified dotted name.
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Artifact {
    /// Class entities keyed by their fully qualified selector.
    pub fn classes(&self) -> impl Iterator<Item = (Selector, ClassEntity)> + '_ {
        self.classes.iter().filter_map(|class| {
            let path = Selector::of(class.name.split('.'))?;
            let superclass = class
                .superclass
                .as_deref()
                .and_then(|name| Selector::of(name.split('.')));
            let members = class
                .members
                .iter()
                .map(|member| member.as_str().into())
                .collect();
            let entity = ClassEntity::new(path.last().as_str(), superclass, members);
            Some((path, entity))
        })
    }
}

/// Load one coordinate's index from the cache. A missing index is a normal
/// miss (`Ok(None)`); a malformed one surfaces as a diagnostic.
pub fn load_artifact(
    cache_dir: &Path,
    coordinate: &Coordinate,
) -> Result<Option<Artifact>, Diagnostic> {
    let path = index_path(cache_dir, coordinate);
    if !path.is_file() {
        debug!(%coordinate, path = %path.display(), "artifact index not cached");
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|err| {
        artifact_error(format!(
            "cannot read artifact index `{}`: {err}",
            path.display()
        ))
    })?;
    let raw: RawIndex = serde_json::from_str(&contents).map_err(|err| {
        artifact_error(format!(
            "artifact index `{}` is not valid JSON: {err}",
            path.display()
        ))
    })?;
    debug!(%coordinate, classes = raw.classes.len(), "loaded artifact index");
    Ok(Some(Artifact {
        coordinate: coordinate.clone(),
        classes: raw.classes,
    }))
}

fn artifact_error(message: String) -> Diagnostic {
    Diagnostic::error(message, None).with_code(DiagnosticCode::new(
        ARTIFACT_MALFORMED.to_string(),
        Some("environment".into()),
    ))
}
