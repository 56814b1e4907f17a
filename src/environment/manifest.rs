use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Basename of the project manifest looked up from a source file upwards.
pub const PROJECT_MANIFEST_BASENAME: &str = "jimports.yaml";

const MANIFEST_UNREADABLE: &str = "ENV1001";
const MANIFEST_MALFORMED: &str = "ENV1002";
const MANIFEST_BAD_COORDINATE: &str = "ENV1003";

/// Parsed representation of `jimports.yaml`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Root package of the project's own sources, when declared.
    pub package: Option<String>,
    pub dependencies: Vec<Coordinate>,
}

/// One dependency coordinate, resolved against the local artifact cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: Option<String>,
    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    group: Option<String>,
    artifact: Option<String>,
    version: Option<String>,
}

impl Manifest {
    /// Load and validate a manifest. Problems surface as diagnostics; a
    /// partially valid manifest still yields its valid coordinates.
    pub fn load(path: &Path) -> (Manifest, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                diagnostics.push(manifest_error(
                    MANIFEST_UNREADABLE,
                    format!("cannot read manifest `{}`: {err}", path.display()),
                ));
                return (Manifest::default(), diagnostics);
            }
        };
        let raw: RawManifest = match serde_yaml::from_str(&contents) {
            Ok(raw) => raw,
            Err(err) => {
                diagnostics.push(manifest_error(
                    MANIFEST_MALFORMED,
                    format!("manifest `{}` is not valid YAML: {err}", path.display()),
                ));
                return (Manifest::default(), diagnostics);
            }
        };

        let mut dependencies = Vec::new();
        for (index, dependency) in raw.dependencies.into_iter().enumerate() {
            match validate_dependency(dependency) {
                Ok(coordinate) => dependencies.push(coordinate),
                Err(reason) => diagnostics.push(manifest_error(
                    MANIFEST_BAD_COORDINATE,
                    format!(
                        "dependency #{} in `{}` is incomplete: {reason}",
                        index + 1,
                        path.display()
                    ),
                )),
            }
        }

        (
            Manifest {
                package: raw.package,
                dependencies,
            },
            diagnostics,
        )
    }
}

fn validate_dependency(raw: RawDependency) -> Result<Coordinate, &'static str> {
    let group = raw.group.filter(|g| !g.is_empty()).ok_or("missing group")?;
    let artifact = raw
        .artifact
        .filter(|a| !a.is_empty())
        .ok_or("missing artifact")?;
    let version = raw
        .version
        .filter(|v| !v.is_empty())
        .ok_or("missing version")?;
    Ok(Coordinate {
        group,
        artifact,
        version,
    })
}

fn manifest_error(code: &'static str, message: String) -> Diagnostic {
    Diagnostic::error(message, None).with_code(DiagnosticCode::new(
        code.to_string(),
        Some("environment".into()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(PROJECT_MANIFEST_BASENAME);
        let mut file = fs::File::create(&path).expect("create manifest");
        file.write_all(contents.as_bytes()).expect("write manifest");
        (dir, path)
    }

    #[test]
    fn loads_package_and_dependencies() {
        let (_dir, path) = write_manifest(
            "package: com.example.app\n\
             dependencies:\n\
             - group: com.google.guava\n\
             \x20 artifact: guava\n\
             \x20 version: 31.1-jre\n",
        );
        let (manifest, diagnostics) = Manifest::load(&path);
        assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
        assert_eq!(manifest.package.as_deref(), Some("com.example.app"));
        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(
            manifest.dependencies[0].to_string(),
            "com.google.guava:guava:31.1-jre"
        );
    }

    #[test]
    fn incomplete_coordinates_become_diagnostics_not_errors() {
        let (_dir, path) = write_manifest(
            "dependencies:\n\
             - group: com.example\n\
             \x20 artifact: widget\n\
             \x20 version: 1.0.0\n\
             - group: com.example\n",
        );
        let (manifest, diagnostics) = Manifest::load(&path);
        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("incomplete"));
    }

    #[test]
    fn missing_manifest_reports_and_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(PROJECT_MANIFEST_BASENAME);
        let (manifest, diagnostics) = Manifest::load(&path);
        assert!(manifest.dependencies.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }
}
