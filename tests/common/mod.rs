#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(&path, contents).expect("write file");
    path
}

/// A scratch project: manifest with one dependency, an artifact cache with
/// a small index for it, and a source directory.
pub struct ScratchProject {
    pub temp: tempfile::TempDir,
}

impl ScratchProject {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        write_file(
            temp.path(),
            "jimports.yaml",
            "package: com.example.app\n\
             dependencies:\n\
             - group: com.google.guava\n\
             \x20 artifact: guava\n\
             \x20 version: 31.1-jre\n",
        );
        write_file(
            temp.path(),
            "cache/com/google/guava/guava/31.1-jre/classes.json",
            r#"{"classes": [
                {"name": "com.google.common.collect.ImmutableList",
                 "members": ["of", "copyOf"]},
                {"name": "com.google.common.collect.ImmutableCollection",
                 "members": ["size", "toArray"]}
            ]}"#,
        );
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root().join("cache")
    }

    pub fn write_source(&self, relative: &str, contents: &str) -> PathBuf {
        write_file(self.root(), relative, contents)
    }
}
