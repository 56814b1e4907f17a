use assert_cmd::Command;
use predicates::prelude::*;

mod common;
use common::ScratchProject;

fn jimports() -> Command {
    Command::cargo_bin("jimports").expect("jimports binary")
}

#[test]
fn version_prints_the_banner() {
    jimports()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("jimports "));
}

#[test]
fn help_prints_usage() {
    jimports()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE"))
        .stdout(predicate::str::contains("fix <files...>"));
}

#[test]
fn unknown_command_fails_with_usage() {
    jimports()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command"));
}

#[test]
fn fix_prints_the_rewritten_file() {
    let project = ScratchProject::new();
    let file = project.write_source(
        "src/com/example/app/App.java",
        "package com.example.app;\n\nclass App {\n  ImmutableList names;\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("fix")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "import com.google.common.collect.ImmutableList;",
        ));
}

#[test]
fn fix_write_updates_the_file_in_place() {
    let project = ScratchProject::new();
    let file = project.write_source(
        "src/com/example/app/App.java",
        "package com.example.app;\n\nclass App {\n  ImmutableList names;\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("fix")
        .arg("--write")
        .arg(&file)
        .assert()
        .success();

    let updated = std::fs::read_to_string(&file).expect("read updated file");
    assert!(
        updated.contains("import com.google.common.collect.ImmutableList;\n"),
        "file was rewritten in place:\n{updated}"
    );
}

#[test]
fn check_fails_when_imports_are_missing() {
    let project = ScratchProject::new();
    let file = project.write_source(
        "src/com/example/app/App.java",
        "package com.example.app;\n\nclass App {\n  ImmutableList names;\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "missing: import com.google.common.collect.ImmutableList;",
        ))
        .stderr(predicate::str::contains("imports out of date"));
}

#[test]
fn check_passes_on_a_clean_file() {
    let project = ScratchProject::new();
    let file = project.write_source(
        "src/com/example/app/App.java",
        "package com.example.app;\n\n\
         import com.google.common.collect.ImmutableList;\n\n\
         class App {\n  ImmutableList names = ImmutableList.of();\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("check")
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn check_reports_unused_imports() {
    let project = ScratchProject::new();
    let file = project.write_source(
        "src/com/example/app/App.java",
        "package com.example.app;\n\n\
         import com.google.common.collect.ImmutableList;\n\n\
         class App {\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "unused:  import com.google.common.collect.ImmutableList;",
        ));
}

#[test]
fn check_walks_directories() {
    let project = ScratchProject::new();
    project.write_source(
        "src/com/example/app/Clean.java",
        "package com.example.app;\n\nclass Clean {\n}\n",
    );
    project.write_source(
        "src/com/example/app/Dirty.java",
        "package com.example.app;\n\nclass Dirty {\n  ImmutableList names;\n}\n",
    );

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("check")
        .arg(project.root().join("src"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Dirty.java"))
        .stdout(predicate::str::contains("missing:"));
}

#[test]
fn parse_failures_are_reported_per_file() {
    let project = ScratchProject::new();
    let file = project.write_source("src/com/example/app/Broken.java", "class {\n");

    jimports()
        .env("JIMPORTS_ARTIFACT_CACHE", project.cache_dir())
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error"));
}
