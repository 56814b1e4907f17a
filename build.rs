use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    if let Some(hash) = git_output(&["rev-parse", "--short=12", "HEAD"]) {
        println!("cargo:rustc-env=JIMPORTS_GIT_HASH={hash}");
    }
    if let Some(hash) = git_output(&["rev-parse", "HEAD"]) {
        println!("cargo:rustc-env=JIMPORTS_GIT_HASH_FULL={hash}");
    }

    let build_unix = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs())
        });
    if let Some(unix) = build_unix {
        println!("cargo:rustc-env=JIMPORTS_BUILD_UNIX={unix}");
    }
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
