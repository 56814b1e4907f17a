//! Build-time metadata helpers used by the CLI.

/// Short git hash determined at compile time when available.
#[must_use]
pub fn commit_hash() -> &'static str {
    option_env!("JIMPORTS_GIT_HASH").unwrap_or("unknown")
}

/// Full git hash determined at compile time when available.
#[must_use]
pub fn commit_hash_full() -> &'static str {
    option_env!("JIMPORTS_GIT_HASH_FULL").unwrap_or("unknown")
}

/// Unix timestamp (seconds since epoch) recorded at build time.
#[must_use]
pub fn build_timestamp() -> &'static str {
    option_env!("JIMPORTS_BUILD_UNIX").unwrap_or("unknown")
}

/// Crate version from the manifest.
#[must_use]
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// One-line version banner for `jimports version`.
#[must_use]
pub fn banner() -> String {
    format!("jimports {} ({})", crate_version(), commit_hash())
}
