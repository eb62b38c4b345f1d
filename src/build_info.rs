//! Build-time information
//!
//! Metadata captured by the build script, used for `--version` output.

/// Build timestamp (when the binary was compiled)
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu, x86_64-apple-darwin)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Rust compiler version (e.g., 1.85.0)
pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// Rust channel (stable, beta, or nightly)
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

/// Git commit SHA, when the crate was built from a checkout
pub const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

/// Returns the first 8 characters of the git SHA, or "unknown"
pub fn git_sha_short() -> &'static str {
    match GIT_SHA {
        Some(sha) if sha.len() >= 8 && sha.is_ascii() => &sha[..8],
        Some(sha) if !sha.is_empty() => sha,
        _ => "unknown",
    }
}

/// Returns the long version string shown by `--version`
///
/// Format:
/// ```text
/// 0.1.0 (abcdef12)
/// Built: 2026-01-01T00:00:00Z
/// Target: x86_64-unknown-linux-gnu (opt 3)
/// Rustc: 1.85.0 (stable)
/// ```
pub fn long_version() -> String {
    format!(
        "{} ({})\nBuilt: {}\nTarget: {} (opt {})\nRustc: {} ({})",
        env!("CARGO_PKG_VERSION"),
        git_sha_short(),
        BUILD_TIMESTAMP,
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL,
        RUSTC_SEMVER,
        RUSTC_CHANNEL
    )
}
