//! Build script for anicolle-server
//!
//! Stamps the binary with `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`
//! for the startup log line and `GET /api/buildinfo`.

use std::process::Command;

/// Short commit hash, or "unknown" outside a git checkout
fn git_short_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    // RFC 3339, local offset, whole seconds
    let built_at = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    for (key, value) in [
        ("GIT_HASH", git_short_hash()),
        ("BUILD_TIMESTAMP", built_at),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }

    // Without rerun-if-changed cargo reruns this on every build
}
