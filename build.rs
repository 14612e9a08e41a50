// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=VIEWFINDER_VERSION");

    // Packaged builds (flatpak, distro tarballs) have no .git and pin the version instead
    let version = std::env::var("VIEWFINDER_VERSION")
        .ok()
        .or_else(describe_head)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `git describe` output with the leading `v` stripped.
///
/// "v0.1.0" stays "0.1.0"; "v0.1.0-5-gabcdef1" becomes "0.1.0+5.abcdef1".
fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let described = described.strip_prefix('v').unwrap_or(&described);

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [hash, commits, tag] => {
            let hash = hash.strip_prefix('g').unwrap_or(hash);
            Some(format!("{}+{}.{}", tag, commits, hash))
        }
        _ => Some(described.to_string()),
    }
}
