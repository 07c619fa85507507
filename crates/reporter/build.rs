//! Build script recording the toolchain and source revision for `version`.

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-env-changed=BUILDPULSE_COMMIT");
    println!("cargo::rerun-if-changed=../../.git/HEAD");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let toolchain = command_output(&rustc, &["--version"]).unwrap_or_else(|| "unknown".to_string());
    println!("cargo::rustc-env=BUILDPULSE_RUSTC_VERSION={toolchain}");

    let commit = std::env::var("BUILDPULSE_COMMIT")
        .ok()
        .filter(|c| !c.is_empty())
        .or_else(|| command_output("git", &["rev-parse", "--short=12", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo::rustc-env=BUILDPULSE_COMMIT={commit}");
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
