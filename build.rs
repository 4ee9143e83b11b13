use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn main() {
    // HEAD moves on commit and checkout; Cargo.toml carries the release version.
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();

    // Only a `v<CARGO_PKG_VERSION>` tag on HEAD counts as a release build.
    let release_tag = format!("v{}", env!("CARGO_PKG_VERSION"));
    let on_tag = git(&["tag", "--points-at", "HEAD"])
        .is_some_and(|tags| tags.lines().any(|t| t == release_tag));

    println!("cargo:rustc-env=GIT_HASH={hash}");
    println!("cargo:rustc-env=ON_RELEASE_TAG={on_tag}");
}
