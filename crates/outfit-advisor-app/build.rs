//! Embeds the workspace `VERSION` file as `OUTFIT_ADVISOR_VERSION`.

use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let version_path = manifest_dir
        .ancestors()
        .nth(2)
        .expect("workspace root above crates/<name>")
        .join("VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    let raw = std::fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("read {}: {error}", version_path.display()));
    let version = raw.trim();
    let parts: Vec<&str> = version.split('.').collect();
    assert!(
        parts.len() == 3
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())),
        "VERSION must be MAJOR.MINOR.PATCH, got '{version}'"
    );

    println!("cargo:rustc-env=OUTFIT_ADVISOR_VERSION={version}");
}
