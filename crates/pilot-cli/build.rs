use pilot_core::generate::generate_packaged_assets;
use pilot_core::verify::verify_bundle;
use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let source = manifest_dir.join("assets");
    let bundle = out_dir.join("bundle");

    println!("cargo:rerun-if-changed={}", source.display());

    // Start from an empty bundle so assets removed from the source tree
    // (or newly excluded by the manifest) do not linger.
    if bundle.exists() {
        std::fs::remove_dir_all(&bundle).expect("clear previous bundle");
    }

    let count = match generate_packaged_assets(&source, &bundle) {
        Ok(count) => count,
        Err(e) => panic!("asset generation failed for {}: {e}", source.display()),
    };

    // A binary without its assets would report a successful install of nothing.
    let violations = verify_bundle(&bundle);
    if !violations.is_empty() {
        for violation in &violations {
            println!("cargo:warning={violation}");
        }
        panic!(
            "asset bundle failed verification with {} violation(s)",
            violations.len()
        );
    }
    println!("cargo:warning=bundled {count} asset files");

    println!("cargo:rustc-env=PILOT_BUNDLE_DIR={}", bundle.display());
}
