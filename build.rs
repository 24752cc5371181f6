//! Build script: validate config/branding.yaml and emit branding.rs

#[path = "build/brandgen/mod.rs"]
mod brandgen;

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=config/branding.yaml");
    println!("cargo:rerun-if-changed=build/brandgen");

    let source = fs::read_to_string("config/branding.yaml")
        .unwrap_or_else(|e| panic!("Failed to read config/branding.yaml: {}", e));

    let spec = brandgen::BrandingSpec::from_yaml(&source).unwrap_or_else(|e| panic!("{}", e));

    let validation = spec.validate();
    for warning in &validation.warnings {
        println!("cargo:warning=branding.yaml: {}", warning);
    }
    if !validation.is_valid {
        panic!("branding.yaml failed validation:\n  {}", validation.errors.join("\n  "));
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("branding.rs"), brandgen::emitter::emit_rust(&spec))
        .unwrap_or_else(|e| panic!("Failed to write branding.rs: {}", e));
}
