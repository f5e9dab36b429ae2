//! Validate a hero catalog file (default: data/heroes.yaml).
//! Run: cargo run --bin validate_catalog [path]

use std::path::Path;

use bearhunt::data::loader::read_catalog;
use bearhunt::data::validate::{validate_catalog, ValidationSeverity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let catalog_path = std::env::args()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(|| Path::new(&manifest_dir).join("data").join("heroes.yaml"));

    if !catalog_path.exists() {
        eprintln!("Catalog not found: {}", catalog_path.display());
        std::process::exit(1);
    }

    let catalog = read_catalog(&catalog_path)?;
    let report = validate_catalog(&catalog);

    let mut errors = 0;
    let mut warnings = 0;
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            ValidationSeverity::Error => errors += 1,
            ValidationSeverity::Warning => warnings += 1,
            ValidationSeverity::Info => {}
        }
        eprintln!("{diagnostic}");
    }

    println!(
        "Validated {} heroes, {} errors, {} warnings",
        catalog.len(),
        errors,
        warnings
    );
    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
