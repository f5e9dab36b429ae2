//! Load the hero catalog from the embedded table or from a YAML/JSON file.
//! Every load is validated; a catalog with error diagnostics is rejected.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::data::hero::{Hero, HeroCatalog};
use crate::data::validate::{validate_catalog, ValidationDiagnostic};

/// Environment variable naming an alternative catalog file.
pub const CATALOG_ENV_VAR: &str = "BEARHUNT_CATALOG";

const BUILTIN_HEROES_YAML: &str = include_str!("../../data/heroes.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse catalog yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to parse catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationDiagnostic>),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    heroes: Vec<Hero>,
}

impl HeroCatalog {
    /// The hero table shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        parse_catalog_yaml(BUILTIN_HEROES_YAML)
    }
}

pub fn parse_catalog_yaml(raw: &str) -> Result<HeroCatalog, CatalogError> {
    let parsed: CatalogFile = serde_yaml::from_str(raw)?;
    checked(HeroCatalog::new(parsed.heroes))
}

pub fn parse_catalog_json(raw: &str) -> Result<HeroCatalog, CatalogError> {
    let parsed: CatalogFile = serde_json::from_str(raw)?;
    checked(HeroCatalog::new(parsed.heroes))
}

/// Load and validate a catalog file; `.json` is read as JSON, anything else as YAML.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<HeroCatalog, CatalogError> {
    checked(read_catalog(path)?)
}

/// Parse a catalog file without validating it.
pub fn read_catalog(path: impl AsRef<Path>) -> Result<HeroCatalog, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let parsed: CatalogFile = if is_json {
        serde_json::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    Ok(HeroCatalog::new(parsed.heroes))
}

/// Path named by `BEARHUNT_CATALOG`, if set and non-blank.
pub fn catalog_path_from_env() -> Option<String> {
    std::env::var(CATALOG_ENV_VAR)
        .ok()
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
}

/// Catalog named by `BEARHUNT_CATALOG`, or the built-in table when unset.
pub fn load_catalog_from_env() -> Result<HeroCatalog, CatalogError> {
    match catalog_path_from_env() {
        Some(path) => {
            log::info!("loading hero catalog from {path}");
            load_catalog(path)
        }
        None => HeroCatalog::builtin(),
    }
}

fn checked(catalog: HeroCatalog) -> Result<HeroCatalog, CatalogError> {
    let report = validate_catalog(&catalog);
    if report.has_errors() {
        return Err(CatalogError::Invalid(report.errors().cloned().collect()));
    }
    for diagnostic in &report.diagnostics {
        log::debug!("catalog: {diagnostic}");
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads_all_twelve_heroes() {
        let catalog = HeroCatalog::builtin().expect("built-in catalog should be valid");
        let names: Vec<&str> = catalog
            .all_heroes()
            .iter()
            .map(|hero| hero.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "Chenko", "Amadeus", "Yeonwoo", "Amane", "Howard", "Quinn", "Gordon", "Fahd",
                "Saul", "Hilde", "Eric", "Jabel"
            ]
        );
        assert_eq!(catalog.effect_group_of("Amane").ok(), catalog.effect_group_of("Amadeus").ok());
        assert_eq!(catalog.skills_of("Jabel").map(<[_]>::len), Ok(4));
    }

    #[test]
    fn json_catalog_is_validated() {
        let raw = r#"{"heroes":[{"name":"Solo","effect_group":1,"skills":[{"name":"Swing","effect":"Attack Up","values":[5,4,3,2,1]}]}]}"#;
        match parse_catalog_json(raw) {
            Err(CatalogError::Invalid(diagnostics)) => {
                assert!(diagnostics.iter().any(|d| d.message.contains("decrease")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            parse_catalog_yaml("heroes: [ {name: "),
            Err(CatalogError::Yaml(_))
        ));
    }
}
