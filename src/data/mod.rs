pub mod hero;
pub mod loader;
pub mod validate;

pub use hero::{EffectGroup, Hero, HeroCatalog, Skill};
pub use loader::{load_catalog, load_catalog_from_env, read_catalog, CatalogError};
pub use validate::{validate_catalog, ValidationReport, ValidationSeverity};
