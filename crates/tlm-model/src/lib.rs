//! tlm-model: model description files and building systems from them.

use std::path::Path;

pub mod build;
pub mod error;
pub mod schema;
pub mod validate;

pub use build::build_system;
pub use error::{ModelError, ModelResult};
pub use schema::*;
pub use validate::{ValidationError, validate_model};

pub const LATEST_VERSION: u32 = 1;

pub fn load_yaml(path: &Path) -> ModelResult<ModelDef> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn from_yaml_str(content: &str) -> ModelResult<ModelDef> {
    let model: ModelDef = serde_yaml::from_str(content)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_yaml(path: &Path, model: &ModelDef) -> ModelResult<()> {
    validate_model(model)?;
    let content = serde_yaml::to_string(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ModelResult<ModelDef> {
    let content = std::fs::read_to_string(path)?;
    let model: ModelDef = serde_json::from_str(&content)?;
    validate_model(&model)?;
    Ok(model)
}

pub fn save_json(path: &Path, model: &ModelDef) -> ModelResult<()> {
    validate_model(model)?;
    let content = serde_json::to_string_pretty(model)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` is JSON, anything else YAML.
pub fn load_model(path: &Path) -> ModelResult<ModelDef> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
