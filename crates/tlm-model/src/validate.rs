//! Model description validation.
//!
//! Only what can be decided from the description itself is checked here.
//! Unknown types, ports and parameter values are reported when the system
//! is built.

use std::collections::HashSet;

use tlm_system::SimOptions;

use crate::schema::{ComponentDef, ModelDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Malformed endpoint '{endpoint}', expected Component.Port")]
    MalformedEndpoint { endpoint: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    if model.version == 0 || model.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: model.version,
        });
    }

    SimOptions::from(&model.settings)
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: "settings".to_string(),
            value: format!("{:?}", model.settings),
            reason: e.to_string(),
        })?;

    let mut names = HashSet::new();
    for component in &model.components {
        validate_component(component)?;
        if !names.insert(component.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: component.name.clone(),
                context: format!("model '{}' components", model.name),
            });
        }
    }

    for (i, connection) in model.connections.iter().enumerate() {
        for end in [&connection.from, &connection.to] {
            let Some(port) = crate::schema::parse_endpoint(end) else {
                return Err(ValidationError::MalformedEndpoint {
                    endpoint: end.clone(),
                });
            };
            if !names.contains(port.component.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: port.component,
                    context: format!("connection {i}"),
                });
            }
        }
    }
    Ok(())
}

fn validate_component(component: &ComponentDef) -> Result<(), ValidationError> {
    if component.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "component name".to_string(),
            value: format!("'{}'", component.name),
            reason: "must not be empty".to_string(),
        });
    }
    if component.name.contains('#') {
        return Err(ValidationError::InvalidValue {
            field: "component name".to_string(),
            value: component.name.clone(),
            reason: "must not contain '#'".to_string(),
        });
    }
    for (key, value) in &component.start_values {
        let well_formed = key
            .split_once('#')
            .is_some_and(|(port, var)| !port.is_empty() && !var.is_empty());
        if !well_formed {
            return Err(ValidationError::InvalidValue {
                field: format!("component '{}' start value key", component.name),
                value: key.clone(),
                reason: "expected Port#Variable".to_string(),
            });
        }
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("component '{}' {}", component.name, key),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}
