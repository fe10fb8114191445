use tlm_components::ComponentError;
use tlm_system::SystemError;

use crate::validate::ValidationError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown component type '{type_name}' for component '{component}'")]
    UnknownComponentType { type_name: String, component: String },

    #[error("Component '{component}': {source}")]
    Component {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error(transparent)]
    System(#[from] SystemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
