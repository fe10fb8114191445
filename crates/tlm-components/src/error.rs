//! Error types for component declaration, parameters and initialization.

use thiserror::Error;
use tlm_core::TlmError;
use tlm_node::{NodeError, PortError};
use tlm_numerics::NumericsError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Name '{name}' is already used by a port or parameter")]
    DuplicateName { name: String },

    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameterValue {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("Unknown port '{port}'")]
    UnknownPort { port: String },

    #[error("Port '{port}' has no variable '{variable}'")]
    UnknownVariable { port: String, variable: String },

    #[error("Parameters cannot be changed while the component is initialized")]
    Locked,

    #[error("Initialization failed: {what}")]
    Init { what: String },

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Numerics(#[from] NumericsError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub fn init(what: impl Into<String>) -> Self {
        ComponentError::Init { what: what.into() }
    }
}

impl From<ComponentError> for TlmError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::Node(e) => e.into(),
            other => TlmError::Invariant {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_parameter() {
        let err = ComponentError::InvalidParameterValue {
            name: "k".into(),
            value: "abc".into(),
            reason: "expected a real number",
        };
        let msg = err.to_string();
        assert!(msg.contains("'k'"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn numerics_error_converts() {
        let err: ComponentError = NumericsError::EmptyTable.into();
        assert!(matches!(err, ComponentError::Numerics(_)));
        let core: TlmError = err.into();
        assert!(matches!(core, TlmError::Invariant { .. }));
    }
}
