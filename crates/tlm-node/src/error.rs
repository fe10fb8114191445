//! Node and port error types.

use thiserror::Error;
use tlm_core::{NodeId, TlmError};

pub type NodeResult<T> = Result<T, NodeError>;
pub type PortResult<T> = Result<T, PortError>;

/// Node construction and access errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Unknown node type: {type_name}")]
    UnknownNodeType { type_name: String },

    #[error("Node type already registered: {type_name}")]
    DuplicateNodeType { type_name: String },

    #[error("Slot offset {offset} out of range for {type_name} ({len} slots)")]
    SlotOutOfRange {
        type_name: String,
        offset: usize,
        len: usize,
    },

    #[error("Node {node} does not exist")]
    InvalidNode { node: NodeId },

    #[error(transparent)]
    Core(#[from] TlmError),
}

/// Sub-port index outside `[0, num_ports)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Port index {index} out of range for multiport '{port}' with {len} sub-ports")]
pub struct PortIndexError {
    pub port: String,
    pub index: usize,
    pub len: usize,
}

/// Port access errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortError {
    #[error(transparent)]
    Index(#[from] PortIndexError),

    #[error("Port '{port}' is read-only")]
    ReadOnly { port: String },

    #[error("Port '{port}' is not connected")]
    NotConnected { port: String },

    #[error("Port '{port}' is a multiport, address one of its sub-ports")]
    IsMultiPort { port: String },

    #[error("Port '{port}' is not a multiport")]
    NotMultiPort { port: String },

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl From<NodeError> for TlmError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::Core(e) => e,
            other => TlmError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
