//! Error types for model assembly and simulation.

use thiserror::Error;
use tlm_components::ComponentError;
use tlm_node::{NodeError, PortError};

use crate::system::SystemState;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Component '{name}' does not exist")]
    UnknownComponent { name: String },

    #[error("Component '{component}' has no port named '{port}'")]
    UnknownPort { component: String, port: String },

    #[error("Port '{component}.{port}' has no variable named '{variable}'")]
    UnknownVariable {
        component: String,
        port: String,
        variable: String,
    },

    #[error("A port can not be connected to itself: {port}")]
    SelfConnection { port: String },

    #[error("Node type mismatch: {from} is {from_type} but {to} is {to_type}")]
    NodeTypeMismatch {
        from: String,
        from_type: String,
        to: String,
        to_type: String,
    },

    #[error("Two multiports can not be connected to each other: {from} and {to}")]
    MultiPortPair { from: String, to: String },

    #[error("A read port can not be connected to a multiport: {from} and {to}")]
    ReadPortToMultiPort { from: String, to: String },

    #[error("{from} is already connected to {to}")]
    AlreadyConnected { from: String, to: String },

    #[error("{from} is not connected to {to}")]
    NotConnected { from: String, to: String },

    #[error("The model can only be edited while assembling (state: {state})")]
    NotAssembling { state: SystemState },

    #[error("Initialization failed: {reason}")]
    InitializationFailed { reason: String },

    #[error("Simulation requires an initialized system (state: {state})")]
    NotInitialized { state: SystemState },

    #[error("The simulation was stopped; finalize the system before running it again")]
    Halted,

    #[error("Start time {requested} does not match the current time {current}")]
    StartTimeMismatch { requested: f64, current: f64 },

    #[error("Multiport '{component}.{port}' has no sub-port {index}")]
    NoSuchSubPort {
        component: String,
        port: String,
        index: usize,
    },

    #[error("Nothing has been logged for '{component}.{port}'")]
    NotLogged { component: String, port: String },

    #[error("Invalid option: {what}")]
    InvalidOption { what: String },

    #[error("Could not build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Node(#[from] NodeError),
}

pub type SystemResult<T> = Result<T, SystemError>;
