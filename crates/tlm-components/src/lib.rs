//! tlm-components: the component contract and the built-in library.
//!
//! A component declares its ports and parameters once in `configure`,
//! resolves slot handles in `initialize`, and then reads and writes node
//! slots through those handles every step. Everything the framework needs
//! to know about an instance (name, ports, parameters, lifecycle state,
//! pending messages) lives in [`ComponentInstance`], next to the boxed
//! model.
//!
//! # Example
//!
//! ```
//! use tlm_components::ComponentRegistry;
//!
//! let registry = ComponentRegistry::with_builtin();
//! let mut gain = registry.create("SignalGain", "g").unwrap();
//! gain.set_parameter("k", 2.5).unwrap();
//! assert!(gain.port("in").is_some());
//! assert!(gain.set_parameter("no_such", 1.0).is_err());
//! ```

pub mod component;
pub mod context;
pub mod declare;
pub mod error;
pub mod library;
pub mod parameter;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use component::{Component, ComponentInstance, CqsType, LifecycleState, StepOutcome};
pub use context::{FinalizeContext, InitContext, StepContext};
pub use declare::Declarations;
pub use error::{ComponentError, ComponentResult};
pub use parameter::{ParamKind, ParamValue, Parameter};
pub use registry::{ComponentRegistry, CreatorFn};
