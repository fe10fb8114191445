//! tlm-system: assembling components into a model and simulating it.
//!
//! A [`ComponentSystem`] owns components, the connections between their
//! ports and the nodes those connections induce. `initialize` checks the
//! model, creates dummy nodes for optional unconnected ports, sorts signal
//! components by data flow and groups everything into Signal, C and Q
//! phases. `simulate` then advances fixed steps, logging node values on the
//! planned samples.
//!
//! # Example
//!
//! ```
//! use tlm_components::ComponentRegistry;
//! use tlm_system::{ComponentSystem, SimOptions};
//!
//! let registry = ComponentRegistry::with_builtin();
//! let mut system = ComponentSystem::new("demo");
//! system.add_component(registry.create("SignalConstant", "c").unwrap()).unwrap();
//! system.add_component(registry.create("SignalGain", "gain").unwrap()).unwrap();
//! system.add_component(registry.create("SignalSink", "sink").unwrap()).unwrap();
//! system.set_parameter("c", "y", 2.0).unwrap();
//! system.set_parameter("gain", "k", 3.0).unwrap();
//! system.connect("c", "out", "gain", "in").unwrap();
//! system.connect("gain", "out", "sink", "in").unwrap();
//!
//! let options = SimOptions { stop_time: 0.01, ..SimOptions::default() };
//! let report = system.run(&options).unwrap();
//! assert!(report.is_finished());
//! assert_eq!(report.steps_taken, 10);
//! assert_eq!(system.port_value("gain", "out", "Value").unwrap(), 6.0);
//! ```

pub(crate) mod check;
pub mod error;
pub mod log;
pub mod options;
pub mod schedule;
pub mod system;
pub mod topology;

pub use check::MIN_TIMESTEP;
pub use error::{SystemError, SystemResult};
pub use log::{LogPlan, NodeLog};
pub use options::SimOptions;
pub use schedule::{Schedule, StepGroup};
pub use system::{ComponentSystem, SimOutcome, SimulationReport, SystemState};
pub use topology::{Connection, PortRef};
