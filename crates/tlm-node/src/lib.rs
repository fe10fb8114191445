//! tlm-node: node and port layer of the TLM simulator.
//!
//! Provides:
//! - Node type descriptors with fixed slot layouts, and a registry of them
//! - Nodes with lock-free slot cells, stored in an arena owned by a system
//! - Slot handles (`Slot`, `ReadSlot`) resolved once and used in the hot loop
//! - Port declarations, bindings and the read/write/multiport access contract
//!
//! # Example
//!
//! ```
//! use tlm_node::{hydraulic, NodeArena, NodeTypeRegistry, NODE_HYDRAULIC};
//!
//! let registry = NodeTypeRegistry::with_builtin();
//! let mut arena = NodeArena::new();
//! let id = arena.push(registry.create_node(NODE_HYDRAULIC).unwrap()).unwrap();
//! let p = arena.slot(id, hydraulic::PRESSURE).unwrap();
//!
//! assert_eq!(arena.read(p), 1e5);
//! arena.write(p, 2e5);
//! assert_eq!(arena.read(p), 2e5);
//! ```

pub mod error;
pub mod node;
pub mod node_type;
pub mod port;

pub use error::{NodeError, NodeResult, PortError, PortIndexError, PortResult};
pub use node::{Node, NodeArena, ReadSlot, Slot, SlotCell};
pub use node_type::{
    NODE_ELECTRIC, NODE_HYDRAULIC, NODE_MECHANIC, NODE_MECHANIC_ROTATIONAL, NODE_PNEUMATIC,
    NODE_SIGNAL, NodeType, NodeTypeRegistry, NodeVariable, VariableKind, electric, hydraulic,
    mechanic, mechanic_rotational, pneumatic, signal,
};
pub use port::{Port, PortBinding, PortKind, PortSpec, Requirement};
