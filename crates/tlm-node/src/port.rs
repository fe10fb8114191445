//! Port declarations and their bindings to nodes.
//!
//! A port is declared by a component during configure and bound to nodes by
//! the owning system when connections are made. Single ports bind to one
//! node; multiports bind to one node per connection, in insertion order.

use std::sync::Arc;

use tlm_core::{NodeId, Real};

use crate::error::{PortError, PortIndexError, PortResult};
use crate::node::{NodeArena, ReadSlot, Slot};
use crate::node_type::NodeType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    Power,
    Read,
    Write,
    PowerMulti,
    ReadMulti,
}

impl PortKind {
    pub fn is_multi(self) -> bool {
        matches!(self, PortKind::PowerMulti | PortKind::ReadMulti)
    }

    pub fn is_power(self) -> bool {
        matches!(self, PortKind::Power | PortKind::PowerMulti)
    }

    pub fn is_read(self) -> bool {
        matches!(self, PortKind::Read | PortKind::ReadMulti)
    }

    pub fn can_write(self) -> bool {
        !self.is_read()
    }

    /// Single-port kind used for each sub-port of a multiport.
    pub fn sub_kind(self) -> PortKind {
        match self {
            PortKind::PowerMulti => PortKind::Power,
            PortKind::ReadMulti => PortKind::Read,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    Required,
    NotRequired,
}

/// Everything declared about a port.
#[derive(Clone, Debug)]
pub struct PortSpec {
    pub name: String,
    pub node_type: Arc<NodeType>,
    pub description: String,
    pub unit: String,
    pub kind: PortKind,
    pub requirement: Requirement,
    /// Per-slot start values, loaded into the bound node before initialize.
    /// For an unconnected optional port they are the dummy node's defaults.
    pub start_values: Vec<Option<Real>>,
}

impl PortSpec {
    pub fn new(
        name: impl Into<String>,
        node_type: Arc<NodeType>,
        kind: PortKind,
        requirement: Requirement,
    ) -> Self {
        let start_values = vec![None; node_type.len()];
        Self {
            name: name.into(),
            node_type,
            description: String::new(),
            unit: String::new(),
            kind,
            requirement,
            start_values,
        }
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }

    /// Start value if set, else the node type default.
    pub fn start_or_default(&self, offset: usize) -> Option<Real> {
        match self.start_values.get(offset) {
            Some(Some(v)) => Some(*v),
            Some(None) => self.node_type.default_value(offset),
            None => None,
        }
    }
}

/// Where a port currently points.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PortBinding {
    #[default]
    Unbound,
    Single(NodeId),
    Multi(Vec<NodeId>),
}

/// A declared port plus its binding.
#[derive(Clone, Debug)]
pub struct Port {
    spec: PortSpec,
    binding: PortBinding,
}

impl Port {
    pub fn new(spec: PortSpec) -> Self {
        let binding = if spec.kind.is_multi() {
            PortBinding::Multi(Vec::new())
        } else {
            PortBinding::Unbound
        };
        Self { spec, binding }
    }

    pub fn spec(&self) -> &PortSpec {
        &self.spec
    }

    pub fn spec_mut(&mut self) -> &mut PortSpec {
        &mut self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> PortKind {
        self.spec.kind
    }

    pub fn binding(&self) -> &PortBinding {
        &self.binding
    }

    pub fn bind(&mut self, binding: PortBinding) {
        self.binding = binding;
    }

    /// Drop the binding (multiports keep an empty sub-port list).
    pub fn unbind(&mut self) {
        self.binding = if self.spec.kind.is_multi() {
            PortBinding::Multi(Vec::new())
        } else {
            PortBinding::Unbound
        };
    }

    pub fn is_connected(&self) -> bool {
        match &self.binding {
            PortBinding::Unbound => false,
            PortBinding::Single(_) => true,
            PortBinding::Multi(v) => !v.is_empty(),
        }
    }

    /// Number of sub-ports for a multiport, 1 for a single port.
    pub fn num_ports(&self) -> usize {
        match &self.binding {
            PortBinding::Multi(v) => v.len(),
            _ => 1,
        }
    }

    /// Every node this port touches, sub-ports in insertion order.
    pub fn nodes(&self) -> Vec<NodeId> {
        match &self.binding {
            PortBinding::Unbound => Vec::new(),
            PortBinding::Single(id) => vec![*id],
            PortBinding::Multi(v) => v.clone(),
        }
    }

    fn single_node(&self) -> PortResult<Option<NodeId>> {
        match &self.binding {
            PortBinding::Unbound => Ok(None),
            PortBinding::Single(id) => Ok(Some(*id)),
            PortBinding::Multi(_) => Err(PortError::IsMultiPort {
                port: self.spec.name.clone(),
            }),
        }
    }

    fn sub_node(&self, index: usize) -> PortResult<NodeId> {
        match &self.binding {
            PortBinding::Multi(v) => v.get(index).copied().ok_or_else(|| {
                PortError::Index(PortIndexError {
                    port: self.spec.name.clone(),
                    index,
                    len: v.len(),
                })
            }),
            _ => Err(PortError::NotMultiPort {
                port: self.spec.name.clone(),
            }),
        }
    }

    /// Current value of a slot of the bound node.
    ///
    /// An unconnected optional port reports its declared default instead
    /// of failing.
    pub fn read_node(&self, nodes: &NodeArena, offset: usize) -> PortResult<Real> {
        self.spec.node_type.check_offset(offset)?;
        match self.single_node()? {
            Some(id) => Ok(nodes.read(nodes.read_slot(id, offset)?)),
            None if !self.spec.is_required() => {
                Ok(self.spec.start_or_default(offset).unwrap_or(0.0))
            }
            None => Err(PortError::NotConnected {
                port: self.spec.name.clone(),
            }),
        }
    }

    /// Write a slot of the bound node. Read ports refuse.
    pub fn write_node(&self, nodes: &NodeArena, offset: usize, value: Real) -> PortResult<()> {
        let slot = self.slot(nodes, offset)?;
        nodes.write(slot, value);
        Ok(())
    }

    /// Read-write handle for hot-path access.
    pub fn slot(&self, nodes: &NodeArena, offset: usize) -> PortResult<Slot> {
        if !self.spec.kind.can_write() {
            return Err(PortError::ReadOnly {
                port: self.spec.name.clone(),
            });
        }
        let id = self.single_node()?.ok_or_else(|| PortError::NotConnected {
            port: self.spec.name.clone(),
        })?;
        Ok(nodes.slot(id, offset)?)
    }

    /// Read-only handle for hot-path access.
    pub fn read_slot(&self, nodes: &NodeArena, offset: usize) -> PortResult<ReadSlot> {
        let id = self.single_node()?.ok_or_else(|| PortError::NotConnected {
            port: self.spec.name.clone(),
        })?;
        Ok(nodes.read_slot(id, offset)?)
    }

    /// Read-write handle to a slot of sub-port `index`.
    pub fn multi_slot(&self, nodes: &NodeArena, index: usize, offset: usize) -> PortResult<Slot> {
        if !self.spec.kind.can_write() {
            return Err(PortError::ReadOnly {
                port: self.spec.name.clone(),
            });
        }
        Ok(nodes.slot(self.sub_node(index)?, offset)?)
    }

    /// Read-only handle to a slot of sub-port `index`.
    pub fn multi_read_slot(
        &self,
        nodes: &NodeArena,
        index: usize,
        offset: usize,
    ) -> PortResult<ReadSlot> {
        Ok(nodes.read_slot(self.sub_node(index)?, offset)?)
    }
}
