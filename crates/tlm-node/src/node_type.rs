//! Node type descriptors and the registry that owns them.
//!
//! A node type fixes the slot layout of every node created from it. Offsets
//! are positions in the variable list and are exposed as constants in the
//! per-domain modules below so component code never looks them up by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{NodeError, NodeResult};
use crate::node::Node;

pub const NODE_SIGNAL: &str = "NodeSignal";
pub const NODE_HYDRAULIC: &str = "NodeHydraulic";
pub const NODE_PNEUMATIC: &str = "NodePneumatic";
pub const NODE_MECHANIC: &str = "NodeMechanic";
pub const NODE_MECHANIC_ROTATIONAL: &str = "NodeMechanicRotational";
pub const NODE_ELECTRIC: &str = "NodeElectric";

pub mod signal {
    pub const VALUE: usize = 0;
}

pub mod hydraulic {
    pub const FLOW: usize = 0;
    pub const PRESSURE: usize = 1;
    pub const TEMPERATURE: usize = 2;
    pub const WAVE_VARIABLE: usize = 3;
    pub const CHAR_IMPEDANCE: usize = 4;
    pub const HEAT_FLOW: usize = 5;
}

pub mod pneumatic {
    pub const ENERGY_FLOW: usize = 0;
    pub const PRESSURE: usize = 1;
    pub const WAVE_VARIABLE: usize = 2;
    pub const CHAR_IMPEDANCE: usize = 3;
    pub const MASS_FLOW: usize = 4;
    pub const DENSITY: usize = 5;
    pub const DENSITY_WAVE_VARIABLE: usize = 6;
    pub const DENSITY_CHAR_IMPEDANCE: usize = 7;
    pub const TEMPERATURE: usize = 8;
}

pub mod mechanic {
    pub const VELOCITY: usize = 0;
    pub const FORCE: usize = 1;
    pub const POSITION: usize = 2;
    pub const WAVE_VARIABLE: usize = 3;
    pub const CHAR_IMPEDANCE: usize = 4;
    pub const EQUIVALENT_MASS: usize = 5;
}

pub mod mechanic_rotational {
    pub const ANGULAR_VELOCITY: usize = 0;
    pub const TORQUE: usize = 1;
    pub const ANGLE: usize = 2;
    pub const WAVE_VARIABLE: usize = 3;
    pub const CHAR_IMPEDANCE: usize = 4;
    pub const EQUIVALENT_INERTIA: usize = 5;
}

pub mod electric {
    pub const VOLTAGE: usize = 0;
    pub const CURRENT: usize = 1;
    pub const WAVE_VARIABLE: usize = 2;
    pub const CHAR_IMPEDANCE: usize = 3;
}

/// Role of a node variable, used by loggers and start value handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Flow,
    Intensity,
    Tlm,
    Default,
    Hidden,
}

/// One named slot of a node type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVariable {
    pub name: String,
    pub short_name: String,
    pub unit: String,
    pub kind: VariableKind,
    pub default: f64,
}

/// Immutable description of a node type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeType {
    name: String,
    nice_name: String,
    variables: Vec<NodeVariable>,
    intensity: Option<usize>,
    wave: Option<usize>,
}

impl NodeType {
    pub fn new(name: impl Into<String>, nice_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nice_name: nice_name.into(),
            variables: Vec::new(),
            intensity: None,
            wave: None,
        }
    }

    /// Append a variable; its offset is the current number of variables.
    pub fn with_variable(
        mut self,
        name: &str,
        short_name: &str,
        unit: &str,
        kind: VariableKind,
        default: f64,
    ) -> Self {
        self.variables.push(NodeVariable {
            name: name.to_string(),
            short_name: short_name.to_string(),
            unit: unit.to_string(),
            kind,
            default,
        });
        self
    }

    /// Declare which slot carries the effort and which the wave variable.
    ///
    /// An intensity start value is copied into the wave slot when the wave
    /// slot has no start value of its own.
    pub fn with_wave_pair(mut self, intensity: usize, wave: usize) -> Self {
        self.intensity = Some(intensity);
        self.wave = Some(wave);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nice_name(&self) -> &str {
        &self.nice_name
    }

    pub fn variables(&self) -> &[NodeVariable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Offset of a variable by full or short name.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name || v.short_name == name)
    }

    pub fn default_value(&self, offset: usize) -> Option<f64> {
        self.variables.get(offset).map(|v| v.default)
    }

    pub fn intensity_offset(&self) -> Option<usize> {
        self.intensity
    }

    pub fn wave_offset(&self) -> Option<usize> {
        self.wave
    }

    /// True for types that take part in TLM power exchange.
    pub fn is_power(&self) -> bool {
        self.wave.is_some()
    }

    pub fn check_offset(&self, offset: usize) -> NodeResult<()> {
        if offset < self.variables.len() {
            Ok(())
        } else {
            Err(NodeError::SlotOutOfRange {
                type_name: self.name.clone(),
                offset,
                len: self.variables.len(),
            })
        }
    }
}

/// Registry of node types, keyed by type name.
#[derive(Clone, Debug, Default)]
pub struct NodeTypeRegistry {
    types: BTreeMap<String, Arc<NodeType>>,
}

impl NodeTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in signal and power node types.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        for ty in builtin_types() {
            reg.types.insert(ty.name.clone(), Arc::new(ty));
        }
        reg
    }

    pub fn register(&mut self, ty: NodeType) -> NodeResult<()> {
        if self.types.contains_key(ty.name()) {
            return Err(NodeError::DuplicateNodeType {
                type_name: ty.name,
            });
        }
        self.types.insert(ty.name.clone(), Arc::new(ty));
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> NodeResult<Arc<NodeType>> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| NodeError::UnknownNodeType {
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Create a fresh node holding the type's default values.
    pub fn create_node(&self, type_name: &str) -> NodeResult<Node> {
        Ok(Node::new(self.get(type_name)?))
    }
}

fn builtin_types() -> Vec<NodeType> {
    use VariableKind::*;
    vec![
        NodeType::new(NODE_SIGNAL, "signal").with_variable("Value", "y", "", Default, 0.0),
        NodeType::new(NODE_HYDRAULIC, "hydraulic")
            .with_variable("Flow", "q", "m^3/s", Flow, 0.0)
            .with_variable("Pressure", "p", "Pa", Intensity, 1.0e5)
            .with_variable("Temperature", "T", "K", Hidden, 293.0)
            .with_variable("WaveVariable", "c", "Pa", Tlm, 1.0e5)
            .with_variable("CharImpedance", "Zc", "Pa s/m^3", Tlm, 0.0)
            .with_variable("HeatFlow", "Qdot", "W", Hidden, 0.0)
            .with_wave_pair(hydraulic::PRESSURE, hydraulic::WAVE_VARIABLE),
        NodeType::new(NODE_PNEUMATIC, "pneumatic")
            .with_variable("EnergyFlow", "Qdot", "J/s", Flow, 0.0)
            .with_variable("Pressure", "p", "Pa", Intensity, 1.0e5)
            .with_variable("WaveVariable", "c", "Pa", Tlm, 1.0e5)
            .with_variable("CharImpedance", "Zc", "s/m^3", Tlm, 0.0)
            .with_variable("MassFlow", "mdot", "kg/s", Flow, 0.0)
            .with_variable("Density", "rho", "kg/m^3", Intensity, 1.225)
            .with_variable("DensityWaveVariable", "crho", "kg/m^3", Tlm, 1.225)
            .with_variable("DensityCharImpedance", "Zcrho", "s/m^3", Tlm, 0.0)
            .with_variable("Temperature", "T", "K", Default, 293.0)
            .with_wave_pair(pneumatic::PRESSURE, pneumatic::WAVE_VARIABLE),
        NodeType::new(NODE_MECHANIC, "mechanic")
            .with_variable("Velocity", "v", "m/s", Flow, 0.0)
            .with_variable("Force", "f", "N", Intensity, 0.0)
            .with_variable("Position", "x", "m", Default, 0.0)
            .with_variable("WaveVariable", "c", "N", Tlm, 0.0)
            .with_variable("CharImpedance", "Zc", "N s/m", Tlm, 0.0)
            .with_variable("EquivalentMass", "me", "kg", Default, 1.0)
            .with_wave_pair(mechanic::FORCE, mechanic::WAVE_VARIABLE),
        NodeType::new(NODE_MECHANIC_ROTATIONAL, "mechanicrotational")
            .with_variable("AngularVelocity", "w", "rad/s", Flow, 0.0)
            .with_variable("Torque", "T", "Nm", Intensity, 0.0)
            .with_variable("Angle", "a", "rad", Default, 0.0)
            .with_variable("WaveVariable", "c", "Nm", Tlm, 0.0)
            .with_variable("CharImpedance", "Zc", "Nms/rad", Tlm, 0.0)
            .with_variable("EquivalentInertia", "Je", "kg m^2", Hidden, 0.0)
            .with_wave_pair(
                mechanic_rotational::TORQUE,
                mechanic_rotational::WAVE_VARIABLE,
            ),
        NodeType::new(NODE_ELECTRIC, "electric")
            .with_variable("Voltage", "U", "V", Intensity, 0.0)
            .with_variable("Current", "I", "A", Flow, 0.0)
            .with_variable("WaveVariable", "c", "V", Tlm, 0.0)
            .with_variable("CharImpedance", "Zc", "V/A", Tlm, 0.0)
            .with_wave_pair(electric::VOLTAGE, electric::WAVE_VARIABLE),
    ]
}
