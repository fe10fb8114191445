//! Port and parameter declarations collected during configure.

use tlm_core::Real;
use tlm_node::{NODE_SIGNAL, NodeTypeRegistry, PortKind, PortSpec, Requirement, signal};

use crate::error::{ComponentError, ComponentResult};
use crate::parameter::{ParamKind, ParamValue, Parameter};

/// Collects what a component declares in `configure`.
///
/// Names are unique across ports and parameters.
pub struct Declarations<'a> {
    node_types: &'a NodeTypeRegistry,
    pub(crate) ports: Vec<PortSpec>,
    pub(crate) parameters: Vec<Parameter>,
}

impl<'a> Declarations<'a> {
    pub fn new(node_types: &'a NodeTypeRegistry) -> Self {
        Self {
            node_types,
            ports: Vec::new(),
            parameters: Vec::new(),
        }
    }

    fn check_name(&self, name: &str) -> ComponentResult<()> {
        let taken = self.ports.iter().any(|p| p.name == name)
            || self.parameters.iter().any(|p| p.name == name);
        if taken || name.is_empty() || name.contains('#') || name.contains('.') {
            return Err(ComponentError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn add_port(
        &mut self,
        name: &str,
        node_type: &str,
        kind: PortKind,
        requirement: Requirement,
    ) -> ComponentResult<&mut PortSpec> {
        self.check_name(name)?;
        let ty = self.node_types.get(node_type)?;
        self.ports.push(PortSpec::new(name, ty, kind, requirement));
        let last = self.ports.len() - 1;
        Ok(&mut self.ports[last])
    }

    pub fn add_power_port(
        &mut self,
        name: &str,
        node_type: &str,
        requirement: Requirement,
    ) -> ComponentResult<()> {
        self.add_port(name, node_type, PortKind::Power, requirement)
            .map(drop)
    }

    pub fn add_read_port(
        &mut self,
        name: &str,
        node_type: &str,
        requirement: Requirement,
    ) -> ComponentResult<()> {
        self.add_port(name, node_type, PortKind::Read, requirement)
            .map(drop)
    }

    pub fn add_write_port(
        &mut self,
        name: &str,
        node_type: &str,
        requirement: Requirement,
    ) -> ComponentResult<()> {
        self.add_port(name, node_type, PortKind::Write, requirement)
            .map(drop)
    }

    pub fn add_power_multiport(
        &mut self,
        name: &str,
        node_type: &str,
        requirement: Requirement,
    ) -> ComponentResult<()> {
        self.add_port(name, node_type, PortKind::PowerMulti, requirement)
            .map(drop)
    }

    pub fn add_read_multiport(
        &mut self,
        name: &str,
        node_type: &str,
        requirement: Requirement,
    ) -> ComponentResult<()> {
        self.add_port(name, node_type, PortKind::ReadMulti, requirement)
            .map(drop)
    }

    /// Optional signal input; reads `default` while unconnected.
    pub fn add_input_variable(
        &mut self,
        name: &str,
        description: &str,
        unit: &str,
        default: Real,
    ) -> ComponentResult<()> {
        let spec = self.add_port(name, NODE_SIGNAL, PortKind::Read, Requirement::NotRequired)?;
        spec.description = description.to_string();
        spec.unit = unit.to_string();
        spec.start_values[signal::VALUE] = Some(default);
        Ok(())
    }

    /// Optional signal output.
    pub fn add_output_variable(
        &mut self,
        name: &str,
        description: &str,
        unit: &str,
    ) -> ComponentResult<()> {
        let spec = self.add_port(name, NODE_SIGNAL, PortKind::Write, Requirement::NotRequired)?;
        spec.description = description.to_string();
        spec.unit = unit.to_string();
        Ok(())
    }

    pub fn register_parameter(
        &mut self,
        name: &str,
        description: &str,
        unit: &str,
        default: impl Into<ParamValue>,
    ) -> ComponentResult<()> {
        self.check_name(name)?;
        self.parameters.push(Parameter::new(
            name,
            description,
            unit,
            ParamKind::Parameter,
            default.into(),
        ));
        Ok(())
    }

    pub fn add_constant(
        &mut self,
        name: &str,
        description: &str,
        unit: &str,
        default: impl Into<ParamValue>,
    ) -> ComponentResult<()> {
        self.check_name(name)?;
        self.parameters.push(Parameter::new(
            name,
            description,
            unit,
            ParamKind::Constant,
            default.into(),
        ));
        Ok(())
    }

    /// Start value a port loads into its node unless the user overrides it.
    pub fn set_default_start_value(
        &mut self,
        port: &str,
        offset: usize,
        value: Real,
    ) -> ComponentResult<()> {
        let spec = self
            .ports
            .iter_mut()
            .find(|p| p.name == port)
            .ok_or_else(|| ComponentError::UnknownPort {
                port: port.to_string(),
            })?;
        spec.node_type.check_offset(offset)?;
        spec.start_values[offset] = Some(value);
        Ok(())
    }

    pub fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlm_node::{NODE_HYDRAULIC, hydraulic};

    #[test]
    fn names_are_unique_across_ports_and_parameters() {
        let reg = NodeTypeRegistry::with_builtin();
        let mut d = Declarations::new(&reg);
        d.add_power_port("P1", NODE_HYDRAULIC, Requirement::Required)
            .unwrap();
        d.register_parameter("k", "", "", 1.0).unwrap();
        assert!(matches!(
            d.register_parameter("P1", "", "", 1.0),
            Err(ComponentError::DuplicateName { .. })
        ));
        assert!(matches!(
            d.add_input_variable("k", "", "", 0.0),
            Err(ComponentError::DuplicateName { .. })
        ));
        assert!(d.register_parameter("a#b", "", "", 1.0).is_err());
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let reg = NodeTypeRegistry::with_builtin();
        let mut d = Declarations::new(&reg);
        let err = d
            .add_power_port("P1", "NodeMagnetic", Requirement::Required)
            .unwrap_err();
        assert!(matches!(err, ComponentError::Node(_)));
    }

    #[test]
    fn input_variable_default_is_its_start_value() {
        let reg = NodeTypeRegistry::with_builtin();
        let mut d = Declarations::new(&reg);
        d.add_input_variable("in", "Input", "-", 2.5).unwrap();
        d.add_output_variable("out", "Output", "-").unwrap();
        assert_eq!(d.ports()[0].start_values[signal::VALUE], Some(2.5));
        assert_eq!(d.ports()[0].kind, PortKind::Read);
        assert!(!d.ports()[1].is_required());
    }

    #[test]
    fn default_start_value_checks_offset() {
        let reg = NodeTypeRegistry::with_builtin();
        let mut d = Declarations::new(&reg);
        d.add_power_port("P1", NODE_HYDRAULIC, Requirement::Required)
            .unwrap();
        d.set_default_start_value("P1", hydraulic::PRESSURE, 2e5)
            .unwrap();
        assert_eq!(d.ports()[0].start_values[hydraulic::PRESSURE], Some(2e5));
        assert!(d.set_default_start_value("P1", 42, 0.0).is_err());
        assert!(d.set_default_start_value("P9", 0, 0.0).is_err());
    }
}
