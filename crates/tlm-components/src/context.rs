//! Views a component gets of the system during initialize, step and finalize.

use tlm_core::{Message, Real, Severity};
use tlm_node::{NodeArena, Port, ReadSlot, Slot};

use crate::error::{ComponentError, ComponentResult};
use crate::parameter::{ParamValue, Parameter};

/// Initialize-time access: port resolution, parameters, node values.
pub struct InitContext<'a> {
    name: &'a str,
    nodes: &'a NodeArena,
    ports: &'a [Port],
    parameters: &'a [Parameter],
    time: Real,
    timestep: Real,
    messages: &'a mut Vec<Message>,
}

impl<'a> InitContext<'a> {
    pub fn new(
        name: &'a str,
        nodes: &'a NodeArena,
        ports: &'a [Port],
        parameters: &'a [Parameter],
        time: Real,
        timestep: Real,
        messages: &'a mut Vec<Message>,
    ) -> Self {
        Self {
            name,
            nodes,
            ports,
            parameters,
            time,
            timestep,
            messages,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn timestep(&self) -> Real {
        self.timestep
    }

    pub fn port(&self, name: &str) -> ComponentResult<&'a Port> {
        self.ports
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ComponentError::UnknownPort {
                port: name.to_string(),
            })
    }

    pub fn slot(&self, port: &str, offset: usize) -> ComponentResult<Slot> {
        Ok(self.port(port)?.slot(self.nodes, offset)?)
    }

    pub fn read_slot(&self, port: &str, offset: usize) -> ComponentResult<ReadSlot> {
        Ok(self.port(port)?.read_slot(self.nodes, offset)?)
    }

    pub fn num_ports(&self, port: &str) -> ComponentResult<usize> {
        let p = self.port(port)?;
        Ok(if p.kind().is_multi() { p.num_ports() } else { 1 })
    }

    /// Write handles to `offset` of every sub-port, in connection order.
    pub fn multi_slots(&self, port: &str, offset: usize) -> ComponentResult<Vec<Slot>> {
        let p = self.port(port)?;
        (0..p.num_ports())
            .map(|i| Ok(p.multi_slot(self.nodes, i, offset)?))
            .collect()
    }

    pub fn multi_read_slots(&self, port: &str, offset: usize) -> ComponentResult<Vec<ReadSlot>> {
        let p = self.port(port)?;
        (0..p.num_ports())
            .map(|i| Ok(p.multi_read_slot(self.nodes, i, offset)?))
            .collect()
    }

    #[inline]
    pub fn read(&self, slot: impl Into<ReadSlot>) -> Real {
        self.nodes.read(slot)
    }

    #[inline]
    pub fn write(&self, slot: Slot, value: Real) {
        self.nodes.write(slot, value);
    }

    pub fn parameter(&self, name: &str) -> ComponentResult<&ParamValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(Parameter::value)
            .ok_or_else(|| ComponentError::UnknownParameter {
                name: name.to_string(),
            })
    }

    pub fn real(&self, name: &str) -> ComponentResult<Real> {
        match self.parameter(name)? {
            ParamValue::Real(v) => Ok(*v),
            ParamValue::Integer(i) => Ok(*i as Real),
            other => Err(wrong_type(name, other, "expected a real number")),
        }
    }

    pub fn integer(&self, name: &str) -> ComponentResult<i64> {
        match self.parameter(name)? {
            ParamValue::Integer(i) => Ok(*i),
            other => Err(wrong_type(name, other, "expected an integer")),
        }
    }

    /// Non-negative integer parameter, e.g. a column or line count.
    pub fn index(&self, name: &str) -> ComponentResult<usize> {
        let i = self.integer(name)?;
        usize::try_from(i).map_err(|_| ComponentError::InvalidParameterValue {
            name: name.to_string(),
            value: i.to_string(),
            reason: "must not be negative",
        })
    }

    pub fn boolean(&self, name: &str) -> ComponentResult<bool> {
        match self.parameter(name)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(wrong_type(name, other, "expected true or false")),
        }
    }

    pub fn text(&self, name: &str) -> ComponentResult<&str> {
        match self.parameter(name)? {
            ParamValue::Text(s) => Ok(s.as_str()),
            other => Err(wrong_type(name, other, "expected text")),
        }
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.messages
            .push(Message::new(Severity::Warning, self.name, text));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.messages.push(Message::new(Severity::Info, self.name, text));
    }

    /// Step view for the zeroth evaluation at the end of initialize.
    pub fn step_context(&mut self) -> StepContext<'_> {
        StepContext {
            name: self.name,
            nodes: self.nodes,
            time: self.time,
            timestep: self.timestep,
            messages: &mut *self.messages,
        }
    }
}

fn wrong_type(name: &str, value: &ParamValue, reason: &'static str) -> ComponentError {
    ComponentError::InvalidParameterValue {
        name: name.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// Hot-path access during one step.
pub struct StepContext<'a> {
    name: &'a str,
    nodes: &'a NodeArena,
    time: Real,
    timestep: Real,
    messages: &'a mut Vec<Message>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        name: &'a str,
        nodes: &'a NodeArena,
        time: Real,
        timestep: Real,
        messages: &'a mut Vec<Message>,
    ) -> Self {
        Self {
            name,
            nodes,
            time,
            timestep,
            messages,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Time at the end of the step being computed.
    #[inline]
    pub fn time(&self) -> Real {
        self.time
    }

    #[inline]
    pub fn timestep(&self) -> Real {
        self.timestep
    }

    #[inline]
    pub fn read(&self, slot: impl Into<ReadSlot>) -> Real {
        self.nodes.read(slot)
    }

    #[inline]
    pub fn write(&self, slot: Slot, value: Real) {
        self.nodes.write(slot, value);
    }

    /// Sum of one slot over a set of sub-ports.
    #[inline]
    pub fn sum(&self, slots: &[ReadSlot]) -> Real {
        slots.iter().map(|s| self.nodes.read(*s)).sum()
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.messages
            .push(Message::new(Severity::Warning, self.name, text));
    }
}

/// End-of-run access; nodes are no longer exposed.
pub struct FinalizeContext<'a> {
    name: &'a str,
    time: Real,
    messages: &'a mut Vec<Message>,
}

impl<'a> FinalizeContext<'a> {
    pub fn new(name: &'a str, time: Real, messages: &'a mut Vec<Message>) -> Self {
        Self {
            name,
            time,
            messages,
        }
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.messages.push(Message::new(Severity::Info, self.name, text));
    }
}
