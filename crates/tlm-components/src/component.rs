//! The component contract and the framework-owned state around it.

use std::sync::Arc;

use tlm_core::{Message, Real};
use tlm_node::{NODE_SIGNAL, NodeArena, NodeTypeRegistry, Port, PortKind, signal};

use crate::context::{FinalizeContext, InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};
use crate::parameter::{ParamValue, Parameter};

/// Role of a component in the TLM step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CqsType {
    /// Pure signal processing, stepped first.
    Signal,
    /// Writes wave variables and characteristic impedances.
    C,
    /// Reads wave variables, writes flows and efforts.
    Q,
}

impl core::fmt::Display for CqsType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            CqsType::Signal => "S",
            CqsType::C => "C",
            CqsType::Q => "Q",
        })
    }
}

/// What a component asks of the scheduler after a step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum StepOutcome {
    Continue,
    /// Finish the current sweep, then halt with this reason.
    Stop(String),
}

impl StepOutcome {
    pub fn not_initialized() -> Self {
        StepOutcome::Stop("component was stepped before it was initialized".to_string())
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, StepOutcome::Stop(_))
    }

    /// For the evaluation made during initialize, where a stop is an error.
    pub fn into_init(self) -> ComponentResult<()> {
        match self {
            StepOutcome::Continue => Ok(()),
            StepOutcome::Stop(reason) => Err(ComponentError::init(reason)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Configured,
    Initialized,
    Stepping,
    Finalized,
}

/// A simulation unit: one equation set over its ports' node variables.
///
/// Implementations keep their resolved slot handles and numerical state;
/// names, ports, parameters and messages live in [`ComponentCore`].
pub trait Component: Send {
    fn cqs_type(&self) -> CqsType;

    /// Declare ports, parameters and constants. Touches no nodes.
    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()>;

    /// Resolve slots, read parameters and seed every piece of state.
    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()>;

    /// Advance one step. Must not allocate in the steady state.
    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome;

    fn finalize(&mut self, _ctx: &mut FinalizeContext<'_>) {}

    /// True if this component's output does not depend on its input within a step.
    fn breaks_algebraic_loops(&self) -> bool {
        false
    }
}

/// Framework-owned part of a component.
#[derive(Debug)]
pub struct ComponentCore {
    name: String,
    type_name: String,
    cqs: CqsType,
    ports: Vec<Port>,
    parameters: Vec<Parameter>,
    /// User assignments in the order they were made, replayed on reconfigure.
    overrides: Vec<(String, ParamValue)>,
    state: LifecycleState,
    time: Real,
    timestep: Real,
    pending: Vec<Message>,
}

impl ComponentCore {
    fn is_locked(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Initialized | LifecycleState::Stepping
        )
    }

    fn apply(&mut self, name: &str, value: ParamValue) -> ComponentResult<()> {
        if let Some((port, variable)) = name.split_once('#') {
            let p = self
                .ports
                .iter_mut()
                .find(|p| p.name() == port)
                .ok_or_else(|| ComponentError::UnknownPort {
                    port: port.to_string(),
                })?;
            let offset = p.spec().node_type.offset_of(variable).ok_or_else(|| {
                ComponentError::UnknownVariable {
                    port: port.to_string(),
                    variable: variable.to_string(),
                }
            })?;
            let v = start_value(name, &value)?;
            p.spec_mut().start_values[offset] = Some(v);
            return Ok(());
        }
        if let Some(param) = self.parameters.iter_mut().find(|p| p.name == name) {
            return param.assign(value);
        }
        if let Some(p) = self
            .ports
            .iter_mut()
            .find(|p| p.name() == name && is_input_variable(p))
        {
            let v = start_value(name, &value)?;
            p.spec_mut().start_values[signal::VALUE] = Some(v);
            return Ok(());
        }
        Err(ComponentError::UnknownParameter {
            name: name.to_string(),
        })
    }
}

fn start_value(name: &str, value: &ParamValue) -> ComponentResult<Real> {
    value
        .as_real()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ComponentError::InvalidParameterValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "start values must be finite real numbers",
        })
}

fn is_input_variable(port: &Port) -> bool {
    port.kind() == PortKind::Read
        && !port.spec().is_required()
        && port.spec().node_type.name() == NODE_SIGNAL
}

fn declare(
    model: &mut dyn Component,
    node_types: &NodeTypeRegistry,
) -> ComponentResult<(Vec<Port>, Vec<Parameter>)> {
    let mut decl = Declarations::new(node_types);
    model.configure(&mut decl)?;
    Ok((
        decl.ports.into_iter().map(Port::new).collect(),
        decl.parameters,
    ))
}

/// A configured component: its behaviour plus the framework state around it.
pub struct ComponentInstance {
    core: ComponentCore,
    node_types: Arc<NodeTypeRegistry>,
    model: Box<dyn Component>,
}

impl core::fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl ComponentInstance {
    /// Wrap `model` and run its `configure`.
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        mut model: Box<dyn Component>,
        node_types: Arc<NodeTypeRegistry>,
    ) -> ComponentResult<Self> {
        let (ports, parameters) = declare(model.as_mut(), &node_types)?;
        let core = ComponentCore {
            name: name.into(),
            type_name: type_name.into(),
            cqs: model.cqs_type(),
            ports,
            parameters,
            overrides: Vec::new(),
            state: LifecycleState::Configured,
            time: 0.0,
            timestep: 0.0,
            pending: Vec::new(),
        };
        Ok(Self {
            core,
            node_types,
            model,
        })
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.core.name = name.into();
    }

    pub fn type_name(&self) -> &str {
        &self.core.type_name
    }

    pub fn cqs_type(&self) -> CqsType {
        self.core.cqs
    }

    pub fn state(&self) -> LifecycleState {
        self.core.state
    }

    pub fn time(&self) -> Real {
        self.core.time
    }

    pub fn timestep(&self) -> Real {
        self.core.timestep
    }

    pub fn breaks_algebraic_loops(&self) -> bool {
        self.model.breaks_algebraic_loops()
    }

    pub fn ports(&self) -> &[Port] {
        &self.core.ports
    }

    pub fn ports_mut(&mut self) -> &mut [Port] {
        &mut self.core.ports
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.core.ports.iter().find(|p| p.name() == name)
    }

    pub fn port_mut(&mut self, name: &str) -> Option<&mut Port> {
        self.core.ports.iter_mut().find(|p| p.name() == name)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.core.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.core.parameters.iter().find(|p| p.name == name)
    }

    /// Assign a parameter, a `Port#Variable` start value, or the
    /// unconnected value of an input variable.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<ParamValue>) -> ComponentResult<()> {
        if self.core.is_locked() {
            return Err(ComponentError::Locked);
        }
        let value = value.into();
        self.core.apply(name, value.clone())?;
        match self.core.overrides.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.core.overrides.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Start value the port will load into its node, if one is set.
    pub fn start_value(&self, port: &str, variable: &str) -> Option<Real> {
        let p = self.port(port)?;
        let offset = p.spec().node_type.offset_of(variable)?;
        p.spec().start_values[offset]
    }

    /// Discard the declarations, configure again and replay the user's
    /// assignments that still apply. Port bindings are dropped.
    pub fn reconfigure(&mut self) -> ComponentResult<()> {
        if self.core.is_locked() {
            return Err(ComponentError::Locked);
        }
        let (ports, parameters) = declare(self.model.as_mut(), &self.node_types)?;
        self.core.ports = ports;
        self.core.parameters = parameters;
        self.core.cqs = self.model.cqs_type();
        let overrides = std::mem::take(&mut self.core.overrides);
        for (name, value) in overrides {
            match self.core.apply(&name, value.clone()) {
                Ok(()) => self.core.overrides.push((name, value)),
                Err(e) => tracing::debug!(
                    component = %self.core.name,
                    parameter = %name,
                    "dropping assignment after reconfigure: {e}"
                ),
            }
        }
        self.core.state = LifecycleState::Configured;
        Ok(())
    }

    pub fn initialize(
        &mut self,
        nodes: &NodeArena,
        time: Real,
        timestep: Real,
    ) -> ComponentResult<()> {
        let Self { core, model, .. } = self;
        core.time = time;
        core.timestep = timestep;
        let mut ctx = InitContext::new(
            &core.name,
            nodes,
            &core.ports,
            &core.parameters,
            time,
            timestep,
            &mut core.pending,
        );
        model.initialize(&mut ctx)?;
        core.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Run one step ending at `time`.
    #[inline]
    pub fn step(&mut self, nodes: &NodeArena, time: Real) -> StepOutcome {
        let Self { core, model, .. } = self;
        core.time = time;
        core.state = LifecycleState::Stepping;
        let mut ctx = StepContext::new(&core.name, nodes, time, core.timestep, &mut core.pending);
        model.simulate_one_timestep(&mut ctx)
    }

    /// Call the component's finalize unless it already ran for this run.
    pub fn finalize(&mut self) {
        if self.core.state == LifecycleState::Finalized {
            return;
        }
        let Self { core, model, .. } = self;
        let mut ctx = FinalizeContext::new(&core.name, core.time, &mut core.pending);
        model.finalize(&mut ctx);
        core.state = LifecycleState::Finalized;
    }

    /// Make the component editable and initializable again.
    pub fn reset(&mut self) {
        self.core.state = LifecycleState::Configured;
        self.core.time = 0.0;
    }

    pub fn has_messages(&self) -> bool {
        !self.core.pending.is_empty()
    }

    /// Drain pending messages, keeping the buffer for reuse.
    pub fn drain_messages(&mut self) -> std::vec::Drain<'_, Message> {
        self.core.pending.drain(..)
    }
}
