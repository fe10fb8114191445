//! Integration tests for the component lifecycle through the public API.

use tlm_components::{
    Component, ComponentError, ComponentRegistry, CqsType, Declarations, InitContext,
    LifecycleState, StepContext, StepOutcome,
};
use tlm_node::{Node, NodeArena, PortBinding, ReadSlot, Slot, signal};

/// Doubles its input.
#[derive(Default)]
struct Doubler {
    io: Option<(ReadSlot, Slot)>,
}

impl Component for Doubler {
    fn cqs_type(&self) -> CqsType {
        CqsType::Signal
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> Result<(), ComponentError> {
        decl.add_input_variable("in", "Input", "-", 0.0)?;
        decl.add_output_variable("out", "Output", "-")
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> Result<(), ComponentError> {
        self.io = Some((
            ctx.read_slot("in", signal::VALUE)?,
            ctx.slot("out", signal::VALUE)?,
        ));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((input, out)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(out, 2.0 * ctx.read(input));
        StepOutcome::Continue
    }
}

fn doubler() -> Box<dyn Component> {
    Box::new(Doubler::default())
}

fn bind_all(comp: &mut tlm_components::ComponentInstance, nodes: &mut NodeArena) {
    let names: Vec<String> = comp.ports().iter().map(|p| p.name().to_string()).collect();
    for name in names {
        let port = comp.port_mut(&name).unwrap();
        let id = nodes.push(Node::new(port.spec().node_type.clone())).unwrap();
        port.bind(PortBinding::Single(id));
    }
}

#[test]
fn custom_component_registers_and_runs() {
    let mut reg = ComponentRegistry::with_builtin();
    let builtin = reg.len();
    assert!(reg.register("Doubler", doubler));
    assert_eq!(reg.len(), builtin + 1);

    let mut comp = reg.create("Doubler", "d").unwrap();
    assert_eq!(comp.state(), LifecycleState::Configured);
    comp.set_parameter("in", 4.0).unwrap();

    let mut nodes = NodeArena::new();
    bind_all(&mut comp, &mut nodes);
    let input = comp.port("in").unwrap().nodes()[0];
    nodes
        .node(input)
        .unwrap()
        .load_start_values([comp.port("in").unwrap().spec().start_values.as_slice()]);

    comp.initialize(&nodes, 0.0, 0.5).unwrap();
    assert_eq!(comp.state(), LifecycleState::Initialized);
    assert_eq!(comp.step(&nodes, 0.5), StepOutcome::Continue);
    assert_eq!(comp.state(), LifecycleState::Stepping);
    assert_eq!(
        comp.port("out").unwrap().read_node(&nodes, signal::VALUE).unwrap(),
        8.0
    );
}

#[test]
fn parameters_are_locked_while_running() {
    let reg = ComponentRegistry::with_builtin();
    let mut gain = reg.create("SignalGain", "g").unwrap();
    let mut nodes = NodeArena::new();
    bind_all(&mut gain, &mut nodes);

    gain.initialize(&nodes, 0.0, 1e-3).unwrap();
    assert!(matches!(
        gain.set_parameter("k", 3.0),
        Err(ComponentError::Locked)
    ));

    gain.finalize();
    assert_eq!(gain.state(), LifecycleState::Finalized);
    gain.reset();
    gain.set_parameter("k", 3.0).unwrap();
}

#[test]
fn reconfigure_keeps_valid_assignments() {
    let reg = ComponentRegistry::with_builtin();
    let mut step = reg.create("SignalStep", "s").unwrap();
    step.set_parameter("y_A", 7.0).unwrap();
    step.set_parameter("out#Value", 1.5).unwrap();
    let mut nodes = NodeArena::new();
    bind_all(&mut step, &mut nodes);

    step.reconfigure().unwrap();
    assert!(!step.port("out").unwrap().is_connected());
    assert_eq!(step.start_value("out", "Value"), Some(1.5));
    assert_eq!(
        step.parameter("y_A").unwrap().value().as_real(),
        Some(7.0)
    );
}

#[test]
fn bad_assignments_are_rejected() {
    let reg = ComponentRegistry::with_builtin();
    let mut vol = reg.create("HydraulicVolume", "v").unwrap();
    assert!(matches!(
        vol.set_parameter("nope", 1.0),
        Err(ComponentError::UnknownParameter { .. })
    ));
    assert!(matches!(
        vol.set_parameter("P1#Nope", 1.0),
        Err(ComponentError::UnknownVariable { .. })
    ));
    assert!(matches!(
        vol.set_parameter("P9#Pressure", 1.0),
        Err(ComponentError::UnknownPort { .. })
    ));
    assert!(matches!(
        vol.set_parameter("P1#Pressure", f64::NAN),
        Err(ComponentError::InvalidParameterValue { .. })
    ));
    vol.set_parameter("P1#Pressure", 2e5).unwrap();
    assert_eq!(vol.start_value("P1", "Pressure"), Some(2e5));
}

#[test]
fn every_builtin_declares_its_role() {
    let reg = ComponentRegistry::with_builtin();
    let mut roles = [0usize; 3];
    for key in reg.type_keys() {
        let comp = reg.create(key, "probe").unwrap();
        let expected = if key.starts_with("Signal") || key.ends_with("Sensor") {
            CqsType::Signal
        } else {
            comp.cqs_type()
        };
        assert_eq!(comp.cqs_type(), expected, "{key}");
        roles[comp.cqs_type() as usize] += 1;
    }
    assert!(roles.iter().all(|&n| n > 0));
}
