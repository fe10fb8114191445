//! Pressure and flow sources.

use tlm_node::{NODE_HYDRAULIC, ReadSlot, Requirement, signal};

use super::{HydraulicSlots, P1};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::ComponentResult;

/// Prescribed wave variable `c = p` behind an impedance `Zc`.
#[derive(Debug, Default)]
pub struct HydraulicPressureSourceC {
    zc: f64,
    io: Option<(ReadSlot, HydraulicSlots)>,
}

impl Component for HydraulicPressureSourceC {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_input_variable("p", "Source pressure", "Pa", 1.0e5)?;
        decl.register_parameter("Zc", "Source impedance", "Pa s/m^3", 0.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.zc = ctx.real("Zc")?;
        self.io = Some((ctx.read_slot("p", signal::VALUE)?, HydraulicSlots::resolve(ctx, P1)?));
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((p, port)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(port.c, ctx.read(p));
        ctx.write(port.zc, self.zc);
        StepOutcome::Continue
    }
}

/// Constant-pressure reservoir.
#[derive(Debug, Default)]
pub struct HydraulicTankC {
    p: f64,
    port: Option<HydraulicSlots>,
}

impl Component for HydraulicTankC {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_HYDRAULIC, Requirement::Required)?;
        decl.register_parameter("p", "Tank pressure", "Pa", 1.0e5)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.p = ctx.real("p")?;
        let port = HydraulicSlots::resolve(ctx, P1)?;
        ctx.write(port.p, self.p);
        self.port = Some(port);
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(port) = self.port else {
            return StepOutcome::not_initialized();
        };
        ctx.write(port.c, self.p);
        ctx.write(port.zc, 0.0);
        StepOutcome::Continue
    }
}

/// The same ideal pressure on every connection of a power multiport.
#[derive(Debug, Default)]
pub struct HydraulicMultiPressureSourceC {
    p: Option<ReadSlot>,
    ports: Vec<HydraulicSlots>,
}

impl HydraulicMultiPressureSourceC {
    pub fn num_connections(&self) -> usize {
        self.ports.len()
    }
}

impl Component for HydraulicMultiPressureSourceC {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_multiport(P1, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_input_variable("p", "Source pressure", "Pa", 1.0e5)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.ports = HydraulicSlots::resolve_multi(ctx, P1)?;
        self.p = Some(ctx.read_slot("p", signal::VALUE)?);
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(p) = self.p else {
            return StepOutcome::not_initialized();
        };
        let p = ctx.read(p);
        for port in &self.ports {
            ctx.write(port.c, p);
            ctx.write(port.zc, 0.0);
        }
        StepOutcome::Continue
    }
}

/// Prescribed flow into the node.
#[derive(Debug, Default)]
pub struct HydraulicFlowSourceQ {
    io: Option<(ReadSlot, HydraulicSlots)>,
}

impl Component for HydraulicFlowSourceQ {
    fn cqs_type(&self) -> CqsType {
        CqsType::Q
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_input_variable("q", "Flow", "m^3/s", 1.0e-3)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.io = Some((ctx.read_slot("q", signal::VALUE)?, HydraulicSlots::resolve(ctx, P1)?));
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((q, port)) = self.io else {
            return StepOutcome::not_initialized();
        };
        let q = ctx.read(q);
        let (c, zc) = port.wave(ctx);
        ctx.write(port.q, q);
        ctx.write(port.p, c + q * zc);
        StepOutcome::Continue
    }
}
