//! C-type mechanic components.

use tlm_node::{NODE_MECHANIC, ReadSlot, Requirement, signal};

use super::{MechanicSlots, P1, P2};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

/// Ideal force `F` applied at the port.
#[derive(Debug, Default)]
pub struct MechanicForceSourceC {
    io: Option<(ReadSlot, MechanicSlots)>,
}

impl Component for MechanicForceSourceC {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_MECHANIC, Requirement::Required)?;
        decl.add_input_variable("F", "Force", "N", 0.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.io = Some((ctx.read_slot("F", signal::VALUE)?, MechanicSlots::resolve(ctx, P1)?));
        self.simulate_one_timestep(&mut ctx.step_context()).into_init()?;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some((force, port)) = self.io else {
            return StepOutcome::not_initialized();
        };
        ctx.write(port.c, ctx.read(force));
        ctx.write(port.zc, 0.0);
        StepOutcome::Continue
    }
}

/// Linear spring as a TLM line with impedance `k * T`.
#[derive(Debug, Default)]
pub struct MechanicTranslationalSpring {
    zc: f64,
    ports: Option<[MechanicSlots; 2]>,
}

impl Component for MechanicTranslationalSpring {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_MECHANIC, Requirement::Required)?;
        decl.add_power_port(P2, NODE_MECHANIC, Requirement::Required)?;
        decl.register_parameter("k", "Spring coefficient", "N/m", 100.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let k = ctx.real("k")?;
        if !(k > 0.0) {
            return Err(ComponentError::init(format!(
                "spring coefficient must be positive, got {k}"
            )));
        }
        self.zc = k * ctx.timestep();
        let ports = [
            MechanicSlots::resolve(ctx, P1)?,
            MechanicSlots::resolve(ctx, P2)?,
        ];
        for port in &ports {
            let (f, v) = (ctx.read(port.f), ctx.read(port.v));
            ctx.write(port.c, f - self.zc * v);
            ctx.write(port.zc, self.zc);
        }
        self.ports = Some(ports);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some([p1, p2]) = self.ports else {
            return StepOutcome::not_initialized();
        };
        let zc = self.zc;
        let c1_old = ctx.read(p1.c);
        let c2_old = ctx.read(p2.c);
        let c1 = c2_old + 2.0 * zc * ctx.read(p2.v);
        let c2 = c1_old + 2.0 * zc * ctx.read(p1.v);
        ctx.write(p1.c, c1);
        ctx.write(p1.zc, zc);
        ctx.write(p2.c, c2);
        ctx.write(p2.zc, zc);
        StepOutcome::Continue
    }
}
