//! Two-port Q-type restrictions between C-type neighbours.

use tlm_node::{NODE_HYDRAULIC, ReadSlot, Requirement, signal};

use super::{HydraulicSlots, P1, P2};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::ComponentResult;

fn declare_two_port(decl: &mut Declarations<'_>) -> ComponentResult<()> {
    decl.add_power_port(P1, NODE_HYDRAULIC, Requirement::Required)?;
    decl.add_power_port(P2, NODE_HYDRAULIC, Requirement::Required)
}

fn resolve_two_port(ctx: &InitContext<'_>) -> ComponentResult<[HydraulicSlots; 2]> {
    Ok([
        HydraulicSlots::resolve(ctx, P1)?,
        HydraulicSlots::resolve(ctx, P2)?,
    ])
}

/// Linear orifice `q = Kc * dp`.
///
/// If either side would drop below zero pressure, that side is treated as
/// an ideal zero-pressure source and the flow is solved again.
#[derive(Debug, Default)]
pub struct HydraulicLaminarOrifice {
    kc: Option<ReadSlot>,
    ports: Option<[HydraulicSlots; 2]>,
}

fn laminar(kc: f64, c1: f64, zc1: f64, c2: f64, zc2: f64) -> (f64, f64, f64, f64) {
    let q2 = kc * (c1 - c2) / (1.0 + kc * (zc1 + zc2));
    let q1 = -q2;
    (q1, c1 + q1 * zc1, q2, c2 + q2 * zc2)
}

impl Component for HydraulicLaminarOrifice {
    fn cqs_type(&self) -> CqsType {
        CqsType::Q
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_two_port(decl)?;
        decl.add_input_variable("Kc", "Pressure-flow coefficient", "m^5/Ns", 1.0e-11)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.kc = Some(ctx.read_slot("Kc", signal::VALUE)?);
        self.ports = Some(resolve_two_port(ctx)?);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let (Some(kc), Some([p1, p2])) = (self.kc, self.ports) else {
            return StepOutcome::not_initialized();
        };
        let kc = ctx.read(kc).abs();
        let (mut c1, mut zc1) = p1.wave(ctx);
        let (mut c2, mut zc2) = p2.wave(ctx);

        let (mut q1, mut pr1, mut q2, mut pr2) = laminar(kc, c1, zc1, c2, zc2);
        if pr1 < 0.0 || pr2 < 0.0 {
            if pr1 < 0.0 {
                (c1, zc1) = (0.0, 0.0);
            }
            if pr2 < 0.0 {
                (c2, zc2) = (0.0, 0.0);
            }
            (q1, pr1, q2, pr2) = laminar(kc, c1, zc1, c2, zc2);
            pr1 = pr1.max(0.0);
            pr2 = pr2.max(0.0);
        }

        ctx.write(p1.p, pr1);
        ctx.write(p1.q, q1);
        ctx.write(p2.p, pr2);
        ctx.write(p2.q, q2);
        StepOutcome::Continue
    }
}

/// Zero-resistance joint between two C-type components.
///
/// Pressures are held at or above zero.
#[derive(Debug, Default)]
pub struct HydraulicLosslessConnector {
    ports: Option<[HydraulicSlots; 2]>,
}

impl Component for HydraulicLosslessConnector {
    fn cqs_type(&self) -> CqsType {
        CqsType::Q
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        declare_two_port(decl)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.ports = Some(resolve_two_port(ctx)?);
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some([p1, p2]) = self.ports else {
            return StepOutcome::not_initialized();
        };
        let (c1, zc1) = p1.wave(ctx);
        let (c2, zc2) = p2.wave(ctx);
        let z = zc1 + zc2;
        if z == 0.0 {
            return StepOutcome::Stop(format!(
                "{}: both sides have zero characteristic impedance",
                ctx.name()
            ));
        }
        let q2 = (c1 - c2) / z;
        let q1 = -q2;
        ctx.write(p1.p, (c1 + q1 * zc1).max(0.0));
        ctx.write(p1.q, q1);
        ctx.write(p2.p, (c2 + q2 * zc2).max(0.0));
        ctx.write(p2.q, q2);
        StepOutcome::Continue
    }
}
