//! Pressure-driven 3/3 shuttle valve.

use std::f64::consts::PI;

use tlm_core::sign;
use tlm_node::{NODE_HYDRAULIC, ReadSlot, Requirement, Slot, signal};
use tlm_numerics::{IntegratorLimited, TurbulentFlowFunction};

use super::HydraulicSlots;
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::ComponentResult;

const PP: &str = "PP";
const PT: &str = "PT";
const PA: &str = "PA";

/// Input variables read every step.
#[derive(Clone, Copy, Debug)]
struct Inputs {
    cq: ReadSlot,
    rho: ReadSlot,
    d: ReadSlot,
    f_pa: ReadSlot,
    f_at: ReadSlot,
    x_pa: ReadSlot,
    x_at: ReadSlot,
}

#[derive(Clone, Copy, Debug)]
struct Io {
    pp: HydraulicSlots,
    pt: HydraulicSlots,
    pa: HydraulicSlots,
    xv_out: Slot,
    inputs: Inputs,
}

/// Spool moved by the flow through two damping orifices between P and T.
///
/// A negative spool position opens P to A, a positive one opens A to T.
#[derive(Debug, Default)]
pub struct HydraulicShuttleValve {
    k1: f64,
    k2: f64,
    area: f64,
    spool: IntegratorLimited,
    q_pa: TurbulentFlowFunction,
    q_at: TurbulentFlowFunction,
    io: Option<Io>,
}

impl Component for HydraulicShuttleValve {
    fn cqs_type(&self) -> CqsType {
        CqsType::Q
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(PP, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_power_port(PT, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_power_port(PA, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_output_variable("xv_out", "Spool position", "m")?;

        decl.add_input_variable("C_q", "Flow coefficient", "-", 0.67)?;
        decl.add_input_variable("rho", "Oil density", "kg/m^3", 890.0)?;
        decl.add_input_variable("d", "Spool diameter", "m", 0.01)?;
        decl.add_input_variable("f_pa", "Fraction of circumference opening P-A", "-", 1.0)?;
        decl.add_input_variable("f_at", "Fraction of circumference opening A-T", "-", 1.0)?;
        decl.add_input_variable("x_pa", "Spool overlap P-A", "m", -1.0e-6)?;
        decl.add_input_variable("x_at", "Spool overlap A-T", "m", -1.0e-6)?;

        decl.add_constant("x_vmax", "Maximum spool displacement", "m", 0.01)?;
        decl.add_constant("d_1", "Damping orifice 1 diameter", "m", 1.0e-3)?;
        decl.add_constant("d_2", "Damping orifice 2 diameter", "m", 1.0e-3)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let xv_max = ctx.real("x_vmax")?;
        let d1 = ctx.real("d_1")?;
        let d2 = ctx.real("d_2")?;
        let inputs = Inputs {
            cq: ctx.read_slot("C_q", signal::VALUE)?,
            rho: ctx.read_slot("rho", signal::VALUE)?,
            d: ctx.read_slot("d", signal::VALUE)?,
            f_pa: ctx.read_slot("f_pa", signal::VALUE)?,
            f_at: ctx.read_slot("f_at", signal::VALUE)?,
            x_pa: ctx.read_slot("x_pa", signal::VALUE)?,
            x_at: ctx.read_slot("x_at", signal::VALUE)?,
        };
        let cq = ctx.read(inputs.cq);
        let rho = ctx.read(inputs.rho);
        let d = ctx.read(inputs.d);

        self.spool
            .initialize(ctx.timestep(), 0.0, 0.0, -xv_max, xv_max)?;
        self.k1 = cq * PI * d1 * d1 / 4.0 * (2.0 / rho).sqrt();
        self.k2 = cq * PI * d2 * d2 / 4.0 * (2.0 / rho).sqrt();
        self.area = PI * d * d / 4.0;

        self.io = Some(Io {
            pp: HydraulicSlots::resolve(ctx, PP)?,
            pt: HydraulicSlots::resolve(ctx, PT)?,
            pa: HydraulicSlots::resolve(ctx, PA)?,
            xv_out: ctx.slot("xv_out", signal::VALUE)?,
            inputs,
        });
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        let Some(io) = self.io else {
            return StepOutcome::not_initialized();
        };
        let inp = io.inputs;
        let (cq, rho, d) = (ctx.read(inp.cq), ctx.read(inp.rho), ctx.read(inp.d));

        // pilot pressure between the damping orifices drives the spool
        let pp_prev = ctx.read(io.pp.p);
        let pt_prev = ctx.read(io.pt.p);
        let (k1s, k2s) = (self.k1 * self.k1, self.k2 * self.k2);
        let pilot = (k1s * pp_prev + k2s * pt_prev) / (k1s + k2s);
        let dp = pp_prev - pilot;
        let v = sign(dp) * self.k1 * dp.abs().sqrt() / self.area;
        let xv = self.spool.update(v);

        let x_pa_open = (-xv - ctx.read(inp.x_pa)).max(0.0);
        let x_at_open = (xv - ctx.read(inp.x_at)).max(0.0);
        let root = (2.0 / rho).sqrt();
        self.q_pa
            .set_flow_coefficient(cq * ctx.read(inp.f_pa) * PI * d * x_pa_open * root);
        self.q_at
            .set_flow_coefficient(cq * ctx.read(inp.f_at) * PI * d * x_at_open * root);

        let (mut cp, mut zcp) = io.pp.wave(ctx);
        let (mut ct, mut zct) = io.pt.wave(ctx);
        let (mut ca, mut zca) = io.pa.wave(ctx);

        let solve = |cp: f64, zcp: f64, ct: f64, zct: f64, ca: f64, zca: f64| {
            let qpa = self.q_pa.flow(cp, ca, zcp, zca);
            let qat = self.q_at.flow(ca, ct, zca, zct);
            let (qp, qa, qt) = (-qpa, qpa - qat, qat);
            [(qp, cp + qp * zcp), (qt, ct + qt * zct), (qa, ca + qa * zca)]
        };

        let mut out = solve(cp, zcp, ct, zct, ca, zca);
        let [(_, pp), (_, pt), (_, pa)] = out;
        if pp < 0.0 || pt < 0.0 || pa < 0.0 {
            if pp < 0.0 {
                (cp, zcp) = (0.0, 0.0);
            }
            if pt < 0.0 {
                (ct, zct) = (0.0, 0.0);
            }
            if pa < 0.0 {
                (ca, zca) = (0.0, 0.0);
            }
            out = solve(cp, zcp, ct, zct, ca, zca);
        }

        let [(qp, pp), (qt, pt), (qa, pa)] = out;
        ctx.write(io.pp.p, pp);
        ctx.write(io.pp.q, qp);
        ctx.write(io.pt.p, pt);
        ctx.write(io.pt.q, qt);
        ctx.write(io.pa.p, pa);
        ctx.write(io.pa.q, qa);
        ctx.write(io.xv_out, xv);
        StepOutcome::Continue
    }
}
