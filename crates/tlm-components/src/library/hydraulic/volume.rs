//! Two-port hydraulic volume.

use tlm_node::{NODE_HYDRAULIC, Requirement};

use super::{HydraulicSlots, P1, P2};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

/// Lumped volume with bulk modulus `Beta_e`; `alpha` low-pass filters the
/// wave variables.
///
/// `Zc = Beta_e * T / V / (1 - alpha)`. Each step the wave arriving at one
/// port is the pressure plus impedance-weighted flow seen at the other port
/// one step ago.
#[derive(Debug, Default)]
pub struct HydraulicVolume {
    zc: f64,
    alpha: f64,
    ports: Option<[HydraulicSlots; 2]>,
}

impl HydraulicVolume {
    pub fn impedance(&self) -> f64 {
        self.zc
    }
}

impl Component for HydraulicVolume {
    fn cqs_type(&self) -> CqsType {
        CqsType::C
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_port(P1, NODE_HYDRAULIC, Requirement::Required)?;
        decl.add_power_port(P2, NODE_HYDRAULIC, Requirement::Required)?;
        decl.register_parameter("V", "Volume", "m^3", 1.0e-3)?;
        decl.register_parameter("Beta_e", "Bulk modulus", "Pa", 1.0e9)?;
        decl.register_parameter("alpha", "Low pass coefficient", "-", 0.1)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        let volume = ctx.real("V")?;
        let beta = ctx.real("Beta_e")?;
        let alpha = ctx.real("alpha")?;
        if !(volume > 0.0) {
            return Err(ComponentError::init(format!("volume must be positive, got {volume}")));
        }
        if !(0.0..1.0).contains(&alpha) {
            return Err(ComponentError::init(format!(
                "alpha must be in [0, 1), got {alpha}"
            )));
        }
        self.alpha = alpha;
        self.zc = beta * ctx.timestep() / volume / (1.0 - alpha);

        let ports = [
            HydraulicSlots::resolve(ctx, P1)?,
            HydraulicSlots::resolve(ctx, P2)?,
        ];
        for port in &ports {
            let (p, q) = (ctx.read(port.p), ctx.read(port.q));
            ctx.write(port.c, p - self.zc * q);
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
        let a = self.alpha;
        let c10 = ctx.read(p2.p) + zc * ctx.read(p2.q);
        let c20 = ctx.read(p1.p) + zc * ctx.read(p1.q);
        let c1 = a * ctx.read(p1.c) + (1.0 - a) * c10;
        let c2 = a * ctx.read(p2.c) + (1.0 - a) * c20;
        ctx.write(p1.c, c1);
        ctx.write(p1.zc, zc);
        ctx.write(p2.c, c2);
        ctx.write(p2.zc, zc);
        StepOutcome::Continue
    }
}
