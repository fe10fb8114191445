//! Hydraulic components.
//!
//! Flow at a port is positive out of the component into the node. C-type
//! components write the wave variable `c` and impedance `Zc`; Q-type
//! components read them and write `q` and `p = c + q * Zc`.

mod restrictors;
mod sensors;
mod shuttle_valve;
mod sources;
mod volume;

pub use restrictors::{HydraulicLaminarOrifice, HydraulicLosslessConnector};
pub use sensors::{HydraulicFlowSensor, HydraulicPressureSensor};
pub use shuttle_valve::HydraulicShuttleValve;
pub use sources::{
    HydraulicFlowSourceQ, HydraulicMultiPressureSourceC, HydraulicPressureSourceC, HydraulicTankC,
};
pub use volume::HydraulicVolume;

use tlm_node::{Slot, hydraulic};

use crate::context::{InitContext, StepContext};
use crate::error::ComponentResult;
use crate::registry::ComponentRegistry;

pub(crate) const P1: &str = "P1";
pub(crate) const P2: &str = "P2";

/// Resolved handles to the four TLM slots of one hydraulic port.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HydraulicSlots {
    pub p: Slot,
    pub q: Slot,
    pub c: Slot,
    pub zc: Slot,
}

impl HydraulicSlots {
    pub(crate) fn resolve(ctx: &InitContext<'_>, port: &str) -> ComponentResult<Self> {
        Ok(Self {
            p: ctx.slot(port, hydraulic::PRESSURE)?,
            q: ctx.slot(port, hydraulic::FLOW)?,
            c: ctx.slot(port, hydraulic::WAVE_VARIABLE)?,
            zc: ctx.slot(port, hydraulic::CHAR_IMPEDANCE)?,
        })
    }

    /// One entry per sub-port of a power multiport.
    pub(crate) fn resolve_multi(ctx: &InitContext<'_>, port: &str) -> ComponentResult<Vec<Self>> {
        let p = ctx.multi_slots(port, hydraulic::PRESSURE)?;
        let q = ctx.multi_slots(port, hydraulic::FLOW)?;
        let c = ctx.multi_slots(port, hydraulic::WAVE_VARIABLE)?;
        let zc = ctx.multi_slots(port, hydraulic::CHAR_IMPEDANCE)?;
        Ok(p.into_iter()
            .zip(q)
            .zip(c.into_iter().zip(zc))
            .map(|((p, q), (c, zc))| Self { p, q, c, zc })
            .collect())
    }

    /// `(c, Zc)` as written by the C side.
    #[inline]
    pub(crate) fn wave(&self, ctx: &StepContext<'_>) -> (f64, f64) {
        (ctx.read(self.c), ctx.read(self.zc))
    }
}

pub fn register(reg: &mut ComponentRegistry) {
    reg.register("HydraulicPressureSourceC", || {
        Box::new(HydraulicPressureSourceC::default())
    });
    reg.register("HydraulicTankC", || Box::new(HydraulicTankC::default()));
    reg.register("HydraulicVolume", || Box::new(HydraulicVolume::default()));
    reg.register("HydraulicMultiPressureSourceC", || {
        Box::new(HydraulicMultiPressureSourceC::default())
    });
    reg.register("HydraulicFlowSourceQ", || Box::new(HydraulicFlowSourceQ::default()));
    reg.register("HydraulicLaminarOrifice", || {
        Box::new(HydraulicLaminarOrifice::default())
    });
    reg.register("HydraulicLosslessConnector", || {
        Box::new(HydraulicLosslessConnector::default())
    });
    reg.register("HydraulicShuttleValve", || Box::new(HydraulicShuttleValve::default()));
    reg.register("HydraulicPressureSensor", || {
        Box::new(HydraulicPressureSensor::default())
    });
    reg.register("HydraulicFlowSensor", || Box::new(HydraulicFlowSensor::default()));
}
