//! Translational mechanic components.
//!
//! C-type components write the wave variable and the characteristic
//! impedance; Q-type components write `f = c + Zc * v`, velocity and
//! position.

mod mass;
mod sensors;
mod sources;

pub use mass::MechanicMultiPortTranslationalMass;
pub use sensors::{MechanicPositionSensor, MechanicVelocitySensor};
pub use sources::{MechanicForceSourceC, MechanicTranslationalSpring};

use tlm_node::{Slot, mechanic};

use crate::context::InitContext;
use crate::error::ComponentResult;
use crate::registry::ComponentRegistry;

pub(crate) const P1: &str = "P1";
pub(crate) const P2: &str = "P2";

#[derive(Clone, Copy, Debug)]
pub(crate) struct MechanicSlots {
    pub v: Slot,
    pub f: Slot,
    pub x: Slot,
    pub c: Slot,
    pub zc: Slot,
}

impl MechanicSlots {
    pub(crate) fn resolve(ctx: &InitContext<'_>, port: &str) -> ComponentResult<Self> {
        Ok(Self {
            v: ctx.slot(port, mechanic::VELOCITY)?,
            f: ctx.slot(port, mechanic::FORCE)?,
            x: ctx.slot(port, mechanic::POSITION)?,
            c: ctx.slot(port, mechanic::WAVE_VARIABLE)?,
            zc: ctx.slot(port, mechanic::CHAR_IMPEDANCE)?,
        })
    }

    /// One entry per sub-port of a power multiport.
    pub(crate) fn resolve_multi(ctx: &InitContext<'_>, port: &str) -> ComponentResult<Vec<Self>> {
        let v = ctx.multi_slots(port, mechanic::VELOCITY)?;
        let f = ctx.multi_slots(port, mechanic::FORCE)?;
        let x = ctx.multi_slots(port, mechanic::POSITION)?;
        let c = ctx.multi_slots(port, mechanic::WAVE_VARIABLE)?;
        let zc = ctx.multi_slots(port, mechanic::CHAR_IMPEDANCE)?;
        Ok((0..v.len())
            .map(|i| Self {
                v: v[i],
                f: f[i],
                x: x[i],
                c: c[i],
                zc: zc[i],
            })
            .collect())
    }
}

pub fn register(reg: &mut ComponentRegistry) {
    reg.register("MechanicForceSourceC", || Box::new(MechanicForceSourceC::default()));
    reg.register("MechanicTranslationalSpring", || {
        Box::new(MechanicTranslationalSpring::default())
    });
    reg.register("MechanicMultiPortTranslationalMass", || {
        Box::new(MechanicMultiPortTranslationalMass::default())
    });
    reg.register("MechanicPositionSensor", || {
        Box::new(MechanicPositionSensor::default())
    });
    reg.register("MechanicVelocitySensor", || {
        Box::new(MechanicVelocitySensor::default())
    });
}
