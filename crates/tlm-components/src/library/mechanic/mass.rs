//! Translational mass with any number of connections on either side.

use tlm_node::{NODE_MECHANIC, Requirement};
use tlm_numerics::DoubleIntegratorWithDamping;

use super::{MechanicSlots, P1, P2};
use crate::component::{Component, CqsType, StepOutcome};
use crate::context::{InitContext, StepContext};
use crate::declare::Declarations;
use crate::error::{ComponentError, ComponentResult};

/// Rigid body between the `P1` and `P2` multiports.
///
/// The state is the position `x` of the `P2` side. Forces on `P1` push
/// toward `P2`. The stroke is limited to `[x_min, x_max]`; at a limit the
/// velocity into the limit is removed.
#[derive(Debug, Default)]
pub struct MechanicMultiPortTranslationalMass {
    mass: f64,
    damping: f64,
    stiffness: f64,
    x_min: f64,
    x_max: f64,
    /// Position the spring force is measured from.
    x_ref: f64,
    integrator: DoubleIntegratorWithDamping,
    p1: Vec<MechanicSlots>,
    p2: Vec<MechanicSlots>,
    start_x1: Vec<f64>,
    start_x2: Vec<f64>,
    initialized: bool,
}

impl MechanicMultiPortTranslationalMass {
    pub fn position(&self) -> f64 {
        self.integrator.position()
    }

    pub fn velocity(&self) -> f64 {
        self.integrator.velocity()
    }
}

fn common_velocity(ctx: &mut InitContext<'_>, port: &str, slots: &[MechanicSlots]) -> Option<f64> {
    let first = ctx.read(slots.first()?.v);
    if slots.iter().any(|s| ctx.read(s.v) != first) {
        ctx.warn(format!("Velocities in multiport {port} do not match"));
    }
    Some(first)
}

impl Component for MechanicMultiPortTranslationalMass {
    fn cqs_type(&self) -> CqsType {
        CqsType::Q
    }

    fn configure(&mut self, decl: &mut Declarations<'_>) -> ComponentResult<()> {
        decl.add_power_multiport(P1, NODE_MECHANIC, Requirement::NotRequired)?;
        decl.add_power_multiport(P2, NODE_MECHANIC, Requirement::NotRequired)?;
        decl.register_parameter("m", "Mass", "kg", 100.0)?;
        decl.register_parameter("B", "Viscous friction", "Ns/m", 10.0)?;
        decl.register_parameter("k", "Spring coefficient", "N/m", 0.0)?;
        decl.register_parameter("x_min", "Minimum position", "m", 0.0)?;
        decl.register_parameter("x_max", "Maximum position", "m", 1.0)
    }

    fn initialize(&mut self, ctx: &mut InitContext<'_>) -> ComponentResult<()> {
        self.mass = ctx.real("m")?;
        self.damping = ctx.real("B")?;
        self.stiffness = ctx.real("k")?;
        self.x_min = ctx.real("x_min")?;
        self.x_max = ctx.real("x_max")?;
        if !(self.mass > 0.0) {
            return Err(ComponentError::init(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }
        if self.x_min > self.x_max {
            return Err(ComponentError::init(format!(
                "x_min {} is above x_max {}",
                self.x_min, self.x_max
            )));
        }

        self.p1 = MechanicSlots::resolve_multi(ctx, P1)?;
        self.p2 = MechanicSlots::resolve_multi(ctx, P2)?;
        self.start_x1 = self.p1.iter().map(|s| ctx.read(s.x)).collect();
        self.start_x2 = self.p2.iter().map(|s| ctx.read(s.x)).collect();

        self.x_ref = match (self.start_x2.first(), self.start_x1.first()) {
            (Some(x2), _) => *x2,
            (None, Some(x1)) => -*x1,
            (None, None) => 0.0,
        };
        let v1 = common_velocity(ctx, P1, &self.p1);
        let v2 = common_velocity(ctx, P2, &self.p2);
        if let (Some(v1), Some(v2)) = (v1, v2) {
            if v1 != -v2 {
                ctx.warn(format!("Start velocities of {P1} and {P2} do not match"));
            }
        }
        let v2 = v2.or(v1.map(|v| -v)).unwrap_or(0.0);

        let w = self.damping * ctx.timestep() / self.mass;
        self.integrator
            .initialize(ctx.timestep(), w, 0.0, self.x_ref, v2);
        self.initialized = true;
        Ok(())
    }

    fn simulate_one_timestep(&mut self, ctx: &mut StepContext<'_>) -> StepOutcome {
        if !self.initialized {
            return StepOutcome::not_initialized();
        }
        let mut c1 = 0.0;
        let mut z1 = 0.0;
        for s in &self.p1 {
            c1 += ctx.read(s.c);
            z1 += ctx.read(s.zc);
        }
        let mut c2 = 0.0;
        let mut z2 = 0.0;
        for s in &self.p2 {
            c2 += ctx.read(s.c);
            z2 += ctx.read(s.zc);
        }

        let t = ctx.timestep();
        self.integrator
            .set_damping((self.damping + z1 + z2) * t / self.mass);
        let spring = self.stiffness * (self.integrator.position() - self.x_ref);
        let a = (c1 - c2 - spring) / self.mass;
        self.integrator.integrate(a);

        let mut x = self.integrator.position();
        let mut v2 = self.integrator.velocity();
        if x < self.x_min {
            x = self.x_min;
            v2 = v2.max(0.0);
            self.integrator.initialize_values(a, x, v2);
        } else if x > self.x_max {
            x = self.x_max;
            v2 = v2.min(0.0);
            self.integrator.initialize_values(a, x, v2);
        }
        let v1 = -v2;

        for (s, x0) in self.p1.iter().zip(&self.start_x1) {
            ctx.write(s.f, ctx.read(s.c) + ctx.read(s.zc) * v1);
            ctx.write(s.x, x0 + self.x_ref - x);
            ctx.write(s.v, v1);
        }
        for (s, x0) in self.p2.iter().zip(&self.start_x2) {
            ctx.write(s.f, ctx.read(s.c) + ctx.read(s.zc) * v2);
            ctx.write(s.x, x0 - self.x_ref + x);
            ctx.write(s.v, v2);
        }
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use tlm_node::mechanic;

    use crate::testing::Rig;

    fn mass_with_force(force: f64, x_max: f64) -> (Rig, tlm_core::NodeId) {
        let mut rig = Rig::new(1e-3);
        let src = rig.add("MechanicForceSourceC");
        let mass = rig.add("MechanicMultiPortTranslationalMass");
        rig.set(src, "F", force);
        rig.set(mass, "B", 0.0);
        rig.set(mass, "x_min", -10.0);
        rig.set(mass, "x_max", x_max);
        let n = rig.connect(&[(src, "P1"), (mass, "P1")]);
        (rig, n)
    }

    #[test]
    fn constant_force_accelerates_uniformly() {
        let (mut rig, n) = mass_with_force(100.0, 10.0);
        rig.initialize().unwrap();
        for _ in 0..1000 {
            assert_eq!(rig.step(), None);
        }
        // a = 1 m/s^2 for 1 s, P1 moves away from the applied force
        let v = rig.value(n, mechanic::VELOCITY);
        let x = rig.value(n, mechanic::POSITION);
        assert!((v + 1.0).abs() < 1e-3, "{v}");
        assert!((x + 0.5).abs() < 1e-3, "{x}");
        assert_eq!(rig.value(n, mechanic::FORCE), 100.0);
    }

    #[test]
    fn stroke_limit_stops_the_mass() {
        let (mut rig, n) = mass_with_force(1.0e4, 0.1);
        rig.initialize().unwrap();
        for _ in 0..1000 {
            assert_eq!(rig.step(), None);
        }
        assert_eq!(rig.value(n, mechanic::POSITION), -0.1);
        assert_eq!(rig.value(n, mechanic::VELOCITY), 0.0);
    }

    #[test]
    fn balanced_forces_keep_the_mass_still() {
        let mut rig = Rig::new(1e-3);
        let left = rig.add("MechanicForceSourceC");
        let right = rig.add("MechanicForceSourceC");
        let mass = rig.add("MechanicMultiPortTranslationalMass");
        rig.set(left, "F", 50.0);
        rig.set(right, "F", 50.0);
        rig.set(mass, "x_min", -1.0);
        rig.connect(&[(left, "P1"), (mass, "P1")]);
        let n2 = rig.connect(&[(right, "P1"), (mass, "P2")]);
        rig.initialize().unwrap();
        for _ in 0..100 {
            assert_eq!(rig.step(), None);
        }
        assert_eq!(rig.value(n2, mechanic::VELOCITY), 0.0);
        assert_eq!(rig.value(n2, mechanic::POSITION), 0.0);
    }

    #[test]
    fn spring_pulls_back_toward_start_position() {
        let mut rig = Rig::new(1e-3);
        let src = rig.add("MechanicForceSourceC");
        let mass = rig.add("MechanicMultiPortTranslationalMass");
        rig.set(src, "F", 100.0);
        rig.set(mass, "k", 1000.0);
        rig.set(mass, "B", 200.0);
        rig.set(mass, "x_min", -10.0);
        rig.set(mass, "x_max", 10.0);
        let n = rig.connect(&[(src, "P1"), (mass, "P1")]);
        rig.initialize().unwrap();
        for _ in 0..20_000 {
            assert_eq!(rig.step(), None);
        }
        // settles where k * x balances F
        let x = rig.value(n, mechanic::POSITION);
        assert!((x + 0.1).abs() < 1e-4, "{x}");
    }

    #[test]
    fn mismatched_start_velocities_warn() {
        let mut rig = Rig::new(1e-3);
        let a = rig.add("MechanicForceSourceC");
        let b = rig.add("MechanicForceSourceC");
        let mass = rig.add("MechanicMultiPortTranslationalMass");
        rig.set(a, "P1#Velocity", 1.0);
        rig.connect(&[(a, "P1"), (mass, "P1")]);
        rig.connect(&[(b, "P1"), (mass, "P1")]);
        rig.initialize().unwrap();
        let messages = rig.messages(mass);
        assert!(messages.iter().any(|m| m.contains("Velocities")), "{messages:?}");
    }
}
