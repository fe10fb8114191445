//! Acceleration to velocity to position, with viscous damping folded into
//! the velocity step.

/// Double integrator used by mass components.
///
/// The velocity step solves `v' = a - w/T * v` with the trapezoidal rule,
/// where `w` is the dimensionless damping `B * T / m`:
///
/// `v = ((2 - w) * v_prev + T * (a + a_prev)) / (2 + w)`
///
/// and the position is the trapezoidal integral of the velocity.
#[derive(Clone, Debug, Default)]
pub struct DoubleIntegratorWithDamping {
    timestep: f64,
    damping: f64,
    state: State,
    undo: Option<State>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct State {
    a_prev: f64,
    v: f64,
    x: f64,
}

impl DoubleIntegratorWithDamping {
    pub fn new(timestep: f64, damping: f64, a0: f64, x0: f64, v0: f64) -> Self {
        Self {
            timestep,
            damping,
            state: State {
                a_prev: a0,
                v: v0,
                x: x0,
            },
            undo: None,
        }
    }

    pub fn initialize(&mut self, timestep: f64, damping: f64, a0: f64, x0: f64, v0: f64) {
        *self = Self::new(timestep, damping, a0, x0, v0);
    }

    /// Overwrite the history without touching timestep or damping.
    pub fn initialize_values(&mut self, a0: f64, x0: f64, v0: f64) {
        self.state = State {
            a_prev: a0,
            v: v0,
            x: x0,
        };
        self.undo = None;
    }

    /// Set the dimensionless damping `w = B * T / m`.
    pub fn set_damping(&mut self, w: f64) {
        self.damping = w;
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn integrate(&mut self, a: f64) {
        let t = self.timestep;
        let w = self.damping;
        let prev = self.state;
        let v = ((2.0 - w) * prev.v + t * (a + prev.a_prev)) / (2.0 + w);
        let x = prev.x + t / 2.0 * (v + prev.v);
        self.state = State { a_prev: a, v, x };
    }

    /// Integrate and remember the previous state for [`Self::redo_integrate`].
    pub fn integrate_with_undo(&mut self, a: f64) {
        self.undo = Some(self.state);
        self.integrate(a);
    }

    /// Discard the last `integrate_with_undo` step and integrate `a` instead.
    ///
    /// Without a saved step this is a plain [`Self::integrate`].
    pub fn redo_integrate(&mut self, a: f64) {
        if let Some(saved) = self.undo.take() {
            self.state = saved;
        }
        self.integrate(a);
    }

    pub fn velocity(&self) -> f64 {
        self.state.v
    }

    pub fn position(&self) -> f64 {
        self.state.x
    }

    /// Pin the position, e.g. against a stroke limit, keeping the velocity.
    pub fn set_position(&mut self, x: f64) {
        self.state.x = x;
    }

    pub fn set_velocity(&mut self, v: f64) {
        self.state.v = v;
    }
}
