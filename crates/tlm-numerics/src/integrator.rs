//! Trapezoidal integrators, with and without output limits.

use serde::{Deserialize, Serialize};
use tlm_core::numeric::limit;

use crate::error::{NumericsError, NumericsResult};

/// Closed output range `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    pub fn new(min: f64, max: f64) -> NumericsResult<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(NumericsError::InvalidArg {
                what: "limits must not be NaN",
            });
        }
        if min > max {
            return Err(NumericsError::InvalidLimits { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Clamp with strict comparisons; returns the value and whether it moved.
    #[inline]
    pub fn apply(self, value: f64) -> (f64, bool) {
        limit(value, self.min, self.max)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Trapezoidal integrator: `y = y_prev + T/2 * (u + u_prev)`.
#[derive(Clone, Debug, Default)]
pub struct Integrator {
    timestep: f64,
    u_prev: f64,
    y_prev: f64,
}

impl Integrator {
    pub fn new(timestep: f64, u0: f64, y0: f64) -> Self {
        Self {
            timestep,
            u_prev: u0,
            y_prev: y0,
        }
    }

    pub fn initialize(&mut self, timestep: f64, u0: f64, y0: f64) {
        *self = Self::new(timestep, u0, y0);
    }

    /// Overwrite the history without changing the timestep.
    pub fn initialize_values(&mut self, u0: f64, y0: f64) {
        self.u_prev = u0;
        self.y_prev = y0;
    }

    pub fn update(&mut self, u: f64) -> f64 {
        let y = self.y_prev + self.timestep / 2.0 * (u + self.u_prev);
        self.u_prev = u;
        self.y_prev = y;
        y
    }

    pub fn value(&self) -> f64 {
        self.y_prev
    }
}

/// Trapezoidal integrator with output limits and anti-windup.
///
/// When the candidate output crosses a limit the output is pinned to that
/// limit and the stored input is reset to zero, so the next step starts from
/// the limit without the overshoot carried in the history.
#[derive(Clone, Debug, Default)]
pub struct IntegratorLimited {
    timestep: f64,
    u_prev: f64,
    y_prev: f64,
    limits: Limits,
    saturated: bool,
}

impl IntegratorLimited {
    pub fn new(timestep: f64, u0: f64, y0: f64, min: f64, max: f64) -> NumericsResult<Self> {
        let mut i = Self::default();
        i.initialize(timestep, u0, y0, min, max)?;
        Ok(i)
    }

    /// Reset state; the start value is clamped into the limits.
    pub fn initialize(
        &mut self,
        timestep: f64,
        u0: f64,
        y0: f64,
        min: f64,
        max: f64,
    ) -> NumericsResult<()> {
        let limits = Limits::new(min, max)?;
        let (y0, saturated) = limits.apply(y0);
        *self = Self {
            timestep,
            u_prev: u0,
            y_prev: y0,
            limits,
            saturated,
        };
        Ok(())
    }

    pub fn initialize_values(&mut self, u0: f64, y0: f64) {
        let (y0, saturated) = self.limits.apply(y0);
        self.u_prev = u0;
        self.y_prev = y0;
        self.saturated = saturated;
    }

    pub fn set_limits(&mut self, min: f64, max: f64) -> NumericsResult<()> {
        self.limits = Limits::new(min, max)?;
        Ok(())
    }

    pub fn update(&mut self, u: f64) -> f64 {
        let candidate = self.y_prev + self.timestep / 2.0 * (u + self.u_prev);
        let (y, clamped) = self.limits.apply(candidate);
        self.u_prev = if clamped { 0.0 } else { u };
        self.y_prev = y;
        self.saturated = clamped;
        y
    }

    pub fn value(&self) -> f64 {
        self.y_prev
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_input_is_exact() {
        let mut i = Integrator::new(0.01, 2.0, 1.0);
        for _ in 0..100 {
            i.update(2.0);
        }
        assert!((i.value() - (1.0 + 2.0 * 100.0 * 0.01)).abs() < 1e-12);
    }

    #[test]
    fn trapezoid_uses_previous_input() {
        let mut i = Integrator::new(1.0, 0.0, 0.0);
        assert_eq!(i.update(2.0), 1.0);
        assert_eq!(i.update(2.0), 3.0);
        i.initialize_values(0.0, 0.0);
        assert_eq!(i.update(4.0), 2.0);
    }

    #[test]
    fn clamp_then_resume_from_limit() {
        let mut i = IntegratorLimited::new(1.0, 0.0, 0.0, 0.0, 10.0).unwrap();
        // 0 + 0.5 * (30 + 0) = 15, clamped
        assert_eq!(i.update(30.0), 10.0);
        assert!(i.is_saturated());
        // resumes from 10 with u_prev = 0: 10 + 0.5 * (-4 + 0)
        assert_eq!(i.update(-4.0), 8.0);
        assert!(!i.is_saturated());
    }

    #[test]
    fn value_on_boundary_is_not_clamped() {
        let mut i = IntegratorLimited::new(1.0, 0.0, 0.0, 0.0, 10.0).unwrap();
        assert_eq!(i.update(20.0), 10.0);
        assert!(!i.is_saturated());
        // stored input kept: 10 + 0.5 * (-20 + 20) stays on the limit
        assert_eq!(i.update(-20.0), 10.0);
        assert!(!i.is_saturated());
    }

    #[test]
    fn lower_limit_resets_input_history() {
        let mut i = IntegratorLimited::new(1.0, 0.0, 1.0, 0.0, 10.0).unwrap();
        assert_eq!(i.update(-10.0), 0.0);
        assert_eq!(i.update(2.0), 1.0);
    }

    #[test]
    fn invalid_limits_rejected() {
        let err = IntegratorLimited::new(1.0, 0.0, 0.0, 5.0, 1.0).unwrap_err();
        assert_eq!(err, NumericsError::InvalidLimits { min: 5.0, max: 1.0 });
    }

    #[test]
    fn start_value_clamped_into_limits() {
        let i = IntegratorLimited::new(1.0, 0.0, 50.0, 0.0, 10.0).unwrap();
        assert_eq!(i.value(), 10.0);
    }
}
