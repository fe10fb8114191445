//! First and second order transfer functions discretised with Tustin.
//!
//! Coefficient arrays are in ascending powers of `s`: `num[0]` is the
//! constant term.

use crate::error::{NumericsError, NumericsResult};
use crate::integrator::Limits;

/// `G(s) = (a1 s + a0) / (b1 s + b0)`.
#[derive(Clone, Debug, Default)]
pub struct FirstOrderTransferFunction {
    timestep: f64,
    cu: [f64; 2],
    cy: [f64; 2],
    delay_u: f64,
    delay_y: f64,
    limits: Limits,
    saturated: bool,
}

impl FirstOrderTransferFunction {
    pub fn new(
        timestep: f64,
        num: [f64; 2],
        den: [f64; 2],
        u0: f64,
        y0: f64,
        limits: Limits,
    ) -> NumericsResult<Self> {
        let mut tf = Self::default();
        tf.initialize(timestep, num, den, u0, y0, limits)?;
        Ok(tf)
    }

    pub fn initialize(
        &mut self,
        timestep: f64,
        num: [f64; 2],
        den: [f64; 2],
        u0: f64,
        y0: f64,
        limits: Limits,
    ) -> NumericsResult<()> {
        if !(timestep > 0.0) {
            return Err(NumericsError::InvalidArg {
                what: "timestep must be positive",
            });
        }
        self.timestep = timestep;
        self.limits = limits;
        self.set_num(num);
        self.set_den(den)?;
        self.initialize_values(u0, y0);
        Ok(())
    }

    pub fn set_num(&mut self, num: [f64; 2]) {
        let t = self.timestep;
        self.cu = [num[0] * t - 2.0 * num[1], num[0] * t + 2.0 * num[1]];
    }

    pub fn set_den(&mut self, den: [f64; 2]) -> NumericsResult<()> {
        let t = self.timestep;
        let cy = [den[0] * t - 2.0 * den[1], den[0] * t + 2.0 * den[1]];
        if cy[1] == 0.0 || !cy[1].is_finite() {
            return Err(NumericsError::Singular {
                what: "first order denominator vanishes at this timestep",
            });
        }
        self.cy = cy;
        Ok(())
    }

    pub fn set_min_max(&mut self, min: f64, max: f64) -> NumericsResult<()> {
        self.limits = Limits::new(min, max)?;
        Ok(())
    }

    /// Overwrite the history; the output is clamped into the limits.
    pub fn initialize_values(&mut self, u0: f64, y0: f64) {
        let (y0, saturated) = self.limits.apply(y0);
        self.delay_u = u0;
        self.delay_y = y0;
        self.saturated = saturated;
    }

    pub fn update(&mut self, u: f64) -> f64 {
        let y = (self.cu[1] * u + self.cu[0] * self.delay_u - self.cy[0] * self.delay_y)
            / self.cy[1];
        let (y, clamped) = self.limits.apply(y);
        if clamped {
            self.delay_u = y;
        } else {
            self.delay_u = u;
        }
        self.delay_y = y;
        self.saturated = clamped;
        y
    }

    pub fn value(&self) -> f64 {
        self.delay_y
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }
}

/// First order low pass `1 / (s/wc + 1)` with break frequency `wc` in rad/s.
pub fn first_order_low_pass(
    wc: f64,
    timestep: f64,
    u0: f64,
    y0: f64,
    limits: Limits,
) -> NumericsResult<FirstOrderTransferFunction> {
    if !(wc > 0.0) {
        return Err(NumericsError::InvalidArg {
            what: "break frequency must be positive",
        });
    }
    FirstOrderTransferFunction::new(timestep, [1.0, 0.0], [1.0, 1.0 / wc], u0, y0, limits)
}

/// `G(s) = (a2 s^2 + a1 s + a0) / (b2 s^2 + b1 s + b0)`.
#[derive(Clone, Debug, Default)]
pub struct SecondOrderTransferFunction {
    timestep: f64,
    cu: [f64; 3],
    cy: [f64; 3],
    delay_u: [f64; 2],
    delay_y: [f64; 2],
    limits: Limits,
    saturated: bool,
}

fn second_order_coeffs(c: [f64; 3], t: f64) -> [f64; 3] {
    let t2 = t * t;
    [
        c[0] * t2 + 2.0 * c[1] * t + 4.0 * c[2],
        2.0 * c[0] * t2 - 8.0 * c[2],
        c[0] * t2 - 2.0 * c[1] * t + 4.0 * c[2],
    ]
}

impl SecondOrderTransferFunction {
    pub fn new(
        timestep: f64,
        num: [f64; 3],
        den: [f64; 3],
        u0: f64,
        y0: f64,
        limits: Limits,
    ) -> NumericsResult<Self> {
        let mut tf = Self::default();
        tf.initialize(timestep, num, den, u0, y0, limits)?;
        Ok(tf)
    }

    pub fn initialize(
        &mut self,
        timestep: f64,
        num: [f64; 3],
        den: [f64; 3],
        u0: f64,
        y0: f64,
        limits: Limits,
    ) -> NumericsResult<()> {
        if !(timestep > 0.0) {
            return Err(NumericsError::InvalidArg {
                what: "timestep must be positive",
            });
        }
        self.timestep = timestep;
        self.limits = limits;
        self.set_num(num);
        self.set_den(den)?;
        self.initialize_values(u0, y0);
        Ok(())
    }

    pub fn set_num(&mut self, num: [f64; 3]) {
        self.cu = second_order_coeffs(num, self.timestep);
    }

    pub fn set_den(&mut self, den: [f64; 3]) -> NumericsResult<()> {
        let cy = second_order_coeffs(den, self.timestep);
        if cy[0] == 0.0 || !cy[0].is_finite() {
            return Err(NumericsError::Singular {
                what: "second order denominator vanishes at this timestep",
            });
        }
        self.cy = cy;
        Ok(())
    }

    pub fn set_min_max(&mut self, min: f64, max: f64) -> NumericsResult<()> {
        self.limits = Limits::new(min, max)?;
        Ok(())
    }

    pub fn initialize_values(&mut self, u0: f64, y0: f64) {
        let (y0, saturated) = self.limits.apply(y0);
        self.delay_u = [u0, u0];
        self.delay_y = [y0, y0];
        self.saturated = saturated;
    }

    pub fn update(&mut self, u: f64) -> f64 {
        let y = (self.cu[0] * u + self.cu[1] * self.delay_u[0] + self.cu[2] * self.delay_u[1]
            - self.cy[1] * self.delay_y[0]
            - self.cy[2] * self.delay_y[1])
            / self.cy[0];
        let (y, clamped) = self.limits.apply(y);
        if clamped {
            self.delay_u = [y, y];
            self.delay_y = [y, y];
        } else {
            self.delay_u = [u, self.delay_u[0]];
            self.delay_y = [y, self.delay_y[0]];
        }
        self.saturated = clamped;
        y
    }

    pub fn value(&self) -> f64 {
        self.delay_y[0]
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }
}
