//! Turbulent orifice flow solved against two TLM wave sources.

/// `q = Ks * sqrt(p1 - p2)` with `p1 = c1 - Zc1 q` and `p2 = c2 + Zc2 q`,
/// solved in closed form for `q`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TurbulentFlowFunction {
    ks: f64,
}

impl TurbulentFlowFunction {
    pub fn new(ks: f64) -> Self {
        Self { ks }
    }

    pub fn set_flow_coefficient(&mut self, ks: f64) {
        self.ks = ks;
    }

    pub fn flow_coefficient(&self) -> f64 {
        self.ks
    }

    /// Flow from side 1 to side 2.
    pub fn flow(&self, c1: f64, c2: f64, zc1: f64, zc2: f64) -> f64 {
        let ks = self.ks;
        let half_z = ks * (zc1 + zc2) / 2.0;
        let dc = c1 - c2;
        if dc > 0.0 {
            ks * ((half_z * half_z + dc).sqrt() - half_z)
        } else {
            ks * (half_z - (half_z * half_z - dc).sqrt())
        }
    }
}
