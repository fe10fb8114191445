//! Simulation settings.

use serde::{Deserialize, Serialize};

use crate::error::{SystemError, SystemResult};

/// Settings for one run of a [`crate::ComponentSystem`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Fixed step (seconds)
    pub timestep: f64,
    pub start_time: f64,
    pub stop_time: f64,
    /// Requested number of logged samples, start and stop included
    pub log_samples: usize,
    /// Nothing is logged before this time
    pub log_start_time: f64,
    /// Step dependency levels on this many worker threads; `Some(0)` lets
    /// the pool pick, `None` steps serially
    pub parallel: Option<usize>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            timestep: 1e-3,
            start_time: 0.0,
            stop_time: 10.0,
            log_samples: 2048,
            log_start_time: 0.0,
            parallel: None,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SystemResult<()> {
        let invalid = |what: &str| {
            Err(SystemError::InvalidOption {
                what: what.to_string(),
            })
        };
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return invalid("timestep must be positive and finite");
        }
        if !self.start_time.is_finite() || !self.stop_time.is_finite() {
            return invalid("start and stop time must be finite");
        }
        if self.stop_time < self.start_time {
            return invalid("stop time is before start time");
        }
        if !self.log_start_time.is_finite() {
            return invalid("log start time must be finite");
        }
        Ok(())
    }

    /// Steps a run from start to stop takes.
    pub fn num_steps(&self) -> usize {
        tlm_core::num_steps(self.start_time, self.stop_time, self.timestep)
    }
}
