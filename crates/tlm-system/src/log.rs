//! Selection of logged steps and storage of logged node values.

use tlm_core::{NodeId, Real};
use tlm_node::NodeArena;

/// Simulation steps to log, step 0 being the state after initialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogPlan {
    steps: Vec<usize>,
    /// Requested sample count when it had to be reduced.
    pub limited_from: Option<usize>,
}

impl LogPlan {
    /// Spread `requested` samples evenly over `[max(start, log_start), stop]`,
    /// each on the nearest simulation step.
    pub fn new(start: Real, stop: Real, timestep: Real, log_start: Real, requested: usize) -> Self {
        let first = start.max(log_start).min(stop);
        let available = ((stop - first) / timestep + 1.0).max(0.0) as usize;
        let slots = requested.min(available);
        let limited_from = (slots != requested).then_some(requested);
        if slots == 0 {
            return Self {
                steps: Vec::new(),
                limited_from,
            };
        }

        let log_dt = if slots > 1 {
            (stop - first) / (slots - 1) as Real
        } else {
            0.0
        };
        let nearest = |span: Real| (span / timestep + 0.5).max(0.0) as usize;
        let mut steps = Vec::with_capacity(slots);
        let mut log_t = first;
        let mut n = nearest(log_t - start);
        let mut sim_t = start + n as Real * timestep;
        steps.push(n);
        while steps.len() < slots {
            log_t += log_dt;
            let dn = nearest(log_t - sim_t);
            sim_t += dn as Real * timestep;
            n += dn;
            steps.push(n);
        }
        steps.dedup();
        Self {
            steps,
            limited_from,
        }
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Time and the full slot vector of every node, per logged sample.
#[derive(Clone, Debug, Default)]
pub struct NodeLog {
    /// First column of each node in a row.
    offsets: Vec<usize>,
    widths: Vec<usize>,
    row: usize,
    time: Vec<Real>,
    data: Vec<Real>,
    plan: LogPlan,
    cursor: usize,
}

impl NodeLog {
    /// Empty log with room for the planned samples of `nodes`.
    pub fn new(nodes: &NodeArena, plan: LogPlan) -> Self {
        let mut offsets = Vec::with_capacity(nodes.len());
        let mut widths = Vec::with_capacity(nodes.len());
        let mut row = 0;
        for (_, node) in nodes.iter() {
            offsets.push(row);
            widths.push(node.len());
            row += node.len();
        }
        Self {
            offsets,
            widths,
            row,
            time: Vec::with_capacity(plan.len()),
            data: Vec::with_capacity(plan.len() * row),
            plan,
            cursor: 0,
        }
    }

    /// Record the nodes if `step` is planned. Returns whether it logged.
    pub fn log_step(&mut self, step: usize, time: Real, nodes: &NodeArena) -> bool {
        match self.plan.steps.get(self.cursor) {
            Some(&planned) if planned <= step => {
                while self.plan.steps.get(self.cursor).is_some_and(|&s| s <= step) {
                    self.cursor += 1;
                }
                self.time.push(time);
                nodes.snapshot_into(&mut self.data);
                true
            }
            _ => false,
        }
    }

    pub fn plan(&self) -> &LogPlan {
        &self.plan
    }

    pub fn time(&self) -> &[Real] {
        &self.time
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn num_nodes(&self) -> usize {
        self.offsets.len()
    }

    fn column(&self, node: NodeId, offset: usize) -> Option<usize> {
        let i = node.slot();
        (offset < *self.widths.get(i)?).then(|| self.offsets[i] + offset)
    }

    /// One value of one recorded sample.
    pub fn value(&self, sample: usize, node: NodeId, offset: usize) -> Option<Real> {
        let col = self.column(node, offset)?;
        (sample < self.len()).then(|| self.data[sample * self.row + col])
    }

    /// Every recorded value of one slot.
    pub fn series(&self, node: NodeId, offset: usize) -> Option<Vec<Real>> {
        let col = self.column(node, offset)?;
        Some(
            self.data
                .chunks_exact(self.row)
                .map(|row| row[col])
                .collect(),
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn plan_stays_inside_the_run(
            steps in 1usize..2000,
            requested in 0usize..3000,
            ts in 1e-4_f64..1e-1,
        ) {
            let stop = steps as f64 * ts;
            let plan = LogPlan::new(0.0, stop, ts, 0.0, requested);
            prop_assert!(plan.len() <= requested.min(steps + 1));
            prop_assert!(plan.steps().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(plan.steps().iter().all(|&s| s <= steps));
        }
    }
}
