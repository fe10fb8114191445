//! Result data types.

use serde::{Deserialize, Serialize};
use tlm_core::Message;
use tlm_node::{PortBinding, VariableKind};
use tlm_system::{ComponentSystem, SimOptions, SimOutcome, SimulationReport};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub model_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub timestep: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub steps_taken: usize,
    pub outcome: SimOutcome,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl RunManifest {
    pub fn new(
        run_id: RunId,
        model_name: impl Into<String>,
        options: &SimOptions,
        report: &SimulationReport,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            run_id,
            model_name: model_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            timestep: options.timestep,
            start_time: options.start_time,
            stop_time: options.stop_time,
            steps_taken: report.steps_taken,
            outcome: report.outcome.clone(),
            messages,
        }
    }
}

/// Logged values of one port variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceSeries {
    pub component: String,
    pub port: String,
    pub variable: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Sub-port of a multiport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_index: Option<usize>,
    pub values: Vec<f64>,
}

impl TraceSeries {
    /// `component.port.variable`, with `[i]` after the port for sub-ports.
    pub fn name(&self) -> String {
        match self.sub_index {
            Some(i) => format!("{}.{}[{i}].{}", self.component, self.port, self.variable),
            None => format!("{}.{}.{}", self.component, self.port, self.variable),
        }
    }
}

/// Sample times plus every series logged against them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunTraces {
    pub time: Vec<f64>,
    pub series: Vec<TraceSeries>,
}

impl RunTraces {
    pub fn from_system(system: &ComponentSystem) -> Self {
        Self {
            time: system.log().time().to_vec(),
            series: collect_traces(system),
        }
    }

    pub fn find(&self, name: &str) -> Option<&TraceSeries> {
        self.series.iter().find(|s| s.name() == name)
    }
}

/// Every logged, non-hidden variable of every bound port. Multiport
/// sub-ports get one series each.
pub fn collect_traces(system: &ComponentSystem) -> Vec<TraceSeries> {
    let log = system.log();
    let mut out = Vec::new();
    for component in system.components() {
        for port in component.ports() {
            let nodes: Vec<_> = match port.binding() {
                PortBinding::Unbound => continue,
                PortBinding::Single(id) => vec![(None, *id)],
                PortBinding::Multi(ids) => ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| (Some(i), *id))
                    .collect(),
            };
            let node_type = &port.spec().node_type;
            for (sub_index, id) in nodes {
                for (offset, var) in node_type.variables().iter().enumerate() {
                    if var.kind == VariableKind::Hidden {
                        continue;
                    }
                    let Some(values) = log.series(id, offset) else {
                        continue;
                    };
                    out.push(TraceSeries {
                        component: component.name().to_string(),
                        port: port.name().to_string(),
                        variable: var.name.clone(),
                        unit: var.unit.clone(),
                        sub_index,
                        values,
                    });
                }
            }
        }
    }
    out
}
