//! The component system: assembly, checks, ordering and the step loop.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tlm_components::{ComponentInstance, ParamValue, StepOutcome};
use tlm_core::{Message, MessageChannel, Real, Severity, num_steps};
use tlm_node::{NodeArena, Port, PortBinding, PortKind};
use tracing::{debug, info};

use crate::check::check_model;
use crate::error::{SystemError, SystemResult};
use crate::log::{LogPlan, NodeLog};
use crate::options::SimOptions;
use crate::schedule::{self, Schedule};
use crate::topology::{self, Connection, PortRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemState {
    /// Components and connections may be edited.
    Assembling,
    /// Initialized and ordered, no step taken yet.
    Ordered,
    Running,
    /// A component stopped the run.
    Stopped,
    /// The stop time given to initialize was reached.
    Finished,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SystemState::Assembling => "assembling",
            SystemState::Ordered => "ordered",
            SystemState::Running => "running",
            SystemState::Stopped => "stopped",
            SystemState::Finished => "finished",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimOutcome {
    Finished,
    Stopped {
        step: usize,
        time: Real,
        reason: String,
    },
}

/// What one call to [`ComponentSystem::simulate`] did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub steps_taken: usize,
    /// Simulation time after the last step.
    pub time: Real,
    pub outcome: SimOutcome,
}

impl SimulationReport {
    pub fn is_finished(&self) -> bool {
        self.outcome == SimOutcome::Finished
    }
}

/// A flat model: components, the connections between their ports, and the
/// nodes those connections induce.
#[derive(Debug)]
pub struct ComponentSystem {
    name: String,
    components: Vec<ComponentInstance>,
    connections: Vec<Connection>,
    nodes: NodeArena,
    timestep: Real,
    log_samples: usize,
    log_start_time: Real,
    parallel: Option<usize>,
    state: SystemState,
    time: Real,
    stop_time: Real,
    /// Steps taken since initialize
    steps: usize,
    schedule: Schedule,
    log: NodeLog,
    pool: Option<rayon::ThreadPool>,
    messages: MessageChannel,
}

impl Default for ComponentSystem {
    fn default() -> Self {
        Self::new("system")
    }
}

impl ComponentSystem {
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = SimOptions::default();
        Self {
            name: name.into(),
            components: Vec::new(),
            connections: Vec::new(),
            nodes: NodeArena::new(),
            timestep: defaults.timestep,
            log_samples: defaults.log_samples,
            log_start_time: defaults.log_start_time,
            parallel: defaults.parallel,
            state: SystemState::Assembling,
            time: 0.0,
            stop_time: 0.0,
            steps: 0,
            schedule: Schedule::default(),
            log: NodeLog::default(),
            pool: None,
            messages: MessageChannel::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn timestep(&self) -> Real {
        self.timestep
    }

    fn ensure_assembling(&self) -> SystemResult<()> {
        match self.state {
            SystemState::Assembling => Ok(()),
            state => Err(SystemError::NotAssembling { state }),
        }
    }

    pub fn set_timestep(&mut self, timestep: Real) -> SystemResult<()> {
        self.ensure_assembling()?;
        self.timestep = timestep;
        Ok(())
    }

    pub fn set_log_samples(&mut self, samples: usize, start_time: Real) -> SystemResult<()> {
        self.ensure_assembling()?;
        self.log_samples = samples;
        self.log_start_time = start_time;
        Ok(())
    }

    /// Step dependency levels on a worker pool; `None` steps serially.
    pub fn set_parallel(&mut self, threads: Option<usize>) -> SystemResult<()> {
        self.ensure_assembling()?;
        self.parallel = threads;
        Ok(())
    }

    /// Take timestep, log and parallel settings from `options`.
    pub fn apply_options(&mut self, options: &SimOptions) -> SystemResult<()> {
        options.validate()?;
        self.set_timestep(options.timestep)?;
        self.set_log_samples(options.log_samples, options.log_start_time)?;
        self.set_parallel(options.parallel)
    }

    // ---- assembly ----

    fn unique_name(&self, base: &str) -> String {
        let taken = |n: &str| self.components.iter().any(|c| c.name() == n);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{base}_{i}"))
            .find(|n| !taken(n))
            .unwrap_or_else(|| base.to_string())
    }

    /// Add a component, renaming it if its name is taken. Returns the name
    /// it got.
    pub fn add_component(&mut self, mut component: ComponentInstance) -> SystemResult<String> {
        self.ensure_assembling()?;
        let base = if component.name().is_empty() {
            component.type_name().to_string()
        } else {
            component.name().to_string()
        };
        let name = self.unique_name(&base);
        component.set_name(name.clone());
        debug!(system = %self.name, component = %name, "added component");
        self.components.push(component);
        Ok(name)
    }

    /// Remove a component and every connection it takes part in.
    pub fn remove_component(&mut self, name: &str) -> SystemResult<ComponentInstance> {
        self.ensure_assembling()?;
        let index = self.index_of(name)?;
        self.connections.retain(|c| !c.touches(name));
        let removed = self.components.remove(index);
        self.rebuild()?;
        debug!(system = %self.name, component = %name, "removed component");
        Ok(removed)
    }

    fn index_of(&self, name: &str) -> SystemResult<usize> {
        self.components
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| SystemError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub fn component(&self, name: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.name() == name)
    }

    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn log(&self) -> &NodeLog {
        &self.log
    }

    fn port(&self, at: &PortRef) -> SystemResult<&Port> {
        let comp = &self.components[self.index_of(&at.component)?];
        comp.port(&at.port).ok_or_else(|| SystemError::UnknownPort {
            component: at.component.clone(),
            port: at.port.clone(),
        })
    }

    fn rebuild(&mut self) -> SystemResult<()> {
        topology::rebuild(&mut self.components, &self.connections, &mut self.nodes)?;
        self.log = NodeLog::default();
        Ok(())
    }

    /// Connect `a.pa` to `b.pb`. Connecting to a multiport adds a sub-port.
    pub fn connect(&mut self, a: &str, pa: &str, b: &str, pb: &str) -> SystemResult<()> {
        self.ensure_assembling()?;
        let (from, to) = (PortRef::new(a, pa), PortRef::new(b, pb));
        let (pf, pt) = (self.port(&from)?, self.port(&to)?);
        if from == to {
            return Err(SystemError::SelfConnection {
                port: from.to_string(),
            });
        }
        let (tf, tt) = (pf.spec().node_type.name(), pt.spec().node_type.name());
        if tf != tt {
            return Err(SystemError::NodeTypeMismatch {
                from: from.to_string(),
                from_type: tf.to_string(),
                to: to.to_string(),
                to_type: tt.to_string(),
            });
        }
        let (kf, kt) = (pf.kind(), pt.kind());
        if kf.is_multi() && kt.is_multi() {
            return Err(SystemError::MultiPortPair {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if (kf == PortKind::Read && kt.is_multi()) || (kt == PortKind::Read && kf.is_multi()) {
            return Err(SystemError::ReadPortToMultiPort {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let shared = !kf.is_multi()
            && !kt.is_multi()
            && pf.nodes().iter().any(|n| pt.nodes().contains(n));
        if shared || self.connections.iter().any(|c| c.joins(&from, &to)) {
            return Err(SystemError::AlreadyConnected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        debug!(system = %self.name, %from, %to, "connect");
        self.connections.push(Connection { from, to });
        self.rebuild()
    }

    pub fn disconnect(&mut self, a: &str, pa: &str, b: &str, pb: &str) -> SystemResult<()> {
        self.ensure_assembling()?;
        let (from, to) = (PortRef::new(a, pa), PortRef::new(b, pb));
        let index = self
            .connections
            .iter()
            .position(|c| c.joins(&from, &to))
            .ok_or_else(|| SystemError::NotConnected {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.connections.remove(index);
        debug!(system = %self.name, %from, %to, "disconnect");
        self.rebuild()
    }

    pub fn set_parameter(
        &mut self,
        component: &str,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> SystemResult<()> {
        self.ensure_assembling()?;
        let index = self.index_of(component)?;
        self.components[index].set_parameter(name, value)?;
        Ok(())
    }

    // ---- lifecycle ----

    /// Check and order the model, then initialize every component in step
    /// order. On failure every component is finalized and the system goes
    /// back to assembling.
    pub fn initialize(&mut self, start_time: Real, stop_time: Real) -> SystemResult<()> {
        self.ensure_assembling()?;
        match self.prepare(start_time, stop_time) {
            Ok(()) => {
                self.state = SystemState::Ordered;
                info!(
                    system = %self.name,
                    components = self.components.len(),
                    nodes = self.nodes.len(),
                    "initialized"
                );
                Ok(())
            }
            Err(reason) => {
                self.messages.push(Message::error(
                    &self.name,
                    format!("Initialization failed: {reason}"),
                ));
                self.finalize_components();
                self.pool = None;
                Err(SystemError::InitializationFailed { reason })
            }
        }
    }

    fn prepare(&mut self, start_time: Real, stop_time: Real) -> Result<(), String> {
        if !start_time.is_finite() || !stop_time.is_finite() || stop_time < start_time {
            return Err(format!("invalid time range [{start_time}, {stop_time}]"));
        }
        self.rebuild().map_err(|e| e.to_string())?;

        let members = topology::members(&self.components, self.nodes.len());
        let found = check_model(&self.name, &self.components, &members, self.timestep);
        let errors = found.iter().filter(|m| m.severity >= Severity::Error).count();
        self.messages.extend(found);
        if errors > 0 {
            return Err(format!("the model check found {errors} error(s)"));
        }

        let dummies = topology::add_dummy_nodes(&mut self.components, &mut self.nodes)
            .map_err(|e| e.to_string())?;
        topology::load_start_values(&self.components, &self.nodes);
        debug!(system = %self.name, dummies, "created dummy nodes");

        let mut warnings = Vec::new();
        let ordered = schedule::build(&self.name, &self.components, &mut warnings);
        self.messages.extend(warnings);
        self.schedule = ordered.map_err(|lp| lp.message())?;

        let plan = LogPlan::new(
            start_time,
            stop_time,
            self.timestep,
            self.log_start_time,
            self.log_samples,
        );
        if let Some(requested) = plan.limited_from {
            self.messages.push(
                Message::warning(
                    &self.name,
                    format!(
                        "Requested {requested} log samples but the run only has {}, logging {}",
                        num_steps(start_time, stop_time, self.timestep) + 1,
                        plan.len()
                    ),
                )
                .with_tag("toofewsamples"),
            );
        }
        self.log = NodeLog::new(&self.nodes, plan);

        self.pool = match self.parallel {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| e.to_string())?,
            ),
            None => None,
        };

        self.time = start_time;
        self.stop_time = stop_time;
        self.steps = 0;
        let order: Vec<usize> = self.schedule.order().collect();
        for i in order {
            let comp = &mut self.components[i];
            let result = comp.initialize(&self.nodes, start_time, self.timestep);
            self.messages.extend(comp.drain_messages());
            if let Err(e) = result {
                self.messages.push(Message::error(comp.name(), e.to_string()));
                return Err(format!("{}: {e}", comp.name()));
            }
        }
        self.log.log_step(0, start_time, &self.nodes);
        Ok(())
    }

    /// Step from `start_time` to `stop_time`. `start_time` must be the
    /// current time; repeated calls continue where the last one ended.
    pub fn simulate(&mut self, start_time: Real, stop_time: Real) -> SystemResult<SimulationReport> {
        match self.state {
            SystemState::Ordered | SystemState::Running | SystemState::Finished => {}
            SystemState::Stopped => return Err(SystemError::Halted),
            state => return Err(SystemError::NotInitialized { state }),
        }
        if (start_time - self.time).abs() > self.timestep / 2.0 {
            return Err(SystemError::StartTimeMismatch {
                requested: start_time,
                current: self.time,
            });
        }
        let n = num_steps(self.time, stop_time, self.timestep);
        self.state = SystemState::Running;

        for taken in 1..=n {
            self.time += self.timestep;
            self.steps += 1;
            let stop = self.step_all();
            self.log.log_step(self.steps, self.time, &self.nodes);
            self.drain_component_messages();
            if let Some(reason) = stop {
                self.messages.push(Message::error(
                    &self.name,
                    format!("Simulation was stopped at t={} : {reason}", self.time),
                ));
                self.state = SystemState::Stopped;
                return Ok(SimulationReport {
                    steps_taken: taken,
                    time: self.time,
                    outcome: SimOutcome::Stopped {
                        step: self.steps,
                        time: self.time,
                        reason,
                    },
                });
            }
        }
        if self.time >= self.stop_time - self.timestep / 2.0 {
            self.state = SystemState::Finished;
        }
        Ok(SimulationReport {
            steps_taken: n,
            time: self.time,
            outcome: SimOutcome::Finished,
        })
    }

    /// One sweep over all components; the first stop reason in step order.
    fn step_all(&mut self) -> Option<String> {
        let Self {
            components,
            nodes,
            schedule,
            pool,
            time,
            ..
        } = self;
        let time = *time;
        match pool {
            None => {
                let mut stop = None;
                for i in schedule.order() {
                    if let StepOutcome::Stop(reason) = components[i].step(nodes, time) {
                        stop.get_or_insert(reason);
                    }
                }
                stop
            }
            Some(pool) => step_levels(pool, components, nodes, schedule, time),
        }
    }

    fn drain_component_messages(&mut self) {
        let Self {
            components,
            schedule,
            messages,
            ..
        } = self;
        for i in schedule.order() {
            if components[i].has_messages() {
                messages.extend(components[i].drain_messages());
            }
        }
    }

    fn finalize_components(&mut self) {
        for c in &mut self.components {
            c.finalize();
            self.messages.extend(c.drain_messages());
        }
    }

    /// Finalize every component once and return to assembling. The log and
    /// node values stay readable until the next topology change.
    pub fn finalize(&mut self) {
        if self.state == SystemState::Assembling {
            return;
        }
        self.finalize_components();
        self.pool = None;
        self.state = SystemState::Assembling;
        info!(system = %self.name, steps = self.steps, time = self.time, "finalized");
    }

    /// Initialize, simulate and finalize with `options`. Finalize runs even
    /// when simulation fails.
    pub fn run(&mut self, options: &SimOptions) -> SystemResult<SimulationReport> {
        self.apply_options(options)?;
        self.initialize(options.start_time, options.stop_time)?;
        let report = self.simulate(options.start_time, options.stop_time);
        self.finalize();
        report
    }

    // ---- port access ----

    fn port_variable(
        &self,
        component: &str,
        port: &str,
        variable: &str,
    ) -> SystemResult<(&Port, usize)> {
        let p = self.port(&PortRef::new(component, port))?;
        let offset = p.spec().node_type.offset_of(variable).ok_or_else(|| {
            SystemError::UnknownVariable {
                component: component.to_string(),
                port: port.to_string(),
                variable: variable.to_string(),
            }
        })?;
        Ok((p, offset))
    }

    /// Current value of a port variable.
    pub fn port_value(&self, component: &str, port: &str, variable: &str) -> SystemResult<Real> {
        let (p, offset) = self.port_variable(component, port, variable)?;
        Ok(p.read_node(&self.nodes, offset)?)
    }

    /// Overwrite a port variable between steps. Read ports refuse.
    pub fn write_port_value(
        &self,
        component: &str,
        port: &str,
        variable: &str,
        value: Real,
    ) -> SystemResult<()> {
        let (p, offset) = self.port_variable(component, port, variable)?;
        p.write_node(&self.nodes, offset, value)?;
        Ok(())
    }

    /// Logged values of a port variable. Multiports take a sub-port index,
    /// defaulting to the first.
    pub fn port_trace(
        &self,
        component: &str,
        port: &str,
        variable: &str,
        sub_index: Option<usize>,
    ) -> SystemResult<Vec<Real>> {
        let (p, offset) = self.port_variable(component, port, variable)?;
        let not_logged = || SystemError::NotLogged {
            component: component.to_string(),
            port: port.to_string(),
        };
        let node = match p.binding() {
            PortBinding::Single(id) => *id,
            PortBinding::Multi(subs) => {
                let index = sub_index.unwrap_or(0);
                *subs.get(index).ok_or_else(|| SystemError::NoSuchSubPort {
                    component: component.to_string(),
                    port: port.to_string(),
                    index,
                })?
            }
            PortBinding::Unbound => return Err(not_logged()),
        };
        self.log.series(node, offset).ok_or_else(not_logged)
    }

    // ---- messages ----

    pub fn messages(&self) -> &[Message] {
        self.messages.messages()
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        self.messages.take()
    }

    pub fn message_count(&self, severity: Severity) -> usize {
        self.messages.count(severity)
    }

    pub fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }
}

/// Step level by level on `pool`. Components on one level run concurrently;
/// the stop reason kept is the first in step order.
fn step_levels(
    pool: &rayon::ThreadPool,
    components: &mut [ComponentInstance],
    nodes: &NodeArena,
    schedule: &Schedule,
    time: Real,
) -> Option<String> {
    let (level_of, position) = (schedule.level_of(), schedule.position());
    let mut first: Option<(usize, String)> = None;
    for level in 0..schedule.num_levels() {
        let stopped = pool.install(|| {
            components
                .par_iter_mut()
                .enumerate()
                .filter(|(i, _)| level_of[*i] == level)
                .filter_map(|(i, c)| match c.step(nodes, time) {
                    StepOutcome::Stop(reason) => Some((position[i], reason)),
                    StepOutcome::Continue => None,
                })
                .min_by_key(|(pos, _)| *pos)
        });
        if let Some((pos, reason)) = stopped {
            if first.as_ref().is_none_or(|(p, _)| pos < *p) {
                first = Some((pos, reason));
            }
        }
    }
    first.map(|(_, reason)| reason)
}
