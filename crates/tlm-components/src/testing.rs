//! Minimal wiring bench for component unit tests.

use tlm_core::{NodeId, Real};
use tlm_node::{Node, NodeArena, PortBinding, Slot};

use crate::component::{Component, ComponentInstance, StepOutcome};
use crate::error::ComponentResult;
use crate::parameter::ParamValue;
use crate::registry::ComponentRegistry;

pub(crate) struct Rig {
    pub registry: ComponentRegistry,
    pub nodes: NodeArena,
    pub comps: Vec<ComponentInstance>,
    pub timestep: Real,
    pub time: Real,
}

impl Rig {
    pub fn new(timestep: Real) -> Self {
        Self {
            registry: ComponentRegistry::with_builtin(),
            nodes: NodeArena::new(),
            comps: Vec::new(),
            timestep,
            time: 0.0,
        }
    }

    pub fn add(&mut self, key: &str) -> usize {
        let name = format!("{key}_{}", self.comps.len());
        self.comps.push(self.registry.create(key, &name).unwrap());
        self.comps.len() - 1
    }

    pub fn add_model(&mut self, name: &str, model: Box<dyn Component>) -> usize {
        let inst = ComponentInstance::new(
            name,
            name,
            model,
            self.registry.node_types().clone(),
        )
        .unwrap();
        self.comps.push(inst);
        self.comps.len() - 1
    }

    pub fn set(&mut self, comp: usize, name: &str, value: impl Into<ParamValue>) {
        self.comps[comp].set_parameter(name, value).unwrap();
    }

    /// Put every listed port on one fresh node.
    pub fn connect(&mut self, ends: &[(usize, &str)]) -> NodeId {
        let (c0, p0) = ends[0];
        let ty = self.comps[c0].port(p0).unwrap().spec().node_type.clone();
        let id = self.nodes.push(Node::new(ty)).unwrap();
        for &(c, p) in ends {
            self.bind(c, p, id);
        }
        id
    }

    fn bind(&mut self, comp: usize, port: &str, id: NodeId) {
        let port = self.comps[comp].port_mut(port).unwrap();
        let binding = match port.binding().clone() {
            PortBinding::Multi(mut v) => {
                v.push(id);
                PortBinding::Multi(v)
            }
            _ => PortBinding::Single(id),
        };
        port.bind(binding);
    }

    /// Dummy nodes for optional ports, start values, then initialize in
    /// S, C, Q order.
    pub fn initialize(&mut self) -> ComponentResult<()> {
        for c in 0..self.comps.len() {
            let unbound: Vec<String> = self.comps[c]
                .ports()
                .iter()
                .filter(|p| !p.is_connected() && !p.kind().is_multi() && !p.spec().is_required())
                .map(|p| p.name().to_string())
                .collect();
            for name in unbound {
                let ty = self.comps[c].port(&name).unwrap().spec().node_type.clone();
                let id = self.nodes.push(Node::new_dummy(ty)).unwrap();
                self.bind(c, &name, id);
            }
        }
        for (id, node) in self.nodes.iter() {
            let sets: Vec<&[Option<Real>]> = self
                .comps
                .iter()
                .flat_map(|c| c.ports())
                .filter(|p| p.nodes().contains(&id) && (node.is_dummy() || !p.kind().is_read()))
                .map(|p| p.spec().start_values.as_slice())
                .collect();
            node.load_start_values(sets);
        }
        for c in self.order() {
            self.comps[c].initialize(&self.nodes, self.time, self.timestep)?;
        }
        Ok(())
    }

    fn order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.comps.len()).collect();
        order.sort_by_key(|&c| self.comps[c].cqs_type());
        order
    }

    /// One step; the first stop reason, if any.
    pub fn step(&mut self) -> Option<String> {
        self.time += self.timestep;
        let mut stop = None;
        for c in self.order() {
            if let StepOutcome::Stop(reason) = self.comps[c].step(&self.nodes, self.time) {
                stop.get_or_insert(reason);
            }
        }
        stop
    }

    pub fn read(&self, comp: usize, port: &str, offset: usize) -> Real {
        self.comps[comp]
            .port(port)
            .unwrap()
            .read_node(&self.nodes, offset)
            .unwrap()
    }

    pub fn write(&self, node: NodeId, offset: usize, value: Real) {
        self.nodes.write(self.slot(node, offset), value);
    }

    pub fn value(&self, node: NodeId, offset: usize) -> Real {
        self.nodes.read(self.slot(node, offset))
    }

    fn slot(&self, node: NodeId, offset: usize) -> Slot {
        self.nodes.slot(node, offset).unwrap()
    }

    pub fn messages(&mut self, comp: usize) -> Vec<String> {
        self.comps[comp].drain_messages().map(|m| m.text).collect()
    }
}
