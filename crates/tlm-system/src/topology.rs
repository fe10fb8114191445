//! Connections and the nodes they induce.
//!
//! Nodes are never edited in place. After every topology change the arena is
//! rebuilt from the connection list: each connected group of port ends
//! becomes one node, numbered by the first connection that touches it, and
//! every port is rebound. Each connection to a multiport creates a fresh
//! sub-port, so sub-ports follow connection insertion order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tlm_components::ComponentInstance;
use tlm_core::{NodeId, Real};
use tlm_node::{Node, NodeArena, PortBinding, PortKind};

use crate::error::{SystemError, SystemResult};

/// `component.port`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub component: String,
    pub port: String,
}

impl PortRef {
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
}

impl Connection {
    /// True if this connection joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &PortRef, b: &PortRef) -> bool {
        (&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
    }

    pub fn touches(&self, component: &str) -> bool {
        self.from.component == component || self.to.component == component
    }
}

/// One port bound to a node.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Member {
    pub comp: usize,
    pub port: usize,
    pub kind: PortKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct End {
    comp: usize,
    port: usize,
    /// Owning connection for a multiport sub-port.
    sub: Option<usize>,
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

fn resolve(
    index: &HashMap<String, usize>,
    components: &[ComponentInstance],
    end: &PortRef,
    connection: usize,
) -> SystemResult<End> {
    let &comp = index
        .get(&end.component)
        .ok_or_else(|| SystemError::UnknownComponent {
            name: end.component.clone(),
        })?;
    let ports = components[comp].ports();
    let port = ports
        .iter()
        .position(|p| p.name() == end.port)
        .ok_or_else(|| SystemError::UnknownPort {
            component: end.component.clone(),
            port: end.port.clone(),
        })?;
    let sub = ports[port].kind().is_multi().then_some(connection);
    Ok(End { comp, port, sub })
}

/// Rebuild `nodes` from `connections` and rebind every port.
pub(crate) fn rebuild(
    components: &mut [ComponentInstance],
    connections: &[Connection],
    nodes: &mut NodeArena,
) -> SystemResult<()> {
    nodes.clear();
    for c in components.iter_mut() {
        for p in c.ports_mut() {
            p.unbind();
        }
    }

    let index: HashMap<String, usize> = components
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name().to_string(), i))
        .collect();
    let mut ends: Vec<End> = Vec::new();
    let mut interned: HashMap<End, usize> = HashMap::new();
    let mut pairs = Vec::with_capacity(connections.len());
    for (i, conn) in connections.iter().enumerate() {
        let mut intern = |end: End| {
            *interned.entry(end).or_insert_with(|| {
                ends.push(end);
                ends.len() - 1
            })
        };
        let a = intern(resolve(&index, components, &conn.from, i)?);
        let b = intern(resolve(&index, components, &conn.to, i)?);
        pairs.push((a, b));
    }

    let mut sets = UnionFind::new(ends.len());
    for &(a, b) in &pairs {
        sets.union(a, b);
    }

    let mut node_of_root: HashMap<usize, NodeId> = HashMap::new();
    for &(a, b) in &pairs {
        for e in [a, b] {
            let root = sets.find(e);
            if node_of_root.contains_key(&root) {
                continue;
            }
            let end = ends[e];
            let ty = components[end.comp].ports()[end.port].spec().node_type.clone();
            node_of_root.insert(root, nodes.push(Node::new(ty))?);
        }
    }

    for (e, end) in ends.iter().enumerate() {
        let id = node_of_root[&sets.find(e)];
        let port = &mut components[end.comp].ports_mut()[end.port];
        let binding = match (end.sub, port.binding().clone()) {
            (Some(_), PortBinding::Multi(mut subs)) => {
                subs.push(id);
                PortBinding::Multi(subs)
            }
            (Some(_), _) => PortBinding::Multi(vec![id]),
            (None, _) => PortBinding::Single(id),
        };
        port.bind(binding);
    }
    Ok(())
}

/// Give every unbound optional single port a node of its own.
pub(crate) fn add_dummy_nodes(
    components: &mut [ComponentInstance],
    nodes: &mut NodeArena,
) -> SystemResult<usize> {
    let mut count = 0;
    for c in components.iter_mut() {
        for p in c.ports_mut() {
            if p.is_connected() || p.kind().is_multi() || p.spec().is_required() {
                continue;
            }
            let id = nodes.push(Node::new_dummy(p.spec().node_type.clone()))?;
            p.bind(PortBinding::Single(id));
            count += 1;
        }
    }
    Ok(count)
}

/// Ports bound to each node, in component then port order.
pub(crate) fn members(components: &[ComponentInstance], num_nodes: usize) -> Vec<Vec<Member>> {
    let mut per_node = vec![Vec::new(); num_nodes];
    for (comp, c) in components.iter().enumerate() {
        for (port, p) in c.ports().iter().enumerate() {
            for id in p.nodes() {
                if let Some(list) = per_node.get_mut(id.slot()) {
                    list.push(Member {
                        comp,
                        port,
                        kind: p.kind(),
                    });
                }
            }
        }
    }
    per_node
}

/// Reset every node and apply the start values of the ports bound to it.
///
/// A connected read port leaves the node to its writer; on a dummy node its
/// start values are the defaults it reads.
pub(crate) fn load_start_values(components: &[ComponentInstance], nodes: &NodeArena) {
    let mut sets: Vec<Vec<&[Option<Real>]>> = vec![Vec::new(); nodes.len()];
    for c in components {
        for p in c.ports() {
            for id in p.nodes() {
                let dummy = nodes.get(id).is_some_and(Node::is_dummy);
                if p.kind().is_read() && !dummy {
                    continue;
                }
                if let Some(list) = sets.get_mut(id.slot()) {
                    list.push(p.spec().start_values.as_slice());
                }
            }
        }
    }
    for ((_, node), starts) in nodes.iter().zip(sets) {
        node.load_start_values(starts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlm_components::ComponentRegistry;

    fn parts(keys: &[(&str, &str)]) -> Vec<ComponentInstance> {
        let reg = ComponentRegistry::with_builtin();
        keys.iter()
            .map(|(key, name)| reg.create(key, name).unwrap())
            .collect()
    }

    fn conn(a: &str, pa: &str, b: &str, pb: &str) -> Connection {
        Connection {
            from: PortRef::new(a, pa),
            to: PortRef::new(b, pb),
        }
    }

    #[test]
    fn chained_connections_share_one_node() {
        let mut comps = parts(&[
            ("SignalConstant", "c"),
            ("SignalGain", "g1"),
            ("SignalGain", "g2"),
        ]);
        let conns = [conn("c", "out", "g1", "in"), conn("g2", "in", "c", "out")];
        let mut nodes = NodeArena::new();
        rebuild(&mut comps, &conns, &mut nodes).unwrap();
        assert_eq!(nodes.len(), 1);
        let id = NodeId::from_index(0);
        assert_eq!(comps[1].port("in").unwrap().binding(), &PortBinding::Single(id));
        assert_eq!(comps[2].port("in").unwrap().binding(), &PortBinding::Single(id));
        assert!(!comps[1].port("out").unwrap().is_connected());
    }

    #[test]
    fn multiport_gets_one_sub_port_per_connection() {
        let mut comps = parts(&[
            ("SignalConstant", "a"),
            ("SignalConstant", "b"),
            ("SignalSum", "sum"),
        ]);
        let conns = [
            conn("b", "out", "sum", "in"),
            conn("a", "out", "sum", "in"),
        ];
        let mut nodes = NodeArena::new();
        rebuild(&mut comps, &conns, &mut nodes).unwrap();
        let port = comps[2].port("in").unwrap();
        assert_eq!(port.num_ports(), 2);
        let b = comps[1].port("out").unwrap().nodes()[0];
        let a = comps[0].port("out").unwrap().nodes()[0];
        assert_eq!(port.nodes(), vec![b, a]);
    }

    #[test]
    fn dummies_only_for_optional_single_ports() {
        let mut comps = parts(&[("SignalSum", "sum"), ("HydraulicPressureSensor", "s")]);
        let mut nodes = NodeArena::new();
        rebuild(&mut comps, &[], &mut nodes).unwrap();
        let added = add_dummy_nodes(&mut comps, &mut nodes).unwrap();
        // sum.out and s.out; the multiport and the required sensor port stay unbound
        assert_eq!(added, 2);
        assert!(nodes.iter().all(|(_, n)| n.is_dummy()));
        assert!(!comps[0].port("in").unwrap().is_connected());
        assert!(!comps[1].port("P1").unwrap().is_connected());
    }

    #[test]
    fn writer_sets_the_start_value_of_a_shared_node() {
        let mut comps = parts(&[("SignalConstant", "a"), ("SignalGain", "g")]);
        comps[0].set_parameter("out#Value", 2.0).unwrap();
        comps[1].set_parameter("in", 3.0).unwrap();
        let mut nodes = NodeArena::new();
        rebuild(&mut comps, &[conn("a", "out", "g", "in")], &mut nodes).unwrap();
        add_dummy_nodes(&mut comps, &mut nodes).unwrap();
        load_start_values(&comps, &nodes);
        assert_eq!(nodes.node(NodeId::from_index(0)).unwrap().value(0), Some(2.0));

        let mut alone = parts(&[("SignalGain", "g")]);
        alone[0].set_parameter("in", 3.0).unwrap();
        let mut nodes = NodeArena::new();
        rebuild(&mut alone, &[], &mut nodes).unwrap();
        add_dummy_nodes(&mut alone, &mut nodes).unwrap();
        load_start_values(&alone, &nodes);
        let input = alone[0].port("in").unwrap().nodes()[0];
        assert_eq!(nodes.node(input).unwrap().value(0), Some(3.0));
    }

    #[test]
    fn unknown_port_is_reported() {
        let mut comps = parts(&[("SignalConstant", "a"), ("SignalGain", "g")]);
        let mut nodes = NodeArena::new();
        let err = rebuild(&mut comps, &[conn("a", "nope", "g", "in")], &mut nodes).unwrap_err();
        assert!(matches!(err, SystemError::UnknownPort { .. }));
    }
}
