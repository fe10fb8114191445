//! Integration tests for node/port binding.

use tlm_node::{
    NODE_HYDRAULIC, NODE_SIGNAL, NodeArena, NodeTypeRegistry, Port, PortBinding, PortKind,
    PortSpec, Requirement, hydraulic,
};

#[test]
fn c_and_q_ports_share_one_node() {
    let reg = NodeTypeRegistry::with_builtin();
    let hyd = reg.get(NODE_HYDRAULIC).unwrap();
    let mut nodes = NodeArena::new();
    let id = nodes.push(reg.create_node(NODE_HYDRAULIC).unwrap()).unwrap();

    let mut c_port = Port::new(PortSpec::new(
        "P1",
        hyd.clone(),
        PortKind::Power,
        Requirement::Required,
    ));
    let mut q_port = Port::new(PortSpec::new(
        "P1",
        hyd,
        PortKind::Power,
        Requirement::Required,
    ));
    c_port.bind(PortBinding::Single(id));
    q_port.bind(PortBinding::Single(id));

    let c = c_port.slot(&nodes, hydraulic::WAVE_VARIABLE).unwrap();
    let zc = c_port.slot(&nodes, hydraulic::CHAR_IMPEDANCE).unwrap();
    nodes.write(c, 2.0e5);
    nodes.write(zc, 1.0e9);

    let q_c = q_port.read_slot(&nodes, hydraulic::WAVE_VARIABLE).unwrap();
    let q_zc = q_port.read_slot(&nodes, hydraulic::CHAR_IMPEDANCE).unwrap();
    assert_eq!(nodes.read(q_c), 2.0e5);
    assert_eq!(nodes.read(q_zc), 1.0e9);
}

#[test]
fn multiport_sums_in_insertion_order() {
    let reg = NodeTypeRegistry::with_builtin();
    let sig = reg.get(NODE_SIGNAL).unwrap();
    let mut nodes = NodeArena::new();
    let mut ids = Vec::new();
    for v in [2.0, -1.0, 4.5] {
        let id = nodes.push(reg.create_node(NODE_SIGNAL).unwrap()).unwrap();
        nodes.write(nodes.slot(id, 0).unwrap(), v);
        ids.push(id);
    }
    let mut port = Port::new(PortSpec::new(
        "in",
        sig,
        PortKind::ReadMulti,
        Requirement::NotRequired,
    ));
    port.bind(PortBinding::Multi(ids.clone()));

    let slots: Vec<_> = (0..port.num_ports())
        .map(|i| port.multi_read_slot(&nodes, i, 0).unwrap())
        .collect();
    let order: Vec<_> = slots.iter().map(|s| s.node()).collect();
    assert_eq!(order, ids);
    let sum: f64 = slots.iter().map(|s| nodes.read(*s)).sum();
    assert_eq!(sum, 5.5);
}
