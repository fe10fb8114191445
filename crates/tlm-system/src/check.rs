//! Model checks run before anything is initialized.

use tlm_components::{ComponentInstance, CqsType};
use tlm_core::{Message, Real};
use tlm_node::PortKind;

use crate::topology::Member;

/// Smallest timestep accepted.
pub const MIN_TIMESTEP: Real = 10.0 * f64::MIN_POSITIVE;

/// Structural problems with the assembled model, errors and warnings mixed.
///
/// `members` lists the ports bound to each connection node; dummy nodes are
/// not created yet.
pub(crate) fn check_model(
    system: &str,
    components: &[ComponentInstance],
    members: &[Vec<Member>],
    timestep: Real,
) -> Vec<Message> {
    let mut found = Vec::new();

    if !timestep.is_finite() {
        found.push(Message::error(system, format!("The timestep {timestep} is not finite")));
    } else if timestep < MIN_TIMESTEP {
        found.push(Message::error(system, "The timestep is too low"));
    }

    for c in components {
        for p in c.ports() {
            if p.spec().is_required() && !p.is_connected() {
                found.push(Message::error(
                    c.name(),
                    format!("Port {} is not connected", p.name()),
                ));
            }
        }
    }

    let label = |m: &Member| {
        let c = &components[m.comp];
        format!("{}.{}", c.name(), c.ports()[m.port].name())
    };

    for list in members {
        let power: Vec<&Member> = list.iter().filter(|m| m.kind.is_power()).collect();
        if let [only] = power.as_slice() {
            found.push(Message::error(
                components[only.comp].name(),
                format!(
                    "Port {} is connected to a node with only one power port",
                    components[only.comp].ports()[only.port].name()
                ),
            ));
        } else if power.len() > 1 {
            let names: Vec<String> = power.iter().map(|m| label(m)).collect();
            let joined = names.join(", ");
            let count = |t: CqsType| {
                power
                    .iter()
                    .filter(|m| components[m.comp].cqs_type() == t)
                    .count()
            };
            let (cs, qs) = (count(CqsType::C), count(CqsType::Q));
            // Both sides of a power node write their own slots every step.
            if power.len() > 2 {
                found.push(Message::error(
                    system,
                    format!("Node joining {joined} has more than two power ports"),
                ));
            }
            if cs > 1 {
                found.push(Message::error(
                    system,
                    format!("Node joining {joined} has more than one C component"),
                ));
            }
            if qs > 1 {
                found.push(Message::error(
                    system,
                    format!("Node joining {joined} has more than one Q component"),
                ));
            }
            if power.len() == 2 && cs <= 1 && qs <= 1 && (cs == 0 || qs == 0) {
                let side = if cs == 0 { "C" } else { "Q" };
                found.push(Message::warning(
                    system,
                    format!("Node joining {joined} has no {side} component"),
                ));
            }
        }

        let writers: Vec<String> = list
            .iter()
            .filter(|m| m.kind == PortKind::Write)
            .map(label)
            .collect();
        if writers.len() > 1 {
            found.push(Message::error(
                system,
                format!("Node written by {} has more than one writer", writers.join(" and ")),
            ));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlm_components::ComponentRegistry;
    use tlm_core::Severity;
    use tlm_node::NodeArena;

    use crate::topology::{Connection, PortRef, members, rebuild};

    fn check(keys: &[(&str, &str)], conns: &[(&str, &str, &str, &str)], ts: Real) -> Vec<Message> {
        let reg = ComponentRegistry::with_builtin();
        let mut comps: Vec<_> = keys
            .iter()
            .map(|(key, name)| reg.create(key, name).unwrap())
            .collect();
        let conns: Vec<Connection> = conns
            .iter()
            .map(|(a, pa, b, pb)| Connection {
                from: PortRef::new(*a, *pa),
                to: PortRef::new(*b, *pb),
            })
            .collect();
        let mut nodes = NodeArena::new();
        rebuild(&mut comps, &conns, &mut nodes).unwrap();
        let members = members(&comps, nodes.len());
        check_model("sys", &comps, &members, ts)
    }

    fn errors(found: &[Message]) -> Vec<&str> {
        found
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .map(|m| m.text.as_str())
            .collect()
    }

    #[test]
    fn valid_circuit_passes() {
        let found = check(
            &[
                ("HydraulicPressureSourceC", "src"),
                ("HydraulicLaminarOrifice", "ori"),
                ("HydraulicTankC", "tank"),
            ],
            &[("src", "P1", "ori", "P1"), ("ori", "P2", "tank", "P1")],
            1e-3,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn unconnected_required_port() {
        let found = check(&[("HydraulicLaminarOrifice", "ori")], &[], 1e-3);
        assert_eq!(errors(&found), ["Port P1 is not connected", "Port P2 is not connected"]);
        assert_eq!(found[0].source, "ori");
    }

    #[test]
    fn lone_power_port_on_a_node() {
        let found = check(
            &[("HydraulicLaminarOrifice", "ori"), ("HydraulicPressureSensor", "s")],
            &[("ori", "P1", "s", "P1")],
            1e-3,
        );
        assert!(
            errors(&found).contains(&"Port P1 is connected to a node with only one power port")
        );
    }

    #[test]
    fn two_writers_on_one_node() {
        let found = check(
            &[
                ("SignalConstant", "a"),
                ("SignalConstant", "b"),
                ("SignalSink", "sink"),
            ],
            &[("a", "out", "sink", "in"), ("b", "out", "a", "out")],
            1e-3,
        );
        assert_eq!(errors(&found), ["Node written by a.out and b.out has more than one writer"]);
    }

    #[test]
    fn two_c_components_on_one_node() {
        let found = check(
            &[("HydraulicPressureSourceC", "a"), ("HydraulicTankC", "b")],
            &[("a", "P1", "b", "P1")],
            1e-3,
        );
        assert_eq!(
            errors(&found),
            ["Node joining a.P1, b.P1 has more than one C component"]
        );
    }

    #[test]
    fn two_q_components_on_one_node() {
        let found = check(
            &[
                ("HydraulicPressureSourceC", "src"),
                ("HydraulicLaminarOrifice", "x"),
                ("HydraulicLaminarOrifice", "y"),
                ("HydraulicTankC", "t1"),
            ],
            &[
                ("src", "P1", "x", "P1"),
                ("x", "P2", "y", "P1"),
                ("y", "P2", "t1", "P1"),
            ],
            1e-3,
        );
        assert_eq!(
            errors(&found),
            ["Node joining x.P2, y.P1 has more than one Q component"]
        );
    }

    #[test]
    fn three_power_ports_on_one_node() {
        let found = check(
            &[
                ("HydraulicPressureSourceC", "a"),
                ("HydraulicPressureSourceC", "b"),
                ("HydraulicFlowSourceQ", "q"),
            ],
            &[("a", "P1", "q", "P1"), ("b", "P1", "q", "P1")],
            1e-3,
        );
        let errs = errors(&found);
        assert_eq!(errs.len(), 2, "{errs:?}");
        assert!(errs[0].ends_with("has more than two power ports"));
        assert!(errs[1].ends_with("has more than one C component"));
    }

    #[test]
    fn timestep_limits() {
        let low = check(&[], &[], 0.0);
        assert_eq!(errors(&low), ["The timestep is too low"]);
        let nan = check(&[], &[], f64::NAN);
        assert_eq!(nan.len(), 1);
    }
}
