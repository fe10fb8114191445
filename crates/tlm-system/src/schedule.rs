//! Step ordering and the dependency levels used for parallel stepping.

use std::collections::HashSet;

use tlm_components::{ComponentInstance, CqsType};
use tlm_core::{Message, NodeId};
use tlm_node::PortKind;

const GROUPS: [CqsType; 3] = [CqsType::Signal, CqsType::C, CqsType::Q];

/// Components of one CQS type in step order, split into levels that can
/// step concurrently.
#[derive(Clone, Debug, Default)]
pub struct StepGroup {
    pub order: Vec<usize>,
    pub levels: Vec<Vec<usize>>,
}

/// Signal, C and Q groups, stepped in that order.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    groups: [StepGroup; 3],
    /// Per component: its level counted over all groups
    level_of: Vec<usize>,
    /// Per component: its place in step order
    position: Vec<usize>,
    num_levels: usize,
}

impl Schedule {
    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    pub(crate) fn level_of(&self) -> &[usize] {
        &self.level_of
    }

    pub(crate) fn position(&self) -> &[usize] {
        &self.position
    }

    pub fn group(&self, cqs: CqsType) -> &StepGroup {
        &self.groups[cqs as usize]
    }

    pub fn groups(&self) -> &[StepGroup] {
        &self.groups
    }

    /// Every component index in step order.
    pub fn order(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().flat_map(|g| g.order.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.order.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Signal components that could not be ordered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AlgebraicLoop {
    pub last_sorted: Option<String>,
}

impl AlgebraicLoop {
    pub fn message(&self) -> String {
        format!(
            "Algebraic loops was found, signal components could not be sorted. \
             Last component that was successfully sorted: {}. \
             Use unit delay components to resolve loops.",
            self.last_sorted.as_deref().unwrap_or("<none>")
        )
    }
}

struct Access {
    reads: Vec<NodeId>,
    writes: Vec<NodeId>,
    touches: HashSet<NodeId>,
}

fn access(c: &ComponentInstance) -> Access {
    let mut reads = Vec::new();
    let mut writes = Vec::new();
    let mut touches = HashSet::new();
    for p in c.ports() {
        let nodes = p.nodes();
        match p.kind() {
            PortKind::Read | PortKind::ReadMulti => reads.extend(&nodes),
            PortKind::Write => writes.extend(&nodes),
            PortKind::Power | PortKind::PowerMulti => {}
        }
        touches.extend(nodes);
    }
    Access {
        reads,
        writes,
        touches,
    }
}

/// Order every component. A signal loop is an error; a loop among C or Q
/// components is reported as a warning and leaves insertion order.
pub(crate) fn build(
    system: &str,
    components: &[ComponentInstance],
    messages: &mut Vec<Message>,
) -> Result<Schedule, AlgebraicLoop> {
    let access: Vec<Access> = components.iter().map(access).collect();
    let mut schedule = Schedule::default();
    for (slot, cqs) in GROUPS.into_iter().enumerate() {
        let members: Vec<usize> = (0..components.len())
            .filter(|&i| components[i].cqs_type() == cqs)
            .collect();
        let order = match sort_group(components, &access, &members) {
            Ok(order) => order,
            Err(placed) if cqs == CqsType::Signal => {
                return Err(AlgebraicLoop {
                    last_sorted: placed.last().map(|&i| components[i].name().to_string()),
                });
            }
            Err(_) => {
                messages.push(Message::warning(
                    system,
                    format!("{cqs} components form a loop and keep their insertion order"),
                ));
                members
            }
        };
        let levels = levels(components, &access, &order);
        schedule.groups[slot] = StepGroup { order, levels };
    }

    schedule.level_of = vec![0; components.len()];
    for group in &schedule.groups {
        for (l, level) in group.levels.iter().enumerate() {
            for &i in level {
                schedule.level_of[i] = schedule.num_levels + l;
            }
        }
        schedule.num_levels += group.levels.len();
    }
    schedule.position = vec![0; components.len()];
    for (k, i) in schedule.order().enumerate().collect::<Vec<_>>() {
        schedule.position[i] = k;
    }
    Ok(schedule)
}

/// Repeated sweeps in insertion order. A component is placed once every
/// in-group writer of a node it reads is placed; loop breakers do not count.
/// On failure returns what was placed.
fn sort_group(
    components: &[ComponentInstance],
    access: &[Access],
    members: &[usize],
) -> Result<Vec<usize>, Vec<usize>> {
    let writers_of = |node: NodeId| {
        members.iter().copied().filter(move |&w| {
            access[w].writes.contains(&node) && !components[w].breaks_algebraic_loops()
        })
    };
    let requires: Vec<Vec<usize>> = members
        .iter()
        .map(|&m| {
            let mut req: Vec<usize> = access[m]
                .reads
                .iter()
                .flat_map(|&n| writers_of(n))
                .filter(|&w| w != m)
                .collect();
            req.dedup();
            req
        })
        .collect();

    let mut placed: Vec<usize> = Vec::with_capacity(members.len());
    let mut is_placed = vec![false; components.len()];
    let mut progress = true;
    while progress {
        progress = false;
        for (k, &m) in members.iter().enumerate() {
            if is_placed[m] || !requires[k].iter().all(|&w| is_placed[w]) {
                continue;
            }
            placed.push(m);
            is_placed[m] = true;
            progress = true;
        }
    }
    if placed.len() == members.len() {
        Ok(placed)
    } else {
        Err(placed)
    }
}

/// Level of each component is one past the highest earlier component it
/// conflicts with: one writes a node the other touches. Components on one
/// level never see each other's writes, so stepping a level concurrently
/// matches stepping it in order.
fn levels(components: &[ComponentInstance], access: &[Access], order: &[usize]) -> Vec<Vec<usize>> {
    let writes = |i: usize| -> Vec<NodeId> {
        let mut w = access[i].writes.clone();
        for p in components[i].ports() {
            if p.kind().is_power() {
                w.extend(p.nodes());
            }
        }
        w
    };
    let written: Vec<Vec<NodeId>> = order.iter().map(|&i| writes(i)).collect();
    let mut level_of: Vec<usize> = Vec::with_capacity(order.len());
    let mut levels: Vec<Vec<usize>> = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let conflicts = |j: usize| {
            let other = order[j];
            written[j].iter().any(|n| access[i].touches.contains(n))
                || written[k].iter().any(|n| access[other].touches.contains(n))
        };
        let level = (0..k)
            .filter(|&j| conflicts(j))
            .map(|j| level_of[j] + 1)
            .max()
            .unwrap_or(0);
        level_of.push(level);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(i);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlm_components::ComponentRegistry;
    use tlm_node::NodeArena;

    use crate::topology::{Connection, PortRef, add_dummy_nodes, rebuild};

    fn schedule(
        keys: &[(&str, &str)],
        conns: &[(&str, &str, &str, &str)],
    ) -> (Vec<ComponentInstance>, Result<Schedule, AlgebraicLoop>, Vec<Message>) {
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
        add_dummy_nodes(&mut comps, &mut nodes).unwrap();
        let mut messages = Vec::new();
        let result = build("sys", &comps, &mut messages);
        (comps, result, messages)
    }

    fn names(comps: &[ComponentInstance], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| comps[i].name().to_string()).collect()
    }

    #[test]
    fn signal_chain_is_sorted_against_insertion_order() {
        let (comps, sched, _) = schedule(
            &[
                ("SignalGain", "g2"),
                ("SignalGain", "g1"),
                ("SignalConstant", "c"),
            ],
            &[("c", "out", "g1", "in"), ("g1", "out", "g2", "in")],
        );
        let sched = sched.unwrap();
        let signal = sched.group(CqsType::Signal);
        assert_eq!(names(&comps, &signal.order), ["c", "g1", "g2"]);
        assert_eq!(signal.levels.len(), 3);
    }

    #[test]
    fn independent_components_share_a_level() {
        let (_, sched, _) = schedule(
            &[
                ("SignalConstant", "a"),
                ("SignalConstant", "b"),
                ("SignalSum", "sum"),
            ],
            &[("a", "out", "sum", "in"), ("b", "out", "sum", "in")],
        );
        let sched = sched.unwrap();
        assert_eq!(sched.group(CqsType::Signal).levels, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn loop_without_delay_is_an_error() {
        let (_, sched, _) = schedule(
            &[
                ("SignalConstant", "c"),
                ("SignalAdd", "add"),
                ("SignalGain", "g"),
            ],
            &[
                ("c", "out", "add", "in1"),
                ("add", "out", "g", "in"),
                ("g", "out", "add", "in2"),
            ],
        );
        let err = sched.unwrap_err();
        assert_eq!(err.last_sorted.as_deref(), Some("c"));
        assert_eq!(
            err.message(),
            "Algebraic loops was found, signal components could not be sorted. \
             Last component that was successfully sorted: c. \
             Use unit delay components to resolve loops."
        );
    }

    #[test]
    fn unit_delay_breaks_the_loop() {
        let (comps, sched, _) = schedule(
            &[
                ("SignalAdd", "add"),
                ("SignalUnitDelay", "z"),
                ("SignalConstant", "c"),
            ],
            &[
                ("c", "out", "add", "in1"),
                ("add", "out", "z", "in"),
                ("z", "out", "add", "in2"),
            ],
        );
        let sched = sched.unwrap();
        let signal = sched.group(CqsType::Signal);
        assert_eq!(names(&comps, &signal.order), ["c", "add", "z"]);
        // add reads the delayed value before z overwrites it
        let level = |i: usize| signal.levels.iter().position(|l| l.contains(&i)).unwrap();
        assert!(level(1) > level(0));
    }

    #[test]
    fn groups_follow_cqs_type() {
        let (comps, sched, messages) = schedule(
            &[
                ("HydraulicLaminarOrifice", "ori"),
                ("HydraulicPressureSensor", "sense"),
                ("HydraulicPressureSourceC", "src"),
                ("HydraulicTankC", "tank"),
            ],
            &[
                ("src", "P1", "ori", "P1"),
                ("ori", "P2", "tank", "P1"),
                ("sense", "P1", "tank", "P1"),
            ],
        );
        let sched = sched.unwrap();
        assert!(messages.is_empty());
        let all: Vec<usize> = sched.order().collect();
        assert_eq!(names(&comps, &all), ["sense", "src", "tank", "ori"]);
        assert_eq!(sched.group(CqsType::C).levels.len(), 1);
        assert_eq!(sched.num_levels(), 3);
        assert_eq!(sched.level_of(), [2, 0, 1, 1]);
        assert_eq!(sched.position(), [3, 0, 1, 2]);
    }
}
