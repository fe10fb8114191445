//! Nodes, their slot cells and the arena that owns them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tlm_core::{NodeId, Real};

use crate::error::{NodeError, NodeResult};
use crate::node_type::NodeType;

/// One `f64` slot that can be shared between components.
///
/// Stored as raw bits in an `AtomicU64` so that components stepped on
/// different threads may touch disjoint slots of the same node without
/// locking. Within one step a slot has a single writer; the scheduler
/// provides the happens-before edges between steps.
#[derive(Debug, Default)]
pub struct SlotCell(AtomicU64);

impl SlotCell {
    pub fn new(value: Real) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> Real {
        Real::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: Real) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Clone for SlotCell {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

/// Shared per-connection state: a typed, fixed-size bundle of slots.
#[derive(Clone, Debug)]
pub struct Node {
    ty: Arc<NodeType>,
    data: Box<[SlotCell]>,
    dummy: bool,
}

impl Node {
    pub fn new(ty: Arc<NodeType>) -> Self {
        let data = ty
            .variables()
            .iter()
            .map(|v| SlotCell::new(v.default))
            .collect();
        Self {
            ty,
            data,
            dummy: false,
        }
    }

    /// A node standing in for an unconnected optional port.
    pub fn new_dummy(ty: Arc<NodeType>) -> Self {
        Self {
            dummy: true,
            ..Self::new(ty)
        }
    }

    pub fn node_type(&self) -> &NodeType {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, offset: usize) -> Option<Real> {
        self.data.get(offset).map(SlotCell::get)
    }

    pub fn set_value(&self, offset: usize, value: Real) -> NodeResult<()> {
        self.ty.check_offset(offset)?;
        self.data[offset].set(value);
        Ok(())
    }

    /// Copy all slot values into `out`, appending.
    pub fn snapshot_into(&self, out: &mut Vec<Real>) {
        out.extend(self.data.iter().map(SlotCell::get));
    }

    pub fn values(&self) -> Vec<Real> {
        let mut v = Vec::with_capacity(self.data.len());
        self.snapshot_into(&mut v);
        v
    }

    pub fn reset_to_defaults(&self) {
        for (cell, var) in self.data.iter().zip(self.ty.variables()) {
            cell.set(var.default);
        }
    }

    /// Apply port start values on top of the type defaults.
    ///
    /// `sets` yields one start value table per bound port, in binding order.
    /// Later tables override earlier ones. If the intensity slot received a
    /// value but the wave slot did not, the wave slot takes the intensity.
    pub fn load_start_values<'a>(&self, sets: impl IntoIterator<Item = &'a [Option<Real>]>) {
        self.reset_to_defaults();
        let mut explicit = vec![false; self.data.len()];
        for starts in sets {
            for (i, v) in starts.iter().enumerate() {
                if let (Some(v), Some(cell)) = (v, self.data.get(i)) {
                    cell.set(*v);
                    explicit[i] = true;
                }
            }
        }
        if let (Some(i), Some(w)) = (self.ty.intensity_offset(), self.ty.wave_offset()) {
            if explicit[i] && !explicit[w] {
                self.data[w].set(self.data[i].get());
            }
        }
    }
}

/// Read-write handle to one slot of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    node: NodeId,
    offset: usize,
}

/// Read-only handle to one slot of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReadSlot {
    node: NodeId,
    offset: usize,
}

impl Slot {
    pub fn node(self) -> NodeId {
        self.node
    }

    pub fn offset(self) -> usize {
        self.offset
    }

    pub fn read_only(self) -> ReadSlot {
        ReadSlot {
            node: self.node,
            offset: self.offset,
        }
    }
}

impl ReadSlot {
    pub fn node(self) -> NodeId {
        self.node
    }

    pub fn offset(self) -> usize {
        self.offset
    }
}

impl From<Slot> for ReadSlot {
    fn from(s: Slot) -> Self {
        s.read_only()
    }
}

/// Slab of nodes owned by one component system.
///
/// Slot handles are validated when they are created; the arena never
/// shrinks while handles are alive because the owning system only rebuilds
/// it while the model is being assembled.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeResult<NodeId> {
        let id = NodeId::try_from_usize(self.nodes.len())?;
        self.nodes.push(node);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn node(&self, id: NodeId) -> NodeResult<&Node> {
        self.get(id).ok_or(NodeError::InvalidNode { node: id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from_index(i as u32), n))
    }

    /// Resolve a read-write handle, checking node and offset.
    pub fn slot(&self, id: NodeId, offset: usize) -> NodeResult<Slot> {
        self.node(id)?.node_type().check_offset(offset)?;
        Ok(Slot { node: id, offset })
    }

    /// Resolve a read-only handle, checking node and offset.
    pub fn read_slot(&self, id: NodeId, offset: usize) -> NodeResult<ReadSlot> {
        self.slot(id, offset).map(Slot::read_only)
    }

    #[inline]
    pub fn read(&self, slot: impl Into<ReadSlot>) -> Real {
        let s = slot.into();
        self.nodes[s.node.slot()].data[s.offset].get()
    }

    #[inline]
    pub fn write(&self, slot: Slot, value: Real) {
        self.nodes[slot.node.slot()].data[slot.offset].set(value);
    }

    /// Total number of slots over all nodes.
    pub fn total_slots(&self) -> usize {
        self.nodes.iter().map(Node::len).sum()
    }

    /// Append every node's values, in node order, to `out`.
    pub fn snapshot_into(&self, out: &mut Vec<Real>) {
        for n in &self.nodes {
            n.snapshot_into(out);
        }
    }
}
