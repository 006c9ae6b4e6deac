//! Node identity and in-arena node records.

use std::fmt;

use crate::schema::{edge_specs, EdgePayload, EdgeSpec, NodeAttrs, NodeKind};

/// Identity of a node within one factory's arena.
///
/// Ids are positive, strictly increasing and never reused. Two values are
/// reserved and never name a node: [`NodeId::NONE`] (0, "no edge") and
/// [`NodeId::FILTERED`] (1), the sentinel single-edge accessors return when
/// the real target exists but is currently filtered. The distinction lets
/// callers tell "edge absent" from "edge present but target hidden" without
/// a second probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(u32);

impl NodeId {
    /// The "no edge" value.
    pub const NONE: NodeId = NodeId(0);

    /// Sentinel returned when a single edge's real target is filtered.
    pub const FILTERED: NodeId = NodeId(1);

    /// First id the factory hands out.
    pub(crate) const FIRST: u32 = 2;

    /// Builds an id from its raw wire representation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> NodeId {
        NodeId(raw)
    }

    /// The raw wire representation of this id.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for the "no edge" value.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True if this value can name a node (neither reserved value).
    #[must_use]
    pub const fn is_real(self) -> bool {
        self.0 >= NodeId::FIRST
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage of one declared edge of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EdgeSlot {
    /// Single edge: target or [`NodeId::NONE`].
    Single(NodeId),
    /// Multiple edge: insertion-ordered targets, payload on associative edges.
    Multiple(Vec<(NodeId, Option<EdgePayload>)>),
}

impl EdgeSlot {
    fn empty_for(spec: &EdgeSpec) -> EdgeSlot {
        if spec.discipline.is_single() {
            EdgeSlot::Single(NodeId::NONE)
        } else {
            EdgeSlot::Multiple(Vec::new())
        }
    }
}

/// One node of the arena: kind, attributes, parent pointer, filter flag and
/// edge slots shaped by the kind's schema.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub kind: NodeKind,
    pub attrs: NodeAttrs,
    /// Current owning parent, [`NodeId::NONE`] for roots/unattached nodes.
    /// Maintained only by owning-edge operations.
    pub parent: NodeId,
    /// Visibility bit; hides the node without invalidating its id.
    pub filtered: bool,
    /// Edge storage, aligned with the kind's schema-order edge list.
    pub edges: Vec<EdgeSlot>,
}

impl NodeRecord {
    /// Builds the empty record for a concrete kind, `None` for abstract kinds.
    pub fn empty_for(kind: NodeKind) -> Option<NodeRecord> {
        let attrs = NodeAttrs::empty_for(kind)?;
        Some(NodeRecord {
            kind,
            attrs,
            parent: NodeId::NONE,
            filtered: false,
            edges: edge_specs(kind).map(EdgeSlot::empty_for).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::edge_slot;

    #[test]
    fn reserved_ids_are_not_real() {
        assert!(!NodeId::NONE.is_real());
        assert!(!NodeId::FILTERED.is_real());
        assert!(NodeId::from_raw(NodeId::FIRST).is_real());
    }

    #[test]
    fn record_slots_follow_schema_order() {
        let record = NodeRecord::empty_for(NodeKind::Method).unwrap();
        let (slot, spec) = edge_slot(NodeKind::Method, crate::schema::EdgeKind::MethodReturns)
            .unwrap();
        assert!(spec.discipline.is_single());
        assert_eq!(record.edges[slot], EdgeSlot::Single(NodeId::NONE));
    }

    #[test]
    fn abstract_kinds_have_no_record() {
        assert!(NodeRecord::empty_for(NodeKind::Scope).is_none());
    }
}
