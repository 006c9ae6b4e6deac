//! Node arena, factory and the kind-validated edge model.
//!
//! The [`Factory`] owns every node of one graph: it assigns stable integer
//! identities, resolves them back to node data, toggles per-node visibility
//! (filtering) and performs every edge mutation. It also owns the graph's
//! [`crate::strings::StringTable`] and, when enabled, its
//! [`crate::reverse::ReverseEdges`] index, so independent graphs can coexist
//! without shared global state.
//!
//! # Architecture
//!
//! Nodes live in a dense arena indexed by [`NodeId`]; ids are handed out
//! monotonically and never reused, and the whole arena is released together
//! when the factory is dropped. There is no per-node destruction: soft
//! deletion is the filter flag, which hides a node without invalidating its
//! id or any edge pointing at it.
//!
//! Every edge mutation is validated against the schema before any state is
//! touched: the edge must be declared (with the right discipline) for the
//! source's kind, the target must exist, and the target's kind must lie in
//! the accepted subtree. Owning edges additionally maintain the containment
//! tree: attaching a node detaches it from its previous owner's collection
//! and installs the new parent pointer.
//!
//! # Concurrency
//!
//! The factory is a single mutable structure; mutation, filtering and
//! traversal all assume exclusive access for their duration. Callers needing
//! concurrent readers should wrap it in a read-write lock or snapshot it
//! before sharing.
//!
//! # Example
//!
//! ```rust
//! use asgraph::{EdgeKind, Factory, NodeKind};
//!
//! let mut factory = Factory::new();
//! let class = factory.create_node(NodeKind::Class)?;
//! let method = factory.create_node(NodeKind::Method)?;
//! factory.add_edge(class, EdgeKind::ScopeHasMember, method)?;
//! assert_eq!(factory.parent(method)?, class);
//! # Ok::<(), asgraph::Error>(())
//! ```

mod node;
pub(crate) mod persist;

pub use node::NodeId;
pub(crate) use node::{EdgeSlot, NodeRecord};

use crate::{
    reverse::ReverseEdges,
    schema::{edge_slot, EdgeKind, EdgePayload, EdgeSpec, NodeAttrs, NodeKind},
    strings::{Key, StringTable},
    Error, Result,
};

/// Owner of one attributed syntax/semantic graph.
///
/// See the [module documentation](self) for the overall contract.
#[derive(Debug)]
pub struct Factory {
    /// Arena indexed by raw id; slots 0 and 1 stay empty for the reserved
    /// [`NodeId::NONE`] and [`NodeId::FILTERED`] values.
    arena: Vec<Option<NodeRecord>>,
    /// String table shared by every node of this graph.
    strings: StringTable,
    /// Reverse edge index, present while enabled.
    reverse: Option<ReverseEdges>,
}

impl Default for Factory {
    fn default() -> Factory {
        Factory::new()
    }
}

impl Factory {
    /// Creates an empty factory with its own string table.
    #[must_use]
    pub fn new() -> Factory {
        Factory {
            arena: vec![None, None],
            strings: StringTable::new(),
            reverse: None,
        }
    }

    // ******************** Node arena ********************

    /// Creates a new node of a concrete kind and returns its id.
    ///
    /// The record is pre-registered empty, shaped by the kind's schema;
    /// attributes and edges are populated afterwards. Ids are strictly
    /// increasing and never reused.
    ///
    /// # Errors
    ///
    /// [`Error::AbstractKind`] if `kind` is abstract.
    pub fn create_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        let record = NodeRecord::empty_for(kind).ok_or(Error::AbstractKind(kind))?;
        let id = NodeId::from_raw(self.arena.len() as u32);
        self.arena.push(Some(record));
        Ok(id)
    }

    /// Re-creates a node under a caller-chosen id, used by the load path.
    ///
    /// The arena grows as needed; intermediate slots stay empty and their
    /// ids are lost (never handed out again, matching the no-reuse rule).
    pub(crate) fn create_node_with_id(&mut self, kind: NodeKind, id: NodeId) -> Result<()> {
        let record = NodeRecord::empty_for(kind).ok_or(Error::AbstractKind(kind))?;
        if !id.is_real() {
            return Err(Error::NotFound(id));
        }
        let index = id.raw() as usize;
        if index >= self.arena.len() {
            self.arena.resize(index + 1, None);
        }
        self.arena[index] = Some(record);
        Ok(())
    }

    /// Whether `id` names a live node.
    #[must_use]
    pub fn exists(&self, id: NodeId) -> bool {
        self.record(id).is_ok()
    }

    /// Number of live nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the arena holds no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind of a node.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn node_kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.record(id)?.kind)
    }

    /// The attribute record of a node.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn attrs(&self, id: NodeId) -> Result<&NodeAttrs> {
        Ok(&self.record(id)?.attrs)
    }

    /// Mutable access to the attribute record of a node.
    ///
    /// The kind of the record cannot change; only the attribute values can.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn attrs_mut(&mut self, id: NodeId) -> Result<&mut NodeAttrs> {
        Ok(&mut self.record_mut(id)?.attrs)
    }

    /// The current owning parent of a node, [`NodeId::NONE`] for roots.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn parent(&self, id: NodeId) -> Result<NodeId> {
        Ok(self.record(id)?.parent)
    }

    /// Iterates the ids of all unfiltered live nodes, in id order.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(move |&id| !self.is_filtered(id))
    }

    /// One past the highest id the arena can currently name.
    pub(crate) fn id_bound(&self) -> u32 {
        self.arena.len() as u32
    }

    /// Iterates the ids of all live nodes, filtered ones included.
    pub(crate) fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| NodeId::from_raw(index as u32))
    }

    // ******************** Strings ********************

    /// The string table of this graph.
    #[must_use]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Interns a string into this graph's table.
    pub fn intern(&mut self, value: &str) -> Key {
        self.strings.intern(value)
    }

    // ******************** Filter ********************

    /// Whether a node is currently filtered (soft-deleted).
    ///
    /// Always false for the reserved ids and for ids naming no node.
    #[must_use]
    pub fn is_filtered(&self, id: NodeId) -> bool {
        self.record(id).map(|r| r.filtered).unwrap_or(false)
    }

    /// Sets the filter flag of one node.
    ///
    /// Toggles visibility only: edges, the parent pointer and the id itself
    /// stay untouched.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn set_filtered(&mut self, id: NodeId, filtered: bool) -> Result<()> {
        self.record_mut(id)?.filtered = filtered;
        Ok(())
    }

    /// Filters a node together with its whole containment subtree.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn set_filtered_subtree(&mut self, id: NodeId) -> Result<()> {
        self.record(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Ok(record) = self.record_mut(current) {
                record.filtered = true;
            }
            let record = match self.record(current) {
                Ok(record) => record,
                Err(_) => continue,
            };
            for (slot, spec) in crate::schema::edge_specs(record.kind).enumerate() {
                if !spec.discipline.is_owning() {
                    continue;
                }
                match &record.edges[slot] {
                    EdgeSlot::Single(target) if target.is_real() => stack.push(*target),
                    EdgeSlot::Single(_) => {}
                    EdgeSlot::Multiple(items) => {
                        stack.extend(items.iter().map(|(target, _)| *target));
                    }
                }
            }
        }
        Ok(())
    }

    /// Clears the filter flag of a node and of its whole ancestor chain, so
    /// the node becomes reachable again through the containment tree.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node.
    pub fn set_unfiltered_with_ancestors(&mut self, id: NodeId) -> Result<()> {
        self.record(id)?;
        let mut current = id;
        while current.is_real() {
            let record = match self.record_mut(current) {
                Ok(record) => record,
                Err(_) => break,
            };
            record.filtered = false;
            current = record.parent;
        }
        Ok(())
    }

    // ******************** Edge model ********************

    /// Sets (or with [`NodeId::NONE`] clears) a single edge.
    ///
    /// For owning single edges, any previously owned target is detached and
    /// the new target's parent pointer is installed; reference single edges
    /// have no ownership effect. Fails fast with no partial mutation.
    ///
    /// # Errors
    ///
    /// [`Error::UndeclaredEdge`] if the source's kind does not declare the
    /// edge as single; [`Error::NotFound`] if source or a nonzero target does
    /// not exist; [`Error::InvalidEdgeTarget`] if the target's kind lies
    /// outside the accepted subtree.
    pub fn set_single(&mut self, source: NodeId, edge: EdgeKind, target: NodeId) -> Result<()> {
        let kind = self.node_kind(source)?;
        let (slot, spec) = match edge_slot(kind, edge) {
            Some(pair) if pair.1.discipline.is_single() => pair,
            _ => return Err(Error::UndeclaredEdge { kind, edge }),
        };
        if !target.is_none() {
            self.validate_target(spec, target)?;
        }

        let previous = match self.record(source)?.edges[slot] {
            EdgeSlot::Single(id) => id,
            EdgeSlot::Multiple(_) => unreachable!("slot shape follows discipline"),
        };

        if spec.discipline.is_owning() {
            if previous.is_real() {
                if let Ok(record) = self.record_mut(previous) {
                    record.parent = NodeId::NONE;
                }
            }
            if target.is_real() {
                Self::detach_from_owner(&mut self.arena, self.reverse.as_mut(), target);
                self.record_mut(target)?.parent = source;
            }
        }

        match &mut self.record_mut(source)?.edges[slot] {
            EdgeSlot::Single(id) => *id = target,
            EdgeSlot::Multiple(_) => unreachable!("slot shape follows discipline"),
        }

        if let Some(reverse) = self.reverse.as_mut() {
            if previous.is_real() {
                reverse.remove(previous, edge, source);
            }
            if target.is_real() {
                reverse.insert(target, edge, source);
            }
        }
        Ok(())
    }

    /// Reads a single edge.
    ///
    /// Returns [`NodeId::NONE`] if the edge is absent, [`NodeId::FILTERED`]
    /// if a target is present but currently filtered, and the real id
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the source does not exist;
    /// [`Error::UndeclaredEdge`] if the source's kind does not declare the
    /// edge as single.
    pub fn single_target(&self, source: NodeId, edge: EdgeKind) -> Result<NodeId> {
        let record = self.record(source)?;
        let (slot, spec) = match edge_slot(record.kind, edge) {
            Some(pair) if pair.1.discipline.is_single() => pair,
            _ => {
                return Err(Error::UndeclaredEdge {
                    kind: record.kind,
                    edge,
                })
            }
        };
        debug_assert!(spec.discipline.is_single());
        match record.edges[slot] {
            EdgeSlot::Single(target) => {
                if target.is_none() {
                    Ok(NodeId::NONE)
                } else if self.is_filtered(target) {
                    Ok(NodeId::FILTERED)
                } else {
                    Ok(target)
                }
            }
            EdgeSlot::Multiple(_) => unreachable!("slot shape follows discipline"),
        }
    }

    /// Appends a target to a multiple edge (owning or reference).
    ///
    /// Repeats are allowed; entries keep insertion order. For owning multi
    /// edges the target is detached from its previous owner's collection and
    /// its parent pointer is set to `source`.
    ///
    /// # Errors
    ///
    /// [`Error::UndeclaredEdge`] if the edge is not a payload-free multiple
    /// edge of the source's kind; [`Error::NotFound`] /
    /// [`Error::InvalidEdgeTarget`] as for [`Factory::set_single`].
    pub fn add_edge(&mut self, source: NodeId, edge: EdgeKind, target: NodeId) -> Result<()> {
        self.add_multi(source, edge, target, None)
    }

    /// Appends a target with its payload to an associative multiple edge.
    ///
    /// # Errors
    ///
    /// As [`Factory::add_edge`], with [`Error::UndeclaredEdge`] also raised
    /// when the edge carries no payload.
    pub fn add_edge_with(
        &mut self,
        source: NodeId,
        edge: EdgeKind,
        target: NodeId,
        payload: EdgePayload,
    ) -> Result<()> {
        self.add_multi(source, edge, target, Some(payload))
    }

    fn add_multi(
        &mut self,
        source: NodeId,
        edge: EdgeKind,
        target: NodeId,
        payload: Option<EdgePayload>,
    ) -> Result<()> {
        let kind = self.node_kind(source)?;
        let (slot, spec) = match edge_slot(kind, edge) {
            Some(pair) if !pair.1.discipline.is_single() => pair,
            _ => return Err(Error::UndeclaredEdge { kind, edge }),
        };
        if spec.discipline.has_payload() != payload.is_some() {
            return Err(Error::UndeclaredEdge { kind, edge });
        }
        self.validate_target(spec, target)?;

        if spec.discipline.is_owning() {
            Self::detach_from_owner(&mut self.arena, self.reverse.as_mut(), target);
            self.record_mut(target)?.parent = source;
        }

        match &mut self.record_mut(source)?.edges[slot] {
            EdgeSlot::Multiple(items) => items.push((target, payload)),
            EdgeSlot::Single(_) => unreachable!("slot shape follows discipline"),
        }

        if let Some(reverse) = self.reverse.as_mut() {
            reverse.insert(target, edge, source);
        }
        Ok(())
    }

    /// Iterates the targets of a multiple edge in insertion order.
    ///
    /// Filtered targets are skipped; the same policy applies to every
    /// multi-edge iterator of this crate.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the source does not exist;
    /// [`Error::UndeclaredEdge`] if the edge is not a multiple edge of the
    /// source's kind.
    pub fn edge_targets(
        &self,
        source: NodeId,
        edge: EdgeKind,
    ) -> Result<impl Iterator<Item = NodeId> + '_> {
        let items = self.multi_slot(source, edge)?;
        Ok(items
            .iter()
            .map(|(target, _)| *target)
            .filter(move |&target| !self.is_filtered(target)))
    }

    /// Iterates the `(target, payload)` entries of an associative edge in
    /// insertion order, skipping filtered targets.
    ///
    /// # Errors
    ///
    /// As [`Factory::edge_targets`], plus [`Error::UndeclaredEdge`] when the
    /// edge carries no payload.
    pub fn edge_targets_with(
        &self,
        source: NodeId,
        edge: EdgeKind,
    ) -> Result<impl Iterator<Item = (NodeId, EdgePayload)> + '_> {
        let kind = self.node_kind(source)?;
        match edge_slot(kind, edge) {
            Some((_, spec)) if spec.discipline.has_payload() => {}
            _ => return Err(Error::UndeclaredEdge { kind, edge }),
        }
        let items = self.multi_slot(source, edge)?;
        Ok(items
            .iter()
            .filter_map(|(target, payload)| payload.map(|p| (*target, p)))
            .filter(move |&(target, _)| !self.is_filtered(target)))
    }

    /// Raw multi-edge entries of one slot, filtered targets included.
    pub(crate) fn multi_slot(
        &self,
        source: NodeId,
        edge: EdgeKind,
    ) -> Result<&[(NodeId, Option<EdgePayload>)]> {
        let record = self.record(source)?;
        let (slot, _) = match edge_slot(record.kind, edge) {
            Some(pair) if !pair.1.discipline.is_single() => pair,
            _ => {
                return Err(Error::UndeclaredEdge {
                    kind: record.kind,
                    edge,
                })
            }
        };
        match &record.edges[slot] {
            EdgeSlot::Multiple(items) => Ok(items),
            EdgeSlot::Single(_) => unreachable!("slot shape follows discipline"),
        }
    }

    /// Raw single-edge target of one slot, without the filter sentinel.
    pub(crate) fn raw_single_target(&self, source: NodeId, edge: EdgeKind) -> Result<NodeId> {
        let record = self.record(source)?;
        let (slot, _) = match edge_slot(record.kind, edge) {
            Some(pair) if pair.1.discipline.is_single() => pair,
            _ => {
                return Err(Error::UndeclaredEdge {
                    kind: record.kind,
                    edge,
                })
            }
        };
        match record.edges[slot] {
            EdgeSlot::Single(target) => Ok(target),
            EdgeSlot::Multiple(_) => unreachable!("slot shape follows discipline"),
        }
    }

    // ******************** Reverse edges ********************

    /// Builds (or rebuilds) the reverse edge index by one full traversal.
    ///
    /// While enabled, every edge mutation keeps the index current.
    ///
    /// # Errors
    ///
    /// Propagates traversal failures; the index is only installed on success.
    pub fn enable_reverse_edges(&mut self) -> Result<()> {
        let index = ReverseEdges::build(self)?;
        self.reverse = Some(index);
        Ok(())
    }

    /// Drops the reverse edge index; using it again requires a rebuild.
    pub fn disable_reverse_edges(&mut self) {
        self.reverse = None;
    }

    /// The reverse edge index, if enabled.
    #[must_use]
    pub fn reverse_edges(&self) -> Option<&ReverseEdges> {
        self.reverse.as_ref()
    }

    // ******************** Internals ********************

    pub(crate) fn record(&self, id: NodeId) -> Result<&NodeRecord> {
        self.arena
            .get(id.raw() as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::NotFound(id))
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord> {
        self.arena
            .get_mut(id.raw() as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::NotFound(id))
    }

    fn validate_target(&self, spec: &EdgeSpec, target: NodeId) -> Result<()> {
        let actual = self.node_kind(target)?;
        if !actual.is_a(spec.accepts) {
            return Err(Error::InvalidEdgeTarget {
                edge: spec.kind,
                expected: spec.accepts,
                target,
                actual,
            });
        }
        Ok(())
    }

    /// Removes `target` from its current owner's collections and clears its
    /// parent pointer. No-op for unattached nodes.
    fn detach_from_owner(
        arena: &mut [Option<NodeRecord>],
        mut reverse: Option<&mut ReverseEdges>,
        target: NodeId,
    ) {
        let owner = match arena
            .get(target.raw() as usize)
            .and_then(Option::as_ref)
            .map(|record| record.parent)
        {
            Some(parent) if parent.is_real() => parent,
            _ => return,
        };

        if let Some(owner_record) = arena.get_mut(owner.raw() as usize).and_then(Option::as_mut) {
            let specs: Vec<_> = crate::schema::edge_specs(owner_record.kind).collect();
            for (slot, spec) in specs.iter().enumerate() {
                if !spec.discipline.is_owning() {
                    continue;
                }
                match &mut owner_record.edges[slot] {
                    EdgeSlot::Single(id) => {
                        if *id == target {
                            *id = NodeId::NONE;
                            if let Some(reverse) = reverse.as_deref_mut() {
                                reverse.remove(target, spec.kind, owner);
                            }
                        }
                    }
                    EdgeSlot::Multiple(items) => {
                        let before = items.len();
                        items.retain(|(id, _)| *id != target);
                        if let Some(reverse) = reverse.as_deref_mut() {
                            for _ in items.len()..before {
                                reverse.remove(target, spec.kind, owner);
                            }
                        }
                    }
                }
            }
        }

        if let Some(record) = arena.get_mut(target.raw() as usize).and_then(Option::as_mut) {
            record.parent = NodeId::NONE;
        }
    }
}
