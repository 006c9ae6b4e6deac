//! Reverse edge index, answering "who points at this node".
//!
//! Forward edges are stored on their source only; the index inverts them,
//! mapping a target id and an [`EdgeKind`] to the ordered list of source
//! ids. It is built by one full preorder traversal covering filtered nodes
//! as well, then kept current by the factory's edge mutators for as long as
//! it stays enabled.
//!
//! Entries keep multiplicity: an associative edge recorded twice yields its
//! source twice.

use std::collections::HashMap;

use crate::{
    factory::{Factory, NodeId},
    schema::{EdgeKind, EdgePayload, EdgeSpec},
    visitor::{Preorder, Visitor},
    Result,
};

/// Index from edge targets back to their sources, per edge kind.
#[derive(Debug, Default)]
pub struct ReverseEdges {
    table: HashMap<NodeId, HashMap<EdgeKind, Vec<NodeId>>>,
}

impl ReverseEdges {
    /// Builds the index from every edge currently in `factory`, filtered
    /// nodes included.
    pub(crate) fn build(factory: &Factory) -> Result<ReverseEdges> {
        let mut index = ReverseEdges::default();
        {
            let mut collector = Collector { index: &mut index };
            Preorder::new(factory)
                .include_filtered(true)
                .run_all(&mut collector)?;
        }
        Ok(index)
    }

    /// The ordered source ids of `edge` entries pointing at `target`.
    ///
    /// Empty if the node has no incoming entries of that kind.
    #[must_use]
    pub fn sources(&self, target: NodeId, edge: EdgeKind) -> &[NodeId] {
        self.table
            .get(&target)
            .and_then(|by_kind| by_kind.get(&edge))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The edge kinds with at least one entry pointing at `target`.
    pub fn incoming_kinds(&self, target: NodeId) -> impl Iterator<Item = EdgeKind> + '_ {
        self.table
            .get(&target)
            .into_iter()
            .flat_map(|by_kind| by_kind.iter())
            .filter(|(_, sources)| !sources.is_empty())
            .map(|(kind, _)| *kind)
    }

    pub(crate) fn insert(&mut self, target: NodeId, edge: EdgeKind, source: NodeId) {
        self.table
            .entry(target)
            .or_default()
            .entry(edge)
            .or_default()
            .push(source);
    }

    /// Removes one occurrence of `source` from the entry list; repeated
    /// edges are removed one at a time, mirroring the forward side.
    pub(crate) fn remove(&mut self, target: NodeId, edge: EdgeKind, source: NodeId) {
        if let Some(sources) = self
            .table
            .get_mut(&target)
            .and_then(|by_kind| by_kind.get_mut(&edge))
        {
            if let Some(position) = sources.iter().position(|&s| s == source) {
                sources.remove(position);
            }
        }
    }
}

/// Visitor feeding every edge event into the index under construction.
struct Collector<'a> {
    index: &'a mut ReverseEdges,
}

impl Visitor for Collector<'_> {
    fn enter_edge(
        &mut self,
        _factory: &Factory,
        source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
    ) -> Result<()> {
        self.index.insert(target, spec.kind, source);
        Ok(())
    }

    fn visit_edge(
        &mut self,
        _factory: &Factory,
        source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
        _payload: Option<EdgePayload>,
    ) -> Result<()> {
        self.index.insert(target, spec.kind, source);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeKind;

    #[test]
    fn build_inverts_forward_edges() {
        let mut factory = Factory::new();
        let package = factory.create_node(NodeKind::Package).unwrap();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        factory
            .add_edge(package, EdgeKind::ScopeHasMember, class)
            .unwrap();
        factory
            .add_edge(class, EdgeKind::ScopeHasMember, method)
            .unwrap();
        factory
            .set_single(method, EdgeKind::MethodReturns, class)
            .unwrap();

        factory.enable_reverse_edges().unwrap();
        let reverse = factory.reverse_edges().unwrap();

        assert_eq!(
            reverse.sources(class, EdgeKind::ScopeHasMember),
            &[package]
        );
        assert_eq!(reverse.sources(method, EdgeKind::ScopeHasMember), &[class]);
        assert_eq!(reverse.sources(class, EdgeKind::MethodReturns), &[method]);
        assert!(reverse.sources(package, EdgeKind::ScopeHasMember).is_empty());
    }

    #[test]
    fn index_tracks_later_mutations() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        factory.enable_reverse_edges().unwrap();

        factory
            .add_edge(class, EdgeKind::ScopeHasMember, method)
            .unwrap();
        assert_eq!(
            factory
                .reverse_edges()
                .unwrap()
                .sources(method, EdgeKind::ScopeHasMember),
            &[class]
        );
    }

    #[test]
    fn build_covers_filtered_nodes() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        factory
            .add_edge(class, EdgeKind::ScopeHasMember, method)
            .unwrap();
        factory.set_filtered(method, true).unwrap();

        factory.enable_reverse_edges().unwrap();
        assert_eq!(
            factory
                .reverse_edges()
                .unwrap()
                .sources(method, EdgeKind::ScopeHasMember),
            &[class]
        );
    }

    #[test]
    fn associative_multiplicity_is_preserved() {
        use crate::schema::CallKind;

        let mut factory = Factory::new();
        let caller = factory.create_node(NodeKind::Method).unwrap();
        let callee = factory.create_node(NodeKind::Method).unwrap();
        factory
            .add_edge_with(
                caller,
                EdgeKind::MethodCalls,
                callee,
                EdgePayload::Call(CallKind::Static),
            )
            .unwrap();
        factory
            .add_edge_with(
                caller,
                EdgeKind::MethodCalls,
                callee,
                EdgePayload::Call(CallKind::Virtual),
            )
            .unwrap();

        factory.enable_reverse_edges().unwrap();
        assert_eq!(
            factory
                .reverse_edges()
                .unwrap()
                .sources(callee, EdgeKind::MethodCalls),
            &[caller, caller]
        );
    }
}
