//! Preorder traversal of the containment tree.
//!
//! [`Preorder`] walks owning edges top-down, calling the visitor's enter
//! handler before descending into a node's children and the leave handler
//! after. Non-containment edges of a node are reported between those two
//! calls via [`Visitor::visit_edge`] without recursing into their targets.
//!
//! Filtered nodes and edge entries leading to them are skipped by default;
//! [`Preorder::include_filtered`] lifts that for consumers that must see the
//! whole arena, such as the reverse-edge index build.

use super::Visitor;
use crate::{
    factory::{Factory, NodeId},
    schema::edge_specs,
    Result,
};

/// Driver walking a [`Factory`]'s containment tree in preorder.
pub struct Preorder<'a> {
    factory: &'a Factory,
    include_filtered: bool,
}

impl<'a> Preorder<'a> {
    /// Creates a driver over `factory` that skips filtered nodes.
    pub fn new(factory: &'a Factory) -> Self {
        Preorder {
            factory,
            include_filtered: false,
        }
    }

    /// Makes the traversal visit filtered nodes and edge entries as well.
    #[must_use]
    pub fn include_filtered(mut self, include: bool) -> Self {
        self.include_filtered = include;
        self
    }

    /// Traverses the subtree rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] if `root` names no live node; visitor
    /// errors are propagated and abort the traversal.
    pub fn run(&self, visitor: &mut dyn Visitor, root: NodeId) -> Result<()> {
        self.factory.node_kind(root)?;
        visitor.begin_visit()?;
        let mut visited = vec![false; self.factory.id_bound() as usize];
        self.visit_node(visitor, root, &mut visited)?;
        visitor.finish_visit()
    }

    /// Traverses every containment tree of the factory, rooted at the nodes
    /// without an owner, in id order.
    ///
    /// # Errors
    ///
    /// Visitor errors are propagated and abort the traversal.
    pub fn run_all(&self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.begin_visit()?;
        let mut visited = vec![false; self.factory.id_bound() as usize];
        let roots: Vec<NodeId> = self
            .factory
            .node_ids()
            .filter(|id| match self.factory.parent(*id) {
                Ok(parent) => parent.is_none(),
                Err(_) => false,
            })
            .collect();
        for root in roots {
            self.visit_node(visitor, root, &mut visited)?;
        }
        visitor.finish_visit()
    }

    fn visible(&self, id: NodeId) -> bool {
        self.include_filtered || !self.factory.is_filtered(id)
    }

    fn visit_node(
        &self,
        visitor: &mut dyn Visitor,
        id: NodeId,
        visited: &mut [bool],
    ) -> Result<()> {
        if !self.visible(id) {
            return Ok(());
        }
        // A stale containment entry could otherwise loop the walk.
        let slot = id.raw() as usize;
        if visited.get(slot).copied().unwrap_or(true) {
            return Ok(());
        }
        visited[slot] = true;

        let kind = self.factory.node_kind(id)?;
        self.factory.accept(id, visitor)?;

        for spec in edge_specs(kind) {
            if spec.discipline.is_single() {
                let target = self.factory.raw_single_target(id, spec.kind)?;
                if !target.is_real() || !self.visible(target) {
                    continue;
                }
                if spec.discipline.is_owning() {
                    visitor.enter_edge(self.factory, id, spec, target)?;
                    self.visit_node(visitor, target, visited)?;
                    visitor.leave_edge(self.factory, id, spec, target)?;
                } else {
                    visitor.visit_edge(self.factory, id, spec, target, None)?;
                }
            } else {
                let entries = self.factory.multi_slot(id, spec.kind)?.to_vec();
                for (target, payload) in entries {
                    if !self.visible(target) {
                        continue;
                    }
                    if spec.discipline.is_owning() {
                        visitor.enter_edge(self.factory, id, spec, target)?;
                        self.visit_node(visitor, target, visited)?;
                        visitor.leave_edge(self.factory, id, spec, target)?;
                    } else {
                        visitor.visit_edge(self.factory, id, spec, target, payload)?;
                    }
                }
            }
        }

        self.factory.accept_end(id, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EdgeKind, EdgePayload, EdgeSpec, NodeKind};

    /// Records the order of node and edge events.
    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
    }

    impl Visitor for Trace {
        fn enter_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
            let kind = factory.node_kind(id)?;
            self.events.push(format!("enter {kind} {id}"));
            Ok(())
        }

        fn leave_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
            let kind = factory.node_kind(id)?;
            self.events.push(format!("leave {kind} {id}"));
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
            self.events.push(format!("edge {:?} {source}->{target}", spec.kind));
            Ok(())
        }
    }

    fn small_tree() -> (Factory, NodeId, NodeId, NodeId) {
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
        (factory, package, class, method)
    }

    #[test]
    fn preorder_enters_parents_before_children() {
        let (factory, package, class, method) = small_tree();
        let mut trace = Trace::default();
        Preorder::new(&factory).run(&mut trace, package).unwrap();

        assert_eq!(
            trace.events,
            vec![
                format!("enter Package {package}"),
                format!("enter Class {class}"),
                format!("enter Method {method}"),
                format!("leave Method {method}"),
                format!("leave Class {class}"),
                format!("leave Package {package}"),
            ]
        );
    }

    #[test]
    fn filtered_subtree_is_skipped_by_default() {
        let (mut factory, package, class, _method) = small_tree();
        factory.set_filtered_subtree(class).unwrap();

        let mut trace = Trace::default();
        Preorder::new(&factory).run(&mut trace, package).unwrap();
        assert_eq!(
            trace.events,
            vec![
                format!("enter Package {package}"),
                format!("leave Package {package}"),
            ]
        );

        let mut full = Trace::default();
        Preorder::new(&factory)
            .include_filtered(true)
            .run(&mut full, package)
            .unwrap();
        assert_eq!(full.events.len(), 6);
    }

    #[test]
    fn reference_edges_are_reported_without_descent() {
        let (mut factory, package, class, method) = small_tree();
        factory
            .add_edge(class, EdgeKind::ClassExtends, class)
            .unwrap();
        factory
            .set_single(method, EdgeKind::MethodReturns, class)
            .unwrap();

        let mut trace = Trace::default();
        Preorder::new(&factory).run(&mut trace, package).unwrap();

        assert!(trace
            .events
            .contains(&format!("edge ClassExtends {class}->{class}")));
        assert!(trace
            .events
            .contains(&format!("edge MethodReturns {method}->{class}")));
        // Each node is entered exactly once.
        assert_eq!(
            trace
                .events
                .iter()
                .filter(|e| e.starts_with("enter Class"))
                .count(),
            1
        );
    }

    #[test]
    fn run_all_covers_every_root() {
        let (factory, _package, _class, _method) = small_tree();
        let mut extra = factory;
        let component = extra.create_node(NodeKind::Component).unwrap();

        let mut trace = Trace::default();
        Preorder::new(&extra).run_all(&mut trace).unwrap();
        assert!(trace
            .events
            .contains(&format!("enter Component {component}")));
        assert_eq!(
            trace.events.iter().filter(|e| e.starts_with("enter")).count(),
            4
        );
    }
}
