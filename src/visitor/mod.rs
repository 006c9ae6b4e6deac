//! Double-dispatch visitor mechanism over the node-kind hierarchy.
//!
//! A [`Visitor`] exposes an enter/leave pair per concrete kind and callbacks
//! per declared edge. Dispatch is double: [`Factory::accept`] resolves a
//! node's concrete kind and invokes the matching handler, and each concrete
//! kind's default handler delegates to its immediate ancestor's handler. A
//! visitor overriding only `enter_member` is therefore still reached for
//! every `Class`, `Method`, `Package` and `Attribute` without knowing the
//! hierarchy.
//!
//! Containment multi-edges are bracketed by [`Visitor::enter_edge`] /
//! [`Visitor::leave_edge`] around the descent; non-containment edges are
//! marked by a single [`Visitor::visit_edge`] call carrying the payload of
//! associative entries.
//!
//! The traversal driver lives in [`preorder`]; [`xml`] renders a graph as an
//! XML document through this dispatch contract.

pub mod preorder;
pub mod xml;

pub use preorder::Preorder;
pub use xml::XmlDumpVisitor;

use crate::{
    factory::{Factory, NodeId},
    schema::{EdgePayload, EdgeSpec, NodeKind},
    Error, Result,
};

/// Receiver of a graph traversal.
///
/// Every method has a default body: kind handlers delegate to their
/// ancestor's handler, everything else is a no-op, so a visitor only
/// implements the level of the hierarchy it cares about.
#[allow(unused_variables)]
pub trait Visitor {
    /// Called once before the first node of a traversal.
    fn begin_visit(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once after the last node of a traversal.
    fn finish_visit(&mut self) -> Result<()> {
        Ok(())
    }

    // ******************** Kind handlers, abstract layers ********************

    /// Fallback handler at the root of the hierarchy.
    fn enter_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        Ok(())
    }

    /// Leave-side fallback at the root of the hierarchy.
    fn leave_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        Ok(())
    }

    /// Handler for the abstract `Named` layer.
    fn enter_named(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_base(factory, id)
    }

    /// Leave-side handler for the abstract `Named` layer.
    fn leave_named(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_base(factory, id)
    }

    /// Handler for the abstract `Member` layer.
    fn enter_member(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_named(factory, id)
    }

    /// Leave-side handler for the abstract `Member` layer.
    fn leave_member(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_named(factory, id)
    }

    /// Handler for the abstract `Scope` layer.
    fn enter_scope(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_member(factory, id)
    }

    /// Leave-side handler for the abstract `Scope` layer.
    fn leave_scope(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_member(factory, id)
    }

    // ******************** Kind handlers, concrete kinds ********************

    /// Handler for `Comment` nodes.
    fn enter_comment(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_base(factory, id)
    }

    /// Leave-side handler for `Comment` nodes.
    fn leave_comment(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_base(factory, id)
    }

    /// Handler for `Component` nodes.
    fn enter_component(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_named(factory, id)
    }

    /// Leave-side handler for `Component` nodes.
    fn leave_component(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_named(factory, id)
    }

    /// Handler for `Parameter` nodes.
    fn enter_parameter(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_named(factory, id)
    }

    /// Leave-side handler for `Parameter` nodes.
    fn leave_parameter(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_named(factory, id)
    }

    /// Handler for `Attribute` nodes.
    fn enter_attribute(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_member(factory, id)
    }

    /// Leave-side handler for `Attribute` nodes.
    fn leave_attribute(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_member(factory, id)
    }

    /// Handler for `Class` nodes.
    fn enter_class(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_scope(factory, id)
    }

    /// Leave-side handler for `Class` nodes.
    fn leave_class(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_scope(factory, id)
    }

    /// Handler for `Method` nodes.
    fn enter_method(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_scope(factory, id)
    }

    /// Leave-side handler for `Method` nodes.
    fn leave_method(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_scope(factory, id)
    }

    /// Handler for `Package` nodes.
    fn enter_package(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_scope(factory, id)
    }

    /// Leave-side handler for `Package` nodes.
    fn leave_package(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_scope(factory, id)
    }

    /// Handler for `File` nodes.
    fn enter_file(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_named(factory, id)
    }

    /// Leave-side handler for `File` nodes.
    fn leave_file(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_named(factory, id)
    }

    /// Handler for `Folder` nodes.
    fn enter_folder(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.enter_named(factory, id)
    }

    /// Leave-side handler for `Folder` nodes.
    fn leave_folder(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        self.leave_named(factory, id)
    }

    // ******************** Edge callbacks ********************

    /// Opens the bracket around the descent into one containment edge entry.
    fn enter_edge(
        &mut self,
        factory: &Factory,
        source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
    ) -> Result<()> {
        Ok(())
    }

    /// Closes the bracket around the descent into one containment edge entry.
    fn leave_edge(
        &mut self,
        factory: &Factory,
        source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
    ) -> Result<()> {
        Ok(())
    }

    /// Marks one non-containment edge entry; the traversal does not recurse
    /// into the target.
    fn visit_edge(
        &mut self,
        factory: &Factory,
        source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
        payload: Option<EdgePayload>,
    ) -> Result<()> {
        Ok(())
    }
}

impl Factory {
    /// Dispatches the enter handler of `id`'s concrete kind on `visitor`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `id` names no live node; handler errors are
    /// propagated.
    pub fn accept(&self, id: NodeId, visitor: &mut dyn Visitor) -> Result<()> {
        match self.node_kind(id)? {
            NodeKind::Comment => visitor.enter_comment(self, id),
            NodeKind::Component => visitor.enter_component(self, id),
            NodeKind::Parameter => visitor.enter_parameter(self, id),
            NodeKind::Attribute => visitor.enter_attribute(self, id),
            NodeKind::Class => visitor.enter_class(self, id),
            NodeKind::Method => visitor.enter_method(self, id),
            NodeKind::Package => visitor.enter_package(self, id),
            NodeKind::File => visitor.enter_file(self, id),
            NodeKind::Folder => visitor.enter_folder(self, id),
            // Live records are always of a concrete kind.
            kind => Err(Error::AbstractKind(kind)),
        }
    }

    /// Dispatches the leave handler of `id`'s concrete kind on `visitor`.
    ///
    /// # Errors
    ///
    /// As [`Factory::accept`].
    pub fn accept_end(&self, id: NodeId, visitor: &mut dyn Visitor) -> Result<()> {
        match self.node_kind(id)? {
            NodeKind::Comment => visitor.leave_comment(self, id),
            NodeKind::Component => visitor.leave_component(self, id),
            NodeKind::Parameter => visitor.leave_parameter(self, id),
            NodeKind::Attribute => visitor.leave_attribute(self, id),
            NodeKind::Class => visitor.leave_class(self, id),
            NodeKind::Method => visitor.leave_method(self, id),
            NodeKind::Package => visitor.leave_package(self, id),
            NodeKind::File => visitor.leave_file(self, id),
            NodeKind::Folder => visitor.leave_folder(self, id),
            kind => Err(Error::AbstractKind(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeKind;

    /// Counts how often the `Member` fallback is reached.
    #[derive(Default)]
    struct MemberCounter {
        entered: usize,
        left: usize,
    }

    impl Visitor for MemberCounter {
        fn enter_member(&mut self, _factory: &Factory, _id: NodeId) -> Result<()> {
            self.entered += 1;
            Ok(())
        }

        fn leave_member(&mut self, _factory: &Factory, _id: NodeId) -> Result<()> {
            self.left += 1;
            Ok(())
        }
    }

    #[test]
    fn ancestor_handler_is_reached_for_every_descendant() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        let attribute = factory.create_node(NodeKind::Attribute).unwrap();
        let comment = factory.create_node(NodeKind::Comment).unwrap();

        let mut counter = MemberCounter::default();
        for id in [class, method, attribute, comment] {
            factory.accept(id, &mut counter).unwrap();
            factory.accept_end(id, &mut counter).unwrap();
        }

        // Class, Method and Attribute are members; Comment is not.
        assert_eq!(counter.entered, 3);
        assert_eq!(counter.left, 3);
    }

    /// Overriding a concrete kind cuts the fallback chain for that kind only.
    struct ClassAware {
        classes: usize,
        members: usize,
    }

    impl Visitor for ClassAware {
        fn enter_class(&mut self, _factory: &Factory, _id: NodeId) -> Result<()> {
            self.classes += 1;
            Ok(())
        }

        fn enter_member(&mut self, _factory: &Factory, _id: NodeId) -> Result<()> {
            self.members += 1;
            Ok(())
        }
    }

    #[test]
    fn override_shadows_the_fallback() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();

        let mut visitor = ClassAware {
            classes: 0,
            members: 0,
        };
        factory.accept(class, &mut visitor).unwrap();
        factory.accept(method, &mut visitor).unwrap();

        assert_eq!(visitor.classes, 1);
        assert_eq!(visitor.members, 1);
    }
}
