//! XML rendering of a graph through the visitor contract.
//!
//! Each node becomes an element named after its concrete kind, its
//! attributes become XML attributes, containment nests elements and every
//! non-containment edge becomes an empty reference element inside its
//! source. The output is a human-readable dump for debugging and diffing;
//! the exact schema is not a stability contract, the binary format is.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::Visitor;
use crate::{
    factory::{Factory, NodeId},
    schema::{EdgePayload, EdgeSpec, NodeAttrs},
    Result,
};

/// Visitor writing the traversed graph as indented XML.
///
/// Drive it with [`crate::visitor::Preorder`]; the root element brackets one
/// traversal.
pub struct XmlDumpVisitor<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlDumpVisitor<W> {
    /// Creates a dump visitor writing to `inner` with two-space indentation.
    pub fn new(inner: W) -> XmlDumpVisitor<W> {
        XmlDumpVisitor {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    /// Consumes the visitor and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn node_element(&self, factory: &Factory, id: NodeId) -> Result<BytesStart<'static>> {
        let kind = factory.node_kind(id)?;
        let name: &'static str = kind.into();
        let mut element = BytesStart::new(name);
        element.push_attribute(("id", id.to_string().as_str()));
        let attrs = factory.attrs(id)?;
        if let Some(key) = attrs.name() {
            if !key.is_empty() {
                element.push_attribute(("name", factory.strings().get(key)));
            }
        }
        if factory.is_filtered(id) {
            element.push_attribute(("filtered", "true"));
        }
        match attrs {
            NodeAttrs::Comment(a) => {
                element.push_attribute(("text", factory.strings().get(a.text)));
            }
            NodeAttrs::Component(a) => {
                element.push_attribute(("tlloc", a.tlloc.to_string().as_str()));
            }
            NodeAttrs::Parameter(a) => {
                element.push_attribute(("paramKind", a.param_kind.to_string().as_str()));
            }
            NodeAttrs::Class(a) => {
                element.push_attribute(("classKind", a.class_kind.to_string().as_str()));
                element.push_attribute(("lloc", a.scope.lloc.to_string().as_str()));
            }
            NodeAttrs::Method(a) => {
                element.push_attribute(("methodKind", a.method_kind.to_string().as_str()));
                element.push_attribute(("lloc", a.scope.lloc.to_string().as_str()));
            }
            NodeAttrs::Package(a) => {
                element.push_attribute(("packageKind", a.package_kind.to_string().as_str()));
            }
            NodeAttrs::File(a) => {
                element.push_attribute(("loc", a.loc.to_string().as_str()));
            }
            NodeAttrs::Attribute(_) | NodeAttrs::Folder(_) => {}
        }
        Ok(element)
    }
}

impl<W: Write> Visitor for XmlDumpVisitor<W> {
    fn begin_visit(&mut self) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new("asg")))?;
        Ok(())
    }

    fn finish_visit(&mut self) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new("asg")))?;
        Ok(())
    }

    fn enter_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        let element = self.node_element(factory, id)?;
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    fn leave_base(&mut self, factory: &Factory, id: NodeId) -> Result<()> {
        let name: &'static str = factory.node_kind(id)?.into();
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn visit_edge(
        &mut self,
        _factory: &Factory,
        _source: NodeId,
        spec: &'static EdgeSpec,
        target: NodeId,
        payload: Option<EdgePayload>,
    ) -> Result<()> {
        let name: &'static str = spec.kind.into();
        let mut element = BytesStart::new(name);
        element.push_attribute(("ref", target.to_string().as_str()));
        if let Some(EdgePayload::Call(call)) = payload {
            element.push_attribute(("callKind", call.to_string().as_str()));
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EdgeKind, NodeKind};
    use crate::visitor::Preorder;

    #[test]
    fn dump_nests_containment_and_marks_references() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        let name = factory.intern("Widget");
        if let NodeAttrs::Class(attrs) = factory.attrs_mut(class).unwrap() {
            attrs.scope.member.named.name = name;
        }
        factory
            .add_edge(class, EdgeKind::ScopeHasMember, method)
            .unwrap();
        factory
            .set_single(method, EdgeKind::MethodReturns, class)
            .unwrap();

        let mut dump = XmlDumpVisitor::new(Vec::new());
        Preorder::new(&factory).run(&mut dump, class).unwrap();
        let xml = String::from_utf8(dump.into_inner()).unwrap();

        assert!(xml.contains("<asg>"));
        assert!(xml.contains(r#"<Class id="2" name="Widget""#));
        assert!(xml.contains("<Method"));
        assert!(xml.contains(r#"<MethodReturns ref="2"/>"#));
        let class_open = xml.find("<Class").unwrap();
        let method_open = xml.find("<Method").unwrap();
        let class_close = xml.find("</Class>").unwrap();
        assert!(class_open < method_open && method_open < class_close);
    }

    #[test]
    fn filtered_nodes_are_absent_from_the_dump() {
        let mut factory = Factory::new();
        let class = factory.create_node(NodeKind::Class).unwrap();
        let method = factory.create_node(NodeKind::Method).unwrap();
        factory
            .add_edge(class, EdgeKind::ScopeHasMember, method)
            .unwrap();
        factory.set_filtered(method, true).unwrap();

        let mut dump = XmlDumpVisitor::new(Vec::new());
        Preorder::new(&factory).run(&mut dump, class).unwrap();
        let xml = String::from_utf8(dump.into_inner()).unwrap();
        assert!(!xml.contains("<Method"));
    }
}
