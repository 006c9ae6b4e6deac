//! Edge kinds, edge disciplines and the per-kind edge schema.
//!
//! Edges come in four disciplines: single owning, single reference, multiple
//! ordered (owning or reference) and multiple ordered with an auxiliary
//! payload per entry. Each edge is declared on exactly one node kind and is
//! inherited by every descendant of that kind; the declared target kind
//! bounds what the edge accepts (target kind must equal it or descend from
//! it).
//!
//! [`edge_specs`] enumerates a kind's edges base-first in declaration order.
//! That order is a contract: the binary format writes fields and edges in
//! exactly this order and the reader infers the next field from it, so no
//! edge-kind tags ever appear on the wire.

use strum::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

use super::NodeKind;

/// Identifier of a schema-declared edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, Display, IntoStaticStr,
)]
pub enum EdgeKind {
    /// `Member.declares` - the declaration a definition belongs to.
    MemberDeclares,
    /// `Member.hasComment` - comments attached to a member.
    MemberHasComment,
    /// `Member.belongsTo` - components a member is built into.
    MemberBelongsTo,
    /// `Scope.hasAnchor` - the at most one comment anchoring a scope.
    ScopeHasAnchor,
    /// `Scope.hasMember` - the members owned by a scope.
    ScopeHasMember,
    /// `Class.extends` - base classes.
    ClassExtends,
    /// `Method.returns` - the return type of a method.
    MethodReturns,
    /// `Method.hasParameter` - the formal parameters, in declaration order.
    MethodHasParameter,
    /// `Method.calls` - callees, qualified by a [`CallKind`] payload.
    MethodCalls,
    /// `Parameter.hasType` - the type of a parameter.
    ParameterHasType,
    /// `Component.contains` - sub-components.
    ComponentContains,
    /// `File.hasComment` - comments attached to a file.
    FileHasComment,
    /// `Folder.containsFile` - files directly inside a folder.
    FolderContainsFile,
    /// `Folder.containsFolder` - sub-folders.
    FolderContainsFolder,
}

/// The four edge disciplines (multiples split by ownership and payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discipline {
    /// At most one target; installs the target's parent pointer.
    SingleOwning,
    /// At most one target; a pure semantic link.
    SingleReference,
    /// Insertion-ordered, append-only sequence; each entry owns its target.
    MultipleOwning,
    /// Insertion-ordered, append-only sequence of semantic links.
    MultipleReference,
    /// As [`Discipline::MultipleReference`], plus a fixed payload per entry.
    MultipleAssociative,
}

impl Discipline {
    /// Whether the edge holds at most one target.
    #[must_use]
    pub const fn is_single(self) -> bool {
        matches!(self, Discipline::SingleOwning | Discipline::SingleReference)
    }

    /// Whether attaching a target also installs its parent pointer.
    ///
    /// Owning edges are the sole mechanism forming the containment tree.
    #[must_use]
    pub const fn is_owning(self) -> bool {
        matches!(self, Discipline::SingleOwning | Discipline::MultipleOwning)
    }

    /// Whether each entry carries an auxiliary payload value.
    #[must_use]
    pub const fn has_payload(self) -> bool {
        matches!(self, Discipline::MultipleAssociative)
    }
}

/// Qualifier payload of [`EdgeKind::MethodCalls`] entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum CallKind {
    /// Statically bound call.
    #[default]
    Static = 0,
    /// Virtually dispatched call.
    Virtual = 1,
    /// Constructor invocation.
    Constructor = 2,
}

/// Auxiliary value attached to one entry of an associative edge.
///
/// Payloads are plain values, not nodes; they are encoded as a single byte
/// following the target id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgePayload {
    /// Call qualifier of a [`EdgeKind::MethodCalls`] entry.
    Call(CallKind),
}

impl EdgePayload {
    /// The wire byte of this payload.
    #[must_use]
    pub const fn to_wire(self) -> u8 {
        match self {
            EdgePayload::Call(kind) => kind as u8,
        }
    }

    /// Decodes a payload byte in the context of the given edge.
    #[must_use]
    pub fn from_wire(edge: EdgeKind, byte: u8) -> Option<EdgePayload> {
        match edge {
            EdgeKind::MethodCalls => CallKind::from_repr(byte).map(EdgePayload::Call),
            _ => None,
        }
    }
}

/// One schema-declared edge of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSpec {
    /// The edge identifier.
    pub kind: EdgeKind,
    /// The edge's discipline.
    pub discipline: Discipline,
    /// Root of the kind subtree this edge accepts as target.
    pub accepts: NodeKind,
}

impl EdgeSpec {
    const fn new(kind: EdgeKind, discipline: Discipline, accepts: NodeKind) -> EdgeSpec {
        EdgeSpec {
            kind,
            discipline,
            accepts,
        }
    }
}

const MEMBER_EDGES: &[EdgeSpec] = &[
    EdgeSpec::new(
        EdgeKind::MemberDeclares,
        Discipline::SingleReference,
        NodeKind::Member,
    ),
    EdgeSpec::new(
        EdgeKind::MemberHasComment,
        Discipline::MultipleReference,
        NodeKind::Comment,
    ),
    EdgeSpec::new(
        EdgeKind::MemberBelongsTo,
        Discipline::MultipleReference,
        NodeKind::Component,
    ),
];

const SCOPE_EDGES: &[EdgeSpec] = &[
    EdgeSpec::new(
        EdgeKind::ScopeHasAnchor,
        Discipline::SingleOwning,
        NodeKind::Comment,
    ),
    EdgeSpec::new(
        EdgeKind::ScopeHasMember,
        Discipline::MultipleOwning,
        NodeKind::Member,
    ),
];

const CLASS_EDGES: &[EdgeSpec] = &[EdgeSpec::new(
    EdgeKind::ClassExtends,
    Discipline::MultipleReference,
    NodeKind::Class,
)];

const METHOD_EDGES: &[EdgeSpec] = &[
    EdgeSpec::new(
        EdgeKind::MethodReturns,
        Discipline::SingleReference,
        NodeKind::Class,
    ),
    EdgeSpec::new(
        EdgeKind::MethodHasParameter,
        Discipline::MultipleOwning,
        NodeKind::Parameter,
    ),
    EdgeSpec::new(
        EdgeKind::MethodCalls,
        Discipline::MultipleAssociative,
        NodeKind::Method,
    ),
];

const PARAMETER_EDGES: &[EdgeSpec] = &[EdgeSpec::new(
    EdgeKind::ParameterHasType,
    Discipline::SingleReference,
    NodeKind::Class,
)];

const COMPONENT_EDGES: &[EdgeSpec] = &[EdgeSpec::new(
    EdgeKind::ComponentContains,
    Discipline::MultipleReference,
    NodeKind::Component,
)];

const FILE_EDGES: &[EdgeSpec] = &[EdgeSpec::new(
    EdgeKind::FileHasComment,
    Discipline::MultipleReference,
    NodeKind::Comment,
)];

const FOLDER_EDGES: &[EdgeSpec] = &[
    EdgeSpec::new(
        EdgeKind::FolderContainsFile,
        Discipline::MultipleOwning,
        NodeKind::File,
    ),
    EdgeSpec::new(
        EdgeKind::FolderContainsFolder,
        Discipline::MultipleOwning,
        NodeKind::Folder,
    ),
];

/// Edges declared directly on `kind` (inherited edges excluded).
#[must_use]
pub const fn own_edge_specs(kind: NodeKind) -> &'static [EdgeSpec] {
    match kind {
        NodeKind::Member => MEMBER_EDGES,
        NodeKind::Scope => SCOPE_EDGES,
        NodeKind::Class => CLASS_EDGES,
        NodeKind::Method => METHOD_EDGES,
        NodeKind::Parameter => PARAMETER_EDGES,
        NodeKind::Component => COMPONENT_EDGES,
        NodeKind::File => FILE_EDGES,
        NodeKind::Folder => FOLDER_EDGES,
        _ => &[],
    }
}

/// All edges of `kind`, base-first in declaration order.
///
/// This is the schema order of the wire format and of visitor traversal.
pub fn edge_specs(kind: NodeKind) -> impl Iterator<Item = &'static EdgeSpec> {
    kind.chain().into_iter().flat_map(|k| own_edge_specs(k).iter())
}

/// Looks up `edge` among the edges of `kind`.
///
/// Returns the slot index (position in [`edge_specs`] order, which is also
/// the position in the node's edge storage) and the spec, or `None` if the
/// kind does not declare the edge.
#[must_use]
pub fn edge_slot(kind: NodeKind, edge: EdgeKind) -> Option<(usize, &'static EdgeSpec)> {
    edge_specs(kind).enumerate().find(|(_, spec)| spec.kind == edge)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn edge_tables_are_const_and_declare_each_edge_once() {
        // The per-kind tables must be usable in const context.
        const METHOD: &[EdgeSpec] = own_edge_specs(NodeKind::Method);
        assert_eq!(METHOD.len(), 3);

        for edge in EdgeKind::iter() {
            let owners = NodeKind::iter()
                .filter(|&kind| own_edge_specs(kind).iter().any(|s| s.kind == edge))
                .count();
            assert_eq!(owners, 1, "{edge} declared on exactly one kind");
        }
    }

    #[test]
    fn method_edges_are_base_first() {
        let kinds: Vec<_> = edge_specs(NodeKind::Method).map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EdgeKind::MemberDeclares,
                EdgeKind::MemberHasComment,
                EdgeKind::MemberBelongsTo,
                EdgeKind::ScopeHasAnchor,
                EdgeKind::ScopeHasMember,
                EdgeKind::MethodReturns,
                EdgeKind::MethodHasParameter,
                EdgeKind::MethodCalls,
            ]
        );
    }

    #[test]
    fn slot_lookup_matches_schema_order() {
        let (slot, spec) = edge_slot(NodeKind::Method, EdgeKind::MethodHasParameter).unwrap();
        assert_eq!(slot, 6);
        assert_eq!(spec.discipline, Discipline::MultipleOwning);
        assert_eq!(spec.accepts, NodeKind::Parameter);
    }

    #[test]
    fn inherited_edges_are_visible_on_descendants() {
        assert!(edge_slot(NodeKind::Class, EdgeKind::ScopeHasMember).is_some());
        assert!(edge_slot(NodeKind::Attribute, EdgeKind::MemberHasComment).is_some());
        assert!(edge_slot(NodeKind::Comment, EdgeKind::ScopeHasMember).is_none());
    }

    #[test]
    fn undeclared_edge_is_absent() {
        assert!(edge_slot(NodeKind::Folder, EdgeKind::MethodCalls).is_none());
    }

    #[test]
    fn payload_round_trips_through_wire_byte() {
        let payload = EdgePayload::Call(CallKind::Virtual);
        let byte = payload.to_wire();
        assert_eq!(EdgePayload::from_wire(EdgeKind::MethodCalls, byte), Some(payload));
        assert_eq!(EdgePayload::from_wire(EdgeKind::MethodCalls, 99), None);
        assert_eq!(EdgePayload::from_wire(EdgeKind::ClassExtends, 0), None);
    }
}
