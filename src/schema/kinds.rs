//! The closed node-kind hierarchy of the graph schema.
//!
//! Every node carries exactly one [`NodeKind`], fixed at creation. Kinds form
//! a single-inheritance hierarchy (e.g. `Parameter` IS-A `Named` IS-A `Base`)
//! which is consulted whenever an edge target must be validated against the
//! kind its schema entry accepts, and which drives the ancestor-fallback of
//! the visitor dispatch.
//!
//! The hierarchy is closed: it is a fixed table in this module, not a trait
//! object zoo. Abstract kinds structure the hierarchy and declare shared
//! attributes and edges; only concrete kinds can be instantiated.

use strum::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Kind tag of a node, drawn from the closed schema hierarchy.
///
/// The discriminant is the wire representation of the kind and must not be
/// reordered once graphs have been persisted.
///
/// # Hierarchy
///
/// ```text
/// Base
/// ├── Comment
/// └── Named
///     ├── Component
///     ├── Parameter
///     ├── File
///     ├── Folder
///     └── Member
///         ├── Attribute
///         └── Scope
///             ├── Class
///             ├── Method
///             └── Package
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumCount,
    EnumIter,
    FromRepr,
    Display,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum NodeKind {
    /// Abstract root of the hierarchy.
    Base = 0,
    /// Abstract: anything carrying a name.
    Named = 1,
    /// Abstract: a named program element owned by a scope.
    Member = 2,
    /// Abstract: a member that can itself own members.
    Scope = 3,
    /// A source comment.
    Comment = 4,
    /// A build/deployment unit (library, binary).
    Component = 5,
    /// A formal parameter of a method.
    Parameter = 6,
    /// A data member.
    Attribute = 7,
    /// A class, interface or similar user-defined type.
    Class = 8,
    /// A method, function or procedure.
    Method = 9,
    /// A package or namespace.
    Package = 10,
    /// A source file.
    File = 11,
    /// A directory of the analysed source tree.
    Folder = 12,
}

impl NodeKind {
    /// The immediate ancestor in the hierarchy, `None` for [`NodeKind::Base`].
    #[must_use]
    pub const fn ancestor(self) -> Option<NodeKind> {
        match self {
            NodeKind::Base => None,
            NodeKind::Named | NodeKind::Comment => Some(NodeKind::Base),
            NodeKind::Member
            | NodeKind::Component
            | NodeKind::Parameter
            | NodeKind::File
            | NodeKind::Folder => Some(NodeKind::Named),
            NodeKind::Scope | NodeKind::Attribute => Some(NodeKind::Member),
            NodeKind::Class | NodeKind::Method | NodeKind::Package => Some(NodeKind::Scope),
        }
    }

    /// Whether this kind equals `target` or descends from it.
    ///
    /// This is the relation every edge-target validation is checked against.
    #[must_use]
    pub fn is_a(self, target: NodeKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == target {
                return true;
            }
            current = kind.ancestor();
        }
        false
    }

    /// Whether this kind is abstract (cannot be instantiated).
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        matches!(
            self,
            NodeKind::Base | NodeKind::Named | NodeKind::Member | NodeKind::Scope
        )
    }

    /// The chain from the hierarchy root down to this kind, root first.
    ///
    /// Drives the base-first field/edge ordering of the wire format and the
    /// schema-order edge enumeration.
    #[must_use]
    pub fn chain(self) -> Vec<NodeKind> {
        let mut chain = Vec::with_capacity(4);
        let mut current = Some(self);
        while let Some(kind) = current {
            chain.push(kind);
            current = kind.ancestor();
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn is_a_walks_the_full_chain() {
        assert!(NodeKind::Method.is_a(NodeKind::Method));
        assert!(NodeKind::Method.is_a(NodeKind::Scope));
        assert!(NodeKind::Method.is_a(NodeKind::Member));
        assert!(NodeKind::Method.is_a(NodeKind::Named));
        assert!(NodeKind::Method.is_a(NodeKind::Base));
        assert!(!NodeKind::Method.is_a(NodeKind::Class));
        assert!(!NodeKind::Comment.is_a(NodeKind::Named));
    }

    #[test]
    fn every_kind_descends_from_base() {
        for kind in NodeKind::iter() {
            assert!(kind.is_a(NodeKind::Base), "{kind} must reach Base");
        }
    }

    #[test]
    fn chain_is_root_first() {
        assert_eq!(
            NodeKind::Class.chain(),
            vec![
                NodeKind::Base,
                NodeKind::Named,
                NodeKind::Member,
                NodeKind::Scope,
                NodeKind::Class
            ]
        );
        assert_eq!(NodeKind::Base.chain(), vec![NodeKind::Base]);
    }

    #[test]
    fn wire_tag_round_trips() {
        for kind in NodeKind::iter() {
            assert_eq!(NodeKind::from_repr(kind as u8), Some(kind));
        }
        assert_eq!(NodeKind::from_repr(200), None);
    }
}
