//! The closed graph schema: node kinds, their attribute sets and their edges.
//!
//! The schema is the contract every other component is written against. The
//! factory shapes node records by it, the edge model validates targets with
//! it, the visitor traverses in its declaration order and the binary format
//! serializes fields and edges in exactly the order declared here.
//!
//! # Key Components
//!
//! - [`NodeKind`] - the closed, hierarchical kind tag ([`kinds`])
//! - [`NodeAttrs`] and the per-kind attribute structs ([`attrs`])
//! - [`EdgeKind`], [`EdgeSpec`], [`Discipline`] and the per-kind edge
//!   declarations ([`edges`])
//!
//! The concrete kinds modeled here are a representative subset of a full
//! language-independent model; the engine does not care how many kinds the
//! schema declares, only that it is closed and hierarchical.

pub mod attrs;
pub mod edges;
pub mod kinds;

pub use attrs::{
    AttributeAttrs, ClassAttrs, ClassFlags, ClassKind, CommentAttrs, ComponentAttrs, FileAttrs,
    FolderAttrs, LanguageKind, MemberAttrs, MemberFlags, MethodAttrs, MethodFlags, MethodKind,
    NamedAttrs, NodeAttrs, PackageAttrs, PackageKind, ParameterAttrs, ParameterKind, ScopeAttrs,
};
pub use edges::{
    edge_slot, edge_specs, own_edge_specs, CallKind, Discipline, EdgeKind, EdgePayload, EdgeSpec,
};
pub use kinds::NodeKind;
