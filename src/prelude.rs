//! # asgraph Prelude
//!
//! This module provides a convenient prelude for the most commonly used
//! types and traits of the library. Import it to get quick access to graph
//! construction, traversal and persistence.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all graph operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

// ================================================================================================
// Graph Construction
// ================================================================================================

/// The owner of one attributed graph
pub use crate::Factory;

/// Stable node identity
pub use crate::NodeId;

/// String interning
pub use crate::strings::{Key, StringTable};

// ================================================================================================
// Schema
// ================================================================================================

/// The closed node-kind hierarchy
pub use crate::schema::NodeKind;

/// Edge identifiers, disciplines and payloads
pub use crate::schema::{CallKind, Discipline, EdgeKind, EdgePayload, EdgeSpec};

/// Per-kind attribute records
pub use crate::schema::{
    AttributeAttrs, ClassAttrs, ClassFlags, ClassKind, CommentAttrs, ComponentAttrs, FileAttrs,
    FolderAttrs, LanguageKind, MemberAttrs, MemberFlags, MethodAttrs, MethodFlags, MethodKind,
    NamedAttrs, NodeAttrs, PackageAttrs, PackageKind, ParameterAttrs, ParameterKind, ScopeAttrs,
};

// ================================================================================================
// Traversal and Queries
// ================================================================================================

/// Double-dispatch visitor contract
pub use crate::visitor::Visitor;

/// Preorder containment traversal
pub use crate::visitor::Preorder;

/// XML rendering of a graph
pub use crate::visitor::XmlDumpVisitor;

/// Reverse ("who points here") edge index
pub use crate::ReverseEdges;
