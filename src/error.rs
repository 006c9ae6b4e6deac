use thiserror::Error;

use crate::{
    factory::NodeId,
    schema::{EdgeKind, NodeKind},
};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure in this crate is either a programmer error (wrong id, wrong kind, edge not
/// declared by the schema) or a data-integrity error in a persisted graph. Neither category is
/// retried; errors propagate synchronously to the immediate caller and no mutating operation
/// commits partial state before failing.
///
/// # Error Categories
///
/// ## Graph Errors
/// - [`Error::NotFound`] - An id names no live node
/// - [`Error::InvalidEdgeTarget`] - Edge target kind outside the schema-accepted subtree
/// - [`Error::UndeclaredEdge`] - Edge kind not declared for the source node's kind
/// - [`Error::AbstractKind`] - Attempt to instantiate an abstract node kind
///
/// ## Persistence Errors
/// - [`Error::Malformed`] - Corrupted or truncated persisted graph data
/// - [`Error::OutOfBounds`] - Attempted to read beyond the persisted data
/// - [`Error::FileError`] - Filesystem I/O errors
#[derive(Error, Debug)]
pub enum Error {
    /// The id names no live node in the arena.
    ///
    /// Returned by every operation that resolves an id: accessors, edge
    /// mutations whose source or (nonzero) target does not exist, and
    /// reverse-index queries.
    #[error("No node exists for id {0}")]
    NotFound(NodeId),

    /// An edge target's kind lies outside the subtree accepted by the schema.
    ///
    /// Each declared edge accepts exactly one node kind; a target is valid if
    /// its kind equals the accepted kind or is a descendant of it. The
    /// mutation fails before touching any state.
    #[error("Edge {edge} accepts {expected} but target {target} has kind {actual}")]
    InvalidEdgeTarget {
        /// The edge whose validation failed.
        edge: EdgeKind,
        /// The kind (subtree root) the schema accepts for this edge.
        expected: NodeKind,
        /// The offending target id.
        target: NodeId,
        /// The target's actual kind.
        actual: NodeKind,
    },

    /// The edge kind is not declared for the source node's kind.
    ///
    /// Edges are part of the closed schema: a `Method` has parameters, a
    /// `Comment` does not. Using an edge outside its declaring kind, or with
    /// an accessor of the wrong discipline, is a programming error.
    #[error("Edge {edge} is not declared for nodes of kind {kind}")]
    UndeclaredEdge {
        /// The kind of the source node.
        kind: NodeKind,
        /// The undeclared (or wrong-discipline) edge.
        edge: EdgeKind,
    },

    /// Attempted to create a node of an abstract kind.
    ///
    /// Abstract kinds (`Base`, `Named`, `Member`, `Scope`) only structure the
    /// hierarchy; nodes are always instances of a concrete kind.
    #[error("Node kind {0} is abstract and cannot be instantiated")]
    AbstractKind(NodeKind),

    /// The persisted graph data is damaged and could not be loaded.
    ///
    /// This error indicates truncated input, an unknown node-kind tag, a
    /// dangling edge target or any other violation of the binary format. A
    /// failed load aborts entirely; no half-populated arena is ever returned.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading persisted data.
    ///
    /// Safety check of the reader primitives; prevents overruns on truncated
    /// or corrupted graph files.
    #[error("Out of bound read would have occurred!")]
    OutOfBounds,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors raised while reading or writing a persisted
    /// graph file.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
