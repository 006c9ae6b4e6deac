// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'factory/persist.rs' uses mmap to map a persisted graph into memory

//! # asgraph
//!
//! An attributed syntax/semantic graph (ASG) engine for static analysis
//! tooling. Analyzers build a typed graph of program elements (packages,
//! classes, methods, files, ...) through a central [`Factory`], connect them
//! with schema-validated edges, hide irrelevant parts via soft-deletion
//! filtering, and persist the whole graph in a compact binary form.
//!
//! ## Features
//!
//! - **Central factory** - One arena per graph with stable, never-reused ids
//! - **Closed kind hierarchy** - Single-inheritance node kinds with
//!   abstract layers sharing attributes and edges
//! - **Validated edges** - Four edge disciplines (single/multiple,
//!   owning/reference, payload-carrying), every mutation checked against the
//!   schema before any state is touched
//! - **Filtering** - Per-node visibility bit instead of destruction; ids and
//!   edges survive, iteration hides
//! - **Reverse index** - On-demand "who points here" lookup, kept current
//!   while enabled
//! - **Visitors** - Double-dispatch traversal with ancestor-handler fallback
//!   and an XML dump
//! - **Persistence** - Tag-free little-endian binary format with interned
//!   strings, memory-mapped loading
//!
//! ## Quick Start
//!
//! ```rust
//! use asgraph::prelude::*;
//!
//! let mut factory = Factory::new();
//! let class = factory.create_node(NodeKind::Class)?;
//! let method = factory.create_node(NodeKind::Method)?;
//! factory.add_edge(class, EdgeKind::ScopeHasMember, method)?;
//!
//! let data = factory.save()?;
//! let restored = Factory::load(&data)?;
//! assert_eq!(restored.parent(method)?, class);
//! # Ok::<(), asgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of the most commonly used types
//! - [`schema`] - The closed node-kind hierarchy, per-kind attributes and
//!   the edge schema
//! - [`factory`] - Arena, node lifecycle, filtering, edge mutation and
//!   binary persistence
//! - [`reverse`] - The reverse edge index
//! - [`visitor`] - Visitor dispatch, preorder traversal and the XML dump
//! - [`strings`] - Per-graph string interning
//! - [`Error`] and [`Result`] - Error handling across the crate

#[macro_use]
pub(crate) mod error;
pub(crate) mod io;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use asgraph::prelude::*;
///
/// let mut factory = Factory::new();
/// let package = factory.create_node(NodeKind::Package)?;
/// # Ok::<(), asgraph::Error>(())
/// ```
pub mod prelude;

pub mod factory;
pub mod reverse;
pub mod schema;
pub mod strings;
pub mod visitor;

/// Error type covering every failure this library can return.
pub use error::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use factory::{Factory, NodeId};
pub use reverse::ReverseEdges;
pub use schema::{
    CallKind, Discipline, EdgeKind, EdgePayload, EdgeSpec, NodeAttrs, NodeKind,
};
pub use strings::{Key, StringTable};
pub use visitor::{Preorder, Visitor, XmlDumpVisitor};
