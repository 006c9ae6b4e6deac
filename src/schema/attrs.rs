//! Per-kind attribute sets.
//!
//! Each concrete node kind carries a fixed attribute record whose shape is
//! layered along the kind hierarchy: a `Class` embeds the `Scope` attributes,
//! which embed the `Member` attributes, and so on down to `Named`. The wire
//! format serializes these layers base-first, so the struct nesting here is
//! the single source of truth for field order.
//!
//! Booleans of one hierarchy layer are packed into a single flags byte, both
//! in memory (bitflags) and on the wire.

use bitflags::bitflags;
use strum::{Display, FromRepr};

use crate::strings::Key;
use crate::schema::NodeKind;

/// Source language a member was analysed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum LanguageKind {
    /// Not determined / mixed.
    #[default]
    Unknown = 0,
    /// C or C++.
    Cpp = 1,
    /// Java.
    Java = 2,
    /// C#.
    CSharp = 3,
    /// Python.
    Python = 4,
    /// JavaScript.
    JavaScript = 5,
}

/// Flavor of a class-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum ClassKind {
    /// Plain class.
    #[default]
    Class = 0,
    /// Interface / pure virtual type.
    Interface = 1,
    /// Enumeration.
    Enum = 2,
    /// Struct / value type.
    Struct = 3,
    /// Union.
    Union = 4,
}

/// Flavor of a method-like member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum MethodKind {
    /// Plain method or free function.
    #[default]
    Normal = 0,
    /// Constructor.
    Constructor = 1,
    /// Destructor / finalizer.
    Destructor = 2,
    /// Property getter.
    Get = 3,
    /// Property setter.
    Set = 4,
    /// Operator overload.
    Operator = 5,
}

/// Flavor of a package-like scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum PackageKind {
    /// Plain package / namespace.
    #[default]
    Package = 0,
    /// Java-style module.
    Module = 1,
}

/// Passing direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(u8)]
pub enum ParameterKind {
    /// Input parameter.
    #[default]
    In = 0,
    /// Output parameter.
    Out = 1,
    /// In/out parameter.
    InOut = 2,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Packed boolean attributes shared by every member.
    pub struct MemberFlags: u8 {
        /// Member is static.
        const STATIC = 0x01;
        /// Member was generated by a compiler, not written by hand.
        const COMPILER_GENERATED = 0x02;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Packed boolean attributes of a class.
    pub struct ClassFlags: u8 {
        /// Class is abstract.
        const ABSTRACT = 0x01;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Packed boolean attributes of a method.
    pub struct MethodFlags: u8 {
        /// Method is virtually dispatched.
        const VIRTUAL = 0x01;
        /// Method is abstract (declared without a body).
        const ABSTRACT = 0x02;
    }
}

/// Attributes of the abstract `Named` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NamedAttrs {
    /// Interned name of the element.
    pub name: Key,
}

/// Attributes of the abstract `Member` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberAttrs {
    /// The embedded `Named` layer.
    pub named: NamedAttrs,
    /// Packed member booleans.
    pub flags: MemberFlags,
    /// Language the member was analysed from.
    pub language: LanguageKind,
    /// Interned fully qualified (mangled) name.
    pub mangled_name: Key,
}

/// Attributes of the abstract `Scope` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeAttrs {
    /// The embedded `Member` layer.
    pub member: MemberAttrs,
    /// Logical lines of code of the scope.
    pub lloc: u32,
}

/// Attributes of a `Class` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassAttrs {
    /// The embedded `Scope` layer.
    pub scope: ScopeAttrs,
    /// Class flavor.
    pub class_kind: ClassKind,
    /// Packed class booleans.
    pub flags: ClassFlags,
    /// Instance size in bytes, 0 if unknown.
    pub object_size: u32,
}

/// Attributes of a `Method` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodAttrs {
    /// The embedded `Scope` layer.
    pub scope: ScopeAttrs,
    /// Method flavor.
    pub method_kind: MethodKind,
    /// Packed method booleans.
    pub flags: MethodFlags,
    /// Number of branch points.
    pub num_branches: u32,
    /// Number of statements.
    pub num_statements: u32,
}

/// Attributes of a `Package` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageAttrs {
    /// The embedded `Scope` layer.
    pub scope: ScopeAttrs,
    /// Package flavor.
    pub package_kind: PackageKind,
}

/// Attributes of an `Attribute` (data member) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeAttrs {
    /// The embedded `Member` layer.
    pub member: MemberAttrs,
}

/// Attributes of a `Parameter` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterAttrs {
    /// The embedded `Named` layer.
    pub named: NamedAttrs,
    /// Passing direction.
    pub param_kind: ParameterKind,
}

/// Attributes of a `Comment` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommentAttrs {
    /// Interned comment text.
    pub text: Key,
}

/// Attributes of a `Component` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentAttrs {
    /// The embedded `Named` layer.
    pub named: NamedAttrs,
    /// Total logical lines of code built into the component.
    pub tlloc: u32,
    /// Interned short (display) name.
    pub short_name: Key,
}

/// Attributes of a `File` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttrs {
    /// The embedded `Named` layer.
    pub named: NamedAttrs,
    /// Lines of code of the file.
    pub loc: u32,
}

/// Attributes of a `Folder` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderAttrs {
    /// The embedded `Named` layer.
    pub named: NamedAttrs,
}

/// The attribute record of one node, tagged by its concrete kind.
///
/// The variant always matches the node's [`NodeKind`]; the factory
/// establishes that at creation and nothing can change it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttrs {
    /// Attributes of a `Comment` node.
    Comment(CommentAttrs),
    /// Attributes of a `Component` node.
    Component(ComponentAttrs),
    /// Attributes of a `Parameter` node.
    Parameter(ParameterAttrs),
    /// Attributes of an `Attribute` node.
    Attribute(AttributeAttrs),
    /// Attributes of a `Class` node.
    Class(ClassAttrs),
    /// Attributes of a `Method` node.
    Method(MethodAttrs),
    /// Attributes of a `Package` node.
    Package(PackageAttrs),
    /// Attributes of a `File` node.
    File(FileAttrs),
    /// Attributes of a `Folder` node.
    Folder(FolderAttrs),
}

impl NodeAttrs {
    /// Builds the empty attribute record for a concrete kind.
    ///
    /// Abstract kinds have no record of their own; callers must have
    /// rejected them beforehand (the factory does).
    #[must_use]
    pub fn empty_for(kind: NodeKind) -> Option<NodeAttrs> {
        match kind {
            NodeKind::Comment => Some(NodeAttrs::Comment(CommentAttrs::default())),
            NodeKind::Component => Some(NodeAttrs::Component(ComponentAttrs::default())),
            NodeKind::Parameter => Some(NodeAttrs::Parameter(ParameterAttrs::default())),
            NodeKind::Attribute => Some(NodeAttrs::Attribute(AttributeAttrs::default())),
            NodeKind::Class => Some(NodeAttrs::Class(ClassAttrs::default())),
            NodeKind::Method => Some(NodeAttrs::Method(MethodAttrs::default())),
            NodeKind::Package => Some(NodeAttrs::Package(PackageAttrs::default())),
            NodeKind::File => Some(NodeAttrs::File(FileAttrs::default())),
            NodeKind::Folder => Some(NodeAttrs::Folder(FolderAttrs::default())),
            _ => None,
        }
    }

    /// The concrete kind this record belongs to.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            NodeAttrs::Comment(_) => NodeKind::Comment,
            NodeAttrs::Component(_) => NodeKind::Component,
            NodeAttrs::Parameter(_) => NodeKind::Parameter,
            NodeAttrs::Attribute(_) => NodeKind::Attribute,
            NodeAttrs::Class(_) => NodeKind::Class,
            NodeAttrs::Method(_) => NodeKind::Method,
            NodeAttrs::Package(_) => NodeKind::Package,
            NodeAttrs::File(_) => NodeKind::File,
            NodeAttrs::Folder(_) => NodeKind::Folder,
        }
    }

    /// The interned name key, for kinds descending from `Named`.
    #[must_use]
    pub const fn name(&self) -> Option<Key> {
        match self {
            NodeAttrs::Component(a) => Some(a.named.name),
            NodeAttrs::Parameter(a) => Some(a.named.name),
            NodeAttrs::Attribute(a) => Some(a.member.named.name),
            NodeAttrs::Class(a) => Some(a.scope.member.named.name),
            NodeAttrs::Method(a) => Some(a.scope.member.named.name),
            NodeAttrs::Package(a) => Some(a.scope.member.named.name),
            NodeAttrs::File(a) => Some(a.named.name),
            NodeAttrs::Folder(a) => Some(a.named.name),
            NodeAttrs::Comment(_) => None,
        }
    }
}
