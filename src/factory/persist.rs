//! Compact binary save/load of a whole graph.
//!
//! The format is little-endian throughout and carries no per-field tags:
//! reader and writer share the schema, so the kind byte of a record
//! determines every following field and edge slot, base-first in schema
//! order. Layout:
//!
//! ```text
//! magic "ASGB" | version u16 | node count u32
//! string count u32 | per string: key u32, byte len u32, UTF-8 bytes
//! per node: id u32 | kind u8 | flags u8 (bit0 = filtered)
//!           attribute fields (scalars LE, enums/bitflags one byte,
//!           string keys u32)
//!           single edges: target u32 (0 = absent)
//!           multiple edges: target u32 each (payload byte following the
//!           target on associative edges), 0-terminated
//! ```
//!
//! Only strings actually referenced by a persisted record are written; the
//! marks are collected while encoding the records, so the record body is
//! encoded into a scratch buffer and the string section is spliced in front
//! of it. Keys are remapped on load (the strings survive, their numeric keys
//! need not).
//!
//! # Error Handling
//!
//! A failed load aborts entirely; no half-populated factory is returned.
//! Truncation surfaces as [`Error::OutOfBounds`], anything else that
//! violates the format as [`Error::Malformed`] with context.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use super::{EdgeSlot, Factory, NodeId};
use crate::{
    io::{read_le_at, write_le},
    schema::{
        edge_specs, AttributeAttrs, ClassAttrs, ClassFlags, ClassKind, CommentAttrs,
        ComponentAttrs, EdgePayload, EdgeSpec, FileAttrs, FolderAttrs, LanguageKind, MemberAttrs,
        MemberFlags, MethodAttrs, MethodFlags, MethodKind, NamedAttrs, NodeAttrs, NodeKind,
        PackageAttrs, PackageKind, ParameterAttrs, ParameterKind, ScopeAttrs,
    },
    strings::Key,
    Error, Result,
};

const MAGIC: &[u8; 4] = b"ASGB";
const VERSION: u16 = 1;

/// Record flag bits; anything else set is a format violation.
const FLAG_FILTERED: u8 = 0x01;

/// Collects the string keys referenced while encoding records, first use
/// first, so the string section holds exactly what the records need.
#[derive(Default)]
struct KeyMarks {
    order: Vec<Key>,
    seen: HashSet<Key>,
}

impl KeyMarks {
    fn mark(&mut self, key: Key) {
        if !key.is_empty() && self.seen.insert(key) {
            self.order.push(key);
        }
    }
}

impl Factory {
    /// Serializes the whole graph (filtered nodes included) into a buffer.
    ///
    /// # Errors
    ///
    /// Propagates record access failures; a well-formed factory always
    /// serializes.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut marks = KeyMarks::default();
        let mut body = Vec::new();
        let mut count: u32 = 0;

        for id in self.node_ids() {
            self.encode_node(id, &mut body, &mut marks)?;
            count += 1;
        }

        let mut out = Vec::with_capacity(body.len() + 64);
        out.extend_from_slice(MAGIC);
        write_le(&mut out, VERSION);
        write_le(&mut out, count);

        write_le(&mut out, marks.order.len() as u32);
        for key in &marks.order {
            let value = self.strings.get(*key);
            write_le(&mut out, key.raw());
            write_le(&mut out, value.len() as u32);
            out.extend_from_slice(value.as_bytes());
        }

        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Serializes the graph and writes it to `path`.
    ///
    /// # Errors
    ///
    /// As [`Factory::save`], plus [`Error::FileError`] on I/O failure.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.save()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Reconstructs a factory from a buffer produced by [`Factory::save`].
    ///
    /// Nodes come back under their persisted ids, attributes and ordered
    /// edge lists intact, parent pointers rebuilt from the owning edges.
    /// String keys are remapped through the new factory's table.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] on truncation, [`Error::Malformed`] on any
    /// other format violation (bad magic, unknown kind tag, duplicate id,
    /// dangling target).
    pub fn load(data: &[u8]) -> Result<Factory> {
        let mut offset = 0usize;

        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(malformed_error!("Bad magic, not a persisted graph"));
        }
        offset += MAGIC.len();

        let version: u16 = read_le_at(data, &mut offset)?;
        if version != VERSION {
            return Err(malformed_error!("Unsupported format version {}", version));
        }
        let node_count: u32 = read_le_at(data, &mut offset)?;

        // String section: persisted key -> value. Each entry takes at least
        // 8 bytes of input, so a count the remaining bytes cannot hold is
        // rejected before it sizes any allocation.
        let string_count: u32 = read_le_at(data, &mut offset)?;
        if (string_count as usize) > (data.len() - offset) / 8 {
            return Err(Error::OutOfBounds);
        }
        let mut strings = HashMap::with_capacity(string_count as usize);
        for _ in 0..string_count {
            let raw_key: u32 = read_le_at(data, &mut offset)?;
            let len: u32 = read_le_at(data, &mut offset)?;
            let end = offset
                .checked_add(len as usize)
                .filter(|&end| end <= data.len())
                .ok_or(Error::OutOfBounds)?;
            let value = std::str::from_utf8(&data[offset..end])
                .map_err(|_| malformed_error!("String entry {} is not UTF-8", raw_key))?;
            if raw_key == 0 || strings.insert(raw_key, value.to_string()).is_some() {
                return Err(malformed_error!("Invalid or duplicate string key {}", raw_key));
            }
            offset = end;
        }

        // Ids are handed out densely from FIRST, so every persisted id is
        // below node_count + FIRST; checking that before growing the arena
        // keeps a forged id from sizing an allocation. A record takes at
        // least 6 bytes, which also bounds a forged node count.
        if (node_count as usize) > (data.len() - offset) / 6 {
            return Err(Error::OutOfBounds);
        }
        let id_limit = node_count.saturating_add(NodeId::FIRST);

        let mut factory = Factory::new();
        let mut pending: Vec<PendingEdge> = Vec::new();

        for _ in 0..node_count {
            decode_node(data, &mut offset, id_limit, &mut factory, &strings, &mut pending)?;
        }
        if offset != data.len() {
            return Err(malformed_error!(
                "{} trailing bytes after the last record",
                data.len() - offset
            ));
        }

        // Every node exists now; replaying through the normal mutators
        // validates targets and rebuilds parent pointers.
        for edge in pending {
            match edge.payload {
                Some(payload) => {
                    factory.add_edge_with(edge.source, edge.spec.kind, edge.target, payload)?
                }
                None if edge.spec.discipline.is_single() => {
                    factory.set_single(edge.source, edge.spec.kind, edge.target)?
                }
                None => factory.add_edge(edge.source, edge.spec.kind, edge.target)?,
            }
        }
        Ok(factory)
    }

    /// Memory-maps `path` and reconstructs the factory from it.
    ///
    /// # Errors
    ///
    /// As [`Factory::load`], plus [`Error::FileError`] on I/O failure.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Factory> {
        let file = File::open(path)?;
        // Safety: the mapping is read-only and dropped before returning;
        // concurrent modification of the underlying file is the caller's
        // responsibility, as with any mapped read.
        let mmap = unsafe { Mmap::map(&file)? };
        Factory::load(&mmap)
    }

    fn encode_node(&self, id: NodeId, out: &mut Vec<u8>, marks: &mut KeyMarks) -> Result<()> {
        let record = self.record(id)?;

        write_le(out, id.raw());
        write_le(out, record.kind as u8);
        let flags = if record.filtered { FLAG_FILTERED } else { 0 };
        write_le(out, flags);

        encode_attrs(&record.attrs, out, marks);

        for (slot, spec) in edge_specs(record.kind).enumerate() {
            match &record.edges[slot] {
                EdgeSlot::Single(target) => write_le(out, target.raw()),
                EdgeSlot::Multiple(items) => {
                    for (target, payload) in items {
                        write_le(out, target.raw());
                        if spec.discipline.has_payload() {
                            let byte = payload.map(EdgePayload::to_wire).unwrap_or_default();
                            write_le(out, byte);
                        }
                    }
                    write_le(out, 0u32);
                }
            }
        }
        Ok(())
    }
}

/// One decoded edge entry awaiting replay after all nodes exist.
struct PendingEdge {
    source: NodeId,
    spec: &'static EdgeSpec,
    target: NodeId,
    payload: Option<EdgePayload>,
}

fn decode_node(
    data: &[u8],
    offset: &mut usize,
    id_limit: u32,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
    pending: &mut Vec<PendingEdge>,
) -> Result<()> {
    let raw_id: u32 = read_le_at(data, offset)?;
    let id = NodeId::from_raw(raw_id);
    if !id.is_real() {
        return Err(malformed_error!("Record id {} is reserved", raw_id));
    }
    if raw_id >= id_limit {
        return Err(malformed_error!("Record id {} out of range", raw_id));
    }
    if factory.exists(id) {
        return Err(malformed_error!("Duplicate record id {}", raw_id));
    }

    let kind_tag: u8 = read_le_at(data, offset)?;
    let kind = NodeKind::from_repr(kind_tag)
        .filter(|kind| !kind.is_abstract())
        .ok_or_else(|| malformed_error!("Unknown node kind tag {}", kind_tag))?;

    let flags: u8 = read_le_at(data, offset)?;
    if flags & !FLAG_FILTERED != 0 {
        return Err(malformed_error!("Unknown record flag bits {:#04x}", flags));
    }

    factory.create_node_with_id(kind, id)?;
    if flags & FLAG_FILTERED != 0 {
        factory.set_filtered(id, true)?;
    }

    let attrs = decode_attrs(kind, data, offset, factory, strings)?;
    *factory.attrs_mut(id)? = attrs;

    for spec in edge_specs(kind) {
        if spec.discipline.is_single() {
            let raw: u32 = read_le_at(data, offset)?;
            let target = NodeId::from_raw(raw);
            if target.is_none() {
                continue;
            }
            if !target.is_real() {
                return Err(malformed_error!("Reserved id {} as edge target", raw));
            }
            pending.push(PendingEdge {
                source: id,
                spec,
                target,
                payload: None,
            });
        } else {
            loop {
                let raw: u32 = read_le_at(data, offset)?;
                if raw == 0 {
                    break;
                }
                let target = NodeId::from_raw(raw);
                if !target.is_real() {
                    return Err(malformed_error!("Reserved id {} as edge target", raw));
                }
                let payload = if spec.discipline.has_payload() {
                    let byte: u8 = read_le_at(data, offset)?;
                    Some(EdgePayload::from_wire(spec.kind, byte).ok_or_else(|| {
                        malformed_error!("Invalid payload byte {} on edge {}", byte, spec.kind)
                    })?)
                } else {
                    None
                };
                pending.push(PendingEdge {
                    source: id,
                    spec,
                    target,
                    payload,
                });
            }
        }
    }
    Ok(())
}

// ******************** Attribute field encoding ********************

fn mark_key(key: Key, out: &mut Vec<u8>, marks: &mut KeyMarks) {
    marks.mark(key);
    write_le(out, key.raw());
}

fn encode_named(attrs: &NamedAttrs, out: &mut Vec<u8>, marks: &mut KeyMarks) {
    mark_key(attrs.name, out, marks);
}

fn encode_member(attrs: &MemberAttrs, out: &mut Vec<u8>, marks: &mut KeyMarks) {
    encode_named(&attrs.named, out, marks);
    write_le(out, attrs.flags.bits());
    write_le(out, attrs.language as u8);
    mark_key(attrs.mangled_name, out, marks);
}

fn encode_scope(attrs: &ScopeAttrs, out: &mut Vec<u8>, marks: &mut KeyMarks) {
    encode_member(&attrs.member, out, marks);
    write_le(out, attrs.lloc);
}

fn encode_attrs(attrs: &NodeAttrs, out: &mut Vec<u8>, marks: &mut KeyMarks) {
    match attrs {
        NodeAttrs::Comment(a) => {
            mark_key(a.text, out, marks);
        }
        NodeAttrs::Component(a) => {
            encode_named(&a.named, out, marks);
            write_le(out, a.tlloc);
            mark_key(a.short_name, out, marks);
        }
        NodeAttrs::Parameter(a) => {
            encode_named(&a.named, out, marks);
            write_le(out, a.param_kind as u8);
        }
        NodeAttrs::Attribute(a) => {
            encode_member(&a.member, out, marks);
        }
        NodeAttrs::Class(a) => {
            encode_scope(&a.scope, out, marks);
            write_le(out, a.class_kind as u8);
            write_le(out, a.flags.bits());
            write_le(out, a.object_size);
        }
        NodeAttrs::Method(a) => {
            encode_scope(&a.scope, out, marks);
            write_le(out, a.method_kind as u8);
            write_le(out, a.flags.bits());
            write_le(out, a.num_branches);
            write_le(out, a.num_statements);
        }
        NodeAttrs::Package(a) => {
            encode_scope(&a.scope, out, marks);
            write_le(out, a.package_kind as u8);
        }
        NodeAttrs::File(a) => {
            encode_named(&a.named, out, marks);
            write_le(out, a.loc);
        }
        NodeAttrs::Folder(a) => {
            encode_named(&a.named, out, marks);
        }
    }
}

// ******************** Attribute field decoding ********************

fn decode_key(
    data: &[u8],
    offset: &mut usize,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
) -> Result<Key> {
    let raw: u32 = read_le_at(data, offset)?;
    if raw == 0 {
        return Ok(Key::EMPTY);
    }
    let value = strings
        .get(&raw)
        .ok_or_else(|| malformed_error!("Record references unknown string key {}", raw))?;
    Ok(factory.intern(value))
}

fn decode_named(
    data: &[u8],
    offset: &mut usize,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
) -> Result<NamedAttrs> {
    Ok(NamedAttrs {
        name: decode_key(data, offset, factory, strings)?,
    })
}

fn decode_member(
    data: &[u8],
    offset: &mut usize,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
) -> Result<MemberAttrs> {
    let named = decode_named(data, offset, factory, strings)?;
    let flag_bits: u8 = read_le_at(data, offset)?;
    let flags = MemberFlags::from_bits(flag_bits)
        .ok_or_else(|| malformed_error!("Unknown member flag bits {:#04x}", flag_bits))?;
    let language_tag: u8 = read_le_at(data, offset)?;
    let language = LanguageKind::from_repr(language_tag)
        .ok_or_else(|| malformed_error!("Unknown language tag {}", language_tag))?;
    let mangled_name = decode_key(data, offset, factory, strings)?;
    Ok(MemberAttrs {
        named,
        flags,
        language,
        mangled_name,
    })
}

fn decode_scope(
    data: &[u8],
    offset: &mut usize,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
) -> Result<ScopeAttrs> {
    let member = decode_member(data, offset, factory, strings)?;
    let lloc: u32 = read_le_at(data, offset)?;
    Ok(ScopeAttrs { member, lloc })
}

fn decode_enum<T, F>(data: &[u8], offset: &mut usize, name: &str, from_repr: F) -> Result<T>
where
    F: Fn(u8) -> Option<T>,
{
    let tag: u8 = read_le_at(data, offset)?;
    from_repr(tag).ok_or_else(|| malformed_error!("Unknown {} tag {}", name, tag))
}

fn decode_attrs(
    kind: NodeKind,
    data: &[u8],
    offset: &mut usize,
    factory: &mut Factory,
    strings: &HashMap<u32, String>,
) -> Result<NodeAttrs> {
    let attrs = match kind {
        NodeKind::Comment => NodeAttrs::Comment(CommentAttrs {
            text: decode_key(data, offset, factory, strings)?,
        }),
        NodeKind::Component => {
            let named = decode_named(data, offset, factory, strings)?;
            let tlloc: u32 = read_le_at(data, offset)?;
            let short_name = decode_key(data, offset, factory, strings)?;
            NodeAttrs::Component(ComponentAttrs {
                named,
                tlloc,
                short_name,
            })
        }
        NodeKind::Parameter => {
            let named = decode_named(data, offset, factory, strings)?;
            let param_kind =
                decode_enum(data, offset, "parameter kind", ParameterKind::from_repr)?;
            NodeAttrs::Parameter(ParameterAttrs { named, param_kind })
        }
        NodeKind::Attribute => NodeAttrs::Attribute(AttributeAttrs {
            member: decode_member(data, offset, factory, strings)?,
        }),
        NodeKind::Class => {
            let scope = decode_scope(data, offset, factory, strings)?;
            let class_kind = decode_enum(data, offset, "class kind", ClassKind::from_repr)?;
            let flag_bits: u8 = read_le_at(data, offset)?;
            let flags = ClassFlags::from_bits(flag_bits)
                .ok_or_else(|| malformed_error!("Unknown class flag bits {:#04x}", flag_bits))?;
            let object_size: u32 = read_le_at(data, offset)?;
            NodeAttrs::Class(ClassAttrs {
                scope,
                class_kind,
                flags,
                object_size,
            })
        }
        NodeKind::Method => {
            let scope = decode_scope(data, offset, factory, strings)?;
            let method_kind = decode_enum(data, offset, "method kind", MethodKind::from_repr)?;
            let flag_bits: u8 = read_le_at(data, offset)?;
            let flags = MethodFlags::from_bits(flag_bits)
                .ok_or_else(|| malformed_error!("Unknown method flag bits {:#04x}", flag_bits))?;
            let num_branches: u32 = read_le_at(data, offset)?;
            let num_statements: u32 = read_le_at(data, offset)?;
            NodeAttrs::Method(MethodAttrs {
                scope,
                method_kind,
                flags,
                num_branches,
                num_statements,
            })
        }
        NodeKind::Package => {
            let scope = decode_scope(data, offset, factory, strings)?;
            let package_kind = decode_enum(data, offset, "package kind", PackageKind::from_repr)?;
            NodeAttrs::Package(PackageAttrs {
                scope,
                package_kind,
            })
        }
        NodeKind::File => {
            let named = decode_named(data, offset, factory, strings)?;
            let loc: u32 = read_le_at(data, offset)?;
            NodeAttrs::File(FileAttrs { named, loc })
        }
        NodeKind::Folder => NodeAttrs::Folder(FolderAttrs {
            named: decode_named(data, offset, factory, strings)?,
        }),
        // Callers reject abstract tags before reaching attribute decoding.
        _ => return Err(Error::AbstractKind(kind)),
    };
    Ok(attrs)
}
