//! Low-level byte order and safe reading/writing utilities for the persisted graph format.
//!
//! This module provides endian-aware binary primitives used by the save/load
//! path of the [`crate::Factory`]. It implements safe, bounds-checked reads of
//! fixed-width integers from byte buffers, and infallible appends to an output
//! buffer, ensuring data integrity and preventing overruns while decoding
//! potentially truncated or corrupted graph files.
//!
//! # Key Components
//!
//! - [`WireIO`] - Trait defining the little-endian conversion for primitive types
//! - [`read_le_at`] - Read a value at a specific offset with auto-advance
//! - [`write_le`] - Append a value to an output buffer
//!
//! The persisted graph format is little-endian throughout; no big-endian
//! variants are provided.
//!
//! # Error Handling
//!
//! Reading functions return [`crate::Result`] and fail with
//! [`crate::Error::OutOfBounds`] if there are insufficient bytes in the
//! buffer. Writing appends to a growable buffer and cannot fail.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data conversion.
///
/// This trait provides a unified interface for reading and writing primitive
/// types in little-endian byte order. It is implemented for the fixed-width
/// unsigned integers the wire format is built from (`u8`, `u16`, `u32`).
///
/// Each implementation defines a `Bytes` associated type representing the
/// fixed-size byte array required for that particular type (e.g., `[u8; 4]`
/// for `u32`).
pub trait WireIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

impl WireIO for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        bytes[0]
    }

    fn to_le_bytes(self) -> Self::Bytes {
        [self]
    }
}

impl WireIO for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u16::to_le_bytes(self)
    }
}

impl WireIO for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u32::to_le_bytes(self)
    }
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: WireIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Appends a value of type `T` in little-endian byte order to an output buffer.
///
/// # Arguments
///
/// * `out` - The output buffer to append to
/// * `value` - The value to encode
pub fn write_le<T: WireIO>(out: &mut Vec<u8>, value: T) {
    out.extend_from_slice(value.to_le_bytes().as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_sequential() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut offset = 0;

        let first: u16 = read_le_at(&data, &mut offset).unwrap();
        let second: u16 = read_le_at(&data, &mut offset).unwrap();
        let third: u32 = read_le_at(&data, &mut offset).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(third, 3);
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_past_end() {
        let data = [0x01, 0x00];
        let mut offset = 1;
        assert!(read_le_at::<u32>(&data, &mut offset).is_err());
        // A failed read leaves the offset untouched.
        assert_eq!(offset, 1);
    }

    #[test]
    fn write_then_read() {
        let mut out = Vec::new();
        write_le(&mut out, 0xAABBu16);
        write_le(&mut out, 0x11223344u32);
        write_le(&mut out, 0x7Fu8);
        assert_eq!(out, [0xBB, 0xAA, 0x44, 0x33, 0x22, 0x11, 0x7F]);

        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&out, &mut offset).unwrap(), 0xAABB);
        assert_eq!(read_le_at::<u32>(&out, &mut offset).unwrap(), 0x11223344);
        assert_eq!(read_le_at::<u8>(&out, &mut offset).unwrap(), 0x7F);
    }
}
