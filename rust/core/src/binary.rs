// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary frame decoding
//!
//! Binary `.msh` sections hold packed records with no padding:
//!
//! - node: `i32 tag, f64 x, f64 y, f64 z` (28 bytes)
//! - element header: `i32 type, i32 count, i32 n_tags` (12 bytes)
//! - element: `i32 tag, n_tags × i32, n_nodes × i32`
//!
//! Fields are decoded one by one from a byte buffer, so the host layout and
//! endianness never matter.

use std::io::{self, Read};

use smallvec::SmallVec;

use crate::entity::{Element, Node};

/// Size of the integer type used by the file
pub const INT_SIZE: usize = 4;
/// Size of the floating point type; the only `data-size` accepted for binary files
pub const DOUBLE_SIZE: usize = 8;
/// Packed node record length
pub const NODE_RECORD_SIZE: usize = INT_SIZE + 3 * DOUBLE_SIZE;
/// Packed element header length
pub const ELEMENT_HEADER_SIZE: usize = 3 * INT_SIZE;

/// Byte order of the binary payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Resolve the byte order from the endianness marker (the integer 1).
    ///
    /// Returns `None` when the marker is 1 in neither order.
    pub fn from_marker(marker: [u8; INT_SIZE]) -> Option<Self> {
        if i32::from_le_bytes(marker) == 1 {
            Some(Self::Little)
        } else if i32::from_be_bytes(marker) == 1 {
            Some(Self::Big)
        } else {
            None
        }
    }

    #[inline]
    pub fn decode_i32(self, bytes: [u8; INT_SIZE]) -> i32 {
        match self {
            Self::Little => i32::from_le_bytes(bytes),
            Self::Big => i32::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn decode_f64(self, bytes: [u8; DOUBLE_SIZE]) -> f64 {
        match self {
            Self::Little => f64::from_le_bytes(bytes),
            Self::Big => f64::from_be_bytes(bytes),
        }
    }
}

/// Header announcing a run of elements sharing type and tag count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    pub ele_type: i32,
    pub num_elements: i32,
    pub num_tags: i32,
}

#[inline]
fn int_at(order: ByteOrder, buf: &[u8], index: usize) -> i32 {
    let start = index * INT_SIZE;
    let mut bytes = [0u8; INT_SIZE];
    bytes.copy_from_slice(&buf[start..start + INT_SIZE]);
    order.decode_i32(bytes)
}

#[inline]
fn double_at(order: ByteOrder, buf: &[u8], offset: usize) -> f64 {
    let mut bytes = [0u8; DOUBLE_SIZE];
    bytes.copy_from_slice(&buf[offset..offset + DOUBLE_SIZE]);
    order.decode_f64(bytes)
}

/// Decode a packed node record
pub fn decode_node(order: ByteOrder, buf: &[u8; NODE_RECORD_SIZE]) -> Node {
    Node {
        tag: int_at(order, buf, 0),
        x: double_at(order, buf, INT_SIZE),
        y: double_at(order, buf, INT_SIZE + DOUBLE_SIZE),
        z: double_at(order, buf, INT_SIZE + 2 * DOUBLE_SIZE),
    }
}

/// Decode a packed element header
pub fn decode_element_header(order: ByteOrder, buf: &[u8; ELEMENT_HEADER_SIZE]) -> ElementHeader {
    ElementHeader {
        ele_type: int_at(order, buf, 0),
        num_elements: int_at(order, buf, 1),
        num_tags: int_at(order, buf, 2),
    }
}

/// Decode one element record of `1 + n_tags + n_nodes` integers
pub fn decode_element(
    order: ByteOrder,
    type_id: i32,
    n_tags: usize,
    n_nodes: usize,
    buf: &[u8],
) -> Element {
    debug_assert_eq!(buf.len(), element_record_size(n_tags, n_nodes));
    let physical_group_tags = (0..n_tags).map(|i| int_at(order, buf, 1 + i)).collect();
    let node_tags = (0..n_nodes)
        .map(|i| int_at(order, buf, 1 + n_tags + i))
        .collect();
    Element {
        tag: int_at(order, buf, 0),
        type_id,
        physical_group_tags,
        node_tags,
    }
}

/// Byte length of one element record
#[inline]
pub fn element_record_size(n_tags: usize, n_nodes: usize) -> usize {
    (1 + n_tags + n_nodes) * INT_SIZE
}

/// Read the 4-byte endianness marker and resolve the byte order
pub fn read_marker<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<ByteOrder>> {
    let mut marker = [0u8; INT_SIZE];
    reader.read_exact(&mut marker)?;
    Ok(ByteOrder::from_marker(marker))
}

/// Reads fixed-size frames from a borrowed stream
pub struct FrameReader<'r, R: Read + ?Sized> {
    reader: &'r mut R,
    order: ByteOrder,
    scratch: SmallVec<[u8; 128]>,
}

impl<'r, R: Read + ?Sized> FrameReader<'r, R> {
    pub fn new(reader: &'r mut R, order: ByteOrder) -> Self {
        Self {
            reader,
            order,
            scratch: SmallVec::new(),
        }
    }

    pub fn read_node(&mut self) -> io::Result<Node> {
        let mut buf = [0u8; NODE_RECORD_SIZE];
        self.reader.read_exact(&mut buf)?;
        Ok(decode_node(self.order, &buf))
    }

    pub fn read_element_header(&mut self) -> io::Result<ElementHeader> {
        let mut buf = [0u8; ELEMENT_HEADER_SIZE];
        self.reader.read_exact(&mut buf)?;
        Ok(decode_element_header(self.order, &buf))
    }

    pub fn read_element(
        &mut self,
        type_id: i32,
        n_tags: usize,
        n_nodes: usize,
    ) -> io::Result<Element> {
        let len = element_record_size(n_tags, n_nodes);
        self.scratch.clear();
        self.scratch.resize(len, 0);
        self.reader.read_exact(&mut self.scratch)?;
        Ok(decode_element(self.order, type_id, n_tags, n_nodes, &self.scratch))
    }
}
