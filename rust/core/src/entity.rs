// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh entities and their ASCII line parsers
//!
//! Each parser turns exactly one text record into one typed value. Parsers
//! know nothing about line numbers; the driver attaches those when it reports
//! an [`EntityError`].

use smallvec::SmallVec;
use thiserror::Error;

use crate::element_type::ElementType;
use crate::tokenizer::{parse_count, parse_float, parse_int, split_fields, tokenize};

/// Physical group tags of one element (usually 2: physical + elementary)
pub type TagList = SmallVec<[i32; 4]>;

/// Node tags of one element
pub type NodeList = SmallVec<[i32; 8]>;

/// Mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub tag: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    #[inline]
    pub fn new(tag: i32, x: f64, y: f64, z: f64) -> Self {
        Self { tag, x, y, z }
    }
}

/// Mesh element: a typed list of node tags plus its group tags
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub tag: i32,
    pub type_id: i32,
    pub physical_group_tags: TagList,
    pub node_tags: NodeList,
}

impl Element {
    pub fn new(tag: i32, type_id: i32, physical_group_tags: &[i32], node_tags: &[i32]) -> Self {
        Self {
            tag,
            type_id,
            physical_group_tags: SmallVec::from_slice(physical_group_tags),
            node_tags: SmallVec::from_slice(node_tags),
        }
    }

    /// Topology, if `type_id` is in the element table
    #[inline]
    pub fn element_type(&self) -> Option<ElementType> {
        ElementType::from_id(self.type_id)
    }

    /// `true` when the type is known and the node list has the expected length
    pub fn has_consistent_node_count(&self) -> bool {
        self.element_type()
            .is_some_and(|t| t.node_count() == self.node_tags.len())
    }
}

/// Named, dimensioned group tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalGroup {
    pub tag: i32,
    pub dimension: i32,
    pub name: String,
}

impl PhysicalGroup {
    pub fn new(tag: i32, dimension: i32, name: impl Into<String>) -> Self {
        Self {
            tag,
            dimension,
            name: name.into(),
        }
    }
}

/// Why a single record could not be turned into an entity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("`{0}` is not a valid number")]
    NotANumber(String),

    #[error("tag count {n_tags} leaves no room in {available} remaining fields")]
    TagCountOutOfRange { n_tags: usize, available: usize },

    #[error("physical name is missing")]
    MissingName,

    #[error("unknown element type {0}")]
    UnknownElementType(i32),

    #[error("element type {type_id} expects {expected} nodes, found {found}")]
    NodeCountMismatch {
        type_id: i32,
        expected: usize,
        found: usize,
    },
}

fn int_field(field: &str) -> Result<i32, EntityError> {
    parse_int(field).ok_or_else(|| EntityError::NotANumber(field.to_string()))
}

fn float_field(field: &str) -> Result<f64, EntityError> {
    parse_float(field).ok_or_else(|| EntityError::NotANumber(field.to_string()))
}

/// Parse a `<tag> <x> <y> <z>` record
pub fn parse_node_line(line: &str) -> Result<Node, EntityError> {
    let fields = tokenize(line);
    if fields.len() != 4 {
        return Err(EntityError::FieldCount {
            expected: 4,
            found: fields.len(),
        });
    }
    Ok(Node {
        tag: int_field(fields[0])?,
        x: float_field(fields[1])?,
        y: float_field(fields[2])?,
        z: float_field(fields[3])?,
    })
}

/// Parse a `<tag> <type> <n_tags> <tags...> <nodes...>` record.
///
/// The type id is not looked up here; any integer is accepted.
pub fn parse_element_line(line: &str) -> Result<Element, EntityError> {
    let fields = tokenize(line);
    if fields.len() < 3 {
        return Err(EntityError::TooFewFields {
            expected: 3,
            found: fields.len(),
        });
    }

    let tag = int_field(fields[0])?;
    let type_id = int_field(fields[1])?;
    let n_tags =
        parse_count(fields[2]).ok_or_else(|| EntityError::NotANumber(fields[2].to_string()))?;

    let rest = &fields[3..];
    if n_tags > rest.len() {
        return Err(EntityError::TagCountOutOfRange {
            n_tags,
            available: rest.len(),
        });
    }

    let (tag_fields, node_fields) = rest.split_at(n_tags);
    let physical_group_tags = tag_fields
        .iter()
        .copied()
        .map(int_field)
        .collect::<Result<TagList, _>>()?;
    let node_tags = node_fields
        .iter()
        .copied()
        .map(int_field)
        .collect::<Result<NodeList, _>>()?;

    Ok(Element {
        tag,
        type_id,
        physical_group_tags,
        node_tags,
    })
}

/// Parse a `<dimension> <tag> "<name>"` record.
///
/// The name is the raw remainder of the line, so separators inside the quotes
/// are kept. One leading and one trailing quote are stripped; embedded quotes
/// are left alone.
pub fn parse_physical_name_line(line: &str) -> Result<PhysicalGroup, EntityError> {
    let (fields, rest) = split_fields(line, 2).ok_or_else(|| EntityError::TooFewFields {
        expected: 3,
        found: tokenize(line).len(),
    })?;
    if rest.is_empty() {
        return Err(EntityError::MissingName);
    }

    let dimension = int_field(fields[0])?;
    let tag = int_field(fields[1])?;
    let name = rest.strip_prefix('"').unwrap_or(rest);
    let name = name.strip_suffix('"').unwrap_or(name);

    Ok(PhysicalGroup {
        tag,
        dimension,
        name: name.to_string(),
    })
}

/// Check an element against the type table
pub fn validate_element(element: &Element) -> Result<(), EntityError> {
    let ty = element
        .element_type()
        .ok_or(EntityError::UnknownElementType(element.type_id))?;
    if ty.node_count() != element.node_tags.len() {
        return Err(EntityError::NodeCountMismatch {
            type_id: element.type_id,
            expected: ty.node_count(),
            found: element.node_tags.len(),
        });
    }
    Ok(())
}
