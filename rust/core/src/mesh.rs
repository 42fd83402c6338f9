// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory mesh built through the listener API, plus consistency checks.

use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::config::ParserConfig;
use crate::diagnostics::ErrorSink;
use crate::element_type::ElementType;
use crate::entity::{Element, Node, PhysicalGroup};
use crate::error::Result;
use crate::listener::Visit;
use crate::parser::{FileFormatInfo, MshParser};

/// Everything a `.msh` file declared, in file order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MshMesh {
    pub format: FileFormatInfo,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub physical_groups: Vec<PhysicalGroup>,
}

impl MshMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map node tags to positions in `nodes`
    pub fn node_index(&self) -> FxHashMap<i32, usize> {
        let mut index = FxHashMap::with_capacity_and_hasher(self.nodes.len(), Default::default());
        for (i, node) in self.nodes.iter().enumerate() {
            index.insert(node.tag, i);
        }
        index
    }

    pub fn node(&self, tag: i32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.tag == tag)
    }

    pub fn element(&self, tag: i32) -> Option<&Element> {
        self.elements.iter().find(|e| e.tag == tag)
    }

    /// Name of the physical group with this dimension and tag
    pub fn physical_name(&self, dimension: i32, tag: i32) -> Option<&str> {
        self.physical_groups
            .iter()
            .find(|g| g.dimension == dimension && g.tag == tag)
            .map(|g| g.name.as_str())
    }

    pub fn elements_of_type(&self, ty: ElementType) -> impl Iterator<Item = &Element> + '_ {
        let id = ty.id();
        self.elements.iter().filter(move |e| e.type_id == id)
    }

    /// Elements whose first group tag is the given physical tag
    pub fn elements_in_group(&self, physical_tag: i32) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(move |e| e.physical_group_tags.first() == Some(&physical_tag))
    }

    /// Run every consistency check
    pub fn check(&self) -> Vec<MeshIssue> {
        let mut issues = check_duplicate_tags(self);
        issues.extend(check_element_node_counts(self));
        issues.extend(check_node_references(self));
        issues.extend(check_physical_names(self));
        issues
    }
}

/// A consistency problem found after parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshIssue {
    #[error("element {element} has unknown type {type_id}")]
    UnknownElementType { element: i32, type_id: i32 },

    #[error("element {element} of type {type_id} lists {found} nodes, expected {expected}")]
    NodeCountMismatch {
        element: i32,
        type_id: i32,
        expected: usize,
        found: usize,
    },

    #[error("element {element} refers to undeclared node {node}")]
    MissingNode { element: i32, node: i32 },

    #[error("node tag {0} is declared more than once")]
    DuplicateNodeTag(i32),

    #[error("element tag {0} is declared more than once")]
    DuplicateElementTag(i32),

    #[error("physical name `{name}` is used by groups {first} and {second}")]
    DuplicatePhysicalName {
        name: String,
        first: i32,
        second: i32,
    },
}

/// Node list length against the element type table
pub fn check_element_node_counts(mesh: &MshMesh) -> Vec<MeshIssue> {
    mesh.elements
        .iter()
        .filter_map(|e| match e.element_type() {
            None => Some(MeshIssue::UnknownElementType {
                element: e.tag,
                type_id: e.type_id,
            }),
            Some(ty) if ty.node_count() != e.node_tags.len() => {
                Some(MeshIssue::NodeCountMismatch {
                    element: e.tag,
                    type_id: e.type_id,
                    expected: ty.node_count(),
                    found: e.node_tags.len(),
                })
            }
            Some(_) => None,
        })
        .collect()
}

/// Every element node must be declared in `$Nodes`
pub fn check_node_references(mesh: &MshMesh) -> Vec<MeshIssue> {
    let declared: FxHashSet<i32> = mesh.nodes.iter().map(|n| n.tag).collect();
    let mut issues = Vec::new();
    for element in &mesh.elements {
        for &node in &element.node_tags {
            if !declared.contains(&node) {
                issues.push(MeshIssue::MissingNode {
                    element: element.tag,
                    node,
                });
            }
        }
    }
    issues
}

/// Node and element tags must be unique within their kind
pub fn check_duplicate_tags(mesh: &MshMesh) -> Vec<MeshIssue> {
    let mut issues = Vec::new();

    let mut seen = FxHashSet::default();
    for node in &mesh.nodes {
        if !seen.insert(node.tag) {
            issues.push(MeshIssue::DuplicateNodeTag(node.tag));
        }
    }

    seen.clear();
    for element in &mesh.elements {
        if !seen.insert(element.tag) {
            issues.push(MeshIssue::DuplicateElementTag(element.tag));
        }
    }

    issues
}

/// Physical names are expected to be unique
pub fn check_physical_names(mesh: &MshMesh) -> Vec<MeshIssue> {
    let mut first_use: FxHashMap<&str, i32> = FxHashMap::default();
    let mut issues = Vec::new();
    for group in &mesh.physical_groups {
        match first_use.entry(group.name.as_str()) {
            Entry::Occupied(entry) => issues.push(MeshIssue::DuplicatePhysicalName {
                name: group.name.clone(),
                first: *entry.get(),
                second: group.tag,
            }),
            Entry::Vacant(entry) => {
                entry.insert(group.tag);
            }
        }
    }
    issues
}

/// Parse a stream into an [`MshMesh`]
pub fn read_msh<R: BufRead + ?Sized>(
    reader: &mut R,
    config: ParserConfig,
    sink: &mut dyn ErrorSink,
) -> Result<MshMesh> {
    let mut mesh = MshMesh::new();
    let summary = {
        let MshMesh {
            nodes,
            elements,
            physical_groups,
            ..
        } = &mut mesh;

        let mut parser = MshParser::with_config(config);
        parser.register_node_listener(|node: &Node| {
            nodes.push(*node);
            Visit::Continue
        });
        parser.register_element_listener(|element: &Element| {
            elements.push(element.clone());
            Visit::Continue
        });
        parser.register_physical_name_listener(|group: &PhysicalGroup| {
            physical_groups.push(group.clone());
            Visit::Continue
        });
        parser.parse(reader, sink)?
    };
    mesh.format = summary.format;
    Ok(mesh)
}

/// Parse text with the default configuration
pub fn read_msh_str(text: &str, sink: &mut dyn ErrorSink) -> Result<MshMesh> {
    let mut bytes = text.as_bytes();
    read_msh(&mut bytes, ParserConfig::default(), sink)
}

pub fn read_msh_file(
    path: impl AsRef<Path>,
    config: ParserConfig,
    sink: &mut dyn ErrorSink,
) -> Result<MshMesh> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    read_msh(&mut reader, config, sink)
}
