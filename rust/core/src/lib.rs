// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MSH-Lite Core Parser
//!
//! Streaming reader for Gmsh `.msh` version 2.2 files, ASCII and binary,
//! built with [nom](https://docs.rs/nom).
//!
//! ## Overview
//!
//! - **Section State Machine**: `$Name`/`$EndName` blocks with declared record counts
//! - **Listener Fan-out**: nodes, elements and physical names go to ordered sink chains
//! - **Binary Frames**: packed records decoded in either byte order
//! - **Recoverable Diagnostics**: bad ASCII records are reported and skipped
//! - **Writer**: ASCII or binary v2.2 output that reads back unchanged
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use msh_lite_core::{MshParser, Node, Visit};
//!
//! let mut count = 0;
//! let mut diagnostics = Vec::new();
//! let mut parser = MshParser::new();
//! parser.register_node_listener(|node: &Node| {
//!     count += 1;
//!     Visit::Continue
//! });
//! let summary = parser.parse_file("mesh.msh", &mut diagnostics)?;
//! println!("{} nodes, {} diagnostics", summary.nodes, diagnostics.len());
//! ```
//!
//! ## Whole Meshes
//!
//! When memory is not a concern, collect everything into an [`MshMesh`]:
//!
//! ```rust,ignore
//! use msh_lite_core::{read_msh_file, write_msh_file, MshEncoding, ParserConfig};
//!
//! let mut diagnostics = Vec::new();
//! let mesh = read_msh_file("mesh.msh", ParserConfig::default(), &mut diagnostics)?;
//! for issue in mesh.check() {
//!     eprintln!("{}", issue);
//! }
//! write_msh_file("mesh.bin.msh", &mesh, MshEncoding::Binary)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for parsed data

pub mod binary;
pub mod config;
pub mod diagnostics;
pub mod element_type;
pub mod entity;
pub mod error;
pub mod listener;
pub mod mesh;
pub mod parser;
pub mod section;
pub mod tokenizer;
pub mod writer;

pub use binary::ByteOrder;
pub use config::ParserConfig;
pub use diagnostics::{Diagnostic, ErrorSink, LogSink, Severity};
pub use element_type::ElementType;
pub use entity::{
    parse_element_line, parse_node_line, parse_physical_name_line, validate_element, Element,
    EntityError, Node, PhysicalGroup,
};
pub use error::{Error, Result};
pub use listener::{ElementSink, ListenerRegistry, NodeSink, PhysicalNameSink, Visit};
pub use mesh::{
    check_duplicate_tags, check_element_node_counts, check_node_references, check_physical_names,
    read_msh, read_msh_file, read_msh_str, MeshIssue, MshMesh,
};
pub use parser::{FileFormatInfo, MshParser, ParseSummary};
pub use section::SectionKind;
pub use writer::{write_msh, write_msh_file, MshEncoding};
