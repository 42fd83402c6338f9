// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gmsh `.msh` v2.2 parser driver
//!
//! One blocking pass over a borrowed stream. Lines are classified by the
//! section state machine and routed to the entity parsers; in binary files the
//! `$Nodes`/`$Elements` payloads are read as packed frames until the declared
//! record count is exhausted. Every entity goes through the listener registry
//! and is dropped afterwards.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::binary::{read_marker, ByteOrder, FrameReader, DOUBLE_SIZE};
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, ErrorSink};
use crate::element_type::ElementType;
use crate::entity::{
    parse_element_line, parse_node_line, parse_physical_name_line, validate_element,
};
use crate::error::{Error, Result};
use crate::listener::{ElementSink, ListenerRegistry, NodeSink, PhysicalNameSink};
use crate::section::{classify_header, Header, SectionKind};
use crate::tokenizer::{parse_count, parse_float, parse_int, tokenize};

/// Upper bound on tags per binary element; anything larger is garbage
const MAX_ELEMENT_TAGS: usize = 4096;

/// Contents of the `$MeshFormat` section
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileFormatInfo {
    pub version: f64,
    pub binary: bool,
    pub data_size: usize,
    /// The endianness marker read as little-endian, the byte order Gmsh
    /// writes on common hosts
    pub matching_endian: bool,
    /// Byte order used to decode binary frames
    pub byte_order: ByteOrder,
}

impl Default for FileFormatInfo {
    fn default() -> Self {
        Self {
            version: 2.2,
            binary: false,
            data_size: DOUBLE_SIZE,
            matching_endian: true,
            byte_order: ByteOrder::Little,
        }
    }
}

/// Progress through a binary `$Nodes`/`$Elements` payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BinaryParseInfo {
    parsing_binary: bool,
    /// Elements left in the current header block
    count_var: usize,
    ele_type: i32,
    ele_tag_count: usize,
    ele_nodes: usize,
}

#[derive(Debug, Default)]
struct ParserState {
    current_section: SectionKind,
    /// Tag name as written, used to check the end tag
    section_name: String,
    line_count: usize,
    section_start_line: usize,
    expect_lines_to_next_section: usize,
    declared_count: usize,
    /// Next data line is the record count
    count_pending: bool,
    format_seen: bool,
    binary_info: BinaryParseInfo,
    format_info: FileFormatInfo,
    diagnostics: usize,
}

impl ParserState {
    fn open(&mut self, kind: SectionKind, name: &str) {
        self.current_section = kind;
        self.section_name.clear();
        self.section_name.push_str(name);
        self.section_start_line = self.line_count;
        self.expect_lines_to_next_section = 0;
        self.declared_count = 0;
        self.count_pending = kind.is_counted();
        self.binary_info = BinaryParseInfo::default();
    }

    fn close(&mut self) {
        self.current_section = SectionKind::NoSection;
        self.section_name.clear();
        self.expect_lines_to_next_section = 0;
        self.count_pending = false;
        self.binary_info = BinaryParseInfo::default();
    }
}

/// What a completed parse saw
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseSummary {
    pub format: FileFormatInfo,
    /// Nodes dispatched to the node chain
    pub nodes: usize,
    /// Elements dispatched to the element chain
    pub elements: usize,
    /// Physical names dispatched to the physical-name chain
    pub physical_names: usize,
    /// Diagnostics raised, including any beyond `max_diagnostics`
    pub diagnostics: usize,
    pub lines: usize,
}

/// Parse the `<version> <file-type> <data-size>` line
fn parse_format_line(text: &str, line: usize) -> Result<FileFormatInfo> {
    let fields = tokenize(text);
    if fields.len() != 3 {
        return Err(Error::malformed(
            line,
            format!("format line needs 3 fields, found {}", fields.len()),
        ));
    }

    let version = parse_float(fields[0])
        .ok_or_else(|| Error::malformed(line, format!("`{}` is not a version", fields[0])))?;
    let file_type = parse_int(fields[1])
        .ok_or_else(|| Error::malformed(line, format!("`{}` is not a file type", fields[1])))?;
    let data_size = parse_count(fields[2])
        .ok_or_else(|| Error::malformed(line, format!("`{}` is not a data size", fields[2])))?;

    if version.trunc() != 2.0 {
        return Err(Error::unsupported(
            line,
            format!("version {} (only 2.x is supported)", version),
        ));
    }
    let binary = match file_type {
        0 => false,
        1 => true,
        other => return Err(Error::unsupported(line, format!("file type {}", other))),
    };
    if binary && data_size != DOUBLE_SIZE {
        return Err(Error::unsupported(
            line,
            format!("binary data size {} (expected {})", data_size, DOUBLE_SIZE),
        ));
    }

    Ok(FileFormatInfo {
        version,
        binary,
        data_size,
        ..FileFormatInfo::default()
    })
}

/// Map a failed frame read; a short read means the stream lost its framing
fn frame_error(line: usize, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::desync(line, "stream ended inside a binary record")
    } else {
        Error::Io(err)
    }
}

/// Streaming `.msh` parser with listener fan-out
#[derive(Debug, Default)]
pub struct MshParser<'a> {
    config: ParserConfig,
    listeners: ListenerRegistry<'a>,
}

impl<'a> MshParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry<'a> {
        &self.listeners
    }

    pub fn register_node_listener(&mut self, sink: impl NodeSink + 'a) {
        self.listeners.register_node_listener(sink);
    }

    pub fn register_element_listener(&mut self, sink: impl ElementSink + 'a) {
        self.listeners.register_element_listener(sink);
    }

    pub fn register_physical_name_listener(&mut self, sink: impl PhysicalNameSink + 'a) {
        self.listeners.register_physical_name_listener(sink);
    }

    /// Open and parse a file. Failure to open is reported as [`Error::Io`]
    /// before any section is entered.
    pub fn parse_file(
        &mut self,
        path: impl AsRef<Path>,
        sink: &mut dyn ErrorSink,
    ) -> Result<ParseSummary> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        self.parse(&mut reader, sink)
    }

    pub fn parse_str(&mut self, text: &str, sink: &mut dyn ErrorSink) -> Result<ParseSummary> {
        self.parse_bytes(text.as_bytes(), sink)
    }

    pub fn parse_bytes(
        &mut self,
        mut data: &[u8],
        sink: &mut dyn ErrorSink,
    ) -> Result<ParseSummary> {
        self.parse(&mut data, sink)
    }

    /// Parse a whole stream. The caller keeps ownership of the reader.
    pub fn parse<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
        sink: &mut dyn ErrorSink,
    ) -> Result<ParseSummary> {
        let mut state = ParserState::default();
        let mut summary = ParseSummary::default();
        let mut buf = Vec::with_capacity(128);

        loop {
            if state.binary_info.parsing_binary {
                self.step_binary(reader, &mut state, &mut summary)?;
                continue;
            }

            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            state.line_count += 1;

            // Skipped sections may carry binary payloads; only headers matter
            if state.current_section == SectionKind::Unsupported {
                if memchr::memchr(b'$', &buf).is_some() {
                    let text = String::from_utf8_lossy(&buf);
                    let text = text.trim();
                    if classify_header(text).is_some() {
                        self.handle_header(text, &mut state, sink)?;
                    }
                }
                continue;
            }

            let text = match std::str::from_utf8(&buf) {
                Ok(text) => text.trim(),
                Err(_) => {
                    self.skip_invalid_line(&buf, &mut state, sink);
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }

            if text.starts_with('$') {
                self.handle_header(text, &mut state, sink)?;
            } else {
                self.handle_data(reader, text, &mut state, &mut summary, sink)?;
            }
        }

        if state.current_section != SectionKind::NoSection {
            let line = state.line_count;
            let message = format!(
                "input ended inside section `${}` opened at line {}",
                state.section_name, state.section_start_line
            );
            self.report(&mut state, sink, Diagnostic::warning(line, message));
        }

        summary.format = state.format_info;
        summary.lines = state.line_count;
        summary.diagnostics = state.diagnostics;
        tracing::info!(
            nodes = summary.nodes,
            elements = summary.elements,
            physical_names = summary.physical_names,
            diagnostics = summary.diagnostics,
            binary = summary.format.binary,
            "Parsed mesh"
        );
        Ok(summary)
    }

    fn handle_header(
        &mut self,
        text: &str,
        state: &mut ParserState,
        sink: &mut dyn ErrorSink,
    ) -> Result<()> {
        let line = state.line_count;
        match classify_header(text) {
            Some(Header::End { name }) => self.close_section(name, state, sink),
            Some(Header::Begin {
                kind: SectionKind::Invalid,
                name,
            }) => Err(Error::UnknownSection {
                line,
                name: name.to_string(),
            }),
            Some(Header::Begin { kind, name }) => {
                if state.current_section != SectionKind::NoSection {
                    let message = format!(
                        "section `${}` opened while `${}` is still open",
                        name, state.section_name
                    );
                    self.report(state, sink, Diagnostic::warning(line, message));
                }
                if kind == SectionKind::Unsupported {
                    tracing::info!(line, section = name, "Skipping unsupported section");
                } else {
                    tracing::debug!(line, section = name, "Opening section");
                }
                state.open(kind, name);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn close_section(
        &mut self,
        closed: &str,
        state: &mut ParserState,
        sink: &mut dyn ErrorSink,
    ) -> Result<()> {
        let line = state.line_count;

        if state.current_section == SectionKind::NoSection {
            let message = format!("`$End{}` without an open section", closed);
            self.report(state, sink, Diagnostic::warning(line, message));
        } else if closed != state.section_name {
            if self.config.strict_section_end {
                return Err(Error::SectionMismatch {
                    line,
                    open: state.section_name.clone(),
                    closed: closed.to_string(),
                });
            }
            let message = format!("`$End{}` closes section `${}`", closed, state.section_name);
            self.report(state, sink, Diagnostic::warning(line, message));
        }

        if state.current_section.is_counted() {
            if state.count_pending {
                let message = format!("section `${}` has no record count", state.section_name);
                self.report(state, sink, Diagnostic::warning(line, message));
            } else if state.expect_lines_to_next_section > 0 {
                let message = format!(
                    "section `${}` closed with {} of {} records missing",
                    state.section_name, state.expect_lines_to_next_section, state.declared_count
                );
                self.report(state, sink, Diagnostic::warning(line, message));
            }
        }

        tracing::debug!(line, section = %state.current_section, "Closing section");
        state.close();
        Ok(())
    }

    fn handle_data<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
        text: &str,
        state: &mut ParserState,
        summary: &mut ParseSummary,
        sink: &mut dyn ErrorSink,
    ) -> Result<()> {
        let line = state.line_count;
        match state.current_section {
            SectionKind::NoSection | SectionKind::Invalid => {
                Err(Error::DataOutsideSection { line })
            }
            SectionKind::Unsupported => Ok(()),
            SectionKind::FileInfo => {
                if state.format_seen {
                    self.report(
                        state,
                        sink,
                        Diagnostic::warning(line, "extra line in `$MeshFormat` ignored"),
                    );
                    return Ok(());
                }
                let mut format = parse_format_line(text, line)?;
                if format.binary {
                    let order = read_marker(reader)
                        .map_err(|e| frame_error(line, e))?
                        .ok_or_else(|| {
                            Error::desync(line, "endianness marker is not 1 in either byte order")
                        })?;
                    format.byte_order = order;
                    format.matching_endian = order == ByteOrder::Little;
                    if !format.matching_endian {
                        tracing::warn!(line, "Binary payload is big-endian, swapping byte order");
                    }
                }
                tracing::debug!(
                    version = format.version,
                    binary = format.binary,
                    data_size = format.data_size,
                    "Read mesh format"
                );
                state.format_info = format;
                state.format_seen = true;
                Ok(())
            }
            kind => {
                if state.count_pending {
                    let count = match tokenize(text).as_slice() {
                        [field] => parse_count(field),
                        _ => None,
                    }
                    .ok_or_else(|| {
                        Error::malformed(line, format!("`{}` is not a record count", text))
                    })?;
                    state.count_pending = false;
                    state.expect_lines_to_next_section = count;
                    state.declared_count = count;
                    if state.format_info.binary && kind.has_binary_records() && count > 0 {
                        state.binary_info.parsing_binary = true;
                    }
                    return Ok(());
                }

                if state.expect_lines_to_next_section == 0 {
                    let message = format!(
                        "record beyond the declared count of {}",
                        state.declared_count
                    );
                    self.report(state, sink, Diagnostic::error(line, message, text));
                    return Ok(());
                }

                state.expect_lines_to_next_section -= 1;
                self.dispatch_line(kind, text, state, summary, sink);
                Ok(())
            }
        }
    }

    /// Parse one ASCII record; failures are reported and the line is dropped
    fn dispatch_line(
        &mut self,
        kind: SectionKind,
        text: &str,
        state: &mut ParserState,
        summary: &mut ParseSummary,
        sink: &mut dyn ErrorSink,
    ) {
        let outcome = match kind {
            SectionKind::Nodes => parse_node_line(text).map(|node| {
                self.listeners.dispatch_node(&node);
                summary.nodes += 1;
            }),
            SectionKind::Elements => parse_element_line(text)
                .and_then(|element| {
                    if self.config.check_element_types {
                        validate_element(&element)?;
                    }
                    Ok(element)
                })
                .map(|element| {
                    self.listeners.dispatch_element(&element);
                    summary.elements += 1;
                }),
            SectionKind::PhysicalNames => parse_physical_name_line(text).map(|group| {
                self.listeners.dispatch_physical_name(&group);
                summary.physical_names += 1;
            }),
            _ => Ok(()),
        };

        if let Err(err) = outcome {
            let line = state.line_count;
            tracing::debug!(line, error = %err, "Dropping malformed record");
            self.report(state, sink, Diagnostic::error(line, err.to_string(), text));
        }
    }

    /// Read and dispatch one binary record of the open section
    fn step_binary<R: BufRead + ?Sized>(
        &mut self,
        reader: &mut R,
        state: &mut ParserState,
        summary: &mut ParseSummary,
    ) -> Result<()> {
        let line = state.line_count;
        let mut frames = FrameReader::new(reader, state.format_info.byte_order);

        match state.current_section {
            SectionKind::Nodes => {
                let node = frames.read_node().map_err(|e| frame_error(line, e))?;
                self.listeners.dispatch_node(&node);
                summary.nodes += 1;
            }
            SectionKind::Elements => {
                let remaining = state.expect_lines_to_next_section;
                let info = &mut state.binary_info;
                if info.count_var == 0 {
                    let header = frames
                        .read_element_header()
                        .map_err(|e| frame_error(line, e))?;
                    let ty = ElementType::from_id(header.ele_type).ok_or_else(|| {
                        Error::desync(
                            line,
                            format!("unknown element type {} in binary header", header.ele_type),
                        )
                    })?;
                    let count = usize::try_from(header.num_elements)
                        .ok()
                        .filter(|&n| n > 0 && n <= remaining)
                        .ok_or_else(|| {
                            Error::desync(
                                line,
                                format!(
                                    "element header announces {} elements, {} remain",
                                    header.num_elements, remaining
                                ),
                            )
                        })?;
                    let n_tags = usize::try_from(header.num_tags)
                        .ok()
                        .filter(|&n| n <= MAX_ELEMENT_TAGS)
                        .ok_or_else(|| {
                            Error::desync(line, format!("invalid tag count {}", header.num_tags))
                        })?;
                    *info = BinaryParseInfo {
                        parsing_binary: true,
                        count_var: count,
                        ele_type: header.ele_type,
                        ele_tag_count: n_tags,
                        ele_nodes: ty.node_count(),
                    };
                }

                let element = frames
                    .read_element(info.ele_type, info.ele_tag_count, info.ele_nodes)
                    .map_err(|e| frame_error(line, e))?;
                info.count_var -= 1;
                self.listeners.dispatch_element(&element);
                summary.elements += 1;
            }
            other => {
                return Err(Error::desync(
                    line,
                    format!("section `{}` has no binary records", other),
                ))
            }
        }

        state.expect_lines_to_next_section -= 1;
        if state.expect_lines_to_next_section == 0 {
            state.binary_info = BinaryParseInfo::default();
            tracing::debug!(line, section = %state.current_section, "Binary payload done");
        }
        Ok(())
    }

    /// Report a line that is not UTF-8. Inside a counted section it uses up one record.
    fn skip_invalid_line(&self, bytes: &[u8], state: &mut ParserState, sink: &mut dyn ErrorSink) {
        let line = state.line_count;
        if state.current_section.is_counted()
            && !state.count_pending
            && state.expect_lines_to_next_section > 0
        {
            state.expect_lines_to_next_section -= 1;
        }
        let lossy = String::from_utf8_lossy(bytes);
        tracing::debug!(line, "Dropping line that is not valid UTF-8");
        let diagnostic = Diagnostic::error(line, "line is not valid UTF-8", lossy.trim());
        self.report(state, sink, diagnostic);
    }

    fn report(&self, state: &mut ParserState, sink: &mut dyn ErrorSink, diagnostic: Diagnostic) {
        state.diagnostics += 1;
        if self.config.forwards_diagnostic(state.diagnostics) {
            sink.report(diagnostic);
        } else if self.config.max_diagnostics == Some(state.diagnostics - 1) {
            tracing::warn!(
                limit = state.diagnostics - 1,
                "Diagnostic limit reached, further reports are only counted"
            );
        }
    }
}
