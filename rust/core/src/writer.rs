// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `.msh` v2.2 writer
//!
//! Output is read back by [`MshParser`](crate::parser::MshParser) into the
//! same entities. Binary output is always little-endian and groups
//! consecutive elements of equal type and tag count under one header.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::binary::DOUBLE_SIZE;
use crate::entity::{validate_element, Element};
use crate::error::{Error, Result};
use crate::mesh::MshMesh;

/// File encoding to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MshEncoding {
    #[default]
    Ascii,
    Binary,
}

/// Write a mesh to a stream
pub fn write_msh<W: Write + ?Sized>(
    writer: &mut W,
    mesh: &MshMesh,
    encoding: MshEncoding,
) -> Result<()> {
    if encoding == MshEncoding::Binary {
        // Binary framing relies on the type table; refuse before writing anything
        for element in &mesh.elements {
            validate_element(element).map_err(|e| Error::InvalidElement {
                tag: element.tag,
                reason: e.to_string(),
            })?;
        }
    }

    write_format(writer, encoding)?;
    write_physical_names(writer, mesh)?;
    match encoding {
        MshEncoding::Ascii => {
            write_nodes_ascii(writer, mesh)?;
            write_elements_ascii(writer, mesh)?;
        }
        MshEncoding::Binary => {
            write_nodes_binary(writer, mesh)?;
            write_elements_binary(writer, mesh)?;
        }
    }
    Ok(())
}

/// Write a mesh to a file, creating or truncating it
pub fn write_msh_file(path: impl AsRef<Path>, mesh: &MshMesh, encoding: MshEncoding) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_msh(&mut writer, mesh, encoding)?;
    writer.flush()?;
    Ok(())
}

fn write_format<W: Write + ?Sized>(w: &mut W, encoding: MshEncoding) -> Result<()> {
    writeln!(w, "$MeshFormat")?;
    match encoding {
        MshEncoding::Ascii => writeln!(w, "2.2 0 {}", DOUBLE_SIZE)?,
        MshEncoding::Binary => {
            writeln!(w, "2.2 1 {}", DOUBLE_SIZE)?;
            // Endianness marker
            w.write_all(&1i32.to_le_bytes())?;
            writeln!(w)?;
        }
    }
    writeln!(w, "$EndMeshFormat")?;
    Ok(())
}

fn write_physical_names<W: Write + ?Sized>(w: &mut W, mesh: &MshMesh) -> Result<()> {
    if mesh.physical_groups.is_empty() {
        return Ok(());
    }
    writeln!(w, "$PhysicalNames")?;
    writeln!(w, "{}", mesh.physical_groups.len())?;
    for group in &mesh.physical_groups {
        writeln!(w, "{} {} \"{}\"", group.dimension, group.tag, group.name)?;
    }
    writeln!(w, "$EndPhysicalNames")?;
    Ok(())
}

fn write_nodes_ascii<W: Write + ?Sized>(w: &mut W, mesh: &MshMesh) -> Result<()> {
    writeln!(w, "$Nodes")?;
    writeln!(w, "{}", mesh.nodes.len())?;
    for node in &mesh.nodes {
        // Debug formatting of f64 is the shortest exact representation
        writeln!(w, "{} {:?} {:?} {:?}", node.tag, node.x, node.y, node.z)?;
    }
    writeln!(w, "$EndNodes")?;
    Ok(())
}

fn write_elements_ascii<W: Write + ?Sized>(w: &mut W, mesh: &MshMesh) -> Result<()> {
    writeln!(w, "$Elements")?;
    writeln!(w, "{}", mesh.elements.len())?;
    for element in &mesh.elements {
        write!(
            w,
            "{} {} {}",
            element.tag,
            element.type_id,
            element.physical_group_tags.len()
        )?;
        for tag in element
            .physical_group_tags
            .iter()
            .chain(element.node_tags.iter())
        {
            write!(w, " {}", tag)?;
        }
        writeln!(w)?;
    }
    writeln!(w, "$EndElements")?;
    Ok(())
}

fn write_nodes_binary<W: Write + ?Sized>(w: &mut W, mesh: &MshMesh) -> Result<()> {
    writeln!(w, "$Nodes")?;
    writeln!(w, "{}", mesh.nodes.len())?;
    for node in &mesh.nodes {
        w.write_all(&node.tag.to_le_bytes())?;
        w.write_all(&node.x.to_le_bytes())?;
        w.write_all(&node.y.to_le_bytes())?;
        w.write_all(&node.z.to_le_bytes())?;
    }
    if !mesh.nodes.is_empty() {
        writeln!(w)?;
    }
    writeln!(w, "$EndNodes")?;
    Ok(())
}

/// Key under which consecutive elements share a binary header
#[inline]
fn block_key(element: &Element) -> (i32, usize) {
    (element.type_id, element.physical_group_tags.len())
}

fn write_elements_binary<W: Write + ?Sized>(w: &mut W, mesh: &MshMesh) -> Result<()> {
    writeln!(w, "$Elements")?;
    writeln!(w, "{}", mesh.elements.len())?;

    let elements = &mesh.elements;
    let mut start = 0;
    while start < elements.len() {
        let key = block_key(&elements[start]);
        let end = elements[start..]
            .iter()
            .position(|e| block_key(e) != key)
            .map_or(elements.len(), |offset| start + offset);
        let block = &elements[start..end];

        let count = i32::try_from(block.len()).map_err(|_| Error::InvalidElement {
            tag: block[0].tag,
            reason: format!("block of {} elements does not fit a header", block.len()),
        })?;
        let n_tags = i32::try_from(key.1).map_err(|_| Error::InvalidElement {
            tag: block[0].tag,
            reason: format!("{} tags do not fit a header", key.1),
        })?;

        w.write_all(&key.0.to_le_bytes())?;
        w.write_all(&count.to_le_bytes())?;
        w.write_all(&n_tags.to_le_bytes())?;
        for element in block {
            w.write_all(&element.tag.to_le_bytes())?;
            for value in element
                .physical_group_tags
                .iter()
                .chain(element.node_tags.iter())
            {
                w.write_all(&value.to_le_bytes())?;
            }
        }

        start = end;
    }

    if !elements.is_empty() {
        writeln!(w)?;
    }
    writeln!(w, "$EndElements")?;
    Ok(())
}
