// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end parser behavior on small ASCII and binary inputs.

use msh_lite_core::{
    read_msh_file, ByteOrder, Diagnostic, Element, Error, MshParser, Node, ParserConfig,
    PhysicalGroup, Visit,
};
use std::path::PathBuf;

const MINIMAL: &str = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n1\n1 0.0 0.0 0.0\n$EndNodes\n$Elements\n1\n1 15 0 1\n$EndElements\n";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("msh")
        .join(name)
}

/// Binary file with the given records, encoded in `order`
fn binary_msh(order: ByteOrder, nodes: &[Node], blocks: &[(i32, &[Element])]) -> Vec<u8> {
    let int = |v: i32| match order {
        ByteOrder::Little => v.to_le_bytes(),
        ByteOrder::Big => v.to_be_bytes(),
    };
    let double = |v: f64| match order {
        ByteOrder::Little => v.to_le_bytes(),
        ByteOrder::Big => v.to_be_bytes(),
    };

    let mut out = b"$MeshFormat\n2.2 1 8\n".to_vec();
    out.extend_from_slice(&int(1));
    out.extend_from_slice(b"\n$EndMeshFormat\n");

    out.extend_from_slice(format!("$Nodes\n{}\n", nodes.len()).as_bytes());
    for node in nodes {
        out.extend_from_slice(&int(node.tag));
        out.extend_from_slice(&double(node.x));
        out.extend_from_slice(&double(node.y));
        out.extend_from_slice(&double(node.z));
    }
    out.extend_from_slice(b"\n$EndNodes\n");

    let total: usize = blocks.iter().map(|(_, b)| b.len()).sum();
    out.extend_from_slice(format!("$Elements\n{}\n", total).as_bytes());
    for (type_id, block) in blocks {
        let n_tags = block.first().map_or(0, |e| e.physical_group_tags.len());
        out.extend_from_slice(&int(*type_id));
        out.extend_from_slice(&int(block.len() as i32));
        out.extend_from_slice(&int(n_tags as i32));
        for element in block.iter() {
            out.extend_from_slice(&int(element.tag));
            for v in element.physical_group_tags.iter().chain(element.node_tags.iter()) {
                out.extend_from_slice(&int(*v));
            }
        }
    }
    out.extend_from_slice(b"\n$EndElements\n");
    out
}

fn triangle() -> (Vec<Node>, Vec<Element>, Vec<Element>) {
    let nodes = vec![
        Node::new(1, 0.0, 0.0, 0.0),
        Node::new(2, 1.5, 0.0, 0.0),
        Node::new(3, 0.0, -2.25, 1e-3),
    ];
    let lines = vec![
        Element::new(1, 1, &[7, 1], &[1, 2]),
        Element::new(2, 1, &[7, 1], &[2, 3]),
    ];
    let tris = vec![Element::new(3, 2, &[8, 1], &[1, 2, 3])];
    (nodes, lines, tris)
}

/// Collect every dispatched entity
fn collect(
    parser_input: &[u8],
    config: ParserConfig,
) -> (
    msh_lite_core::Result<msh_lite_core::ParseSummary>,
    Vec<Node>,
    Vec<Element>,
    Vec<PhysicalGroup>,
    Vec<Diagnostic>,
) {
    let mut nodes = Vec::new();
    let mut elements = Vec::new();
    let mut groups = Vec::new();
    let mut diagnostics = Vec::new();
    let result = {
        let mut parser = MshParser::with_config(config);
        parser.register_node_listener(|n: &Node| {
            nodes.push(*n);
            Visit::Continue
        });
        parser.register_element_listener(|e: &Element| {
            elements.push(e.clone());
            Visit::Continue
        });
        parser.register_physical_name_listener(|g: &PhysicalGroup| {
            groups.push(g.clone());
            Visit::Continue
        });
        parser.parse_bytes(parser_input, &mut diagnostics)
    };
    (result, nodes, elements, groups, diagnostics)
}

#[test]
fn test_minimal_ascii_file() {
    let (result, nodes, elements, groups, diagnostics) =
        collect(MINIMAL.as_bytes(), ParserConfig::default());
    let summary = result.unwrap();

    assert_eq!(nodes, vec![Node::new(1, 0.0, 0.0, 0.0)]);
    assert_eq!(elements, vec![Element::new(1, 15, &[], &[1])]);
    assert!(groups.is_empty());
    assert!(diagnostics.is_empty());
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.elements, 1);
    assert!(!summary.format.binary);
    assert_eq!(summary.lines, 11);
}

#[test]
fn test_bad_node_line_is_reported_and_skipped() {
    let text = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n3\n1 0.0 abc 0.0\n2 1.0 0.0 0.0\n3 2.0 0.0 0.0\n$EndNodes\n";
    let (result, nodes, _, _, diagnostics) = collect(text.as_bytes(), ParserConfig::default());
    result.unwrap();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 6);
    assert!(diagnostics[0].is_error());
    assert_eq!(diagnostics[0].text.as_deref(), Some("1 0.0 abc 0.0"));
    assert_eq!(nodes.iter().map(|n| n.tag).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_unknown_element_type_binary_vs_ascii() {
    let nodes = [Node::new(1, 0.0, 0.0, 0.0)];
    let bogus = [Element::new(1, 999, &[], &[])];
    let data = binary_msh(ByteOrder::Little, &nodes, &[(999, &bogus[..])]);
    let (result, parsed_nodes, elements, _, _) = collect(&data, ParserConfig::default());
    assert!(matches!(result, Err(Error::BinaryDesync { .. })));
    assert_eq!(parsed_nodes.len(), 1);
    assert!(elements.is_empty());

    let text = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Elements\n2\n1 999 0 1\n2 15 0 1\n$EndElements\n";
    let (result, _, elements, _, _) = collect(text.as_bytes(), ParserConfig::default());
    assert_eq!(result.unwrap().elements, 2);
    assert_eq!(elements[0].type_id, 999);

    let (result, _, elements, _, diagnostics) = collect(
        text.as_bytes(),
        ParserConfig::new().with_element_type_check(true),
    );
    result.unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 6);
}

#[test]
fn test_unknown_section_is_fatal() {
    let text = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Foo\nbar\n$EndFoo\n";
    let (result, _, _, _, _) = collect(text.as_bytes(), ParserConfig::default());
    match result {
        Err(Error::UnknownSection { line, name }) => {
            assert_eq!(line, 4);
            assert_eq!(name, "Foo");
        }
        other => panic!("expected UnknownSection, got {:?}", other),
    }
}

#[test]
fn test_mismatched_end_tag_resets_section() {
    let text = "$Nodes\n1\n1 0 0 0\n$EndElements\n$PhysicalNames\n1\n2 5 \"body\"\n$EndPhysicalNames\n";
    let (result, nodes, _, groups, diagnostics) = collect(text.as_bytes(), ParserConfig::default());
    result.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(groups, vec![PhysicalGroup::new(5, 2, "body")]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 4);
    assert!(!diagnostics[0].is_error());
}

#[test]
fn test_binary_matches_ascii() {
    let (nodes, lines, tris) = triangle();
    let data = binary_msh(ByteOrder::Little, &nodes, &[(1, &lines[..]), (2, &tris[..])]);
    let (result, parsed_nodes, parsed_elements, _, diagnostics) =
        collect(&data, ParserConfig::default());
    let summary = result.unwrap();
    assert!(summary.format.binary);
    assert!(summary.format.matching_endian);
    assert!(diagnostics.is_empty());

    let ascii = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n3\n1 0 0 0\n2 1.5 0 0\n3 0 -2.25 0.001\n$EndNodes\n$Elements\n3\n1 1 2 7 1 1 2\n2 1 2 7 1 2 3\n3 2 2 8 1 1 2 3\n$EndElements\n";
    let (result, ascii_nodes, ascii_elements, _, _) =
        collect(ascii.as_bytes(), ParserConfig::default());
    result.unwrap();

    assert_eq!(parsed_nodes, ascii_nodes);
    assert_eq!(parsed_elements, ascii_elements);
}

#[test]
fn test_big_endian_binary_is_swapped() {
    let (nodes, lines, tris) = triangle();
    let data = binary_msh(ByteOrder::Big, &nodes, &[(1, &lines[..]), (2, &tris[..])]);
    let (result, parsed_nodes, parsed_elements, _, _) = collect(&data, ParserConfig::default());
    let summary = result.unwrap();

    assert!(!summary.format.matching_endian);
    assert_eq!(summary.format.byte_order, ByteOrder::Big);
    assert_eq!(parsed_nodes, nodes);
    let expected: Vec<Element> = lines.into_iter().chain(tris).collect();
    assert_eq!(parsed_elements, expected);
}

#[test]
fn test_binary_header_overrunning_count_desyncs() {
    let (nodes, lines, _) = triangle();
    let mut data = binary_msh(ByteOrder::Little, &nodes, &[(1, &lines[..])]);
    // Declare one element fewer than the header block holds
    let needle = b"$Elements\n2\n";
    let at = data
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    data[at + needle.len() - 2] = b'1';

    let (result, _, elements, _, _) = collect(&data, ParserConfig::default());
    assert!(matches!(result, Err(Error::BinaryDesync { .. })));
    assert!(elements.is_empty());
}

#[test]
fn test_truncated_binary_desyncs() {
    let (nodes, _, _) = triangle();
    let data = binary_msh(ByteOrder::Little, &nodes, &[]);
    let cut = b"$MeshFormat\n2.2 1 8\n".len() + 4 + b"\n$EndMeshFormat\n$Nodes\n3\n".len() + 40;
    let (result, parsed_nodes, _, _, _) = collect(&data[..cut], ParserConfig::default());
    assert!(matches!(result, Err(Error::BinaryDesync { .. })));
    assert_eq!(parsed_nodes.len(), 1);
}

#[test]
fn test_short_circuit_keeps_counting() {
    let mut head = 0;
    let mut tail = 0;
    let summary = {
        let mut parser = MshParser::new();
        parser.register_node_listener(|_: &Node| {
            head += 1;
            Visit::Stop
        });
        parser.register_node_listener(|_: &Node| {
            tail += 1;
            Visit::Continue
        });
        let mut diagnostics = Vec::new();
        parser
            .parse_file(fixture("channel.msh"), &mut diagnostics)
            .unwrap()
    };
    assert_eq!(head, 6);
    assert_eq!(tail, 0);
    assert_eq!(summary.nodes, 6);
}

#[test]
fn test_partial_short_circuit_reaches_later_entities() {
    let mut points = Vec::new();
    let mut tail_elements = Vec::new();
    let mut tail_names = Vec::new();
    let summary = {
        let mut parser = MshParser::new();
        // Absorb point elements; everything else falls through
        parser.register_element_listener(|e: &Element| {
            if e.type_id == 15 {
                points.push(e.tag);
                Visit::Stop
            } else {
                Visit::Continue
            }
        });
        parser.register_element_listener(|e: &Element| {
            tail_elements.push(e.tag);
            Visit::Continue
        });
        parser.register_physical_name_listener(|g: &PhysicalGroup| Visit::from(g.name != "inlet"));
        parser.register_physical_name_listener(|g: &PhysicalGroup| {
            tail_names.push(g.name.clone());
            Visit::Continue
        });
        let mut diagnostics = Vec::new();
        parser
            .parse_file(fixture("channel.msh"), &mut diagnostics)
            .unwrap()
    };

    assert_eq!(points, vec![1, 7]);
    assert_eq!(tail_elements, vec![2, 3, 4, 5, 6]);
    assert_eq!(tail_names, vec!["outlet wall", "fluid"]);
    assert_eq!(summary.elements, 7);
    assert_eq!(summary.physical_names, 3);
}

#[test]
fn test_channel_fixture() {
    let mut diagnostics = Vec::new();
    let mesh = read_msh_file(fixture("channel.msh"), ParserConfig::strict(), &mut diagnostics)
        .unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);

    assert_eq!(mesh.nodes.len(), 6);
    assert_eq!(mesh.elements.len(), 7);
    assert_eq!(mesh.physical_name(1, 11), Some("outlet wall"));
    assert_eq!(mesh.elements_in_group(20).count(), 3);
    assert!(mesh.check().is_empty());
}
