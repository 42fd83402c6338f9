// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gmsh element types
//!
//! Static lookup from the integer type id of a `.msh` v2 element to its
//! topology and expected node count. The binary reader needs the node count to
//! know how long an element record is.

use std::fmt;

/// Element topologies known to the v2 file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    // Points
    Point1,

    // Lines
    Line2,
    Line3,
    Line4,
    Line5,
    Line6,

    // Triangles
    Triangle3,
    Triangle6,
    Triangle9,
    Triangle10,
    Triangle12,
    Triangle15,
    Triangle15Incomplete,
    Triangle21,

    // Quadrangles
    Quadrangle4,
    Quadrangle8,
    Quadrangle9,

    // Tetrahedra
    Tetrahedron4,
    Tetrahedron10,
    Tetrahedron20,
    Tetrahedron35,
    Tetrahedron56,

    // Hexahedra
    Hexahedron8,
    Hexahedron20,
    Hexahedron27,
    Hexahedron64,
    Hexahedron125,

    // Prisms
    Prism6,
    Prism15,
    Prism18,

    // Pyramids
    Pyramid5,
    Pyramid13,
    Pyramid14,
}

impl ElementType {
    /// Every known type, ordered by id
    pub const ALL: [ElementType; 33] = [
        Self::Line2,
        Self::Triangle3,
        Self::Quadrangle4,
        Self::Tetrahedron4,
        Self::Hexahedron8,
        Self::Prism6,
        Self::Pyramid5,
        Self::Line3,
        Self::Triangle6,
        Self::Quadrangle9,
        Self::Tetrahedron10,
        Self::Hexahedron27,
        Self::Prism18,
        Self::Pyramid14,
        Self::Point1,
        Self::Quadrangle8,
        Self::Hexahedron20,
        Self::Prism15,
        Self::Pyramid13,
        Self::Triangle9,
        Self::Triangle10,
        Self::Triangle12,
        Self::Triangle15,
        Self::Triangle15Incomplete,
        Self::Triangle21,
        Self::Line4,
        Self::Line5,
        Self::Line6,
        Self::Tetrahedron20,
        Self::Tetrahedron35,
        Self::Tetrahedron56,
        Self::Hexahedron64,
        Self::Hexahedron125,
    ];

    /// Look up a type id. Returns `None` for ids without a table entry.
    pub fn from_id(id: i32) -> Option<Self> {
        let t = match id {
            1 => Self::Line2,
            2 => Self::Triangle3,
            3 => Self::Quadrangle4,
            4 => Self::Tetrahedron4,
            5 => Self::Hexahedron8,
            6 => Self::Prism6,
            7 => Self::Pyramid5,
            8 => Self::Line3,
            9 => Self::Triangle6,
            10 => Self::Quadrangle9,
            11 => Self::Tetrahedron10,
            12 => Self::Hexahedron27,
            13 => Self::Prism18,
            14 => Self::Pyramid14,
            15 => Self::Point1,
            16 => Self::Quadrangle8,
            17 => Self::Hexahedron20,
            18 => Self::Prism15,
            19 => Self::Pyramid13,
            20 => Self::Triangle9,
            21 => Self::Triangle10,
            22 => Self::Triangle12,
            23 => Self::Triangle15,
            24 => Self::Triangle15Incomplete,
            25 => Self::Triangle21,
            26 => Self::Line4,
            27 => Self::Line5,
            28 => Self::Line6,
            29 => Self::Tetrahedron20,
            30 => Self::Tetrahedron35,
            31 => Self::Tetrahedron56,
            92 => Self::Hexahedron64,
            93 => Self::Hexahedron125,
            _ => return None,
        };
        Some(t)
    }

    /// Type id as written in the file
    pub fn id(&self) -> i32 {
        match self {
            Self::Line2 => 1,
            Self::Triangle3 => 2,
            Self::Quadrangle4 => 3,
            Self::Tetrahedron4 => 4,
            Self::Hexahedron8 => 5,
            Self::Prism6 => 6,
            Self::Pyramid5 => 7,
            Self::Line3 => 8,
            Self::Triangle6 => 9,
            Self::Quadrangle9 => 10,
            Self::Tetrahedron10 => 11,
            Self::Hexahedron27 => 12,
            Self::Prism18 => 13,
            Self::Pyramid14 => 14,
            Self::Point1 => 15,
            Self::Quadrangle8 => 16,
            Self::Hexahedron20 => 17,
            Self::Prism15 => 18,
            Self::Pyramid13 => 19,
            Self::Triangle9 => 20,
            Self::Triangle10 => 21,
            Self::Triangle12 => 22,
            Self::Triangle15 => 23,
            Self::Triangle15Incomplete => 24,
            Self::Triangle21 => 25,
            Self::Line4 => 26,
            Self::Line5 => 27,
            Self::Line6 => 28,
            Self::Tetrahedron20 => 29,
            Self::Tetrahedron35 => 30,
            Self::Tetrahedron56 => 31,
            Self::Hexahedron64 => 92,
            Self::Hexahedron125 => 93,
        }
    }

    /// Number of nodes an element of this type lists
    pub fn node_count(&self) -> usize {
        match self {
            Self::Point1 => 1,
            Self::Line2 => 2,
            Self::Line3 | Self::Triangle3 => 3,
            Self::Line4 | Self::Quadrangle4 | Self::Tetrahedron4 => 4,
            Self::Line5 | Self::Pyramid5 => 5,
            Self::Line6 | Self::Triangle6 | Self::Prism6 => 6,
            Self::Quadrangle8 | Self::Hexahedron8 => 8,
            Self::Triangle9 | Self::Quadrangle9 => 9,
            Self::Triangle10 | Self::Tetrahedron10 => 10,
            Self::Triangle12 => 12,
            Self::Pyramid13 => 13,
            Self::Pyramid14 => 14,
            Self::Triangle15 | Self::Triangle15Incomplete | Self::Prism15 => 15,
            Self::Prism18 => 18,
            Self::Tetrahedron20 | Self::Hexahedron20 => 20,
            Self::Triangle21 => 21,
            Self::Hexahedron27 => 27,
            Self::Tetrahedron35 => 35,
            Self::Tetrahedron56 => 56,
            Self::Hexahedron64 => 64,
            Self::Hexahedron125 => 125,
        }
    }

    /// Topological dimension (0 = point, 3 = volume)
    pub fn dimension(&self) -> u8 {
        match self {
            Self::Point1 => 0,
            Self::Line2 | Self::Line3 | Self::Line4 | Self::Line5 | Self::Line6 => 1,
            Self::Triangle3
            | Self::Triangle6
            | Self::Triangle9
            | Self::Triangle10
            | Self::Triangle12
            | Self::Triangle15
            | Self::Triangle15Incomplete
            | Self::Triangle21
            | Self::Quadrangle4
            | Self::Quadrangle8
            | Self::Quadrangle9 => 2,
            _ => 3,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point1 => "point",
            Self::Line2 => "2-node line",
            Self::Line3 => "3-node line",
            Self::Line4 => "4-node line",
            Self::Line5 => "5-node line",
            Self::Line6 => "6-node line",
            Self::Triangle3 => "3-node triangle",
            Self::Triangle6 => "6-node triangle",
            Self::Triangle9 => "9-node triangle",
            Self::Triangle10 => "10-node triangle",
            Self::Triangle12 => "12-node triangle",
            Self::Triangle15 => "15-node triangle",
            Self::Triangle15Incomplete => "15-node incomplete triangle",
            Self::Triangle21 => "21-node triangle",
            Self::Quadrangle4 => "4-node quadrangle",
            Self::Quadrangle8 => "8-node quadrangle",
            Self::Quadrangle9 => "9-node quadrangle",
            Self::Tetrahedron4 => "4-node tetrahedron",
            Self::Tetrahedron10 => "10-node tetrahedron",
            Self::Tetrahedron20 => "20-node tetrahedron",
            Self::Tetrahedron35 => "35-node tetrahedron",
            Self::Tetrahedron56 => "56-node tetrahedron",
            Self::Hexahedron8 => "8-node hexahedron",
            Self::Hexahedron20 => "20-node hexahedron",
            Self::Hexahedron27 => "27-node hexahedron",
            Self::Hexahedron64 => "64-node hexahedron",
            Self::Hexahedron125 => "125-node hexahedron",
            Self::Prism6 => "6-node prism",
            Self::Prism15 => "15-node prism",
            Self::Prism18 => "18-node prism",
            Self::Pyramid5 => "5-node pyramid",
            Self::Pyramid13 => "13-node pyramid",
            Self::Pyramid14 => "14-node pyramid",
        }
    }
}

/// Expected node count for a raw type id, `None` when the id is unknown
#[inline]
pub fn node_count(type_id: i32) -> Option<usize> {
    ElementType::from_id(type_id).map(|t| t.node_count())
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type {})", self.name(), self.id())
    }
}
