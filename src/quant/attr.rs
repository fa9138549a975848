//! Vertex attribute semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::VertexFormat;

/// Semantic kind of a vertex attribute.
///
/// This is a closed set. The declaration order is the canonical order used
/// when resolving layouts and when loaders assemble the IR component list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum VertexAttr {
    Position = 0,
    Normal = 1,
    TexCoord0 = 2,
    TexCoord1 = 3,
    TexCoord2 = 4,
    TexCoord3 = 5,
    Tangent = 6,
    Binormal = 7,
    /// Skin weights
    Weights = 8,
    /// Skin joint indices
    Indices = 9,
    Color0 = 10,
    Color1 = 11,
}

impl VertexAttr {
    /// Number of attribute semantics.
    pub const COUNT: usize = 12;

    /// All attributes in canonical order.
    pub const ALL: [VertexAttr; Self::COUNT] = [
        Self::Position,
        Self::Normal,
        Self::TexCoord0,
        Self::TexCoord1,
        Self::TexCoord2,
        Self::TexCoord3,
        Self::Tangent,
        Self::Binormal,
        Self::Weights,
        Self::Indices,
        Self::Color0,
        Self::Color1,
    ];

    /// Name used in configuration documents and dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::TexCoord0 => "texcoord0",
            Self::TexCoord1 => "texcoord1",
            Self::TexCoord2 => "texcoord2",
            Self::TexCoord3 => "texcoord3",
            Self::Tangent => "tangent",
            Self::Binormal => "binormal",
            Self::Weights => "weights",
            Self::Indices => "indices",
            Self::Color0 => "color0",
            Self::Color1 => "color1",
        }
    }

    /// Parse an attribute from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }

    /// Convert from the on-disk u8 tag.
    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    /// Unquantized float format a loader records for this attribute.
    pub const fn default_format(self) -> VertexFormat {
        match self {
            Self::Position | Self::Normal | Self::Binormal => VertexFormat::Float3,
            Self::TexCoord0 | Self::TexCoord1 | Self::TexCoord2 | Self::TexCoord3 => {
                VertexFormat::Float2
            }
            Self::Tangent | Self::Weights | Self::Indices | Self::Color0 | Self::Color1 => {
                VertexFormat::Float4
            }
        }
    }

    /// Texture coordinate set for `index`, if it exists.
    pub fn tex_coord(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::TexCoord0),
            1 => Some(Self::TexCoord1),
            2 => Some(Self::TexCoord2),
            3 => Some(Self::TexCoord3),
            _ => None,
        }
    }

    /// Color set for `index`, if it exists.
    pub fn color(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Color0),
            1 => Some(Self::Color1),
            _ => None,
        }
    }
}

impl fmt::Display for VertexAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
