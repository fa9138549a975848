//! Vertex formats - storage type plus component count.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the stored integer or float relates to the real value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    /// 32-bit float passthrough
    Float,
    /// 16-bit float passthrough
    Half,
    /// Signed normalized: [-1, 1] mapped to the full signed range
    SNorm,
    /// Unsigned normalized: [0, 1] mapped to the full unsigned range
    UNorm,
    /// Raw signed integer
    Int,
    /// Raw unsigned integer
    UInt,
}

/// Numeric storage format of one vertex attribute.
///
/// A format fixes how many scalar items make up one attribute instance
/// ([`num_items`](Self::num_items)), the width of each item, and whether the
/// stored value is normalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexFormat {
    Float = 0,
    Float2 = 1,
    Float3 = 2,
    Float4 = 3,
    Byte4 = 4,
    Byte4N = 5,
    UByte4 = 6,
    UByte4N = 7,
    Short2 = 8,
    Short2N = 9,
    UShort2N = 10,
    Short4 = 11,
    Short4N = 12,
    UShort4N = 13,
    Half2 = 14,
    Half4 = 15,
}

impl VertexFormat {
    /// Number of formats.
    pub const COUNT: usize = 16;

    /// All formats in tag order.
    pub const ALL: [VertexFormat; Self::COUNT] = [
        Self::Float,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Byte4,
        Self::Byte4N,
        Self::UByte4,
        Self::UByte4N,
        Self::Short2,
        Self::Short2N,
        Self::UShort2N,
        Self::Short4,
        Self::Short4N,
        Self::UShort4N,
        Self::Half2,
        Self::Half4,
    ];

    /// Number of scalar items in one attribute instance.
    #[inline]
    pub const fn num_items(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Float2 | Self::Short2 | Self::Short2N | Self::UShort2N | Self::Half2 => 2,
            Self::Float3 => 3,
            Self::Float4
            | Self::Byte4
            | Self::Byte4N
            | Self::UByte4
            | Self::UByte4N
            | Self::Short4
            | Self::Short4N
            | Self::UShort4N
            | Self::Half4 => 4,
        }
    }

    /// Size in bytes of a single item.
    #[inline]
    pub const fn item_bytes(self) -> usize {
        match self {
            Self::Float | Self::Float2 | Self::Float3 | Self::Float4 => 4,
            Self::Byte4 | Self::Byte4N | Self::UByte4 | Self::UByte4N => 1,
            Self::Short2
            | Self::Short2N
            | Self::UShort2N
            | Self::Short4
            | Self::Short4N
            | Self::UShort4N
            | Self::Half2
            | Self::Half4 => 2,
        }
    }

    /// Size in bytes of one attribute instance.
    #[inline]
    pub const fn byte_size(self) -> usize {
        self.num_items() * self.item_bytes()
    }

    /// Encoding kind of this format.
    pub const fn kind(self) -> FormatKind {
        match self {
            Self::Float | Self::Float2 | Self::Float3 | Self::Float4 => FormatKind::Float,
            Self::Half2 | Self::Half4 => FormatKind::Half,
            Self::Byte4N | Self::Short2N | Self::Short4N => FormatKind::SNorm,
            Self::UByte4N | Self::UShort2N | Self::UShort4N => FormatKind::UNorm,
            Self::Byte4 | Self::Short2 | Self::Short4 => FormatKind::Int,
            Self::UByte4 => FormatKind::UInt,
        }
    }

    /// Returns true if the format maps a real range onto integer codes.
    #[inline]
    pub const fn is_normalized(self) -> bool {
        matches!(self.kind(), FormatKind::SNorm | FormatKind::UNorm)
    }

    /// Largest integer code for normalized formats.
    pub const fn code_max(self) -> f32 {
        match (self.kind(), self.item_bytes()) {
            (FormatKind::SNorm, 1) => i8::MAX as f32,
            (FormatKind::SNorm, _) => i16::MAX as f32,
            (FormatKind::UNorm, 1) => u8::MAX as f32,
            (FormatKind::UNorm, _) => u16::MAX as f32,
            _ => 1.0,
        }
    }

    /// Representable value range of raw integer formats.
    pub const fn raw_range(self) -> Option<(f32, f32)> {
        match (self.kind(), self.item_bytes()) {
            (FormatKind::Int, 1) => Some((i8::MIN as f32, i8::MAX as f32)),
            (FormatKind::Int, _) => Some((i16::MIN as f32, i16::MAX as f32)),
            (FormatKind::UInt, _) => Some((0.0, u8::MAX as f32)),
            _ => None,
        }
    }

    /// Name used in configuration documents.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Float2 => "Float2",
            Self::Float3 => "Float3",
            Self::Float4 => "Float4",
            Self::Byte4 => "Byte4",
            Self::Byte4N => "Byte4N",
            Self::UByte4 => "UByte4",
            Self::UByte4N => "UByte4N",
            Self::Short2 => "Short2",
            Self::Short2N => "Short2N",
            Self::UShort2N => "UShort2N",
            Self::Short4 => "Short4",
            Self::Short4N => "Short4N",
            Self::UShort4N => "UShort4N",
            Self::Half2 => "Half2",
            Self::Half4 => "Half4",
        }
    }

    /// Parse a format from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Convert from the on-disk u8 tag.
    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
