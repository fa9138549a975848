//! ORB format constants.
//!
//! All multi-byte values are little-endian.
//!
//! ```text
//! header      magic "ORB1" | u16 version | u8 index size | u8 component count
//! component   u8 attr | u8 format | f32 scale | f32 bias        (x component count)
//! scene       u32 node count
//! node        u16 name length | name bytes (UTF-8) | u32 mesh count
//! mesh        u32 vertex count | u32 index count
//!             vertex records (layout stride each) | indices (index size each)
//! ```

/// Magic bytes at the start of an ORB file.
pub const ORB_MAGIC: &[u8; 4] = b"ORB1";

/// Current ORB format version.
pub const CURRENT_VERSION: u16 = 1;

/// Size of the fixed file header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 4;

/// Offset of the index size in the header.
pub const INDEX_SIZE_OFFSET: usize = 6;

/// Offset of the component count in the header.
pub const COMPONENT_COUNT_OFFSET: usize = 7;

/// Size of one serialized component descriptor.
pub const COMPONENT_DESC_SIZE: usize = 10;

/// Longest node name that fits the u16 length prefix.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;
