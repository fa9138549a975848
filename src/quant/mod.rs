//! Vertex quantization model.
//!
//! - [`VertexAttr`] - closed set of attribute semantics
//! - [`VertexFormat`] - item count, width and normalization of an attribute
//! - [`VertexComponent`] / [`VertexLayout`] - packed record description
//! - [`encode_component`] / [`decode_component`] - affine quantization

mod attr;
mod codec;
mod format;
mod layout;

pub use attr::*;
pub use codec::*;
pub use format::*;
pub use layout::*;
