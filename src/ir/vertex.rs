//! Vertex - attribute to float-array mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::quant::VertexAttr;

/// Float values of one attribute instance. Never longer than 4 items.
pub type AttrValues = SmallVec<[f32; 4]>;

/// One vertex: attribute semantic mapped to its float values.
///
/// The value count per attribute must match `num_items()` of the IR's
/// declared component for that attribute; [`Ir::validate`](super::Ir::validate)
/// checks this.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vertex(BTreeMap<VertexAttr, AttrValues>);

impl Vertex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values recorded for `attr`.
    #[inline]
    pub fn get(&self, attr: VertexAttr) -> Option<&[f32]> {
        self.0.get(&attr).map(|v| v.as_slice())
    }

    /// Mutable values recorded for `attr`.
    #[inline]
    pub fn get_mut(&mut self, attr: VertexAttr) -> Option<&mut AttrValues> {
        self.0.get_mut(&attr)
    }

    /// Set the values for `attr`, replacing any previous ones.
    pub fn set(&mut self, attr: VertexAttr, values: &[f32]) {
        self.0.insert(attr, SmallVec::from_slice(values));
    }

    /// Remove an attribute.
    pub fn remove(&mut self, attr: VertexAttr) -> Option<AttrValues> {
        self.0.remove(&attr)
    }

    pub fn contains(&self, attr: VertexAttr) -> bool {
        self.0.contains_key(&attr)
    }

    /// Attributes present on this vertex, in canonical order.
    pub fn attrs(&self) -> impl Iterator<Item = VertexAttr> + '_ {
        self.0.keys().copied()
    }

    /// Number of attributes present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(VertexAttr, &'a [f32])> for Vertex {
    fn from_iter<I: IntoIterator<Item = (VertexAttr, &'a [f32])>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(a, v)| (a, SmallVec::from_slice(v))).collect())
    }
}
