//! Vertex components and layouts.

use serde::{Deserialize, Serialize};

use super::{VertexAttr, VertexFormat};
use crate::ir::Ir;

/// Storage description of one attribute: semantic, format, scale and bias.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexComponent {
    pub attr: VertexAttr,
    pub format: VertexFormat,
    pub scale: f32,
    pub bias: f32,
}

impl VertexComponent {
    /// Component with identity scale (1.0) and zero bias.
    pub const fn new(attr: VertexAttr, format: VertexFormat) -> Self {
        Self { attr, format, scale: 1.0, bias: 0.0 }
    }

    /// Component with explicit scale and bias.
    pub const fn with_range(attr: VertexAttr, format: VertexFormat, scale: f32, bias: f32) -> Self {
        Self { attr, format, scale, bias }
    }

    /// Number of scalar items per attribute instance.
    #[inline]
    pub const fn num_items(&self) -> usize {
        self.format.num_items()
    }
}

/// Ordered list of components. The order is the physical field order of a
/// packed vertex record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub components: Vec<VertexComponent>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    pub fn push(&mut self, component: VertexComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Size in bytes of one packed vertex.
    pub fn stride(&self) -> usize {
        self.components.iter().map(|c| c.format.byte_size()).sum()
    }

    /// Find the component for an attribute.
    pub fn find(&self, attr: VertexAttr) -> Option<&VertexComponent> {
        self.components.iter().find(|c| c.attr == attr)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Fit scale and bias of `attr`'s component to the IR's value range so
    /// that all values land in [-1, 1].
    ///
    /// The range is taken over every item of every vertex, so one scalar
    /// scale/bias pair covers all axes. Does nothing if the layout has no
    /// such component or the IR holds no data for it.
    pub fn fit_range(&mut self, ir: &Ir, attr: VertexAttr) {
        let Some((lo, hi)) = ir.value_range(attr) else {
            return;
        };
        if let Some(component) = self.components.iter_mut().find(|c| c.attr == attr) {
            let half_extent = (hi - lo) * 0.5;
            component.bias = (hi + lo) * 0.5;
            component.scale = if half_extent > f32::EPSILON { half_extent } else { 1.0 };
            tracing::debug!(
                "fitted {} range [{}, {}]: scale={} bias={}",
                attr, lo, hi, component.scale, component.bias
            );
        }
    }
}
