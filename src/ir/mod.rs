//! Intermediate representation.
//!
//! Every loader produces an [`Ir`] and every consumer (processor, writer,
//! dumps) reads one. The IR is built once per run, optionally mutated in
//! place by one processor, and read-only afterwards.
//!
//! Invariants, checked by [`Ir::validate`]:
//! - every mesh's index count is a multiple of three (triangle lists)
//! - every index addresses a vertex of its own mesh
//! - every vertex carries exactly the attributes of
//!   [`Ir::vertex_components`], each with `num_items()` values

mod vertex;

pub use vertex::*;

use serde::{Deserialize, Serialize};

use crate::quant::{VertexAttr, VertexComponent};
use crate::util::{Error, Result};

/// Triangle-list mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of complete triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fail unless the index list is a triangle list.
    pub fn check_triangles(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::integrity(format!(
                "index data size {} isn't multiple of 3",
                self.indices.len()
            )));
        }
        Ok(())
    }

    /// Reverse the winding of every triangle.
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }
}

/// Named group of meshes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub meshes: Vec<Mesh>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), meshes: Vec::new() }
    }
}

/// Root of the intermediate representation.
///
/// `vertex_components` is the layout the loader actually produced, which
/// can differ from any layout the writer targets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ir {
    pub nodes: Vec<Node>,
    pub vertex_components: Vec<VertexComponent>,
}

impl Ir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate all meshes of all nodes in order.
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().flat_map(|n| n.meshes.iter())
    }

    /// Total vertex count.
    pub fn num_vertices(&self) -> usize {
        self.meshes().map(|m| m.vertices.len()).sum()
    }

    /// Total index count.
    pub fn num_indices(&self) -> usize {
        self.meshes().map(|m| m.indices.len()).sum()
    }

    /// Declared component for `attr`.
    pub fn component(&self, attr: VertexAttr) -> Option<&VertexComponent> {
        self.vertex_components.iter().find(|c| c.attr == attr)
    }

    /// Smallest and largest value of any item of `attr` across all vertices.
    pub fn value_range(&self, attr: VertexAttr) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for v in self.meshes().flat_map(|m| m.vertices.iter()) {
            for &x in v.get(attr).unwrap_or(&[]) {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(x), hi.max(x)),
                    None => (x, x),
                });
            }
        }
        range
    }

    /// Check that `vertex` matches the declared components exactly.
    pub fn check_vertex(&self, vertex: &Vertex) -> Result<()> {
        for c in &self.vertex_components {
            let values = vertex
                .get(c.attr)
                .ok_or_else(|| Error::integrity(format!("vertex is missing attribute {}", c.attr)))?;
            if values.len() != c.num_items() {
                return Err(Error::integrity(format!(
                    "attribute {} has {} values, format {} expects {}",
                    c.attr,
                    values.len(),
                    c.format,
                    c.num_items()
                )));
            }
        }
        if vertex.len() != self.vertex_components.len() {
            let extra = vertex.attrs().find(|a| self.component(*a).is_none());
            if let Some(attr) = extra {
                return Err(Error::integrity(format!("vertex has undeclared attribute {}", attr)));
            }
        }
        Ok(())
    }

    /// Validate all IR invariants.
    pub fn validate(&self) -> Result<()> {
        for (i, c) in self.vertex_components.iter().enumerate() {
            if self.vertex_components[..i].iter().any(|p| p.attr == c.attr) {
                return Err(Error::integrity(format!("attribute {} declared twice", c.attr)));
            }
        }
        for node in &self.nodes {
            for mesh in &node.meshes {
                mesh.check_triangles()?;
                let count = mesh.vertices.len();
                if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= count) {
                    return Err(Error::integrity(format!(
                        "index {} out of range in node '{}' ({} vertices)",
                        index, node.name, count
                    )));
                }
                for vertex in &mesh.vertices {
                    self.check_vertex(vertex)?;
                }
            }
        }
        Ok(())
    }
}
