//! Generic import loader backed by the `gltf` crate.
//!
//! Node transforms are baked into vertex data, since the IR carries no
//! transforms. Import options follow the assimp post-processing semantics
//! where the IR can express them.

use std::collections::BTreeSet;
use std::path::Path;

use ::gltf::buffer::Data;
use ::gltf::mesh::Mode;
use glam::{Mat3, Mat4, Vec3};
use serde_json::json;

use super::SceneLoader;
use crate::config::{component, primitive, process, ImportSettings, PROCESS_FLAGS};
use crate::ir::{Ir, Mesh, Node, Vertex};
use crate::quant::{VertexAttr, VertexComponent};
use crate::util::{Error, Result};

/// Options this importer acts on; the rest are accepted and ignored.
const HANDLED_OPTIONS: u32 = process::TRIANGULATE
    | process::REMOVE_COMPONENT
    | process::GEN_NORMALS
    | process::GEN_SMOOTH_NORMALS
    | process::PRE_TRANSFORM_VERTICES
    | process::SORT_BY_PTYPE
    | process::FLIP_UVS
    | process::FLIP_WINDING_ORDER
    | process::MAKE_LEFT_HANDED;

/// Name of the single node produced by `PreTransformVertices`.
const MERGED_NODE_NAME: &str = "scene";

/// glTF 2.0 (`.gltf` / `.glb`) importer.
#[derive(Debug, Default)]
pub struct GltfImporter {
    settings: ImportSettings,
    summary: Option<serde_json::Value>,
}

impl GltfImporter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings, summary: None }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn log_ignored_options(&self) {
        let ignored = self.settings.process & !HANDLED_OPTIONS;
        for (name, _) in PROCESS_FLAGS.0.iter().filter(|(_, bit)| ignored & bit != 0) {
            tracing::debug!("import option {} has no effect on glTF input", name);
        }
    }

    fn visit(&self, node: ::gltf::Node, parent: Mat4, buffers: &[Data], out: &mut Vec<Node>) -> Result<()> {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            let name = node
                .name()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("node{}", node.index()));
            let mut ir_node = Node::new(name);
            for prim in mesh.primitives() {
                if let Some(m) = self.read_primitive(&prim, world, buffers)? {
                    ir_node.meshes.push(m);
                }
            }
            if !ir_node.meshes.is_empty() {
                out.push(ir_node);
            }
        }
        for child in node.children() {
            self.visit(child, world, buffers, out)?;
        }
        Ok(())
    }

    fn read_primitive(&self, prim: &::gltf::Primitive, world: Mat4, buffers: &[Data]) -> Result<Option<Mesh>> {
        let s = &self.settings;
        let mode = prim.mode();
        if s.removes_primitive(primitive_kind(mode)) {
            tracing::debug!("removing {:?} primitive {}", mode, prim.index());
            return Ok(None);
        }

        let reader = prim.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            tracing::warn!("primitive {} has no POSITION attribute, skipping", prim.index());
            return Ok(None);
        };

        let mut vertices: Vec<Vertex> = positions
            .map(|p| {
                let mut v = Vertex::new();
                v.set(VertexAttr::Position, &world.transform_point3(Vec3::from(p)).to_array());
                v
            })
            .collect();
        let raw_indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        let Some(mut indices) = self.triangle_list(mode, &raw_indices) else {
            return Ok(None);
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::Import(format!(
                "primitive {} references vertex {} of {}",
                prim.index(),
                bad,
                vertices.len()
            )));
        }

        if !s.removes_component(component::NORMALS) {
            if let Some(normals) = reader.read_normals() {
                let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
                fill(&mut vertices, VertexAttr::Normal, normals.map(|n| {
                    (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array()
                }));
            }
        }
        if !s.removes_component(component::TANGENTS_AND_BITANGENTS) {
            if let Some(tangents) = reader.read_tangents() {
                fill(&mut vertices, VertexAttr::Tangent, tangents.map(|t| {
                    let xyz = world.transform_vector3(Vec3::new(t[0], t[1], t[2])).normalize_or_zero();
                    [xyz.x, xyz.y, xyz.z, t[3]]
                }));
            }
        }
        for set in 0..4 {
            let Some(attr) = VertexAttr::tex_coord(set) else { continue };
            if s.removes_component(component::TEXCOORDS | component::texcoords_n(set)) {
                continue;
            }
            if let Some(uvs) = reader.read_tex_coords(set) {
                let flip = s.has(process::FLIP_UVS);
                fill(&mut vertices, attr, uvs.into_f32().map(|[u, v]| {
                    if flip { [u, 1.0 - v] } else { [u, v] }
                }));
            }
        }
        for set in 0..2 {
            let Some(attr) = VertexAttr::color(set) else { continue };
            if s.removes_component(component::COLORS | component::colors_n(set)) {
                continue;
            }
            if let Some(colors) = reader.read_colors(set) {
                fill(&mut vertices, attr, colors.into_rgba_f32());
            }
        }
        if !s.removes_component(component::BONEWEIGHTS) {
            if let Some(joints) = reader.read_joints(0) {
                fill(&mut vertices, VertexAttr::Indices, joints.into_u16().map(|j| j.map(f32::from)));
            }
            if let Some(weights) = reader.read_weights(0) {
                fill(&mut vertices, VertexAttr::Weights, weights.into_f32());
            }
        }

        // A mirroring node transform turns front faces around.
        if world.determinant() < 0.0 {
            flip_winding(&mut indices);
        }
        let wants_normals = s.has(process::GEN_NORMALS) || s.has(process::GEN_SMOOTH_NORMALS);
        if wants_normals
            && !s.removes_component(component::NORMALS)
            && !vertices.iter().any(|v| v.contains(VertexAttr::Normal))
        {
            smooth_normals(&mut vertices, &indices);
        }
        if s.has(process::MAKE_LEFT_HANDED) {
            for v in &mut vertices {
                for attr in [VertexAttr::Position, VertexAttr::Normal, VertexAttr::Tangent] {
                    if let Some(values) = v.get_mut(attr) {
                        values[2] = -values[2];
                    }
                }
            }
        }
        if s.has(process::FLIP_WINDING_ORDER) {
            flip_winding(&mut indices);
        }

        Ok(Some(Mesh { vertices, indices }))
    }

    /// Convert an index stream to a triangle list, or `None` if the
    /// primitive cannot be represented.
    fn triangle_list(&self, mode: Mode, raw: &[u32]) -> Option<Vec<u32>> {
        match mode {
            Mode::Triangles => {
                if raw.len() % 3 != 0 {
                    tracing::warn!("dropping {} trailing indices of a triangle list", raw.len() % 3);
                }
                Some(raw[..raw.len() / 3 * 3].to_vec())
            }
            Mode::TriangleStrip | Mode::TriangleFan if !self.settings.has(process::TRIANGULATE) => {
                tracing::warn!("skipping {:?} primitive, enable Triangulate to convert it", mode);
                None
            }
            Mode::TriangleStrip => Some(strip_to_list(raw)),
            Mode::TriangleFan => Some(fan_to_list(raw)),
            Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => {
                tracing::warn!("skipping {:?} primitive, only triangles are converted", mode);
                None
            }
        }
    }
}

impl SceneLoader for GltfImporter {
    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    fn load(&mut self, input: &Path, _asset_root: Option<&Path>, ir: &mut Ir) -> Result<()> {
        self.log_ignored_options();
        let import_err = |e: ::gltf::Error| Error::Import(format!("{}: {}", input.display(), e));

        let ::gltf::Gltf { document, blob } = ::gltf::Gltf::open(input).map_err(import_err)?;
        let buffers = ::gltf::import_buffers(&document, input.parent(), blob).map_err(import_err)?;
        self.summary = Some(summarize(&document));

        let mut nodes = Vec::new();
        match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => {
                for node in scene.nodes() {
                    self.visit(node, Mat4::IDENTITY, &buffers, &mut nodes)?;
                }
            }
            None => tracing::warn!("{} contains no scene", input.display()),
        }

        if self.settings.has(process::PRE_TRANSFORM_VERTICES) && !nodes.is_empty() {
            let meshes = nodes.into_iter().flat_map(|n| n.meshes).collect();
            nodes = vec![Node { name: MERGED_NODE_NAME.to_string(), meshes }];
        }

        finish(nodes, ir);
        tracing::info!(
            "imported {} nodes, {} vertices, {} indices",
            ir.nodes.len(),
            ir.num_vertices(),
            ir.num_indices()
        );
        Ok(())
    }

    fn dump_input(&self) -> Option<serde_json::Value> {
        self.summary.clone()
    }
}

/// Move `nodes` into `ir` with a component list that is the union of all
/// attributes, zero-filling vertices that lack one.
fn finish(mut nodes: Vec<Node>, ir: &mut Ir) {
    let attrs: BTreeSet<VertexAttr> = nodes
        .iter()
        .flat_map(|n| &n.meshes)
        .flat_map(|m| &m.vertices)
        .flat_map(|v| v.attrs())
        .collect();
    let components: Vec<VertexComponent> = attrs
        .into_iter()
        .map(|a| VertexComponent::new(a, a.default_format()))
        .collect();

    for v in nodes.iter_mut().flat_map(|n| &mut n.meshes).flat_map(|m| &mut m.vertices) {
        for c in &components {
            if !v.contains(c.attr) {
                v.set(c.attr, &[0.0; 4][..c.num_items()]);
            }
        }
    }
    ir.nodes = nodes;
    ir.vertex_components = components;
}

fn fill<const N: usize>(vertices: &mut [Vertex], attr: VertexAttr, values: impl Iterator<Item = [f32; N]>) {
    for (v, x) in vertices.iter_mut().zip(values) {
        v.set(attr, &x);
    }
}

fn flip_winding(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

fn primitive_kind(mode: Mode) -> u32 {
    match mode {
        Mode::Points => primitive::POINT,
        Mode::Lines | Mode::LineLoop | Mode::LineStrip => primitive::LINE,
        Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan => primitive::TRIANGLE,
    }
}

fn strip_to_list(raw: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(raw.len().saturating_sub(2) * 3);
    for (i, w) in raw.windows(3).enumerate() {
        let tri = if i % 2 == 0 { [w[0], w[1], w[2]] } else { [w[1], w[0], w[2]] };
        if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
            out.extend_from_slice(&tri);
        }
    }
    out
}

fn fan_to_list(raw: &[u32]) -> Vec<u32> {
    let Some((&first, rest)) = raw.split_first() else {
        return Vec::new();
    };
    rest.windows(2).flat_map(|w| [first, w[0], w[1]]).collect()
}

/// Area-weighted smooth normals.
fn smooth_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let positions: Vec<Vec3> = vertices
        .iter()
        .map(|v| v.get(VertexAttr::Position).map_or(Vec3::ZERO, Vec3::from_slice))
        .collect();
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    for (v, n) in vertices.iter_mut().zip(acc) {
        v.set(VertexAttr::Normal, &n.normalize_or_zero().to_array());
    }
}

fn summarize(document: &::gltf::Document) -> serde_json::Value {
    let nodes: Vec<_> = document
        .nodes()
        .map(|n| {
            json!({
                "index": n.index(),
                "name": n.name(),
                "mesh": n.mesh().map(|m| m.index()),
                "children": n.children().map(|c| c.index()).collect::<Vec<_>>(),
            })
        })
        .collect();
    let meshes: Vec<_> = document
        .meshes()
        .map(|m| {
            let primitives: Vec<_> = m
                .primitives()
                .map(|p| {
                    let attributes: Vec<_> = p
                        .attributes()
                        .map(|(semantic, accessor)| json!({
                            "semantic": format!("{:?}", semantic),
                            "count": accessor.count(),
                        }))
                        .collect();
                    json!({
                        "mode": format!("{:?}", p.mode()),
                        "attributes": attributes,
                        "indices": p.indices().map(|a| a.count()),
                    })
                })
                .collect();
            json!({ "name": m.name(), "primitives": primitives })
        })
        .collect();
    json!({
        "format": "glTF 2.0",
        "scenes": document.scenes().count(),
        "nodes": nodes,
        "meshes": meshes,
        "materials": document.materials().count(),
        "skins": document.skins().count(),
        "animations": document.animations().count(),
    })
}
