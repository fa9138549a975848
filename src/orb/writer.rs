//! ORB writer.

use std::io::Write;
use std::path::Path;

use super::format::*;
use super::stream::OStream;
use crate::config::IndexSize;
use crate::ir::{Ir, Mesh};
use crate::quant::{encode_component, VertexLayout};
use crate::util::{Error, Result};

/// Serializes an [`Ir`] with a target [`VertexLayout`].
#[derive(Clone, Debug)]
pub struct OrbWriter {
    layout: VertexLayout,
    index_size: IndexSize,
}

impl OrbWriter {
    pub fn new(layout: VertexLayout, index_size: IndexSize) -> Self {
        Self { layout, index_size }
    }

    /// Target layout.
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn index_size(&self) -> IndexSize {
        self.index_size
    }

    /// Validate `ir` and write it to `path`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write(&self, path: impl AsRef<Path>, ir: &Ir) -> Result<()> {
        self.check(ir)?;
        let mut stream = OStream::create(path)?;
        self.write_to(&mut stream, ir)?;
        stream.flush()?;
        tracing::info!(
            "wrote {} nodes, {} vertices, {} indices ({} bytes)",
            ir.nodes.len(),
            ir.num_vertices(),
            ir.num_indices(),
            stream.pos()
        );
        Ok(())
    }

    /// Validate `ir` and serialize it into memory.
    pub fn to_bytes(&self, ir: &Ir) -> Result<Vec<u8>> {
        self.check(ir)?;
        let mut stream = OStream::new(Vec::new());
        self.write_to(&mut stream, ir)?;
        Ok(stream.into_inner())
    }

    fn check(&self, ir: &Ir) -> Result<()> {
        ir.validate()?;
        if self.layout.len() > u8::MAX as usize {
            return Err(Error::InvalidOrb(format!("{} components do not fit the header", self.layout.len())));
        }
        for c in &self.layout.components {
            if ir.component(c.attr).is_none() {
                tracing::warn!("IR has no {} data, writing zeros", c.attr);
                continue;
            }
            if let (Some((min, max)), Some((lo, hi))) = (c.format.raw_range(), ir.value_range(c.attr)) {
                if lo < min || hi > max {
                    tracing::warn!(
                        "{} values in [{}, {}] exceed the {} range [{}, {}], clamping",
                        c.attr, lo, hi, c.format, min, max
                    );
                }
            }
        }
        let max = self.index_size.max_index();
        if let Some(&index) = ir.meshes().flat_map(|m| m.indices.iter()).find(|&&i| i > max) {
            return Err(Error::IndexOverflow { index, bytes: self.index_size.bytes() });
        }
        for node in &ir.nodes {
            if node.name.len() > MAX_NAME_LEN {
                return Err(Error::InvalidOrb(format!("node name of {} bytes is too long", node.name.len())));
            }
        }
        Ok(())
    }

    fn write_to<W: Write>(&self, stream: &mut OStream<W>, ir: &Ir) -> Result<()> {
        stream.write_bytes(ORB_MAGIC)?;
        stream.write_u16(CURRENT_VERSION)?;
        stream.write_u8(self.index_size.bytes())?;
        stream.write_u8(self.layout.len() as u8)?;
        for c in &self.layout.components {
            stream.write_u8(c.attr as u8)?;
            stream.write_u8(c.format as u8)?;
            stream.write_f32(c.scale)?;
            stream.write_f32(c.bias)?;
        }

        stream.write_u32(len_u32(ir.nodes.len())?)?;
        for node in &ir.nodes {
            stream.write_u16(node.name.len() as u16)?;
            stream.write_bytes(node.name.as_bytes())?;
            stream.write_u32(len_u32(node.meshes.len())?)?;
            for mesh in &node.meshes {
                self.write_mesh(stream, mesh)?;
            }
        }
        Ok(())
    }

    fn write_mesh<W: Write>(&self, stream: &mut OStream<W>, mesh: &Mesh) -> Result<()> {
        stream.write_u32(len_u32(mesh.vertices.len())?)?;
        stream.write_u32(len_u32(mesh.indices.len())?)?;

        let mut record = Vec::with_capacity(self.layout.stride() * mesh.vertices.len());
        for vertex in &mesh.vertices {
            for c in &self.layout.components {
                encode_component(c, vertex.get(c.attr).unwrap_or(&[]), &mut record);
            }
        }
        stream.write_bytes(&record)?;

        for &index in &mesh.indices {
            match self.index_size {
                IndexSize::U16 => stream.write_u16(index as u16)?,
                IndexSize::U32 => stream.write_u32(index)?,
            }
        }
        Ok(())
    }
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidOrb(format!("count {} exceeds u32", len)))
}
