//! ORB reader.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use super::format::*;
use crate::config::IndexSize;
use crate::ir::{Mesh, Node, Vertex};
use crate::quant::{decode_component, VertexAttr, VertexComponent, VertexFormat, VertexLayout};
use crate::util::{Error, Result};

/// Decoded ORB file.
///
/// Vertices are dequantized back into floats and keyed by attribute, so the
/// nodes can be compared against the [`Ir`](crate::ir::Ir) they were written from.
#[derive(Clone, Debug)]
pub struct OrbFile {
    pub version: u16,
    pub index_size: IndexSize,
    pub layout: VertexLayout,
    pub nodes: Vec<Node>,
}

impl OrbFile {
    /// Open a file with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        if use_mmap {
            // Safety: the file is opened read-only and the map does not outlive this call.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            Self::parse(&mmap)
        } else {
            Self::parse(&std::fs::read(path)?)
        }
    }

    /// Decode an in-memory ORB image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cur = Cursor::new(data);

        if cur.take(ORB_MAGIC.len())? != ORB_MAGIC {
            return Err(Error::InvalidOrb("bad magic".into()));
        }
        let version = cur.u16()?;
        if version != CURRENT_VERSION {
            return Err(Error::InvalidOrb(format!("unsupported version {}", version)));
        }
        let index_bytes = cur.u8()?;
        let index_size = IndexSize::from_bytes(index_bytes as i64)
            .ok_or_else(|| Error::InvalidOrb(format!("index size {}", index_bytes)))?;

        let count = cur.u8()?;
        let mut layout = VertexLayout::new();
        for _ in 0..count {
            let attr = cur.u8()?;
            let attr = VertexAttr::from_u8(attr)
                .ok_or_else(|| Error::InvalidOrb(format!("attribute code {}", attr)))?;
            let format = cur.u8()?;
            let format = VertexFormat::from_u8(format)
                .ok_or_else(|| Error::InvalidOrb(format!("format code {}", format)))?;
            let scale = cur.f32()?;
            let bias = cur.f32()?;
            layout.push(VertexComponent::with_range(attr, format, scale, bias));
        }

        let stride = layout.stride();
        let node_count = cur.u32()?;
        let mut nodes = Vec::new();
        for _ in 0..node_count {
            let len = cur.u16()? as usize;
            let name = String::from_utf8(cur.take(len)?.to_vec())?;
            let mesh_count = cur.u32()?;
            let mut node = Node::new(name);
            for _ in 0..mesh_count {
                let vertex_count = cur.u32()? as usize;
                let index_count = cur.u32()? as usize;

                if stride == 0 && vertex_count > 0 {
                    return Err(Error::InvalidOrb(format!(
                        "{} vertices declared without vertex components",
                        vertex_count
                    )));
                }
                let records = cur.take(vertex_count.saturating_mul(stride))?;
                let vertices = records
                    .chunks_exact(stride.max(1))
                    .map(|record| decode_record(&layout, record))
                    .collect();

                let indices = (0..index_count)
                    .map(|_| match index_size {
                        IndexSize::U16 => cur.u16().map(u32::from),
                        IndexSize::U32 => cur.u32(),
                    })
                    .collect::<Result<Vec<_>>>()?;
                node.meshes.push(Mesh { vertices, indices });
            }
            nodes.push(node);
        }

        if cur.pos < data.len() {
            tracing::warn!("{} trailing bytes after ORB data", data.len() - cur.pos);
        }

        Ok(Self { version, index_size, layout, nodes })
    }

    /// Iterate all meshes of all nodes in order.
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().flat_map(|n| n.meshes.iter())
    }
}

fn decode_record(layout: &VertexLayout, record: &[u8]) -> Vertex {
    let mut vertex = Vertex::new();
    let mut offset = 0;
    for c in &layout.components {
        let size = c.format.byte_size();
        vertex.set(c.attr, &decode_component(c, &record[offset..offset + size]));
        offset += size;
    }
    vertex
}

/// Bounds-checked little-endian reader over a byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::UnexpectedEof(self.pos as u64))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }
}
