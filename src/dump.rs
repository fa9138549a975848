//! Human-readable IR dumps.
//!
//! Each dump returns text; the caller decides where it goes.

use crate::ir::Ir;
use crate::proc::ProcessorDef;
use crate::util::Result;

/// Full IR as pretty-printed JSON.
pub fn dump_irep(ir: &Ir) -> Result<String> {
    Ok(serde_json::to_string_pretty(ir)?)
}

/// Processor definition skeleton for `ir`, ready to be edited and passed to `-proc`.
pub fn dump_processor_template(ir: &Ir) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ProcessorDef::template(ir))?)
}

/// Loader summary as pretty-printed JSON.
pub fn dump_input(summary: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// One line per vertex: running vertex number, then every value of every
/// IR component in the IR's own component order.
///
/// Fails if a vertex does not match the declared components.
pub fn dump_vertices(ir: &Ir) -> Result<String> {
    let mut out = String::new();
    let mut n = 0usize;
    for mesh in ir.meshes() {
        for vertex in &mesh.vertices {
            ir.check_vertex(vertex)?;
            out.push_str(&format!("{}: ", n));
            for c in &ir.vertex_components {
                for v in vertex.get(c.attr).unwrap_or(&[]) {
                    out.push_str(&format!("{:.4} ", v));
                }
            }
            out.push('\n');
            n += 1;
        }
    }
    Ok(out)
}

/// One line per triangle: running triangle number and its three indices.
///
/// Fails if any mesh's index count is not a multiple of three.
pub fn dump_indices(ir: &Ir) -> Result<String> {
    let mut out = String::new();
    let mut t = 0usize;
    for mesh in ir.meshes() {
        mesh.check_triangles()?;
        for tri in mesh.indices.chunks_exact(3) {
            out.push_str(&format!("{}: {} {} {}\n", t, tri[0], tri[1], tri[2]));
            t += 1;
        }
    }
    Ok(out)
}
