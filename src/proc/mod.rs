//! IR transform stage.
//!
//! A processor mutates the IR in place between load and save and must leave
//! every IR invariant intact. The built-in [`ProcessorDef`] is a JSON document
//! whose skeleton is generated from an IR (`-dumpproc`), edited by hand and
//! fed back with `-proc` on a later run:
//!
//! ```json
//! { "nodes": [ { "name": "body", "keep": true,
//!                "meshes": [ { "keep": true, "flip_winding": false } ] } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ir::Ir;
use crate::util::{Error, Result};

/// Mutates an IR in place.
pub trait IrProcessor {
    fn process(&self, ir: &mut Ir) -> Result<()>;
}

fn yes() -> bool {
    true
}

/// Per-mesh edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshDef {
    #[serde(default = "yes")]
    pub keep: bool,
    #[serde(default)]
    pub flip_winding: bool,
}

impl Default for MeshDef {
    fn default() -> Self {
        Self { keep: true, flip_winding: false }
    }
}

/// Per-node edits. An empty `meshes` list leaves every mesh untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default = "yes")]
    pub keep: bool,
    #[serde(default)]
    pub meshes: Vec<MeshDef>,
}

/// Hand-editable processor definition.
///
/// Nodes are matched to IR nodes by position and must carry the same name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorDef {
    pub nodes: Vec<NodeDef>,
}

impl ProcessorDef {
    /// Load a definition from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_open(e, path))?;
        serde_json::from_str(&text).map_err(|e| Error::Processor(format!("{}: {}", path.display(), e)))
    }

    /// Skeleton that keeps everything as is.
    pub fn template(ir: &Ir) -> Self {
        let nodes = ir
            .nodes
            .iter()
            .map(|n| NodeDef {
                name: n.name.clone(),
                keep: true,
                meshes: vec![MeshDef::default(); n.meshes.len()],
            })
            .collect();
        Self { nodes }
    }

    fn check_matches(&self, ir: &Ir) -> Result<()> {
        if self.nodes.len() != ir.nodes.len() {
            return Err(Error::Processor(format!(
                "definition has {} nodes, IR has {}",
                self.nodes.len(),
                ir.nodes.len()
            )));
        }
        for (i, (def, node)) in self.nodes.iter().zip(&ir.nodes).enumerate() {
            if def.name != node.name {
                return Err(Error::Processor(format!(
                    "node {} is '{}' in the definition but '{}' in the IR",
                    i, def.name, node.name
                )));
            }
            if !def.meshes.is_empty() && def.meshes.len() != node.meshes.len() {
                return Err(Error::Processor(format!(
                    "node '{}' has {} mesh entries, IR has {} meshes",
                    node.name,
                    def.meshes.len(),
                    node.meshes.len()
                )));
            }
        }
        Ok(())
    }
}

impl IrProcessor for ProcessorDef {
    #[tracing::instrument(skip_all)]
    fn process(&self, ir: &mut Ir) -> Result<()> {
        self.check_matches(ir)?;

        let nodes = std::mem::take(&mut ir.nodes);
        for (def, mut node) in self.nodes.iter().zip(nodes) {
            if !def.keep {
                tracing::debug!("dropping node '{}'", node.name);
                continue;
            }
            if !def.meshes.is_empty() {
                let meshes = std::mem::take(&mut node.meshes);
                for (mdef, mut mesh) in def.meshes.iter().zip(meshes) {
                    if !mdef.keep {
                        continue;
                    }
                    if mdef.flip_winding {
                        mesh.flip_winding();
                    }
                    node.meshes.push(mesh);
                }
            }
            ir.nodes.push(node);
        }
        ir.validate()
    }
}
