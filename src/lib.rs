//! # orbconv
//!
//! Converts 3D scene sources into one canonical intermediate representation
//! and writes it as a quantized ORB vertex/index file for real-time renderers.
//!
//! ## Modules
//!
//! - [`util`] - Error type and result alias
//! - [`config`] - TOML configuration: importer option masks, index width, vertex layout
//! - [`quant`] - Vertex attributes, formats, layouts and the quantization codec
//! - [`ir`] - Intermediate representation (nodes, meshes, vertices, indices)
//! - [`loader`] - Scene loaders and loader selection
//! - [`proc`] - In-place IR transform stage
//! - [`orb`] - ORB binary writer and reader
//! - [`dump`] - Human-readable IR dumps
//! - [`pipeline`] - Command-line options and the conversion run
//!
//! ## Example
//!
//! ```ignore
//! use orbconv::pipeline::{Options, Pipeline};
//!
//! let mut options = Options::new("tiger.glb");
//! options.output = "tiger.orb".into();
//! let ir = Pipeline::new(options)?.run(&mut std::io::stdout())?;
//! println!("{} vertices", ir.num_vertices());
//! ```

pub mod util;
pub mod config;
pub mod quant;
pub mod ir;
pub mod loader;
pub mod proc;
pub mod orb;
pub mod dump;
pub mod pipeline;

pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::config::{Config, ImportSettings, IndexSize};
    pub use crate::quant::{VertexAttr, VertexComponent, VertexFormat, VertexLayout};
    pub use crate::ir::{Ir, Mesh, Node, Vertex};
    pub use crate::loader::{GltfImporter, InputKind, LoaderRegistry, SceneLoader};
    pub use crate::proc::{IrProcessor, ProcessorDef};
    pub use crate::orb::{OrbFile, OrbWriter};
    pub use crate::pipeline::{Options, Pipeline};
}
