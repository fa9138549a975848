//! Scene loaders.
//!
//! A loader reads one input file and fills an empty [`Ir`]. The pipeline
//! picks the loader by [`InputKind`]; loaders are registered in a
//! [`LoaderRegistry`] so the proprietary scene-binary loader can be plugged
//! in by whoever owns that format.

mod gltf_import;

pub use gltf_import::GltfImporter;

use std::path::Path;

use crate::config::ImportSettings;
use crate::ir::Ir;
use crate::util::{Error, Result};

/// File extension of the proprietary scene-binary format.
pub const SCENE_BINARY_EXT: &str = "n3";

/// Input classification used for loader selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Proprietary scene binary; needs an asset root directory.
    SceneBinary,
    /// Anything else, handled by the generic import loader.
    Generic,
}

impl InputKind {
    /// Classify by file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == SCENE_BINARY_EXT => Self::SceneBinary,
            _ => Self::Generic,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::SceneBinary => "scene-binary (.n3)",
            Self::Generic => "generic",
        }
    }
}

/// Produces an [`Ir`] from an input file.
pub trait SceneLoader {
    /// Load `input` into `ir`. `asset_root` is the directory referenced
    /// resources resolve against, when the format needs one.
    fn load(&mut self, input: &Path, asset_root: Option<&Path>, ir: &mut Ir) -> Result<()>;

    /// Loader-specific summary of the last loaded input.
    fn dump_input(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Loader per input kind.
#[derive(Default)]
pub struct LoaderRegistry {
    scene_binary: Option<Box<dyn SceneLoader>>,
    generic: Option<Box<dyn SceneLoader>>,
}

impl LoaderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in generic importer.
    pub fn with_defaults(settings: ImportSettings) -> Self {
        let mut registry = Self::new();
        registry.register(InputKind::Generic, Box::new(GltfImporter::new(settings)));
        registry
    }

    /// Register (or replace) the loader for `kind`.
    pub fn register(&mut self, kind: InputKind, loader: Box<dyn SceneLoader>) {
        match kind {
            InputKind::SceneBinary => self.scene_binary = Some(loader),
            InputKind::Generic => self.generic = Some(loader),
        }
    }

    /// Loader for `kind`.
    pub fn get_mut(&mut self, kind: InputKind) -> Result<&mut dyn SceneLoader> {
        let slot = match kind {
            InputKind::SceneBinary => &mut self.scene_binary,
            InputKind::Generic => &mut self.generic,
        };
        match slot {
            Some(loader) => Ok(&mut **loader),
            None => Err(Error::NoLoader(kind.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::from_path("assets/tiger.n3"), InputKind::SceneBinary);
        assert_eq!(InputKind::from_path("assets/tiger.glb"), InputKind::Generic);
        assert_eq!(InputKind::from_path("assets/n3"), InputKind::Generic);
        assert_eq!(InputKind::from_path("tiger.N3"), InputKind::Generic);
    }

    #[test]
    fn test_registry_missing_loader() {
        let mut registry = LoaderRegistry::with_defaults(ImportSettings::default());
        assert!(registry.get_mut(InputKind::Generic).is_ok());
        assert!(matches!(
            registry.get_mut(InputKind::SceneBinary),
            Err(Error::NoLoader(_))
        ));
    }
}
