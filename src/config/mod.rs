//! Converter configuration.
//!
//! A TOML document, loaded once at startup and read-only afterwards:
//!
//! ```toml
//! aiProcess = ["Triangulate", "FlipUVs"]
//! PP_RVC_FLAGS = ["COLORS"]
//! PP_SBP_REMOVE = ["POINT", "LINE"]
//! IndexSize = 2
//!
//! [Layout.position]
//! format = "Short4N"
//! scale = 8
//! bias = 0.5
//! ```
//!
//! Missing flag sections and a missing `IndexSize` are warnings with a
//! default substituted. A missing `Layout` section is an error.

mod flags;

pub use flags::*;

use std::path::Path;

use serde::Deserialize;

use crate::quant::{VertexAttr, VertexComponent, VertexFormat, VertexLayout};
use crate::util::{Error, Result};

/// Section holding processing option names.
pub const SECTION_PROCESS: &str = "aiProcess";
/// Section holding component kinds to remove.
pub const SECTION_REMOVE_COMPONENTS: &str = "PP_RVC_FLAGS";
/// Section holding primitive kinds to remove.
pub const SECTION_REMOVE_PRIMITIVES: &str = "PP_SBP_REMOVE";
/// Index width key.
pub const KEY_INDEX_SIZE: &str = "IndexSize";
/// Declarative vertex layout section.
pub const SECTION_LAYOUT: &str = "Layout";

/// Width of indices in the output file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexSize {
    #[default]
    U16,
    U32,
}

impl IndexSize {
    /// Width in bytes (2 or 4).
    pub const fn bytes(self) -> u8 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Parse from a byte width.
    pub fn from_bytes(bytes: i64) -> Option<Self> {
        match bytes {
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            _ => None,
        }
    }

    /// Largest index value that fits.
    pub const fn max_index(self) -> u32 {
        match self {
            Self::U16 => u16::MAX as u32,
            Self::U32 => u32::MAX,
        }
    }
}

/// Numeric literal that may be written as an integer or a real.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Coerce to a float.
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Int(v) => v as f32,
            Self::Float(v) => v as f32,
        }
    }
}

/// One `[Layout.<attr>]` table.
#[derive(Clone, Debug, Default, Deserialize)]
struct LayoutEntry {
    format: Option<String>,
    scale: Option<Number>,
    bias: Option<Number>,
}

/// Parsed configuration document.
#[derive(Clone, Debug, Default)]
pub struct Config {
    doc: toml::Table,
}

impl Config {
    /// Load and parse a configuration file.
    ///
    /// Failure is logged as a warning and returned; whether it aborts the run
    /// is up to the caller.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!("Config::load(): {}: {}", path.display(), e);
            Error::from_open(e, path)
        })?;
        text.parse::<toml::Table>()
            .map(|doc| Self { doc })
            .map_err(|e| {
                tracing::warn!("Config::load(): {}: {}", path.display(), e);
                Error::ConfigParse { path: path.to_path_buf(), message: e.to_string() }
            })
    }

    /// Parse a configuration document from a string.
    pub fn parse(text: &str) -> Result<Self> {
        text.parse::<toml::Table>()
            .map(|doc| Self { doc })
            .map_err(|e| Error::ConfigParse { path: "<string>".into(), message: e.to_string() })
    }

    /// Resolve a section of option names into an OR-reduced bitmask.
    ///
    /// Names missing from `table` are dropped without a diagnostic. An absent
    /// section yields 0 with a warning; a present but empty one yields 0
    /// silently.
    pub fn resolve_flags(&self, section: &str, table: &FlagTable) -> u32 {
        let Some(value) = self.doc.get(section) else {
            tracing::warn!("no {} entry in config!", section);
            return 0;
        };
        let Some(items) = value.as_array() else {
            tracing::warn!("config entry {} is not an array, ignoring it", section);
            return 0;
        };
        let mut result = 0;
        for item in items {
            match item.as_str() {
                Some(name) => result |= table.lookup(name).unwrap_or(0),
                None => tracing::warn!("non-string item in {}: {}", section, item),
            }
        }
        result
    }

    /// `aiProcess` resolved against [`PROCESS_FLAGS`].
    pub fn process_flags(&self) -> u32 {
        self.resolve_flags(SECTION_PROCESS, &PROCESS_FLAGS)
    }

    /// `PP_RVC_FLAGS` resolved against [`COMPONENT_FLAGS`].
    pub fn remove_component_flags(&self) -> u32 {
        self.resolve_flags(SECTION_REMOVE_COMPONENTS, &COMPONENT_FLAGS)
    }

    /// `PP_SBP_REMOVE` resolved against [`PRIMITIVE_FLAGS`].
    pub fn remove_primitive_flags(&self) -> u32 {
        self.resolve_flags(SECTION_REMOVE_PRIMITIVES, &PRIMITIVE_FLAGS)
    }

    /// All three option masks.
    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            process: self.process_flags(),
            remove_components: self.remove_component_flags(),
            remove_primitives: self.remove_primitive_flags(),
        }
    }

    /// Configured index width; 2 bytes with a warning if absent.
    pub fn index_size(&self) -> Result<IndexSize> {
        let Some(value) = self.doc.get(KEY_INDEX_SIZE) else {
            tracing::warn!("no IndexSize in config, using 2 (for 16-bit indices)!");
            return Ok(IndexSize::U16);
        };
        value
            .as_integer()
            .and_then(IndexSize::from_bytes)
            .ok_or_else(|| Error::invalid_config(KEY_INDEX_SIZE, format!("expected 2 or 4, got {}", value)))
    }

    /// Declarative vertex layout.
    ///
    /// Components appear in canonical attribute order, one per attribute
    /// present under `Layout`. Absent `format` falls back to the attribute's
    /// float format, absent `scale`/`bias` to 1.0/0.0.
    pub fn layout(&self) -> Result<VertexLayout> {
        let section = self.doc.get(SECTION_LAYOUT).ok_or(Error::MissingLayout)?;
        let table = section
            .as_table()
            .ok_or_else(|| Error::invalid_config(SECTION_LAYOUT, "expected a table"))?;

        let mut layout = VertexLayout::new();
        for attr in VertexAttr::ALL {
            let Some(value) = table.get(attr.name()) else {
                continue;
            };
            let key = format!("{}.{}", SECTION_LAYOUT, attr.name());
            let entry: LayoutEntry = value
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| Error::invalid_config(&key, e.to_string()))?;

            let format = match &entry.format {
                Some(name) => VertexFormat::from_name(name)
                    .ok_or_else(|| Error::invalid_config(&key, format!("unknown format '{}'", name)))?,
                None => attr.default_format(),
            };
            let scale = entry.scale.map_or(1.0, Number::as_f32);
            if scale == 0.0 || !scale.is_finite() {
                return Err(Error::invalid_config(&key, format!("scale must be finite and non-zero, got {}", scale)));
            }
            let bias = entry.bias.map_or(0.0, Number::as_f32);
            layout.push(VertexComponent::with_range(attr, format, scale, bias));
        }
        Ok(layout)
    }
}
