//! Conversion run: argument parsing and the load, process, save, dump sequence.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{Config, ImportSettings, IndexSize};
use crate::dump;
use crate::ir::Ir;
use crate::loader::{InputKind, LoaderRegistry};
use crate::orb::OrbWriter;
use crate::proc::{IrProcessor, ProcessorDef};
use crate::quant::{VertexAttr, VertexComponent, VertexFormat, VertexLayout};
use crate::util::{Error, Result};

/// Output path used when `-out` is not given.
pub const DEFAULT_OUTPUT: &str = "out.orb";

/// Flag table used for usage text.
const FLAGS: &[(&str, &str)] = &[
    ("-help", "show help"),
    ("-in <path>", "input file or asset name (.n3, .gltf, .glb)"),
    ("-out <path>", "output filename or path (default: out.orb)"),
    ("-indir <dir>", "optional asset root directory, resolves a relative -in"),
    ("-outdir <dir>", "optional output asset root directory, resolves a relative -out"),
    ("-proc <path>", "run IR processor with this JSON file (generate with -dumpproc)"),
    ("-config <path>", "TOML import/export configuration"),
    ("-dumpin", "dump input file info to JSON"),
    ("-dumpirep", "dump intermediate representation to JSON"),
    ("-dumpproc", "dump processor template to JSON"),
    ("-dumpvtx", "dump intermediate representation vertex data"),
    ("-dumpidx", "dump intermediate representation index data"),
    ("-n3dir <dir>", "N3 asset root directory (when loading .n3 file)"),
    ("-v", "show debug output"),
    ("-vv", "show trace output"),
    ("-q", "only show errors"),
];

/// Usage text for `-help`.
pub fn usage() -> String {
    let mut text = String::from("orbconv - 3D asset converter\n\nUSAGE:\n    orbconv -in <path> [OPTIONS]\n\nOPTIONS:\n");
    for (flag, help) in FLAGS {
        text.push_str(&format!("    {:<18}{}\n", flag, help));
    }
    text
}

/// Log verbosity selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Debug,
    Trace,
}

impl Verbosity {
    /// Default `EnvFilter` directive for this level.
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Options of one conversion run.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub in_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub proc_file: Option<PathBuf>,
    pub n3_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub dump_input: bool,
    pub dump_irep: bool,
    pub dump_proc: bool,
    pub dump_vertices: bool,
    pub dump_indices: bool,
    pub verbosity: Verbosity,
}

impl Options {
    /// Options for `input` with every other setting at its default.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            in_dir: None,
            out_dir: None,
            proc_file: None,
            n3_dir: None,
            config: None,
            dump_input: false,
            dump_irep: false,
            dump_proc: false,
            dump_vertices: false,
            dump_indices: false,
            verbosity: Verbosity::Normal,
        }
    }

    /// Input path, joined onto `-indir` when relative.
    pub fn input_path(&self) -> PathBuf {
        resolve(self.in_dir.as_deref(), &self.input)
    }

    /// Output path, joined onto `-outdir` when relative.
    pub fn output_path(&self) -> PathBuf {
        resolve(self.out_dir.as_deref(), &self.output)
    }
}

fn resolve(dir: Option<&Path>, path: &Path) -> PathBuf {
    match dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Parsed command line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Convert(Options),
}

/// Parse command-line arguments (without the program name).
///
/// `-help` wins over everything else. Empty path values count as absent.
pub fn parse_args<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = Options::new(PathBuf::new());
    let mut input = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        let mut value = || -> Result<Option<PathBuf>> {
            let v = args
                .next()
                .ok_or_else(|| Error::Args(format!("{} expects a value", arg)))?;
            let v = v.as_ref();
            Ok((!v.is_empty()).then(|| PathBuf::from(v)))
        };
        match arg {
            "-help" => return Ok(Command::Help),
            "-in" => input = value()?,
            "-out" => options.output = value()?.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            "-indir" => options.in_dir = value()?,
            "-outdir" => options.out_dir = value()?,
            "-proc" => options.proc_file = value()?,
            "-n3dir" => options.n3_dir = value()?,
            "-config" => options.config = value()?,
            "-dumpin" => options.dump_input = true,
            "-dumpirep" => options.dump_irep = true,
            "-dumpproc" => options.dump_proc = true,
            "-dumpvtx" => options.dump_vertices = true,
            "-dumpidx" => options.dump_indices = true,
            "-v" => options.verbosity = Verbosity::Debug,
            "-vv" => options.verbosity = Verbosity::Trace,
            "-q" => options.verbosity = Verbosity::Quiet,
            other => return Err(Error::Args(format!("unknown argument '{}'", other))),
        }
    }

    options.input = input.ok_or_else(|| Error::Args("no input file provided (-in)".into()))?;
    Ok(Command::Convert(options))
}

/// Layout every output file is written with.
///
/// Position scale and bias start as identity; [`Pipeline::run`] fits them to
/// the IR before writing.
pub fn fixed_output_layout() -> VertexLayout {
    let mut layout = VertexLayout::new();
    layout
        .push(VertexComponent::new(VertexAttr::Position, VertexFormat::Short4N))
        .push(VertexComponent::new(VertexAttr::Normal, VertexFormat::Byte4N))
        .push(VertexComponent::new(VertexAttr::TexCoord0, VertexFormat::Short2N))
        .push(VertexComponent::new(VertexAttr::Weights, VertexFormat::UByte4N))
        .push(VertexComponent::new(VertexAttr::Indices, VertexFormat::UByte4));
    layout
}

/// One conversion run.
pub struct Pipeline {
    options: Options,
    configured_layout: Option<VertexLayout>,
    index_size: IndexSize,
    registry: LoaderRegistry,
}

impl Pipeline {
    /// Prepare a run.
    ///
    /// Loads the configuration document when one is given and resolves
    /// everything the run reads from it, so configuration errors surface
    /// before any input is touched.
    pub fn new(options: Options) -> Result<Self> {
        let config = options.config.as_deref().map(Config::load).transpose()?;
        let (settings, configured_layout, index_size) = match &config {
            Some(config) => {
                let layout = config.layout()?;
                tracing::debug!(
                    "configured layout has {} components, stride {} (output uses the fixed layout)",
                    layout.len(),
                    layout.stride()
                );
                (config.import_settings(), Some(layout), config.index_size()?)
            }
            None => (ImportSettings::default(), None, IndexSize::default()),
        };
        tracing::debug!("import settings: {:?}", settings);
        Ok(Self {
            options,
            configured_layout,
            index_size,
            registry: LoaderRegistry::with_defaults(settings),
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Layout declared by the configuration, if one was given.
    pub fn configured_layout(&self) -> Option<&VertexLayout> {
        self.configured_layout.as_ref()
    }

    /// Index width the output is written with.
    pub fn index_size(&self) -> IndexSize {
        self.index_size
    }

    /// Loader registry, for plugging in additional loaders before [`run`](Self::run).
    pub fn registry_mut(&mut self) -> &mut LoaderRegistry {
        &mut self.registry
    }

    /// Load, optionally process, write, then emit the requested dumps to `out`.
    ///
    /// Returns the final IR.
    pub fn run(&mut self, out: &mut impl Write) -> Result<Ir> {
        let input = self.options.input_path();
        if !input.is_file() {
            return Err(Error::FileNotFound(input));
        }

        let kind = InputKind::from_path(&input);
        let asset_root = match kind {
            InputKind::SceneBinary => Some(self.options.n3_dir.as_deref().ok_or_else(|| {
                Error::MissingAssetRoot { flag: "-n3dir", input: input.clone() }
            })?),
            InputKind::Generic => None,
        };

        tracing::info!("loading {} ({})", input.display(), kind.name());
        let loader = self.registry.get_mut(kind)?;
        let mut ir = Ir::new();
        loader.load(&input, asset_root, &mut ir)?;
        tracing::info!(
            "loaded {} nodes, {} vertices, {} indices",
            ir.nodes.len(),
            ir.num_vertices(),
            ir.num_indices()
        );
        if self.options.dump_input {
            match loader.dump_input() {
                Some(summary) => writeln!(out, "{}", dump::dump_input(&summary)?)?,
                None => tracing::warn!("loader has no input summary to dump"),
            }
        }

        if let Some(path) = &self.options.proc_file {
            tracing::info!("processing with {}", path.display());
            ProcessorDef::load(path)?.process(&mut ir)?;
        }

        self.save(&ir)?;

        if self.options.dump_proc {
            writeln!(out, "{}", dump::dump_processor_template(&ir)?)?;
        }
        if self.options.dump_irep {
            writeln!(out, "{}", dump::dump_irep(&ir)?)?;
        }
        if self.options.dump_vertices {
            writeln!(out, "{}", dump::dump_vertices(&ir)?)?;
        }
        if self.options.dump_indices {
            write!(out, "{}", dump::dump_indices(&ir)?)?;
        }
        Ok(ir)
    }

    fn save(&self, ir: &Ir) -> Result<()> {
        let mut layout = fixed_output_layout();
        layout.fit_range(ir, VertexAttr::Position);

        let output = self.options.output_path();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OrbWriter::new(layout, self.index_size).write(&output, ir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(args: &[&str]) -> Options {
        match parse_args(args).unwrap() {
            Command::Convert(options) => options,
            Command::Help => panic!("expected convert"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let options = convert(&["-in", "tiger.glb"]);
        assert_eq!(options, Options::new("tiger.glb"));
        assert_eq!(options.output, PathBuf::from("out.orb"));
    }

    #[test]
    fn test_parse_all_flags() {
        let options = convert(&[
            "-in", "a.n3", "-out", "b.orb", "-indir", "src", "-outdir", "dst", "-proc", "p.json",
            "-n3dir", "assets", "-config", "c.toml", "-dumpin", "-dumpirep", "-dumpproc",
            "-dumpvtx", "-dumpidx", "-vv",
        ]);
        assert_eq!(options.input_path(), PathBuf::from("src").join("a.n3"));
        assert_eq!(options.output_path(), PathBuf::from("dst").join("b.orb"));
        assert_eq!(options.n3_dir, Some(PathBuf::from("assets")));
        assert!(options.dump_input && options.dump_irep && options.dump_proc);
        assert!(options.dump_vertices && options.dump_indices);
        assert_eq!(options.verbosity, Verbosity::Trace);
    }

    #[test]
    fn test_parse_help_wins() {
        assert_eq!(parse_args(["-dumpvtx", "-help"]).unwrap(), Command::Help);
        assert!(usage().contains("-n3dir"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_args(["-dumpvtx"]), Err(Error::Args(_))));
        assert!(matches!(parse_args(["-in"]), Err(Error::Args(_))));
        assert!(matches!(parse_args(["-in", "a.glb", "-bogus"]), Err(Error::Args(_))));
        assert!(matches!(parse_args(["-in", ""]), Err(Error::Args(_))));
    }

    #[test]
    fn test_fixed_layout() {
        let layout = fixed_output_layout();
        let formats: Vec<_> = layout.components.iter().map(|c| (c.attr, c.format)).collect();
        assert_eq!(
            formats,
            vec![
                (VertexAttr::Position, VertexFormat::Short4N),
                (VertexAttr::Normal, VertexFormat::Byte4N),
                (VertexAttr::TexCoord0, VertexFormat::Short2N),
                (VertexAttr::Weights, VertexFormat::UByte4N),
                (VertexAttr::Indices, VertexFormat::UByte4),
            ]
        );
        assert_eq!(layout.stride(), 8 + 4 + 4 + 4 + 4);
    }

    #[test]
    fn test_scene_binary_needs_asset_root() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tiger.n3");
        std::fs::write(&input, b"N3").unwrap();

        let mut pipeline = Pipeline::new(Options::new(&input)).unwrap();
        assert!(matches!(
            pipeline.run(&mut Vec::new()),
            Err(Error::MissingAssetRoot { flag: "-n3dir", .. })
        ));

        let mut options = Options::new(&input);
        options.n3_dir = Some(dir.path().to_path_buf());
        let mut pipeline = Pipeline::new(options).unwrap();
        assert!(matches!(pipeline.run(&mut Vec::new()), Err(Error::NoLoader(_))));
    }

    #[test]
    fn test_config_resolved_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("conv.toml");
        // the input does not exist: a missing Layout must be reported first
        let mut options = Options::new(dir.path().join("nope.glb"));
        options.config = Some(config.clone());

        std::fs::write(&config, "IndexSize = 4\n").unwrap();
        assert!(matches!(Pipeline::new(options.clone()), Err(Error::MissingLayout)));

        std::fs::write(&config, "IndexSize = 3\n[Layout.position]\n").unwrap();
        assert!(matches!(Pipeline::new(options.clone()), Err(Error::InvalidConfig { .. })));

        std::fs::write(&config, "IndexSize = 4\n[Layout.position]\nformat = \"Short4N\"\n").unwrap();
        let pipeline = Pipeline::new(options).unwrap();
        assert_eq!(pipeline.index_size(), IndexSize::U32);
        assert_eq!(pipeline.configured_layout().map(VertexLayout::len), Some(1));

        let pipeline = Pipeline::new(Options::new("a.glb")).unwrap();
        assert_eq!(pipeline.index_size(), IndexSize::U16);
        assert!(pipeline.configured_layout().is_none());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = Pipeline::new(Options::new(dir.path().join("nope.glb"))).unwrap();
        assert!(matches!(pipeline.run(&mut Vec::new()), Err(Error::FileNotFound(_))));
    }
}
