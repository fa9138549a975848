//! End-to-end conversion tests: glTF in, ORB out, dumps on stdout.

use std::path::{Path, PathBuf};

use orbconv::config::IndexSize;
use orbconv::ir::{Ir, Mesh, Node, Vertex};
use orbconv::loader::{InputKind, SceneLoader};
use orbconv::orb::OrbFile;
use orbconv::pipeline::{Options, Pipeline};
use orbconv::proc::ProcessorDef;
use orbconv::quant::{VertexAttr, VertexComponent, VertexFormat};
use orbconv::Error;

use serde_json::json;
use tempfile::TempDir;

/// Write a two-triangle quad (POSITION, NORMAL, TEXCOORD_0, u16 indices).
fn write_quad(dir: &Path) -> PathBuf {
    let mut bin = Vec::new();
    let floats: &[f32] = &[
        // positions
        -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0,
        // normals
        0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
        // uvs
        0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0,
    ];
    for v in floats {
        bin.extend_from_slice(&v.to_le_bytes());
    }
    for i in [0u16, 1, 2, 0, 2, 3] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    std::fs::write(dir.join("quad.bin"), &bin).unwrap();

    let doc = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "quad", "mesh": 0 }],
        "meshes": [{ "primitives": [{
            "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 },
            "indices": 3
        }] }],
        "buffers": [{ "uri": "quad.bin", "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 48, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 32 },
            { "buffer": 0, "byteOffset": 128, "byteLength": 12 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
              "min": [-1.0, -1.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 4, "type": "VEC2" },
            { "bufferView": 3, "componentType": 5123, "count": 6, "type": "SCALAR" }
        ]
    });
    let path = dir.join("quad.gltf");
    std::fs::write(&path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    path
}

fn quad_options(dir: &TempDir) -> Options {
    let mut options = Options::new(write_quad(dir.path()));
    options.output = dir.path().join("quad.orb");
    options
}

fn run(options: Options) -> (orbconv::Result<Ir>, String) {
    let mut out = Vec::new();
    let result = Pipeline::new(options).and_then(|mut p| p.run(&mut out));
    (result, String::from_utf8(out).unwrap())
}

const LAYOUT_TOML: &str = r#"
[Layout.position]
format = "Short4N"
scale = 2
bias = 0.5

[Layout.texcoord0]
format = "Short2N"
"#;

#[test]
fn test_convert_gltf_to_orb() {
    let dir = tempfile::tempdir().unwrap();
    let options = quad_options(&dir);
    let output = options.output.clone();
    let (result, stdout) = run(options);
    result.unwrap();
    assert!(stdout.is_empty());

    let orb = OrbFile::open(&output).unwrap();
    assert_eq!(orb.index_size, IndexSize::U16);
    let formats: Vec<_> = orb.layout.components.iter().map(|c| c.format).collect();
    assert_eq!(
        formats,
        vec![
            VertexFormat::Short4N,
            VertexFormat::Byte4N,
            VertexFormat::Short2N,
            VertexFormat::UByte4N,
            VertexFormat::UByte4,
        ]
    );

    assert_eq!(orb.nodes.len(), 1);
    assert_eq!(orb.nodes[0].name, "quad");
    let mesh = &orb.nodes[0].meshes[0];
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);

    let v = &mesh.vertices[2];
    let p = v.get(VertexAttr::Position).unwrap();
    assert!((p[0] - 1.0).abs() < 1e-3 && (p[1] - 1.0).abs() < 1e-3 && p[2].abs() < 1e-3);
    let n = v.get(VertexAttr::Normal).unwrap();
    assert!((n[2] - 1.0).abs() < 1e-6);
    let uv = v.get(VertexAttr::TexCoord0).unwrap();
    assert!((uv[0] - 1.0).abs() < 1e-4 && (uv[1] - 1.0).abs() < 1e-4);
    // skinning data is absent from the input
    assert_eq!(v.get(VertexAttr::Weights).unwrap(), &[0.0; 4]);
    assert_eq!(v.get(VertexAttr::Indices).unwrap(), &[0.0; 4]);
}

#[test]
fn test_vertex_and_index_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = quad_options(&dir);
    options.dump_vertices = true;
    options.dump_indices = true;
    let (result, stdout) = run(options);
    result.unwrap();

    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 4 + 2);
    assert_eq!(lines[0], "0: -1.0000 -1.0000 0.0000 0.0000 0.0000 1.0000 0.0000 0.0000 ");
    assert_eq!(lines[4], "0: 0 1 2");
    assert_eq!(lines[5], "1: 0 2 3");
}

#[test]
fn test_json_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = quad_options(&dir);
    options.dump_input = true;
    options.dump_irep = true;
    let (result, stdout) = run(options);
    let ir = result.unwrap();

    let mut docs = serde_json::Deserializer::from_str(&stdout).into_iter::<serde_json::Value>();
    let input = docs.next().unwrap().unwrap();
    assert_eq!(input["format"], "glTF 2.0");
    assert_eq!(input["meshes"].as_array().unwrap().len(), 1);
    let irep = docs.next().unwrap().unwrap();
    assert_eq!(irep["nodes"][0]["name"], "quad");
    assert_eq!(irep["nodes"][0]["meshes"][0]["indices"].as_array().unwrap().len(), ir.num_indices());
}

#[test]
fn test_config_drives_import_and_index_size() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conv.toml");
    let text = format!(
        "aiProcess = [\"FlipWindingOrder\", \"NotARealFlag\"]\nIndexSize = 4\n{}",
        LAYOUT_TOML
    );
    std::fs::write(&config, text).unwrap();

    let mut options = quad_options(&dir);
    options.config = Some(config);
    let output = options.output.clone();
    let (result, _) = run(options);
    result.unwrap();

    let orb = OrbFile::open(&output).unwrap();
    assert_eq!(orb.index_size, IndexSize::U32);
    assert_eq!(orb.nodes[0].meshes[0].indices, vec![0, 2, 1, 0, 3, 2]);
    // the configured layout never replaces the output layout
    assert_eq!(orb.layout.len(), 5);
}

#[test]
fn test_config_without_layout_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conv.toml");
    std::fs::write(&config, "IndexSize = 2\n").unwrap();

    let mut options = quad_options(&dir);
    options.config = Some(config);
    let output = options.output.clone();
    let (result, _) = run(options);
    assert!(matches!(result, Err(Error::MissingLayout)));
    assert!(!output.exists());
}

#[test]
fn test_broken_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conv.toml");
    std::fs::write(&config, "aiProcess = [\n").unwrap();

    let mut options = quad_options(&dir);
    options.config = Some(config);
    assert!(matches!(Pipeline::new(options), Err(Error::ConfigParse { .. })));
}

#[test]
fn test_processor_template_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = quad_options(&dir);
    options.dump_proc = true;
    let (result, stdout) = run(options);
    result.unwrap();

    let mut def: ProcessorDef = serde_json::from_str(&stdout).unwrap();
    assert_eq!(def.nodes[0].name, "quad");
    def.nodes[0].meshes[0].flip_winding = true;
    let proc_path = dir.path().join("proc.json");
    std::fs::write(&proc_path, serde_json::to_string(&def).unwrap()).unwrap();

    let mut options = quad_options(&dir);
    options.proc_file = Some(proc_path);
    let (result, _) = run(options);
    let ir = result.unwrap();
    assert_eq!(ir.nodes[0].meshes[0].indices, vec![0, 2, 1, 0, 3, 2]);
}

#[test]
fn test_relative_paths_use_asset_dirs() {
    let dir = tempfile::tempdir().unwrap();
    write_quad(dir.path());

    let mut options = Options::new("quad.gltf");
    options.in_dir = Some(dir.path().to_path_buf());
    options.out_dir = Some(dir.path().join("out"));
    options.output = PathBuf::from("quad.orb");
    let (result, _) = run(options);
    result.unwrap();
    assert!(dir.path().join("out").join("quad.orb").is_file());
}

/// Stand-in for the proprietary scene loader: one node, one mesh, two vertices.
struct TwoVertexLoader {
    seen_root: Option<PathBuf>,
}

impl SceneLoader for TwoVertexLoader {
    fn load(&mut self, _input: &Path, asset_root: Option<&Path>, ir: &mut Ir) -> orbconv::Result<()> {
        self.seen_root = asset_root.map(Path::to_path_buf);
        ir.vertex_components.push(VertexComponent::new(VertexAttr::Position, VertexFormat::Float3));
        let vertices = [[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]
            .iter()
            .map(|p| Vertex::from_iter([(VertexAttr::Position, p.as_slice())]))
            .collect();
        ir.nodes.push(Node { name: "n3".into(), meshes: vec![Mesh { vertices, indices: Vec::new() }] });
        Ok(())
    }

    fn dump_input(&self) -> Option<serde_json::Value> {
        Some(json!({ "root": self.seen_root }))
    }
}

#[test]
fn test_registered_scene_binary_loader() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tiger.n3");
    std::fs::write(&input, b"N3").unwrap();

    let mut options = Options::new(&input);
    options.output = dir.path().join("tiger.orb");
    options.n3_dir = Some(dir.path().to_path_buf());
    options.dump_vertices = true;

    let mut pipeline = Pipeline::new(options).unwrap();
    pipeline
        .registry_mut()
        .register(InputKind::SceneBinary, Box::new(TwoVertexLoader { seen_root: None }));
    let mut out = Vec::new();
    pipeline.run(&mut out).unwrap();

    let stdout = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let (_, values) = line.split_once(": ").unwrap();
        assert_eq!(values.split_whitespace().count(), 3);
    }
}
