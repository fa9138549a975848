//! Importer option name tables.
//!
//! Bit values are the ones assimp uses for `aiProcess_*`, `aiComponent_*`
//! and `aiPrimitiveType_*`, so a resolved mask can be handed to any
//! assimp-compatible importer unchanged.

/// Static name to bit table.
#[derive(Clone, Copy, Debug)]
pub struct FlagTable(pub &'static [(&'static str, u32)]);

impl FlagTable {
    /// Exact-match lookup of `name`.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    /// All names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.0.iter().map(|(n, _)| *n)
    }
}

/// Post-processing option bits.
pub mod process {
    pub const CALC_TANGENT_SPACE: u32 = 0x1;
    pub const JOIN_IDENTICAL_VERTICES: u32 = 0x2;
    pub const MAKE_LEFT_HANDED: u32 = 0x4;
    pub const TRIANGULATE: u32 = 0x8;
    pub const REMOVE_COMPONENT: u32 = 0x10;
    pub const GEN_NORMALS: u32 = 0x20;
    pub const GEN_SMOOTH_NORMALS: u32 = 0x40;
    pub const SPLIT_LARGE_MESHES: u32 = 0x80;
    pub const PRE_TRANSFORM_VERTICES: u32 = 0x100;
    pub const LIMIT_BONE_WEIGHTS: u32 = 0x200;
    pub const VALIDATE_DATA_STRUCTURE: u32 = 0x400;
    pub const IMPROVE_CACHE_LOCALITY: u32 = 0x800;
    pub const REMOVE_REDUNDANT_MATERIALS: u32 = 0x1000;
    pub const FIX_INFACING_NORMALS: u32 = 0x2000;
    pub const SORT_BY_PTYPE: u32 = 0x8000;
    pub const FIND_DEGENERATES: u32 = 0x10000;
    pub const FIND_INVALID_DATA: u32 = 0x20000;
    pub const GEN_UV_COORDS: u32 = 0x40000;
    pub const TRANSFORM_UV_COORDS: u32 = 0x80000;
    pub const FIND_INSTANCES: u32 = 0x100000;
    pub const OPTIMIZE_MESHES: u32 = 0x200000;
    pub const OPTIMIZE_GRAPH: u32 = 0x400000;
    pub const FLIP_UVS: u32 = 0x800000;
    pub const FLIP_WINDING_ORDER: u32 = 0x1000000;
    pub const SPLIT_BY_BONE_COUNT: u32 = 0x2000000;
    pub const DEBONE: u32 = 0x4000000;
}

/// Component kinds removable with `RemoveComponent`.
pub mod component {
    pub const NORMALS: u32 = 0x2;
    pub const TANGENTS_AND_BITANGENTS: u32 = 0x4;
    /// All color sets.
    pub const COLORS: u32 = 0x8;
    pub const TEXCOORDS: u32 = 0x10;
    pub const BONEWEIGHTS: u32 = 0x20;
    pub const ANIMATIONS: u32 = 0x40;
    pub const TEXTURES: u32 = 0x80;
    pub const LIGHTS: u32 = 0x100;
    pub const CAMERAS: u32 = 0x200;
    pub const MESHES: u32 = 0x400;
    pub const MATERIALS: u32 = 0x800;

    /// Single color set `n`.
    pub const fn colors_n(n: u32) -> u32 {
        1 << (n + 20)
    }

    /// Single texture coordinate set `n`.
    pub const fn texcoords_n(n: u32) -> u32 {
        1 << (n + 25)
    }
}

/// Primitive kinds removable with `SortByPType`.
pub mod primitive {
    pub const POINT: u32 = 0x1;
    pub const LINE: u32 = 0x2;
    pub const TRIANGLE: u32 = 0x4;
    pub const POLYGON: u32 = 0x8;
}

pub const PROCESS_FLAGS: FlagTable = FlagTable(&[
    ("CalcTangentSpace", process::CALC_TANGENT_SPACE),
    ("JoinIdenticalVertices", process::JOIN_IDENTICAL_VERTICES),
    ("MakeLeftHanded", process::MAKE_LEFT_HANDED),
    ("Triangulate", process::TRIANGULATE),
    ("RemoveComponent", process::REMOVE_COMPONENT),
    ("GenNormals", process::GEN_NORMALS),
    ("GenSmoothNormals", process::GEN_SMOOTH_NORMALS),
    ("SplitLargeMeshes", process::SPLIT_LARGE_MESHES),
    ("PreTransformVertices", process::PRE_TRANSFORM_VERTICES),
    ("LimitBoneWeights", process::LIMIT_BONE_WEIGHTS),
    ("ValidateDataStructure", process::VALIDATE_DATA_STRUCTURE),
    ("ImproveCacheLocality", process::IMPROVE_CACHE_LOCALITY),
    ("RemoveRedundantMaterials", process::REMOVE_REDUNDANT_MATERIALS),
    ("FixInfacingNormals", process::FIX_INFACING_NORMALS),
    ("SortByPType", process::SORT_BY_PTYPE),
    ("FindDegenerates", process::FIND_DEGENERATES),
    ("FindInvalidData", process::FIND_INVALID_DATA),
    ("GenUVCoords", process::GEN_UV_COORDS),
    ("TransformUVCoords", process::TRANSFORM_UV_COORDS),
    ("FindInstances", process::FIND_INSTANCES),
    ("OptimizeMeshes", process::OPTIMIZE_MESHES),
    ("OptimizeGraph", process::OPTIMIZE_GRAPH),
    ("FlipUVs", process::FLIP_UVS),
    ("FlipWindingOrder", process::FLIP_WINDING_ORDER),
    ("SplitByBoneCount", process::SPLIT_BY_BONE_COUNT),
    ("Debone", process::DEBONE),
]);

pub const COMPONENT_FLAGS: FlagTable = FlagTable(&[
    ("NORMALS", component::NORMALS),
    ("TANGENTS_AND_BITANGENTS", component::TANGENTS_AND_BITANGENTS),
    ("COLORS", component::COLORS),
    ("COLORS0", component::colors_n(0)),
    ("COLORS1", component::colors_n(1)),
    ("COLORS2", component::colors_n(2)),
    ("COLORS3", component::colors_n(3)),
    ("TEXCOORDS", component::TEXCOORDS),
    ("TEXCOORDS0", component::texcoords_n(0)),
    ("TEXCOORDS1", component::texcoords_n(1)),
    ("TEXCOORDS2", component::texcoords_n(2)),
    ("TEXCOORDS3", component::texcoords_n(3)),
    ("BONEWEIGHTS", component::BONEWEIGHTS),
    ("ANIMATIONS", component::ANIMATIONS),
    ("TEXTURES", component::TEXTURES),
    ("LIGHTS", component::LIGHTS),
    ("CAMERAS", component::CAMERAS),
    ("MESHES", component::MESHES),
    ("MATERIALS", component::MATERIALS),
]);

pub const PRIMITIVE_FLAGS: FlagTable = FlagTable(&[
    ("POINT", primitive::POINT),
    ("LINE", primitive::LINE),
    ("TRIANGLE", primitive::TRIANGLE),
    ("POLYGON", primitive::POLYGON),
]);

/// Resolved option masks handed to the generic import loader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSettings {
    /// `aiProcess` options
    pub process: u32,
    /// `PP_RVC_FLAGS`, honored when `RemoveComponent` is set
    pub remove_components: u32,
    /// `PP_SBP_REMOVE`, honored when `SortByPType` is set
    pub remove_primitives: u32,
}

impl ImportSettings {
    #[inline]
    pub fn has(&self, process_flag: u32) -> bool {
        self.process & process_flag != 0
    }

    /// True if `RemoveComponent` is active and any bit of `mask` is requested.
    pub fn removes_component(&self, mask: u32) -> bool {
        self.has(process::REMOVE_COMPONENT) && self.remove_components & mask != 0
    }

    /// True if `SortByPType` is active and `kind` is requested for removal.
    pub fn removes_primitive(&self, kind: u32) -> bool {
        self.has(process::SORT_BY_PTYPE) && self.remove_primitives & kind != 0
    }
}
