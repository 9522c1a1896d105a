//! Mesh import.
//!
//! Reads the first triangulated mesh out of a model file and hands it over as
//! [`RawGeometry`]: interleaved vertices plus a triangle-list index buffer.
//! Whatever the source, the result has normals on every vertex, identical
//! vertices merged, and indices validated against the vertex count.
//!
//! # Supported Formats
//!
//! | Format | Extensions      | Notes |
//! |--------|-----------------|-------|
//! | STL    | `.stl`          | Binary and ASCII, no UV coordinates |
//! | glTF   | `.gltf`, `.glb` | First primitive of the first mesh |
//!
//! ```no_run
//! use orbitview::geometry;
//!
//! let geometry = geometry::import_first_mesh("model.glb").unwrap();
//! println!("{} vertices", geometry.vertices.len());
//! ```

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;

use crate::bounds::BoundingBox;
use crate::mesh::Vertex3d;

/// Errors that can occur when importing a mesh.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// File format could not be determined from extension.
    #[error("unknown mesh format: '{0}'")]
    UnknownFormat(String),
    /// The file was read but its contents were invalid or corrupt.
    #[error("parse error: {0}")]
    Parse(String),
    /// glTF document or buffer failure.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    /// The file contains no mesh.
    #[error("file contains no mesh")]
    NoMesh,
    /// The mesh has no vertices or no triangles.
    #[error("mesh is empty")]
    Empty,
    /// All vertices collapse to a point, or a coordinate is not finite.
    #[error("mesh has no extent (bounding box size {0})")]
    Degenerate(f32),
    /// Primitive mode that cannot be turned into triangles.
    #[error("unsupported primitive topology: {0}")]
    UnsupportedTopology(String),
    /// Index buffer length is not a whole number of triangles.
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    /// An index points past the end of the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Imported geometry before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Axis-aligned bounds of all vertex positions.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_positions(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the triangle-list invariants the renderer relies on, and that
    /// the mesh has a finite, non-zero extent to scale by.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(ImportError::Empty);
        }
        if self.indices.len() % 3 != 0 {
            return Err(ImportError::PartialTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(ImportError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        // min/max skip NaN, so non-finite positions are checked separately.
        let finite = self.vertices.iter().all(|v| Vec3::from(v.position).is_finite());
        let size = if finite { self.bounds().size() } else { f32::NAN };
        if !(size.is_finite() && size > 0.0) {
            return Err(ImportError::Degenerate(size));
        }
        Ok(())
    }

    /// Mirrors texture coordinates vertically (`v -> 1 - v`).
    ///
    /// For sources whose UV origin is the bottom-left corner.
    pub fn flip_v(&mut self) {
        for v in &mut self.vertices {
            v.uv[1] = 1.0 - v.uv[1];
        }
    }

    /// Recalculates every vertex normal from face geometry.
    pub fn recalculate_normals(&mut self) {
        let smooth = self.smooth_normals();
        for (v, n) in self.vertices.iter_mut().zip(smooth) {
            v.normal = n.into();
        }
    }

    /// Generates normals only for vertices that have none (zero length).
    /// Authored normals, including hard edges, are left alone.
    pub fn fill_missing_normals(&mut self) {
        if !self.vertices.iter().any(has_no_normal) {
            return;
        }
        let smooth = self.smooth_normals();
        for (v, n) in self.vertices.iter_mut().zip(smooth) {
            if has_no_normal(v) {
                v.normal = n.into();
            }
        }
    }

    /// Area-weighted vertex normals: face normals are accumulated
    /// unnormalized, so larger triangles weigh more in the average.
    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for i in [i0, i1, i2] {
                normals[i] += face_normal;
            }
        }

        normals.into_iter().map(Vec3::normalize_or_zero).collect()
    }

    /// Merges vertices whose position, normal and UV are bitwise identical
    /// and remaps the index buffer. First occurrence order is kept.
    pub fn join_identical_vertices(&mut self) {
        let mut seen: HashMap<[u32; 8], u32> = HashMap::with_capacity(self.vertices.len());
        let mut unique = Vec::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());

        for v in &self.vertices {
            let key: [u32; 8] = bytemuck::cast(*v);
            let index = *seen.entry(key).or_insert_with(|| {
                unique.push(*v);
                (unique.len() - 1) as u32
            });
            remap.push(index);
        }

        for i in &mut self.indices {
            *i = remap[*i as usize];
        }
        self.vertices = unique;
    }
}

/// Imports the first mesh of a file, detecting the format from its extension.
///
/// The result is validated: non-empty, whole triangles, indices in range.
pub fn import_first_mesh(path: impl AsRef<Path>) -> Result<RawGeometry, ImportError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let geometry = match ext.as_str() {
        "stl" => {
            let file = std::fs::File::open(path)?;
            let mut reader = std::io::BufReader::new(file);
            parse_stl(&mut reader)?
        }
        "gltf" | "glb" => load_gltf(path)?,
        _ => return Err(ImportError::UnknownFormat(ext)),
    };

    finish(geometry)
}

/// Imports STL geometry from raw bytes.
pub fn import_stl_bytes(bytes: &[u8]) -> Result<RawGeometry, ImportError> {
    let mut cursor = std::io::Cursor::new(bytes);
    finish(parse_stl(&mut cursor)?)
}

fn finish(mut geometry: RawGeometry) -> Result<RawGeometry, ImportError> {
    geometry.validate()?;
    geometry.fill_missing_normals();

    let before = geometry.vertices.len();
    geometry.join_identical_vertices();
    tracing::debug!(
        before,
        after = geometry.vertices.len(),
        "joined identical vertices"
    );

    Ok(geometry)
}

fn parse_stl<R: std::io::Read + std::io::Seek>(reader: &mut R) -> Result<RawGeometry, ImportError> {
    let stl = stl_io::read_stl(reader)
        .map_err(|e| ImportError::Parse(format!("STL parse error: {}", e)))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    // Faces are expanded so each keeps its facet normal; identical corners
    // are merged again afterwards.
    for face in &stl.faces {
        let normal: [f32; 3] = face.normal.into();
        for &vertex_idx in &face.vertices {
            let vertex = stl.vertices.get(vertex_idx).ok_or_else(|| {
                ImportError::Parse(format!("STL face references missing vertex {vertex_idx}"))
            })?;
            let position: [f32; 3] = (*vertex).into();
            indices.push(vertices.len() as u32);
            vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
        }
    }

    Ok(RawGeometry::new(vertices, indices))
}

fn load_gltf(path: &Path) -> Result<RawGeometry, ImportError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let mesh = document.meshes().next().ok_or(ImportError::NoMesh)?;
    let primitive = mesh.primitives().next().ok_or(ImportError::NoMesh)?;
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| ImportError::Parse("primitive has no positions".into()))?
        .collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
    // glTF already puts the UV origin at the top-left, like wgpu.
    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect());

    let raw_indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let indices = triangulate(primitive.mode(), &raw_indices)?;

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let normal = normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or([0.0, 0.0, 0.0]);
            let uv = uvs
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or([0.0, 0.0]);
            Vertex3d::new(position, normal, uv)
        })
        .collect();

    tracing::debug!(
        mesh = mesh.name().unwrap_or("<unnamed>"),
        meshes = document.meshes().count(),
        "read first glTF mesh"
    );

    Ok(RawGeometry::new(vertices, indices))
}

fn has_no_normal(v: &Vertex3d) -> bool {
    Vec3::from(v.normal).length_squared() == 0.0
}

/// Converts a glTF primitive's index stream into a triangle list.
fn triangulate(mode: gltf::mesh::Mode, indices: &[u32]) -> Result<Vec<u32>, ImportError> {
    use gltf::mesh::Mode;

    match mode {
        Mode::Triangles => Ok(indices.to_vec()),
        Mode::TriangleStrip => {
            let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
            for (i, w) in indices.windows(3).enumerate() {
                // Every other strip triangle is wound the other way.
                if i % 2 == 0 {
                    out.extend_from_slice(&[w[0], w[1], w[2]]);
                } else {
                    out.extend_from_slice(&[w[1], w[0], w[2]]);
                }
            }
            Ok(out)
        }
        Mode::TriangleFan => {
            let Some((&hub, rest)) = indices.split_first() else {
                return Ok(Vec::new());
            };
            Ok(rest
                .windows(2)
                .flat_map(|w| [hub, w[0], w[1]])
                .collect())
        }
        other => Err(ImportError::UnsupportedTopology(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD_STL: &str = "solid quad
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 1 1 0
  endloop
endfacet
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 1 0
    vertex 0 1 0
  endloop
endfacet
endsolid quad
";

    fn vertex(p: [f32; 3]) -> Vertex3d {
        Vertex3d::new(p, [0.0, 0.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn stl_quad_is_welded() {
        let geometry = import_stl_bytes(QUAD_STL.as_bytes()).unwrap();
        assert_eq!(geometry.vertices.len(), 4);
        assert_eq!(geometry.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(geometry.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));

        let bounds = geometry.bounds();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn import_detects_format_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".STL").tempfile().unwrap();
        file.write_all(QUAD_STL.as_bytes()).unwrap();

        let geometry = import_first_mesh(file.path()).unwrap();
        assert_eq!(geometry.triangle_count(), 2);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = import_first_mesh("model.fbx").unwrap_err();
        assert!(matches!(err, ImportError::UnknownFormat(ext) if ext == "fbx"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = import_first_mesh("does/not/exist.stl").unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn validation_catches_bad_index_buffers() {
        let verts = vec![vertex([0.0; 3]), vertex([1.0, 0.0, 0.0]), vertex([0.0, 1.0, 0.0])];

        assert!(matches!(
            RawGeometry::new(Vec::new(), Vec::new()).validate(),
            Err(ImportError::Empty)
        ));
        assert!(matches!(
            RawGeometry::new(verts.clone(), vec![0, 1]).validate(),
            Err(ImportError::PartialTriangle(2))
        ));
        assert!(matches!(
            RawGeometry::new(verts.clone(), vec![0, 1, 3]).validate(),
            Err(ImportError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        ));
        assert!(RawGeometry::new(verts, vec![0, 1, 2]).validate().is_ok());
    }

    #[test]
    fn validation_rejects_meshes_without_extent() {
        let point = vec![vertex([1.0; 3]), vertex([1.0; 3]), vertex([1.0; 3])];
        assert!(matches!(
            RawGeometry::new(point, vec![0, 1, 2]).validate(),
            Err(ImportError::Degenerate(size)) if size == 0.0
        ));

        let nan = vec![vertex([0.0; 3]), vertex([f32::NAN, 0.0, 0.0]), vertex([0.0, 1.0, 0.0])];
        assert!(matches!(
            RawGeometry::new(nan, vec![0, 1, 2]).validate(),
            Err(ImportError::Degenerate(_))
        ));
    }

    #[test]
    fn stl_facet_collapsed_to_a_point_is_rejected() {
        let stl = "solid point
facet normal 0 0 1
  outer loop
    vertex 1 1 1
    vertex 1 1 1
    vertex 1 1 1
  endloop
endfacet
endsolid point
";
        assert!(matches!(
            import_stl_bytes(stl.as_bytes()),
            Err(ImportError::Degenerate(_))
        ));
    }

    #[test]
    fn authored_normals_survive_filling() {
        let mut geometry = RawGeometry::new(
            vec![
                Vertex3d::new([0.0; 3], [1.0, 0.0, 0.0], [0.0, 0.0]),
                vertex([1.0, 0.0, 0.0]),
                vertex([0.0, 1.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        geometry.fill_missing_normals();

        assert_eq!(geometry.vertices[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(geometry.vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(geometry.vertices[2].normal, [0.0, 0.0, 1.0]);
    }

    // Two meshes sharing one buffer: a triangle at z = 0 (no indices, no
    // normals, no UVs) and a quad at z = 5.
    const TWO_MESH_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{
    "byteLength": 84,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAKBAAAAAQAAAAAAAAKBAAAAAQAAAAEAAAKBAAAAAAAAAAEAAAKBA"
  }],
  "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 84 }],
  "accessors": [
    { "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 4, "type": "VEC3",
      "min": [0, 0, 5], "max": [2, 2, 5] }
  ],
  "meshes": [
    { "name": "triangle", "primitives": [{ "attributes": { "POSITION": 0 } }] },
    { "name": "quad", "primitives": [{ "attributes": { "POSITION": 1 } }] }
  ]
}"#;

    #[test]
    fn gltf_import_reads_only_the_first_mesh() {
        let mut file = tempfile::Builder::new().suffix(".gltf").tempfile().unwrap();
        file.write_all(TWO_MESH_GLTF.as_bytes()).unwrap();

        let geometry = import_first_mesh(file.path()).unwrap();

        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert!(geometry.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert!(geometry.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));

        let bounds = geometry.bounds();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn normals_are_generated_when_absent() {
        let mut geometry = RawGeometry::new(
            vec![vertex([0.0; 3]), vertex([1.0, 0.0, 0.0]), vertex([0.0, 1.0, 0.0])],
            vec![0, 1, 2],
        );
        geometry.recalculate_normals();
        for v in &geometry.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn flip_v_mirrors_texture_coordinates() {
        let mut geometry = RawGeometry::new(
            vec![Vertex3d::new([0.0; 3], [0.0, 0.0, 1.0], [0.25, 0.125])],
            vec![0, 0, 0],
        );
        geometry.flip_v();
        assert_eq!(geometry.vertices[0].uv, [0.25, 0.875]);
    }

    #[test]
    fn strips_and_fans_become_triangle_lists() {
        use gltf::mesh::Mode;

        let strip = triangulate(Mode::TriangleStrip, &[0, 1, 2, 3]).unwrap();
        assert_eq!(strip, vec![0, 1, 2, 2, 1, 3]);

        let fan = triangulate(Mode::TriangleFan, &[0, 1, 2, 3]).unwrap();
        assert_eq!(fan, vec![0, 1, 2, 0, 2, 3]);

        assert!(matches!(
            triangulate(Mode::Lines, &[0, 1]),
            Err(ImportError::UnsupportedTopology(_))
        ));
    }
}
