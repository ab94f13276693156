//! Model geometry loading.
//!
//! This module parses model files into CPU-side [`RawGeometry`] before GPU
//! upload. The viewer's asset is glTF; STL is also accepted since it costs
//! one extra match arm on the extension dispatch.
//!
//! glTF files are imported with the scene-graph rule the viewer wants: only
//! the FIRST child node of the parsed scene is kept (its own subtree
//! included, with node transforms baked into the vertices). Sibling nodes
//! are discarded.

use glam::{Mat4, Vec3};
use std::path::Path;

use crate::mesh::Vertex3d;

/// Errors that can occur when loading geometry.
#[derive(Debug)]
pub enum GeometryError {
    /// File could not be read.
    Io(std::io::Error),
    /// File format could not be determined from extension.
    UnknownFormat(String),
    /// The geometry data was invalid or corrupt.
    Parse(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Io(e) => write!(f, "IO error: {}", e),
            GeometryError::UnknownFormat(ext) => {
                write!(f, "Unknown geometry format: '{}'", ext)
            }
            GeometryError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeometryError {
    fn from(e: std::io::Error) -> Self {
        GeometryError::Io(e)
    }
}

impl From<gltf::Error> for GeometryError {
    fn from(e: gltf::Error) -> Self {
        match e {
            gltf::Error::Io(io) => GeometryError::Io(io),
            other => GeometryError::Parse(other.to_string()),
        }
    }
}

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Bake a node transform into the vertex data.
    ///
    /// Positions go through the full matrix; normals through the inverse
    /// transpose and are renormalized.
    pub fn apply_transform(&mut self, matrix: Mat4) {
        let normal_matrix = matrix.inverse().transpose();
        for v in &mut self.vertices {
            let p = matrix.transform_point3(Vec3::from(v.position));
            v.position = p.into();

            let n = normal_matrix.transform_vector3(Vec3::from(v.normal));
            v.normal = n.normalize_or_zero().into();
        }
    }

    /// Recalculate smooth vertex normals by averaging area-weighted face
    /// normals at each vertex. Used when a source file carries none.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);

            let face_normal = (p1 - p0).cross(p2 - p0);

            for &i in &[i0, i1, i2] {
                self.vertices[i].normal[0] += face_normal.x;
                self.vertices[i].normal[1] += face_normal.y;
                self.vertices[i].normal[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            let n = Vec3::from(v.normal);
            v.normal = n.normalize_or_zero().into();
        }
    }
}

/// One renderable chunk of a loaded model: geometry plus its material's
/// base color.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub geometry: RawGeometry,
    pub base_color: [f32; 4],
}

const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Load a model file, dispatching on its extension.
///
/// Supports `.gltf`/`.glb` (first-child-node rule, see module docs) and
/// `.stl` (one untransformed primitive).
pub fn load_model(path: &Path) -> Result<Vec<Primitive>, GeometryError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "gltf" | "glb" => load_gltf(path),
        "stl" => load_stl(path),
        _ => Err(GeometryError::UnknownFormat(ext)),
    }
}

/// Import a glTF file and keep only the first child of its scene.
fn load_gltf(path: &Path) -> Result<Vec<Primitive>, GeometryError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| GeometryError::Parse("glTF file contains no scene".into()))?;

    let first_child = scene
        .nodes()
        .next()
        .ok_or_else(|| GeometryError::Parse("glTF scene has no nodes".into()))?;

    let mut primitives = Vec::new();
    collect_node(&first_child, Mat4::IDENTITY, &buffers, &mut primitives)?;

    if primitives.is_empty() {
        return Err(GeometryError::Parse(
            "glTF node carries no triangle geometry".into(),
        ));
    }

    Ok(primitives)
}

/// Walk a node subtree, baking accumulated transforms into each primitive.
fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<Primitive>,
) -> Result<(), GeometryError> {
    let matrix = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }

            let reader = prim.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| GeometryError::Parse("primitive has no positions".into()))?
                .collect();

            let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|it| it.collect());
            let uvs: Option<Vec<[f32; 2]>> =
                reader.read_tex_coords(0).map(|it| it.into_f32().collect());

            let vertices: Vec<Vertex3d> = positions
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let n = normals
                        .as_ref()
                        .and_then(|ns| ns.get(i).copied())
                        .unwrap_or([0.0, 0.0, 0.0]);
                    let uv = uvs
                        .as_ref()
                        .and_then(|uvs| uvs.get(i).copied())
                        .unwrap_or([0.0, 0.0]);
                    Vertex3d::new(p, n, uv)
                })
                .collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(idx) => idx.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            let mut geometry = RawGeometry::new(vertices, indices);
            if normals.is_none() {
                geometry.recalculate_normals();
            }
            geometry.apply_transform(matrix);

            let base_color = prim
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            out.push(Primitive {
                geometry,
                base_color,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, matrix, buffers, out)?;
    }

    Ok(())
}

/// Load an STL file as a single grey primitive.
fn load_stl(path: &Path) -> Result<Vec<Primitive>, GeometryError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let geometry = parse_stl(&mut reader)?;
    Ok(vec![Primitive {
        geometry,
        base_color: DEFAULT_BASE_COLOR,
    }])
}

/// Parse STL data (binary or ASCII) into raw geometry.
pub fn parse_stl<R: std::io::Read + std::io::Seek>(
    reader: &mut R,
) -> Result<RawGeometry, GeometryError> {
    let stl = stl_io::read_stl(reader)
        .map_err(|e| GeometryError::Parse(format!("STL parse error: {}", e)))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    // stl_io returns an IndexedMesh: a vertex list plus indexed triangles,
    // each face carrying one flat normal.
    for (i, face) in stl.faces.iter().enumerate() {
        let normal: [f32; 3] = face.normal.into();

        for &vertex_idx in &face.vertices {
            let vertex = &stl.vertices[vertex_idx];
            let position: [f32; 3] = (*vertex).into();
            vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
        }

        let base = (i * 3) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    Ok(RawGeometry::new(vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn raw_geometry_bounds() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = RawGeometry::new(vertices, vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn apply_transform_moves_positions_and_keeps_normals_unit() {
        let vertices = vec![Vertex3d::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0])];
        let mut geom = RawGeometry::new(vertices, vec![0, 0, 0]);

        geom.apply_transform(
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)) * Mat4::from_scale(Vec3::splat(3.0)),
        );

        let p = Vec3::from(geom.vertices[0].position);
        assert!((p - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);

        let n = Vec3::from(geom.vertices[0].normal);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!((n - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn recalculated_normals_face_up_for_flat_triangle() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
        ];
        let mut geom = RawGeometry::new(vertices, vec![0, 1, 2]);
        geom.recalculate_normals();

        for v in &geom.vertices {
            let n = Vec3::from(v.normal);
            assert!((n - Vec3::Y).length() < 1e-5);
        }
    }

    /// Build a one-triangle binary STL in memory.
    fn tiny_stl() -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&1u32.to_le_bytes());
        // Normal, then three vertices.
        for f in [
            0.0f32, 0.0, 1.0, // normal
            0.0, 0.0, 0.0, // v0
            1.0, 0.0, 0.0, // v1
            0.0, 1.0, 0.0, // v2
        ] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        data.extend_from_slice(&0u16.to_le_bytes());
        data
    }

    #[test]
    fn parse_binary_stl_triangle() {
        let bytes = tiny_stl();
        let geom = parse_stl(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.indices, vec![0, 1, 2]);
        for v in &geom.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_model(Path::new("model.obj")).unwrap_err();
        match err {
            GeometryError::UnknownFormat(ext) => assert_eq!(ext, "obj"),
            other => panic!("expected UnknownFormat, got {other}"),
        }
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = load_model(Path::new("does/not/exist.gltf")).unwrap_err();
        assert!(matches!(err, GeometryError::Io(_)));
    }
}
