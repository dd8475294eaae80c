use nalgebra::Vector3;
use rayon::prelude::*;

use crate::{Aabb3d, ExtractionError, Real};

/// A triangle (surface) mesh in 3D with `u32` vertex indices
#[derive(Clone, PartialEq, Debug)]
pub struct TriMesh3d<R: Real> {
    /// Coordinates of all vertices of the mesh
    pub vertices: Vec<Vector3<R>>,
    /// The triangles of the mesh identified by their vertex indices
    pub triangles: Vec<[u32; 3]>,
}

/// The raw output of the per-cell triangulation, every triangle references three fresh vertices
pub type RawMesh<R> = TriMesh3d<R>;

/// A mesh after welding of duplicate vertices
#[derive(Clone, PartialEq, Debug)]
pub struct WeldedMesh<R: Real> {
    /// The welded mesh
    pub mesh: TriMesh3d<R>,
    /// Unit length normal per vertex, only produced by welding strategies that recompute normals
    pub normals: Option<Vec<Vector3<R>>>,
}

impl<R: Real> Default for TriMesh3d<R> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }
}

impl<R: Real> TriMesh3d<R> {
    /// Returns an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an empty mesh with preallocated storage
    pub fn with_capacity(num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            triangles: Vec::with_capacity(num_triangles),
        }
    }

    /// Returns whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the flat index buffer, three consecutive indices form a triangle
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(self.triangles.as_slice())
    }

    /// Appends a vertex and returns its index, fails if the index is not representable by `u32`
    #[inline]
    pub fn push_vertex(&mut self, vertex: Vector3<R>) -> Result<u32, ExtractionError<R>> {
        let index = u32::try_from(self.vertices.len())
            .map_err(|_| ExtractionError::IndexOverflow(self.vertices.len() + 1))?;
        self.vertices.push(vertex);
        Ok(index)
    }

    /// Appends a triangle referencing existing vertices
    #[inline]
    pub fn push_triangle(&mut self, triangle: [u32; 3]) {
        self.triangles.push(triangle);
    }

    /// Returns the vertex positions of the given triangle
    #[inline(always)]
    pub fn triangle_vertices(&self, triangle: &[u32; 3]) -> [&Vector3<R>; 3] {
        triangle.map(|i| &self.vertices[i as usize])
    }

    /// Returns the index of the first triangle that references a vertex that does not exist
    pub fn find_invalid_triangle(&self) -> Option<usize> {
        let num_vertices = self.vertices.len();
        self.triangles
            .iter()
            .position(|tri| tri.iter().any(|&i| i as usize >= num_vertices))
    }

    /// Returns the AABB of all vertices, `None` for a mesh without vertices
    pub fn aabb(&self) -> Option<Aabb3d<R>> {
        Aabb3d::from_points(&self.vertices)
    }

    /// Computes the unnormalized normal of the triangle, its length is twice the triangle area
    #[inline(always)]
    pub fn face_normal_unnormalized(&self, triangle: &[u32; 3]) -> Vector3<R> {
        let [v0, v1, v2] = self.triangle_vertices(triangle);
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Computes the unit length normal of every triangle, degenerate triangles get a zero normal
    pub fn face_normals(&self) -> Vec<Vector3<R>> {
        self.triangles
            .iter()
            .map(|tri| normalize_or_zero(self.face_normal_unnormalized(tri)))
            .collect()
    }

    /// Computes per-vertex normals by summing the unit normals of all adjacent faces and normalizing the sums
    ///
    /// Vertices that are not referenced by any non-degenerate triangle get a zero normal.
    pub fn vertex_normals(&self) -> Vec<Vector3<R>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for (tri, face_normal) in self.triangles.iter().zip(self.face_normals()) {
            for &i in tri {
                normals[i as usize] += face_normal;
            }
        }

        normals.into_iter().map(normalize_or_zero).collect()
    }

    /// Parallel version of [TriMesh3d::vertex_normals], produces bitwise identical results
    pub fn par_vertex_normals(&self) -> Vec<Vector3<R>> {
        let face_normals = self
            .triangles
            .par_iter()
            .map(|tri| normalize_or_zero(self.face_normal_unnormalized(tri)))
            .collect::<Vec<_>>();

        // Accumulate in triangle order per vertex to keep the summation order of the sequential version
        let mut vertex_faces = vec![Vec::new(); self.vertices.len()];
        for (face, tri) in self.triangles.iter().enumerate() {
            for &i in tri {
                vertex_faces[i as usize].push(face);
            }
        }

        vertex_faces
            .par_iter()
            .map(|faces| {
                let sum = faces
                    .iter()
                    .fold(Vector3::zeros(), |acc, &f| acc + face_normals[f]);
                normalize_or_zero(sum)
            })
            .collect()
    }
}

#[inline(always)]
fn normalize_or_zero<R: Real>(v: Vector3<R>) -> Vector3<R> {
    v.try_normalize(R::default_epsilon()).unwrap_or_else(Vector3::zeros)
}
