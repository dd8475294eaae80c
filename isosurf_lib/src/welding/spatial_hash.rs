use anyhow::Context;
use log::{trace, warn};
use nalgebra::Vector3;

use crate::mesh::{RawMesh, TriMesh3d};
use crate::{Aabb3d, ExtractionError, MapType, Real, SpatialHashParameters, new_map, profile};

/// Result of the spatial hash welding
#[derive(Clone, Debug)]
pub struct SpatialHashWelding<R: Real> {
    /// The mesh with merged vertices
    pub mesh: TriMesh3d<R>,
    /// Unit length vertex normals recomputed from the welded triangles
    pub normals: Vec<Vector3<R>>,
    /// New index of every raw vertex
    pub vertex_map: Vec<u32>,
}

/// Merges vertices of the raw mesh that are closer than the threshold of the parameters
///
/// Vertices are sorted into cubic buckets of edge length `bucket_step` starting at the min
/// corner of the AABB of all vertices. Every vertex is only compared against the vertices that
/// were already kept in its own bucket, the first one with a squared distance strictly below
/// `threshold` is reused. Otherwise the vertex is kept and gets the next new index.
/// Vertices that are close but fall into neighboring buckets are not merged.
///
/// Fails with [ExtractionError::InvalidTriangle] if a triangle of the raw mesh references a
/// vertex that does not exist.
pub fn weld_by_spatial_hash<R: Real>(
    raw_mesh: &RawMesh<R>,
    parameters: &SpatialHashParameters<R>,
) -> Result<SpatialHashWelding<R>, ExtractionError<R>> {
    profile!("weld_by_spatial_hash");
    parameters.validate()?;

    if let Some(triangle) = raw_mesh.find_invalid_triangle() {
        return Err(ExtractionError::InvalidTriangle(triangle));
    }

    if !parameters.bucket_covers_threshold() {
        warn!(
            "Bucket step {} does not cover the welding threshold {} (squared distance), vertices in neighboring buckets will not be merged",
            parameters.bucket_step, parameters.threshold
        );
    }

    let Some(aabb) = Aabb3d::par_from_points(&raw_mesh.vertices) else {
        return Ok(SpatialHashWelding {
            mesh: TriMesh3d::new(),
            normals: Vec::new(),
            vertex_map: Vec::new(),
        });
    };

    let mut buckets: MapType<[i64; 3], Vec<u32>> = new_map();
    let mut mesh = TriMesh3d::with_capacity(raw_mesh.vertices.len() / 4, raw_mesh.triangles.len());
    let mut vertex_map = Vec::with_capacity(raw_mesh.vertices.len());

    for vertex in &raw_mesh.vertices {
        let key = bucket_key(aabb.min(), parameters.bucket_step, vertex)?;
        let bucket = buckets.entry(key).or_default();

        let existing = bucket.iter().copied().find(|&kept| {
            (mesh.vertices[kept as usize] - vertex).norm_squared() < parameters.threshold
        });

        let new_index = match existing {
            Some(kept) => kept,
            None => {
                let kept = mesh.push_vertex(*vertex)?;
                bucket.push(kept);
                kept
            }
        };
        vertex_map.push(new_index);
    }

    for triangle in &raw_mesh.triangles {
        let remapped = triangle.map(|i| vertex_map[i as usize]);
        mesh.push_triangle(remapped);
    }

    trace!(
        "Spatial hash welding merged {} raw vertices into {} vertices using {} buckets",
        raw_mesh.vertices.len(),
        mesh.vertices.len(),
        buckets.len()
    );

    let normals = mesh.par_vertex_normals();
    Ok(SpatialHashWelding {
        mesh,
        normals,
        vertex_map,
    })
}

/// Integer coordinates of the bucket containing the vertex
#[inline(always)]
fn bucket_key<R: Real>(
    min: &Vector3<R>,
    bucket_step: R,
    vertex: &Vector3<R>,
) -> Result<[i64; 3], anyhow::Error> {
    let relative = (vertex - min) / bucket_step;
    let to_bucket = |c: R| {
        c.floor()
            .to_i64()
            .with_context(|| format!("Bucket coordinate {} cannot be represented by i64", c))
    };
    Ok([
        to_bucket(relative.x)?,
        to_bucket(relative.y)?,
        to_bucket(relative.z)?,
    ])
}
