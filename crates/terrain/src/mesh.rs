//! Chunk mesh containers and normal recomputation.

use blake3::Hasher;
use glam::Vec3;
use heightfield_core::ChunkCoord;

/// Hash of the combined vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHash(pub [u8; 32]);

impl MeshHash {
    /// Hex string suitable for metrics artifacts.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any point expands.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// True if no point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow to include `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Borrowed view of a freshly built chunk mesh.
///
/// Slices point into pooled scratch buffers and are only valid for the
/// duration of the hand-off; receivers copy whatever they keep.
#[derive(Debug, Clone, Copy)]
pub struct ChunkMeshView<'a> {
    /// Chunk the mesh belongs to.
    pub coord: ChunkCoord,
    /// World-space vertex positions, row-major over the chunk grid.
    pub positions: &'a [[f32; 3]],
    /// Unit vertex normals.
    pub normals: &'a [[f32; 3]],
    /// Triangle list indices into `positions`.
    pub indices: &'a [u32],
}

impl ChunkMeshView<'_> {
    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Stable hash of positions + indices.
    pub fn hash(&self) -> MeshHash {
        let mut hasher = Hasher::new();
        hasher.update(bytemuck::cast_slice(self.positions));
        hasher.update(bytemuck::cast_slice(self.indices));
        MeshHash(*hasher.finalize().as_bytes())
    }

    /// Bounding box of the vertex positions.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for position in self.positions {
            bounds.encapsulate(Vec3::from_array(*position));
        }
        bounds
    }

    /// Copy into an owned mesh.
    pub fn to_mesh_data(&self) -> ChunkMeshData {
        ChunkMeshData {
            coord: self.coord,
            positions: self.positions.to_vec(),
            normals: self.normals.to_vec(),
            indices: self.indices.to_vec(),
            hash: self.hash(),
        }
    }
}

/// Owned per-chunk mesh output.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMeshData {
    /// Chunk the mesh belongs to.
    pub coord: ChunkCoord,
    /// World-space vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Hash of positions + indices.
    pub hash: MeshHash,
}

impl ChunkMeshData {
    /// Borrow as a view.
    pub fn view(&self) -> ChunkMeshView<'_> {
        ChunkMeshView {
            coord: self.coord,
            positions: &self.positions,
            normals: &self.normals,
            indices: &self.indices,
        }
    }
}

/// Recompute smooth vertex normals from a triangle list.
///
/// Each face contributes its unnormalized cross product, so larger faces
/// weigh more. Vertices touched by no face (or only degenerate ones) get +Y.
///
/// # Panics
/// Panics if `normals` and `positions` differ in length or an index is out
/// of range.
pub fn recalculate_normals(positions: &[[f32; 3]], indices: &[u32], normals: &mut [[f32; 3]]) {
    assert_eq!(
        positions.len(),
        normals.len(),
        "normal buffer does not match vertex buffer"
    );

    normals.fill([0.0; 3]);
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        for vertex in [a, b, c] {
            normals[vertex] = (Vec3::from_array(normals[vertex]) + face).to_array();
        }
    }

    for normal in normals.iter_mut() {
        let n = Vec3::from_array(*normal).normalize_or_zero();
        *normal = if n == Vec3::ZERO { Vec3::Y } else { n }.to_array();
    }
}
