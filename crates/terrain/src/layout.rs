//! Per-chunk grid geometry derived from a config and chunk coordinate.

use heightfield_core::{ChunkCoord, TerrainConfig};

/// Grid dimensions and global sample offset for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    /// Chunk this layout describes.
    pub coord: ChunkCoord,
    /// Global grid column of the chunk's first vertex.
    pub start_x: u32,
    /// Global grid row of the chunk's first vertex.
    pub start_z: u32,
    /// Cells along one side (`chunk_size * detail`).
    pub cells: u32,
    /// Vertices along one side (`cells + 1`).
    pub vertices_per_side: u32,
}

impl ChunkLayout {
    /// Compute the layout of `coord` under `config`.
    pub fn new(config: &TerrainConfig, coord: ChunkCoord) -> Self {
        let cells = config.chunk_cells();
        Self {
            coord,
            start_x: coord.x * cells,
            start_z: coord.z * cells,
            cells,
            vertices_per_side: cells + 1,
        }
    }

    /// Vertex buffer length.
    pub fn vertex_count(&self) -> usize {
        let side = self.vertices_per_side as usize;
        side * side
    }

    /// Index buffer length.
    pub fn index_count(&self) -> usize {
        let cells = self.cells as usize;
        cells * cells * 6
    }

    /// Local `(x, z)` grid position of a vertex slot.
    #[inline]
    pub fn local_xz(&self, index: usize) -> (u32, u32) {
        let side = self.vertices_per_side as usize;
        ((index % side) as u32, (index / side) as u32)
    }
}
