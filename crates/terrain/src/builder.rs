//! Single-chunk mesh construction.

use heightfield_core::{ChunkCoord, TerrainConfig};
use tracing::{debug, instrument};

use crate::heightfield::HeightFieldJob;
use crate::layout::ChunkLayout;
use crate::mesh::{recalculate_normals, ChunkMeshData, ChunkMeshView};
use crate::noise::NoiseField;
use crate::pool::BufferPool;
use crate::triangulation::TriangulationJob;

/// Builds chunk meshes out of pooled scratch buffers.
///
/// Heights are sampled in parallel, then the index buffer is filled and
/// normals recomputed on the calling thread. The scratch buffers are
/// returned to the pool before `build_with` returns, whether or not the
/// consumer panics.
#[derive(Default)]
pub struct ChunkBuilder {
    pool: BufferPool,
}

impl ChunkBuilder {
    /// Create a builder with an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The scratch pool backing this builder.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Build `coord` and hand a borrowed view to `consume`.
    ///
    /// `config` must already be validated and `noise` built from it.
    #[instrument(skip(self, config, noise, consume), fields(chunk = %coord))]
    pub fn build_with<R>(
        &self,
        coord: ChunkCoord,
        config: &TerrainConfig,
        noise: &NoiseField,
        consume: impl FnOnce(ChunkMeshView<'_>) -> R,
    ) -> R {
        debug_assert!(config.validate().is_ok(), "chunk built from invalid config");

        let layout = ChunkLayout::new(config, coord);
        let mut scratch = self.pool.checkout(&layout);
        {
            let (positions, normals, indices) = scratch.parts_mut();
            HeightFieldJob::new(config, layout, noise).run(positions);
            TriangulationJob::new(&layout).run(indices);
            recalculate_normals(positions, indices, normals);
        }
        debug!(
            vertices = layout.vertex_count(),
            indices = layout.index_count(),
            "chunk mesh built"
        );

        consume(ChunkMeshView {
            coord,
            positions: scratch.positions(),
            normals: scratch.normals(),
            indices: scratch.indices(),
        })
    }

    /// Build `coord` into an owned mesh.
    pub fn build(&self, coord: ChunkCoord, config: &TerrainConfig) -> ChunkMeshData {
        let noise = NoiseField::new(config);
        self.build_with(coord, config, &noise, |view| view.to_mesh_data())
    }
}
