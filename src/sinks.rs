//! Headless collaborators for the terrain generator.

use std::collections::BTreeMap;

use glam::Vec3;
use heightfield_terrain::{
    CameraRig, ChunkHandle, ChunkMeshData, ChunkMeshView, MaterialId, RenderSink, Segment,
};
use heightfield_testkit::ChunkMeshMetric;
use tracing::{debug, info};

/// Render sink that keeps every live chunk in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_handle: u64,
    chunks: BTreeMap<u64, ChunkMeshData>,
    boundary_draws: u64,
    destroyed: u64,
}

impl RecordingRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live chunks.
    pub fn live_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks destroyed so far.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    /// Frames that drew the wire box.
    pub fn boundary_draws(&self) -> u64 {
        self.boundary_draws
    }

    /// Per-chunk metrics for the live terrain, sorted by chunk coordinate.
    pub fn mesh_metrics(&self) -> Vec<ChunkMeshMetric> {
        let mut metrics: Vec<_> = self
            .chunks
            .values()
            .map(|mesh| {
                ChunkMeshMetric::new(
                    mesh.coord,
                    mesh.positions.len(),
                    mesh.indices.len() / 3,
                    mesh.hash.to_hex(),
                )
            })
            .collect();
        metrics.sort_by_key(|metric| metric.chunk);
        metrics
    }
}

impl RenderSink for RecordingRenderer {
    fn spawn_chunk(&mut self, mesh: ChunkMeshView<'_>, material: MaterialId) -> ChunkHandle {
        self.next_handle += 1;
        debug!(
            handle = self.next_handle,
            chunk = %mesh.coord,
            material = material.0,
            "chunk spawned"
        );
        self.chunks.insert(self.next_handle, mesh.to_mesh_data());
        ChunkHandle(self.next_handle)
    }

    fn destroy_chunk(&mut self, handle: ChunkHandle) {
        if self.chunks.remove(&handle.0).is_some() {
            self.destroyed += 1;
        } else {
            debug!(?handle, "destroy of unknown chunk ignored");
        }
    }

    fn draw_boundary(&mut self, edges: &[Segment; 12]) {
        if self.boundary_draws == 0 {
            debug!(min = ?edges[0].start, max = ?edges[5].end, "boundary drawn");
        }
        self.boundary_draws += 1;
    }
}

/// Camera rig that only logs where it would look.
#[derive(Debug, Default)]
pub struct LoggingCamera {
    target: Vec3,
}

impl CameraRig for LoggingCamera {
    fn follow(&mut self, target: Vec3) {
        self.target = target;
    }

    fn set_distance(&mut self, distance: f32) {
        info!(center = ?self.target, distance, "camera framed terrain");
    }
}
