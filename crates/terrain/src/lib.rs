#![warn(missing_docs)]
//! Chunked fBm terrain meshing.
//!
//! A [`TerrainGenerator`] splits the terrain into a grid of chunks and builds
//! each one with a [`ChunkBuilder`]: heights are sampled in parallel by a
//! [`HeightFieldJob`], indices are laid out by a [`TriangulationJob`] and
//! normals are recomputed from the result. Finished meshes go to a
//! [`RenderSink`] as borrowed views over pooled scratch buffers.

mod bounds;
mod builder;
mod generator;
mod heightfield;
mod layout;
mod mesh;
mod noise;
mod pool;
mod triangulation;

pub use self::bounds::{view_distance, Segment, TerrainBounds, VIEW_DISTANCE_MARGIN};
pub use self::builder::ChunkBuilder;
pub use self::generator::{
    CameraRig, ChunkHandle, GenerationReport, GeneratorError, MaterialId, RenderSink,
    TerrainGenerator,
};
pub use self::heightfield::{HeightFieldJob, SAMPLE_BATCH};
pub use self::layout::ChunkLayout;
pub use self::mesh::{recalculate_normals, Aabb, ChunkMeshData, ChunkMeshView, MeshHash};
pub use self::noise::NoiseField;
pub use self::pool::{BufferPool, PoolStats, PooledScratch, MAX_IDLE_BUFFERS};
pub use self::triangulation::TriangulationJob;
