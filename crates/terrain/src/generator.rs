//! Whole-terrain generation and the collaborator seams it talks to.
//!
//! [`TerrainGenerator`] owns the chunk grid for one [`TerrainConfig`]. Chunk
//! meshes are handed to a [`RenderSink`] as borrowed views and only the
//! returned [`ChunkHandle`]s are retained. A generator is driven from a single
//! thread; `generate`, `clear` and `regenerate` take `&mut self`.

use std::time::{Duration, Instant};

use glam::Vec3;
use heightfield_core::{ConfigError, TerrainConfig};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::bounds::{view_distance, Segment, TerrainBounds};
use crate::builder::ChunkBuilder;
use crate::mesh::{Aabb, ChunkMeshView};
use crate::noise::NoiseField;

/// Framing box before any chunk exists; chunk bounds are unioned into it.
const ORIGIN_BOUNDS: Aabb = Aabb {
    min: Vec3::ZERO,
    max: Vec3::ZERO,
};

/// Opaque reference to a chunk owned by the render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkHandle(pub u64);

/// Opaque material reference passed through to the render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Receives chunk meshes and debug geometry.
pub trait RenderSink {
    /// Take ownership of a copy of `mesh` and return a handle for it.
    ///
    /// `mesh` borrows pooled buffers that are reused once this returns.
    fn spawn_chunk(&mut self, mesh: ChunkMeshView<'_>, material: MaterialId) -> ChunkHandle;

    /// Tear down a chunk previously returned by `spawn_chunk`.
    fn destroy_chunk(&mut self, handle: ChunkHandle);

    /// Draw the terrain wire box for the current frame.
    fn draw_boundary(&mut self, edges: &[Segment; 12]);
}

/// Camera that frames the terrain.
pub trait CameraRig {
    /// Point the camera at `target`.
    fn follow(&mut self, target: Vec3);

    /// Set the orbit distance from the target.
    fn set_distance(&mut self, distance: f32);
}

/// Errors surfaced by [`TerrainGenerator`].
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The requested configuration violates an invariant.
    #[error("invalid terrain config: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// No material was bound before generating.
    #[error("no terrain material bound")]
    MissingMaterial,
    /// No camera was bound before framing the terrain.
    #[error("no camera rig bound")]
    MissingCamera,
}

/// Summary of one generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// Chunks emitted.
    pub chunks: usize,
    /// Vertices across all chunks, seam duplicates included.
    pub vertices: usize,
    /// Triangles across all chunks.
    pub triangles: usize,
    /// Union of every chunk's vertex bounds.
    pub mesh_bounds: Aabb,
    /// Wall-clock time spent building and handing off chunks.
    pub elapsed: Duration,
}

/// Owns the chunk grid and drives generation.
pub struct TerrainGenerator<R: RenderSink> {
    config: TerrainConfig,
    renderer: R,
    camera: Option<Box<dyn CameraRig>>,
    material: Option<MaterialId>,
    builder: ChunkBuilder,
    chunks: Vec<ChunkHandle>,
    framing: Aabb,
    show_boundary: bool,
}

impl<R: RenderSink> TerrainGenerator<R> {
    /// Create a generator with no chunks, rejecting an invalid `config`.
    pub fn new(config: TerrainConfig, renderer: R) -> Result<Self, GeneratorError> {
        Ok(Self {
            config: config.validated()?,
            renderer,
            camera: None,
            material: None,
            builder: ChunkBuilder::new(),
            chunks: Vec::new(),
            framing: ORIGIN_BOUNDS,
            show_boundary: true,
        })
    }

    /// Bind the material every chunk is spawned with.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Swap the material used by the next generation pass.
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = Some(material);
    }

    /// Bind the camera that `update_size` frames.
    pub fn with_camera(mut self, camera: impl CameraRig + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The render sink.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the render sink.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Chunk builder, exposed for pool statistics.
    pub fn builder(&self) -> &ChunkBuilder {
        &self.builder
    }

    /// Handles of every live chunk, in generation order.
    pub fn chunk_handles(&self) -> &[ChunkHandle] {
        &self.chunks
    }

    /// Number of live chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Nominal terrain box for the active configuration.
    pub fn bounds(&self) -> TerrainBounds {
        TerrainBounds::from_config(&self.config)
    }

    /// Box the camera frames: every live chunk's mesh bounds plus the origin.
    pub fn framing_bounds(&self) -> Aabb {
        self.framing
    }

    /// Whether `tick` draws the wire box.
    pub fn boundary_visible(&self) -> bool {
        self.show_boundary
    }

    /// Show or hide the wire box.
    pub fn set_boundary_visible(&mut self, visible: bool) {
        self.show_boundary = visible;
    }

    /// First-frame setup: generate the terrain and frame it.
    ///
    /// Both collaborators are checked up front so a failure leaves no chunks.
    pub fn initialize(&mut self) -> Result<GenerationReport, GeneratorError> {
        if self.camera.is_none() {
            return Err(GeneratorError::MissingCamera);
        }
        let report = self.generate()?;
        self.update_size()?;
        Ok(report)
    }

    /// Per-frame work: submit the boundary wire box if it is visible.
    pub fn tick(&mut self) {
        if !self.show_boundary {
            return;
        }
        let edges = self.bounds().edges();
        self.renderer.draw_boundary(&edges);
    }

    /// Point the camera at the center of the generated meshes at a distance
    /// that frames the nominal extent.
    pub fn update_size(&mut self) -> Result<(), GeneratorError> {
        let center = self.framing.center();
        let distance = view_distance(&self.config);
        let camera = self.camera.as_mut().ok_or(GeneratorError::MissingCamera)?;
        camera.follow(center);
        camera.set_distance(distance);
        debug!(?center, distance, "camera framed terrain");
        Ok(())
    }

    /// Replace any existing chunks with a full chunk grid for the active config.
    #[instrument(skip(self), fields(chunks = self.config.chunk_count()))]
    pub fn generate(&mut self) -> Result<GenerationReport, GeneratorError> {
        let material = self.material()?;
        self.clear();

        let started = Instant::now();
        let Self {
            config,
            renderer,
            builder,
            chunks,
            ..
        } = self;
        let noise = NoiseField::new(config);
        let mut report = GenerationReport {
            chunks: 0,
            vertices: 0,
            triangles: 0,
            mesh_bounds: Aabb::EMPTY,
            elapsed: Duration::ZERO,
        };

        chunks.reserve(config.chunk_count());
        for coord in config.chunk_coords() {
            let handle = builder.build_with(coord, config, &noise, |view| {
                report.vertices += view.positions.len();
                report.triangles += view.triangle_count();
                report.mesh_bounds = report.mesh_bounds.union(view.bounds());
                renderer.spawn_chunk(view, material)
            });
            chunks.push(handle);
        }

        report.chunks = chunks.len();
        report.elapsed = started.elapsed();
        self.framing = report.mesh_bounds.union(ORIGIN_BOUNDS);
        info!(
            chunks = report.chunks,
            vertices = report.vertices,
            triangles = report.triangles,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "terrain generated"
        );
        Ok(report)
    }

    /// Destroy every live chunk.
    pub fn clear(&mut self) {
        if self.chunks.is_empty() {
            return;
        }
        let count = self.chunks.len();
        for handle in self.chunks.drain(..) {
            self.renderer.destroy_chunk(handle);
        }
        self.framing = ORIGIN_BOUNDS;
        debug!(count, "terrain cleared");
    }

    /// Swap in `config` and rebuild the whole terrain.
    ///
    /// Every check runs before the old chunks are destroyed, so on error the
    /// previous terrain and configuration stay in place.
    pub fn regenerate(&mut self, config: TerrainConfig) -> Result<GenerationReport, GeneratorError> {
        let config = config.validated()?;
        self.material()?;
        self.config = config;
        self.generate()
    }

    fn material(&self) -> Result<MaterialId, GeneratorError> {
        self.material.ok_or(GeneratorError::MissingMaterial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    #[derive(Default)]
    struct MockSink {
        next: u64,
        live: BTreeSet<u64>,
        spawned: Vec<(heightfield_core::ChunkCoord, usize, MaterialId)>,
        boundaries: Vec<[Segment; 12]>,
    }

    impl RenderSink for MockSink {
        fn spawn_chunk(&mut self, mesh: ChunkMeshView<'_>, material: MaterialId) -> ChunkHandle {
            self.next += 1;
            self.live.insert(self.next);
            self.spawned.push((mesh.coord, mesh.positions.len(), material));
            ChunkHandle(self.next)
        }

        fn destroy_chunk(&mut self, handle: ChunkHandle) {
            assert!(self.live.remove(&handle.0), "double destroy of {handle:?}");
        }

        fn draw_boundary(&mut self, edges: &[Segment; 12]) {
            self.boundaries.push(*edges);
        }
    }

    #[derive(Clone, Default)]
    struct SharedCamera(Rc<RefCell<Vec<(Vec3, f32)>>>);

    impl CameraRig for SharedCamera {
        fn follow(&mut self, target: Vec3) {
            self.0.borrow_mut().push((target, f32::NAN));
        }

        fn set_distance(&mut self, distance: f32) {
            if let Some(last) = self.0.borrow_mut().last_mut() {
                last.1 = distance;
            }
        }
    }

    fn config() -> TerrainConfig {
        TerrainConfig {
            width: 20,
            length: 20,
            chunk_size: 10,
            detail: 1,
            ..Default::default()
        }
    }

    fn generator() -> TerrainGenerator<MockSink> {
        TerrainGenerator::new(config(), MockSink::default())
            .map(|g| g.with_material(MaterialId(7)))
            .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let bad = TerrainConfig {
            chunk_size: 0,
            ..config()
        };
        let err = TerrainGenerator::new(bad, MockSink::default()).err().unwrap();
        assert!(matches!(
            err,
            GeneratorError::InvalidConfig(ConfigError::NonPositive { field: "chunk_size" })
        ));
    }

    #[test]
    fn generate_emits_full_grid_in_order() {
        let mut generator = generator();
        let report = generator.generate().unwrap();

        assert_eq!(report.chunks, 4);
        assert_eq!(report.vertices, 4 * 121);
        assert_eq!(report.triangles, 4 * 200);
        assert_eq!(generator.chunk_count(), 4);

        let coords: Vec<_> = generator
            .renderer()
            .spawned
            .iter()
            .map(|(coord, _, _)| (coord.x, coord.z))
            .collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(generator
            .renderer()
            .spawned
            .iter()
            .all(|(_, _, material)| *material == MaterialId(7)));
    }

    #[test]
    fn mesh_bounds_span_the_grid() {
        let mut generator = generator();
        let report = generator.generate().unwrap();
        assert_eq!(report.mesh_bounds.min.x, 0.0);
        assert_eq!(report.mesh_bounds.min.z, 0.0);
        assert_eq!(report.mesh_bounds.max.x, 20.0);
        assert_eq!(report.mesh_bounds.max.z, 20.0);
        assert!(report.mesh_bounds.min.y < report.mesh_bounds.max.y);
    }

    #[test]
    fn generate_twice_does_not_leak_handles() {
        let mut generator = generator();
        generator.generate().unwrap();
        generator.generate().unwrap();
        assert_eq!(generator.renderer().live.len(), 4);
        assert_eq!(generator.chunk_count(), 4);
    }

    #[test]
    fn clear_destroys_every_chunk() {
        let mut generator = generator();
        generator.generate().unwrap();
        generator.clear();
        assert!(generator.renderer().live.is_empty());
        assert!(generator.chunk_handles().is_empty());
    }

    #[test]
    fn missing_material_is_reported_before_clearing() {
        let mut generator = TerrainGenerator::new(config(), MockSink::default()).unwrap();
        assert!(matches!(
            generator.generate(),
            Err(GeneratorError::MissingMaterial)
        ));
        assert!(generator.renderer().spawned.is_empty());
    }

    #[test]
    fn regenerate_swaps_grid() {
        let mut generator = generator();
        generator.generate().unwrap();
        let next = TerrainConfig {
            width: 35,
            length: 10,
            ..config()
        };
        let report = generator.regenerate(next.clone()).unwrap();
        assert_eq!(report.chunks, 4);
        assert_eq!(generator.config(), &next);
        assert_eq!(generator.renderer().live.len(), 4);
    }

    #[test]
    fn failed_regenerate_keeps_old_terrain() {
        let mut generator = generator();
        generator.generate().unwrap();
        let before: Vec<_> = generator.chunk_handles().to_vec();

        let bad = TerrainConfig {
            octaves: 0,
            ..config()
        };
        assert!(generator.regenerate(bad).is_err());
        assert_eq!(generator.chunk_handles(), before.as_slice());
        assert_eq!(generator.config(), &config());
        assert_eq!(generator.renderer().live.len(), 4);
    }

    #[test]
    fn initialize_frames_camera() {
        let camera = SharedCamera::default();
        let mut generator = generator().with_camera(camera.clone());
        let report = generator.initialize().unwrap();

        let framing = generator.framing_bounds();
        assert_eq!(framing.min.x, 0.0);
        assert_eq!(framing.max.x, 20.0);
        assert_eq!(framing.min.y, report.mesh_bounds.min.y.min(0.0));
        assert_eq!(framing.max.y, report.mesh_bounds.max.y.max(0.0));

        let calls = camera.0.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, framing.center());
        assert_eq!(calls[0].0.x, 10.0);
        assert_eq!(calls[0].0.z, 10.0);
        assert_eq!(calls[0].1, 35.0);
    }

    #[test]
    fn camera_frames_overshooting_chunks() {
        let camera = SharedCamera::default();
        let mut generator = TerrainGenerator::new(TerrainConfig::default(), MockSink::default())
            .unwrap()
            .with_material(MaterialId(0))
            .with_camera(camera.clone());
        generator.initialize().unwrap();

        // 25x25 in 10-unit chunks spans 30 units per side.
        let target = camera.0.borrow()[0].0;
        assert!((target.x - 15.0).abs() < 1e-4, "target {target}");
        assert!((target.z - 15.0).abs() < 1e-4, "target {target}");
        assert_ne!(target, generator.bounds().center());
    }

    #[test]
    fn framing_resets_when_cleared() {
        let mut generator = generator();
        generator.generate().unwrap();
        assert_eq!(generator.framing_bounds().max.x, 20.0);
        generator.clear();
        assert_eq!(generator.framing_bounds(), ORIGIN_BOUNDS);
    }

    #[test]
    fn initialize_without_camera_generates_nothing() {
        let mut generator = generator();
        assert!(matches!(
            generator.initialize(),
            Err(GeneratorError::MissingCamera)
        ));
        assert_eq!(generator.chunk_count(), 0);
    }

    #[test]
    fn hidden_boundary_is_not_drawn() {
        let mut generator = generator();
        assert!(generator.boundary_visible());
        generator.set_boundary_visible(false);
        generator.tick();
        assert!(generator.renderer().boundaries.is_empty());

        generator.set_boundary_visible(true);
        generator.tick();
        assert_eq!(generator.renderer().boundaries.len(), 1);
    }

    #[test]
    fn tick_draws_current_boundary() {
        let mut generator = generator();
        generator.tick();
        generator
            .regenerate(TerrainConfig {
                width: 40,
                ..config()
            })
            .unwrap();
        generator.tick();

        let boundaries = &generator.renderer().boundaries;
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0][0].end.x, 20.0);
        assert_eq!(boundaries[1][0].end.x, 40.0);
    }
}
