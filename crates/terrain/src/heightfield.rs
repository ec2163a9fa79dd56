//! Parallel height-field sampling for a chunk.

use heightfield_core::TerrainConfig;
use rayon::prelude::*;

use crate::layout::ChunkLayout;
use crate::noise::NoiseField;

/// Minimum samples handed to one rayon task.
pub const SAMPLE_BATCH: usize = 64;

/// Fills a chunk's vertex positions by sampling fBm at every grid point.
///
/// Grid indices are normalized against the whole terrain before being scaled
/// back to world units, so neighbouring chunks sample identical coordinates
/// along their shared edge.
pub struct HeightFieldJob<'a> {
    noise: &'a NoiseField,
    layout: ChunkLayout,
    width: f32,
    length: f32,
    grid_width: f32,
    grid_length: f32,
    scale: f32,
    height: f32,
}

impl<'a> HeightFieldJob<'a> {
    /// Prepare a job for `layout` under `config`.
    pub fn new(config: &TerrainConfig, layout: ChunkLayout, noise: &'a NoiseField) -> Self {
        Self {
            noise,
            layout,
            width: config.width as f32,
            length: config.length as f32,
            grid_width: (u64::from(config.width) * u64::from(config.detail)) as f32,
            grid_length: (u64::from(config.length) * u64::from(config.detail)) as f32,
            scale: config.scale,
            height: config.height,
        }
    }

    /// World-space `(x, z)` of local grid point `(x, z)`.
    #[inline]
    pub fn world_xz(&self, x: u32, z: u32) -> (f32, f32) {
        let world_x = (self.layout.start_x + x) as f32 / self.grid_width * self.width;
        let world_z = (self.layout.start_z + z) as f32 / self.grid_length * self.length;
        (world_x, world_z)
    }

    /// Height of the surface at world `(x, z)`.
    #[inline]
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let value = self.noise.evaluate(
            f64::from(world_x * self.scale),
            f64::from(world_z * self.scale),
        );
        value as f32 * self.height
    }

    /// Write one position per grid sample, in row-major order.
    ///
    /// Samples are independent; each worker writes only its own slots.
    ///
    /// # Panics
    /// Panics if `positions` is not exactly `layout.vertex_count()` long.
    pub fn run(&self, positions: &mut [[f32; 3]]) {
        assert_eq!(
            positions.len(),
            self.layout.vertex_count(),
            "vertex buffer does not match chunk layout"
        );

        positions
            .par_iter_mut()
            .enumerate()
            .with_min_len(SAMPLE_BATCH)
            .for_each(|(index, slot)| {
                let (x, z) = self.layout.local_xz(index);
                let (world_x, world_z) = self.world_xz(x, z);
                *slot = [world_x, self.height_at(world_x, world_z), world_z];
            });
    }
}
