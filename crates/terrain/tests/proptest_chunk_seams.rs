//! Property-based tests for chunk meshes
//!
//! Validates, for arbitrary terrain parameters:
//! - Chunk builds are bit-for-bit deterministic
//! - Adjacent chunks agree on their shared edge
//! - Buffer lengths follow the chunk resolution
//! - fBm never leaves the range of its octave samples

use heightfield_core::{ChunkCoord, NoiseKind, TerrainConfig};
use heightfield_terrain::{ChunkBuilder, ChunkMeshData, NoiseField};
use proptest::prelude::*;

/// Maximum allowed difference between shared edge vertices.
const MAX_SEAM_DIFF: f32 = 1e-4;

fn noise_kind() -> impl Strategy<Value = NoiseKind> {
    prop_oneof![Just(NoiseKind::Simplex), Just(NoiseKind::Perlin)]
}

prop_compose! {
    fn terrain_config()(
        width in 1u32..64,
        length in 1u32..64,
        chunk_size in 1u32..12,
        detail in 1u32..4,
        octaves in 1u32..8,
        persistence in 0.0f32..=1.0,
        lacunarity in 0.0f32..4.0,
        height in 0.0f32..50.0,
        scale in 0.01f32..1.0,
        seed in any::<u32>(),
        noise in noise_kind(),
    ) -> TerrainConfig {
        TerrainConfig {
            width,
            length,
            height,
            scale,
            octaves,
            lacunarity,
            persistence,
            detail,
            chunk_size,
            seed,
            noise,
        }
    }
}

fn vertex(mesh: &ChunkMeshData, side: usize, x: usize, z: usize) -> [f32; 3] {
    mesh.positions[z * side + x]
}

fn max_diff(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: building the same chunk twice yields identical buffers
    #[test]
    fn chunk_build_determinism(
        config in terrain_config(),
        cx in 0u32..4,
        cz in 0u32..4,
    ) {
        let coord = ChunkCoord::new(cx, cz);
        let first = ChunkBuilder::new().build(coord, &config);
        let second = ChunkBuilder::new().build(coord, &config);

        prop_assert_eq!(first.hash, second.hash);
        prop_assert_eq!(&first.positions, &second.positions);
        prop_assert_eq!(&first.indices, &second.indices);
    }

    /// Property: the last column of a chunk matches the first column of its +X neighbour
    #[test]
    fn chunk_x_seam_continuity(
        config in terrain_config(),
        cx in 0u32..4,
        cz in 0u32..4,
    ) {
        let builder = ChunkBuilder::new();
        let left = builder.build(ChunkCoord::new(cx, cz), &config);
        let right = builder.build(ChunkCoord::new(cx + 1, cz), &config);
        let side = config.chunk_vertices_per_side() as usize;

        for z in 0..side {
            let a = vertex(&left, side, side - 1, z);
            let b = vertex(&right, side, 0, z);
            let diff = max_diff(a, b);
            prop_assert!(
                diff <= MAX_SEAM_DIFF,
                "X-seam discontinuity at chunk ({}, {}) z={}: {:?} vs {:?}",
                cx, cz, z, a, b
            );
        }
    }

    /// Property: the last row of a chunk matches the first row of its +Z neighbour
    #[test]
    fn chunk_z_seam_continuity(
        config in terrain_config(),
        cx in 0u32..4,
        cz in 0u32..4,
    ) {
        let builder = ChunkBuilder::new();
        let near = builder.build(ChunkCoord::new(cx, cz), &config);
        let far = builder.build(ChunkCoord::new(cx, cz + 1), &config);
        let side = config.chunk_vertices_per_side() as usize;

        for x in 0..side {
            let a = vertex(&near, side, x, side - 1);
            let b = vertex(&far, side, x, 0);
            let diff = max_diff(a, b);
            prop_assert!(
                diff <= MAX_SEAM_DIFF,
                "Z-seam discontinuity at chunk ({}, {}) x={}: {:?} vs {:?}",
                cx, cz, x, a, b
            );
        }
    }

    /// Property: buffer lengths are `(s·d + 1)²` vertices and `s·d·s·d·6` indices
    #[test]
    fn chunk_buffer_lengths(
        chunk_size in 1u32..24,
        detail in 1u32..5,
    ) {
        let config = TerrainConfig {
            chunk_size,
            detail,
            ..Default::default()
        };
        let mesh = ChunkBuilder::new().build(ChunkCoord::new(0, 0), &config);
        let cells = (chunk_size * detail) as usize;

        prop_assert_eq!(mesh.positions.len(), (cells + 1) * (cells + 1));
        prop_assert_eq!(mesh.normals.len(), mesh.positions.len());
        prop_assert_eq!(mesh.indices.len(), cells * cells * 6);
        prop_assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    /// Property: fBm is a weighted mean of its octave samples
    #[test]
    fn noise_boundedness(
        config in terrain_config(),
        x in -500.0f64..500.0,
        z in -500.0f64..500.0,
    ) {
        let field = NoiseField::new(&config);
        let value = field.evaluate(x, z);

        let mut frequency = 1.0f64;
        let mut bound = 0.0f64;
        for _ in 0..config.octaves {
            bound = bound.max(field.sample(x * frequency, z * frequency).abs());
            frequency *= f64::from(config.lacunarity);
        }

        prop_assert!(value.is_finite());
        prop_assert!(
            value.abs() <= bound + 1e-9,
            "fBm {} exceeds largest octave sample {}",
            value, bound
        );
        if config.noise == NoiseKind::Perlin {
            prop_assert!((-1.01..=1.01).contains(&value));
        }
    }
}
