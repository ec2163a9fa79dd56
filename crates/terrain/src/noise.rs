//! Fractal noise evaluation for terrain heights.
//!
//! Layers octaves of a gradient noise primitive and normalizes by the running
//! sum of amplitudes, so the result stays inside the primitive's range no
//! matter how many octaves are stacked.

use heightfield_core::{NoiseKind, TerrainConfig};
use noise::{NoiseFn, Perlin, Simplex};

enum Primitive {
    Simplex(Simplex),
    Perlin(Perlin),
}

/// Multi-octave fBm sampler configured from a [`TerrainConfig`].
///
/// Evaluation is pure and `Sync`, so one instance is shared by every worker
/// of a height-field pass.
pub struct NoiseField {
    primitive: Primitive,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
}

impl NoiseField {
    /// Build a sampler from the noise fields of `config`.
    ///
    /// `config` is expected to be validated; octave counts of zero are
    /// treated as one.
    pub fn new(config: &TerrainConfig) -> Self {
        let primitive = match config.noise {
            NoiseKind::Simplex => Primitive::Simplex(Simplex::new(config.seed)),
            NoiseKind::Perlin => Primitive::Perlin(Perlin::new(config.seed)),
        };
        Self {
            primitive,
            octaves: config.octaves.max(1),
            lacunarity: f64::from(config.lacunarity),
            persistence: f64::from(config.persistence),
        }
    }

    /// Sample the base primitive once.
    #[inline]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        match &self.primitive {
            Primitive::Simplex(simplex) => simplex.get([x, z]),
            Primitive::Perlin(perlin) => perlin.get([x, z]),
        }
    }

    /// Evaluate fBm at `(x, z)` in noise space.
    ///
    /// Octave `i` samples at `(x, z) * lacunarity^i` weighted by
    /// `persistence^i`; the sum is divided by the total weight.
    pub fn evaluate(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.sample(x * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        total / max_amplitude
    }

    /// Number of octaves summed per evaluation.
    pub fn octaves(&self) -> u32 {
        self.octaves
    }
}
