//! Terrain generation parameters.
//!
//! A [`TerrainConfig`] is immutable for the duration of a generation pass.
//! Reconfiguration always produces a new, validated value that replaces the
//! old one wholesale.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::fields::CONFIG_FIELDS;
use crate::ChunkCoord;

/// Default location of the terrain config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/terrain.toml";

/// Upper bound on `chunk_size * detail`.
///
/// Keeps `(chunk_size * detail + 1)^2` comfortably inside `u32` indices.
pub const MAX_CHUNK_RESOLUTION: u32 = 1024;

/// Upper bound on `width * detail` and `length * detail`.
///
/// Global grid indices stay exact in `f32` and chunk offsets stay inside `u32`.
pub const MAX_TERRAIN_RESOLUTION: u32 = 1 << 24;

/// Upper bound on the octave count.
pub const MAX_OCTAVES: u32 = 32;

/// Validation failure for a terrain configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An integer field that must be at least one was zero.
    #[error("{field} must be greater than zero")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
    },
    /// A float field was NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Offending field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A field fell outside its accepted range.
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// `chunk_size * detail` is too large for a single chunk mesh.
    #[error("chunk_size * detail = {resolution} exceeds the per-chunk limit of {max}")]
    ResolutionTooLarge {
        /// Requested per-chunk cell count along one side.
        resolution: u64,
        /// Maximum accepted value.
        max: u32,
    },
    /// `width * detail` or `length * detail` is too large for the global grid.
    #[error("{axis} * detail = {resolution} exceeds the terrain limit of {max}")]
    TerrainTooLarge {
        /// `width` or `length`.
        axis: &'static str,
        /// Requested global cell count along that axis.
        resolution: u64,
        /// Maximum accepted value.
        max: u32,
    },
    /// No reconfigurable field has the given name.
    #[error("unknown terrain field `{0}`")]
    UnknownField(String),
}

/// Base noise primitive sampled by each octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// Simplex gradient noise.
    #[default]
    Simplex,
    /// Classic Perlin gradient noise.
    Perlin,
}

/// Parameters for one terrain generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World extent along X.
    pub width: u32,
    /// World extent along Z.
    pub length: u32,
    /// Vertical scale applied to the normalized noise value.
    pub height: f32,
    /// Horizontal noise scale (world units to noise space).
    pub scale: f32,
    /// Number of fBm layers.
    pub octaves: u32,
    /// Per-octave frequency multiplier.
    pub lacunarity: f32,
    /// Per-octave amplitude multiplier.
    pub persistence: f32,
    /// Grid subdivisions per world unit.
    pub detail: u32,
    /// World units per chunk side.
    pub chunk_size: u32,
    /// Seed for the noise permutation table.
    pub seed: u32,
    /// Noise primitive.
    pub noise: NoiseKind,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 25,
            length: 25,
            height: 10.0,
            scale: 0.1,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            detail: 1,
            chunk_size: 10,
            seed: 0,
            noise: NoiseKind::Simplex,
        }
    }
}

impl TerrainConfig {
    /// Consume the config, returning it only if every invariant holds.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// Check every field invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in CONFIG_FIELDS {
            field.validate(self)?;
        }

        let resolution = u64::from(self.chunk_size) * u64::from(self.detail);
        if resolution > u64::from(MAX_CHUNK_RESOLUTION) {
            return Err(ConfigError::ResolutionTooLarge {
                resolution,
                max: MAX_CHUNK_RESOLUTION,
            });
        }

        for (axis, extent) in [("width", self.width), ("length", self.length)] {
            let resolution = u64::from(extent) * u64::from(self.detail);
            if resolution > u64::from(MAX_TERRAIN_RESOLUTION) {
                return Err(ConfigError::TerrainTooLarge {
                    axis,
                    resolution,
                    max: MAX_TERRAIN_RESOLUTION,
                });
            }
        }
        Ok(())
    }

    /// Grid cells along one side of a chunk (`chunk_size * detail`).
    pub fn chunk_cells(&self) -> u32 {
        self.chunk_size * self.detail
    }

    /// Vertices along one side of a chunk (`chunk_size * detail + 1`).
    pub fn chunk_vertices_per_side(&self) -> u32 {
        self.chunk_cells() + 1
    }

    /// Vertex buffer length for one chunk.
    pub fn chunk_vertex_count(&self) -> usize {
        let side = self.chunk_vertices_per_side() as usize;
        side * side
    }

    /// Index buffer length for one chunk (two triangles per cell).
    pub fn chunk_index_count(&self) -> usize {
        let cells = self.chunk_cells() as usize;
        cells * cells * 6
    }

    /// Chunk grid dimensions, `(ceil(width / chunk_size), ceil(length / chunk_size))`.
    ///
    /// The last column/row overshoots the nominal extent when it is not an
    /// exact multiple of the chunk size.
    pub fn chunk_grid(&self) -> (u32, u32) {
        (
            self.width.div_ceil(self.chunk_size),
            self.length.div_ceil(self.chunk_size),
        )
    }

    /// Total number of chunks in the grid.
    pub fn chunk_count(&self) -> usize {
        let (x, z) = self.chunk_grid();
        x as usize * z as usize
    }

    /// Every chunk coordinate, X-major then Z.
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> {
        let (chunks_x, chunks_z) = self.chunk_grid();
        (0..chunks_x).flat_map(move |x| (0..chunks_z).map(move |z| ChunkCoord::new(x, z)))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TerrainConfig = toml::from_str(contents)?;
        Ok(config.validated()?)
    }

    /// Load and validate a config file, returning errors to the caller.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read terrain config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid terrain config {}", path.display()))
    }

    /// Load a config file, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(config) => config,
            Err(err) => {
                let not_found = err
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
                if not_found {
                    warn!(
                        "Terrain config not found at {}. Using defaults",
                        path.display()
                    );
                } else {
                    warn!("{err:#}. Using defaults");
                }
                TerrainConfig::default()
            }
        }
    }

    /// Save as pretty TOML, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
