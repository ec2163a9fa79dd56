#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod config;
pub mod fields;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{
    ConfigError, NoiseKind, TerrainConfig, DEFAULT_CONFIG_PATH, MAX_CHUNK_RESOLUTION, MAX_OCTAVES,
    MAX_TERRAIN_RESOLUTION,
};
pub use fields::{lookup_field, ConfigField, FieldKind, CONFIG_FIELDS};

/// Position of a chunk inside the terrain's chunk grid.
///
/// Chunk grids start at the terrain origin, so both axes are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Column along the X axis.
    pub x: u32,
    /// Row along the Z axis.
    pub z: u32,
}

impl ChunkCoord {
    /// Construct a chunk coordinate.
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
