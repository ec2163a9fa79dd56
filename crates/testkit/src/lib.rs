#![warn(missing_docs)]
//! CI artifact sinks for terrain tests and headless runs.

mod metrics;

use anyhow::Result;
use heightfield_core::ChunkCoord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use metrics::*;

/// Mesh metric snapshot for a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeshMetric {
    /// Chunk coordinates [x, z].
    pub chunk: [u32; 2],
    /// Vertex count for the chunk mesh.
    pub vertices: usize,
    /// Triangle count for the chunk mesh.
    pub triangles: usize,
    /// Mesh hash (hex string) for deterministic comparisons.
    pub hash: String,
}

impl ChunkMeshMetric {
    /// Snapshot of the chunk at `coord`.
    pub fn new(
        coord: ChunkCoord,
        vertices: usize,
        triangles: usize,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            chunk: [coord.x, coord.z],
            vertices,
            triangles,
            hash: hash.into(),
        }
    }
}

/// Writes chunk mesh metrics to JSON for CI artifacts.
pub struct MeshMetricSink {
    file: File,
}

impl MeshMetricSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the provided metrics as pretty JSON.
    pub fn write(&mut self, metrics: &[ChunkMeshMetric]) -> Result<()> {
        let json = serde_json::to_string_pretty(metrics)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}
