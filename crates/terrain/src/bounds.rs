//! Nominal terrain volume used for camera framing and debug wire boxes.

use glam::Vec3;
use heightfield_core::TerrainConfig;

/// Extra camera distance beyond the terrain's mean extent.
pub const VIEW_DISTANCE_MARGIN: f32 = 15.0;

/// Line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub start: Vec3,
    /// End point.
    pub end: Vec3,
}

/// Box spanning `[0, -height, 0]` to `[width, height, length]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainBounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl TerrainBounds {
    /// Bounds of the nominal terrain extent for `config`.
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            min: Vec3::new(0.0, -config.height, 0.0),
            max: Vec3::new(config.width as f32, config.height, config.length as f32),
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners: bottom face first, then top, each counter-clockwise
    /// from the minimum corner.
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ]
    }

    /// The twelve wire-box edges: bottom ring, top ring, then verticals.
    pub fn edges(&self) -> [Segment; 12] {
        let c = self.corners();
        let edge = |a: usize, b: usize| Segment {
            start: c[a],
            end: c[b],
        };
        [
            edge(0, 1),
            edge(1, 2),
            edge(2, 3),
            edge(3, 0),
            edge(4, 5),
            edge(5, 6),
            edge(6, 7),
            edge(7, 4),
            edge(0, 4),
            edge(1, 5),
            edge(2, 6),
            edge(3, 7),
        ]
    }
}

/// Camera distance that frames the whole terrain.
///
/// The mean extent uses integer division.
pub fn view_distance(config: &TerrainConfig) -> f32 {
    ((u64::from(config.width) + u64::from(config.length)) / 2) as f32 + VIEW_DISTANCE_MARGIN
}
