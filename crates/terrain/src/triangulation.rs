//! Index buffer generation for a chunk grid.

use crate::layout::ChunkLayout;

/// Emits two triangles per grid cell.
///
/// For the cell whose lower-left vertex is `v`, with `n` vertices per row:
/// `(v, v + n, v + 1)` and `(v + 1, v + n, v + n + 1)`. On a Y-up height
/// field this winding faces upward.
#[derive(Debug, Clone, Copy)]
pub struct TriangulationJob {
    cells: u32,
    vertices_per_side: u32,
}

impl TriangulationJob {
    /// Prepare a job for `layout`.
    pub fn new(layout: &ChunkLayout) -> Self {
        Self {
            cells: layout.cells,
            vertices_per_side: layout.vertices_per_side,
        }
    }

    /// Fill `indices` with the quad-strip triangulation.
    ///
    /// # Panics
    /// Panics if `indices` is not exactly `cells * cells * 6` long.
    pub fn run(&self, indices: &mut [u32]) {
        let cells = self.cells as usize;
        assert_eq!(
            indices.len(),
            cells * cells * 6,
            "index buffer does not match chunk layout"
        );

        let row = self.vertices_per_side;
        let mut quads = indices.chunks_exact_mut(6);
        let mut vert = 0u32;
        for _ in 0..self.cells {
            for _ in 0..self.cells {
                // Length checked above, so every cell has a slot.
                if let Some(quad) = quads.next() {
                    quad.copy_from_slice(&[
                        vert,
                        vert + row,
                        vert + 1,
                        vert + 1,
                        vert + row,
                        vert + row + 1,
                    ]);
                }
                vert += 1;
            }
            // Skip the last vertex of the row.
            vert += 1;
        }
    }
}
