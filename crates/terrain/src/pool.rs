//! Reusable scratch buffers for chunk builds.
//!
//! Checking out from the pool resizes retained buffers in place, so once the
//! pool is warm a build of the same chunk resolution performs no scratch
//! allocation. Buffers go back to the pool when the guard drops, including
//! during unwinding.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::layout::ChunkLayout;

/// Idle buffer sets kept around; extras are dropped on return.
pub const MAX_IDLE_BUFFERS: usize = 8;

/// Vertex, normal and index storage for one chunk.
#[derive(Default)]
struct ScratchBuffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl ScratchBuffers {
    /// Resize for `layout`, returning true if any buffer had to grow.
    fn prepare(&mut self, vertex_count: usize, index_count: usize) -> bool {
        let grew = self.positions.capacity() < vertex_count
            || self.normals.capacity() < vertex_count
            || self.indices.capacity() < index_count;
        self.positions.resize(vertex_count, [0.0; 3]);
        self.normals.resize(vertex_count, [0.0; 3]);
        self.indices.resize(index_count, 0);
        grew
    }

    fn reset(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

/// Counters describing pool activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total checkouts served.
    pub checkouts: usize,
    /// Checkouts that created or grew a buffer set.
    pub allocations: usize,
    /// Buffer sets currently idle in the pool.
    pub idle: usize,
}

/// Pool of chunk scratch buffers.
pub struct BufferPool {
    available: Mutex<Vec<ScratchBuffers>>,
    checkouts: AtomicUsize,
    allocations: AtomicUsize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            available: Mutex::new(Vec::new()),
            checkouts: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
        }
    }

    /// Check out buffers sized for `layout`.
    ///
    /// The contents of the returned buffers are unspecified; callers must
    /// overwrite every slot they read.
    pub fn checkout(&self, layout: &ChunkLayout) -> PooledScratch<'_> {
        let vertex_count = layout.vertex_count();
        let index_count = layout.index_count();

        let recycled = self.available.lock().pop();
        let fresh = recycled.is_none();
        let mut buffers = recycled.unwrap_or_default();
        let grew = buffers.prepare(vertex_count, index_count);

        self.checkouts.fetch_add(1, Ordering::Relaxed);
        if fresh || grew {
            self.allocations.fetch_add(1, Ordering::Relaxed);
        }

        PooledScratch {
            pool: self,
            buffers,
            vertex_count,
            index_count,
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            checkouts: self.checkouts.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            idle: self.available.lock().len(),
        }
    }

    fn release(&self, mut buffers: ScratchBuffers) {
        buffers.reset();
        let mut available = self.available.lock();
        if available.len() < MAX_IDLE_BUFFERS {
            available.push(buffers);
        }
    }
}

/// Exclusive checkout of one scratch buffer set.
///
/// Buffers are exposed as fixed-length slices; their lengths are checked
/// again when the guard returns them.
///
/// # Panics
/// Dropping the guard panics if a buffer length changed since checkout,
/// unless the thread is already unwinding.
pub struct PooledScratch<'a> {
    pool: &'a BufferPool,
    buffers: ScratchBuffers,
    vertex_count: usize,
    index_count: usize,
}

impl PooledScratch<'_> {
    /// Mutable views of `(positions, normals, indices)`.
    pub fn parts_mut(&mut self) -> (&mut [[f32; 3]], &mut [[f32; 3]], &mut [u32]) {
        let buffers = &mut self.buffers;
        (
            &mut buffers.positions,
            &mut buffers.normals,
            &mut buffers.indices,
        )
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.buffers.positions
    }

    /// Vertex normals.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.buffers.normals
    }

    /// Triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }
}

impl Drop for PooledScratch<'_> {
    fn drop(&mut self) {
        let buffers = std::mem::take(&mut self.buffers);
        if !std::thread::panicking() {
            assert!(
                buffers.positions.len() == self.vertex_count
                    && buffers.normals.len() == self.vertex_count
                    && buffers.indices.len() == self.index_count,
                "scratch buffers returned with a different size than checked out"
            );
        }
        self.pool.release(buffers);
    }
}
