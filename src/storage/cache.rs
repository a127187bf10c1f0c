//! LRU tracking for resident chunks
//!
//! The store keeps chunk data in its own slots; this tracker only records
//! when each resident chunk was last touched so the oldest can be evicted.
//! [`DecodedChunks`] reuses it to bound the decoded copies of packed chunks
//! served to readers of a frozen grid.

use std::collections::HashMap;
use std::sync::Arc;

/// Access tracker for resident chunks
#[derive(Debug, Default)]
pub struct ChunkCache {
    /// Monotonic access counter
    tick: u64,
    /// Last access tick of each resident chunk
    last_access: HashMap<usize, u64>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chunk as recently used, adding it if absent
    pub fn touch(&mut self, chunk: usize) {
        self.tick += 1;
        self.last_access.insert(chunk, self.tick);
    }

    /// Stop tracking a chunk
    ///
    /// # Returns
    /// True if the chunk was tracked
    pub fn remove(&mut self, chunk: usize) -> bool {
        self.last_access.remove(&chunk).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.last_access.len()
    }

    /// Least recently used chunk, if any
    pub fn least_recent(&self) -> Option<usize> {
        self.last_access
            .iter()
            .min_by_key(|&(_, &tick)| tick)
            .map(|(&chunk, _)| chunk)
    }
}

/// Bounded set of decoded chunk copies, evicting the least recently read
#[derive(Debug)]
pub struct DecodedChunks {
    capacity: usize,
    order: ChunkCache,
    chunks: HashMap<usize, Arc<[i16]>>,
}

impl DecodedChunks {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: ChunkCache::new(),
            chunks: HashMap::new(),
        }
    }

    /// Decoded cells of a chunk, if held
    pub fn get(&mut self, chunk: usize) -> Option<Arc<[i16]>> {
        let cells = Arc::clone(self.chunks.get(&chunk)?);
        self.order.touch(chunk);
        Some(cells)
    }

    /// Hold the decoded cells of a chunk, dropping the oldest when full
    pub fn insert(&mut self, chunk: usize, cells: Arc<[i16]>) {
        if self.capacity == 0 {
            return;
        }
        while self.order.len() >= self.capacity {
            match self.order.least_recent() {
                Some(oldest) => {
                    self.order.remove(oldest);
                    self.chunks.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.touch(chunk);
        self.chunks.insert(chunk, cells);
    }

    /// Number of chunks held
    pub fn held(&self) -> usize {
        self.chunks.len()
    }
}
