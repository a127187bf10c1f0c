//! Memory budget for resident chunks
//!
//! Tracks the bytes held by materialized chunks and tells the store
//! when it has to evict before loading another one.

/// Memory budget manager
pub struct MemoryBudget {
    /// Maximum memory allowed (bytes)
    budget_bytes: usize,
    /// Currently used memory (bytes)
    used_bytes: usize,
}

impl MemoryBudget {
    /// Create a new memory budget
    ///
    /// # Arguments
    /// * `budget_bytes` - Maximum memory in bytes
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
        }
    }

    // --- Tracking methods ---

    /// Add memory usage
    pub fn add(&mut self, bytes: usize) {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
    }

    /// Remove memory usage
    pub fn remove(&mut self, bytes: usize) {
        self.used_bytes = self.used_bytes.saturating_sub(bytes);
    }

    // --- Query methods ---

    /// Get current memory usage in bytes
    pub fn used(&self) -> usize {
        self.used_bytes
    }

    /// Get available memory in bytes
    pub fn available(&self) -> usize {
        self.budget_bytes.saturating_sub(self.used_bytes)
    }

    // --- Decision methods ---

    /// Check if a chunk of `bytes` fits without evicting
    pub fn can_load(&self, bytes: usize) -> bool {
        self.available() >= bytes
    }
}
