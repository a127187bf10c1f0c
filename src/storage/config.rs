//! Grid store configuration

use crate::core::error::Error;
use crate::core::types::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest allowed chunk edge in cells
pub const MAX_CHUNK_EDGE: u32 = 256;

/// Configuration for the chunked grid store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of a cubic chunk, in cells
    pub chunk_edge: u32,
    /// Bytes of fully materialized chunks kept in memory before eviction
    pub memory_budget_bytes: usize,
    /// Directory under which evicted chunks are written; kept in memory when `None`
    pub spill_dir: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            chunk_edge: 32,
            memory_budget_bytes: 512 * 1024 * 1024,
            spill_dir: None,
        }
    }
}

impl GridConfig {
    /// Config with a memory budget given in megabytes
    pub fn with_budget_mb(mut self, mb: usize) -> Self {
        self.memory_budget_bytes = mb.saturating_mul(1024 * 1024);
        self
    }

    /// Bytes taken by one materialized chunk
    pub fn chunk_bytes(&self) -> usize {
        let edge = self.chunk_edge as usize;
        edge * edge * edge * std::mem::size_of::<i16>()
    }

    /// Check that the configuration can back a grid
    pub fn validate(&self) -> Result<()> {
        if self.chunk_edge == 0 || self.chunk_edge > MAX_CHUNK_EDGE {
            return Err(Error::Configuration(format!(
                "chunk_edge must be in 1..={MAX_CHUNK_EDGE}, got {}",
                self.chunk_edge
            )));
        }
        if self.memory_budget_bytes < self.chunk_bytes() {
            return Err(Error::Configuration(format!(
                "memory budget of {} bytes cannot hold one chunk of {} bytes",
                self.memory_budget_bytes,
                self.chunk_bytes()
            )));
        }
        if let Some(dir) = &self.spill_dir {
            if !dir.is_dir() {
                return Err(Error::Configuration(format!(
                    "spill directory {} does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
