//! Chunk compression and spill files

use crate::core::error::Error;
use crate::core::types::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Compress chunk cells using LZ4
pub fn pack_cells(cells: &[i16]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(bytemuck::cast_slice(cells))
}

/// Decompress chunk cells, checking the expected cell count
pub fn unpack_cells(data: &[u8], expected: usize) -> Result<Box<[i16]>> {
    let bytes = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Storage(format!("LZ4 decompression failed: {}", e)))?;
    if bytes.len() != expected * std::mem::size_of::<i16>() {
        return Err(Error::Storage(format!(
            "packed chunk holds {} bytes, expected {}",
            bytes.len(),
            expected * std::mem::size_of::<i16>()
        )));
    }
    // The decompressed buffer carries no alignment guarantee for i16
    Ok(bytes
        .chunks_exact(2)
        .map(|b| i16::from_ne_bytes([b[0], b[1]]))
        .collect())
}

/// Temporary directory holding evicted chunks, removed on drop
#[derive(Debug)]
pub struct SpillDir {
    dir: TempDir,
}

impl SpillDir {
    /// Create a fresh spill directory under `parent`
    pub fn new_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("fastvoxel-spill-")
            .tempdir_in(parent)?;
        log::debug!("Spilling chunks to {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Get the file path for a chunk
    pub fn chunk_path(&self, chunk: usize) -> PathBuf {
        self.dir.path().join(format!("chunk_{}.fvc", chunk))
    }

    /// Write a packed chunk, returning its path
    pub fn write(&self, chunk: usize, packed: &[u8]) -> Result<PathBuf> {
        let path = self.chunk_path(chunk);
        fs::write(&path, packed)?;
        Ok(path)
    }
}

/// Read a spilled chunk back
pub fn read_spilled(path: &Path, expected: usize) -> Result<Box<[i16]>> {
    let packed = fs::read(path)?;
    unpack_cells(&packed, expected)
}
