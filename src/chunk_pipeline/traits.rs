// In: src/chunk_pipeline/traits.rs

//! Defines the output seam of the pipeline.
//!
//! The driver formats every chunk in memory and then hands the finished byte
//! buffers to a `ChunkSink`. The sink decides where the bytes go: the bridge's
//! `DirectorySink` writes real files, while `MemorySink` keeps everything in
//! memory so scenario tests can assert on exact output bytes.

use std::collections::BTreeMap;

use crate::error::CsvTileError;

/// Receives the formatted output of each chunk.
pub trait ChunkSink {
    /// Stores one tile. `tile_row` is the chunk index, `tile_col` the column
    /// group index.
    ///
    /// A failure here only loses this tile; the driver logs it and moves on.
    fn write_tile(&mut self, tile_row: usize, tile_col: usize, bytes: &[u8])
        -> Result<(), CsvTileError>;

    /// Appends one chunk's worth of full-width rows to the combined output.
    ///
    /// After the first failure the driver stops calling this for the rest of
    /// the run.
    fn append_full(&mut self, bytes: &[u8]) -> Result<(), CsvTileError>;
}

/// An in-memory sink, keyed by `(tile_row, tile_col)`.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub tiles: BTreeMap<(usize, usize), Vec<u8>>,
    pub full: Vec<u8>,
    /// Number of `append_full` calls received.
    pub full_appends: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile(&self, tile_row: usize, tile_col: usize) -> Option<&[u8]> {
        self.tiles.get(&(tile_row, tile_col)).map(Vec::as_slice)
    }
}

impl ChunkSink for MemorySink {
    fn write_tile(
        &mut self,
        tile_row: usize,
        tile_col: usize,
        bytes: &[u8],
    ) -> Result<(), CsvTileError> {
        if self.tiles.contains_key(&(tile_row, tile_col)) {
            return Err(CsvTileError::tile_write(
                format!("memory://{tile_row}/{tile_col}"),
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
        self.tiles.insert((tile_row, tile_col), bytes.to_vec());
        Ok(())
    }

    fn append_full(&mut self, bytes: &[u8]) -> Result<(), CsvTileError> {
        self.full.extend_from_slice(bytes);
        self.full_appends += 1;
        Ok(())
    }
}
