// In: src/bridge/writer.rs

//! The file-system sink: one create-exclusive file per tile, plus one
//! append-only combined file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bridge::format::{full_file_path, tile_path};
use crate::chunk_pipeline::traits::ChunkSink;
use crate::error::CsvTileError;

/// Writes tiles and the combined file under one destination directory.
pub struct DirectorySink {
    dest: PathBuf,
    full_path: PathBuf,
    full: Option<File>,
}

impl DirectorySink {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        let dest = dest.into();
        let full_path = full_file_path(&dest);
        Self {
            dest,
            full_path,
            full: None,
        }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    fn full_file(&mut self) -> Result<&mut File, CsvTileError> {
        let file = match self.full.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.full_path)
                .map_err(|e| CsvTileError::tile_write(&self.full_path, e))?,
        };
        Ok(self.full.insert(file))
    }
}

impl ChunkSink for DirectorySink {
    fn write_tile(
        &mut self,
        tile_row: usize,
        tile_col: usize,
        bytes: &[u8],
    ) -> Result<(), CsvTileError> {
        let path = tile_path(&self.dest, tile_row, tile_col);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CsvTileError::tile_write(&path, e))?;
        file.write_all(bytes)
            .map_err(|e| CsvTileError::tile_write(&path, e))?;
        log::trace!("wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn append_full(&mut self, bytes: &[u8]) -> Result<(), CsvTileError> {
        let path = self.full_path.clone();
        self.full_file()?
            .write_all(bytes)
            .map_err(|e| CsvTileError::tile_write(&path, e))
    }
}
