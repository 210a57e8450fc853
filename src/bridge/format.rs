// In: src/bridge/format.rs

//! Defines the on-disk naming of every output file.
//! This is the single source of truth for tile and combined-file names.

use std::path::{Path, PathBuf};

/// Name of the cumulative, full-width output file.
pub const FULL_FILE_NAME: &str = "resized_full.csv";

/// File name of the tile at (`tile_row`, `tile_col`), e.g. `row003_col012.csv`.
///
/// Indices wider than three digits are written in full.
pub fn tile_file_name(tile_row: usize, tile_col: usize) -> String {
    format!("row{tile_row:03}_col{tile_col:03}.csv")
}

pub fn tile_path(dest: &Path, tile_row: usize, tile_col: usize) -> PathBuf {
    dest.join(tile_file_name(tile_row, tile_col))
}

pub fn full_file_path(dest: &Path) -> PathBuf {
    dest.join(FULL_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_names_are_zero_padded() {
        assert_eq!(tile_file_name(0, 0), "row000_col000.csv");
        assert_eq!(tile_file_name(7, 42), "row007_col042.csv");
        assert_eq!(tile_file_name(1234, 5), "row1234_col005.csv");
    }
}
