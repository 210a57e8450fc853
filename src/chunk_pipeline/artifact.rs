// In: src/chunk_pipeline/artifact.rs

//! Defines the formatted output of a single chunk.
//!
//! A `ChunkArtifacts` value owns every per-chunk byte buffer: one formatted
//! tile per column group plus the reassembled full-width rows. It is built from
//! the downsampled matrix, handed to a sink, and dropped before the next chunk
//! is mapped.

use ndarray::ArrayView2;

use crate::chunk_pipeline::full_file::FullRowBuffer;
use crate::chunk_pipeline::tiles::{build_column_groups, formatted_row_size, ColumnGroup};

/// Everything one chunk writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkArtifacts {
    /// Index of the chunk, used as the tile row in output file names.
    pub tile_row: usize,
    pub groups: Vec<ColumnGroup>,
    pub full: FullRowBuffer,
    /// Values truncated into their fixed-width slot.
    pub format_overflows: u64,
    /// Full rows whose size disagreed with the expected row size.
    pub layout_anomalies: u64,
}

impl ChunkArtifacts {
    /// Formats the downsampled matrix of chunk `tile_row`.
    pub fn build(
        tile_row: usize,
        downsampled: ArrayView2<'_, f32>,
        tile_width: usize,
        output_field_width: usize,
        eol: &[u8],
    ) -> Self {
        let (groups, format_overflows) =
            build_column_groups(downsampled, tile_width, output_field_width, eol);
        let full_row_size = formatted_row_size(downsampled.ncols(), output_field_width, eol.len());
        let (full, layout_anomalies) = FullRowBuffer::assemble(&groups, full_row_size, eol);

        ChunkArtifacts {
            tile_row,
            groups,
            full,
            format_overflows,
            layout_anomalies,
        }
    }

    pub fn rows(&self) -> usize {
        self.full.rows
    }

    /// `true` when the chunk produced no output rows.
    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }
}
