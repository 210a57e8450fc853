// In: src/chunk_pipeline/full_file.rs

//! Reassembles the column groups of one chunk into full-width rows.

use crate::chunk_pipeline::tiles::ColumnGroup;
use crate::types::SEPARATOR;

/// The full-width rows of one chunk, ready to be appended to the combined file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRowBuffer {
    pub row_byte_size: usize,
    pub rows: usize,
    buffer: Vec<u8>,
}

impl FullRowBuffer {
    /// Joins, row by row, every group's fields with one separator and ends each
    /// row with `eol`.
    ///
    /// `row_byte_size` is the expected size of one joined row. After each row the
    /// bytes written so far are checked against it; a mismatch is logged and
    /// counted in the returned anomaly total.
    pub fn assemble(groups: &[ColumnGroup], row_byte_size: usize, eol: &[u8]) -> (Self, u64) {
        let rows = groups.first().map_or(0, |g| g.rows);
        let mut buffer = Vec::with_capacity(row_byte_size * rows);
        let mut anomalies = 0u64;

        for r in 0..rows {
            for (i, group) in groups.iter().enumerate() {
                if i > 0 {
                    buffer.push(SEPARATOR);
                }
                buffer.extend_from_slice(group.row_fields(r));
            }
            buffer.extend_from_slice(eol);

            let expected = row_byte_size * (r + 1);
            if buffer.len() != expected {
                anomalies += 1;
                log::warn!(
                    "full row {} ends at byte {} instead of {}",
                    r,
                    buffer.len(),
                    expected
                );
            }
        }

        (
            FullRowBuffer {
                row_byte_size,
                rows,
                buffer,
            },
            anomalies,
        )
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn total_byte_size(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_pipeline::tiles::{build_column_groups, formatted_row_size};
    use ndarray::array;

    #[test]
    fn test_groups_rejoin_into_full_rows() {
        let matrix = array![[1.5f32, 3.5, 4.0], [0.0, 1.0, 2.0]];
        let (groups, _) = build_column_groups(matrix.view(), 2, 5, b"\n");
        let (full, anomalies) = FullRowBuffer::assemble(&groups, formatted_row_size(3, 5, 1), b"\n");
        assert_eq!(anomalies, 0);
        assert_eq!(full.rows, 2);
        assert_eq!(full.bytes(), b"1.500,3.500,4.000\n0.000,1.000,2.000\n");
    }

    #[test]
    fn test_size_mismatch_is_reported() {
        let matrix = array![[1.0f32, 2.0]];
        let (groups, _) = build_column_groups(matrix.view(), 1, 5, b"\n");
        let (full, anomalies) = FullRowBuffer::assemble(&groups, 99, b"\n");
        assert_eq!(anomalies, 1);
        assert_eq!(full.bytes(), b"1.000,2.000\n");
    }

    #[test]
    fn test_no_groups_no_rows() {
        let (full, anomalies) = FullRowBuffer::assemble(&[], 10, b"\n");
        assert_eq!(full.rows, 0);
        assert_eq!(full.total_byte_size(), 0);
        assert_eq!(anomalies, 0);
    }
}
