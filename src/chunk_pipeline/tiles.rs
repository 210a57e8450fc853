// In: src/chunk_pipeline/tiles.rs

//! The tile builder: splits a downsampled chunk into fixed-width column groups
//! and renders each group as fixed-width text.
//!
//! Each group row is `width` slots of `output_field_width` bytes, every slot
//! followed by a separator, except the last one whose separator is replaced by
//! the line terminator:
//!
//! ```text
//!  01.500,03.500,07.250\n
//!  ^^^^^^ one slot
//! ```

use ndarray::ArrayView2;

use crate::kernels::fixed_width::write_fixed;
use crate::types::SEPARATOR;

/// Position and width of one column group within the downsampled matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub index: usize,
    pub first_column: usize,
    pub width: usize,
}

/// Splits `total_columns` into groups of `tile_width`, the last one possibly
/// narrower. The group widths always sum to `total_columns`.
pub fn plan_column_groups(total_columns: usize, tile_width: usize) -> Vec<GroupSpec> {
    if tile_width == 0 {
        return Vec::new();
    }
    (0..total_columns.div_ceil(tile_width))
        .map(|index| {
            let first_column = index * tile_width;
            GroupSpec {
                index,
                first_column,
                width: tile_width.min(total_columns - first_column),
            }
        })
        .collect()
}

/// Byte size of one formatted row of `width` fields.
#[inline]
pub fn formatted_row_size(width: usize, output_field_width: usize, eol_width: usize) -> usize {
    width * (output_field_width + 1) - 1 + eol_width
}

/// One output tile of the current chunk, fully formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub spec: GroupSpec,
    pub row_byte_size: usize,
    pub rows: usize,
    eol_width: usize,
    buffer: Vec<u8>,
}

impl ColumnGroup {
    /// Formats the group's columns of `matrix`.
    ///
    /// Values too wide for their slot are truncated in place; the number of
    /// such overflows is returned alongside the group.
    pub fn format(
        spec: GroupSpec,
        matrix: ArrayView2<'_, f32>,
        output_field_width: usize,
        eol: &[u8],
    ) -> (Self, u64) {
        let rows = matrix.nrows();
        let row_byte_size = formatted_row_size(spec.width, output_field_width, eol.len());
        let mut buffer = vec![SEPARATOR; row_byte_size * rows];
        let mut scratch = String::with_capacity(output_field_width + 8);
        let mut overflows = 0u64;

        for (r, line) in buffer.chunks_exact_mut(row_byte_size).enumerate() {
            for c in 0..spec.width {
                let start = c * (output_field_width + 1);
                let slot = &mut line[start..start + output_field_width];
                let value = matrix[[r, spec.first_column + c]];
                if let Err(err) = write_fixed(value, slot, &mut scratch) {
                    overflows += 1;
                    log::warn!(
                        "tile row {} col {} of group {}: {}",
                        r,
                        spec.first_column + c,
                        spec.index,
                        err
                    );
                }
            }
            line[row_byte_size - eol.len()..].copy_from_slice(eol);
        }

        let group = ColumnGroup {
            spec,
            row_byte_size,
            rows,
            eol_width: eol.len(),
            buffer,
        };
        (group, overflows)
    }

    /// The whole formatted tile.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Row `r` without its line terminator.
    pub fn row_fields(&self, r: usize) -> &[u8] {
        let start = r * self.row_byte_size;
        &self.buffer[start..start + self.row_byte_size - self.eol_width]
    }
}

/// Formats every column group of a downsampled chunk. Also returns how many
/// values were truncated into their slot.
pub fn build_column_groups(
    matrix: ArrayView2<'_, f32>,
    tile_width: usize,
    output_field_width: usize,
    eol: &[u8],
) -> (Vec<ColumnGroup>, u64) {
    let mut overflows = 0u64;
    let groups = plan_column_groups(matrix.ncols(), tile_width)
        .into_iter()
        .map(|spec| {
            let (group, n) = ColumnGroup::format(spec, matrix, output_field_width, eol);
            overflows += n;
            group
        })
        .collect();
    (groups, overflows)
}
