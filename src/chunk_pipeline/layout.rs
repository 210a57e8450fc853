// In: src/chunk_pipeline/layout.rs

//! Derivation of the fixed row geometry every buffer of a run is sized from.
//!
//! ```text
//!  ┌─────────────────┬───────────┬─────────────────┬─────────────┐
//!  │ min..=max bytes │  1 byte   │ min..=max bytes │  1-2 bytes  │
//!  ├─────────────────┼───────────┼─────────────────┼─────────────┤
//!  │      field      │ separator │      field      │ end of line │
//!  └─────────────────┴───────────┴─────────────────┴─────────────┘
//! ```

use serde::Serialize;

use crate::config::TileConfig;
use crate::error::CsvTileError;
use crate::types::{Eol, RowInfo};

/// Width of the field separator, in bytes.
pub const SEP_WIDTH: usize = 1;

/// The fixed geometry of one input row.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// The effective line terminator (never `Auto`).
    pub eol: Eol,
    pub eol_width: usize,
    pub sep_width: usize,
    pub min_field_width: usize,
    pub max_field_width: usize,
    pub field_count: usize,
    /// `(max_field_width + sep_width) * field_count - sep_width + eol_width`
    pub max_row_size: usize,
}

impl RowLayout {
    /// Derives the layout from first-row statistics and configuration.
    ///
    /// # Errors
    /// `AmbiguousLineEnding` when neither the configuration nor the detection
    /// names a line terminator, `TooFewFields` when a row cannot be downsampled.
    pub fn derive(info: &RowInfo, config: &TileConfig) -> Result<Self, CsvTileError> {
        let eol = Eol::reconcile(config.eol_mode, info.detected_eol)
            .ok_or(CsvTileError::AmbiguousLineEnding)?;

        if info.field_count < 2 {
            return Err(CsvTileError::TooFewFields(info.field_count));
        }
        if info.field_count % 2 == 1 {
            log::warn!(
                "the first row holds an odd number of fields ({}); the last column will be dropped",
                info.field_count
            );
        }

        let field_count = info.field_count as usize;
        let max_field_width = config.max_field_width as usize;
        let eol_width = eol.width();
        let max_row_size = (max_field_width + SEP_WIDTH) * field_count - SEP_WIDTH + eol_width;

        if info.byte_length > max_row_size as i64 {
            log::warn!(
                "the first row is {} bytes long but fields were declared at most {} bytes wide ({} bytes per row)",
                info.byte_length,
                max_field_width,
                max_row_size
            );
        }

        Ok(RowLayout {
            eol,
            eol_width,
            sep_width: SEP_WIDTH,
            min_field_width: config.min_field_width as usize,
            max_field_width,
            field_count,
            max_row_size,
        })
    }

    /// The furthest a malformed field is scanned before giving up on it.
    pub fn max_field_span(&self) -> usize {
        self.max_field_width + self.eol_width
    }

    /// Number of columns after 2x downsampling.
    pub fn output_columns(&self) -> usize {
        self.field_count / 2
    }

    /// `true` if `width` lies within the declared input field bounds.
    pub fn field_width_in_bounds(&self, width: usize) -> bool {
        (self.min_field_width..=self.max_field_width).contains(&width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(field_count: u32, detected_eol: Eol) -> RowInfo {
        RowInfo {
            field_count,
            byte_length: 10,
            detected_eol,
        }
    }

    #[test]
    fn test_max_row_size_formula() {
        let mut config = TileConfig::new("in", "out");
        for (fields, max_width, eol) in [(2u32, 1u8, Eol::Unix), (4, 7, Eol::Dos), (1000, 12, Eol::Unix)] {
            config.max_field_width = max_width;
            config.eol_mode = eol;
            let layout = RowLayout::derive(&info(fields, Eol::Auto), &config).unwrap();
            let expected = (max_width as usize + 1) * fields as usize - 1 + eol.width();
            assert_eq!(layout.max_row_size, expected);
            assert_eq!(layout.field_count, fields as usize);
            assert_eq!(layout.eol, eol);
        }
    }

    #[test]
    fn test_detected_eol_is_used_in_auto_mode() {
        let config = TileConfig::new("in", "out");
        let layout = RowLayout::derive(&info(4, Eol::Dos), &config).unwrap();
        assert_eq!(layout.eol, Eol::Dos);
        assert_eq!(layout.eol_width, 2);
        assert_eq!(layout.sep_width, 1);
    }

    #[test]
    fn test_auto_auto_is_ambiguous() {
        let config = TileConfig::new("in", "out");
        let result = RowLayout::derive(&info(4, Eol::Auto), &config);
        assert!(matches!(result, Err(CsvTileError::AmbiguousLineEnding)));
    }

    #[test]
    fn test_single_column_is_rejected() {
        let mut config = TileConfig::new("in", "out");
        config.eol_mode = Eol::Unix;
        let result = RowLayout::derive(&info(1, Eol::Unix), &config);
        assert!(matches!(result, Err(CsvTileError::TooFewFields(1))));
    }

    #[test]
    fn test_width_bounds() {
        let mut config = TileConfig::new("in", "out");
        config.eol_mode = Eol::Unix;
        let layout = RowLayout::derive(&info(2, Eol::Unix), &config).unwrap();
        assert!(layout.field_width_in_bounds(5));
        assert!(layout.field_width_in_bounds(7));
        assert!(!layout.field_width_in_bounds(4));
        assert!(!layout.field_width_in_bounds(8));
        assert_eq!(layout.max_field_span(), 8);
        assert_eq!(layout.output_columns(), 1);
    }
}
