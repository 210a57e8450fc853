// In: src/chunk_pipeline/report.rs

use serde::Serialize;

/// Counters gathered over one resizing run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub chunks: usize,
    pub rows_read: u64,
    pub rows_written: u64,
    pub malformed_fields: u64,
    pub width_anomalies: u64,
    pub format_overflows: u64,
    pub tiles_written: usize,
    pub tile_write_failures: usize,
    pub layout_anomalies: u64,
    /// Set once appending to the combined file failed.
    pub full_file_disabled: bool,
    pub elapsed_ms: u128,
}

impl RunReport {
    /// `true` when nothing was lost or altered along the way.
    pub fn is_clean(&self) -> bool {
        self.malformed_fields == 0
            && self.format_overflows == 0
            && self.tile_write_failures == 0
            && self.layout_anomalies == 0
            && !self.full_file_disabled
    }
}
