//! First-row statistics of a source table.
//!
//! The pipeline sizes every buffer from the first row, so this is computed once,
//! before the row layout is derived. The probe reads a bounded prefix of the file
//! and never moves a shared cursor.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CsvTileError;
use crate::types::{Eol, SEPARATOR};

/// How many bytes of the source are probed when looking for the first line end.
pub const FIRST_ROW_PROBE_BYTES: usize = 1_000_000;

/// Statistics about the first row of a source table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInfo {
    /// Number of fields, i.e. one more than the number of separators.
    pub field_count: u32,
    /// Byte length of the row, terminator included.
    pub byte_length: i64,
    /// `Auto` when no line end was found in the probed prefix.
    pub detected_eol: Eol,
}

impl RowInfo {
    /// Computes the statistics of the first row held in `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let probe = &bytes[..bytes.len().min(FIRST_ROW_PROBE_BYTES)];
        let mut field_count: u32 = 1;
        let mut detected_eol = Eol::Auto;
        let mut length = probe.len();

        for (idx, &byte) in probe.iter().enumerate() {
            if byte == SEPARATOR {
                field_count += 1;
            } else if byte == b'\n' {
                detected_eol = if idx > 0 && probe[idx - 1] == b'\r' {
                    Eol::Dos
                } else {
                    Eol::Unix
                };
                length = idx + 1;
                break;
            }
        }

        RowInfo {
            field_count,
            byte_length: length as i64,
            detected_eol,
        }
    }

    /// Probes the first row of the file at `path`.
    pub fn sniff(path: &Path) -> Result<Self, CsvTileError> {
        let file = File::open(path)?;
        let mut probe = Vec::with_capacity(64 * 1024);
        file.take(FIRST_ROW_PROBE_BYTES as u64)
            .read_to_end(&mut probe)?;

        let info = Self::from_bytes(&probe);
        log::debug!(
            "first row of {:?}: {} fields, {} bytes, eol {}",
            path,
            info.field_count,
            info.byte_length,
            info.detected_eol
        );
        Ok(info)
    }
}
