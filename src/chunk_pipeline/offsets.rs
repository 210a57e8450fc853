//! The cross-chunk mapping cursor.

use serde::Serialize;

/// Where the next chunk starts reading.
///
/// Mappings must start on a page boundary, so the absolute read cursor is kept
/// as a page-aligned window start plus an offset into that window. The only way
/// to build one is [`ResumeOffsets::at`], which enforces the alignment, and the
/// absolute cursor is always derived, never stored.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumeOffsets {
    window_start: u64,
    intra_window_offset: u64,
}

impl ResumeOffsets {
    /// The cursor of a fresh run.
    pub fn start() -> Self {
        Self::default()
    }

    /// Splits an absolute cursor into a page-aligned window start and the
    /// offset within that window.
    pub fn at(absolute_cursor: u64, page_size: u64) -> Self {
        debug_assert!(page_size > 0, "page size must be non-zero");
        let intra_window_offset = absolute_cursor % page_size;
        Self {
            window_start: absolute_cursor - intra_window_offset,
            intra_window_offset,
        }
    }

    pub fn window_start(&self) -> u64 {
        self.window_start
    }

    pub fn intra_window_offset(&self) -> u64 {
        self.intra_window_offset
    }

    pub fn absolute_cursor(&self) -> u64 {
        self.window_start + self.intra_window_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_invariants() {
        for page_size in [1u64, 7, 4096, 65536] {
            for absolute in [0u64, 1, 4095, 4096, 4097, 123_456_789] {
                let offsets = ResumeOffsets::at(absolute, page_size);
                assert_eq!(offsets.window_start() % page_size, 0);
                assert_eq!(offsets.absolute_cursor(), absolute);
                assert!(offsets.intra_window_offset() < page_size);
            }
        }
    }

    #[test]
    fn test_start_is_zero() {
        let offsets = ResumeOffsets::start();
        assert_eq!(offsets.window_start(), 0);
        assert_eq!(offsets.absolute_cursor(), 0);
    }
}
