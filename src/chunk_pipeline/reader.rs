// In: src/chunk_pipeline/reader.rs

//! The chunk reader: maps a page-aligned window of the source file and parses up
//! to `2 * tile_height` rows of it into the reusable float matrix.
//!
//! The mapped window is a scoped resource. `ReadWindow` owns the mapping and
//! releases it on drop, so the window is unmapped on every exit path, including
//! early returns on errors. Parsing only ever sees a bounds-checked byte slice
//! and an explicit cursor index into it.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};
use ndarray::{s, Array2, ArrayViewMut1};
use serde::Serialize;

use crate::chunk_pipeline::layout::RowLayout;
use crate::chunk_pipeline::offsets::ResumeOffsets;
use crate::error::{CsvTileError, MapFailure};
use crate::kernels::field_parse::read_field;
use crate::types::SEPARATOR;

//==================================================================================
// 1. Window Geometry & Mapping
//==================================================================================

/// The fixed size of every read window.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// `max_row_size * tile_height * 2`
    pub byte_size: usize,
    pub page_size: usize,
    /// `byte_size` rounded up to whole pages.
    pub page_count: usize,
}

impl WindowGeometry {
    pub fn new(layout: &RowLayout, tile_height: u16, page_size: usize) -> Self {
        let byte_size = layout.max_row_size * tile_height as usize * 2;
        Self {
            byte_size,
            page_size,
            page_count: byte_size.div_ceil(page_size),
        }
    }

    /// Bytes to map for a window whose read cursor sits `intra_offset` bytes past
    /// the page-aligned start, widened by `extra` bytes, before clamping to the
    /// end of the file.
    pub fn mapped_len(&self, intra_offset: usize, extra: usize) -> usize {
        (intra_offset + self.byte_size + extra).div_ceil(self.page_size) * self.page_size
    }
}

/// A page-aligned, read-only view of part of the source file.
pub struct ReadWindow {
    mmap: Option<Mmap>,
    start: u64,
    reaches_eof: bool,
}

impl ReadWindow {
    /// Maps `wanted` bytes from the window start in `offsets`, clamped to the
    /// file's end.
    ///
    /// A window starting at or past the end of the file maps nothing.
    pub fn map(
        file: &File,
        file_size: u64,
        offsets: &ResumeOffsets,
        wanted: usize,
    ) -> Result<Self, CsvTileError> {
        let start = offsets.window_start();
        let available = file_size.saturating_sub(start);
        let len = (wanted as u64).min(available) as usize;
        let reaches_eof = start + len as u64 >= file_size;

        if len == 0 {
            return Ok(Self {
                mmap: None,
                start,
                reaches_eof,
            });
        }

        // SAFETY: the mapping is read-only and private. The source must not be
        // truncated by another process while the run is in progress.
        let mmap = unsafe { MmapOptions::new().offset(start).len(len).map(file) }.map_err(
            |source| CsvTileError::Map {
                category: MapFailure::classify(&source),
                offset: start,
                len,
                source,
            },
        )?;
        log::trace!("mapped {} bytes at offset {}", len, start);

        Ok(Self {
            mmap: Some(mmap),
            start,
            reaches_eof,
        })
    }

    /// The mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Absolute file offset of the first mapped byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// `true` when the last mapped byte is the last byte of the file.
    pub fn reaches_eof(&self) -> bool {
        self.reaches_eof
    }
}

impl Drop for ReadWindow {
    fn drop(&mut self) {
        if self.mmap.is_some() {
            log::trace!("unmapping window at offset {}", self.start);
        }
    }
}

//==================================================================================
// 2. Row Parsing (pure, slice based)
//==================================================================================

/// What one pass over a window produced.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkRead {
    /// Rows written into the top of the parsed matrix.
    pub rows: usize,
    /// `true` once the end of the input has been reached.
    pub finished: bool,
    pub malformed_fields: u64,
    pub width_anomalies: u64,
}

/// Result of [`parse_rows`]: the read summary plus where the cursor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome {
    pub read: ChunkRead,
    /// Index into the window of the first unconsumed byte.
    pub cursor: usize,
}

/// End (exclusive) of the line starting at `start`: one past its `\n`, or the
/// window's end when the window reaches EOF. `None` when the window ends first.
fn line_end(window: &[u8], start: usize, reaches_eof: bool) -> Option<usize> {
    match window[start..].iter().position(|&b| b == b'\n') {
        Some(p) => Some(start + p + 1),
        None if reaches_eof => Some(window.len()),
        None => None,
    }
}

/// Whatever is left of a line after its last field, minus the terminator.
fn trailing_content(rest: &[u8]) -> &[u8] {
    let rest = rest.strip_suffix(b"\n").unwrap_or(rest);
    rest.strip_suffix(b"\r").unwrap_or(rest)
}

/// Parses one complete line into `row`. Returns `(malformed, width_anomalies)`.
fn parse_line(line: &[u8], layout: &RowLayout, mut row: ArrayViewMut1<f32>) -> (u64, u64) {
    let field_count = row.len();
    let span = layout.max_field_span();
    let mut malformed = 0;
    let mut anomalies = 0;
    let mut at = 0;

    for col in 0..field_count {
        let field = read_field(&line[at..], SEPARATOR, span);
        row[col] = field.value;
        if field.malformed {
            malformed += 1;
        } else if !layout.field_width_in_bounds(field.consumed) {
            anomalies += 1;
        }
        at += field.consumed;

        if col + 1 == field_count {
            break;
        }
        if line.get(at) == Some(&SEPARATOR) {
            at += 1;
        } else {
            // The line ended early: the missing fields read as zero.
            row.slice_mut(s![col + 1..]).fill(0.0);
            malformed += (field_count - col - 1) as u64;
            break;
        }
    }

    // Extra fields are skipped and count once.
    if !trailing_content(&line[at..]).is_empty() {
        malformed += 1;
    }
    (malformed, anomalies)
}

/// Parses up to `matrix.nrows()` rows from `window`, starting at `cursor`.
///
/// Only complete lines are parsed. When `reaches_eof` is false and the window
/// ends before the next line's `\n`, parsing stops at the start of that line
/// and none of it is counted. A read that is neither full nor finished has
/// therefore been cut short by the window.
pub fn parse_rows(
    window: &[u8],
    mut cursor: usize,
    reaches_eof: bool,
    layout: &RowLayout,
    matrix: &mut Array2<f32>,
) -> ParseOutcome {
    let max_rows = matrix.nrows();
    let field_count = layout.field_count.min(matrix.ncols());
    let mut read = ChunkRead::default();

    while read.rows < max_rows && cursor < window.len() {
        let Some(end) = line_end(window, cursor, reaches_eof) else {
            break;
        };
        let row = matrix.slice_mut(s![read.rows, ..field_count]);
        let (malformed, anomalies) = parse_line(&window[cursor..end], layout, row);
        read.malformed_fields += malformed;
        read.width_anomalies += anomalies;
        read.rows += 1;
        cursor = end;
    }

    read.finished = reaches_eof && cursor >= window.len();
    ParseOutcome { read, cursor }
}

//==================================================================================
// 3. The Chunk Reader
//==================================================================================

/// Maps successive windows of one source file and parses them.
///
/// The reader itself is immutable; the resume cursor and the parsed matrix are
/// owned by the caller and handed in on every call.
pub struct ChunkReader {
    file: File,
    file_size: u64,
    layout: RowLayout,
    geometry: WindowGeometry,
}

impl ChunkReader {
    /// Opens `path` using the operating system's page size.
    pub fn open(path: &Path, layout: RowLayout, tile_height: u16) -> Result<Self, CsvTileError> {
        Self::open_with_page_size(path, layout, tile_height, page_size::get_granularity())
    }

    /// Opens `path` with an explicit mapping granularity.
    pub fn open_with_page_size(
        path: &Path,
        layout: RowLayout,
        tile_height: u16,
        page_size: usize,
    ) -> Result<Self, CsvTileError> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let geometry = WindowGeometry::new(&layout, tile_height, page_size);
        log::info!(
            "input {:?}: {} bytes, read windows of {} bytes ({} pages of {} bytes)",
            path,
            file_size,
            geometry.byte_size,
            geometry.page_count,
            geometry.page_size
        );
        Ok(Self {
            file,
            file_size,
            layout,
            geometry,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    /// Maps the window at `offsets`, parses it into `matrix`, and moves
    /// `offsets` to the first unconsumed byte.
    ///
    /// Until the input ends, every chunk fills the whole matrix. When the
    /// window ends first, it is widened and parsed again, so rows longer than
    /// the declared layout are read whole.
    /// Each window is released before the next one is mapped and before this
    /// returns, on success or failure.
    pub fn read_chunk(
        &self,
        offsets: &mut ResumeOffsets,
        matrix: &mut Array2<f32>,
    ) -> Result<ChunkRead, CsvTileError> {
        let start_cursor = offsets.intra_window_offset() as usize;
        let mut extra = 0;

        loop {
            let wanted = self.geometry.mapped_len(start_cursor, extra);
            let window = ReadWindow::map(&self.file, self.file_size, offsets, wanted)?;
            let outcome = parse_rows(
                window.bytes(),
                start_cursor,
                window.reaches_eof(),
                &self.layout,
                matrix,
            );

            let full = outcome.read.rows == matrix.nrows();
            if full || outcome.read.finished || window.reaches_eof() {
                let absolute = window.start() + outcome.cursor as u64;
                *offsets = ResumeOffsets::at(absolute, self.geometry.page_size as u64);
                log::debug!(
                    "parsed {} rows, resume at {} (window {} + {})",
                    outcome.read.rows,
                    offsets.absolute_cursor(),
                    offsets.window_start(),
                    offsets.intra_window_offset()
                );
                return Ok(outcome.read);
            }

            extra = extra.max(self.geometry.byte_size) * 2;
            log::debug!(
                "window of {} bytes at {} ends inside row {}, remapping with {} extra bytes",
                window.bytes().len(),
                window.start(),
                outcome.read.rows,
                extra
            );
        }
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
