// In: src/chunk_pipeline/orchestrator/core.rs

use std::fmt;
use std::time::Instant;

use ndarray::{s, Array2};
use serde::Serialize;

use crate::chunk_pipeline::artifact::ChunkArtifacts;
use crate::chunk_pipeline::layout::RowLayout;
use crate::chunk_pipeline::offsets::ResumeOffsets;
use crate::chunk_pipeline::reader::{ChunkRead, ChunkReader};
use crate::chunk_pipeline::report::RunReport;
use crate::chunk_pipeline::traits::ChunkSink;
use crate::config::TileConfig;
use crate::error::CsvTileError;
use crate::kernels::subsample::downsample_2x2;
use crate::types::RowInfo;

//==================================================================================
// 1. Driver States
//==================================================================================

/// The stage the driver is in. Errors escaping a stage are tagged with it.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    MapChunk,
    ParseChunk,
    Downsample,
    BuildTiles,
    WriteTiles,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

//==================================================================================
// 2. The Pipeline Driver
//==================================================================================

/// Owns the chunk loop of one run.
///
/// The resume cursor and the parsed matrix live here for the whole run. Every
/// other buffer (the mapped window, the downsampled matrix, the formatted
/// tiles) is created and dropped inside a single [`Pipeline::step`].
pub struct Pipeline<'a> {
    config: &'a TileConfig,
    layout: RowLayout,
    reader: ChunkReader,
    offsets: ResumeOffsets,
    parsed: Array2<f32>,
    state: PipelineState,
    report: RunReport,
    full_file_enabled: bool,
}

impl<'a> Pipeline<'a> {
    /// Derives the row layout and opens the source named by `config`.
    pub fn new(config: &'a TileConfig, info: RowInfo) -> Result<Self, CsvTileError> {
        let layout =
            RowLayout::derive(&info, config).map_err(|e| e.at_stage(PipelineState::Init))?;
        let reader = ChunkReader::open(&config.source_path, layout, config.tile_height)
            .map_err(|e| e.at_stage(PipelineState::Init))?;
        Ok(Self::with_reader(config, layout, reader))
    }

    /// Like [`Pipeline::new`], with an explicit mapping granularity.
    pub fn with_page_size(
        config: &'a TileConfig,
        info: RowInfo,
        page_size: usize,
    ) -> Result<Self, CsvTileError> {
        let layout =
            RowLayout::derive(&info, config).map_err(|e| e.at_stage(PipelineState::Init))?;
        let reader = ChunkReader::open_with_page_size(
            &config.source_path,
            layout,
            config.tile_height,
            page_size,
        )
        .map_err(|e| e.at_stage(PipelineState::Init))?;
        Ok(Self::with_reader(config, layout, reader))
    }

    fn with_reader(config: &'a TileConfig, layout: RowLayout, reader: ChunkReader) -> Self {
        let parsed = Array2::<f32>::zeros((config.tile_height as usize * 2, layout.field_count));
        log::info!(
            "row layout: {} fields ({} after downsampling), eol {}, at most {} bytes per row",
            layout.field_count,
            layout.output_columns(),
            layout.eol,
            layout.max_row_size
        );
        Pipeline {
            config,
            layout,
            reader,
            offsets: ResumeOffsets::start(),
            parsed,
            state: PipelineState::Init,
            report: RunReport::default(),
            full_file_enabled: true,
        }
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn offsets(&self) -> ResumeOffsets {
        self.offsets
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Runs chunks until the input is exhausted.
    pub fn run(mut self, sink: &mut dyn ChunkSink) -> Result<RunReport, CsvTileError> {
        let started = Instant::now();
        while self.state != PipelineState::Done {
            self.step(sink)?;
        }
        self.report.elapsed_ms = started.elapsed().as_millis();
        log::info!(
            "done: {} chunks, {} rows read, {} rows written, {} tiles",
            self.report.chunks,
            self.report.rows_read,
            self.report.rows_written,
            self.report.tiles_written
        );
        Ok(self.report)
    }

    /// Processes one chunk: map, parse, downsample, format, write.
    pub fn step(&mut self, sink: &mut dyn ChunkSink) -> Result<(), CsvTileError> {
        if self.state == PipelineState::Done {
            return Ok(());
        }
        let tile_row = self.report.chunks;

        // --- MapChunk / ParseChunk ---
        self.state = PipelineState::MapChunk;
        let read = self
            .reader
            .read_chunk(&mut self.offsets, &mut self.parsed)
            .map_err(|e| {
                let stage = match e {
                    CsvTileError::Map { .. } => PipelineState::MapChunk,
                    _ => PipelineState::ParseChunk,
                };
                e.at_stage(stage)
            })?;
        self.state = PipelineState::ParseChunk;
        self.record_read(&read)?;

        // --- Downsample ---
        self.state = PipelineState::Downsample;
        let downsampled = downsample_2x2(self.parsed.slice(s![..read.rows, ..]));
        debug_assert_eq!(downsampled.ncols(), self.layout.output_columns());
        if read.rows % 2 == 1 {
            log::warn!("dropping the unpaired last row of chunk {}", tile_row);
        }

        // --- BuildTiles ---
        self.state = PipelineState::BuildTiles;
        let eol = self.layout.eol.marker().unwrap_or(&b"\n"[..]);
        let artifacts = ChunkArtifacts::build(
            tile_row,
            downsampled.view(),
            self.config.tile_width as usize,
            self.config.output_field_width as usize,
            eol,
        );
        drop(downsampled);
        self.report.format_overflows += artifacts.format_overflows;
        self.report.layout_anomalies += artifacts.layout_anomalies;

        // --- WriteTiles ---
        self.state = PipelineState::WriteTiles;
        if artifacts.is_empty() {
            log::debug!("chunk {} produced no rows, nothing to write", tile_row);
        } else {
            self.write(&artifacts, sink);
        }

        log::info!(
            "chunk {}: {} rows read, {} rows written ({} bytes of combined rows)",
            tile_row,
            read.rows,
            artifacts.rows(),
            artifacts.full.total_byte_size()
        );
        log_metric!(
            "event" = "chunk_done",
            "chunk" = &tile_row,
            "rows_read" = &read.rows,
            "rows_written" = &artifacts.rows(),
            "groups" = &artifacts.groups.len(),
            "resume_at" = &self.offsets.absolute_cursor()
        );
        self.report.chunks += 1;

        self.state = if read.finished {
            PipelineState::Done
        } else {
            PipelineState::MapChunk
        };
        Ok(())
    }

    fn record_read(&mut self, read: &ChunkRead) -> Result<(), CsvTileError> {
        self.report.rows_read += read.rows as u64;
        self.report.malformed_fields += read.malformed_fields;
        self.report.width_anomalies += read.width_anomalies;

        if read.malformed_fields > 0 {
            log::warn!(
                "{} malformed field(s) in this chunk, {} so far",
                read.malformed_fields,
                self.report.malformed_fields
            );
        }
        if read.width_anomalies > 0 {
            log::debug!(
                "{} field(s) outside the declared width bounds",
                read.width_anomalies
            );
        }

        if let Some(limit) = self.config.parse_error_limit {
            if self.report.malformed_fields > limit {
                return Err(CsvTileError::TooManyParseErrors {
                    count: self.report.malformed_fields,
                    limit,
                }
                .at_stage(PipelineState::ParseChunk));
            }
        }
        Ok(())
    }

    fn write(&mut self, artifacts: &ChunkArtifacts, sink: &mut dyn ChunkSink) {
        for group in &artifacts.groups {
            match sink.write_tile(artifacts.tile_row, group.spec.index, group.bytes()) {
                Ok(()) => self.report.tiles_written += 1,
                Err(err) => {
                    self.report.tile_write_failures += 1;
                    log::error!(
                        "skipping tile row {} col {}: {}",
                        artifacts.tile_row,
                        group.spec.index,
                        err
                    );
                }
            }
        }

        if self.full_file_enabled {
            if let Err(err) = sink.append_full(artifacts.full.bytes()) {
                log::error!("{}; the combined file will not be written any further", err);
                self.full_file_enabled = false;
                self.report.full_file_disabled = true;
            }
        }
        self.report.rows_written += artifacts.rows() as u64;
    }
}
