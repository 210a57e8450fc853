// In: src/bridge/stateless_api.rs

use crate::bridge::dest_dir::prepare_destination;
use crate::bridge::writer::DirectorySink;
use crate::chunk_pipeline::orchestrator::Pipeline;
use crate::chunk_pipeline::report::RunReport;
use crate::chunk_pipeline::traits::ChunkSink;
use crate::config::TileConfig;
use crate::error::CsvTileError;
use crate::types::RowInfo;

/// Resizes `config.source_path` into tiles under `config.dest_path`.
///
/// Validates the configuration, prepares the destination directory, probes the
/// first row, then runs the pipeline to completion.
pub fn resize_file(config: &TileConfig) -> Result<RunReport, CsvTileError> {
    config.validate()?;
    prepare_destination(&config.dest_path)?;
    let info = RowInfo::sniff(&config.source_path)?;

    let mut sink = DirectorySink::new(&config.dest_path);
    resize_with_row_info(config, info, &mut sink)
}

/// Runs the pipeline with precomputed first-row statistics into any sink.
///
/// The destination directory is not touched; that is the sink's business.
pub fn resize_with_row_info(
    config: &TileConfig,
    info: RowInfo,
    sink: &mut dyn ChunkSink,
) -> Result<RunReport, CsvTileError> {
    config.validate()?;
    Pipeline::new(config, info)?.run(sink)
}
