//! This module serves as the streaming engine of the crate.
//!
//! It turns one source table into tiles, chunk by chunk, by composing the
//! lower-level kernels: map a window, parse it, downsample it, format the
//! result, and hand the bytes to a sink. Nothing in here touches output paths.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod layout;
pub mod offsets;

/// Maps page-aligned windows of the source and parses rows out of them.
pub mod reader;

pub mod artifact;
pub mod full_file;
pub mod tiles;

/// Drives the chunk loop.
pub mod orchestrator;

pub mod report;
pub mod traits;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::layout::RowLayout;
pub use self::offsets::ResumeOffsets;
pub use self::orchestrator::{Pipeline, PipelineState};
pub use self::report::RunReport;
pub use self::traits::{ChunkSink, MemorySink};
