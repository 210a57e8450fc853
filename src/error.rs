// In: src/error.rs

//! This module defines the single, unified error type for the entire csvtile library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Errors fall into three families:
//! 1.  Fatal geometry/configuration errors, raised before any I/O happens.
//! 2.  Fatal resource errors (mapping the source, allocating chunk buffers).
//! 3.  Recoverable anomalies (tile writes, format overflows) which the pipeline
//!     logs and counts but never propagates out of a chunk.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

//==================================================================================
// 1. OS Failure Categories
//==================================================================================

/// Why mapping a window of the source file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFailure {
    PermissionDenied,
    Misaligned,
    UnsupportedTarget,
    OutOfMemory,
    InvalidRange,
    BeyondFileBounds,
    Other,
}

impl MapFailure {
    /// Classifies an `io::Error` returned by the mapping call.
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => MapFailure::PermissionDenied,
            io::ErrorKind::InvalidInput => MapFailure::Misaligned,
            io::ErrorKind::Unsupported | io::ErrorKind::IsADirectory => {
                MapFailure::UnsupportedTarget
            }
            io::ErrorKind::OutOfMemory => MapFailure::OutOfMemory,
            io::ErrorKind::AddrNotAvailable => MapFailure::InvalidRange,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::FileTooLarge => {
                MapFailure::BeyondFileBounds
            }
            _ => MapFailure::Other,
        }
    }
}

impl fmt::Display for MapFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MapFailure::PermissionDenied => "input file was not opened for reading",
            MapFailure::Misaligned => "offset or size is negative or not a multiple of the page size",
            MapFailure::UnsupportedTarget => "file does not support mapping",
            MapFailure::OutOfMemory => "out of memory",
            MapFailure::InvalidRange => "invalid addresses for input file",
            MapFailure::BeyondFileBounds => "addresses above the max offset of the input file",
            MapFailure::Other => "unexpected mapping failure",
        };
        f.write_str(msg)
    }
}

/// Why creating or writing an output file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    PermissionDenied,
    QuotaExhausted,
    NotWritable,
    AlreadyExists,
    Interrupted,
    NameTooLong,
    NotADirectory,
    Other,
}

impl WriteFailure {
    /// Classifies an `io::Error` returned while opening or writing an output file.
    pub fn classify(err: &io::Error) -> Self {
        use io::ErrorKind::*;
        match err.kind() {
            PermissionDenied => WriteFailure::PermissionDenied,
            StorageFull | QuotaExceeded => WriteFailure::QuotaExhausted,
            ReadOnlyFilesystem | IsADirectory | ExecutableFileBusy | WouldBlock | Unsupported => {
                WriteFailure::NotWritable
            }
            AlreadyExists => WriteFailure::AlreadyExists,
            Interrupted => WriteFailure::Interrupted,
            InvalidFilename => WriteFailure::NameTooLong,
            NotADirectory => WriteFailure::NotADirectory,
            _ => WriteFailure::Other,
        }
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            WriteFailure::PermissionDenied => "writing authorization to file denied",
            WriteFailure::QuotaExhausted => {
                "out of disk quota, too many inodes, or too many files opened"
            }
            WriteFailure::NotWritable => "file is not writable",
            WriteFailure::AlreadyExists => "file already exists",
            WriteFailure::Interrupted => "interrupted by a signal",
            WriteFailure::NameTooLong => "path element too long",
            WriteFailure::NotADirectory => "one of the elements in the path is not a directory",
            WriteFailure::Other => "unexpected write failure",
        };
        f.write_str(msg)
    }
}

//==================================================================================
// 2. The Unified Error
//==================================================================================

#[derive(Error, Debug)]
pub enum CsvTileError {
    // =========================================================================
    // === Configuration / Geometry Errors (fatal, raised before any I/O)
    // =========================================================================
    #[error("no end of line could be detected and the configuration asked for automatic detection")]
    AmbiguousLineEnding,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("the first row holds {0} field(s); at least 2 are needed to downsample")]
    TooFewFields(u32),

    #[error("the destination directory {path:?} contains {entries} non hidden entries but was expected to be empty")]
    DestinationNotEmpty { path: PathBuf, entries: usize },

    // =========================================================================
    // === Resource Errors (fatal)
    // =========================================================================
    #[error("MMAP: {category} (offset {offset}, length {len}): {source}")]
    Map {
        category: MapFailure,
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },

    // =========================================================================
    // === Parse / Format Anomalies
    // =========================================================================
    #[error("too many malformed fields: {count} exceeds the limit of {limit}")]
    TooManyParseErrors { count: u64, limit: u64 },

    /// Non-fatal: the value was truncated into its slot.
    #[error("value {value} does not fit in {width} characters")]
    FieldFormatOverflow { value: f32, width: usize },

    // =========================================================================
    // === Output Errors (recoverable per tile)
    // =========================================================================
    #[error("could not write {path:?}: {category}: {source}")]
    TileWrite {
        path: PathBuf,
        category: WriteFailure,
        #[source]
        source: io::Error,
    },

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the Serde JSON library, typically while loading a config file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Pipeline execution failed at stage '{stage}': {source}")]
    PipelineError {
        stage: String,
        #[source]
        source: Box<CsvTileError>,
    },
}

impl CsvTileError {
    /// Builds a `TileWrite` error, classifying the OS failure.
    pub fn tile_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CsvTileError::TileWrite {
            path: path.into(),
            category: WriteFailure::classify(&source),
            source,
        }
    }

    /// Wraps `self` with the name of the pipeline stage it escaped from.
    pub fn at_stage(self, stage: impl fmt::Display) -> Self {
        CsvTileError::PipelineError {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }

    /// The BSD `sysexits` status a process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        const EX_DATAERR: i32 = 65;
        const EX_NOINPUT: i32 = 66;
        const EX_SOFTWARE: i32 = 70;
        const EX_OSERR: i32 = 71;
        const EX_CANTCREAT: i32 = 73;
        const EX_IOERR: i32 = 74;
        const EX_TEMPFAIL: i32 = 75;

        match self {
            CsvTileError::AmbiguousLineEnding
            | CsvTileError::InvalidConfig(_)
            | CsvTileError::TooFewFields(_)
            | CsvTileError::TooManyParseErrors { .. }
            | CsvTileError::SerdeJson(_) => EX_DATAERR,
            CsvTileError::DestinationNotEmpty { .. } => EX_TEMPFAIL,
            CsvTileError::Map { category, .. } => match category {
                MapFailure::UnsupportedTarget
                | MapFailure::OutOfMemory
                | MapFailure::InvalidRange => EX_OSERR,
                _ => EX_SOFTWARE,
            },
            CsvTileError::FieldFormatOverflow { .. } => EX_SOFTWARE,
            CsvTileError::TileWrite { .. } => EX_CANTCREAT,
            CsvTileError::Io(e) => match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => EX_NOINPUT,
                _ => EX_IOERR,
            },
            CsvTileError::PipelineError { source, .. } => source.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_classification() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(WriteFailure::classify(&denied), WriteFailure::PermissionDenied);

        let exists = io::Error::from(io::ErrorKind::AlreadyExists);
        assert_eq!(WriteFailure::classify(&exists), WriteFailure::AlreadyExists);

        let full = io::Error::from(io::ErrorKind::StorageFull);
        assert_eq!(WriteFailure::classify(&full), WriteFailure::QuotaExhausted);
    }

    #[test]
    fn test_pipeline_error_keeps_inner_exit_code() {
        let err = CsvTileError::AmbiguousLineEnding.at_stage("MapChunk");
        assert_eq!(err.exit_code(), 65);
        assert!(err.to_string().contains("MapChunk"));
    }
}
