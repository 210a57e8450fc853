//! This file is the root of the `csvtile` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`chunk_pipeline`,
//!     `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a caller needs to run a resize.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod chunk_pipeline;
pub mod config;
pub mod error;
pub mod kernels;
pub mod types;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bridge::{resize_file, resize_with_row_info, DirectorySink};
pub use chunk_pipeline::{ChunkSink, MemorySink, Pipeline, RunReport};
pub use config::TileConfig;
pub use error::CsvTileError;
pub use types::{Eol, RowInfo};
