// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the csvtile library. It wraps the pure
// `chunk_pipeline` engine with everything that touches the file system around it.
//
// Data Flow:
//
//   1. [Stateless API (resize_file)]        -> Receives a `TileConfig`
//         |
//         `-> a. `dest_dir` checks or creates the output directory
//         |
//         `-> b. `RowInfo::sniff` probes the first row of the source
//
//   2. [Pipeline Engine (chunk_pipeline::orchestrator)] -> one chunk at a time
//         |
//         `-> hands formatted byte buffers to a `ChunkSink`
//
//   3. [DirectorySink (writer)]             -> `row%03d_col%03d.csv` + `resized_full.csv`
//
// ====================================================================================
pub mod dest_dir;
pub mod format;
pub mod stateless_api;
pub mod writer;

pub use dest_dir::prepare_destination;
pub use format::{tile_file_name, FULL_FILE_NAME};
pub use stateless_api::{resize_file, resize_with_row_info};
pub use writer::DirectorySink;

#[cfg(test)]
mod tests;
