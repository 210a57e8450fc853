//! This module defines the core, strongly-typed descriptions of the input table
//! used throughout the csvtile pipeline.
//!
//! It includes the `Eol` enum shared by the configuration and the first-row
//! sniffer, and the `RowInfo` statistics record the row layout is derived from.

pub mod eol;
pub mod row_info;

// Re-export the main type(s) for easier access.
pub use eol::Eol;
pub use row_info::RowInfo;

/// The only field separator supported by the resizer.
pub const SEPARATOR: u8 = b',';
