//! This module collects the pure, stateless kernels of the resizer.
//!
//! Kernels never touch the file system and never allocate beyond their own
//! return values. The `chunk_pipeline` composes them into the streaming loop.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Stage 1: Text -> Numbers
pub mod field_parse;

/// Stage 2: Resolution Reduction
pub mod subsample;

/// Stage 3: Numbers -> Fixed-Width Text
pub mod fixed_width;
