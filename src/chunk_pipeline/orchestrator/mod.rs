pub mod core;

pub use self::core::{Pipeline, PipelineState};
