// In: src/config.rs

//! The single source of truth for all csvtile run parameters.
//!
//! This module defines the unified `TileConfig` struct, which is created once at
//! the application boundary (from a JSON document, command-line flags, or plain
//! Rust code) and then passed down, read-only, to the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CsvTileError;

pub use crate::types::Eol;

//==================================================================================
// I. Defaults
//==================================================================================

/// Provides a sensible default for `tile_width` and `tile_height` for serde.
fn default_tile_side() -> u16 {
    1000
}

fn default_min_field_width() -> u8 {
    5
}

fn default_max_field_width() -> u8 {
    7
}

fn default_output_field_width() -> u8 {
    8
}

//==================================================================================
// II. The Unified TileConfig
//==================================================================================

/// The single, unified configuration for one resizing run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TileConfig {
    /// Number of downsampled columns per output tile.
    #[serde(default = "default_tile_side")]
    pub tile_width: u16,

    /// Number of downsampled rows per output tile. A chunk reads twice as many
    /// source rows.
    #[serde(default = "default_tile_side")]
    pub tile_height: u16,

    /// Smallest expected byte width of an input field, separator excluded.
    #[serde(default = "default_min_field_width")]
    pub min_field_width: u8,

    /// Largest expected byte width of an input field, separator excluded.
    /// Every read window is sized from this value.
    #[serde(default = "default_max_field_width")]
    pub max_field_width: u8,

    /// Exact character width of every output field.
    #[serde(default = "default_output_field_width")]
    pub output_field_width: u8,

    /// Line terminator of the source, also used for the outputs.
    #[serde(default)]
    pub eol_mode: Eol,

    pub source_path: PathBuf,

    pub dest_path: PathBuf,

    /// If set, the run aborts once more than this many fields failed to parse.
    #[serde(default)]
    pub parse_error_limit: Option<u64>,
}

impl TileConfig {
    /// Creates a configuration with default geometry for the given paths.
    pub fn new(source_path: impl Into<PathBuf>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            tile_width: default_tile_side(),
            tile_height: default_tile_side(),
            min_field_width: default_min_field_width(),
            max_field_width: default_max_field_width(),
            output_field_width: default_output_field_width(),
            eol_mode: Eol::default(),
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            parse_error_limit: None,
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, CsvTileError> {
        let config: TileConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, CsvTileError> {
        log::info!("reading config file {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects geometries the pipeline cannot size buffers for.
    pub fn validate(&self) -> Result<(), CsvTileError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(CsvTileError::InvalidConfig(format!(
                "tile size must be non-zero, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if self.max_field_width == 0 || self.output_field_width == 0 {
            return Err(CsvTileError::InvalidConfig(
                "field widths must be non-zero".to_string(),
            ));
        }
        if self.min_field_width > self.max_field_width {
            return Err(CsvTileError::InvalidConfig(format!(
                "minimum field width {} is larger than the maximum {}",
                self.min_field_width, self.max_field_width
            )));
        }
        if self.source_path.as_os_str().is_empty() || self.dest_path.as_os_str().is_empty() {
            return Err(CsvTileError::InvalidConfig(
                "source and destination paths are required".to_string(),
            ));
        }
        Ok(())
    }
}
