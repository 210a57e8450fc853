//! This module defines the canonical representation of an end-of-line marker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An end-of-line convention, either requested by configuration or detected
/// in the source file.
///
/// `Auto` means "let detection decide" in a configuration, and "inconclusive"
/// in a detection result.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Eol {
    #[default]
    Auto,
    /// `\n`
    Unix,
    /// `\r\n`
    Dos,
}

impl Eol {
    /// The terminator bytes, or `None` for `Auto`.
    pub fn marker(&self) -> Option<&'static [u8]> {
        match self {
            Eol::Auto => None,
            Eol::Unix => Some(b"\n"),
            Eol::Dos => Some(b"\r\n"),
        }
    }

    /// The terminator width in bytes (0 for `Auto`).
    pub fn width(&self) -> usize {
        self.marker().map_or(0, |m| m.len())
    }

    /// Reconciles the configured convention with the detected one.
    ///
    /// | configured \ detected | Unix  | Dos   | Auto  |
    /// |-----------------------|-------|-------|-------|
    /// | Unix                  | Unix  | Unix* | Unix* |
    /// | Dos                   | Dos*  | Dos   | Dos*  |
    /// | Auto                  | Unix  | Dos   | None  |
    ///
    /// `*` marks the combinations that log a warning. The configuration always
    /// wins when it is explicit.
    pub fn reconcile(configured: Eol, detected: Eol) -> Option<Eol> {
        match (configured, detected) {
            (Eol::Auto, Eol::Auto) => {
                log::error!(
                    "no end of line could be identified during detection, and no fallback was configured"
                );
                None
            }
            (Eol::Auto, detected) => Some(detected),
            (configured, Eol::Auto) => {
                log::warn!("no end of line was detected, falling back to configuration ({configured})");
                Some(configured)
            }
            (configured, detected) => {
                if configured != detected {
                    log::warn!(
                        "the configured end of line ({configured}) does not match the detected one ({detected}), falling back to configuration"
                    );
                }
                Some(configured)
            }
        }
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eol::Auto => f.write_str("AUTO"),
            Eol::Unix => f.write_str("UNIX (\\n)"),
            Eol::Dos => f.write_str("DOS (CR+LF)"),
        }
    }
}
