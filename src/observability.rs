//! Observability hooks for the resizing pipeline.
//!
//! Everything goes through the `log` facade. The `log_metric!` macro emits one
//! structured key/value line per event so a run can be followed chunk by chunk,
//! and `init_logging` wires `env_logger` up for the command-line tool.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::CsvTileError;

/// Logs a structured key-value metric line at `debug` level.
///
/// # Example
/// ```
/// use csvtile::log_metric;
/// let rows = 4;
/// log_metric!("event" = "chunk_parsed", "rows" = &rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("CSVTILE_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Maps a `-v` count onto a level filter: 0 warn, 1 info, 2 debug, 3+ trace.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger once. Later calls are no-ops.
///
/// When `log_file` is given, records are appended to it instead of stderr.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<(), CsvTileError> {
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level_for_verbosity(verbosity));
        builder.parse_default_env();

        // Just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
