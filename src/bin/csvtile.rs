use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use csvtile::observability::init_logging;
use csvtile::{resize_file, CsvTileError, Eol, TileConfig};

/// Downsample a large numeric CSV table 2x2 and split it into fixed-width tiles.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Source table.
    source: Option<PathBuf>,

    /// Output directory. Created if missing, must not contain visible entries.
    dest: Option<PathBuf>,

    /// JSON configuration file. Flags given on the command line take precedence.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output columns per tile (0 = default).
    #[arg(short = 'w', long)]
    tile_width: Option<u16>,

    /// Output rows per tile (0 = default).
    #[arg(short = 'H', long)]
    tile_height: Option<u16>,

    /// Smallest expected input field width in bytes (0 = default).
    #[arg(short = 'm', long)]
    min_field_width: Option<u8>,

    /// Largest expected input field width in bytes (0 = default).
    #[arg(short = 'M', long)]
    max_field_width: Option<u8>,

    /// Width of every output field in characters (0 = default).
    #[arg(short = 'o', long)]
    output_field_width: Option<u8>,

    /// The source uses CR+LF line ends.
    #[arg(long, conflicts_with = "unix")]
    dos: bool,

    /// The source uses LF line ends.
    #[arg(long)]
    unix: bool,

    /// Abort once more than this many fields failed to parse.
    #[arg(long, value_name = "N")]
    parse_error_limit: Option<u64>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Append log records to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    report_json: bool,
}

/// Uses `value` unless it is zero, in which case `default` wins.
fn non_zero<T: PartialEq + Default>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

fn build_config(args: &Args) -> Result<TileConfig> {
    let mut config = match &args.config {
        Some(path) => TileConfig::from_json_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None => match (&args.source, &args.dest) {
            (Some(source), Some(dest)) => TileConfig::new(source, dest),
            _ => bail!("a source and a destination are required without --config"),
        },
    };
    let defaults = TileConfig::new(PathBuf::new(), PathBuf::new());

    if let Some(source) = &args.source {
        config.source_path = source.clone();
    }
    if let Some(dest) = &args.dest {
        config.dest_path = dest.clone();
    }
    if let Some(v) = args.tile_width {
        config.tile_width = non_zero(v, defaults.tile_width);
    }
    if let Some(v) = args.tile_height {
        config.tile_height = non_zero(v, defaults.tile_height);
    }
    if let Some(v) = args.min_field_width {
        config.min_field_width = non_zero(v, defaults.min_field_width);
    }
    if let Some(v) = args.max_field_width {
        config.max_field_width = non_zero(v, defaults.max_field_width);
    }
    if let Some(v) = args.output_field_width {
        config.output_field_width = non_zero(v, defaults.output_field_width);
    }
    if args.dos {
        config.eol_mode = Eol::Dos;
    } else if args.unix {
        config.eol_mode = Eol::Unix;
    }
    if args.parse_error_limit.is_some() {
        config.parse_error_limit = args.parse_error_limit;
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.log_file.as_deref())?;
    let config = build_config(&args)?;
    log::info!(
        "resizing {} into {} ({}x{} tiles)",
        config.source_path.display(),
        config.dest_path.display(),
        config.tile_width,
        config.tile_height
    );

    let report = resize_file(&config)?;

    if args.report_json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else if !report.is_clean() {
        log::warn!(
            "finished with anomalies: {} malformed fields, {} format overflows, {} failed tiles",
            report.malformed_fields,
            report.format_overflows,
            report.tile_write_failures
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("csvtile: {err:#}");
        let code = err
            .downcast_ref::<CsvTileError>()
            .map_or(1, CsvTileError::exit_code);
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_and_zero_means_default() {
        let args = Args::parse_from([
            "csvtile", "in.csv", "out", "-w", "0", "-H", "3", "-o", "9", "--dos",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.tile_width, 1000);
        assert_eq!(config.tile_height, 3);
        assert_eq!(config.output_field_width, 9);
        assert_eq!(config.eol_mode, Eol::Dos);
        assert_eq!(config.source_path, PathBuf::from("in.csv"));
    }

    #[test]
    fn test_paths_are_required_without_config() {
        let args = Args::parse_from(["csvtile", "in.csv"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_dos_and_unix_conflict() {
        assert!(Args::try_parse_from(["csvtile", "a", "b", "--dos", "--unix"]).is_err());
    }
}
