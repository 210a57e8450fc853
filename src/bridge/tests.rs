use super::*;
use crate::chunk_pipeline::traits::{ChunkSink, MemorySink};
use crate::config::TileConfig;
use crate::error::{CsvTileError, WriteFailure};
use crate::types::{Eol, RowInfo};
use std::fs;
use std::path::Path;

fn table(rows: usize, fields: usize) -> String {
    let mut out = String::new();
    for r in 0..rows {
        let line: Vec<String> = (0..fields).map(|c| format!("{}.25", r + c)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_resize_file_writes_tiles_and_full_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.csv");
    fs::write(&source, table(6, 6)).unwrap();
    let dest = dir.path().join("out");

    let mut config = TileConfig::new(&source, &dest);
    config.tile_width = 2;
    config.tile_height = 2;
    config.output_field_width = 6;

    let report = resize_file(&config).unwrap();

    assert_eq!(report.chunks, 2);
    assert_eq!(report.tiles_written, 4);
    assert_eq!(
        listing(&dest),
        vec![
            "resized_full.csv",
            "row000_col000.csv",
            "row000_col001.csv",
            "row001_col000.csv",
            "row001_col001.csv",
        ]
    );

    // Rows (0,1) and columns (0,1): mean of 0.25, 1.25, 1.25, 2.25.
    let first = fs::read_to_string(dest.join("row000_col000.csv")).unwrap();
    assert_eq!(first, "01.250,03.250\n03.250,05.250\n");
    let last = fs::read_to_string(dest.join("row001_col001.csv")).unwrap();
    assert_eq!(last, "09.250\n");

    let full = fs::read_to_string(dest.join(FULL_FILE_NAME)).unwrap();
    assert_eq!(
        full,
        "01.250,03.250,05.250\n03.250,05.250,07.250\n05.250,07.250,09.250\n"
    );
}

#[test]
fn test_non_empty_destination_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.csv");
    fs::write(&source, table(2, 2)).unwrap();
    let dest = dir.path().join("out");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("stale.csv"), "x").unwrap();

    let err = resize_file(&TileConfig::new(&source, &dest)).unwrap_err();
    assert!(matches!(
        err,
        CsvTileError::DestinationNotEmpty { entries: 1, .. }
    ));
    assert_eq!(err.exit_code(), 75);
}

#[test]
fn test_hidden_entries_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join(".keep"), "").unwrap();

    prepare_destination(&dest).unwrap();
}

#[test]
fn test_missing_destination_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a").join("b");
    prepare_destination(&dest).unwrap();
    assert!(dest.is_dir());
}

#[test]
fn test_missing_source_is_no_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = TileConfig::new(dir.path().join("absent.csv"), dir.path().join("out"));
    let err = resize_file(&config).unwrap_err();
    assert_eq!(err.exit_code(), 66);
}

#[test]
fn test_directory_sink_never_overwrites_a_tile() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    sink.write_tile(0, 0, b"01.000\n").unwrap();

    let err = sink.write_tile(0, 0, b"02.000\n").unwrap_err();
    assert!(matches!(
        err,
        CsvTileError::TileWrite {
            category: WriteFailure::AlreadyExists,
            ..
        }
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("row000_col000.csv")).unwrap(),
        "01.000\n"
    );
}

#[test]
fn test_directory_sink_appends_full_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    sink.append_full(b"1\n").unwrap();
    sink.append_full(b"2\n").unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join(FULL_FILE_NAME)).unwrap(),
        "1\n2\n"
    );
}

#[test]
fn test_directory_sink_reports_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path().join("missing"));
    let err = sink.write_tile(0, 0, b"x\n").unwrap_err();
    assert!(matches!(err, CsvTileError::TileWrite { .. }));
}

#[test]
fn test_resize_with_row_info_into_memory() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.csv");
    fs::write(&source, "1,3\r\n3,5\r\n").unwrap();

    let mut config = TileConfig::new(&source, dir.path().join("unused"));
    config.eol_mode = Eol::Dos;
    config.output_field_width = 5;
    let info = RowInfo {
        field_count: 2,
        byte_length: 5,
        detected_eol: Eol::Dos,
    };

    let mut sink = MemorySink::new();
    let report = resize_with_row_info(&config, info, &mut sink).unwrap();
    assert_eq!(report.rows_written, 1);
    assert_eq!(sink.full, b"3.000\r\n");
    assert!(!dir.path().join("unused").exists());
}

#[test]
fn test_invalid_config_is_rejected_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TileConfig::new(dir.path().join("in.csv"), dir.path().join("out"));
    config.tile_width = 0;
    let err = resize_file(&config).unwrap_err();
    assert!(matches!(err, CsvTileError::InvalidConfig(_)));
    assert!(!dir.path().join("out").exists());
}
