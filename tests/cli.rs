use std::{fs, path::Path, process::Command};

use huffdiff_rust::{pam, SampleGrid};

fn run(bin: &str, args: &[&Path]) -> i32 {
    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to launch the tool")
        .status
        .code()
        .unwrap_or(-1)
}

const HUFFMAN1: &str = env!("CARGO_BIN_EXE_huffman1");
const HUFFDIFF: &str = env!("CARGO_BIN_EXE_huffdiff");

#[test]
fn test_huffman1_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let packed = dir.path().join("input.huf");
    let restored = dir.path().join("restored.txt");

    let text = "Huffman coding assigns short codes to frequent bytes.\n".repeat(50);
    fs::write(&input, &text).unwrap();

    assert_eq!(run(HUFFMAN1, &[Path::new("c"), &input, &packed]), 0);
    assert!(fs::read(&packed).unwrap().starts_with(b"HUFFMAN1"));
    assert_eq!(run(HUFFMAN1, &[Path::new("d"), &packed, &restored]), 0);
    assert_eq!(fs::read(&restored).unwrap(), text.as_bytes());
}

#[test]
fn test_huffman1_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty");
    let packed = dir.path().join("empty.huf");
    let restored = dir.path().join("empty.out");
    fs::write(&input, b"").unwrap();

    assert_eq!(run(HUFFMAN1, &[Path::new("c"), &input, &packed]), 0);
    assert_eq!(run(HUFFMAN1, &[Path::new("d"), &packed, &restored]), 0);
    assert!(fs::read(&restored).unwrap().is_empty());
}

#[test]
fn test_usage_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::write(&input, b"abc").unwrap();

    assert_eq!(run(HUFFMAN1, &[Path::new("x"), &input, &output]), 1);
    assert_eq!(run(HUFFMAN1, &[Path::new("c"), &input]), 1);
    assert_eq!(run(HUFFDIFF, &[]), 1);
}

#[test]
fn test_missing_input_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does-not-exist");
    let output = dir.path().join("output");

    assert_eq!(run(HUFFMAN1, &[Path::new("c"), &input, &output]), 1);
    assert_eq!(run(HUFFDIFF, &[Path::new("c"), &input, &output]), 1);
}

#[test]
fn test_decoding_garbage_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage");
    let output = dir.path().join("output");
    fs::write(&input, b"NOTHUFFMAN AT ALL").unwrap();

    assert_eq!(run(HUFFMAN1, &[Path::new("d"), &input, &output]), 1);
    assert_eq!(run(HUFFDIFF, &[Path::new("d"), &input, &output]), 1);
}

#[test]
fn test_huffdiff_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("image.pam");
    let packed = dir.path().join("image.hdf");
    let restored = dir.path().join("restored.pam");
    let preview = dir.path().join("residuals.pam");

    let (rows, cols) = (16, 24);
    let data: Vec<u8> = (0..rows * cols).map(|i| ((i % cols) * 10 + (i / cols) * 3) as u8).collect();
    let grid = SampleGrid::from_vec(rows, cols, data).unwrap();
    pam::write_gray8(&input, &grid).unwrap();

    let status = Command::new(HUFFDIFF)
        .arg("c")
        .arg(&input)
        .arg(&packed)
        .arg("--residuals")
        .arg(&preview)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));
    assert!(fs::read(&packed).unwrap().starts_with(b"HUFFDIFF"));
    assert!(preview.exists());

    assert_eq!(run(HUFFDIFF, &[Path::new("d"), &packed, &restored]), 0);
    assert_eq!(fs::read(&restored).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn test_stats_are_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    let packed = dir.path().join("packed");
    fs::write(&input, b"mississippi").unwrap();

    let output = Command::new(HUFFMAN1)
        .arg("c")
        .arg(&input)
        .arg(&packed)
        .arg("--stats")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["symbols"], 11);
    assert_eq!(report["table_entries"], 4);
}
