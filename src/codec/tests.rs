use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{bitstreams::BinaryReader, delta::SampleGrid, HuffError};

use super::*;

fn compressed(data: &[u8]) -> (CompressionReport, Vec<u8>) {
    let mut out = Vec::new();
    let report = compress(data, &mut out).unwrap();
    (report, out)
}

fn compressed_grid<T: Sample>(grid: &SampleGrid<T>) -> (CompressionReport, Vec<u8>) {
    let mut out = Vec::new();
    let report = compress_grid(grid, &mut out).unwrap();
    (report, out)
}

#[test]
fn test_plain_layout() {
    let (report, out) = compressed(b"aaaab");

    assert_eq!(&out[..MAGIC_LEN], b"HUFFMAN1");
    assert_eq!(out[MAGIC_LEN], 2);
    assert_eq!(report.variant, Variant::Plain);
    assert_eq!(report.geometry, None);
    assert_eq!(report.symbols, 5);
    assert_eq!(report.table_entries, 2);
    assert_eq!(report.payload_bits, 5);
    assert_eq!(report.compressed_bytes, out.len());

    // magic 64 + size 8 + two entries of 14 + count 32 + payload 5
    assert_eq!(out.len(), (64 + 8 + 28 + 32 + 5 + 7) / 8);
}

#[test]
fn test_count_is_big_endian() {
    let data = vec![7u8; 0x0102];
    let (_, out) = compressed(&data);

    // magic, size byte, then 'symbol:8 length:5 code:1' = 14 bits
    let mut reader = BinaryReader::new(out.into());
    reader.read_int(32);
    reader.read_int(32);
    reader.read_int(8 + 14);
    assert_eq!(reader.read_int(8), 0x00);
    assert_eq!(reader.read_int(8), 0x00);
    assert_eq!(reader.read_int(8), 0x01);
    assert_eq!(reader.read_int(8), 0x02);
}

#[test]
fn test_plain_round_trips() {
    let samples: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"x".to_vec(),
        b"aaaab".to_vec(),
        vec![0u8; 1000],
        (0..=255u8).collect(),
        b"It was the best of times, it was the worst of times".to_vec(),
    ];

    for data in samples {
        let (_, out) = compressed(&data);
        assert_eq!(decompress(&out).unwrap(), data);
    }
}

#[test]
fn test_random_plain_round_trips() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..10 {
        let len = rng.gen_range(0..20000);
        let skew = rng.gen_range(1..=8u32);
        let data: Vec<u8> = (0..len).map(|_| (rng.gen::<u32>() % 256 / skew.pow(2).max(1)) as u8).collect();

        let (report, out) = compressed(&data);
        assert_eq!(report.compressed_bytes, out.len());
        assert_eq!(decompress(&out).unwrap(), data);
    }
}

#[test]
fn test_empty_input() {
    let (report, out) = compressed(&[]);

    assert_eq!(report.symbols, 0);
    assert_eq!(report.payload_bits, 0);
    assert_eq!(report.table_entries, 1);
    assert!(decompress(&out).unwrap().is_empty());
}

#[test]
fn test_bad_magic() {
    let (_, mut out) = compressed(b"hello");
    out[0] = b'X';

    assert!(matches!(decompress(&out), Err(HuffError::BadMagic { .. })));
}

#[test]
fn test_variants_do_not_mix() {
    let (_, plain) = compressed(b"hello");
    assert!(matches!(decode_residuals(&plain), Err(HuffError::BadMagic { .. })));

    let grid = SampleGrid::from_vec(1, 2, vec![1u8, 2]).unwrap();
    let (_, delta) = compressed_grid(&grid);
    assert!(matches!(decompress(&delta), Err(HuffError::BadMagic { .. })));
}

#[test]
fn test_truncated_inputs() {
    assert!(matches!(decompress(&[]), Err(HuffError::Truncated(_))));
    assert!(matches!(decompress(b"HUFF"), Err(HuffError::Truncated(_))));
    assert!(matches!(decompress(b"HUFFMAN1"), Err(HuffError::Truncated(_))));
    assert!(matches!(decode_residuals(b"HUFFDIFF\x00\x00\x00\x01"), Err(HuffError::Truncated(_))));

    let (_, out) = compressed(b"a longer message that loses its tail");
    assert!(matches!(decompress(&out[..out.len() - 3]), Err(HuffError::Truncated(_))));
}

#[test]
fn test_grid_layout() {
    let grid = SampleGrid::from_vec(2, 3, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
    let (report, out) = compressed_grid(&grid);

    assert_eq!(&out[..MAGIC_LEN], b"HUFFDIFF");
    assert_eq!(&out[MAGIC_LEN..MAGIC_LEN + 4], &3u32.to_be_bytes());
    assert_eq!(&out[MAGIC_LEN + 4..MAGIC_LEN + 8], &2u32.to_be_bytes());
    assert_eq!(report.variant, Variant::Delta);
    assert_eq!(report.geometry, Some(Geometry { width: 3, height: 2 }));
    // two bytes per residual
    assert_eq!(report.symbols, 12);
}

#[test]
fn test_grid_round_trip() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..10 {
        let rows = rng.gen_range(1..50);
        let cols = rng.gen_range(1..50);
        // a smooth gradient with some noise, like a photograph
        let data: Vec<u8> = (0..rows * cols)
            .map(|i| ((i % cols) as u32 * 3 + (i / cols) as u32 + rng.gen_range(0..4)) as u8)
            .collect();
        let grid = SampleGrid::from_vec(rows, cols, data).unwrap();

        let (_, out) = compressed_grid(&grid);
        assert_eq!(decompress_grid::<u8>(&out).unwrap(), grid);
    }
}

#[test]
fn test_one_pixel_grid() {
    let grid = SampleGrid::from_vec(1, 1, vec![77u8]).unwrap();
    let (_, out) = compressed_grid(&grid);

    assert_eq!(decode_residuals(&out).unwrap().data(), &[77]);
    assert_eq!(decompress_grid::<u8>(&out).unwrap(), grid);
}

#[test]
fn test_sixteen_bit_grid_round_trip() {
    let grid = SampleGrid::from_vec(2, 2, vec![1000u16, 65535, 0, 12345]).unwrap();
    let (_, out) = compressed_grid(&grid);

    assert_eq!(decompress_grid::<u16>(&out).unwrap(), grid);
}

#[test]
fn test_constant_grid_compresses_well() {
    let grid = SampleGrid::from_vec(64, 64, vec![90u8; 64 * 64]).unwrap();
    let (report, out) = compressed_grid(&grid);

    // almost every residual is zero
    assert!(report.payload_bits < 2 * 64 * 64 + 64);
    assert!(out.len() < 64 * 64 / 2);
}

#[test]
fn test_geometry_mismatch() {
    let grid = SampleGrid::from_vec(2, 2, vec![1u8, 2, 3, 4]).unwrap();
    let (_, mut out) = compressed_grid(&grid);

    // claim a 3 pixel wide image
    out[MAGIC_LEN + 3] = 3;
    assert!(matches!(decompress_grid::<u8>(&out), Err(HuffError::Geometry { rows: 2, cols: 3, samples: 4 })));
}

#[test]
fn test_odd_residual_byte_count() {
    // a delta container whose payload holds 3 bytes
    let mut out = Vec::new();
    {
        let mut writer = BinaryWriter::new(&mut out);
        Header::delta(1, 1).write(&mut writer).unwrap();
        let encoder = HuffmanEncoder::build(&[1, 2, 3]).unwrap();
        encoder.write_header(&mut writer).unwrap();
        encoder.write_body(&[1, 2, 3], &mut writer).unwrap();
        writer.close().unwrap();
    }

    assert!(matches!(decode_residuals(&out), Err(HuffError::ResidualShape { len: 3, width: 2 })));
}

#[test]
fn test_report_serializes() {
    let (report, _) = compressed(b"ab");
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["variant"], "Plain");
    assert_eq!(json["symbols"], 2);
    assert_eq!(json["codes"].as_array().unwrap().len(), 2);
}
