//! Container around the Huffman coder.
//!
//! Plain files: `HUFFMAN1 | table size | table | count | codes`.
//! Delta files: `HUFFDIFF | width | height | table size | table | count | codes`,
//! where the coded bytes are the little-endian 16-bit residuals of a grid.
//! Every multi-byte integer of the header is big-endian.

use std::io::Write;

use log::debug;
use serde::Serialize;

use crate::{
    bitstreams::{BinaryReader, BinaryWriter},
    delta::{self, Sample, SampleGrid},
    huffman::{huffman_decoder::HuffmanDecoder, huffman_encoder::HuffmanEncoder, CodeEntry},
    HuffError, Result,
};

pub const MAGIC_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Variant {
    Plain,
    Delta,
}

impl Variant {
    pub fn magic(&self) -> &'static [u8; MAGIC_LEN] {
        match self {
            Variant::Plain => b"HUFFMAN1",
            Variant::Delta => b"HUFFDIFF",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

/// Everything that precedes the code table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub variant: Variant,
    pub geometry: Option<Geometry>,
}

impl Header {
    pub fn plain() -> Self {
        Self { variant: Variant::Plain, geometry: None }
    }

    pub fn delta(width: u32, height: u32) -> Self {
        Self { variant: Variant::Delta, geometry: Some(Geometry { width, height }) }
    }

    pub fn write<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        for &b in self.variant.magic() {
            writer.push_bits(b as u32, 8)?;
        }

        if let Some(Geometry { width, height }) = self.geometry {
            writer.push_bits(width, 32)?;
            writer.push_bits(height, 32)?;
        }

        Ok(())
    }

    /// Reads a header and checks its magic tag against `variant`.
    pub fn read(reader: &mut BinaryReader, variant: Variant) -> Result<Self> {
        let mut magic = [0u8; MAGIC_LEN];
        for b in magic.iter_mut() {
            *b = reader.read_int(8) as u8;
        }

        if !reader.is_good() {
            return Err(HuffError::Truncated("magic tag"));
        }
        if &magic != variant.magic() {
            return Err(HuffError::BadMagic {
                expected: String::from_utf8_lossy(variant.magic()).into_owned(),
                found: String::from_utf8_lossy(&magic).into_owned(),
            });
        }

        let geometry = match variant {
            Variant::Plain => None,
            Variant::Delta => {
                let width = reader.read_int(32);
                let height = reader.read_int(32);
                if !reader.is_good() {
                    return Err(HuffError::Truncated("grid geometry"));
                }
                Some(Geometry { width, height })
            }
        };

        Ok(Self { variant, geometry })
    }
}

/// Summary of one compression run.
#[derive(Clone, Debug, Serialize)]
pub struct CompressionReport {
    pub variant: Variant,
    pub geometry: Option<Geometry>,
    pub symbols: usize,
    pub table_entries: usize,
    pub longest_code: u32,
    pub payload_bits: u64,
    pub compressed_bytes: usize,
    pub codes: Vec<CodeEntry>,
}

fn encode<W: Write>(header: Header, data: &[u8], os: W) -> Result<CompressionReport> {
    let encoder = HuffmanEncoder::build(data)?;

    for line in encoder.table().describe() {
        debug!("{}", line);
    }

    let mut writer = BinaryWriter::new(os);

    header.write(&mut writer)?;
    encoder.write_header(&mut writer)?;
    let payload_bits = encoder.write_body(data, &mut writer)?;

    let written_bits = writer.written_bits;
    writer.close()?;

    let table = encoder.table();
    Ok(CompressionReport {
        variant: header.variant,
        geometry: header.geometry,
        symbols: data.len(),
        table_entries: table.len(),
        longest_code: table.max_length(),
        payload_bits,
        compressed_bytes: written_bits.div_ceil(8),
        codes: table.entries().to_vec(),
    })
}

/// Compresses `data` into `os` using the plain layout.
pub fn compress<W: Write>(data: &[u8], os: W) -> Result<CompressionReport> {
    encode(Header::plain(), data, os)
}

/// Delta-transforms `grid` and compresses the residual bytes into `os`.
pub fn compress_grid<T: Sample, W: Write>(grid: &SampleGrid<T>, os: W) -> Result<CompressionReport> {
    let width = u32::try_from(grid.cols()).map_err(|_| HuffError::InputTooLarge(grid.cols()))?;
    let height = u32::try_from(grid.rows()).map_err(|_| HuffError::InputTooLarge(grid.rows()))?;

    let residuals = delta::forward_delta(grid);
    let bytes = delta::residuals_to_bytes(&residuals);
    debug!("{}x{} grid turned into {} residual bytes", width, height, bytes.len());

    encode(Header::delta(width, height), &bytes, os)
}

fn decode(input: &[u8], variant: Variant) -> Result<(Header, Vec<u8>)> {
    let mut reader = BinaryReader::new(input.into());

    let header = Header::read(&mut reader, variant)?;

    let mut decoder = HuffmanDecoder::new();
    decoder.read_header(&mut reader)?;
    let data = decoder.read_body(&mut reader)?;

    debug!("decoded {} symbols with {} codes", data.len(), decoder.table().len());
    Ok((header, data))
}

/// Restores the buffer stored by [`compress`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decode(input, Variant::Plain).map(|(_, data)| data)
}

/// Decodes the residual grid stored by [`compress_grid`], without inverting it.
pub fn decode_residuals(input: &[u8]) -> Result<SampleGrid<u16>> {
    let (header, bytes) = decode(input, Variant::Delta)?;
    let Geometry { width, height } = header.geometry.ok_or(HuffError::Truncated("grid geometry"))?;

    delta::bytes_to_residuals(&bytes, height as usize, width as usize)
}

/// Restores the grid stored by [`compress_grid`].
pub fn decompress_grid<T: Sample>(input: &[u8]) -> Result<SampleGrid<T>> {
    let residuals = decode_residuals(input)?;
    Ok(delta::inverse_delta(&residuals))
}

#[cfg(test)]
mod tests;
