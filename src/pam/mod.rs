//! Minimal reader/writer for single-channel PAM (`P7`) images.

use std::fs;
use std::path::Path;

use log::warn;

use crate::{delta::SampleGrid, HuffError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PamSamples {
    Gray8(SampleGrid<u8>),
    /// Samples of images with a MAXVAL above 255.
    Gray16(SampleGrid<u16>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PamImage {
    pub maxval: u32,
    pub samples: PamSamples,
}

fn next_line(bytes: &[u8], pos: &mut usize) -> Result<String> {
    if *pos >= bytes.len() {
        return Err(HuffError::Pam("empty file".into()));
    }

    let end = bytes[*pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| *pos + i);
    let line = String::from_utf8_lossy(&bytes[*pos..end]).into_owned();
    *pos = (end + 1).min(bytes.len());

    Ok(line)
}

/// Whitespace-separated header tokens, wherever the line breaks fall.
/// A `#` starts a comment that runs to the end of its line.
struct HeaderTokens<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderTokens<'a> {
    fn next_token(&mut self) -> Result<&'a str> {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Err(HuffError::Pam("header ends before ENDHDR".into()));
            }
            if self.bytes[self.pos] != b'#' {
                break;
            }
            while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
        }

        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }

        std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| HuffError::Pam("header token is not ASCII".into()))
    }

    fn value(&mut self, key: &str) -> Result<usize> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| HuffError::Pam(format!("invalid {} value {:?}", key, token)))
    }

    /// Skips the single whitespace byte that separates ENDHDR from the raster.
    fn end_of_header(mut self) -> usize {
        if self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        self.pos
    }
}

impl PamImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut pos = 0;

        if next_line(bytes, &mut pos)?.trim() != "P7" {
            return Err(HuffError::Pam("missing P7 signature".into()));
        }

        let mut width = None;
        let mut height = None;
        let mut depth = 1;
        let mut maxval = 255;

        let mut tokens = HeaderTokens { bytes, pos };
        loop {
            match tokens.next_token()? {
                "ENDHDR" => break,
                "WIDTH" => width = Some(tokens.value("WIDTH")?),
                "HEIGHT" => height = Some(tokens.value("HEIGHT")?),
                "DEPTH" => depth = tokens.value("DEPTH")?,
                "MAXVAL" => maxval = tokens.value("MAXVAL")?,
                "TUPLTYPE" => {
                    tokens.next_token()?;
                }
                other => warn!("Ignoring unknown PAM header token {}", other),
            }
        }
        let pos = tokens.end_of_header();

        let width = width.ok_or_else(|| HuffError::Pam("missing WIDTH".into()))?;
        let height = height.ok_or_else(|| HuffError::Pam("missing HEIGHT".into()))?;

        if depth != 1 {
            return Err(HuffError::Pam(format!("only single-channel images are supported, found DEPTH {}", depth)));
        }
        if maxval == 0 || maxval > u16::MAX as usize {
            return Err(HuffError::Pam(format!("MAXVAL {} out of range", maxval)));
        }

        let sample_bytes = if maxval <= u8::MAX as usize { 1 } else { 2 };
        let raster_len = width
            .checked_mul(height)
            .and_then(|count| count.checked_mul(sample_bytes))
            .ok_or_else(|| HuffError::Pam(format!("{}x{} image is too large", width, height)))?;
        let raster = &bytes[pos..];

        if raster.len() < raster_len {
            return Err(HuffError::Pam(format!(
                "raster holds {} bytes, {} expected",
                raster.len(),
                raster_len
            )));
        }

        let samples = if sample_bytes == 1 {
            PamSamples::Gray8(SampleGrid::from_vec(height, width, raster[..raster_len].to_vec())?)
        } else {
            let data = raster[..raster_len]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            PamSamples::Gray16(SampleGrid::from_vec(height, width, data)?)
        };

        Ok(Self { maxval: maxval as u32, samples })
    }

    pub fn width(&self) -> usize {
        match &self.samples {
            PamSamples::Gray8(grid) => grid.cols(),
            PamSamples::Gray16(grid) => grid.cols(),
        }
    }

    pub fn height(&self) -> usize {
        match &self.samples {
            PamSamples::Gray8(grid) => grid.rows(),
            PamSamples::Gray16(grid) => grid.rows(),
        }
    }
}

pub fn encode_gray8(grid: &SampleGrid<u8>) -> Vec<u8> {
    let header = format!(
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 1\nMAXVAL 255\nTUPLTYPE GRAYSCALE\nENDHDR\n",
        grid.cols(),
        grid.rows()
    );

    let mut bytes = Vec::with_capacity(header.len() + grid.len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(grid.data());
    bytes
}

pub fn write_gray8<P: AsRef<Path>>(path: P, grid: &SampleGrid<u8>) -> Result<()> {
    fs::write(path, encode_gray8(grid))?;
    Ok(())
}
