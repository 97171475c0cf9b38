pub mod tree;
pub mod huffman_encoder;
pub mod huffman_decoder;

use std::collections::HashMap;

use serde::Serialize;

use crate::{HuffError, Result};

/// Longest code the 5-bit length field can describe.
pub const MAX_CODE_LEN: u32 = 31;
/// Width of the length field of every table triplet.
pub const LENGTH_BITS: usize = 5;
pub const SYMBOL_BITS: usize = 8;
pub const K_NUM_SYMBOLS: usize = 256;

/// Occurrences of every byte value present in a buffer.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    freq_map: HashMap<u8, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &x in data.iter() {
            table.freq_map.entry(x).and_modify(|freq| *freq += 1).or_insert(1);
        }
        table
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.freq_map.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.freq_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq_map.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.freq_map.values().sum()
    }

    /// Iterates `(symbol, count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.freq_map.iter().map(|(&s, &f)| (s, f))
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let freq_map = iter.into_iter().filter(|&(_, f)| f > 0).collect();
        Self { freq_map }
    }
}

/// One row of the code table: `length` bits of `code` stand for `symbol`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CodeEntry {
    pub symbol: u8,
    pub code: u32,
    pub length: u32,
}

impl CodeEntry {
    pub fn new(symbol: u8, code: u32, length: u32) -> Self {
        Self { symbol, code, length }
    }

    /// `true` if the bits of `self` start the bits of `other`.
    pub fn is_prefix_of(&self, other: &CodeEntry) -> bool {
        self.length <= other.length && other.code >> (other.length - self.length) == self.code
    }
}

/// Symbol to code mapping, kept in the order the entries were produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
    index: [Option<usize>; K_NUM_SYMBOLS],
}

impl Default for CodeTable {
    fn default() -> Self {
        Self { entries: Vec::new(), index: [None; K_NUM_SYMBOLS] }
    }
}

impl CodeTable {
    /// Builds a table from already assigned entries, checking that every one of
    /// them can be serialized and that no symbol repeats.
    pub fn from_entries(entries: Vec<CodeEntry>) -> Result<Self> {
        let mut table = CodeTable::default();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    pub(crate) fn insert(&mut self, entry: CodeEntry) -> Result<()> {
        if entry.length == 0 || entry.length > MAX_CODE_LEN {
            return Err(HuffError::InvalidCodeLength { symbol: entry.symbol, length: entry.length });
        }
        if entry.code >> entry.length != 0 {
            return Err(HuffError::InvalidCodeLength { symbol: entry.symbol, length: entry.length });
        }
        if self.index[entry.symbol as usize].is_some() {
            return Err(HuffError::DuplicateSymbol(entry.symbol));
        }

        self.index[entry.symbol as usize] = Some(self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    #[inline(always)]
    pub fn get(&self, symbol: u8) -> Option<&CodeEntry> {
        self.index[symbol as usize].map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_length(&self) -> u32 {
        self.entries.iter().map(|e| e.length).max().unwrap_or(0)
    }

    /// No code is a prefix of a different code.
    pub fn is_prefix_free(&self) -> bool {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| (e.length, e.code));

        for (i, short) in sorted.iter().enumerate() {
            if sorted[i + 1..].iter().any(|long| short.is_prefix_of(long)) {
                return false;
            }
        }
        true
    }

    /// Bits the payload takes when the symbols of `freq` are coded with this table.
    pub fn payload_bits(&self, freq: &FrequencyTable) -> u64 {
        freq.iter()
            .map(|(s, f)| f * self.get(s).map_or(0, |e| e.length as u64))
            .sum()
    }

    /// Human readable dump, shortest codes first.
    pub fn describe(&self) -> Vec<String> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| (e.length, e.symbol));

        sorted
            .iter()
            .map(|e| {
                let code = format!("{:0width$b}", e.code, width = e.length as usize);
                if e.symbol.is_ascii_graphic() {
                    format!("{} {}", e.symbol as char, code)
                } else {
                    format!("0x{:02x} {}", e.symbol, code)
                }
            })
            .collect()
    }
}
