use std::io::Write;

use log::debug;

use crate::{bitstreams::BinaryWriter, HuffError, Result};

use super::{tree::{self, HuffmanTreeBuilder}, CodeEntry, CodeTable, FrequencyTable, LENGTH_BITS, SYMBOL_BITS};

/// Holds the code table computed for one buffer and writes table and payload.
#[derive(Clone, Debug)]
pub struct HuffmanEncoder {
    freq: FrequencyTable,
    table: CodeTable,
}

impl HuffmanEncoder {
    /// Counts the frequencies of `data`, builds the tree and assigns the codes.
    ///
    /// Empty input gets a placeholder one-entry table (symbol 0, code `0`), so
    /// that the table-size byte never has to express zero entries. Trees deeper
    /// than [`MAX_CODE_LEN`](super::MAX_CODE_LEN) fall back to length-limited canonical codes.
    pub fn build(data: &[u8]) -> Result<Self> {
        if u32::try_from(data.len()).is_err() {
            return Err(HuffError::InputTooLarge(data.len()));
        }

        let freq = FrequencyTable::from_bytes(data);

        let table = match HuffmanTreeBuilder::new().build(&freq) {
            Some(tree) => match tree.code_table() {
                Err(HuffError::CodeTooLong { symbol, max }) => {
                    debug!("symbol {} needs more than {} bits, limiting the code lengths", symbol, max);
                    tree::canonical_table(&tree::limited_code_lengths(&freq, max))?
                }
                table => table?,
            },
            None => CodeTable::from_entries(vec![CodeEntry::new(0, 0, 1)])?,
        };

        debug_assert!(table.is_prefix_free());
        debug!("built {} codes for {} symbols, longest is {} bits", table.len(), data.len(), table.max_length());

        Ok(Self { freq, table })
    }

    pub fn from_table(table: CodeTable) -> Self {
        Self { freq: FrequencyTable::default(), table }
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freq
    }

    /// Table-size byte (entries modulo 256) followed by one
    /// `symbol:8 | length:5 | code:length` triplet per entry.
    pub fn write_header<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<()> {
        writer.push_bits((self.table.len() % 256) as u32, 8)?;

        for entry in self.table.entries() {
            writer.push_bits(entry.symbol as u32, SYMBOL_BITS)?;
            writer.push_bits(entry.length, LENGTH_BITS)?;
            writer.push_bits(entry.code, entry.length as usize)?;
        }

        Ok(())
    }

    /// Symbol count on 32 bits, then the code of every symbol in order.
    /// Returns the number of payload bits, count excluded.
    pub fn write_body<W: Write>(&self, data: &[u8], writer: &mut BinaryWriter<W>) -> Result<u64> {
        let count = u32::try_from(data.len()).map_err(|_| HuffError::InputTooLarge(data.len()))?;
        writer.push_bits(count, 32)?;

        let mut bits = 0;
        for &x in data.iter() {
            bits += self.write_next(x, writer)? as u64;
        }

        Ok(bits)
    }

    #[inline(always)]
    pub fn write_next<W: Write>(&self, symbol: u8, writer: &mut BinaryWriter<W>) -> Result<usize> {
        let entry = self.table.get(symbol).ok_or(HuffError::UnknownSymbol(symbol))?;
        Ok(writer.push_bits(entry.code, entry.length as usize)?)
    }
}
