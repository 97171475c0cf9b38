use crate::{bitstreams::BinaryReader, HuffError, Result};

use super::{CodeEntry, CodeTable, LENGTH_BITS, SYMBOL_BITS};

/// Rebuilds the code table from the stream and decodes symbols by scanning it
/// in order of increasing code length.
#[derive(Clone, Default, Debug)]
pub struct HuffmanDecoder {
    table: Vec<CodeEntry>,
}

impl HuffmanDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the table-size byte and the triplets that follow it, then sorts
    /// the entries by length (ties by symbol), as [`read_next`](Self::read_next) expects.
    pub fn read_header(&mut self, reader: &mut BinaryReader) -> Result<()> {
        let mut num_entries = reader.read_int(8) as usize;
        if num_entries == 0 {
            num_entries = 256;
        }

        let mut table = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let symbol = reader.read_int(SYMBOL_BITS) as u8;
            let length = reader.read_int(LENGTH_BITS);
            if !reader.is_good() {
                return Err(HuffError::Truncated("code table"));
            }
            if length == 0 {
                return Err(HuffError::InvalidCodeLength { symbol, length });
            }
            let code = reader.read_int(length as usize);
            table.push(CodeEntry::new(symbol, code, length));
        }

        if !reader.is_good() {
            return Err(HuffError::Truncated("code table"));
        }

        table.sort_by_key(|e| (e.length, e.symbol));
        self.table = table;

        Ok(())
    }

    /// Decodes one symbol. Bits pulled in while probing a short code are kept
    /// when probing the longer ones.
    #[inline(always)]
    pub fn read_next(&self, reader: &mut BinaryReader, index: usize) -> Result<u8> {
        let mut curr_len = 0;
        let mut curr_code = 0u32;

        for entry in self.table.iter() {
            while curr_len < entry.length {
                curr_code = (curr_code << 1) | reader.read_int(1);
                curr_len += 1;
            }
            if curr_code == entry.code {
                return Ok(entry.symbol);
            }
        }

        Err(HuffError::CorruptStream { index })
    }

    /// Reads the 32-bit symbol count and decodes that many symbols.
    pub fn read_body(&self, reader: &mut BinaryReader) -> Result<Vec<u8>> {
        let to_read = reader.read_int(32) as usize;
        if !reader.is_good() {
            return Err(HuffError::Truncated("symbol count"));
        }

        // every symbol takes at least one bit
        let available = (reader.len() - reader.position()) * 8;
        let mut output_vec = Vec::with_capacity(to_read.min(available));

        for i in 0..to_read {
            let symbol = self.read_next(reader, i)?;
            if !reader.is_good() {
                return Err(HuffError::Truncated("payload"));
            }
            output_vec.push(symbol);
        }

        Ok(output_vec)
    }

    /// Entries in scan order.
    pub fn table(&self) -> &[CodeEntry] {
        &self.table
    }

    pub fn code_table(&self) -> Result<CodeTable> {
        CodeTable::from_entries(self.table.clone())
    }
}
