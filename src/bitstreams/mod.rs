use std::io::{self, Write};

/// Packs bits MSB-first into a byte sink. Every completed byte goes to the
/// sink right away; the last partial byte is zero-padded by [`close`](BinaryWriter::close)
/// or, failing that, when the writer is dropped.
pub struct BinaryWriter<W: Write> {
    os: Option<W>,
    pub written_bits: usize,
    current: u8,
    free: usize,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(os: W) -> Self {
        BinaryWriter {
            os: Some(os),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }

    #[inline(always)]
    fn write(&mut self, b: u8) -> io::Result<()> {
        match self.os.as_mut() {
            Some(os) => os.write_all(&[b]),
            None => Err(io::Error::new(io::ErrorKind::Other, "bit writer already closed")),
        }
    }

    /// Stores the `len` lowest bits of `b` in the current byte. `len` must not exceed `free`.
    #[inline(always)]
    fn write_in_current(&mut self, b: u32, len: usize) -> io::Result<()> {
        debug_assert!(len <= self.free);

        self.free -= len;
        self.current |= ((b & ((1 << len) - 1)) << self.free) as u8;

        if self.free == 0 {
            self.write(self.current)?;
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len;
        Ok(())
    }

    /// Writes the `len` least significant bits of `x`, most significant first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u32, len: usize) -> io::Result<usize> {
        assert!(len <= 32, "Cannot write {} bits from a 32-bit integer", len);

        let mut left = len;
        while left > 0 {
            let chunk = left.min(self.free);
            left -= chunk;
            self.write_in_current(x >> left, chunk)?;
        }

        Ok(len)
    }

    /// Bits still missing to complete the current byte (0 when byte-aligned).
    pub fn pending_bits(&self) -> usize {
        (8 - self.free) % 8
    }

    fn flush_current(&mut self) -> io::Result<()> {
        if self.free < 8 {
            self.write(self.current)?;
            self.free = 8;
            self.current = 0;
        }
        Ok(())
    }

    /// Pads the partial byte with zeros, flushes the sink and hands it back.
    pub fn close(mut self) -> io::Result<W> {
        self.flush_current()?;

        let mut os = self
            .os
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "bit writer already closed"))?;
        os.flush()?;
        Ok(os)
    }
}

impl<W: Write> Drop for BinaryWriter<W> {
    fn drop(&mut self) {
        if self.os.is_some() {
            let _ = self.flush_current();
            if let Some(os) = self.os.as_mut() {
                let _ = os.flush();
            }
        }
    }
}

/// Reads bits MSB-first from an in-memory buffer, one byte at a time.
///
/// Reading past the end does not panic: the missing bits read as zero and the
/// reader stops being [good](BinaryReader::is_good).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryReader {
    is: Box<[u8]>,
    position: usize,
    pub read_bits: usize,
    current: u8,
    fill: usize,
    good: bool,
}

impl BinaryReader {
    pub fn new(input_stream: Box<[u8]>) -> Self {
        BinaryReader {
            is: input_stream,
            position: 0,
            read_bits: 0,
            current: 0,
            fill: 0,
            good: true,
        }
    }

    #[inline(always)]
    fn read(&mut self) -> Option<u8> {
        if self.position >= self.is.len() {
            return None;
        }

        self.position += 1;
        Some(self.is[self.position - 1])
    }

    #[inline(always)]
    fn refill(&mut self) -> bool {
        match self.read() {
            Some(b) => {
                self.current = b;
                self.fill = 8;
                true
            }
            None => {
                self.good = false;
                false
            }
        }
    }

    /// Reads the next `len` bits (at most 32) into the low end of the result.
    #[inline(always)]
    pub fn read_int(&mut self, len: usize) -> u32 {
        assert!(len <= 32, "Cannot read {} bits into a 32-bit integer", len);

        let mut x = 0u32;
        let mut left = len;

        while left > 0 {
            if self.fill == 0 && !self.refill() {
                return x.checked_shl(left as u32).unwrap_or(0);
            }

            let take = left.min(self.fill);
            self.fill -= take;
            left -= take;

            let bits = (self.current as u32 >> self.fill) & ((1 << take) - 1);
            x = (x << take) | bits;
            self.read_bits += take;
        }

        x
    }

    /// `false` once a read ran past the end of the source.
    pub fn is_good(&self) -> bool {
        self.good
    }

    /// Index of the next byte to be pulled from the source.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.is.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is.is_empty()
    }
}
