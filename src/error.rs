use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Bad magic tag {found:?} (expected {expected:?})")]
    BadMagic {
        expected: String,
        found: String,
    },
    #[error("Unexpected end of stream while reading the {0}")]
    Truncated(&'static str),
    #[error("Invalid code length {length} for symbol {symbol}")]
    InvalidCodeLength { symbol: u8, length: u32 },
    #[error("Symbol {0} appears twice in the code table")]
    DuplicateSymbol(u8),
    #[error("Symbol {0} has no code in the table")]
    UnknownSymbol(u8),
    #[error("No code in the table matches the bitstream at symbol {index}")]
    CorruptStream { index: usize },
    #[error("Symbol {symbol} needs a code longer than {max} bits")]
    CodeTooLong { symbol: u8, max: u32 },
    #[error("Input of {0} bytes does not fit a 32-bit symbol count")]
    InputTooLarge(usize),
    #[error("Residual buffer of {len} bytes is not a multiple of {width}")]
    ResidualShape { len: usize, width: usize },
    #[error("Grid geometry {rows}x{cols} does not match {samples} samples")]
    Geometry {
        rows: usize,
        cols: usize,
        samples: usize,
    },
    #[error("Invalid PAM image: {0}")]
    Pam(String),
}

pub type Result<T> = std::result::Result<T, HuffError>;
