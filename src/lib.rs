pub mod bitstreams;
pub mod huffman;
pub mod codec;
pub mod delta;
pub mod pam;
pub mod cli;
mod error;

pub use error::{HuffError, Result};
pub use codec::{compress, compress_grid, decompress, decompress_grid, CompressionReport, Variant};
pub use delta::{forward_delta, inverse_delta, SampleGrid};
