//! Error types for wavelet matrix construction.

use thiserror::Error;

/// Error variants for wavelet matrix construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested prefix is longer than the source sequence.
    #[error("requested prefix length {requested} exceeds source length {available}")]
    InvalidInput {
        /// Number of items requested from the source.
        requested: usize,
        /// Number of items the source holds.
        available: usize,
    },

    /// The requested width cannot address any symbol.
    #[error("invalid width: {0} bits")]
    InvalidWidth(u32),

    /// A symbol does not fit in the requested width.
    #[error("value {value} does not fit in {width} bits")]
    Overflow {
        /// The offending symbol.
        value: u64,
        /// The requested width in bits.
        width: u32,
    },
}

/// A specialized result type for wavelet matrix construction.
pub type Result<T> = std::result::Result<T, Error>;
