//! Error types for protocol lookup and code encoding

use thiserror::Error;

/// Errors that can occur while selecting a protocol or encoding a code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Protocol index outside the 1-based table
    #[error("invalid protocol index: {0} (expected 1..={max})", max = crate::PROTOCOL_COUNT)]
    InvalidIndex(u8),

    /// Bit length outside what a 64-bit code can fill
    #[error("invalid bit length: {0} (expected 1..={max})", max = crate::MAX_BIT_LENGTH)]
    InvalidBitLength(u8),

    /// Code does not fit in the requested number of bits
    #[error("code {code} does not fit in {bit_length} bits")]
    CodeTooWide { code: u64, bit_length: u8 },
}
