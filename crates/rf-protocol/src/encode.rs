//! Code encoding
//!
//! Turns an integer code into the bit string a transmitter sends, and maps
//! bits onto protocol symbols.

use crate::error::ProtocolError;
use crate::protocol::{Protocol, DOUBLED_PROTOCOL};

/// Longest bit string a `u64` code can be rendered into
pub const MAX_BIT_LENGTH: u8 = 64;

/// Codes above this value are sent as 32 bits when no length is given
const WIDE_CODE_THRESHOLD: u64 = 16_777_216;

const SHORT_BIT_LENGTH: u8 = 24;
const LONG_BIT_LENGTH: u8 = 32;

/// A waveform symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Symbol {
    /// Frame boundary
    Sync,
    /// Logical zero
    Zero,
    /// Logical one
    One,
}

impl Symbol {
    /// Map a bit character onto its symbol
    ///
    /// Only `'0'` is a zero; every other character is sent as a one.
    pub fn from_bit(bit: char) -> Self {
        if bit == '0' {
            Symbol::Zero
        } else {
            Symbol::One
        }
    }
}

/// A code rendered for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bits as transmitted, MSB first
    pub bits: String,
    /// Number of source bits before any doubling
    pub source_bits: u8,
    /// Whether the bits were doubled for the self-clocking protocol
    pub doubled: bool,
}

impl Frame {
    /// Number of transmitted bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if the frame carries no bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Sync symbols sent per repeat: one leading and one trailing for the
    /// doubled protocol, a trailing one otherwise
    pub fn syncs_per_repeat(&self) -> u32 {
        if self.doubled {
            2
        } else {
            1
        }
    }
}

/// Pick the number of source bits for a transmission
///
/// An explicit length always wins. Otherwise the doubled protocol and codes
/// above 2^24 use 32 bits, everything else 24.
pub fn resolve_bit_length(protocol_index: u8, code: u64, bit_length: Option<u8>) -> u8 {
    match bit_length {
        Some(len) => len,
        None if protocol_index == DOUBLED_PROTOCOL => LONG_BIT_LENGTH,
        None if code > WIDE_CODE_THRESHOLD => LONG_BIT_LENGTH,
        None => SHORT_BIT_LENGTH,
    }
}

/// Render `code` as exactly `bit_length` binary digits, MSB first
pub fn render_bits(code: u64, bit_length: u8) -> Result<String, ProtocolError> {
    if bit_length == 0 || bit_length > MAX_BIT_LENGTH {
        return Err(ProtocolError::InvalidBitLength(bit_length));
    }
    if bit_length < MAX_BIT_LENGTH && code >> bit_length != 0 {
        return Err(ProtocolError::CodeTooWide { code, bit_length });
    }
    Ok(format!("{:0width$b}", code, width = usize::from(bit_length)))
}

/// Expand each bit into a self-clocking pair: `0` becomes `01`, `1` becomes `10`
pub fn expand_doubled(bits: &str) -> String {
    let mut out = String::with_capacity(bits.len() * 2);
    for bit in bits.chars() {
        out.push_str(if bit == '0' { "01" } else { "10" });
    }
    out
}

/// Render a code for the given protocol
///
/// # Panics
///
/// Panics if `protocol_index` is not in the protocol table.
pub fn encode_frame(protocol_index: u8, code: u64, bit_length: u8) -> Result<Frame, ProtocolError> {
    // Fail fast on a bad selection before doing any work
    Protocol::get(protocol_index);

    let raw = render_bits(code, bit_length)?;
    let doubled = Protocol::is_doubled(protocol_index);
    let bits = if doubled { expand_doubled(&raw) } else { raw };

    tracing::trace!(
        "Encoded code {} as {} bits for protocol {}",
        code,
        bits.len(),
        protocol_index
    );

    Ok(Frame {
        bits,
        source_bits: bit_length,
        doubled,
    })
}
