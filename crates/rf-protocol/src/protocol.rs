//! Protocol table
//!
//! Timing definitions for the supported remote-socket protocols. Every
//! duration is expressed as a multiple of the protocol's pulse unit.

use crate::encode::Symbol;
use crate::error::ProtocolError;

/// Number of protocols in the table
pub const PROTOCOL_COUNT: u8 = 6;

/// Protocol used when a transmission does not name one
pub const DEFAULT_PROTOCOL: u8 = 1;

/// Index of the self-clocking protocol that sends every bit twice
pub const DOUBLED_PROTOCOL: u8 = 6;

/// Pulse timing of a single protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protocol {
    /// Base pulse length in microseconds
    pub pulse_unit_us: u32,
    /// Sync symbol high time (pulse units)
    pub sync_high: u32,
    /// Sync symbol low time (pulse units)
    pub sync_low: u32,
    /// Zero symbol high time (pulse units)
    pub zero_high: u32,
    /// Zero symbol low time (pulse units)
    pub zero_low: u32,
    /// One symbol high time (pulse units)
    pub one_high: u32,
    /// One symbol low time (pulse units)
    pub one_low: u32,
}

/// The protocol table, in index order (index 1 is `PROTOCOLS[0]`)
pub const PROTOCOLS: [Protocol; PROTOCOL_COUNT as usize] = [
    Protocol::new(350, (1, 31), (1, 3), (3, 1)),
    Protocol::new(650, (1, 10), (1, 2), (2, 1)),
    Protocol::new(100, (30, 71), (4, 11), (9, 6)),
    Protocol::new(380, (1, 6), (1, 3), (3, 1)),
    Protocol::new(500, (6, 14), (1, 2), (2, 1)),
    Protocol::new(200, (1, 10), (1, 5), (1, 1)),
];

impl Protocol {
    const fn new(
        pulse_unit_us: u32,
        sync: (u32, u32),
        zero: (u32, u32),
        one: (u32, u32),
    ) -> Self {
        Self {
            pulse_unit_us,
            sync_high: sync.0,
            sync_low: sync.1,
            zero_high: zero.0,
            zero_low: zero.1,
            one_high: one.0,
            one_low: one.1,
        }
    }

    /// Look up a protocol by its 1-based index
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `1..=PROTOCOL_COUNT`. Selections coming
    /// from outside the program should go through [`Protocol::try_get`]
    /// first.
    pub fn get(index: u8) -> &'static Protocol {
        match Self::try_get(index) {
            Ok(protocol) => protocol,
            Err(e) => panic!("{e}"),
        }
    }

    /// Look up a protocol by its 1-based index, rejecting unknown indices
    pub fn try_get(index: u8) -> Result<&'static Protocol, ProtocolError> {
        if index == 0 || index > PROTOCOL_COUNT {
            return Err(ProtocolError::InvalidIndex(index));
        }
        Ok(&PROTOCOLS[usize::from(index - 1)])
    }

    /// Returns true if `index` names a protocol in the table
    pub fn is_valid_index(index: u8) -> bool {
        (1..=PROTOCOL_COUNT).contains(&index)
    }

    /// Returns true if `index` is the doubled-bit protocol
    pub fn is_doubled(index: u8) -> bool {
        index == DOUBLED_PROTOCOL
    }

    /// High and low pulse counts for a symbol
    pub fn waveform(&self, symbol: Symbol) -> (u32, u32) {
        match symbol {
            Symbol::Sync => (self.sync_high, self.sync_low),
            Symbol::Zero => (self.zero_high, self.zero_low),
            Symbol::One => (self.one_high, self.one_low),
        }
    }

    /// Total pulse units of one symbol (high plus low)
    pub fn symbol_units(&self, symbol: Symbol) -> u32 {
        let (high, low) = self.waveform(symbol);
        high + low
    }

    /// On-air time of one frame in microseconds
    ///
    /// `syncs` is the number of sync symbols per frame: 2 for the doubled
    /// protocol (leading and trailing), 1 otherwise.
    pub fn frame_duration_us(&self, pulse_unit_us: u32, bits: &str, syncs: u32) -> u64 {
        let symbol_units: u64 = bits
            .chars()
            .map(|b| u64::from(self.symbol_units(Symbol::from_bit(b))))
            .sum();
        let sync_units = u64::from(syncs) * u64::from(self.symbol_units(Symbol::Sync));
        (symbol_units + sync_units) * u64::from(pulse_unit_us)
    }
}
