//! Pulse traces
//!
//! A trace is the recorded output of one pin as a list of high/low pulse
//! pairs, in the form a logic analyser capture would be read.

use rf_protocol::{Protocol, Symbol};
use rf_tx::{Level, PinId};
use serde::{Deserialize, Serialize};

/// One high period followed by one low period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pulse {
    /// High time in microseconds
    pub high_us: u64,
    /// Low time in microseconds
    pub low_us: u64,
}

/// Recorded pulses of a single pin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PulseTrace {
    /// Pin the pulses were recorded on
    pub pin: PinId,
    /// Pulses in transmission order
    pub pulses: Vec<Pulse>,
    /// Timing the pulses were sent with, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

impl PulseTrace {
    /// Build a trace from timestamped level writes
    ///
    /// A pulse starts at a high write and its low period runs until the next
    /// high write, or until `end_us` for the final pulse. Repeated writes of
    /// the same level are ignored.
    pub fn from_writes(pin: PinId, writes: &[(u64, Level)], end_us: u64) -> Self {
        let mut pulses = Vec::new();
        let mut rise: Option<u64> = None;
        let mut fall: Option<u64> = None;

        for &(at, level) in writes {
            match level {
                Level::High => {
                    if let (Some(r), Some(f)) = (rise, fall) {
                        pulses.push(Pulse {
                            high_us: f.saturating_sub(r),
                            low_us: at.saturating_sub(f),
                        });
                        rise = Some(at);
                        fall = None;
                    } else if rise.is_none() {
                        rise = Some(at);
                    }
                }
                Level::Low => {
                    if rise.is_some() && fall.is_none() {
                        fall = Some(at);
                    }
                }
            }
        }
        if let (Some(r), Some(f)) = (rise, fall) {
            pulses.push(Pulse {
                high_us: f.saturating_sub(r),
                low_us: end_us.saturating_sub(f),
            });
        }

        Self {
            pin,
            pulses,
            protocol: None,
        }
    }

    /// Attach the protocol timing the trace was recorded with
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Number of pulses
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// True if nothing was sent
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Total on-air time in microseconds
    pub fn total_duration_us(&self) -> u64 {
        self.pulses.iter().map(|p| p.high_us + p.low_us).sum()
    }

    /// Match each pulse exactly against a protocol's symbol waveforms
    ///
    /// `None` marks a pulse that is not any symbol at `pulse_unit_us`.
    pub fn symbols(&self, protocol: &Protocol, pulse_unit_us: u32) -> Vec<Option<Symbol>> {
        let unit = u64::from(pulse_unit_us);
        let candidates = [Symbol::Sync, Symbol::Zero, Symbol::One];
        self.pulses
            .iter()
            .map(|pulse| {
                candidates.into_iter().find(|&symbol| {
                    let (high, low) = protocol.waveform(symbol);
                    pulse.high_us == u64::from(high) * unit && pulse.low_us == u64::from(low) * unit
                })
            })
            .collect()
    }

    /// Count pulses that are sync symbols
    pub fn sync_count(&self, protocol: &Protocol, pulse_unit_us: u32) -> usize {
        self.symbols(protocol, pulse_unit_us)
            .into_iter()
            .filter(|s| *s == Some(Symbol::Sync))
            .count()
    }

    /// Bits between syncs, one string per frame
    ///
    /// Unknown pulses end up as `?` so a corrupted frame is still visible.
    pub fn frames(&self, protocol: &Protocol, pulse_unit_us: u32) -> Vec<String> {
        let mut frames = Vec::new();
        let mut current = String::new();
        for symbol in self.symbols(protocol, pulse_unit_us) {
            match symbol {
                Some(Symbol::Sync) => {
                    if !current.is_empty() {
                        frames.push(std::mem::take(&mut current));
                    }
                }
                Some(Symbol::Zero) => current.push('0'),
                Some(Symbol::One) => current.push('1'),
                None => current.push('?'),
            }
        }
        if !current.is_empty() {
            frames.push(current);
        }
        frames
    }

    /// Serialize the trace to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
