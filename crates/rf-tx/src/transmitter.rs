//! Transmitter
//!
//! Keys an OOK transmitter by toggling a single pin through the waveforms
//! of the selected protocol.
//!
//! # Threading
//!
//! A `Transmitter` is driven from one thread. Every waveform blocks that
//! thread for the pulse duration. The only cross-thread control is an
//! [`AbortHandle`], which clears the enabled flag; the running transmission
//! notices at the start of its next waveform, so an abort lands between
//! pulses and never mid-pulse.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rf_protocol::{encode_frame, resolve_bit_length, Protocol, Symbol, DEFAULT_PROTOCOL};
use tracing::{debug, info, trace, warn};

use crate::config::TransmitterConfig;
use crate::error::{ConfigError, TxError};
use crate::pin::{Level, PinDriver, PinId, PinMode};
use crate::sleep::Sleep;

/// Settings in effect for the most recent (or next) transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitterState {
    /// Pin being keyed
    pub pin: PinId,
    /// Active protocol index
    pub protocol: u8,
    /// Pulse length in microseconds
    pub pulse_unit_us: u32,
    /// Times each frame is sent
    pub repeat_count: u32,
    /// Transmitted bits per frame (after any doubling)
    pub bit_length: u8,
}

/// Cancels an in-flight transmission from another thread
#[derive(Debug, Clone)]
pub struct AbortHandle {
    enabled: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Disable transmit; the running transmission stops before its next pulse
    pub fn abort(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Returns true while transmit is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

/// Single-pin OOK transmitter
///
/// Owns the pin driver for its whole life. The pin is returned to input
/// mode by [`Transmitter::teardown`], or on drop if teardown was not called.
pub struct Transmitter<P: PinDriver, S: Sleep> {
    driver: P,
    sleeper: S,
    state: TransmitterState,
    tx_enabled: Arc<AtomicBool>,
    rx_enabled: bool,
    /// Pin is in output mode on our behalf (may outlive `tx_enabled` after an abort)
    driving: bool,
    released: bool,
    receive_tolerance_percent: u8,
}

impl<P: PinDriver, S: Sleep> Transmitter<P, S> {
    /// Create a transmitter from validated settings
    ///
    /// The pin is not touched until transmit or receive is enabled.
    pub fn new(config: TransmitterConfig, driver: P, sleeper: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let pulse_unit_us = config.effective_pulse_unit_us();

        Ok(Self {
            driver,
            sleeper,
            state: TransmitterState {
                pin: config.pin,
                protocol: config.protocol,
                pulse_unit_us,
                repeat_count: config.repeat,
                bit_length: config.bit_length,
            },
            tx_enabled: Arc::new(AtomicBool::new(false)),
            rx_enabled: false,
            driving: false,
            released: false,
            receive_tolerance_percent: config.receive_tolerance_percent,
        })
    }

    /// Get the pin number
    pub fn pin(&self) -> PinId {
        self.state.pin
    }

    /// Get the current transmission settings
    pub fn state(&self) -> &TransmitterState {
        &self.state
    }

    /// Get the pin driver
    pub fn driver(&self) -> &P {
        &self.driver
    }

    /// Get the receive timing tolerance in percent
    pub fn receive_tolerance_percent(&self) -> u8 {
        self.receive_tolerance_percent
    }

    /// Set how many times each frame is sent (at least once)
    pub fn set_repeat_count(&mut self, repeat: u32) -> Result<(), ConfigError> {
        if repeat == 0 {
            return Err(ConfigError::InvalidRepeat);
        }
        self.state.repeat_count = repeat;
        Ok(())
    }

    /// Returns true while transmit is enabled
    pub fn is_transmit_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    /// Returns true while receive holds the pin
    pub fn is_receive_enabled(&self) -> bool {
        self.rx_enabled
    }

    /// Handle for disabling transmit from another thread
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            enabled: Arc::clone(&self.tx_enabled),
        }
    }

    /// Put the pin into output mode and allow transmissions
    ///
    /// Fails with [`TxError::ReceiveActive`] without touching the pin if
    /// receive is enabled. Enabling twice is a no-op.
    pub fn enable_transmit(&mut self) -> Result<(), TxError> {
        if self.rx_enabled {
            debug!("Transmit enable refused on pin {}: receive active", self.state.pin);
            return Err(TxError::ReceiveActive);
        }
        if !self.is_transmit_enabled() {
            self.driver.set_pin_mode(self.state.pin, PinMode::Output)?;
            self.driving = true;
            self.released = false;
            self.tx_enabled.store(true, Ordering::Release);
            info!("Transmit enabled on pin {}", self.state.pin);
        }
        Ok(())
    }

    /// Return the pin to input mode and stop transmissions
    ///
    /// Always safe to call, including after an abort.
    pub fn disable_transmit(&mut self) -> Result<(), TxError> {
        let was_enabled = self.tx_enabled.swap(false, Ordering::AcqRel);
        if was_enabled || self.driving {
            self.driver.set_pin_mode(self.state.pin, PinMode::Input)?;
            self.driving = false;
            info!("Transmit disabled on pin {}", self.state.pin);
        }
        Ok(())
    }

    /// Claim the pin for receiving
    ///
    /// Only the receive flag and pin direction are managed here; it exists so
    /// transmit and receive never drive the same pin at once.
    pub fn enable_receive(&mut self) -> Result<(), TxError> {
        if self.is_transmit_enabled() {
            debug!("Receive enable refused on pin {}: transmit active", self.state.pin);
            return Err(TxError::TransmitActive);
        }
        if !self.rx_enabled {
            self.driver.set_pin_mode(self.state.pin, PinMode::Input)?;
            self.rx_enabled = true;
            self.released = false;
            info!("Receive enabled on pin {}", self.state.pin);
        }
        Ok(())
    }

    /// Release the pin from receiving
    pub fn disable_receive(&mut self) -> Result<(), TxError> {
        if self.rx_enabled {
            self.rx_enabled = false;
            info!("Receive disabled on pin {}", self.state.pin);
        }
        Ok(())
    }

    /// Disable transmit and receive and leave the pin in input mode
    pub fn teardown(&mut self) -> Result<(), TxError> {
        self.disable_transmit()?;
        self.disable_receive()?;
        self.driver.set_pin_mode(self.state.pin, PinMode::Input)?;
        self.released = true;
        info!("Released pin {}", self.state.pin);
        Ok(())
    }

    /// Encode `code` and transmit it `repeat_count` times
    ///
    /// Without an explicit `protocol` the transmission uses protocol 1, not
    /// the protocol of the previous call. The pulse unit carries over between
    /// calls unless overridden, so switching protocol keeps the pulse length
    /// chosen at construction. Overrides are remembered in [`Self::state`].
    ///
    /// # Panics
    ///
    /// Panics if `protocol` is not a valid protocol index.
    ///
    /// # Errors
    ///
    /// Besides [`TxError::NotEnabled`] and pin failures, a code that does not
    /// fit the resolved bit length fails with [`TxError::Encode`] before
    /// anything is sent. Note that `16_777_216` (2^24) is not above the
    /// 32-bit threshold, so without an explicit `bit_length` it gets 24 bits
    /// and is rejected.
    pub fn transmit_code(
        &mut self,
        code: u64,
        protocol: Option<u8>,
        pulse_unit_us: Option<u32>,
        bit_length: Option<u8>,
    ) -> Result<(), TxError> {
        let protocol_index = protocol.unwrap_or(DEFAULT_PROTOCOL);
        let proto = Protocol::get(protocol_index);
        self.state.protocol = protocol_index;

        if let Some(pulse) = pulse_unit_us {
            if pulse == 0 {
                return Err(TxError::InvalidPulseUnit);
            }
            self.state.pulse_unit_us = pulse;
        }

        let source_bits = resolve_bit_length(protocol_index, code, bit_length);
        self.state.bit_length = source_bits;

        let frame = encode_frame(protocol_index, code, source_bits)?;
        self.state.bit_length = u8::try_from(frame.len()).unwrap_or(u8::MAX);

        debug!(
            "Sending code {} on pin {}: protocol {}, {} bits, {} us pulse, {} repeats, {} us per frame",
            code,
            self.state.pin,
            protocol_index,
            frame.len(),
            self.state.pulse_unit_us,
            self.state.repeat_count,
            proto.frame_duration_us(
                self.state.pulse_unit_us,
                &frame.bits,
                frame.syncs_per_repeat()
            )
        );

        self.transmit_bits(&frame.bits)
    }

    /// Transmit a bit string with the active protocol, `repeat_count` times
    ///
    /// Each repeat is the bit symbols followed by a sync; the doubled
    /// protocol also leads each repeat with a sync. Stops at the first
    /// waveform that fails.
    pub fn transmit_bits(&mut self, bits: &str) -> Result<(), TxError> {
        if !self.is_transmit_enabled() {
            return Err(TxError::NotEnabled);
        }
        let proto = *Protocol::get(self.state.protocol);
        let leading_sync = Protocol::is_doubled(self.state.protocol);
        let mut sent_any = false;

        for repeat in 0..self.state.repeat_count {
            let result = self.transmit_repeat(&proto, bits, leading_sync, &mut sent_any);
            match result {
                Ok(()) => {}
                Err(TxError::NotEnabled) if sent_any => {
                    warn!(
                        "Transmission on pin {} aborted after {} of {} repeats",
                        self.state.pin, repeat, self.state.repeat_count
                    );
                    return Err(TxError::Aborted {
                        completed_repeats: repeat,
                    });
                }
                Err(e) => {
                    if !matches!(e, TxError::NotEnabled) {
                        warn!("Transmission on pin {} failed: {}", self.state.pin, e);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn transmit_repeat(
        &mut self,
        proto: &Protocol,
        bits: &str,
        leading_sync: bool,
        sent_any: &mut bool,
    ) -> Result<(), TxError> {
        if leading_sync {
            self.emit_symbol(proto, Symbol::Sync)?;
            *sent_any = true;
        }
        for bit in bits.chars() {
            self.emit_symbol(proto, Symbol::from_bit(bit))?;
            *sent_any = true;
        }
        self.emit_symbol(proto, Symbol::Sync)?;
        *sent_any = true;
        Ok(())
    }

    fn emit_symbol(&mut self, proto: &Protocol, symbol: Symbol) -> Result<(), TxError> {
        let (high, low) = proto.waveform(symbol);
        self.emit_waveform(high, low)
    }

    /// Drive the pin high for `high_units` pulses, then low for `low_units`
    ///
    /// Fails with [`TxError::NotEnabled`] without touching the pin when
    /// transmit is disabled.
    pub fn emit_waveform(&mut self, high_units: u32, low_units: u32) -> Result<(), TxError> {
        if !self.is_transmit_enabled() {
            return Err(TxError::NotEnabled);
        }
        let pin = self.state.pin;
        let unit = u64::from(self.state.pulse_unit_us);
        trace!("Waveform on pin {}: {}H {}L x {} us", pin, high_units, low_units, unit);

        self.driver.write_pin(pin, Level::High)?;
        self.sleeper
            .sleep(Duration::from_micros(u64::from(high_units) * unit));
        self.driver.write_pin(pin, Level::Low)?;
        self.sleeper
            .sleep(Duration::from_micros(u64::from(low_units) * unit));
        Ok(())
    }
}

impl<P: PinDriver, S: Sleep> Drop for Transmitter<P, S> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.teardown() {
                warn!("Failed to release pin {}: {}", self.state.pin, e);
            }
        }
    }
}

impl<P: PinDriver, S: Sleep> std::fmt::Debug for Transmitter<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transmitter")
            .field("state", &self.state)
            .field("tx_enabled", &self.is_transmit_enabled())
            .field("rx_enabled", &self.rx_enabled)
            .finish_non_exhaustive()
    }
}
