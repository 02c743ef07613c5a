//! RF Transmitter
//!
//! This crate keys a 433 MHz OOK transmitter wired to a GPIO pin, sending
//! integer codes with the protocols from `rf-protocol`.
//!
//! # Architecture
//!
//! The transmitter consumes two capabilities:
//!
//! - A [`PinDriver`] that can set a pin's direction and level
//! - A [`Sleep`] that blocks for microsecond-scale durations
//!
//! [`Transmitter`] owns both and walks the waveform of every symbol: drive
//! high, hold, drive low, hold. Transmit and receive are mutually
//! exclusive on the pin, and the pin is released on teardown or drop.
//!
//! # Example
//!
//! ```rust,no_run
//! use rf_tx::{Level, PinDriver, PinError, PinId, PinMode, SpinSleep, Transmitter, TransmitterConfig};
//!
//! struct Gpio;
//!
//! impl PinDriver for Gpio {
//!     fn set_pin_mode(&mut self, _pin: PinId, _mode: PinMode) -> Result<(), PinError> {
//!         Ok(())
//!     }
//!
//!     fn write_pin(&mut self, _pin: PinId, _level: Level) -> Result<(), PinError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut tx = Transmitter::new(TransmitterConfig::new(0), Gpio, SpinSleep::default()).unwrap();
//! tx.enable_transmit().unwrap();
//! tx.transmit_code(1_361, None, None, None).unwrap();
//! tx.teardown().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod pin;
pub mod sleep;
pub mod transmitter;

pub use config::TransmitterConfig;
pub use error::{ConfigError, TxError};
pub use pin::{Level, PinDriver, PinError, PinId, PinMode};
pub use sleep::{Sleep, SpinSleep, ThreadSleep};
pub use transmitter::{AbortHandle, Transmitter, TransmitterState};

// Re-export protocol types callers need alongside the transmitter
pub use rf_protocol::{Protocol, ProtocolError};
