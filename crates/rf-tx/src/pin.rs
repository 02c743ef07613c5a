//! Pin driver abstraction
//!
//! The transmitter consumes a GPIO capability rather than talking to
//! hardware itself. Platform initialisation (wiringPi, sysfs, a HAL) happens
//! before a driver is handed over.

use thiserror::Error;

/// Platform pin number
pub type PinId = u32;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// High impedance
    Input,
    /// Driven by the transmitter
    Output,
}

/// Output level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

/// Errors reported by a pin driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PinError {
    /// Pin does not exist or is claimed elsewhere
    #[error("pin {0} is unavailable")]
    Unavailable(PinId),

    /// Driver-level I/O failure
    #[error("I/O error on pin {pin}: {reason}")]
    Io { pin: PinId, reason: String },
}

/// Minimal GPIO capability needed to key a transmitter
pub trait PinDriver {
    /// Set the direction of `pin`
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError>;

    /// Drive `pin` to `level` (pin must be in output mode)
    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), PinError>;
}

impl<T: PinDriver + ?Sized> PinDriver for &mut T {
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), PinError> {
        (**self).write_pin(pin, level)
    }
}

impl<T: PinDriver + ?Sized> PinDriver for Box<T> {
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), PinError> {
        (**self).write_pin(pin, level)
    }
}
