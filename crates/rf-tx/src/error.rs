//! Error types for the transmitter

use thiserror::Error;

use rf_protocol::ProtocolError;

use crate::pin::PinError;

/// Errors that can occur while keying the transmitter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Transmit is not enabled on the pin
    #[error("transmit is not enabled")]
    NotEnabled,

    /// Transmit was disabled while a transmission was in flight
    #[error("transmission aborted after {completed_repeats} complete repeats")]
    Aborted { completed_repeats: u32 },

    /// Receive holds the pin
    #[error("receive is active on the pin")]
    ReceiveActive,

    /// Transmit holds the pin
    #[error("transmit is active on the pin")]
    TransmitActive,

    /// Pulse length of zero requested
    #[error("pulse unit must be non-zero")]
    InvalidPulseUnit,

    /// Code could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] ProtocolError),

    /// Pin driver failure
    #[error("pin error: {0}")]
    Pin(#[from] PinError),
}

/// Errors in transmitter configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown protocol or unusable bit length
    #[error("invalid protocol settings: {0}")]
    Protocol(#[from] ProtocolError),

    /// Repeat count of zero
    #[error("repeat count must be at least 1")]
    InvalidRepeat,

    /// Pulse length of zero
    #[error("pulse unit must be non-zero")]
    InvalidPulseUnit,

    /// Receive tolerance outside 0..=100
    #[error("receive tolerance {0}% is out of range")]
    InvalidTolerance(u8),

    /// Failed to read the configuration file
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
