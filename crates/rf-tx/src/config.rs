//! Transmitter configuration

use std::path::Path;

use rf_protocol::{Protocol, DEFAULT_PROTOCOL, MAX_BIT_LENGTH};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pin::PinId;

/// Settings a [`Transmitter`](crate::Transmitter) is created with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmitterConfig {
    /// Pin the transmitter data line is wired to
    pub pin: PinId,
    /// Protocol index (1-based)
    pub protocol: u8,
    /// Pulse length override in microseconds; `None` uses the protocol's
    pub pulse_unit_us: Option<u32>,
    /// Times each frame is sent
    pub repeat: u32,
    /// Number of source bits per code
    pub bit_length: u8,
    /// Timing tolerance for a receiver sharing the pin, in percent
    pub receive_tolerance_percent: u8,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            pin: 0,
            protocol: DEFAULT_PROTOCOL,
            pulse_unit_us: None,
            repeat: 10,
            bit_length: 24,
            receive_tolerance_percent: 80,
        }
    }
}

impl TransmitterConfig {
    /// Default settings for `pin`
    pub fn new(pin: PinId) -> Self {
        Self {
            pin,
            ..Default::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Pulse length in effect for these settings
    pub fn effective_pulse_unit_us(&self) -> u32 {
        self.pulse_unit_us
            .unwrap_or_else(|| Protocol::get(self.protocol).pulse_unit_us)
    }

    /// Check that the settings describe a usable transmitter
    pub fn validate(&self) -> Result<(), ConfigError> {
        Protocol::try_get(self.protocol)?;
        if self.repeat == 0 {
            return Err(ConfigError::InvalidRepeat);
        }
        if self.bit_length == 0 || self.bit_length > MAX_BIT_LENGTH {
            return Err(rf_protocol::ProtocolError::InvalidBitLength(self.bit_length).into());
        }
        if self.pulse_unit_us == Some(0) {
            return Err(ConfigError::InvalidPulseUnit);
        }
        if self.receive_tolerance_percent > 100 {
            return Err(ConfigError::InvalidTolerance(self.receive_tolerance_percent));
        }
        Ok(())
    }
}
