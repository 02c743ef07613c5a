//! RF Simulation Library
//!
//! This crate provides a simulation layer for exercising the transmitter
//! without GPIO hardware or real sleeping. It includes:
//!
//! - **Timeline**: shared virtual time and a log of every pin operation
//! - **VirtualPin**: a [`PinDriver`](rf_tx::PinDriver) that records into the timeline
//! - **VirtualClock**: a [`Sleep`](rf_tx::Sleep) that advances virtual time instantly
//! - **PulseTrace**: the recorded output reduced to high/low pulse pairs
//!
//! # Example
//!
//! ```rust
//! use rf_sim::Timeline;
//! use rf_tx::{Transmitter, TransmitterConfig};
//!
//! let timeline = Timeline::new();
//! let config = TransmitterConfig { repeat: 1, ..TransmitterConfig::new(0) };
//! let mut tx = Transmitter::new(config, timeline.pin(), timeline.clock()).unwrap();
//!
//! tx.enable_transmit().unwrap();
//! tx.transmit_code(5, None, None, Some(8)).unwrap();
//!
//! let trace = timeline.trace(0);
//! assert_eq!(trace.len(), 9); // 8 bits + sync
//! ```

pub mod timeline;
pub mod trace;

pub use timeline::{PinEvent, PinEventKind, Timeline, VirtualClock, VirtualPin};
pub use trace::{Pulse, PulseTrace};
