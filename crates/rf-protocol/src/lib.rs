//! RF Protocol Library
//!
//! This crate provides the pulse-timing protocols used by commodity
//! 433 MHz remote sockets and the encoding of integer codes into the
//! symbol strings those protocols transmit.
//!
//! - **Protocol table**: six fixed protocols addressed by a 1-based index,
//!   each defining a pulse unit and the sync/zero/one pulse multipliers
//! - **Encoding**: bit-length selection, MSB-first rendering and the
//!   self-clocking "doubled" expansion used by protocol 6
//!
//! Nothing in this crate touches hardware or sleeps; it only describes
//! *what* to send. Driving a pin is the job of `rf-tx`.
//!
//! # Example
//!
//! ```rust
//! use rf_protocol::{encode_frame, Protocol, Symbol};
//!
//! let frame = encode_frame(1, 5, 8).unwrap();
//! assert_eq!(frame.bits, "00000101");
//!
//! let proto = Protocol::get(1);
//! assert_eq!(proto.waveform(Symbol::One), (3, 1));
//! ```

pub mod encode;
pub mod error;
pub mod protocol;

pub use encode::{
    encode_frame, expand_doubled, render_bits, resolve_bit_length, Frame, Symbol,
    MAX_BIT_LENGTH,
};
pub use error::ProtocolError;
pub use protocol::{Protocol, DEFAULT_PROTOCOL, DOUBLED_PROTOCOL, PROTOCOLS, PROTOCOL_COUNT};
