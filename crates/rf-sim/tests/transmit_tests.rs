//! Integration tests for the transmitter against the simulated pin
//!
//! These tests verify end-to-end behavior of a transmission including:
//! - Frame contents for every protocol, including the doubled encoding
//! - Bit-length selection and repeat/sync framing
//! - Pulse timing on the virtual clock
//! - Enable/disable, receive mutual exclusion and pin release
//! - Aborts and pin failures part-way through a transmission

use std::time::Duration;

use rf_protocol::{expand_doubled, render_bits, Protocol};
use rf_sim::{PinEventKind, Pulse, Timeline, VirtualClock, VirtualPin};
use rf_tx::{Level, PinMode, ThreadSleep, Transmitter, TransmitterConfig, TxError};

const PIN: u32 = 17;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Create an enabled transmitter on a fresh timeline
    pub fn enabled_tx(repeat: u32) -> (Timeline, Transmitter<VirtualPin, VirtualClock>) {
        let (timeline, mut tx) = idle_tx(repeat);
        tx.enable_transmit().unwrap();
        timeline.clear_events();
        (timeline, tx)
    }

    /// Create a transmitter that has not been enabled
    pub fn idle_tx(repeat: u32) -> (Timeline, Transmitter<VirtualPin, VirtualClock>) {
        let timeline = Timeline::new();
        let config = TransmitterConfig {
            repeat,
            ..TransmitterConfig::new(PIN)
        };
        let tx = Transmitter::new(config, timeline.pin(), timeline.clock()).unwrap();
        (timeline, tx)
    }

    /// Decode the recorded frames with the transmitter's active settings
    pub fn frames(timeline: &Timeline, tx: &Transmitter<VirtualPin, VirtualClock>) -> Vec<String> {
        let state = tx.state();
        timeline
            .trace(PIN)
            .frames(Protocol::get(state.protocol), state.pulse_unit_us)
    }

    /// Count recorded sync pulses with the transmitter's active settings
    pub fn syncs(timeline: &Timeline, tx: &Transmitter<VirtualPin, VirtualClock>) -> usize {
        let state = tx.state();
        timeline
            .trace(PIN)
            .sync_count(Protocol::get(state.protocol), state.pulse_unit_us)
    }
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_code_five_in_eight_bits() {
    let (timeline, mut tx) = helpers::enabled_tx(2);
    tx.transmit_code(5, Some(1), None, Some(8)).unwrap();
    assert_eq!(helpers::frames(&timeline, &tx), vec!["00000101"; 2]);
}

#[test]
fn test_default_bit_length_is_24() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(100, None, None, None).unwrap();
    assert_eq!(tx.state().bit_length, 24);
    assert_eq!(
        helpers::frames(&timeline, &tx),
        vec![render_bits(100, 24).unwrap()]
    );
}

#[test]
fn test_wide_code_uses_32_bits() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(16_777_217, None, None, None).unwrap();
    assert_eq!(tx.state().bit_length, 32);
    let frames = helpers::frames(&timeline, &tx);
    assert_eq!(frames[0].len(), 32);
    assert_eq!(frames[0], format!("{:032b}", 16_777_217u64));
}

#[test]
fn test_doubled_protocol_frame() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(0x8000_0001, Some(6), None, None).unwrap();

    let expected = expand_doubled(&format!("{:032b}", 0x8000_0001u64));
    assert_eq!(expected.len(), 64);
    assert!(expected.starts_with("1001"));
    assert_eq!(tx.state().bit_length, 64);
    assert_eq!(helpers::frames(&timeline, &tx), vec![expected]);
}

#[test]
fn test_code_too_wide_sends_nothing() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    let result = tx.transmit_code(16_777_216, None, None, None);
    assert!(matches!(result, Err(TxError::Encode(_))));
    assert_eq!(timeline.write_count(), 0);
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_repeat_count_plain_protocol() {
    let (timeline, mut tx) = helpers::enabled_tx(7);
    tx.transmit_code(0xABCDE, Some(2), None, None).unwrap();
    assert_eq!(helpers::syncs(&timeline, &tx), 7);
    assert_eq!(helpers::frames(&timeline, &tx).len(), 7);
}

#[test]
fn test_repeat_count_doubled_protocol() {
    let (timeline, mut tx) = helpers::enabled_tx(4);
    tx.transmit_code(42, Some(6), None, None).unwrap();
    assert_eq!(helpers::syncs(&timeline, &tx), 8);
    assert_eq!(helpers::frames(&timeline, &tx).len(), 4);
}

#[test]
fn test_doubled_protocol_leads_with_sync() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(1, Some(6), None, None).unwrap();
    let trace = timeline.trace(PIN);
    let sync = Pulse {
        high_us: 200,
        low_us: 2000,
    };
    // Pulse unit carries over from construction (protocol 1)
    assert_eq!(tx.state().pulse_unit_us, 350);
    let sync_at_350 = Pulse {
        high_us: 350,
        low_us: 3500,
    };
    assert_ne!(trace.pulses[0], sync);
    assert_eq!(trace.pulses[0], sync_at_350);
    assert_eq!(*trace.pulses.last().unwrap(), sync_at_350);
}

#[test]
fn test_plain_protocol_ends_with_sync() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(1, None, None, Some(4)).unwrap();
    let trace = timeline.trace(PIN);
    assert_eq!(trace.len(), 5);
    assert_eq!(
        trace.pulses[4],
        Pulse {
            high_us: 350,
            low_us: 31 * 350
        }
    );
}

#[test]
fn test_trace_duration_matches_frame_duration() {
    let (timeline, mut tx) = helpers::enabled_tx(3);
    tx.transmit_code(0x5A5A5A, Some(3), Some(100), None).unwrap();
    let bits = render_bits(0x5A5A5A, 24).unwrap();
    let per_frame = Protocol::get(3).frame_duration_us(100, &bits, 1);
    assert_eq!(timeline.trace(PIN).total_duration_us(), 3 * per_frame);
    assert_eq!(timeline.now_us(), 3 * per_frame);
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn test_emit_waveform_timing() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.emit_waveform(3, 1).unwrap();

    let events = timeline.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, PinEventKind::Write(Level::High));
    assert_eq!(events[1].kind, PinEventKind::Write(Level::Low));
    assert_eq!(events[1].at_us - events[0].at_us, 3 * 350);
    assert_eq!(
        timeline.trace(PIN).pulses,
        vec![Pulse {
            high_us: 1050,
            low_us: 350
        }]
    );
}

#[test]
fn test_pulse_override_scales_waveforms() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(1, Some(5), Some(500), Some(1)).unwrap();
    assert_eq!(
        timeline.trace(PIN).pulses,
        vec![
            Pulse {
                high_us: 1000,
                low_us: 500
            },
            Pulse {
                high_us: 3000,
                low_us: 7000
            },
        ]
    );
}

#[test]
fn test_pin_ends_low_after_transmission() {
    let (timeline, mut tx) = helpers::enabled_tx(2);
    tx.transmit_code(0xFFFFFF, None, None, None).unwrap();
    assert_eq!(timeline.level(PIN), Some(Level::Low));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_disabled_transmit_touches_nothing() {
    let (timeline, mut tx) = helpers::idle_tx(10);
    assert_eq!(
        tx.transmit_code(100, None, None, None),
        Err(TxError::NotEnabled)
    );
    assert!(timeline.events().is_empty());
    assert_eq!(timeline.now_us(), 0);
}

#[test]
fn test_enable_sets_output_mode() {
    let (timeline, mut tx) = helpers::idle_tx(1);
    tx.enable_transmit().unwrap();
    assert_eq!(timeline.mode(PIN), Some(PinMode::Output));
    tx.disable_transmit().unwrap();
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
}

#[test]
fn test_receive_blocks_transmit_without_mode_change() {
    let (timeline, mut tx) = helpers::idle_tx(1);
    tx.enable_receive().unwrap();
    let before = timeline.events();

    assert_eq!(tx.enable_transmit(), Err(TxError::ReceiveActive));
    assert_eq!(timeline.events(), before);
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
}

#[test]
fn test_teardown_returns_pin_to_input() {
    let (timeline, mut tx) = helpers::enabled_tx(1);
    tx.transmit_code(1, None, None, None).unwrap();
    tx.teardown().unwrap();
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
    assert!(!tx.is_transmit_enabled());
}

#[test]
fn test_drop_returns_pin_to_input() {
    let timeline = {
        let (timeline, mut tx) = helpers::enabled_tx(1);
        tx.transmit_code(1, None, None, None).unwrap();
        timeline
    };
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
}

#[test]
fn test_teardown_after_receive() {
    let (timeline, mut tx) = helpers::idle_tx(1);
    tx.enable_receive().unwrap();
    tx.teardown().unwrap();
    assert!(!tx.is_receive_enabled());
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_abort_mid_transmission() {
    let (timeline, mut tx) = helpers::enabled_tx(10);
    let bits = render_bits(0x123456, 24).unwrap();
    let per_frame = Protocol::get(1).frame_duration_us(350, &bits, 1);
    // Land the abort inside the fourth repeat
    timeline.abort_at(3 * per_frame + 1, tx.abort_handle());

    let result = tx.transmit_code(0x123456, None, None, None);
    assert_eq!(
        result,
        Err(TxError::Aborted {
            completed_repeats: 3
        })
    );
    assert_eq!(helpers::syncs(&timeline, &tx), 3);
    assert_eq!(timeline.level(PIN), Some(Level::Low));

    // Pin stays in output mode until the owner disables it
    assert_eq!(timeline.mode(PIN), Some(PinMode::Output));
    tx.disable_transmit().unwrap();
    assert_eq!(timeline.mode(PIN), Some(PinMode::Input));
}

#[test]
fn test_abort_from_another_thread() {
    let timeline = Timeline::new();
    let config = TransmitterConfig {
        repeat: 1_000,
        pulse_unit_us: Some(50),
        ..TransmitterConfig::new(PIN)
    };
    let mut tx = Transmitter::new(config, timeline.pin(), ThreadSleep).unwrap();
    tx.enable_transmit().unwrap();

    let handle = tx.abort_handle();
    let aborter = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        handle.abort();
    });

    let result = tx.transmit_code(0xAAAAAA, None, None, None);
    aborter.join().unwrap();

    assert!(matches!(result, Err(TxError::Aborted { completed_repeats }) if completed_repeats < 1_000));
    assert_eq!(timeline.level(PIN), Some(Level::Low));
}

#[test]
fn test_pin_failure_stops_transmission() {
    let (timeline, mut tx) = helpers::enabled_tx(10);
    timeline.fail_writes_after(11);

    let result = tx.transmit_code(1, None, None, None);
    assert!(matches!(result, Err(TxError::Pin(_))));
    assert_eq!(timeline.write_count(), 11);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn protocol_index() -> impl Strategy<Value = u8> {
        1u8..=6
    }

    // Codes that fit the automatically chosen bit length
    fn code() -> impl Strategy<Value = u64> {
        prop_oneof![0u64..16_777_216u64, 16_777_217u64..=u64::from(u32::MAX),]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn every_protocol_transmits(protocol in protocol_index(), code in code()) {
            let (timeline, mut tx) = helpers::enabled_tx(2);
            prop_assert_eq!(tx.transmit_code(code, Some(protocol), None, None), Ok(()));

            let frames = helpers::frames(&timeline, &tx);
            prop_assert_eq!(frames.len(), 2);
            let source_bits = if protocol == 6 || code > 16_777_216 { 32 } else { 24 };
            let mut expected = render_bits(code, source_bits).unwrap();
            if protocol == 6 {
                expected = expand_doubled(&expected);
            }
            prop_assert_eq!(&frames[0], &expected);
            prop_assert_eq!(&frames[1], &expected);
        }

        #[test]
        fn sync_count_follows_repeats(protocol in protocol_index(), repeat in 1u32..12) {
            let (timeline, mut tx) = helpers::enabled_tx(repeat);
            tx.transmit_code(0x55, Some(protocol), None, Some(8)).unwrap();

            let per_repeat = if protocol == 6 { 2 } else { 1 };
            prop_assert_eq!(helpers::syncs(&timeline, &tx), (repeat * per_repeat) as usize);
        }

        #[test]
        fn waveform_holds_scale_with_pulse_unit(
            high in 1u32..40,
            low in 1u32..80,
            unit in 50u32..1_000,
        ) {
            let (timeline, mut tx) = helpers::enabled_tx(1);
            // A one-bit transmission sets the pulse unit for later waveforms
            tx.transmit_code(0, None, Some(unit), Some(1)).unwrap();
            timeline.clear_events();
            let start = timeline.now_us();

            tx.emit_waveform(high, low).unwrap();

            let pulses = timeline.trace(PIN).pulses;
            prop_assert_eq!(pulses, vec![Pulse {
                high_us: u64::from(high * unit),
                low_us: u64::from(low * unit),
            }]);
            prop_assert_eq!(timeline.now_us() - start, u64::from((high + low) * unit));
        }

        #[test]
        fn disabled_transmitter_is_silent(protocol in protocol_index(), code in code()) {
            let (timeline, mut tx) = helpers::idle_tx(3);
            prop_assert_eq!(
                tx.transmit_code(code, Some(protocol), None, None),
                Err(TxError::NotEnabled)
            );
            prop_assert!(timeline.events().is_empty());
        }
    }
}
