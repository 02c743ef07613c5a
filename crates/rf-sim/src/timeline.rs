//! Virtual timeline
//!
//! A [`VirtualPin`] and a [`VirtualClock`] created from the same
//! [`Timeline`] share one clock, so every recorded level change carries the
//! virtual time at which the transmitter made it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rf_tx::{AbortHandle, Level, PinDriver, PinError, PinId, PinMode, Sleep};
use tracing::debug;

use crate::trace::PulseTrace;

/// What happened to a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEventKind {
    /// Direction changed
    Mode(PinMode),
    /// Level written
    Write(Level),
}

/// A recorded pin operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    /// Virtual time in microseconds
    pub at_us: u64,
    /// Pin the operation targeted
    pub pin: PinId,
    /// The operation
    pub kind: PinEventKind,
}

#[derive(Debug, Default)]
struct Inner {
    now_us: u64,
    events: Vec<PinEvent>,
    modes: HashMap<PinId, PinMode>,
    levels: HashMap<PinId, Level>,
    writes: usize,
    sleeps: usize,
    fail_writes_after: Option<usize>,
    abort_at: Option<(u64, AbortHandle)>,
}

/// Shared virtual time and pin history
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    inner: Arc<Mutex<Inner>>,
}

impl Timeline {
    /// Create an empty timeline at time zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a pin driver recording into this timeline
    pub fn pin(&self) -> VirtualPin {
        VirtualPin {
            timeline: self.clone(),
        }
    }

    /// Create a sleeper advancing this timeline
    pub fn clock(&self) -> VirtualClock {
        VirtualClock {
            timeline: self.clone(),
        }
    }

    /// Current virtual time in microseconds
    pub fn now_us(&self) -> u64 {
        self.lock().now_us
    }

    /// All recorded pin operations, oldest first
    pub fn events(&self) -> Vec<PinEvent> {
        self.lock().events.clone()
    }

    /// Last direction set on `pin`
    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.lock().modes.get(&pin).copied()
    }

    /// Last level written to `pin`
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.lock().levels.get(&pin).copied()
    }

    /// Number of successful level writes
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Number of sleeps performed
    pub fn sleep_count(&self) -> usize {
        self.lock().sleeps
    }

    /// Make every write after the first `n` fail
    pub fn fail_writes_after(&self, n: usize) {
        self.lock().fail_writes_after = Some(n);
    }

    /// Abort the transmitter behind `handle` once virtual time reaches `at_us`
    ///
    /// Stands in for another thread calling [`AbortHandle::abort`] while a
    /// transmission is running.
    pub fn abort_at(&self, at_us: u64, handle: AbortHandle) {
        self.lock().abort_at = Some((at_us, handle));
    }

    /// Forget recorded events, keeping the clock and pin states
    pub fn clear_events(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        inner.writes = 0;
        inner.sleeps = 0;
    }

    /// Reduce the writes on `pin` to high/low pulse pairs
    pub fn trace(&self, pin: PinId) -> PulseTrace {
        let inner = self.lock();
        let writes: Vec<(u64, Level)> = inner
            .events
            .iter()
            .filter(|e| e.pin == pin)
            .filter_map(|e| match e.kind {
                PinEventKind::Write(level) => Some((e.at_us, level)),
                PinEventKind::Mode(_) => None,
            })
            .collect();
        PulseTrace::from_writes(pin, &writes, inner.now_us)
    }

    fn advance(&self, duration: Duration) {
        let mut inner = self.lock();
        inner.now_us += u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        inner.sleeps += 1;

        let due = matches!(inner.abort_at, Some((at, _)) if inner.now_us >= at);
        if due {
            if let Some((at, handle)) = inner.abort_at.take() {
                debug!("Simulated abort at {} us (scheduled for {} us)", inner.now_us, at);
                handle.abort();
            }
        }
    }
}

/// Pin driver that records into a [`Timeline`]
#[derive(Debug, Clone)]
pub struct VirtualPin {
    timeline: Timeline,
}

impl VirtualPin {
    /// Get the timeline this pin records into
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl PinDriver for VirtualPin {
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        let mut inner = self.timeline.lock();
        let at_us = inner.now_us;
        inner.modes.insert(pin, mode);
        inner.events.push(PinEvent {
            at_us,
            pin,
            kind: PinEventKind::Mode(mode),
        });
        Ok(())
    }

    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), PinError> {
        let mut inner = self.timeline.lock();
        if inner.fail_writes_after.is_some_and(|n| inner.writes >= n) {
            debug!("Simulated write failure on pin {}", pin);
            return Err(PinError::Io {
                pin,
                reason: "simulated write failure".to_string(),
            });
        }
        if inner.modes.get(&pin) != Some(&PinMode::Output) {
            return Err(PinError::Io {
                pin,
                reason: "pin is not in output mode".to_string(),
            });
        }
        let at_us = inner.now_us;
        inner.levels.insert(pin, level);
        inner.writes += 1;
        inner.events.push(PinEvent {
            at_us,
            pin,
            kind: PinEventKind::Write(level),
        });
        Ok(())
    }
}

/// Sleeper that advances a [`Timeline`] without blocking
#[derive(Debug, Clone)]
pub struct VirtualClock {
    timeline: Timeline,
}

impl Sleep for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        self.timeline.advance(duration);
    }
}
