//! Sleep primitives
//!
//! Pulse timing is only as good as the sleep behind it. Protocol 3 needs
//! 400 µs pulses with a tolerance well under 100 µs, which a plain thread
//! sleep does not reliably hit on a loaded system.

use std::time::{Duration, Instant};

/// Blocking sleep used between pin edges
pub trait Sleep {
    /// Block the calling thread for `duration`
    fn sleep(&mut self, duration: Duration);
}

impl<T: Sleep + ?Sized> Sleep for &mut T {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<T: Sleep + ?Sized> Sleep for Box<T> {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Sleep using the OS scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sleep coarsely, then busy-wait the final stretch
///
/// The scheduler handles everything except the last `spin_window`, which
/// is spent polling [`Instant`]. Durations shorter than the window are spun
/// in full.
#[derive(Debug, Clone, Copy)]
pub struct SpinSleep {
    spin_window: Duration,
}

impl SpinSleep {
    /// Default busy-wait window
    pub const DEFAULT_SPIN_WINDOW: Duration = Duration::from_millis(1);

    /// Create a sleeper with a custom busy-wait window
    pub fn new(spin_window: Duration) -> Self {
        Self { spin_window }
    }

    /// Get the busy-wait window
    pub fn spin_window(&self) -> Duration {
        self.spin_window
    }
}

impl Default for SpinSleep {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPIN_WINDOW)
    }
}

impl Sleep for SpinSleep {
    fn sleep(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        if let Some(coarse) = duration.checked_sub(self.spin_window) {
            if !coarse.is_zero() {
                std::thread::sleep(coarse);
            }
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}
