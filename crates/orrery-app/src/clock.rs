//! Elapsed-time sources for the frame loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Seconds since an epoch fixed when the scene started.
///
/// Readings never decrease.
pub trait Clock {
    fn elapsed_seconds(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Start counting from now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for SystemClock {
    fn elapsed_seconds(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to. Clones share the same reading, so a
/// test can keep one and hand the other to the loop.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        let clock = Self::default();
        clock.set(start);
        clock
    }

    /// Jump to `seconds`. Earlier times are ignored.
    pub fn set(&self, seconds: f64) {
        if seconds.is_finite() && seconds >= self.elapsed_seconds() {
            self.bits.store(seconds.to_bits(), Ordering::Release);
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.elapsed_seconds() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed_seconds(&self) -> f64 {
        (**self).elapsed_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::start();
        let a = clock.elapsed_seconds();
        let b = clock.elapsed_seconds();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1.0);
        let observer = clock.clone();
        clock.advance(0.5);
        assert_eq!(observer.elapsed_seconds(), 1.5);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(3.0);
        clock.set(2.0);
        clock.set(f64::NAN);
        assert_eq!(clock.elapsed_seconds(), 3.0);
    }
}
