//! Time sources for the playback scheduler.
//!
//! The scheduler never sleeps; it asks a [`Clock`] for the current time and
//! fires whatever steps are due. [`SystemClock`] follows wall-clock time,
//! [`ManualClock`] only moves when a test or driver advances it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Millisecond time source.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never decreases.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time measured from construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Logical clock that only advances explicitly.
///
/// Clones share the same time, so a driver can keep a handle while the
/// scheduler owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to an absolute time; earlier times are ignored.
    pub fn advance_to(&self, t: u64) {
        self.now.fetch_max(t, Ordering::SeqCst);
    }

    /// Advance by a delta, saturating on overflow.
    pub fn advance_by(&self, dt: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(dt))
            });
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        assert_eq!(clock.now_millis(), 0);

        handle.advance_by(250);
        assert_eq!(clock.now_millis(), 250);

        handle.advance_to(100);
        assert_eq!(clock.now_millis(), 250);

        handle.advance_to(900);
        assert_eq!(clock.now_millis(), 900);

        handle.advance_by(u64::MAX);
        assert_eq!(clock.now_millis(), u64::MAX);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }
}
