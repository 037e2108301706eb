//! Pending-job bitset
//!
//! The only channel from timer contexts back to the main loop. Flags are
//! level-triggered: raising a flag that is already set is a no-op, so a job
//! signalled several times before the main loop gets around to it collapses
//! into one run without losing anything.

use portable_atomic::{AtomicU8, Ordering};

/// Battery voltage/status should be pushed to the display
pub const JOB_BATTERY_REFRESH: u8 = 1 << 0;

/// Lock-free set of pending-job flags.
///
/// Producers (timer contexts) or flags in; the main loop takes and clears
/// the whole set in one swap.
pub struct JobFlags(AtomicU8);

impl JobFlags {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Raise one or more job flags (idempotent)
    pub fn raise(&self, jobs: u8) {
        self.0.fetch_or(jobs, Ordering::Relaxed);
    }

    /// Take and clear all pending flags
    pub fn take(&self) -> u8 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

impl Default for JobFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_is_idempotent() {
        let flags = JobFlags::new();
        flags.raise(JOB_BATTERY_REFRESH);
        flags.raise(JOB_BATTERY_REFRESH);
        assert_eq!(flags.take(), JOB_BATTERY_REFRESH);
        assert_eq!(flags.take(), 0);
    }

    #[test]
    fn take_clears_all_flags() {
        let flags = JobFlags::new();
        flags.raise(JOB_BATTERY_REFRESH);
        flags.raise(1 << 3);
        assert_eq!(flags.take(), JOB_BATTERY_REFRESH | 1 << 3);
        assert_eq!(flags.take(), 0);
    }
}
