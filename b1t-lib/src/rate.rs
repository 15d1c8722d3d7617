//! Scan throughput, reported once per window of passes.
use fugit::{MicrosDurationU64, TimerInstantU64};

/// A microsecond timestamp, as the RP2040 timer counts them.
pub type Instant = TimerInstantU64<1_000_000>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScanReport {
    pub scans: u32,
    pub elapsed: MicrosDurationU64,
}

impl ScanReport {
    #[inline]
    #[must_use]
    pub fn micros_per_scan(&self) -> u64 {
        self.elapsed.to_micros() / u64::from(self.scans.max(1))
    }

    #[must_use]
    pub fn scans_per_second(&self) -> u64 {
        u64::from(self.scans) * 1_000_000 / self.elapsed.to_micros().max(1)
    }
}

/// Counts passes and closes a window every `N` of them.
pub struct ScanRate<const N: u32> {
    window_start: Instant,
    scans: u32,
}

impl<const N: u32> ScanRate<N> {
    #[must_use]
    pub const fn new(start: Instant) -> Self {
        Self {
            window_start: start,
            scans: 0,
        }
    }

    /// Records one pass finishing at `now`, yields a report when the window fills.
    pub fn record(&mut self, now: Instant) -> Option<ScanReport> {
        self.scans += 1;
        if self.scans < N {
            return None;
        }
        // A clock that went backwards reports a zero-length window
        let elapsed = now
            .checked_duration_since(self.window_start)
            .unwrap_or(MicrosDurationU64::from_ticks(0));
        let report = ScanReport {
            scans: self.scans,
            elapsed,
        };
        self.window_start = now;
        self.scans = 0;
        Some(report)
    }
}
