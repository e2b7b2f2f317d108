// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Clock`] over [`std::time::Instant`].

use std::time::Instant;

use cadence_core::time::{Clock, HostTime, Timebase};

/// Monotonic clock reading nanoseconds since it was created.
///
/// Pair it with [`Timebase::NANOS`] (see [`InstantClock::TIMEBASE`]).
#[derive(Clone, Copy, Debug)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    /// Timebase of the ticks this clock reports.
    pub const TIMEBASE: Timebase = Timebase::NANOS;

    /// Creates a clock whose zero is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now(&self) -> HostTime {
        let nanos = self.origin.elapsed().as_nanos();
        HostTime(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_never_go_backwards() {
        let clock = InstantClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a, "{b:?} < {a:?}");
    }
}
