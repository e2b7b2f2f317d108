// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open/closed timestamp for one named stage.

use crate::time::HostTime;

/// Holds the time a stage opened, or nothing while it is closed.
///
/// Opening an open slot or closing a closed one is a caller bug. Debug builds
/// panic with a message naming the stage. Release builds re-stamp on a double
/// open and treat a close without an open as zero-length.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StageSlot {
    name: &'static str,
    opened_at: Option<HostTime>,
}

impl StageSlot {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            opened_at: None,
        }
    }

    pub(crate) fn open(&mut self, now: HostTime) {
        debug_assert!(
            self.opened_at.is_none(),
            "{} opened while already open",
            self.name
        );
        self.opened_at = Some(now);
    }

    /// Closes the slot and returns the time it opened.
    pub(crate) fn close(&mut self, now: HostTime) -> HostTime {
        debug_assert!(
            self.opened_at.is_some(),
            "{} closed without a matching open",
            self.name
        );
        self.opened_at.take().unwrap_or(now)
    }

    /// Asserts the slot is open (debug builds) and returns its time.
    pub(crate) fn expect_open(&self, what: &'static str) -> Option<HostTime> {
        debug_assert!(
            self.opened_at.is_some(),
            "{what} requires {} to be open",
            self.name
        );
        self.opened_at
    }

    pub(crate) fn get(&self) -> Option<HostTime> {
        self.opened_at
    }

    pub(crate) fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    /// Clears the slot without checking whether it was open.
    pub(crate) fn reset(&mut self) -> Option<HostTime> {
        self.opened_at.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_returns_open_time() {
        let mut slot = StageSlot::new("commit");
        assert!(!slot.is_open());
        slot.open(HostTime(10));
        assert_eq!(slot.get(), Some(HostTime(10)));
        assert_eq!(slot.close(HostTime(20)), HostTime(10));
        assert!(!slot.is_open());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "commit opened while already open")]
    fn double_open_panics_in_debug() {
        let mut slot = StageSlot::new("commit");
        slot.open(HostTime(1));
        slot.open(HostTime(2));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "draw closed without a matching open")]
    fn close_without_open_panics_in_debug() {
        let mut slot = StageSlot::new("draw");
        let _ = slot.close(HostTime(2));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn close_without_open_is_zero_length_in_release() {
        let mut slot = StageSlot::new("draw");
        assert_eq!(slot.close(HostTime(2)), HostTime(2));
    }
}
