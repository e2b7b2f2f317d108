// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace markers emitted by the timing tracker.
//!
//! This module provides a [`TraceSink`] trait with per-event methods. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. Markers that are part of the
//! tracker's observable behavior ([`LongDrawIntervalEvent`],
//! [`MainAndImplFrameDeltaEvent`]) are always dispatched. Per-stage
//! begin/end events are verbose: when the `trace` feature is **off**, those
//! `Tracer` methods compile to nothing.
//!
//! # Crate features
//!
//! - `trace` — enables dispatch of [`StageBeginEvent`] and [`StageEndEvent`].

use alloc::boxed::Box;

use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// A timed pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// A main frame, from being sent to commit or abort.
    MainFrame,
    /// A commit.
    Commit,
    /// Tile preparation.
    PrepareTiles,
    /// A pending tree, from creation to ready-to-activate.
    PendingTree,
    /// Activation.
    Activate,
    /// A draw.
    Draw,
}

impl StageKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MainFrame => "main_frame",
            Self::Commit => "commit",
            Self::PrepareTiles => "prepare_tiles",
            Self::PendingTree => "pending_tree",
            Self::Activate => "activate",
            Self::Draw => "draw",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageBeginEvent {
    /// Which stage is starting.
    pub stage: StageKind,
    /// Host time at the start of the stage.
    pub timestamp: HostTime,
}

/// Marks the end of a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageEndEvent {
    /// Which stage is ending.
    pub stage: StageKind,
    /// Host time at the end of the stage.
    pub timestamp: HostTime,
    /// Elapsed time since the matching begin.
    pub duration: Duration,
}

/// Highlights an unusually long gap between back-to-back draws.
///
/// Brackets the draw that ended the gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongDrawIntervalEvent {
    /// Start of the draw that ended the gap.
    pub draw_start: HostTime,
    /// End of that draw.
    pub draw_end: HostTime,
    /// Time since the previous draw ended.
    pub interval: Duration,
}

/// Emitted when a newly activated tree is drawn: how far the impl frame ran
/// ahead of the main frame that produced the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MainAndImplFrameDeltaEvent {
    /// Host time of the draw end.
    pub timestamp: HostTime,
    /// `impl_frame_time - main_frame_time`.
    pub delta: Duration,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the tracker.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a stage opens (requires the `trace` feature to fire).
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        _ = e;
    }

    /// Called when a stage closes (requires the `trace` feature to fire).
    fn on_stage_end(&mut self, e: &StageEndEvent) {
        _ = e;
    }

    /// Called when the gap between draws exceeds the configured threshold.
    fn on_long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
        _ = e;
    }

    /// Called when a newly activated tree is drawn.
    fn on_main_and_impl_frame_delta(&mut self, e: &MainAndImplFrameDeltaEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owning wrapper around an optional [`TraceSink`].
pub struct Tracer {
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Emits a [`StageBeginEvent`].
    #[inline]
    pub fn stage_begin(&mut self, e: &StageBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stage_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StageEndEvent`].
    #[inline]
    pub fn stage_end(&mut self, e: &StageEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stage_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LongDrawIntervalEvent`].
    #[inline]
    pub fn long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
        if let Some(s) = &mut self.sink {
            s.on_long_draw_interval(e);
        }
    }

    /// Emits a [`MainAndImplFrameDeltaEvent`].
    #[inline]
    pub fn main_and_impl_frame_delta(&mut self, e: &MainAndImplFrameDeltaEvent) {
        if let Some(s) = &mut self.sink {
            s.on_main_and_impl_frame_delta(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Seen {
        begins: Vec<StageKind>,
        long_intervals: Vec<Duration>,
    }

    struct SharedSink(Rc<RefCell<Seen>>);

    impl TraceSink for SharedSink {
        fn on_stage_begin(&mut self, e: &StageBeginEvent) {
            self.0.borrow_mut().begins.push(e.stage);
        }

        fn on_long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
            self.0.borrow_mut().long_intervals.push(e.interval);
        }
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Draw,
            timestamp: HostTime(0),
        });
        tracer.long_draw_interval(&LongDrawIntervalEvent {
            draw_start: HostTime(0),
            draw_end: HostTime(1),
            interval: Duration(1),
        });
    }

    #[test]
    fn long_draw_interval_always_dispatches() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let mut tracer = Tracer::new(Box::new(SharedSink(seen.clone())));
        tracer.long_draw_interval(&LongDrawIntervalEvent {
            draw_start: HostTime(100),
            draw_end: HostTime(200),
            interval: Duration(40),
        });
        assert_eq!(seen.borrow().long_intervals, [Duration(40)]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn stage_events_dispatch_with_trace_feature() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let mut tracer = Tracer::new(Box::new(SharedSink(seen.clone())));
        tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Commit,
            timestamp: HostTime(5),
        });
        assert_eq!(seen.borrow().begins, [StageKind::Commit]);
    }

    #[cfg(not(feature = "trace"))]
    #[test]
    fn stage_events_compile_away_without_trace_feature() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let mut tracer = Tracer::new(Box::new(SharedSink(seen.clone())));
        tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Commit,
            timestamp: HostTime(5),
        });
        assert!(seen.borrow().begins.is_empty());
    }

    #[test]
    fn stage_names_are_distinct() {
        let all = [
            StageKind::MainFrame,
            StageKind::Commit,
            StageKind::PrepareTiles,
            StageKind::PendingTree,
            StageKind::Activate,
            StageKind::Draw,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
