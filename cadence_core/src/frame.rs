// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame identity and the per-frame arguments the pipeline driver passes in.
//!
//! - [`BeginFrameId`] — identifies one begin-frame from one source
//! - [`BeginFrameArgs`] — what the driver knows when an impl or main frame
//!   begins
//! - [`CommitEarlyOutReason`] — why a main frame ended without a commit
//! - [`FrameSkippedReason`] — why an impl frame produced nothing
//! - [`TreePriority`] — reporting breakdown for pending/active tree work
//! - [`DrawInfo`] — what the driver reports about a finished draw

use core::fmt;

use crate::time::{Duration, HostTime};

/// Identifies a begin-frame by its source and position in that source's
/// sequence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BeginFrameId {
    /// Which begin-frame source produced this frame.
    pub source_id: u64,
    /// Monotonically increasing sequence number within the source.
    pub sequence_number: u64,
}

impl BeginFrameId {
    /// Creates a frame id.
    #[must_use]
    pub const fn new(source_id: u64, sequence_number: u64) -> Self {
        Self {
            source_id,
            sequence_number,
        }
    }
}

impl fmt::Debug for BeginFrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeginFrameId({}:{})", self.source_id, self.sequence_number)
    }
}

/// Whether a begin-frame was delivered on time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginFrameKind {
    /// Delivered for the current vsync.
    Normal,
    /// Replayed after the fact (e.g. when a source is first observed).
    ///
    /// Missed frames are not used for begin-impl-frame latency reporting.
    Missed,
}

/// Arguments describing a begin-frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BeginFrameArgs {
    /// Identity of this frame.
    pub frame_id: BeginFrameId,
    /// Time the frame was issued by its source (usually vsync).
    pub frame_time: HostTime,
    /// Latest time by which the frame should be drawn.
    pub deadline: HostTime,
    /// Nominal interval between frames.
    pub interval: Duration,
    /// Whether this frame is on time or replayed.
    pub kind: BeginFrameKind,
    /// Whether a main frame started from these args blocks visible output.
    pub on_critical_path: bool,
}

impl BeginFrameArgs {
    /// Creates normal, on-critical-path args for `frame_id` issued at
    /// `frame_time` with the given interval; the deadline is one interval
    /// later.
    #[must_use]
    pub fn new(frame_id: BeginFrameId, frame_time: HostTime, interval: Duration) -> Self {
        Self {
            frame_id,
            frame_time,
            deadline: frame_time.checked_add(interval).unwrap_or(frame_time),
            interval,
            kind: BeginFrameKind::Normal,
            on_critical_path: true,
        }
    }
}

/// Why a main frame finished without producing a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitEarlyOutReason {
    /// The compositor frame sink was lost.
    AbortedFrameSinkLost,
    /// The page became invisible.
    AbortedNotVisible,
    /// The main thread was deferred.
    AbortedDeferredMainFrameUpdate,
    /// Commits were deferred.
    AbortedDeferredCommit,
    /// The main thread had no updates.
    FinishedNoUpdates,
}

/// Why an impl frame did not produce a compositor frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameSkippedReason {
    /// The frame was skipped for lack of damage.
    NoDamage,
    /// Waiting on the main thread.
    WaitingOnMain,
    /// The draw was throttled.
    DrawThrottled,
    /// A stale frame was recovered from.
    RecoverLatency,
}

/// Which tree's work is favored, used for reporting breakdowns only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TreePriority {
    /// Neither tree is favored.
    #[default]
    SamePriorityForBothTrees,
    /// Smoothness of the active tree is favored.
    SmoothnessTakesPriority,
    /// Getting new content onto the pending tree is favored.
    NewContentTakesPriority,
}

/// What the pipeline driver reports about a draw that just finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DrawInfo {
    /// Whether this draw was the first draw of a newly activated tree.
    pub used_new_active_tree: bool,
    /// Frame time of the impl frame that drew.
    pub impl_frame_time: HostTime,
    /// Whether this frame ran custom property animations.
    pub has_custom_property_animations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_new_sets_deadline_one_interval_out() {
        let args = BeginFrameArgs::new(BeginFrameId::new(1, 7), HostTime(1000), Duration(16));
        assert_eq!(args.deadline, HostTime(1016));
        assert_eq!(args.kind, BeginFrameKind::Normal);
        assert!(args.on_critical_path);
    }

    #[test]
    fn args_new_saturates_deadline_at_frame_time() {
        let args = BeginFrameArgs::new(BeginFrameId::default(), HostTime(u64::MAX), Duration(16));
        assert_eq!(args.deadline, HostTime(u64::MAX));
    }

    #[test]
    fn frame_ids_order_by_source_then_sequence() {
        assert!(BeginFrameId::new(0, 9) < BeginFrameId::new(1, 0));
        assert!(BeginFrameId::new(1, 1) < BeginFrameId::new(1, 2));
    }
}
