// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Estimates derived from the rolling histories.
//!
//! Every estimate is read-only and may be queried at any time. Composite
//! estimates add up independent per-stage percentiles; they assume stage
//! durations are independent and make no covariance correction.

use crate::time::{Clock, Duration};

use super::{HistoryKind, PipelineTimingTracker};

/// Point-in-time copy of every estimate and continuity flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingSnapshot {
    /// See [`PipelineTimingTracker::queue_duration_critical_estimate`].
    pub queue_duration_critical: Duration,
    /// See [`PipelineTimingTracker::queue_duration_not_critical_estimate`].
    pub queue_duration_not_critical: Duration,
    /// See [`PipelineTimingTracker::start_to_ready_to_commit_estimate`].
    pub start_to_ready_to_commit: Duration,
    /// See [`PipelineTimingTracker::commit_estimate`].
    pub commit: Duration,
    /// See [`PipelineTimingTracker::commit_to_ready_to_activate_estimate`].
    pub commit_to_ready_to_activate: Duration,
    /// See [`PipelineTimingTracker::prepare_tiles_estimate`].
    pub prepare_tiles: Duration,
    /// See [`PipelineTimingTracker::activate_estimate`].
    pub activate: Duration,
    /// See [`PipelineTimingTracker::draw_estimate`].
    pub draw: Duration,
    /// See [`PipelineTimingTracker::queue_to_activate_critical_estimate`].
    pub queue_to_activate_critical: Duration,
    /// See [`PipelineTimingTracker::queue_to_activate_not_critical_estimate`].
    pub queue_to_activate_not_critical: Duration,
    /// Whether the compositor has been drawing every impl frame.
    pub drawing_continuously: bool,
    /// Whether a main frame has been sent every impl frame.
    pub begin_main_frame_needed_continuously: bool,
    /// Whether every recent main frame has committed.
    pub begin_main_frame_committing_continuously: bool,
    /// Whether new samples are being recorded.
    pub recording_enabled: bool,
}

impl<C: Clock> PipelineTimingTracker<C> {
    fn percentile_of(&self, kind: HistoryKind, percent: f64) -> Duration {
        self.history(kind).percentile(percent)
    }

    /// Optimistic queue estimate for a critical-path main frame.
    ///
    /// The smaller of the critical-path and all-frames percentiles.
    #[must_use]
    pub fn queue_duration_critical_estimate(&self) -> Duration {
        let p = &self.config.percentiles;
        let critical = self.percentile_of(HistoryKind::QueueCritical, p.queue_critical);
        let all = self.percentile_of(HistoryKind::QueueAll, p.queue_all);
        critical.min(all)
    }

    /// Pessimistic queue estimate for a non-critical main frame.
    ///
    /// The larger of the non-critical and all-frames percentiles.
    #[must_use]
    pub fn queue_duration_not_critical_estimate(&self) -> Duration {
        let p = &self.config.percentiles;
        let not_critical =
            self.percentile_of(HistoryKind::QueueNotCritical, p.queue_not_critical);
        let all = self.percentile_of(HistoryKind::QueueAll, p.queue_all);
        not_critical.max(all)
    }

    /// Main-frame start to ready-to-commit.
    #[must_use]
    pub fn start_to_ready_to_commit_estimate(&self) -> Duration {
        self.percentile_of(
            HistoryKind::StartToReadyToCommit,
            self.config.percentiles.start_to_ready_to_commit,
        )
    }

    /// Commit duration.
    #[must_use]
    pub fn commit_estimate(&self) -> Duration {
        self.percentile_of(HistoryKind::Commit, self.config.percentiles.commit)
    }

    /// Commit to the pending tree being ready to activate.
    #[must_use]
    pub fn commit_to_ready_to_activate_estimate(&self) -> Duration {
        self.percentile_of(
            HistoryKind::CommitToReadyToActivate,
            self.config.percentiles.commit_to_ready_to_activate,
        )
    }

    /// Tile preparation.
    #[must_use]
    pub fn prepare_tiles_estimate(&self) -> Duration {
        self.percentile_of(HistoryKind::PrepareTiles, self.config.percentiles.prepare_tiles)
    }

    /// Activation.
    #[must_use]
    pub fn activate_estimate(&self) -> Duration {
        self.percentile_of(HistoryKind::Activate, self.config.percentiles.activate)
    }

    /// Draw.
    #[must_use]
    pub fn draw_estimate(&self) -> Duration {
        self.percentile_of(HistoryKind::Draw, self.config.percentiles.draw)
    }

    /// Sent-to-activated estimate for a critical-path main frame.
    #[must_use]
    pub fn queue_to_activate_critical_estimate(&self) -> Duration {
        self.main_frame_to_activate(self.queue_duration_critical_estimate())
    }

    /// Sent-to-activated estimate for a non-critical main frame.
    #[must_use]
    pub fn queue_to_activate_not_critical_estimate(&self) -> Duration {
        self.main_frame_to_activate(self.queue_duration_not_critical_estimate())
    }

    fn main_frame_to_activate(&self, queue: Duration) -> Duration {
        self.start_to_ready_to_commit_estimate()
            .saturating_add(self.commit_estimate())
            .saturating_add(self.commit_to_ready_to_activate_estimate())
            .saturating_add(self.activate_estimate())
            .saturating_add(queue)
    }

    /// Copies every estimate and continuity flag.
    #[must_use]
    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            queue_duration_critical: self.queue_duration_critical_estimate(),
            queue_duration_not_critical: self.queue_duration_not_critical_estimate(),
            start_to_ready_to_commit: self.start_to_ready_to_commit_estimate(),
            commit: self.commit_estimate(),
            commit_to_ready_to_activate: self.commit_to_ready_to_activate_estimate(),
            prepare_tiles: self.prepare_tiles_estimate(),
            activate: self.activate_estimate(),
            draw: self.draw_estimate(),
            queue_to_activate_critical: self.queue_to_activate_critical_estimate(),
            queue_to_activate_not_critical: self.queue_to_activate_not_critical_estimate(),
            drawing_continuously: self.drawing_continuously,
            begin_main_frame_needed_continuously: self.begin_main_frame_needed_continuously,
            begin_main_frame_committing_continuously: self
                .begin_main_frame_committing_continuously,
            recording_enabled: self.recording_enabled,
        }
    }
}
