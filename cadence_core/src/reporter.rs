// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregate-metrics reporting for finalized stage durations.
//!
//! The tracker hands every finalized duration to a [`Reporter`], regardless
//! of whether history recording is enabled. Which reporter is used depends on
//! the role of the process embedding the pipeline, chosen once through
//! `create_reporter`:
//!
//! - [`ReporterCategory::Renderer`] / [`ReporterCategory::Browser`] — a
//!   `RoleTaggedReporter` recording into histograms named
//!   `Scheduling.<Role>.<Metric>`.
//! - [`ReporterCategory::Null`] — a [`NullReporter`] that drops everything.
//!
//! The histogram-backed variants need the `std` feature. Without it, embedders
//! bring their own [`Reporter`] or use [`NullReporter`].

#[cfg(feature = "std")]
use alloc::boxed::Box;
#[cfg(feature = "std")]
use alloc::format;

use crate::frame::TreePriority;
#[cfg(feature = "std")]
use crate::metrics::{CreationError, HistogramSet};
use crate::time::Duration;
#[cfg(feature = "std")]
use crate::time::Timebase;

/// Receives finalized durations for aggregate reporting.
///
/// All methods default to no-ops.
pub trait Reporter {
    /// Latency from a begin-frame's frame time to the impl frame starting.
    fn add_begin_impl_frame_latency(&mut self, d: Duration) {
        _ = d;
    }

    /// Time a main frame spent queued before the main thread started it.
    fn add_begin_main_frame_queue_duration(&mut self, d: Duration, on_critical_path: bool) {
        _ = (d, on_critical_path);
    }

    /// Time from the main thread starting a main frame to it being ready to
    /// commit.
    fn add_begin_main_frame_start_to_ready_to_commit_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Time from the main thread starting a main frame to that frame ending.
    fn add_begin_main_frame_start_to_commit_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Interval between consecutive main-frame ends while main frames are
    /// needed continuously.
    fn add_begin_main_frame_interval(&mut self, d: Duration, on_critical_path: bool) {
        _ = (d, on_critical_path);
    }

    /// Duration of a commit.
    fn add_commit_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Interval between draws of newly committed trees while committing
    /// continuously.
    fn add_commit_interval(&mut self, d: Duration) {
        _ = d;
    }

    /// Time from commit to the pending tree being ready to activate.
    fn add_commit_to_ready_to_activate_duration(&mut self, d: Duration, priority: TreePriority) {
        _ = (d, priority);
    }

    /// Time from an impl-side invalidation to the pending tree being ready to
    /// activate.
    fn add_invalidation_to_ready_to_activate_duration(
        &mut self,
        d: Duration,
        priority: TreePriority,
    ) {
        _ = (d, priority);
    }

    /// Time a ready pending tree waited before activation began.
    fn add_ready_to_activate_to_will_activate_duration(
        &mut self,
        d: Duration,
        pending_tree_is_impl_side: bool,
    ) {
        _ = (d, pending_tree_is_impl_side);
    }

    /// Duration of tile preparation.
    fn add_prepare_tiles_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Duration of activation.
    fn add_activate_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Duration of a draw.
    fn add_draw_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Interval between consecutive draw ends.
    fn add_draw_interval(&mut self, d: Duration) {
        _ = d;
    }

    /// Interval between consecutive draw ends when both frames ran custom
    /// property animations.
    fn add_draw_interval_with_custom_animations(&mut self, d: Duration) {
        _ = d;
    }

    /// Returns recorded histograms, for reporters that keep them.
    #[cfg(feature = "std")]
    fn histograms(&self) -> Option<&HistogramSet> {
        None
    }
}

/// Which reporter variant to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReporterCategory {
    /// The pipeline runs in a renderer process.
    Renderer,
    /// The pipeline runs in the browser process.
    Browser,
    /// Reporting is disabled.
    Null,
}

impl ReporterCategory {
    /// Returns the role segment used in metric names, if any.
    #[must_use]
    pub const fn role_name(self) -> Option<&'static str> {
        match self {
            Self::Renderer => Some("Renderer"),
            Self::Browser => Some("Browser"),
            Self::Null => None,
        }
    }
}

/// Builds the reporter for `category`.
///
/// `timebase` converts host-time ticks into the microsecond histograms kept
/// by the role-tagged variants.
#[cfg(feature = "std")]
pub fn create_reporter(
    category: ReporterCategory,
    timebase: Timebase,
) -> Result<Box<dyn Reporter>, CreationError> {
    Ok(match category.role_name() {
        Some(role) => Box::new(RoleTaggedReporter::new(role, timebase)?),
        None => Box::new(NullReporter),
    })
}

/// A [`Reporter`] that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// A [`Reporter`] that records into histograms named
/// `Scheduling.<role>.<metric>`.
#[cfg(feature = "std")]
#[derive(Clone, Debug)]
pub struct RoleTaggedReporter {
    role: &'static str,
    histograms: HistogramSet,
}

#[cfg(feature = "std")]
impl RoleTaggedReporter {
    /// Creates a reporter tagging metrics with `role`.
    pub fn new(role: &'static str, timebase: Timebase) -> Result<Self, CreationError> {
        Ok(Self {
            role,
            histograms: HistogramSet::new(timebase)?,
        })
    }

    /// Returns the role tag.
    #[must_use]
    pub fn role(&self) -> &'static str {
        self.role
    }

    fn record(&mut self, metric: &str, d: Duration) {
        let name = format!("Scheduling.{}.{metric}", self.role);
        self.histograms.record(&name, d);
    }

    fn record_with_priority(&mut self, metric: &str, d: Duration, priority: TreePriority) {
        self.record(metric, d);
        let suffix = match priority {
            TreePriority::SamePriorityForBothTrees => "Same",
            TreePriority::SmoothnessTakesPriority => "Smoothness",
            TreePriority::NewContentTakesPriority => "NewContent",
        };
        self.record(&format!("{metric}.{suffix}"), d);
    }
}

#[cfg(feature = "std")]
const fn critical_suffix(on_critical_path: bool) -> &'static str {
    if on_critical_path {
        "Critical"
    } else {
        "NotCritical"
    }
}

#[cfg(feature = "std")]
impl Reporter for RoleTaggedReporter {
    fn add_begin_impl_frame_latency(&mut self, d: Duration) {
        self.record("BeginImplFrameLatency", d);
    }

    fn add_begin_main_frame_queue_duration(&mut self, d: Duration, on_critical_path: bool) {
        self.record(
            &format!(
                "BeginMainFrameQueueDuration{}",
                critical_suffix(on_critical_path)
            ),
            d,
        );
    }

    fn add_begin_main_frame_start_to_ready_to_commit_duration(&mut self, d: Duration) {
        self.record("BeginMainFrameStartToReadyToCommitDuration", d);
    }

    fn add_begin_main_frame_start_to_commit_duration(&mut self, d: Duration) {
        self.record("BeginMainFrameStartToCommitDuration", d);
    }

    fn add_begin_main_frame_interval(&mut self, d: Duration, on_critical_path: bool) {
        self.record(
            &format!("BeginMainFrameInterval{}", critical_suffix(on_critical_path)),
            d,
        );
    }

    fn add_commit_duration(&mut self, d: Duration) {
        self.record("CommitDuration", d);
    }

    fn add_commit_interval(&mut self, d: Duration) {
        self.record("CommitInterval", d);
    }

    fn add_commit_to_ready_to_activate_duration(&mut self, d: Duration, priority: TreePriority) {
        self.record_with_priority("CommitToReadyToActivateDuration", d, priority);
    }

    fn add_invalidation_to_ready_to_activate_duration(
        &mut self,
        d: Duration,
        priority: TreePriority,
    ) {
        self.record_with_priority("InvalidationToReadyToActivateDuration", d, priority);
    }

    fn add_ready_to_activate_to_will_activate_duration(
        &mut self,
        d: Duration,
        pending_tree_is_impl_side: bool,
    ) {
        let source = if pending_tree_is_impl_side {
            "Invalidation"
        } else {
            "Commit"
        };
        self.record(&format!("ReadyToActivateToWillActivateDuration.{source}"), d);
    }

    fn add_prepare_tiles_duration(&mut self, d: Duration) {
        self.record("PrepareTilesDuration", d);
    }

    fn add_activate_duration(&mut self, d: Duration) {
        self.record("ActivateDuration", d);
    }

    fn add_draw_duration(&mut self, d: Duration) {
        self.record("DrawDuration", d);
    }

    fn add_draw_interval(&mut self, d: Duration) {
        self.record("DrawInterval", d);
    }

    fn add_draw_interval_with_custom_animations(&mut self, d: Duration) {
        self.record("DrawIntervalWithCustomPropertyAnimations", d);
    }

    fn histograms(&self) -> Option<&HistogramSet> {
        Some(&self.histograms)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_role_tagged_reporters() {
        let mut renderer = create_reporter(ReporterCategory::Renderer, Timebase::NANOS).unwrap();
        renderer.add_draw_interval(Duration(16_000_000));
        let h = renderer.histograms().unwrap();
        let interval = h.get("Scheduling.Renderer.DrawInterval").unwrap();
        assert_eq!(interval.count(), 1);
        assert_eq!(interval.sum_micros(), 16_000);

        let mut browser = create_reporter(ReporterCategory::Browser, Timebase::NANOS).unwrap();
        browser.add_draw_duration(Duration(1_000));
        assert!(
            browser
                .histograms()
                .unwrap()
                .get("Scheduling.Browser.DrawDuration")
                .is_some()
        );
    }

    #[test]
    fn null_reporter_keeps_nothing() {
        let mut null = create_reporter(ReporterCategory::Null, Timebase::NANOS).unwrap();
        null.add_draw_interval(Duration(1));
        null.add_commit_duration(Duration(1));
        assert!(null.histograms().is_none());
    }

    #[test]
    fn role_comes_from_the_category() {
        for category in [ReporterCategory::Renderer, ReporterCategory::Browser] {
            let role = category.role_name().unwrap();
            let r = RoleTaggedReporter::new(role, Timebase::NANOS).unwrap();
            assert_eq!(r.role(), role);
        }
        assert_eq!(ReporterCategory::Null.role_name(), None);
    }

    #[test]
    fn priority_breakdown_records_base_and_suffix() {
        let mut r = RoleTaggedReporter::new("Renderer", Timebase::MICROS).unwrap();
        r.add_commit_to_ready_to_activate_duration(
            Duration(4_000),
            TreePriority::SmoothnessTakesPriority,
        );
        let h = r.histograms().unwrap();
        assert!(
            h.get("Scheduling.Renderer.CommitToReadyToActivateDuration")
                .is_some()
        );
        assert!(
            h.get("Scheduling.Renderer.CommitToReadyToActivateDuration.Smoothness")
                .is_some()
        );
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn queue_duration_is_split_by_critical_path() {
        let mut r = RoleTaggedReporter::new("Renderer", Timebase::MICROS).unwrap();
        r.add_begin_main_frame_queue_duration(Duration(10), true);
        r.add_begin_main_frame_queue_duration(Duration(10), false);
        r.add_begin_main_frame_queue_duration(Duration(10), false);
        let h = r.histograms().unwrap();
        assert_eq!(
            h.get("Scheduling.Renderer.BeginMainFrameQueueDurationCritical")
                .unwrap()
                .count(),
            1
        );
        assert_eq!(
            h.get("Scheduling.Renderer.BeginMainFrameQueueDurationNotCritical")
                .unwrap()
                .count(),
            2
        );
    }
}
