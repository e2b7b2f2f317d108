// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage-transition tracking and rolling timing histories.
//!
//! The [`PipelineTimingTracker`] is driven by the pipeline through a fixed
//! sequence of "will"/"did" calls. It stamps each stage's open time, and on
//! close computes the elapsed duration, forwards it to the collaborators, and
//! (while recording is enabled) inserts it into the matching
//! [`RollingDurationEstimator`]. Estimates derived from those histories are
//! in the `estimate` submodule.
//!
//! # Call order
//!
//! ```text
//!   will_begin_impl_frame
//!     will_begin_main_frame ─► begin_main_frame_started ─► notify_ready_to_commit
//!       ├─► begin_main_frame_aborted
//!       └─► will_commit ─► did_commit ─► ready_to_activate
//!                                          └─► will_activate ─► did_activate
//!     will_draw ─► did_draw
//!   will_finish_impl_frame
//!
//!   will_prepare_tiles ─► did_prepare_tiles      (interleaves with the above)
//!   will_invalidate_on_impl_side ─► ready_to_activate ─► ...
//! ```

mod estimate;
mod slot;

pub use estimate::TimingSnapshot;

use alloc::boxed::Box;

use crate::frame::{
    BeginFrameArgs, BeginFrameId, BeginFrameKind, CommitEarlyOutReason, DrawInfo,
    FrameSkippedReason, TreePriority,
};
use crate::history::{DEFAULT_HISTORY_CAPACITY, RollingDurationEstimator};
use crate::instrumentation::{InstrumentationSink, NoopInstrumentation};
use crate::reporter::Reporter;
use crate::reporting::{
    NoopReportingController, ReportingController, SkipReason, StageTransition, TransitionKind,
};
use crate::time::{Clock, Duration, HostTime, Timebase};
use crate::trace::{
    LongDrawIntervalEvent, MainAndImplFrameDeltaEvent, StageBeginEvent, StageEndEvent, StageKind,
    TraceSink, Tracer,
};

use self::slot::StageSlot;

/// Long-draw-interval threshold: roughly two frames at 58 Hz.
pub const DEFAULT_DRAW_INTERVAL_TRACE_THRESHOLD_MICROS: u64 = 34_478;

/// Percentile used by every estimate unless configured otherwise.
pub const DEFAULT_ESTIMATE_PERCENTILE: f64 = 90.0;

/// Percentile used for each estimate, in the range 0–100.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatePercentiles {
    /// Main-frame queue duration over all main frames.
    pub queue_all: f64,
    /// Main-frame queue duration for critical-path main frames.
    pub queue_critical: f64,
    /// Main-frame queue duration for non-critical main frames.
    pub queue_not_critical: f64,
    /// Main-frame start to ready-to-commit.
    pub start_to_ready_to_commit: f64,
    /// Commit duration.
    pub commit: f64,
    /// Commit to ready-to-activate.
    pub commit_to_ready_to_activate: f64,
    /// Tile preparation.
    pub prepare_tiles: f64,
    /// Activation.
    pub activate: f64,
    /// Draw.
    pub draw: f64,
}

impl EstimatePercentiles {
    /// Every estimate at the same percentile.
    #[must_use]
    pub const fn uniform(percent: f64) -> Self {
        Self {
            queue_all: percent,
            queue_critical: percent,
            queue_not_critical: percent,
            start_to_ready_to_commit: percent,
            commit: percent,
            commit_to_ready_to_activate: percent,
            prepare_tiles: percent,
            activate: percent,
            draw: percent,
        }
    }
}

impl Default for EstimatePercentiles {
    fn default() -> Self {
        Self::uniform(DEFAULT_ESTIMATE_PERCENTILE)
    }
}

/// Configuration for the [`PipelineTimingTracker`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Samples kept per history.
    pub history_capacity: usize,
    /// Percentile used for each estimate.
    pub percentiles: EstimatePercentiles,
    /// Draw intervals longer than this emit a
    /// [`LongDrawIntervalEvent`].
    pub draw_interval_trace_threshold: Duration,
    /// Converts host-time ticks for reporting.
    pub timebase: Timebase,
    /// Set when the embedder draws synchronously and may skip drawing some
    /// activated trees.
    pub synchronous_compositor: bool,
}

impl TrackerConfig {
    /// Default configuration for nanosecond host-time ticks.
    #[must_use]
    pub const fn new() -> Self {
        Self::for_timebase(Timebase::NANOS)
    }

    /// Default configuration for host-time ticks in `timebase`.
    #[must_use]
    pub const fn for_timebase(timebase: Timebase) -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            percentiles: EstimatePercentiles::uniform(DEFAULT_ESTIMATE_PERCENTILE),
            draw_interval_trace_threshold: Duration::from_micros(
                DEFAULT_DRAW_INTERVAL_TRACE_THRESHOLD_MICROS,
                timebase,
            ),
            timebase,
            synchronous_compositor: false,
        }
    }

    /// Configuration for a synchronous compositor in `timebase`.
    #[must_use]
    pub const fn synchronous_compositor(timebase: Timebase) -> Self {
        let mut config = Self::for_timebase(timebase);
        config.synchronous_compositor = true;
        config
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One of the nine rolling histories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    /// Main-frame queue duration, every main frame.
    QueueAll,
    /// Main-frame queue duration, critical-path main frames.
    QueueCritical,
    /// Main-frame queue duration, non-critical main frames.
    QueueNotCritical,
    /// Main-frame start to ready-to-commit.
    StartToReadyToCommit,
    /// Commit duration.
    Commit,
    /// Commit to ready-to-activate.
    CommitToReadyToActivate,
    /// Tile preparation.
    PrepareTiles,
    /// Activation.
    Activate,
    /// Draw.
    Draw,
}

impl HistoryKind {
    /// Every history, in storage order.
    pub const ALL: [Self; 9] = [
        Self::QueueAll,
        Self::QueueCritical,
        Self::QueueNotCritical,
        Self::StartToReadyToCommit,
        Self::Commit,
        Self::CommitToReadyToActivate,
        Self::PrepareTiles,
        Self::Activate,
        Self::Draw,
    ];

    const fn index(self) -> usize {
        match self {
            Self::QueueAll => 0,
            Self::QueueCritical => 1,
            Self::QueueNotCritical => 2,
            Self::StartToReadyToCommit => 3,
            Self::Commit => 4,
            Self::CommitToReadyToActivate => 5,
            Self::PrepareTiles => 6,
            Self::Activate => 7,
            Self::Draw => 8,
        }
    }
}

/// Tracks pipeline stage timings and estimates how long each stage will take.
///
/// The tracker is owned by the pipeline driver and called from one context
/// in the order described in the [module docs](self). Stage protocol
/// violations (opening an open stage, closing a closed one) are caller bugs
/// and panic in debug builds.
///
/// # Recording
///
/// While recording is disabled (see
/// [`set_recording_enabled`](Self::set_recording_enabled)), durations are
/// still forwarded to the [`Reporter`], [`InstrumentationSink`] and
/// [`ReportingController`], but nothing is inserted into the histories.
///
/// # Usage
///
/// ```rust,ignore
/// let mut tracker = PipelineTimingTracker::new(config, clock, reporter);
/// tracker.will_begin_main_frame(&args);
/// // ...
/// let budget = tracker.queue_to_activate_critical_estimate();
/// ```
pub struct PipelineTimingTracker<C: Clock> {
    config: TrackerConfig,
    clock: C,
    reporter: Box<dyn Reporter>,
    instrumentation: Box<dyn InstrumentationSink>,
    controller: Box<dyn ReportingController>,
    tracer: Tracer,

    histories: [RollingDurationEstimator; 9],

    recording_enabled: bool,
    did_send_begin_main_frame: bool,
    begin_main_frame_needed_continuously: bool,
    begin_main_frame_committing_continuously: bool,
    drawing_continuously: bool,
    on_critical_path: bool,
    pending_tree_is_impl_side: bool,
    previous_frame_had_custom_animations: bool,
    tree_priority: TreePriority,

    begin_main_frame_sent: StageSlot,
    begin_main_frame_start: StageSlot,
    commit_start: StageSlot,
    prepare_tiles_start: StageSlot,
    pending_tree_created: StageSlot,
    pending_tree_ready_to_activate: StageSlot,
    activate_start: StageSlot,
    draw_start: StageSlot,

    begin_main_frame_id: Option<BeginFrameId>,
    begin_main_frame_frame_time: Option<HostTime>,
    pending_tree_main_frame_time: Option<HostTime>,
    active_tree_main_frame_time: Option<HostTime>,

    previous_draw_end: Option<HostTime>,
    previous_begin_main_frame_end: Option<HostTime>,
    previous_new_active_tree_draw_end: Option<HostTime>,
}

impl<C: Clock> core::fmt::Debug for PipelineTimingTracker<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PipelineTimingTracker")
            .field("config", &self.config)
            .field("recording_enabled", &self.recording_enabled)
            .field("drawing_continuously", &self.drawing_continuously)
            .field("tree_priority", &self.tree_priority)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> PipelineTimingTracker<C> {
    /// Creates a tracker with no-op instrumentation, reporting controller and
    /// trace sink.
    ///
    /// Recording starts disabled; the embedder enables it once the output is
    /// visible.
    #[must_use]
    pub fn new(config: TrackerConfig, clock: C, reporter: Box<dyn Reporter>) -> Self {
        Self {
            histories: core::array::from_fn(|_| {
                RollingDurationEstimator::new(config.history_capacity)
            }),
            config,
            clock,
            reporter,
            instrumentation: Box::new(NoopInstrumentation),
            controller: Box::new(NoopReportingController),
            tracer: Tracer::none(),
            recording_enabled: false,
            did_send_begin_main_frame: false,
            begin_main_frame_needed_continuously: false,
            begin_main_frame_committing_continuously: false,
            drawing_continuously: false,
            on_critical_path: false,
            pending_tree_is_impl_side: false,
            previous_frame_had_custom_animations: false,
            tree_priority: TreePriority::default(),
            begin_main_frame_sent: StageSlot::new("main frame"),
            begin_main_frame_start: StageSlot::new("main frame start"),
            commit_start: StageSlot::new("commit"),
            prepare_tiles_start: StageSlot::new("prepare tiles"),
            pending_tree_created: StageSlot::new("pending tree"),
            pending_tree_ready_to_activate: StageSlot::new("ready to activate"),
            activate_start: StageSlot::new("activate"),
            draw_start: StageSlot::new("draw"),
            begin_main_frame_id: None,
            begin_main_frame_frame_time: None,
            pending_tree_main_frame_time: None,
            active_tree_main_frame_time: None,
            previous_draw_end: None,
            previous_begin_main_frame_end: None,
            previous_new_active_tree_draw_end: None,
        }
    }

    /// Replaces the instrumentation sink.
    #[must_use]
    pub fn with_instrumentation(mut self, sink: Box<dyn InstrumentationSink>) -> Self {
        self.instrumentation = sink;
        self
    }

    /// Replaces the reporting controller.
    #[must_use]
    pub fn with_reporting_controller(mut self, controller: Box<dyn ReportingController>) -> Self {
        self.controller = controller;
        self
    }

    /// Attaches a trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.tracer = Tracer::new(sink);
        self
    }

    // -- state ---------------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns the reporter.
    #[must_use]
    pub fn reporter(&self) -> &dyn Reporter {
        &*self.reporter
    }

    /// Enables or disables insertion of samples into the histories.
    pub fn set_recording_enabled(&mut self, enabled: bool) {
        self.recording_enabled = enabled;
    }

    /// Returns whether samples are being inserted into the histories.
    #[must_use]
    pub fn recording_enabled(&self) -> bool {
        self.recording_enabled
    }

    /// Sets the tree priority used for reporting breakdowns.
    pub fn set_tree_priority(&mut self, priority: TreePriority) {
        self.tree_priority = priority;
    }

    /// Returns the tree priority used for reporting breakdowns.
    #[must_use]
    pub fn tree_priority(&self) -> TreePriority {
        self.tree_priority
    }

    /// Returns whether the compositor has been drawing every impl frame.
    #[must_use]
    pub fn drawing_continuously(&self) -> bool {
        self.drawing_continuously
    }

    /// Returns whether a main frame has been sent every impl frame.
    #[must_use]
    pub fn begin_main_frame_needed_continuously(&self) -> bool {
        self.begin_main_frame_needed_continuously
    }

    /// Returns whether every recent main frame has committed.
    #[must_use]
    pub fn begin_main_frame_committing_continuously(&self) -> bool {
        self.begin_main_frame_committing_continuously
    }

    /// Returns when the in-flight main frame was sent, if one is in flight.
    #[must_use]
    pub fn begin_main_frame_sent_time(&self) -> Option<HostTime> {
        self.begin_main_frame_sent.get()
    }

    /// Returns the history for `kind`.
    #[must_use]
    pub fn history(&self, kind: HistoryKind) -> &RollingDurationEstimator {
        &self.histories[kind.index()]
    }

    /// Returns the number of samples in the history for `kind`.
    #[must_use]
    pub fn sample_count(&self, kind: HistoryKind) -> usize {
        self.history(kind).len()
    }

    /// Empties every history. In-flight stage timestamps are kept.
    pub fn clear_history(&mut self) {
        for h in &mut self.histories {
            h.clear();
        }
    }

    // -- impl frame ----------------------------------------------------------

    /// An impl frame is starting.
    pub fn will_begin_impl_frame(&mut self, args: &BeginFrameArgs) {
        let now = self.clock.now();

        // A main thread that finishes between impl frames would otherwise
        // look continuously busy.
        if !self.did_send_begin_main_frame {
            self.begin_main_frame_needed_continuously = false;
            self.begin_main_frame_committing_continuously = false;
        }

        if args.kind == BeginFrameKind::Normal {
            self.reporter
                .add_begin_impl_frame_latency(now.saturating_duration_since(args.frame_time));
        }

        self.did_send_begin_main_frame = false;
        self.transition(
            StageTransition::new(TransitionKind::WillBeginImplFrame, now)
                .with_frame_id(args.frame_id),
        );
    }

    /// The current impl frame is finishing.
    pub fn will_finish_impl_frame(&mut self, needs_redraw: bool, frame_id: BeginFrameId) {
        if !needs_redraw {
            self.drawing_continuously = false;
        }
        let now = self.clock.now();
        self.transition(
            StageTransition::new(TransitionKind::WillFinishImplFrame, now).with_frame_id(frame_id),
        );
    }

    /// No impl frames are expected for a while.
    pub fn begin_impl_frame_not_expected_soon(&mut self) {
        self.begin_main_frame_needed_continuously = false;
        self.begin_main_frame_committing_continuously = false;
        self.drawing_continuously = false;
    }

    /// A new frame sink was created; the next draw starts a fresh interval.
    pub fn did_create_and_initialize_frame_sink(&mut self) {
        self.drawing_continuously = false;
        self.previous_draw_end = None;
    }

    // -- main frame ----------------------------------------------------------

    /// A main frame is being sent to the main thread.
    pub fn will_begin_main_frame(&mut self, args: &BeginFrameArgs) {
        let now = self.clock.now();
        self.begin_main_frame_sent.open(now);
        self.on_critical_path = args.on_critical_path;
        self.begin_main_frame_id = Some(args.frame_id);
        self.begin_main_frame_frame_time = Some(args.frame_time);
        self.did_send_begin_main_frame = true;
        self.begin_main_frame_needed_continuously = true;

        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::MainFrame,
            timestamp: now,
        });
        self.transition(
            StageTransition::new(TransitionKind::WillBeginMainFrame, now)
                .with_frame_id(args.frame_id),
        );
    }

    /// The main thread started the in-flight main frame at
    /// `main_thread_start_time`.
    pub fn begin_main_frame_started(&mut self, main_thread_start_time: HostTime) {
        let now = self.clock.now();
        let _ = self.begin_main_frame_sent.expect_open("begin_main_frame_started");
        self.begin_main_frame_start.open(main_thread_start_time);
        self.transition(self.main_frame_transition(TransitionKind::BeginMainFrameStarted, now));
    }

    /// The in-flight main frame ended without committing.
    pub fn begin_main_frame_aborted(&mut self, frame_id: BeginFrameId, reason: CommitEarlyOutReason) {
        self.begin_main_frame_committing_continuously = false;
        let end = self.clock.now();
        self.did_begin_main_frame(end);
        self.transition(
            StageTransition::new(TransitionKind::BeginMainFrameAborted, end)
                .with_frame_id(frame_id)
                .with_skip_reason(SkipReason::CommitEarlyOut(reason)),
        );
    }

    /// The main thread is ready to commit.
    pub fn notify_ready_to_commit(&mut self) {
        let now = self.clock.now();
        if let Some(start) = self
            .begin_main_frame_start
            .expect_open("notify_ready_to_commit")
        {
            let d = now.saturating_duration_since(start);
            self.reporter
                .add_begin_main_frame_start_to_ready_to_commit_duration(d);
            self.record(HistoryKind::StartToReadyToCommit, d);
        }
        self.transition(self.main_frame_transition(TransitionKind::ReadyToCommit, now));
    }

    /// Closes the main-frame queue stage. Shared by the commit and abort
    /// paths.
    fn did_begin_main_frame(&mut self, end: HostTime) {
        let sent = self.begin_main_frame_sent.close(end);

        // Without a start time from the main thread, assume the frame started
        // immediately for scheduling purposes but keep the degenerate zero
        // queue out of the histories and reports.
        let reported_start = self.begin_main_frame_start.reset();
        let start = reported_start.unwrap_or(sent);

        let sent_to_end = end.saturating_duration_since(sent);
        let queue = start.saturating_duration_since(sent);
        let start_to_end = end.saturating_duration_since(start);

        self.instrumentation
            .add_begin_main_frame_to_commit_duration(sent_to_end);

        if reported_start.is_some() {
            self.reporter
                .add_begin_main_frame_queue_duration(queue, self.on_critical_path);
            self.reporter
                .add_begin_main_frame_start_to_commit_duration(start_to_end);
            self.record(HistoryKind::QueueAll, queue);
            if self.on_critical_path {
                self.record(HistoryKind::QueueCritical, queue);
            } else {
                self.record(HistoryKind::QueueNotCritical, queue);
            }
        }

        if self.begin_main_frame_needed_continuously {
            if let Some(prev) = self.previous_begin_main_frame_end {
                self.reporter.add_begin_main_frame_interval(
                    end.saturating_duration_since(prev),
                    self.on_critical_path,
                );
            }
            self.previous_begin_main_frame_end = Some(end);
        }

        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::MainFrame,
            timestamp: end,
            duration: sent_to_end,
        });
        self.begin_main_frame_id = None;
    }

    // -- commit --------------------------------------------------------------

    /// A commit is starting.
    pub fn will_commit(&mut self) {
        let now = self.clock.now();
        let _ = self.begin_main_frame_sent.expect_open("will_commit");
        self.commit_start.open(now);
        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Commit,
            timestamp: now,
        });
        self.transition(self.main_frame_transition(TransitionKind::WillCommit, now));
    }

    /// The commit finished and created a pending tree.
    pub fn did_commit(&mut self) {
        let end = self.clock.now();
        debug_assert!(
            !self.pending_tree_created.is_open(),
            "commit created a pending tree while one already exists"
        );
        let start = self.commit_start.close(end);
        let transition = self.main_frame_transition(TransitionKind::DidCommit, end);
        let main_frame_time = self.begin_main_frame_frame_time.take();

        self.begin_main_frame_committing_continuously = true;
        self.did_begin_main_frame(end);

        let d = end.saturating_duration_since(start);
        self.reporter.add_commit_duration(d);
        self.record(HistoryKind::Commit, d);
        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::Commit,
            timestamp: end,
            duration: d,
        });

        self.pending_tree_is_impl_side = false;
        self.pending_tree_created.reset();
        self.pending_tree_created.open(end);
        self.pending_tree_main_frame_time = main_frame_time;
        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::PendingTree,
            timestamp: end,
        });
        self.transition(transition);
    }

    /// The compositor is creating a pending tree without a commit.
    pub fn will_invalidate_on_impl_side(&mut self) {
        let now = self.clock.now();
        debug_assert!(
            !self.pending_tree_is_impl_side,
            "impl-side invalidation while another is pending"
        );
        self.pending_tree_created.open(now);
        self.pending_tree_is_impl_side = true;
        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::PendingTree,
            timestamp: now,
        });
        self.transition(StageTransition::new(
            TransitionKind::WillInvalidateOnImplSide,
            now,
        ));
    }

    // -- prepare tiles -------------------------------------------------------

    /// Tile preparation is starting.
    pub fn will_prepare_tiles(&mut self) {
        let now = self.clock.now();
        self.prepare_tiles_start.open(now);
        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::PrepareTiles,
            timestamp: now,
        });
        self.transition(StageTransition::new(TransitionKind::WillPrepareTiles, now));
    }

    /// Tile preparation finished.
    pub fn did_prepare_tiles(&mut self) {
        let end = self.clock.now();
        let start = self.prepare_tiles_start.close(end);
        let d = end.saturating_duration_since(start);
        self.reporter.add_prepare_tiles_duration(d);
        self.record(HistoryKind::PrepareTiles, d);
        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::PrepareTiles,
            timestamp: end,
            duration: d,
        });
        self.transition(StageTransition::new(TransitionKind::DidPrepareTiles, end));
    }

    // -- activation ----------------------------------------------------------

    /// The pending tree is ready to activate.
    pub fn ready_to_activate(&mut self) {
        let now = self.clock.now();
        let Some(created) = self.pending_tree_created.expect_open("ready_to_activate") else {
            self.transition(StageTransition::new(TransitionKind::ReadyToActivate, now));
            return;
        };
        self.pending_tree_ready_to_activate.open(now);

        let d = now.saturating_duration_since(created);
        if self.pending_tree_is_impl_side {
            self.reporter
                .add_invalidation_to_ready_to_activate_duration(d, self.tree_priority);
        } else {
            // Snapshot the prediction before this sample joins the history.
            let estimate = self.commit_to_ready_to_activate_estimate();
            self.instrumentation
                .add_commit_to_activate_duration(d, estimate);
            self.reporter
                .add_commit_to_ready_to_activate_duration(d, self.tree_priority);
            self.record(HistoryKind::CommitToReadyToActivate, d);
        }

        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::PendingTree,
            timestamp: now,
            duration: d,
        });
        self.transition(StageTransition::new(TransitionKind::ReadyToActivate, now));
    }

    /// Activation is starting.
    pub fn will_activate(&mut self) {
        let now = self.clock.now();
        self.activate_start.open(now);

        // Trees can be activated before they are ready, e.g. on context loss
        // or visibility changes.
        let ready = match self.pending_tree_ready_to_activate.get() {
            Some(t) => t,
            None => {
                self.pending_tree_ready_to_activate.open(now);
                now
            }
        };
        self.reporter.add_ready_to_activate_to_will_activate_duration(
            now.saturating_duration_since(ready),
            self.pending_tree_is_impl_side,
        );

        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Activate,
            timestamp: now,
        });
        self.transition(StageTransition::new(TransitionKind::WillActivate, now));
    }

    /// Activation finished; the pending tree is now the active tree.
    pub fn did_activate(&mut self) {
        let end = self.clock.now();
        let start = self.activate_start.close(end);
        let d = end.saturating_duration_since(start);
        self.reporter.add_activate_duration(d);
        self.record(HistoryKind::Activate, d);

        // A synchronous compositor does not necessarily draw every active
        // tree.
        if !self.config.synchronous_compositor {
            debug_assert!(
                self.active_tree_main_frame_time.is_none(),
                "activated a tree before the previous active tree was drawn"
            );
        }
        self.active_tree_main_frame_time = self.pending_tree_main_frame_time.take();

        self.pending_tree_created.reset();
        self.pending_tree_ready_to_activate.reset();
        self.pending_tree_is_impl_side = false;

        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::Activate,
            timestamp: end,
            duration: d,
        });
        self.transition(StageTransition::new(TransitionKind::DidActivate, end));
    }

    // -- draw ----------------------------------------------------------------

    /// A draw is starting.
    pub fn will_draw(&mut self) {
        let now = self.clock.now();
        self.draw_start.open(now);
        self.tracer.stage_begin(&StageBeginEvent {
            stage: StageKind::Draw,
            timestamp: now,
        });
        self.transition(StageTransition::new(TransitionKind::WillDraw, now));
    }

    /// The draw finished.
    pub fn did_draw(&mut self, info: &DrawInfo) {
        let end = self.clock.now();
        let start = self.draw_start.close(end);
        let d = end.saturating_duration_since(start);

        // Snapshot the prediction before this sample joins the history.
        let estimate = self.draw_estimate();
        self.instrumentation.add_draw_duration(d, estimate);
        self.reporter.add_draw_duration(d);
        self.record(HistoryKind::Draw, d);

        self.drawing_continuously = true;
        if let Some(prev) = self.previous_draw_end {
            let interval = end.saturating_duration_since(prev);
            self.reporter.add_draw_interval(interval);
            if interval > self.config.draw_interval_trace_threshold {
                self.tracer.long_draw_interval(&LongDrawIntervalEvent {
                    draw_start: start,
                    draw_end: end,
                    interval,
                });
            }
            if info.has_custom_property_animations && self.previous_frame_had_custom_animations {
                self.reporter
                    .add_draw_interval_with_custom_animations(interval);
            }
        }
        self.previous_frame_had_custom_animations = info.has_custom_property_animations;
        self.previous_draw_end = Some(end);

        if info.used_new_active_tree {
            if let Some(main_frame_time) = self.active_tree_main_frame_time.take() {
                self.tracer
                    .main_and_impl_frame_delta(&MainAndImplFrameDeltaEvent {
                        timestamp: end,
                        delta: info
                            .impl_frame_time
                            .saturating_duration_since(main_frame_time),
                    });
            }
            if self.begin_main_frame_committing_continuously {
                if let Some(prev) = self.previous_new_active_tree_draw_end {
                    self.reporter
                        .add_commit_interval(end.saturating_duration_since(prev));
                }
                self.previous_new_active_tree_draw_end = Some(end);
            }
        }

        self.tracer.stage_end(&StageEndEvent {
            stage: StageKind::Draw,
            timestamp: end,
            duration: d,
        });
        self.transition(StageTransition::new(TransitionKind::DidDraw, end));
    }

    // -- submission ----------------------------------------------------------

    /// A compositor frame was submitted for `frame_id`.
    pub fn did_submit_compositor_frame(&mut self, frame_token: u32, frame_id: BeginFrameId) {
        let now = self.clock.now();
        self.transition(
            StageTransition::new(TransitionKind::DidSubmitCompositorFrame, now)
                .with_frame_id(frame_id)
                .with_frame_token(frame_token),
        );
    }

    /// The impl frame for `frame_id` produced no compositor frame.
    pub fn did_not_produce_frame(&mut self, frame_id: BeginFrameId, reason: FrameSkippedReason) {
        let now = self.clock.now();
        self.transition(
            StageTransition::new(TransitionKind::DidNotProduceFrame, now)
                .with_frame_id(frame_id)
                .with_skip_reason(SkipReason::FrameSkipped(reason)),
        );
    }

    /// The compositor frame with `frame_token` was presented.
    pub fn did_present_compositor_frame(&mut self, frame_token: u32) {
        let now = self.clock.now();
        self.transition(
            StageTransition::new(TransitionKind::DidPresentCompositorFrame, now)
                .with_frame_token(frame_token),
        );
    }

    // -- helpers -------------------------------------------------------------

    fn record(&mut self, kind: HistoryKind, d: Duration) {
        if self.recording_enabled {
            self.histories[kind.index()].insert_sample(d);
        }
    }

    fn main_frame_transition(&self, kind: TransitionKind, now: HostTime) -> StageTransition {
        let transition = StageTransition::new(kind, now);
        match self.begin_main_frame_id {
            Some(id) => transition.with_frame_id(id),
            None => transition,
        }
    }

    fn transition(&mut self, transition: StageTransition) {
        self.controller.on_transition(&transition);
    }
}
