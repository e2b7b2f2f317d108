// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage-transition forwarding for cross-frame correlation.
//!
//! The tracker forwards each transition it handles to a
//! [`ReportingController`] exactly once, carrying whatever frame identity is
//! known at that point. The controller correlates these across stages and
//! frames; the tracker never reads anything back from it.

use crate::frame::{BeginFrameId, CommitEarlyOutReason, FrameSkippedReason};
use crate::time::HostTime;

/// Which pipeline transition happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// An impl frame began.
    WillBeginImplFrame,
    /// An impl frame finished.
    WillFinishImplFrame,
    /// A main frame was sent to the main thread.
    WillBeginMainFrame,
    /// The main thread started the in-flight main frame.
    BeginMainFrameStarted,
    /// The main thread is ready to commit.
    ReadyToCommit,
    /// A main frame ended without committing.
    BeginMainFrameAborted,
    /// A commit began.
    WillCommit,
    /// A commit finished.
    DidCommit,
    /// A pending tree was created without a commit.
    WillInvalidateOnImplSide,
    /// Tile preparation began.
    WillPrepareTiles,
    /// Tile preparation finished.
    DidPrepareTiles,
    /// The pending tree is ready to activate.
    ReadyToActivate,
    /// Activation began.
    WillActivate,
    /// Activation finished.
    DidActivate,
    /// A draw began.
    WillDraw,
    /// A draw finished.
    DidDraw,
    /// A compositor frame was submitted.
    DidSubmitCompositorFrame,
    /// An impl frame finished without a compositor frame.
    DidNotProduceFrame,
    /// A submitted compositor frame was presented.
    DidPresentCompositorFrame,
}

/// Why a stage ended without producing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// A main frame ended without a commit.
    CommitEarlyOut(CommitEarlyOutReason),
    /// An impl frame produced no compositor frame.
    FrameSkipped(FrameSkippedReason),
}

/// One transition, as forwarded to the [`ReportingController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StageTransition {
    /// What happened.
    pub kind: TransitionKind,
    /// When the tracker observed it.
    pub timestamp: HostTime,
    /// Frame the transition belongs to, if known at this point.
    pub frame_id: Option<BeginFrameId>,
    /// Token of the submitted compositor frame, for submit/present.
    pub frame_token: Option<u32>,
    /// Why the stage produced nothing, for aborts and skips.
    pub skip_reason: Option<SkipReason>,
}

impl StageTransition {
    /// Creates a transition with no frame identity attached.
    #[must_use]
    pub const fn new(kind: TransitionKind, timestamp: HostTime) -> Self {
        Self {
            kind,
            timestamp,
            frame_id: None,
            frame_token: None,
            skip_reason: None,
        }
    }

    /// Attaches a frame id.
    #[must_use]
    pub const fn with_frame_id(mut self, frame_id: BeginFrameId) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    /// Attaches a compositor frame token.
    #[must_use]
    pub const fn with_frame_token(mut self, frame_token: u32) -> Self {
        self.frame_token = Some(frame_token);
        self
    }

    /// Attaches a skip reason.
    #[must_use]
    pub const fn with_skip_reason(mut self, reason: SkipReason) -> Self {
        self.skip_reason = Some(reason);
        self
    }
}

/// Receives every stage transition the tracker handles.
pub trait ReportingController {
    /// Called once per transition.
    fn on_transition(&mut self, transition: &StageTransition) {
        _ = transition;
    }
}

/// A [`ReportingController`] that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReportingController;

impl ReportingController for NoopReportingController {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_attach_optional_fields() {
        let t = StageTransition::new(TransitionKind::DidNotProduceFrame, HostTime(5))
            .with_frame_id(BeginFrameId::new(1, 2))
            .with_skip_reason(SkipReason::FrameSkipped(FrameSkippedReason::NoDamage));
        assert_eq!(t.frame_id, Some(BeginFrameId::new(1, 2)));
        assert_eq!(t.frame_token, None);
        assert_eq!(
            t.skip_reason,
            Some(SkipReason::FrameSkipped(FrameSkippedReason::NoDamage))
        );
    }
}
