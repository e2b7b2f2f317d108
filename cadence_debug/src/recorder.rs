// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`], [`InstrumentationSink`] and
//! [`ReportingController`], and encodes everything it receives into one
//! buffer as little-endian records. The tracker owns each collaborator, so
//! clones of a recorder share the buffer: hand one clone to each slot and
//! keep one to read back. [`decode`] turns the bytes into
//! [`RecordedEvent`]s.

use std::cell::RefCell;
use std::rc::Rc;

use cadence_core::frame::{BeginFrameId, CommitEarlyOutReason, FrameSkippedReason};
use cadence_core::instrumentation::InstrumentationSink;
use cadence_core::reporting::{ReportingController, SkipReason, StageTransition, TransitionKind};
use cadence_core::time::{Duration, HostTime};
use cadence_core::trace::{
    LongDrawIntervalEvent, MainAndImplFrameDeltaEvent, StageBeginEvent, StageEndEvent, StageKind,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STAGE_BEGIN: u8 = 1;
const TAG_STAGE_END: u8 = 2;
const TAG_LONG_DRAW_INTERVAL: u8 = 3;
const TAG_FRAME_DELTA: u8 = 4;
const TAG_MAIN_FRAME_TO_COMMIT: u8 = 5;
const TAG_COMMIT_TO_ACTIVATE: u8 = 6;
const TAG_DRAW_DURATION: u8 = 7;
const TAG_TRANSITION: u8 = 8;

const STAGES: [StageKind; 6] = [
    StageKind::MainFrame,
    StageKind::Commit,
    StageKind::PrepareTiles,
    StageKind::PendingTree,
    StageKind::Activate,
    StageKind::Draw,
];

const TRANSITIONS: [TransitionKind; 19] = [
    TransitionKind::WillBeginImplFrame,
    TransitionKind::WillFinishImplFrame,
    TransitionKind::WillBeginMainFrame,
    TransitionKind::BeginMainFrameAborted,
    TransitionKind::WillCommit,
    TransitionKind::DidCommit,
    TransitionKind::WillActivate,
    TransitionKind::DidActivate,
    TransitionKind::DidSubmitCompositorFrame,
    TransitionKind::DidNotProduceFrame,
    TransitionKind::DidPresentCompositorFrame,
    TransitionKind::BeginMainFrameStarted,
    TransitionKind::ReadyToCommit,
    TransitionKind::WillInvalidateOnImplSide,
    TransitionKind::WillPrepareTiles,
    TransitionKind::DidPrepareTiles,
    TransitionKind::ReadyToActivate,
    TransitionKind::WillDraw,
    TransitionKind::DidDraw,
];

const EARLY_OUTS: [CommitEarlyOutReason; 5] = [
    CommitEarlyOutReason::AbortedFrameSinkLost,
    CommitEarlyOutReason::AbortedNotVisible,
    CommitEarlyOutReason::AbortedDeferredMainFrameUpdate,
    CommitEarlyOutReason::AbortedDeferredCommit,
    CommitEarlyOutReason::FinishedNoUpdates,
];

const FRAME_SKIPS: [FrameSkippedReason; 4] = [
    FrameSkippedReason::NoDamage,
    FrameSkippedReason::WaitingOnMain,
    FrameSkippedReason::DrawThrottled,
    FrameSkippedReason::RecoverLatency,
];

/// Position of `item` in `table`, as a one-byte code.
fn code_of<T: PartialEq>(table: &[T], item: &T) -> u8 {
    table
        .iter()
        .position(|t| t == item)
        .and_then(|i| u8::try_from(i).ok())
        .unwrap_or(u8::MAX)
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A sink that encodes events into a compact binary buffer.
///
/// Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Removes and returns the recorded bytes, leaving the buffer empty.
    #[must_use]
    pub fn take_bytes(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buf.borrow_mut())
    }

    /// Returns the number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u32(&self, v: u32) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&self, v: u64) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_stage(&self, stage: StageKind) {
        self.write_u8(code_of(&STAGES, &stage));
    }

    fn write_frame_id(&self, id: Option<BeginFrameId>) {
        match id {
            Some(id) => {
                self.write_u8(1);
                self.write_u64(id.source_id);
                self.write_u64(id.sequence_number);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
                self.write_u64(0);
            }
        }
    }

    fn write_frame_token(&self, token: Option<u32>) {
        self.write_u8(u8::from(token.is_some()));
        self.write_u32(token.unwrap_or(0));
    }

    /// Family byte (`0` none, `1` early-out, `2` frame skipped), then code.
    fn write_skip_reason(&self, reason: Option<SkipReason>) {
        let (family, code) = match reason {
            None => (0, 0),
            Some(SkipReason::CommitEarlyOut(r)) => (1, code_of(&EARLY_OUTS, &r)),
            Some(SkipReason::FrameSkipped(r)) => (2, code_of(&FRAME_SKIPS, &r)),
        };
        self.write_u8(family);
        self.write_u8(code);
    }
}

impl TraceSink for RecorderSink {
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        self.write_u8(TAG_STAGE_BEGIN);
        self.write_stage(e.stage);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_stage_end(&mut self, e: &StageEndEvent) {
        self.write_u8(TAG_STAGE_END);
        self.write_stage(e.stage);
        self.write_u64(e.timestamp.ticks());
        self.write_u64(e.duration.ticks());
    }

    fn on_long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
        self.write_u8(TAG_LONG_DRAW_INTERVAL);
        self.write_u64(e.draw_start.ticks());
        self.write_u64(e.draw_end.ticks());
        self.write_u64(e.interval.ticks());
    }

    fn on_main_and_impl_frame_delta(&mut self, e: &MainAndImplFrameDeltaEvent) {
        self.write_u8(TAG_FRAME_DELTA);
        self.write_u64(e.timestamp.ticks());
        self.write_u64(e.delta.ticks());
    }
}

impl InstrumentationSink for RecorderSink {
    fn add_begin_main_frame_to_commit_duration(&mut self, d: Duration) {
        self.write_u8(TAG_MAIN_FRAME_TO_COMMIT);
        self.write_u64(d.ticks());
    }

    fn add_commit_to_activate_duration(&mut self, d: Duration, estimate: Duration) {
        self.write_u8(TAG_COMMIT_TO_ACTIVATE);
        self.write_u64(d.ticks());
        self.write_u64(estimate.ticks());
    }

    fn add_draw_duration(&mut self, d: Duration, estimate: Duration) {
        self.write_u8(TAG_DRAW_DURATION);
        self.write_u64(d.ticks());
        self.write_u64(estimate.ticks());
    }
}

impl ReportingController for RecorderSink {
    fn on_transition(&mut self, t: &StageTransition) {
        self.write_u8(TAG_TRANSITION);
        self.write_u8(code_of(&TRANSITIONS, &t.kind));
        self.write_u64(t.timestamp.ticks());
        self.write_frame_id(t.frame_id);
        self.write_frame_token(t.frame_token);
        self.write_skip_reason(t.skip_reason);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`StageBeginEvent`].
    StageBegin(StageBeginEvent),
    /// A [`StageEndEvent`].
    StageEnd(StageEndEvent),
    /// A [`LongDrawIntervalEvent`].
    LongDrawInterval(LongDrawIntervalEvent),
    /// A [`MainAndImplFrameDeltaEvent`].
    MainAndImplFrameDelta(MainAndImplFrameDeltaEvent),
    /// Main frame sent to commit or abort.
    MainFrameToCommit {
        /// Observed duration.
        duration: Duration,
    },
    /// Commit to ready-to-activate, with the estimate current beforehand.
    CommitToActivate {
        /// Observed duration.
        duration: Duration,
        /// Estimate before this sample.
        estimate: Duration,
    },
    /// Draw, with the estimate current beforehand.
    Draw {
        /// Observed duration.
        duration: Duration,
        /// Estimate before this sample.
        estimate: Duration,
    },
    /// A forwarded [`StageTransition`].
    Transition(StageTransition),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_duration(&mut self) -> Option<Duration> {
        self.read_u64().map(Duration)
    }

    fn read_stage(&mut self) -> Option<StageKind> {
        STAGES.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_frame_id(&mut self) -> Option<Option<BeginFrameId>> {
        let present = self.read_u8()?;
        let source_id = self.read_u64()?;
        let sequence_number = self.read_u64()?;
        Some((present != 0).then(|| BeginFrameId::new(source_id, sequence_number)))
    }

    fn read_frame_token(&mut self) -> Option<Option<u32>> {
        let present = self.read_u8()?;
        let token = self.read_u32()?;
        Some((present != 0).then_some(token))
    }

    fn read_skip_reason(&mut self) -> Option<Option<SkipReason>> {
        let family = self.read_u8()?;
        let code = usize::from(self.read_u8()?);
        match family {
            0 => Some(None),
            1 => EARLY_OUTS
                .get(code)
                .map(|r| Some(SkipReason::CommitEarlyOut(*r))),
            _ => FRAME_SKIPS
                .get(code)
                .map(|r| Some(SkipReason::FrameSkipped(*r))),
        }
    }

    fn decode_transition(&mut self) -> Option<RecordedEvent> {
        let kind = *TRANSITIONS.get(usize::from(self.read_u8()?))?;
        let timestamp = self.read_time()?;
        let frame_id = self.read_frame_id()?;
        let frame_token = self.read_frame_token()?;
        let skip_reason = self.read_skip_reason()?;
        Some(RecordedEvent::Transition(StageTransition {
            kind,
            timestamp,
            frame_id,
            frame_token,
            skip_reason,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STAGE_BEGIN => Some(RecordedEvent::StageBegin(StageBeginEvent {
                stage: self.read_stage()?,
                timestamp: self.read_time()?,
            })),
            TAG_STAGE_END => Some(RecordedEvent::StageEnd(StageEndEvent {
                stage: self.read_stage()?,
                timestamp: self.read_time()?,
                duration: self.read_duration()?,
            })),
            TAG_LONG_DRAW_INTERVAL => Some(RecordedEvent::LongDrawInterval(LongDrawIntervalEvent {
                draw_start: self.read_time()?,
                draw_end: self.read_time()?,
                interval: self.read_duration()?,
            })),
            TAG_FRAME_DELTA => Some(RecordedEvent::MainAndImplFrameDelta(
                MainAndImplFrameDeltaEvent {
                    timestamp: self.read_time()?,
                    delta: self.read_duration()?,
                },
            )),
            TAG_MAIN_FRAME_TO_COMMIT => Some(RecordedEvent::MainFrameToCommit {
                duration: self.read_duration()?,
            }),
            TAG_COMMIT_TO_ACTIVATE => Some(RecordedEvent::CommitToActivate {
                duration: self.read_duration()?,
                estimate: self.read_duration()?,
            }),
            TAG_DRAW_DURATION => Some(RecordedEvent::Draw {
                duration: self.read_duration()?,
                estimate: self.read_duration()?,
            }),
            TAG_TRANSITION => self.decode_transition(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_buffer() {
        let rec = RecorderSink::new();
        let mut trace = rec.clone();
        let mut instrumentation = rec.clone();
        trace.on_long_draw_interval(&LongDrawIntervalEvent {
            draw_start: HostTime(100),
            draw_end: HostTime(200),
            interval: Duration(40),
        });
        instrumentation.add_draw_duration(Duration(3), Duration(2));

        let events: Vec<_> = decode(&rec.to_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::LongDrawInterval(LongDrawIntervalEvent {
                    draw_start: HostTime(100),
                    draw_end: HostTime(200),
                    interval: Duration(40),
                }),
                RecordedEvent::Draw {
                    duration: Duration(3),
                    estimate: Duration(2),
                },
            ]
        );
    }

    #[test]
    fn transitions_keep_optional_fields() {
        let mut rec = RecorderSink::new();
        let aborted = StageTransition::new(TransitionKind::BeginMainFrameAborted, HostTime(9))
            .with_frame_id(BeginFrameId::new(2, 40))
            .with_skip_reason(SkipReason::CommitEarlyOut(
                CommitEarlyOutReason::AbortedDeferredCommit,
            ));
        let skipped = StageTransition::new(TransitionKind::DidNotProduceFrame, HostTime(10))
            .with_skip_reason(SkipReason::FrameSkipped(FrameSkippedReason::RecoverLatency));
        let presented =
            StageTransition::new(TransitionKind::DidPresentCompositorFrame, HostTime(11))
                .with_frame_token(77);
        rec.on_transition(&aborted);
        rec.on_transition(&skipped);
        rec.on_transition(&presented);

        let events: Vec<_> = decode(&rec.to_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::Transition(aborted),
                RecordedEvent::Transition(skipped),
                RecordedEvent::Transition(presented),
            ]
        );
    }

    #[test]
    fn every_transition_kind_has_a_code() {
        let mut rec = RecorderSink::new();
        for kind in TRANSITIONS {
            rec.on_transition(&StageTransition::new(kind, HostTime(7)));
        }
        let kinds: Vec<_> = decode(&rec.to_bytes())
            .map(|e| match e {
                RecordedEvent::Transition(t) => t.kind,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(kinds, TRANSITIONS);
        assert_eq!(code_of(&TRANSITIONS, &TransitionKind::DidDraw), 18);
    }

    #[test]
    fn stage_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_stage_begin(&StageBeginEvent {
            stage: StageKind::PendingTree,
            timestamp: HostTime(5),
        });
        rec.on_stage_end(&StageEndEvent {
            stage: StageKind::PendingTree,
            timestamp: HostTime(8),
            duration: Duration(3),
        });
        let events: Vec<_> = decode(&rec.to_bytes()).collect();
        assert!(matches!(
            events[..],
            [RecordedEvent::StageBegin(_), RecordedEvent::StageEnd(e)]
                if e.stage == StageKind::PendingTree && e.duration == Duration(3)
        ));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.add_begin_main_frame_to_commit_duration(Duration(12));
        rec.add_begin_main_frame_to_commit_duration(Duration(13));
        let mut bytes = rec.take_bytes();
        bytes.pop();
        assert!(rec.is_empty());

        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(
            events,
            [RecordedEvent::MainFrameToCommit {
                duration: Duration(12)
            }]
        );
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
