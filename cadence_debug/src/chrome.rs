// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each stage gets its own track (`tid`) since stages overlap. Long draw
//! intervals become async `b`/`e` pairs spanning the draw that ended the gap.
//! Instrumentation records carry no timestamp of their own and are placed as
//! counters at the most recent timestamp seen in the recording.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::reporting::SkipReason;
use cadence_core::time::{Duration, HostTime, Timebase};
use cadence_core::trace::StageKind;

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 0;
const TID_MARKERS: u32 = 0;
const TID_TRANSITIONS: u32 = 1;

fn stage_tid(stage: StageKind) -> u32 {
    match stage {
        StageKind::MainFrame => 10,
        StageKind::Commit => 11,
        StageKind::PrepareTiles => 12,
        StageKind::PendingTree => 13,
        StageKind::Activate => 14,
        StageKind::Draw => 15,
    }
}

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let us = |t: HostTime| ticks_to_us(t.ticks(), timebase);
    let dur_us = |d: Duration| ticks_to_us(d.ticks(), timebase);

    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;
    let mut next_async_id: u64 = 0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::StageBegin(e) => {
                last_ts = us(e.timestamp);
                events.push(json!({
                    "ph": "B",
                    "name": e.stage.name(),
                    "cat": "Pipeline",
                    "ts": last_ts,
                    "pid": PID,
                    "tid": stage_tid(e.stage),
                }));
            }
            RecordedEvent::StageEnd(e) => {
                last_ts = us(e.timestamp);
                events.push(json!({
                    "ph": "E",
                    "name": e.stage.name(),
                    "cat": "Pipeline",
                    "ts": last_ts,
                    "pid": PID,
                    "tid": stage_tid(e.stage),
                    "args": {
                        "duration_us": dur_us(e.duration),
                    }
                }));
            }
            RecordedEvent::LongDrawInterval(e) => {
                let id = next_async_id;
                next_async_id += 1;
                last_ts = us(e.draw_end);
                events.push(json!({
                    "ph": "b",
                    "name": "Long Draw Interval",
                    "cat": "Scheduling",
                    "id": id,
                    "ts": us(e.draw_start),
                    "pid": PID,
                    "tid": TID_MARKERS,
                    "args": {
                        "interval_us": dur_us(e.interval),
                    }
                }));
                events.push(json!({
                    "ph": "e",
                    "name": "Long Draw Interval",
                    "cat": "Scheduling",
                    "id": id,
                    "ts": last_ts,
                    "pid": PID,
                    "tid": TID_MARKERS,
                }));
            }
            RecordedEvent::MainAndImplFrameDelta(e) => {
                last_ts = us(e.timestamp);
                events.push(json!({
                    "ph": "i",
                    "name": "MainAndImplFrameTimeDelta",
                    "cat": "Scheduling",
                    "ts": last_ts,
                    "pid": PID,
                    "tid": TID_MARKERS,
                    "s": "t",
                    "args": {
                        "delta_us": dur_us(e.delta),
                    }
                }));
            }
            RecordedEvent::MainFrameToCommit { duration } => {
                events.push(counter(
                    "MainFrameToCommit",
                    last_ts,
                    json!({ "duration_us": dur_us(duration) }),
                ));
            }
            RecordedEvent::CommitToActivate { duration, estimate } => {
                events.push(counter(
                    "CommitToActivate",
                    last_ts,
                    json!({
                        "duration_us": dur_us(duration),
                        "estimate_us": dur_us(estimate),
                    }),
                ));
            }
            RecordedEvent::Draw { duration, estimate } => {
                events.push(counter(
                    "Draw",
                    last_ts,
                    json!({
                        "duration_us": dur_us(duration),
                        "estimate_us": dur_us(estimate),
                    }),
                ));
            }
            RecordedEvent::Transition(t) => {
                last_ts = us(t.timestamp);
                let skip_reason = t.skip_reason.map(|r| match r {
                    SkipReason::CommitEarlyOut(r) => format!("{r:?}"),
                    SkipReason::FrameSkipped(r) => format!("{r:?}"),
                });
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", t.kind),
                    "cat": "Reporting",
                    "ts": last_ts,
                    "pid": PID,
                    "tid": TID_TRANSITIONS,
                    "s": "t",
                    "args": {
                        "source_id": t.frame_id.map(|id| id.source_id),
                        "sequence_number": t.frame_id.map(|id| id.sequence_number),
                        "frame_token": t.frame_token,
                        "skip_reason": skip_reason,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn counter(name: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "C",
        "name": name,
        "cat": "Instrumentation",
        "ts": ts,
        "pid": PID,
        "args": args,
    })
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use cadence_core::frame::{BeginFrameId, CommitEarlyOutReason};
    use cadence_core::instrumentation::InstrumentationSink;
    use cadence_core::reporting::{ReportingController, StageTransition, TransitionKind};
    use cadence_core::trace::{LongDrawIntervalEvent, StageBeginEvent, StageEndEvent, TraceSink};

    fn export_to_values(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(&rec.to_bytes(), Timebase::NANOS, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn stage_events_become_begin_end_on_their_track() {
        let mut rec = RecorderSink::new();
        rec.on_stage_begin(&StageBeginEvent {
            stage: StageKind::Commit,
            timestamp: HostTime(1_000_000),
        });
        rec.on_stage_end(&StageEndEvent {
            stage: StageKind::Commit,
            timestamp: HostTime(3_000_000),
            duration: Duration(2_000_000),
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "commit");
        assert_eq!(parsed[0]["ts"], 1000.0);
        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["args"]["duration_us"], 2000.0);
        assert_eq!(parsed[0]["tid"], parsed[1]["tid"]);
    }

    #[test]
    fn long_draw_interval_is_an_async_pair() {
        let mut rec = RecorderSink::new();
        rec.on_long_draw_interval(&LongDrawIntervalEvent {
            draw_start: HostTime(40_000_000),
            draw_end: HostTime(41_000_000),
            interval: Duration(40_000_000),
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["ph"], "b");
        assert_eq!(parsed[1]["ph"], "e");
        assert_eq!(parsed[0]["name"], "Long Draw Interval");
        assert_eq!(parsed[0]["id"], parsed[1]["id"]);
        assert_eq!(parsed[0]["ts"], 40_000.0);
        assert_eq!(parsed[1]["ts"], 41_000.0);
        assert_eq!(parsed[0]["args"]["interval_us"], 40_000.0);
    }

    #[test]
    fn instrumentation_counter_uses_last_timestamp() {
        let mut rec = RecorderSink::new();
        rec.on_transition(
            &StageTransition::new(TransitionKind::BeginMainFrameAborted, HostTime(5_000))
                .with_frame_id(BeginFrameId::new(1, 3))
                .with_skip_reason(SkipReason::CommitEarlyOut(
                    CommitEarlyOutReason::FinishedNoUpdates,
                )),
        );
        rec.add_begin_main_frame_to_commit_duration(Duration(2_000));

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["name"], "BeginMainFrameAborted");
        assert_eq!(parsed[0]["args"]["sequence_number"], 3);
        assert_eq!(parsed[0]["args"]["skip_reason"], "FinishedNoUpdates");
        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[1]["ts"], 5.0);
        assert_eq!(parsed[1]["args"]["duration_us"], 2.0);
    }

    #[test]
    fn tracker_recording_exports_long_draw_gap() {
        use cadence_core::frame::DrawInfo;
        use cadence_core::reporter::NullReporter;
        use cadence_core::time::ManualClock;
        use cadence_core::tracker::{PipelineTimingTracker, TrackerConfig};

        let clock = ManualClock::new(HostTime(0));
        let rec = RecorderSink::new();
        let mut tracker =
            PipelineTimingTracker::new(TrackerConfig::new(), clock.clone(), Box::new(NullReporter))
                .with_instrumentation(Box::new(rec.clone()))
                .with_reporting_controller(Box::new(rec.clone()))
                .with_trace_sink(Box::new(rec.clone()));
        for gap_ms in [0, 10, 40] {
            clock.advance(Duration(gap_ms * 1_000_000));
            tracker.will_draw();
            clock.advance(Duration(1_000_000));
            tracker.did_draw(&DrawInfo::default());
        }

        let parsed = export_to_values(&rec);
        let long: Vec<_> = parsed
            .iter()
            .filter(|e| e["name"] == "Long Draw Interval")
            .collect();
        assert_eq!(long.len(), 2, "one b/e pair for the 41ms gap");
        let draws = parsed.iter().filter(|e| e["ph"] == "C").count();
        assert_eq!(draws, 3, "one draw counter per draw");
        let stage_ends = parsed.iter().filter(|e| e["ph"] == "E").count();
        assert_eq!(stage_ends, 3, "stage events are on with the trace feature");
        let did_draw = parsed.iter().filter(|e| e["name"] == "DidDraw").count();
        assert_eq!(did_draw, 3, "each draw forwards its transition");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
