// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`], [`InstrumentationSink`] and
//! [`ReportingController`], and writes one line per event to a
//! [`Write`](std::io::Write) destination (default: stderr). Timestamps are
//! converted to microseconds using a [`Timebase`].

use std::io::Write;

use cadence_core::instrumentation::InstrumentationSink;
use cadence_core::reporting::{ReportingController, SkipReason, StageTransition};
use cadence_core::time::{Duration, HostTime, Timebase};
use cadence_core::trace::{
    LongDrawIntervalEvent, MainAndImplFrameDeltaEvent, StageBeginEvent, StageEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn us(&self, d: Duration) -> f64 {
        self.timebase.ticks_to_nanos(d.ticks()) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_nanos(t.ticks()) as f64 / 1000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[stage:begin] {} at {:.1}µs",
            e.stage.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_stage_end(&mut self, e: &StageEndEvent) {
        let _ = writeln!(
            self.writer,
            "[stage:end] {} at {:.1}µs took={:.1}µs",
            e.stage.name(),
            self.host_us(e.timestamp),
            self.us(e.duration),
        );
    }

    fn on_long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
        let _ = writeln!(
            self.writer,
            "[draw:LONG] interval={:.1}µs draw={:.1}..{:.1}µs",
            self.us(e.interval),
            self.host_us(e.draw_start),
            self.host_us(e.draw_end),
        );
    }

    fn on_main_and_impl_frame_delta(&mut self, e: &MainAndImplFrameDeltaEvent) {
        let _ = writeln!(
            self.writer,
            "[delta] main→impl={:.1}µs at {:.1}µs",
            self.us(e.delta),
            self.host_us(e.timestamp),
        );
    }
}

impl<W: Write> InstrumentationSink for PrettyPrintSink<W> {
    fn add_begin_main_frame_to_commit_duration(&mut self, d: Duration) {
        let _ = writeln!(self.writer, "[instr] main_frame_to_commit={:.1}µs", self.us(d));
    }

    fn add_commit_to_activate_duration(&mut self, d: Duration, estimate: Duration) {
        let _ = writeln!(
            self.writer,
            "[instr] commit_to_activate={:.1}µs estimate={:.1}µs",
            self.us(d),
            self.us(estimate),
        );
    }

    fn add_draw_duration(&mut self, d: Duration, estimate: Duration) {
        let _ = writeln!(
            self.writer,
            "[instr] draw={:.1}µs estimate={:.1}µs",
            self.us(d),
            self.us(estimate),
        );
    }
}

impl<W: Write> ReportingController for PrettyPrintSink<W> {
    fn on_transition(&mut self, t: &StageTransition) {
        let _ = write!(
            self.writer,
            "[transition] {:?} at {:.1}µs",
            t.kind,
            self.host_us(t.timestamp),
        );
        if let Some(id) = t.frame_id {
            let _ = write!(self.writer, " frame={id:?}");
        }
        if let Some(token) = t.frame_token {
            let _ = write!(self.writer, " token={token}");
        }
        match t.skip_reason {
            Some(SkipReason::CommitEarlyOut(r)) => {
                let _ = write!(self.writer, " early_out={r:?}");
            }
            Some(SkipReason::FrameSkipped(r)) => {
                let _ = write!(self.writer, " skipped={r:?}");
            }
            None => {}
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::frame::{BeginFrameId, FrameSkippedReason};
    use cadence_core::reporting::TransitionKind;

    #[test]
    fn long_draw_interval_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_long_draw_interval(&LongDrawIntervalEvent {
            draw_start: HostTime(40_000_000),
            draw_end: HostTime(41_000_000),
            interval: Duration(40_000_000),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[draw:LONG]"), "got: {output}");
        assert!(output.contains("interval=40000.0µs"), "got: {output}");
    }

    #[test]
    fn transition_line_lists_known_fields() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_transition(
            &StageTransition::new(TransitionKind::DidNotProduceFrame, HostTime(16))
                .with_frame_id(BeginFrameId::new(0, 4))
                .with_skip_reason(SkipReason::FrameSkipped(FrameSkippedReason::NoDamage)),
        );
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[transition] DidNotProduceFrame at 16.0µs"), "got: {output}");
        assert!(output.contains("skipped=NoDamage"), "got: {output}");
        assert!(!output.contains("token="), "got: {output}");
        assert!(output.ends_with('\n'), "got: {output}");
    }

    #[test]
    fn instrumentation_line_pairs_duration_and_estimate() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.add_draw_duration(Duration(3_000), Duration(2_500));
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[instr] draw=3.0µs estimate=2.5µs\n");
    }
}
