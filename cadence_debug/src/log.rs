// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding of tracker events to the `tracing` ecosystem.
//!
//! [`LogSink`] emits every event under the `cadence` target. Stage
//! begin/end and transitions are `trace!`, instrumentation and frame deltas
//! are `debug!`, and long draw intervals are `warn!`. Durations are logged
//! in microseconds.

use cadence_core::instrumentation::InstrumentationSink;
use cadence_core::reporting::{ReportingController, StageTransition};
use cadence_core::time::{Duration, Timebase};
use cadence_core::trace::{
    LongDrawIntervalEvent, MainAndImplFrameDeltaEvent, StageBeginEvent, StageEndEvent, TraceSink,
};

/// Log target used for every event.
pub const TARGET: &str = "cadence";

/// Emits tracker events through `tracing`.
///
/// Stateless apart from the timebase, so one copy can fill every
/// collaborator slot.
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    timebase: Timebase,
}

impl LogSink {
    /// Creates a sink converting ticks with `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self { timebase }
    }

    fn us(&self, d: Duration) -> u64 {
        d.to_micros(self.timebase)
    }
}

impl TraceSink for LogSink {
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        tracing::trace!(
            target: TARGET,
            stage = e.stage.name(),
            ticks = e.timestamp.ticks(),
            "stage begin"
        );
    }

    fn on_stage_end(&mut self, e: &StageEndEvent) {
        tracing::trace!(
            target: TARGET,
            stage = e.stage.name(),
            duration_us = self.us(e.duration),
            "stage end"
        );
    }

    fn on_long_draw_interval(&mut self, e: &LongDrawIntervalEvent) {
        tracing::warn!(
            target: TARGET,
            interval_us = self.us(e.interval),
            "long draw interval"
        );
    }

    fn on_main_and_impl_frame_delta(&mut self, e: &MainAndImplFrameDeltaEvent) {
        tracing::debug!(
            target: TARGET,
            delta_us = self.us(e.delta),
            "main and impl frame delta"
        );
    }
}

impl InstrumentationSink for LogSink {
    fn add_begin_main_frame_to_commit_duration(&mut self, d: Duration) {
        tracing::debug!(target: TARGET, duration_us = self.us(d), "main frame to commit");
    }

    fn add_commit_to_activate_duration(&mut self, d: Duration, estimate: Duration) {
        tracing::debug!(
            target: TARGET,
            duration_us = self.us(d),
            estimate_us = self.us(estimate),
            "commit to activate"
        );
    }

    fn add_draw_duration(&mut self, d: Duration, estimate: Duration) {
        tracing::debug!(
            target: TARGET,
            duration_us = self.us(d),
            estimate_us = self.us(estimate),
            "draw"
        );
    }
}

impl ReportingController for LogSink {
    fn on_transition(&mut self, t: &StageTransition) {
        tracing::trace!(
            target: TARGET,
            kind = ?t.kind,
            frame_id = ?t.frame_id,
            frame_token = ?t.frame_token,
            skip_reason = ?t.skip_reason,
            "transition"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use cadence_core::time::HostTime;
    use cadence_core::trace::StageKind;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(max_level: tracing::Level, f: impl FnOnce(&mut LogSink)) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let mut sink = LogSink::new(Timebase::NANOS);
        tracing::subscriber::with_default(subscriber, || f(&mut sink));
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn long_draw_interval_is_a_warning() {
        let output = capture(tracing::Level::WARN, |sink| {
            sink.on_long_draw_interval(&LongDrawIntervalEvent {
                draw_start: HostTime(0),
                draw_end: HostTime(1),
                interval: Duration(40_000_000),
            });
        });
        assert!(output.contains("WARN"), "got: {output}");
        assert!(output.contains("interval_us=40000"), "got: {output}");
    }

    #[test]
    fn stage_events_need_trace_level() {
        let output = capture(tracing::Level::DEBUG, |sink| {
            sink.on_stage_end(&StageEndEvent {
                stage: StageKind::Draw,
                timestamp: HostTime(10),
                duration: Duration(2_000),
            });
            sink.add_draw_duration(Duration(2_000), Duration(1_000));
        });
        assert!(!output.contains("stage end"), "got: {output}");
        assert!(output.contains("estimate_us=1"), "got: {output}");
    }
}
