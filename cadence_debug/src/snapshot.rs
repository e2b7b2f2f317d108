// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON state dumps.
//!
//! [`snapshot_json`] renders a [`TimingSnapshot`] and [`histograms_json`]
//! renders a reporter's [`HistogramSet`], both with durations in
//! microseconds. [`write_state`] writes both as one pretty-printed object.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use cadence_core::metrics::HistogramSet;
use cadence_core::time::Timebase;
use cadence_core::tracker::TimingSnapshot;

/// Renders every estimate and flag in `snapshot`.
#[must_use]
pub fn snapshot_json(snapshot: &TimingSnapshot, timebase: Timebase) -> Value {
    let us = |d: cadence_core::time::Duration| d.to_micros(timebase);
    json!({
        "estimates_us": {
            "queue_duration_critical": us(snapshot.queue_duration_critical),
            "queue_duration_not_critical": us(snapshot.queue_duration_not_critical),
            "start_to_ready_to_commit": us(snapshot.start_to_ready_to_commit),
            "commit": us(snapshot.commit),
            "commit_to_ready_to_activate": us(snapshot.commit_to_ready_to_activate),
            "prepare_tiles": us(snapshot.prepare_tiles),
            "activate": us(snapshot.activate),
            "draw": us(snapshot.draw),
            "queue_to_activate_critical": us(snapshot.queue_to_activate_critical),
            "queue_to_activate_not_critical": us(snapshot.queue_to_activate_not_critical),
        },
        "drawing_continuously": snapshot.drawing_continuously,
        "begin_main_frame_needed_continuously": snapshot.begin_main_frame_needed_continuously,
        "begin_main_frame_committing_continuously":
            snapshot.begin_main_frame_committing_continuously,
        "recording_enabled": snapshot.recording_enabled,
    })
}

/// Renders summary statistics and the 50th, 90th and 99th percentiles for
/// every histogram in `set`.
#[must_use]
pub fn histograms_json(set: &HistogramSet) -> Value {
    let mut out = Map::new();
    for (name, h) in set.iter() {
        out.insert(
            name.to_owned(),
            json!({
                "count": h.count(),
                "sum_us": h.sum_micros(),
                "min_us": h.min_micros(),
                "max_us": h.max_micros(),
                "mean_us": h.mean_micros(),
                "p50_us": h.value_at_percentile_micros(50.0),
                "p90_us": h.value_at_percentile_micros(90.0),
                "p99_us": h.value_at_percentile_micros(99.0),
            }),
        );
    }
    Value::Object(out)
}

/// Writes the snapshot, and histograms if given, as pretty-printed JSON.
pub fn write_state(
    snapshot: &TimingSnapshot,
    histograms: Option<&HistogramSet>,
    timebase: Timebase,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let state = json!({
        "snapshot": snapshot_json(snapshot, timebase),
        "histograms": histograms.map(histograms_json),
    });
    serde_json::to_writer_pretty(&mut *writer, &state)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::frame::DrawInfo;
    use cadence_core::reporter::{ReporterCategory, create_reporter};
    use cadence_core::time::{Duration, HostTime, ManualClock};
    use cadence_core::tracker::{PipelineTimingTracker, TrackerConfig};

    #[test]
    fn tracker_state_round_trips_through_json() {
        let clock = ManualClock::new(HostTime(0));
        let reporter = create_reporter(ReporterCategory::Browser, Timebase::NANOS).unwrap();
        let mut tracker = PipelineTimingTracker::new(TrackerConfig::new(), clock.clone(), reporter);
        tracker.set_recording_enabled(true);
        for _ in 0..2 {
            tracker.will_draw();
            clock.advance(Duration(4_000_000));
            tracker.did_draw(&DrawInfo::default());
            clock.advance(Duration(12_000_000));
        }

        let mut out = Vec::new();
        write_state(
            &tracker.snapshot(),
            tracker.reporter().histograms(),
            Timebase::NANOS,
            &mut out,
        )
        .unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(parsed["snapshot"]["estimates_us"]["draw"], 4000);
        assert_eq!(parsed["snapshot"]["drawing_continuously"], true);
        assert_eq!(parsed["snapshot"]["recording_enabled"], true);
        let interval = &parsed["histograms"]["Scheduling.Browser.DrawInterval"];
        assert_eq!(interval["count"], 1);
        assert_eq!(interval["sum_us"], 16_000);
        let p50 = interval["p50_us"].as_u64().unwrap();
        assert!(p50.abs_diff(16_000) <= 16, "p50 was {p50}");
        assert_eq!(parsed["histograms"]["Scheduling.Browser.DrawDuration"]["count"], 2);
    }

    #[test]
    fn missing_histograms_are_null() {
        let clock = ManualClock::new(HostTime(0));
        let reporter = create_reporter(ReporterCategory::Null, Timebase::NANOS).unwrap();
        let tracker = PipelineTimingTracker::new(TrackerConfig::new(), clock, reporter);
        let mut out = Vec::new();
        write_state(&tracker.snapshot(), None, Timebase::NANOS, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert!(parsed["histograms"].is_null());
        assert_eq!(parsed["snapshot"]["estimates_us"]["queue_to_activate_critical"], 0);
    }
}
