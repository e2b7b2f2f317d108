// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Duration/estimate pairs for prediction-accuracy tracking.
//!
//! Where the tracker produces an estimate for a stage, it snapshots that
//! estimate *before* inserting the newly observed duration and forwards both,
//! so a sink can measure how good the prediction would have been.

use crate::time::Duration;

/// Receives observed durations, paired with the estimate that was current
/// when the stage began.
///
/// All methods default to no-ops.
pub trait InstrumentationSink {
    /// Time from a main frame being sent to it ending (by commit or abort).
    fn add_begin_main_frame_to_commit_duration(&mut self, d: Duration) {
        _ = d;
    }

    /// Commit-to-ready-to-activate duration with its prior estimate.
    fn add_commit_to_activate_duration(&mut self, d: Duration, estimate: Duration) {
        _ = (d, estimate);
    }

    /// Draw duration with its prior estimate.
    fn add_draw_duration(&mut self, d: Duration, estimate: Duration) {
        _ = (d, estimate);
    }
}

/// An [`InstrumentationSink`] that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInstrumentation;

impl InstrumentationSink for NoopInstrumentation {}
