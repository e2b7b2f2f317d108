// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-pipeline timing and deadline estimation.
//!
//! `cadence_core` watches a compositing pipeline's stage transitions (main
//! frame, commit, tile preparation, activation, draw), keeps rolling
//! histories of how long each stage took, and answers "how long will the next
//! one take?" so a scheduler can plan against a fixed frame deadline. It is
//! `no_std` compatible (with `alloc`) and driven from a single context.
//!
//! # Architecture
//!
//! ```text
//!   pipeline driver
//!       │  will_* / did_* calls
//!       ▼
//!   PipelineTimingTracker ──► RollingDurationEstimator ×9 ──► estimates
//!       │                                                       │
//!       ├──► Reporter              (aggregate histograms)       ▼
//!       ├──► InstrumentationSink   (duration, prior estimate)  scheduler
//!       ├──► ReportingController   (every transition)
//!       └──► Tracer ──► TraceSink  (stage and draw-gap markers)
//! ```
//!
//! **[`tracker`]** — The stage-transition state machine, its nine histories
//! and the derived estimates.
//!
//! **[`history`]** — Fixed-capacity ring of recent durations with percentile
//! queries.
//!
//! **[`time`]** — Host-time ticks, durations, timebase conversion and the
//! [`Clock`](time::Clock) seam.
//!
//! **[`frame`]** — Begin-frame arguments and the reasons frames end early.
//!
//! **[`reporter`]** — The [`Reporter`](reporter::Reporter) trait and its
//! renderer, browser and null variants.
//!
//! **`metrics`** — `hdrhistogram`-backed duration histograms used by the
//! role-tagged reporters (`std` only).
//!
//! **[`instrumentation`]** — Duration/estimate pairs for prediction-accuracy
//! analysis.
//!
//! **[`reporting`]** — Stage transitions forwarded for cross-frame
//! correlation.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with the owning [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables the `hdrhistogram`-backed
//!   `metrics` module and the role-tagged reporters built by
//!   `reporter::create_reporter`.
//! - `trace` (disabled by default): Enables dispatch of per-stage begin/end
//!   trace events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod frame;
pub mod history;
pub mod instrumentation;
#[cfg(feature = "std")]
pub mod metrics;
pub mod reporter;
pub mod reporting;
pub mod time;
pub mod trace;
pub mod tracker;
