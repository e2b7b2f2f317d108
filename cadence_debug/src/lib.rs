// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, logging and export for cadence diagnostics.
//!
//! This crate provides collaborator implementations for development and
//! post-mortem analysis. Each sink implements
//! [`TraceSink`](cadence_core::trace::TraceSink),
//! [`InstrumentationSink`](cadence_core::instrumentation::InstrumentationSink)
//! and [`ReportingController`](cadence_core::reporting::ReportingController):
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`log::LogSink`] — forwards events to `tracing`.
//!
//! Alongside them:
//!
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`snapshot`] — JSON dumps of estimates and reporter histograms.
//! - [`clock::InstantClock`] — a `std` monotonic clock for the tracker.

pub mod chrome;
pub mod clock;
pub mod log;
pub mod pretty;
pub mod recorder;
pub mod snapshot;
