// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory duration histograms for role-tagged reporters.
//!
//! [`DurationHistogram`] records microsecond samples into an
//! [`hdrhistogram::Histogram`] that tracks [`HISTOGRAM_MIN_MICROS`] to
//! [`HISTOGRAM_MAX_MICROS`] at [`HISTOGRAM_SIGNIFICANT_DIGITS`] significant
//! digits. Longer samples saturate at the upper bound in the distribution but
//! still count in full towards the sum. [`HistogramSet`] keys histograms by
//! metric name and converts host-time durations using its [`Timebase`].
//!
//! Only available with the `std` feature.

use alloc::collections::BTreeMap;
use alloc::string::String;

use hdrhistogram::Histogram;

pub use hdrhistogram::CreationError;

use crate::time::{Duration, Timebase};

/// Smallest discernible value, in microseconds.
pub const HISTOGRAM_MIN_MICROS: u64 = 1;
/// Largest trackable value, in microseconds.
pub const HISTOGRAM_MAX_MICROS: u64 = 1_000_000;
/// Value precision kept across the whole range.
pub const HISTOGRAM_SIGNIFICANT_DIGITS: u8 = 3;

/// A histogram of microsecond durations.
#[derive(Clone, Debug)]
pub struct DurationHistogram {
    samples: Histogram<u64>,
    sum_micros: u64,
}

impl DurationHistogram {
    /// Creates an empty histogram with the standard bounds.
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            samples: Histogram::new_with_bounds(
                HISTOGRAM_MIN_MICROS,
                HISTOGRAM_MAX_MICROS,
                HISTOGRAM_SIGNIFICANT_DIGITS,
            )?,
            sum_micros: 0,
        })
    }

    /// Records one sample.
    pub fn record_micros(&mut self, micros: u64) {
        self.samples.saturating_record(micros);
        self.sum_micros = self.sum_micros.saturating_add(micros);
    }

    /// Returns the number of recorded samples.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.samples.len()
    }

    /// Returns the sum of all samples, in microseconds.
    #[must_use]
    pub fn sum_micros(&self) -> u64 {
        self.sum_micros
    }

    /// Returns the smallest sample, or `None` if empty.
    #[must_use]
    pub fn min_micros(&self) -> Option<u64> {
        (!self.samples.is_empty()).then(|| self.samples.min())
    }

    /// Returns the largest sample, or `None` if empty.
    #[must_use]
    pub fn max_micros(&self) -> Option<u64> {
        (!self.samples.is_empty()).then(|| self.samples.max())
    }

    /// Returns the mean sample, or `None` if empty.
    #[must_use]
    pub fn mean_micros(&self) -> Option<u64> {
        let count = self.count();
        (count > 0).then(|| self.sum_micros / count)
    }

    /// Returns the value at `percentile` (0.0 to 100.0), or `None` if empty.
    #[must_use]
    pub fn value_at_percentile_micros(&self, percentile: f64) -> Option<u64> {
        (!self.samples.is_empty()).then(|| self.samples.value_at_percentile(percentile))
    }
}

/// A named collection of [`DurationHistogram`]s.
#[derive(Clone, Debug)]
pub struct HistogramSet {
    timebase: Timebase,
    empty: DurationHistogram,
    histograms: BTreeMap<String, DurationHistogram>,
}

impl HistogramSet {
    /// Creates an empty set that converts durations with `timebase`.
    pub fn new(timebase: Timebase) -> Result<Self, CreationError> {
        Ok(Self {
            timebase,
            empty: DurationHistogram::new()?,
            histograms: BTreeMap::new(),
        })
    }

    /// Records `duration` into the histogram called `name`, creating it on
    /// first use.
    pub fn record(&mut self, name: &str, duration: Duration) {
        let micros = duration.to_micros(self.timebase);
        match self.histograms.get_mut(name) {
            Some(h) => h.record_micros(micros),
            None => {
                let mut h = self.empty.clone();
                h.record_micros(micros);
                self.histograms.insert(String::from(name), h);
            }
        }
    }

    /// Returns the histogram called `name`, if anything was recorded into it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DurationHistogram> {
        self.histograms.get(name)
    }

    /// Iterates over `(name, histogram)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DurationHistogram)> {
        self.histograms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of distinct histograms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_statistics() {
        let mut h = DurationHistogram::new().unwrap();
        assert_eq!(h.mean_micros(), None);
        assert_eq!(h.min_micros(), None);
        assert_eq!(h.value_at_percentile_micros(50.0), None);
        for v in [10, 20, 30] {
            h.record_micros(v);
        }
        assert_eq!(h.count(), 3);
        assert_eq!(h.sum_micros(), 60);
        assert_eq!(h.mean_micros(), Some(20));
        assert_eq!(h.min_micros(), Some(10));
        assert_eq!(h.max_micros(), Some(30));
    }

    #[test]
    fn percentiles_follow_the_distribution() {
        let mut h = DurationHistogram::new().unwrap();
        for v in 1..=100 {
            h.record_micros(v);
        }
        assert_eq!(h.value_at_percentile_micros(50.0), Some(50));
        assert_eq!(h.value_at_percentile_micros(90.0), Some(90));
        assert_eq!(h.value_at_percentile_micros(100.0), Some(100));
    }

    #[test]
    fn frame_scale_values_keep_three_digits() {
        let mut h = DurationHistogram::new().unwrap();
        h.record_micros(16_667);
        let max = h.max_micros().unwrap();
        assert!(max.abs_diff(16_667) <= 17, "16667us read back as {max}");
    }

    #[test]
    fn long_samples_saturate_but_sum_in_full() {
        let mut h = DurationHistogram::new().unwrap();
        h.record_micros(5_000_000);
        assert_eq!(h.count(), 1);
        assert_eq!(h.sum_micros(), 5_000_000);
        let max = h.max_micros().unwrap();
        assert!(
            max >= HISTOGRAM_MAX_MICROS && max < 2 * HISTOGRAM_MAX_MICROS,
            "saturated max was {max}"
        );
    }

    #[test]
    fn set_converts_ticks_with_timebase() {
        let mut set = HistogramSet::new(Timebase::NANOS).unwrap();
        set.record("Draw", Duration(2_500_000));
        set.record("Draw", Duration(1_500_000));
        let h = set.get("Draw").unwrap();
        assert_eq!(h.count(), 2);
        assert_eq!(h.sum_micros(), 4_000);
        assert!(set.get("Missing").is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_names_are_independent() {
        let mut set = HistogramSet::new(Timebase::MICROS).unwrap();
        assert!(set.is_empty());
        set.record("B", Duration(3));
        set.record("A", Duration(1));
        set.record("A", Duration(1));
        let names: alloc::vec::Vec<_> = set.iter().map(|(n, h)| (n, h.count())).collect();
        assert_eq!(names, [("A", 2), ("B", 1)]);
    }
}
