//! Source adapters normalize differently shaped series behind one query
//! contract.
//!
//! A [`SeriesAdapter`] wraps a shared series together with the frame that
//! series is indexed in. Queries arrive in the row selector's frame and are
//! converted to the adapter's native frame before lookup. The flattened cache
//! is built at most once and never invalidated; a changed series needs a new
//! adapter.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use tracing::{debug, trace};

use crate::{
    selector::RowDescriptor,
    series::{AnalogSeries, EventSeries, IntervalSeries, LineSeries, PointSeries, TimeSeries},
    time_frame::{convert_index, convert_range, TimeFrame, TimeFrameIndex},
};

pub type LineAdapter = SeriesAdapter<LineSeries>;
pub type PointAdapter = SeriesAdapter<PointSeries>;
pub type AnalogAdapter = SeriesAdapter<AnalogSeries>;
pub type EventAdapter = SeriesAdapter<EventSeries>;
pub type IntervalAdapter = SeriesAdapter<IntervalSeries>;

/// Identity of the series behind an adapter.
///
/// Two adapters wrapping the same shared series report the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(usize);

impl SourceId {
    fn of<S>(series: &Arc<S>) -> Self {
        Self(Arc::as_ptr(series) as *const () as usize)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source@{:#x}", self.0)
    }
}

/// Name and identity of a source, as reported in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub id: SourceId,
    pub name: String,
}

/// Object-safe view of an adapter used to plan row expansion.
pub trait SampleSource: Send + Sync {
    fn source_id(&self) -> SourceId;

    fn name(&self) -> &str;

    /// Whether the wrapped series can hold more than one sample per index.
    fn has_multi_samples(&self) -> bool;

    /// Number of samples this source yields for `row`.
    fn sample_count(&self, row: &RowDescriptor, row_frame: &TimeFrame) -> usize;

    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: self.source_id(),
            name: self.name().to_string(),
        }
    }
}

pub struct SeriesAdapter<S: TimeSeries> {
    series: Arc<S>,
    time_frame: Arc<TimeFrame>,
    name: String,
    multi_samples: OnceLock<bool>,
    cache: OnceLock<Vec<(TimeFrameIndex, S::Value)>>,
}

impl<S: TimeSeries> SeriesAdapter<S> {
    /// Wraps `series`, using the frame the series itself is indexed in.
    pub fn new(series: Arc<S>, name: impl Into<String>) -> Self {
        let time_frame = series.time_frame().clone();
        Self::with_time_frame(series, time_frame, name)
    }

    /// Wraps `series` and treats its indices as belonging to `time_frame`.
    pub fn with_time_frame(series: Arc<S>, time_frame: Arc<TimeFrame>, name: impl Into<String>) -> Self {
        Self {
            series,
            time_frame,
            name: name.into(),
            multi_samples: OnceLock::new(),
            cache: OnceLock::new(),
        }
    }

    /// Convenience for sharing the adapter between several computers.
    pub fn shared(series: Arc<S>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(series, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }

    pub fn series(&self) -> &Arc<S> {
        &self.series
    }

    pub fn source_id(&self) -> SourceId {
        SourceId::of(&self.series)
    }

    /// Total number of samples in the wrapped series.
    pub fn size(&self) -> usize {
        match self.cache.get() {
            Some(cache) => cache.len(),
            None => self
                .series
                .entries()
                .iter()
                .map(|(_, values)| values.len())
                .sum(),
        }
    }

    pub fn has_multi_samples(&self) -> bool {
        *self
            .multi_samples
            .get_or_init(|| self.series.max_samples_per_index() > 1)
    }

    /// Samples at `index`, where `index` is expressed in `target`. An index
    /// outside `target` yields nothing.
    pub fn values_at(&self, index: TimeFrameIndex, target: &TimeFrame) -> Vec<S::Value> {
        match convert_index(index, target, &self.time_frame) {
            Some(native) => self.series.values_at(native),
            None => Vec::new(),
        }
    }

    /// Samples in `start..=end`, where both ends are expressed in `target`.
    /// Returned indices are native to this adapter's frame.
    pub fn values_in_range(
        &self,
        start: TimeFrameIndex,
        end: TimeFrameIndex,
        target: &TimeFrame,
    ) -> Vec<(TimeFrameIndex, Vec<S::Value>)> {
        match convert_range(start, end, target, &self.time_frame) {
            Some((native_start, native_end)) => self.series.values_in_range(native_start, native_end),
            None => Vec::new(),
        }
    }

    /// Every sample the source yields for `row`, flattened in index order.
    pub fn samples_for_row(&self, row: &RowDescriptor, row_frame: &TimeFrame) -> Vec<S::Value> {
        match row {
            RowDescriptor::Timestamp(index) => self.values_at(*index, row_frame),
            RowDescriptor::Interval(interval) => self
                .values_in_range(interval.start, interval.end, row_frame)
                .into_iter()
                .flat_map(|(_, values)| values)
                .collect(),
        }
    }

    /// Flattens every `(index, value)` pair in ascending index order.
    /// Later calls return the cache built by the first one.
    pub fn materialize(&self) -> &[(TimeFrameIndex, S::Value)] {
        self.cache.get_or_init(|| {
            let flattened: Vec<_> = self
                .series
                .entries()
                .into_iter()
                .flat_map(|(index, values)| values.into_iter().map(move |v| (index, v)))
                .collect();
            debug!(adapter = %self.name, samples = flattened.len(), "materialized adapter cache");
            flattened
        })
    }

    pub fn materialized(&self) -> Option<&[(TimeFrameIndex, S::Value)]> {
        self.cache.get().map(Vec::as_slice)
    }

    pub fn is_materialized(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl<S: TimeSeries> SampleSource for SeriesAdapter<S> {
    fn source_id(&self) -> SourceId {
        SeriesAdapter::source_id(self)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_multi_samples(&self) -> bool {
        SeriesAdapter::has_multi_samples(self)
    }

    fn sample_count(&self, row: &RowDescriptor, row_frame: &TimeFrame) -> usize {
        let count = self.samples_for_row(row, row_frame).len();
        trace!(adapter = %self.name, ?row, count, "sample count");
        count
    }
}

impl<S: TimeSeries> fmt::Debug for SeriesAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesAdapter")
            .field("name", &self.name)
            .field("source_id", &self.source_id())
            .field("time_frame_len", &self.time_frame.len())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Interval, Line2D, Point2D};

    fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> Line2D {
        Line2D::new(vec![Point2D::new(x0, y0), Point2D::new(x1, y1)])
    }

    fn multi_lines() -> Arc<LineSeries> {
        let mut series = LineSeries::new(Arc::new(TimeFrame::identity(5)));
        series.add_at_time(TimeFrameIndex(0), line(0.0, 0.0, 1.0, 1.0));
        series.add_at_time(TimeFrameIndex(1), line(1.0, 0.0, 2.0, 1.0));
        series.add_at_time(TimeFrameIndex(1), line(1.0, 1.0, 2.0, 2.0));
        series.add_at_time(TimeFrameIndex(3), line(3.0, 0.0, 4.0, 1.0));
        Arc::new(series)
    }

    #[test]
    fn detects_multi_samples() {
        let multi = LineAdapter::new(multi_lines(), "multi");
        assert!(multi.has_multi_samples());

        let mut single = LineSeries::new(Arc::new(TimeFrame::identity(5)));
        single.add_at_time(TimeFrameIndex(2), line(0.0, 0.0, 1.0, 0.0));
        let single = LineAdapter::new(Arc::new(single), "single");
        assert!(!single.has_multi_samples());
    }

    #[test]
    fn materialize_is_idempotent() {
        let adapter = LineAdapter::new(multi_lines(), "multi");
        assert!(adapter.materialized().is_none());

        let first = adapter.materialize().to_vec();
        let second = adapter.materialize().to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(adapter.size(), 4);
        assert!(first.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }

    #[test]
    fn empty_series_materializes_to_empty_cache() {
        let adapter = PointAdapter::new(
            Arc::new(PointSeries::new(Arc::new(TimeFrame::identity(3)))),
            "empty",
        );
        assert!(adapter.materialize().is_empty());
        assert_eq!(adapter.size(), 0);
        assert!(!adapter.has_multi_samples());
    }

    #[test]
    fn identity_follows_the_wrapped_series() {
        let series = multi_lines();
        let a = LineAdapter::new(series.clone(), "a");
        let b = LineAdapter::new(series, "b");
        let c = LineAdapter::new(multi_lines(), "c");
        assert_eq!(a.source_id(), b.source_id());
        assert_ne!(a.source_id(), c.source_id());
    }

    #[test]
    fn converts_queries_from_the_row_frame() {
        let native = Arc::new(TimeFrame::new((0..100).collect()));
        let analog = AnalogSeries::from_values(native, (0..100).map(f64::from).collect());
        let adapter = AnalogAdapter::new(Arc::new(analog), "analog");

        let coarse = TimeFrame::new(vec![0, 10, 20, 30]);
        assert_eq!(adapter.values_at(TimeFrameIndex(2), &coarse), vec![20.0]);

        let range = adapter.values_in_range(TimeFrameIndex(1), TimeFrameIndex(2), &coarse);
        assert_eq!(range.len(), 11);
        assert_eq!(range.first().map(|(i, _)| *i), Some(TimeFrameIndex(10)));
    }

    #[test]
    fn row_indices_outside_the_row_frame_yield_nothing() {
        let native = Arc::new(TimeFrame::new((0..100).collect()));
        let analog = AnalogSeries::from_values(native, (0..100).map(f64::from).collect());
        let adapter = AnalogAdapter::new(Arc::new(analog), "analog");

        let coarse = TimeFrame::new(vec![0, 10, 20, 30]);
        assert!(adapter.values_at(TimeFrameIndex(5), &coarse).is_empty());
        assert!(adapter.values_at(TimeFrameIndex(-1), &coarse).is_empty());

        let clipped = adapter.values_in_range(TimeFrameIndex(3), TimeFrameIndex(8), &coarse);
        assert_eq!(clipped, vec![(TimeFrameIndex(30), vec![30.0])]);
    }

    #[test]
    fn counts_samples_for_interval_rows() {
        let adapter = LineAdapter::new(multi_lines(), "multi");
        let frame = TimeFrame::identity(5);
        let row = RowDescriptor::Interval(Interval::new(0, 1));
        assert_eq!(adapter.sample_count(&row, &frame), 3);
        let row = RowDescriptor::Timestamp(TimeFrameIndex(2));
        assert_eq!(adapter.sample_count(&row, &frame), 0);
    }
}
