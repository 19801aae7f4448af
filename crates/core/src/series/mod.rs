//! In-memory series handed to the core by upstream producers.
//!
//! Series are plain data. They are shared behind `Arc` and treated as
//! read-only snapshots once an adapter wraps them; callers that need to change
//! a series do so through `Arc::make_mut`, which leaves existing adapters
//! looking at the previous snapshot.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::time_frame::{TimeFrame, TimeFrameIndex};

/// Uniform read access over a time-indexed series.
pub trait TimeSeries: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    /// Frame the series' indices are expressed in.
    fn time_frame(&self) -> &Arc<TimeFrame>;

    /// Samples present at `index`, in the series' natural order.
    fn values_at(&self, index: TimeFrameIndex) -> Vec<Self::Value>;

    /// Every sample grouped by index, ascending.
    fn entries(&self) -> Vec<(TimeFrameIndex, Vec<Self::Value>)>;

    /// Samples whose index falls in `start..=end`, grouped by index.
    fn values_in_range(
        &self,
        start: TimeFrameIndex,
        end: TimeFrameIndex,
    ) -> Vec<(TimeFrameIndex, Vec<Self::Value>)> {
        self.entries()
            .into_iter()
            .filter(|(index, _)| *index >= start && *index <= end)
            .collect()
    }

    /// Largest number of samples any single index holds.
    fn max_samples_per_index(&self) -> usize {
        self.entries()
            .iter()
            .map(|(_, values)| values.len())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point2D) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Polyline made of ordered vertices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line2D {
    points: Vec<Point2D>,
}

impl Line2D {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length along all segments.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Point at normalized arc-length `fraction`.
    ///
    /// `0.0` is the first vertex and `1.0` the last; fractions outside
    /// `[0, 1]` clamp. Returns `None` for an empty line.
    pub fn point_at_fraction(&self, fraction: f64) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        let as_f64 = |p: &Point2D| (f64::from(p.x), f64::from(p.y));

        let total = self.length();
        if fraction <= 0.0 || total <= f64::EPSILON {
            return Some(as_f64(first));
        }
        if fraction >= 1.0 {
            return Some(as_f64(last));
        }

        let target = fraction * total;
        let mut travelled = 0.0;
        for pair in self.points.windows(2) {
            let segment = pair[0].distance(&pair[1]);
            if segment > 0.0 && travelled + segment >= target {
                let t = (target - travelled) / segment;
                let (x0, y0) = as_f64(&pair[0]);
                let (x1, y1) = as_f64(&pair[1]);
                return Some((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
            }
            travelled += segment;
        }

        Some(as_f64(last))
    }
}

impl FromIterator<Point2D> for Line2D {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Zero or more values recorded per index.
#[derive(Debug, Clone)]
pub struct RaggedSeries<T> {
    time_frame: Arc<TimeFrame>,
    data: BTreeMap<TimeFrameIndex, Vec<T>>,
}

pub type PointSeries = RaggedSeries<Point2D>;
pub type LineSeries = RaggedSeries<Line2D>;

impl<T> RaggedSeries<T> {
    pub fn new(time_frame: Arc<TimeFrame>) -> Self {
        Self {
            time_frame,
            data: BTreeMap::new(),
        }
    }

    pub fn from_map(time_frame: Arc<TimeFrame>, data: BTreeMap<TimeFrameIndex, Vec<T>>) -> Self {
        Self { time_frame, data }
    }

    /// Appends `value` after any values already recorded at `index`.
    pub fn add_at_time(&mut self, index: TimeFrameIndex, value: T) {
        self.data.entry(index).or_default().push(value);
    }

    pub fn clear_at_time(&mut self, index: TimeFrameIndex) {
        self.data.remove(&index);
    }

    pub fn at_time(&self, index: TimeFrameIndex) -> &[T] {
        self.data.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn times(&self) -> impl Iterator<Item = TimeFrameIndex> + '_ {
        self.data.keys().copied()
    }

    /// Total number of values across all indices.
    pub fn total_len(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

impl<T: Clone + Send + Sync + 'static> TimeSeries for RaggedSeries<T> {
    type Value = T;

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }

    fn values_at(&self, index: TimeFrameIndex) -> Vec<T> {
        self.at_time(index).to_vec()
    }

    fn entries(&self) -> Vec<(TimeFrameIndex, Vec<T>)> {
        self.data
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(index, values)| (*index, values.clone()))
            .collect()
    }

    fn values_in_range(&self, start: TimeFrameIndex, end: TimeFrameIndex) -> Vec<(TimeFrameIndex, Vec<T>)> {
        if start > end {
            return Vec::new();
        }
        self.data
            .range(start..=end)
            .filter(|(_, values)| !values.is_empty())
            .map(|(index, values)| (*index, values.clone()))
            .collect()
    }

    fn max_samples_per_index(&self) -> usize {
        self.data.values().map(Vec::len).max().unwrap_or(0)
    }
}

/// Sampled signal with at most one value per index.
#[derive(Debug, Clone)]
pub struct AnalogSeries {
    time_frame: Arc<TimeFrame>,
    samples: BTreeMap<TimeFrameIndex, f64>,
}

impl AnalogSeries {
    /// Series where `values[i]` is recorded at index `i`.
    pub fn from_values(time_frame: Arc<TimeFrame>, values: Vec<f64>) -> Self {
        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (TimeFrameIndex(i as i64), v))
            .collect();
        Self {
            time_frame,
            samples,
        }
    }

    /// Series from explicit `(index, value)` pairs. Later pairs replace
    /// earlier ones at the same index.
    pub fn from_samples<I>(time_frame: Arc<TimeFrame>, samples: I) -> Self
    where
        I: IntoIterator<Item = (TimeFrameIndex, f64)>,
    {
        Self {
            time_frame,
            samples: samples.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TimeSeries for AnalogSeries {
    type Value = f64;

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }

    fn values_at(&self, index: TimeFrameIndex) -> Vec<f64> {
        self.samples.get(&index).copied().into_iter().collect()
    }

    fn entries(&self) -> Vec<(TimeFrameIndex, Vec<f64>)> {
        self.samples.iter().map(|(i, v)| (*i, vec![*v])).collect()
    }

    fn values_in_range(&self, start: TimeFrameIndex, end: TimeFrameIndex) -> Vec<(TimeFrameIndex, Vec<f64>)> {
        if start > end {
            return Vec::new();
        }
        self.samples
            .range(start..=end)
            .map(|(i, v)| (*i, vec![*v]))
            .collect()
    }

    fn max_samples_per_index(&self) -> usize {
        usize::from(!self.samples.is_empty())
    }
}

/// Discrete events. Duplicate indices are allowed and kept in insertion order.
#[derive(Debug, Clone)]
pub struct EventSeries {
    time_frame: Arc<TimeFrame>,
    events: Vec<TimeFrameIndex>,
}

impl EventSeries {
    pub fn new(time_frame: Arc<TimeFrame>, mut events: Vec<TimeFrameIndex>) -> Self {
        events.sort();
        Self { time_frame, events }
    }

    pub fn events(&self) -> &[TimeFrameIndex] {
        &self.events
    }

    pub fn add_event(&mut self, index: TimeFrameIndex) {
        let position = self.events.partition_point(|e| *e <= index);
        self.events.insert(position, index);
    }
}

impl TimeSeries for EventSeries {
    type Value = TimeFrameIndex;

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }

    fn values_at(&self, index: TimeFrameIndex) -> Vec<TimeFrameIndex> {
        let start = self.events.partition_point(|e| *e < index);
        let end = self.events.partition_point(|e| *e <= index);
        self.events[start..end].to_vec()
    }

    fn entries(&self) -> Vec<(TimeFrameIndex, Vec<TimeFrameIndex>)> {
        let mut grouped: Vec<(TimeFrameIndex, Vec<TimeFrameIndex>)> = Vec::new();
        for event in &self.events {
            match grouped.last_mut() {
                Some((index, values)) if index == event => values.push(*event),
                _ => grouped.push((*event, vec![*event])),
            }
        }
        grouped
    }
}

/// Closed interval of indices, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimeFrameIndex,
    pub end: TimeFrameIndex,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start: TimeFrameIndex(start),
            end: TimeFrameIndex(end),
        }
    }

    pub fn contains(&self, index: TimeFrameIndex) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn overlaps(&self, start: TimeFrameIndex, end: TimeFrameIndex) -> bool {
        self.start <= end && start <= self.end
    }

    pub fn duration(&self) -> i64 {
        self.end.0.saturating_sub(self.start.0)
    }
}

/// Intervals ordered by start. The samples at an index are the intervals
/// that contain it.
#[derive(Debug, Clone)]
pub struct IntervalSeries {
    time_frame: Arc<TimeFrame>,
    intervals: Vec<Interval>,
}

impl IntervalSeries {
    pub fn new(time_frame: Arc<TimeFrame>, mut intervals: Vec<Interval>) -> Self {
        intervals.sort();
        Self {
            time_frame,
            intervals,
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

impl TimeSeries for IntervalSeries {
    type Value = Interval;

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }

    fn values_at(&self, index: TimeFrameIndex) -> Vec<Interval> {
        self.intervals
            .iter()
            .filter(|interval| interval.contains(index))
            .copied()
            .collect()
    }

    fn entries(&self) -> Vec<(TimeFrameIndex, Vec<Interval>)> {
        let mut grouped: Vec<(TimeFrameIndex, Vec<Interval>)> = Vec::new();
        for interval in &self.intervals {
            match grouped.last_mut() {
                Some((start, values)) if *start == interval.start => values.push(*interval),
                _ => grouped.push((interval.start, vec![*interval])),
            }
        }
        grouped
    }

    /// Intervals overlapping `start..=end`, keyed by their own start.
    fn values_in_range(&self, start: TimeFrameIndex, end: TimeFrameIndex) -> Vec<(TimeFrameIndex, Vec<Interval>)> {
        self.entries()
            .into_iter()
            .filter_map(|(key, values)| {
                let hits: Vec<Interval> = values
                    .into_iter()
                    .filter(|interval| interval.overlaps(start, end))
                    .collect();
                (!hits.is_empty()).then_some((key, hits))
            })
            .collect()
    }

    /// Greatest number of intervals covering one index.
    fn max_samples_per_index(&self) -> usize {
        let mut max_depth = 0usize;
        let mut open_ends: Vec<TimeFrameIndex> = Vec::new();
        for interval in &self.intervals {
            open_ends.retain(|end| *end >= interval.start);
            open_ends.push(interval.end);
            max_depth = max_depth.max(open_ends.len());
        }
        max_depth
    }
}
