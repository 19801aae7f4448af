use std::{fmt, ops::Range, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    series::Interval,
    time_frame::{TimeFrame, TimeFrameIndex},
};

/// One base row of a table, expressed in the selector's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowDescriptor {
    Timestamp(TimeFrameIndex),
    Interval(Interval),
}

impl RowDescriptor {
    /// Index the row is anchored at; the start for interval rows.
    pub fn anchor(&self) -> TimeFrameIndex {
        match self {
            Self::Timestamp(index) => *index,
            Self::Interval(interval) => interval.start,
        }
    }
}

/// Produces the ordered base rows a table computes over.
///
/// Selectors only hold data. Emptiness is allowed and yields a table with no
/// rows.
pub trait RowSelector: Send + Sync + fmt::Debug {
    fn rows(&self) -> &[RowDescriptor];

    fn time_frame(&self) -> &Arc<TimeFrame>;

    fn size(&self) -> usize {
        self.rows().len()
    }
}

/// One row per explicit index, in the order given.
#[derive(Debug, Clone)]
pub struct TimestampSelector {
    rows: Vec<RowDescriptor>,
    time_frame: Arc<TimeFrame>,
}

impl TimestampSelector {
    pub fn new<I>(timestamps: I, time_frame: Arc<TimeFrame>) -> Self
    where
        I: IntoIterator<Item = TimeFrameIndex>,
    {
        Self {
            rows: timestamps.into_iter().map(RowDescriptor::Timestamp).collect(),
            time_frame,
        }
    }
}

impl RowSelector for TimestampSelector {
    fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }
}

/// One row per `(start, end)` interval.
#[derive(Debug, Clone)]
pub struct IntervalSelector {
    rows: Vec<RowDescriptor>,
    time_frame: Arc<TimeFrame>,
}

impl IntervalSelector {
    pub fn new<I>(intervals: I, time_frame: Arc<TimeFrame>) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        Self {
            rows: intervals.into_iter().map(RowDescriptor::Interval).collect(),
            time_frame,
        }
    }
}

impl RowSelector for IntervalSelector {
    fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }
}

/// One row per index of a contiguous half-open range.
#[derive(Debug, Clone)]
pub struct IndexSelector {
    rows: Vec<RowDescriptor>,
    time_frame: Arc<TimeFrame>,
}

impl IndexSelector {
    pub fn new(range: Range<i64>, time_frame: Arc<TimeFrame>) -> Self {
        Self {
            rows: range
                .map(|i| RowDescriptor::Timestamp(TimeFrameIndex(i)))
                .collect(),
            time_frame,
        }
    }

    /// Every index of `time_frame`.
    pub fn all(time_frame: Arc<TimeFrame>) -> Self {
        let len = time_frame.len() as i64;
        Self::new(0..len, time_frame)
    }
}

impl RowSelector for IndexSelector {
    fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    fn time_frame(&self) -> &Arc<TimeFrame> {
        &self.time_frame
    }
}
