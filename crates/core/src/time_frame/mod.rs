use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Position inside a [`TimeFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeFrameIndex(pub i64);

impl TimeFrameIndex {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for TimeFrameIndex {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimeFrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered mapping between indices and time values.
///
/// Time values are expected to be non-decreasing. The frame is shared
/// read-only between series, selectors and adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    times: Vec<i64>,
}

impl TimeFrame {
    pub fn new(times: Vec<i64>) -> Self {
        Self { times }
    }

    /// Frame where index `i` maps to time `i`, for `len` entries.
    pub fn identity(len: usize) -> Self {
        Self::new((0..len as i64).collect())
    }

    pub fn shared(times: Vec<i64>) -> Arc<Self> {
        Arc::new(Self::new(times))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// Time value at `index`, if the index lies inside the frame.
    pub fn time_at(&self, index: TimeFrameIndex) -> Option<i64> {
        usize::try_from(index.0)
            .ok()
            .and_then(|i| self.times.get(i).copied())
    }

    /// Nearest index for `time`. Ties resolve to the earlier index and
    /// out-of-extent times clamp to the first or last index.
    pub fn index_at_time(&self, time: i64) -> TimeFrameIndex {
        if self.times.is_empty() {
            return TimeFrameIndex(0);
        }

        let position = self.times.partition_point(|t| *t < time);
        if position == 0 {
            return TimeFrameIndex(0);
        }
        if position == self.times.len() {
            return TimeFrameIndex(self.times.len() as i64 - 1);
        }

        let before = self.times[position - 1];
        let after = self.times[position];
        if time.abs_diff(before) <= after.abs_diff(time) {
            TimeFrameIndex(position as i64 - 1)
        } else {
            TimeFrameIndex(position as i64)
        }
    }
}

/// Re-expresses `index` from frame `from` in frame `to`.
///
/// Shared frames convert as the identity. An index outside `from` has no
/// time value and therefore no counterpart in `to`.
pub fn convert_index(index: TimeFrameIndex, from: &TimeFrame, to: &TimeFrame) -> Option<TimeFrameIndex> {
    if std::ptr::eq(from, to) {
        return Some(index);
    }

    from.time_at(index).map(|time| to.index_at_time(time))
}

/// Re-expresses the closed range `start..=end` from frame `from` in frame
/// `to`, after clipping it to the extent of `from`. `None` when nothing of the
/// range lies inside `from`.
pub fn convert_range(
    start: TimeFrameIndex,
    end: TimeFrameIndex,
    from: &TimeFrame,
    to: &TimeFrame,
) -> Option<(TimeFrameIndex, TimeFrameIndex)> {
    if std::ptr::eq(from, to) {
        return Some((start, end));
    }

    let last = TimeFrameIndex(from.len() as i64 - 1);
    let start = start.max(TimeFrameIndex(0));
    let end = end.min(last);
    if from.is_empty() || start > end {
        return None;
    }
    Some((
        convert_index(start, from, to)?,
        convert_index(end, from, to)?,
    ))
}
