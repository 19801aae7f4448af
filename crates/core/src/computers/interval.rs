use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{adapters::SampleSource, selector::RowDescriptor};

use super::{ColumnComputer, RowContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalProperty {
    Start,
    End,
    Duration,
}

/// Start, end or duration of the row itself, in row-frame indices.
///
/// Timestamp rows behave as zero-length intervals.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPropertyComputer {
    property: IntervalProperty,
}

impl IntervalPropertyComputer {
    pub fn new(property: IntervalProperty) -> Self {
        Self { property }
    }
}

impl ColumnComputer for IntervalPropertyComputer {
    type Output = i64;

    fn compute(&self, row: &RowContext<'_>) -> i64 {
        let (start, end) = match row.descriptor {
            RowDescriptor::Timestamp(index) => (index.0, index.0),
            RowDescriptor::Interval(interval) => (interval.start.0, interval.end.0),
        };
        match self.property {
            IntervalProperty::Start => start,
            IntervalProperty::End => end,
            IntervalProperty::Duration => end.saturating_sub(start),
        }
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        Vec::new()
    }
}
