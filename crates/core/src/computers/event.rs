use std::sync::Arc;

use crate::adapters::{EventAdapter, SampleSource};

use super::{ColumnComputer, RowContext};

/// Whether any event falls inside the row.
pub struct EventPresenceComputer {
    source: Arc<EventAdapter>,
}

impl EventPresenceComputer {
    pub fn new(source: Arc<EventAdapter>) -> Self {
        Self { source }
    }
}

impl ColumnComputer for EventPresenceComputer {
    type Output = bool;

    fn compute(&self, row: &RowContext<'_>) -> bool {
        self.source.sample_count(row.descriptor, row.time_frame) > 0
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}

/// Number of events inside the row.
pub struct EventCountComputer {
    source: Arc<EventAdapter>,
}

impl EventCountComputer {
    pub fn new(source: Arc<EventAdapter>) -> Self {
        Self { source }
    }
}

impl ColumnComputer for EventCountComputer {
    type Output = i64;

    fn compute(&self, row: &RowContext<'_>) -> i64 {
        self.source.sample_count(row.descriptor, row.time_frame) as i64
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}
