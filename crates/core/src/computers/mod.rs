//! Column computers turn a base row plus bound adapters into values.
//!
//! A [`ColumnComputer`] yields one typed scalar per base row; the table
//! broadcasts it across every expanded row of that base row. A
//! [`MultiColumnComputer`] yields one `f64` sequence per sub-column suffix,
//! with one value per sample the row holds.

mod analog;
mod event;
mod interval;
mod line_sampling;
mod point;

use std::sync::Arc;

pub use analog::{AnalogValueComputer, IntervalReductionComputer, Reduction};
pub use event::{EventCountComputer, EventPresenceComputer};
pub use interval::{IntervalProperty, IntervalPropertyComputer};
pub use line_sampling::LineSamplingComputer;
pub use point::PointComponentComputer;

use crate::{
    adapters::SampleSource,
    column::ColumnType,
    selector::RowDescriptor,
    time_frame::TimeFrame,
};

/// Row a computer is asked to evaluate.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub descriptor: &'a RowDescriptor,
    /// Frame the descriptor is expressed in.
    pub time_frame: &'a TimeFrame,
    /// Position of the row in the selector's output.
    pub base_row: usize,
}

pub trait ColumnComputer: Send + Sync + 'static {
    type Output: ColumnType;

    fn compute(&self, row: &RowContext<'_>) -> Self::Output;

    /// Adapters this computer reads from.
    fn sources(&self) -> Vec<Arc<dyn SampleSource>>;
}

pub trait MultiColumnComputer: Send + Sync + 'static {
    /// Sub-column suffixes, in output order.
    fn suffixes(&self) -> Vec<String>;

    /// One sequence per suffix, aligned with [`suffixes`](Self::suffixes).
    /// Each sequence holds one value per sample at the row, in the adapter's
    /// natural sample order.
    fn compute(&self, row: &RowContext<'_>) -> Vec<Vec<f64>>;

    fn sources(&self) -> Vec<Arc<dyn SampleSource>>;
}

/// Number of samples a source holds at each row.
pub struct SampleCountComputer {
    source: Arc<dyn SampleSource>,
}

impl SampleCountComputer {
    pub fn new(source: Arc<dyn SampleSource>) -> Self {
        Self { source }
    }
}

impl ColumnComputer for SampleCountComputer {
    type Output = i64;

    fn compute(&self, row: &RowContext<'_>) -> i64 {
        self.source.sample_count(row.descriptor, row.time_frame) as i64
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}
