use std::sync::Arc;

use crate::adapters::{PointAdapter, SampleSource};

use super::{MultiColumnComputer, RowContext};

/// Emits the `x` and `y` components of every point present at a row.
pub struct PointComponentComputer {
    source: Arc<PointAdapter>,
}

impl PointComponentComputer {
    pub fn new(source: Arc<PointAdapter>) -> Self {
        Self { source }
    }
}

impl MultiColumnComputer for PointComponentComputer {
    fn suffixes(&self) -> Vec<String> {
        vec!["x".to_string(), "y".to_string()]
    }

    fn compute(&self, row: &RowContext<'_>) -> Vec<Vec<f64>> {
        let points = self.source.samples_for_row(row.descriptor, row.time_frame);
        let xs = points.iter().map(|p| f64::from(p.x)).collect();
        let ys = points.iter().map(|p| f64::from(p.y)).collect();
        vec![xs, ys]
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}
