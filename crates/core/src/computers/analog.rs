use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::{AnalogAdapter, SampleSource};

use super::{ColumnComputer, RowContext};

/// Analog value at a row: the sample at a timestamp row, or the first sample
/// inside an interval row. `NaN` when there is none.
pub struct AnalogValueComputer {
    source: Arc<AnalogAdapter>,
}

impl AnalogValueComputer {
    pub fn new(source: Arc<AnalogAdapter>) -> Self {
        Self { source }
    }
}

impl ColumnComputer for AnalogValueComputer {
    type Output = f64;

    fn compute(&self, row: &RowContext<'_>) -> f64 {
        self.source
            .samples_for_row(row.descriptor, row.time_frame)
            .first()
            .copied()
            .unwrap_or(f64::NAN)
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Mean,
    Min,
    Max,
    Sum,
    Count,
    /// Population standard deviation.
    StdDev,
}

impl Reduction {
    /// Reduces `values`. Empty input gives `0` for `Sum`/`Count` and `NaN`
    /// otherwise.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return match self {
                Self::Sum | Self::Count => 0.0,
                _ => f64::NAN,
            };
        }

        let n = values.len() as f64;
        match self {
            Self::Mean => values.iter().sum::<f64>() / n,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Sum => values.iter().sum(),
            Self::Count => n,
            Self::StdDev => {
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                variance.sqrt()
            }
        }
    }
}

/// Reduces the analog samples falling inside each row.
pub struct IntervalReductionComputer {
    source: Arc<AnalogAdapter>,
    reduction: Reduction,
}

impl IntervalReductionComputer {
    pub fn new(source: Arc<AnalogAdapter>, reduction: Reduction) -> Self {
        Self { source, reduction }
    }
}

impl ColumnComputer for IntervalReductionComputer {
    type Output = f64;

    fn compute(&self, row: &RowContext<'_>) -> f64 {
        let values = self.source.samples_for_row(row.descriptor, row.time_frame);
        self.reduction.apply(&values)
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}
