use std::{collections::HashSet, sync::Arc};

use crate::{
    adapters::{LineAdapter, SampleSource},
    Result, TableError,
};

use super::{MultiColumnComputer, RowContext};

/// Samples each polyline at normalized arc-length positions.
///
/// Registers `x@<p>` and `y@<p>` for every requested position `p`, with `p`
/// printed to three decimals. Each line present at a row contributes one
/// value per sub-column.
pub struct LineSamplingComputer {
    source: Arc<LineAdapter>,
    positions: Vec<f64>,
}

impl LineSamplingComputer {
    /// Evenly spaced positions splitting each line into `segments` pieces,
    /// endpoints included.
    pub fn new(source: Arc<LineAdapter>, segments: usize) -> Result<Self> {
        if segments == 0 {
            return Err(TableError::InvalidSampling(
                "line sampling needs at least one segment".to_string(),
            ));
        }
        let positions = (0..=segments)
            .map(|i| i as f64 / segments as f64)
            .collect();
        Self::with_positions(source, positions)
    }

    pub fn with_positions(source: Arc<LineAdapter>, positions: Vec<f64>) -> Result<Self> {
        if positions.is_empty() {
            return Err(TableError::InvalidSampling(
                "line sampling needs at least one position".to_string(),
            ));
        }

        let mut labels = HashSet::new();
        for position in &positions {
            if !position.is_finite() || !(0.0..=1.0).contains(position) {
                return Err(TableError::InvalidSampling(format!(
                    "position {position} is outside [0, 1]"
                )));
            }
            if !labels.insert(format_position(*position)) {
                return Err(TableError::InvalidSampling(format!(
                    "position {position} collides with another position at three decimals"
                )));
            }
        }

        Ok(Self { source, positions })
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }
}

fn format_position(position: f64) -> String {
    format!("{position:.3}")
}

impl MultiColumnComputer for LineSamplingComputer {
    fn suffixes(&self) -> Vec<String> {
        self.positions
            .iter()
            .flat_map(|p| {
                let label = format_position(*p);
                [format!("x@{label}"), format!("y@{label}")]
            })
            .collect()
    }

    fn compute(&self, row: &RowContext<'_>) -> Vec<Vec<f64>> {
        let lines = self.source.samples_for_row(row.descriptor, row.time_frame);
        let mut columns = vec![Vec::with_capacity(lines.len()); self.positions.len() * 2];

        for line in &lines {
            for (k, position) in self.positions.iter().enumerate() {
                let (x, y) = line
                    .point_at_fraction(*position)
                    .unwrap_or((f64::NAN, f64::NAN));
                columns[2 * k].push(x);
                columns[2 * k + 1].push(y);
            }
        }
        columns
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        vec![self.source.clone()]
    }
}
