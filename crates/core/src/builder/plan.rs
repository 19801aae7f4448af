use std::{collections::HashSet, sync::Arc};

use tracing::{debug, trace};

use crate::{
    adapters::{SampleSource, SourceInfo},
    column::Column,
    selector::RowSelector,
};

/// Position of an output row relative to the base rows it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpandedRow {
    pub base_row: usize,
    /// Ordinal of the sample within its base row.
    pub sample: usize,
}

/// Per base row output multiplicity, fixed when a table is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionPlan {
    multiplicities: Vec<usize>,
    row_count: usize,
    driver: Option<SourceInfo>,
}

impl ExpansionPlan {
    /// One output row per base row.
    pub fn unexpanded(base_rows: usize) -> Self {
        Self {
            multiplicities: vec![1; base_rows],
            row_count: base_rows,
            driver: None,
        }
    }

    /// Expands each base row by the samples `driver` holds there. Rows where
    /// the driver holds zero samples are kept as a single row.
    pub fn expanded_by(selector: &dyn RowSelector, driver: &dyn SampleSource) -> Self {
        let multiplicities: Vec<usize> = selector
            .rows()
            .iter()
            .map(|row| driver.sample_count(row, selector.time_frame()).max(1))
            .collect();
        let row_count = multiplicities.iter().sum();
        Self {
            multiplicities,
            row_count,
            driver: Some(driver.info()),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn base_row_count(&self) -> usize {
        self.multiplicities.len()
    }

    pub fn multiplicity(&self, base_row: usize) -> usize {
        self.multiplicities.get(base_row).copied().unwrap_or(0)
    }

    pub fn multiplicities(&self) -> &[usize] {
        &self.multiplicities
    }

    /// Source that drove expansion, if any.
    pub fn driver(&self) -> Option<&SourceInfo> {
        self.driver.as_ref()
    }

    pub fn expanded_rows(&self) -> impl Iterator<Item = ExpandedRow> + '_ {
        self.multiplicities
            .iter()
            .enumerate()
            .flat_map(|(base_row, count)| (0..*count).map(move |sample| ExpandedRow { base_row, sample }))
    }
}

/// Distinct sources that can yield several samples for one base row, in
/// first-seen order.
///
/// A source qualifies when it holds several samples at some index. A source
/// feeding a multi-value column also qualifies when a selected row gathers
/// several of its samples, as an interval row over a single-sample series
/// does. Scalar columns reduce such rows and never expand them.
pub(crate) fn multi_sample_sources(columns: &[Column], selector: &dyn RowSelector) -> Vec<Arc<dyn SampleSource>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for column in columns {
        for source in column.sources() {
            if seen.contains(&source.source_id()) {
                continue;
            }
            if !expands_rows(&*source, column.is_multi_valued(), selector) {
                continue;
            }
            trace!(column = column.name(), source = source.name(), "found multi-sample source");
            seen.insert(source.source_id());
            found.push(source);
        }
    }
    debug!(count = found.len(), "multi-sample source discovery finished");
    found
}

fn expands_rows(source: &dyn SampleSource, multi_valued: bool, selector: &dyn RowSelector) -> bool {
    if source.has_multi_samples() {
        return true;
    }
    multi_valued
        && selector
            .rows()
            .iter()
            .any(|row| source.sample_count(row, selector.time_frame()) > 1)
}
