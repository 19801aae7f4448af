//! Table construction and multi-sample row expansion.
//!
//! The builder collects one row selector and a set of uniquely named columns.
//! On [`TableBuilder::build`] it scans every column's bound adapters for
//! sources that can yield several samples for one base row. At most one such
//! source may be present; it decides how many output rows each base row
//! expands to. Every other column is broadcast across those rows.

mod plan;

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, info, warn};

pub use plan::{ExpandedRow, ExpansionPlan};

use crate::{
    column::{Column, MultiColumnGroup},
    computers::{ColumnComputer, MultiColumnComputer},
    selector::RowSelector,
    table::Table,
    Result, TableError,
};

#[derive(Debug)]
enum BuilderState {
    Open {
        selector: Option<Box<dyn RowSelector>>,
        columns: Vec<Column>,
    },
    Consumed,
}

/// Accumulates a row selector and columns, then produces a [`Table`].
#[derive(Debug)]
pub struct TableBuilder {
    state: BuilderState,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            state: BuilderState::Open {
                selector: None,
                columns: Vec::new(),
            },
        }
    }

    /// Sets the selector that produces the base rows.
    ///
    /// Fails if a selector is already set and has not been consumed by a
    /// build. On a consumed builder this starts a fresh configuration.
    pub fn set_row_selector<R: RowSelector + 'static>(&mut self, selector: R) -> Result<&mut Self> {
        match &mut self.state {
            BuilderState::Open { selector: Some(_), .. } => Err(TableError::RowSelectorAlreadySet),
            BuilderState::Open { selector: slot, .. } => {
                debug!(rows = selector.size(), "row selector set");
                *slot = Some(Box::new(selector));
                Ok(self)
            }
            BuilderState::Consumed => {
                debug!(rows = selector.size(), "re-arming consumed builder");
                self.state = BuilderState::Open {
                    selector: Some(Box::new(selector)),
                    columns: Vec::new(),
                };
                Ok(self)
            }
        }
    }

    /// Adds a single-valued column.
    pub fn add_column<C: ColumnComputer>(&mut self, name: impl Into<String>, computer: C) -> Result<&mut Self> {
        let name = name.into();
        let columns = self.open_columns()?;
        check_new_name(columns, &name)?;
        debug!(column = %name, "column added");
        columns.push(Column::simple(name, computer));
        Ok(self)
    }

    /// Adds one sub-column per suffix the computer reports, named
    /// `<name>.<suffix>`. Either every sub-column is added or none is.
    pub fn add_columns<M: MultiColumnComputer>(&mut self, name: impl Into<String>, computer: M) -> Result<&mut Self> {
        let name = name.into();
        let columns = self.open_columns()?;
        if name.is_empty() {
            return Err(TableError::EmptyColumnName);
        }

        let full_names: Vec<String> = computer
            .suffixes()
            .iter()
            .map(|suffix| format!("{name}.{suffix}"))
            .collect();
        if full_names.is_empty() {
            return Err(TableError::InvalidSampling(format!(
                "computer for column '{name}' reports no sub-columns"
            )));
        }

        let mut pending = HashSet::new();
        for full_name in &full_names {
            check_new_name(columns, full_name)?;
            if !pending.insert(full_name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    name: full_name.clone(),
                });
            }
        }

        let group = Arc::new(MultiColumnGroup::new(
            name.clone(),
            Box::new(computer),
            full_names.len(),
        ));
        debug!(column = %name, sub_columns = full_names.len(), "multi-value columns added");
        for (position, full_name) in full_names.into_iter().enumerate() {
            columns.push(Column::sub(full_name, group.clone(), position));
        }
        Ok(self)
    }

    /// Names of the columns added so far.
    pub fn column_names(&self) -> Vec<&str> {
        match &self.state {
            BuilderState::Open { columns, .. } => columns.iter().map(Column::name).collect(),
            BuilderState::Consumed => Vec::new(),
        }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.state, BuilderState::Consumed)
    }

    /// Validates the configuration, plans expansion and produces the table.
    ///
    /// A failed build leaves the builder unchanged. A successful build moves
    /// the selector and columns into the table and marks the builder consumed.
    pub fn build(&mut self) -> Result<Table> {
        let (selector, columns) = match std::mem::replace(&mut self.state, BuilderState::Consumed) {
            BuilderState::Open {
                selector: Some(selector),
                columns,
            } if !columns.is_empty() => (selector, columns),
            state => {
                let err = match &state {
                    BuilderState::Consumed => TableError::BuilderConsumed,
                    BuilderState::Open { selector: None, .. } => TableError::MissingRowSelector,
                    BuilderState::Open { .. } => TableError::NoColumns,
                };
                self.state = state;
                return Err(err);
            }
        };

        let mut sources = plan::multi_sample_sources(&columns, &*selector);
        let plan = match sources.len() {
            0 => ExpansionPlan::unexpanded(selector.size()),
            1 => {
                let driver = sources.remove(0);
                debug!(source = driver.name(), "expanding rows by multi-sample source");
                ExpansionPlan::expanded_by(&*selector, &*driver)
            }
            _ => {
                let sources: Vec<_> = sources.iter().map(|source| source.info()).collect();
                warn!(?sources, "rejecting table with multiple multi-sample sources");
                self.state = BuilderState::Open {
                    selector: Some(selector),
                    columns,
                };
                return Err(TableError::MultipleMultiSampleSources { sources });
            }
        };

        info!(
            base_rows = plan.base_row_count(),
            rows = plan.row_count(),
            columns = columns.len(),
            "built table"
        );
        Ok(Table::new(selector, plan, columns))
    }

    fn open_columns(&mut self) -> Result<&mut Vec<Column>> {
        match &mut self.state {
            BuilderState::Open { columns, .. } => Ok(columns),
            BuilderState::Consumed => Err(TableError::BuilderConsumed),
        }
    }
}

fn check_new_name(columns: &[Column], name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TableError::EmptyColumnName);
    }
    if columns.iter().any(|column| column.name() == name) {
        return Err(TableError::DuplicateColumn {
            name: name.to_string(),
        });
    }
    Ok(())
}
