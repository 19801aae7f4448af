use std::{collections::HashMap, fmt};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    builder::{ExpandedRow, ExpansionPlan},
    column::{Column, ColumnData, ColumnType},
    selector::{RowDescriptor, RowSelector},
    Result, TableError,
};

/// Named columns over an expanded row index.
///
/// Row count and column set are fixed when the table is built. Column values
/// are computed on first access and cached; a table can be read from several
/// threads at once.
pub struct Table {
    selector: Box<dyn RowSelector>,
    plan: ExpansionPlan,
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
}

impl Table {
    pub(crate) fn new(selector: Box<dyn RowSelector>, plan: ExpansionPlan, columns: Vec<Column>) -> Self {
        let by_name = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name().to_string(), i))
            .collect();
        Self {
            selector,
            plan,
            columns,
            by_name,
        }
    }

    pub fn row_count(&self) -> usize {
        self.plan.row_count()
    }

    /// Number of rows the selector produced before expansion.
    pub fn base_row_count(&self) -> usize {
        self.plan.base_row_count()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Column names in the order they were added.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn expansion_plan(&self) -> &ExpansionPlan {
        &self.plan
    }

    pub fn expanded_rows(&self) -> impl Iterator<Item = ExpandedRow> + '_ {
        self.plan.expanded_rows()
    }

    pub fn row_selector(&self) -> &dyn RowSelector {
        &*self.selector
    }

    /// Base row descriptor behind output row `row`.
    pub fn row_descriptor(&self, row: usize) -> Option<&RowDescriptor> {
        let expanded = self.plan.expanded_rows().nth(row)?;
        self.selector.rows().get(expanded.base_row)
    }

    /// All values of column `name`, evaluating it on first access.
    pub fn column_values<T: ColumnType>(&self, name: &str) -> Result<&[T]> {
        let data = self.column_data(name)?;
        T::unwrap(data).ok_or_else(|| TableError::TypeMismatch {
            column: name.to_string(),
            expected: T::NAME,
            actual: data.type_name(),
        })
    }

    /// Value of column `name` at output row `row`.
    pub fn value_at<T: ColumnType>(&self, name: &str, row: usize) -> Result<T> {
        let values = self.column_values::<T>(name)?;
        values.get(row).cloned().ok_or_else(|| TableError::RowOutOfRange {
            column: name.to_string(),
            row,
            row_count: values.len(),
        })
    }

    /// Untyped values of column `name`.
    pub fn column_data(&self, name: &str) -> Result<&ColumnData> {
        let index = self
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| TableError::UnknownColumn {
                name: name.to_string(),
            })?;
        Ok(self.columns[index].values(&*self.selector, &self.plan))
    }

    pub fn is_column_materialized(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .map(|i| self.columns[*i].is_materialized())
            .unwrap_or(false)
    }

    /// Evaluates every column. Columns are independent, so they are
    /// evaluated in parallel.
    pub fn materialize_all(&self) {
        debug!(columns = self.columns.len(), "materializing all columns");
        let selector = &*self.selector;
        let plan = &self.plan;
        self.columns.par_iter().for_each(|column| {
            column.values(selector, plan);
        });
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.row_count())
            .field("base_rows", &self.base_row_count())
            .field("columns", &self.column_names())
            .field("driver", &self.plan.driver())
            .finish()
    }
}
