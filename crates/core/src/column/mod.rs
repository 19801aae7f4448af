use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use tracing::{debug, warn};

use crate::{
    adapters::SampleSource,
    builder::ExpansionPlan,
    computers::{ColumnComputer, MultiColumnComputer, RowContext},
    selector::RowSelector,
};

/// Values of one column across every expanded row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    Boolean(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Integer(values) => values.len(),
            Self::Boolean(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => f64::NAME,
            Self::Integer(_) => i64::NAME,
            Self::Boolean(_) => bool::NAME,
        }
    }
}

/// Scalar types a column can hold.
pub trait ColumnType: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn wrap(values: Vec<Self>) -> ColumnData;

    fn unwrap(data: &ColumnData) -> Option<&[Self]>;
}

impl ColumnType for f64 {
    const NAME: &'static str = "f64";

    fn wrap(values: Vec<Self>) -> ColumnData {
        ColumnData::Float(values)
    }

    fn unwrap(data: &ColumnData) -> Option<&[Self]> {
        match data {
            ColumnData::Float(values) => Some(values),
            _ => None,
        }
    }
}

impl ColumnType for i64 {
    const NAME: &'static str = "i64";

    fn wrap(values: Vec<Self>) -> ColumnData {
        ColumnData::Integer(values)
    }

    fn unwrap(data: &ColumnData) -> Option<&[Self]> {
        match data {
            ColumnData::Integer(values) => Some(values),
            _ => None,
        }
    }
}

impl ColumnType for bool {
    const NAME: &'static str = "bool";

    fn wrap(values: Vec<Self>) -> ColumnData {
        ColumnData::Boolean(values)
    }

    fn unwrap(data: &ColumnData) -> Option<&[Self]> {
        match data {
            ColumnData::Boolean(values) => Some(values),
            _ => None,
        }
    }
}

/// Type-erased single-value computer.
trait ErasedComputer: Send + Sync {
    fn evaluate(&self, selector: &dyn RowSelector, plan: &ExpansionPlan) -> ColumnData;

    fn sources(&self) -> Vec<Arc<dyn SampleSource>>;
}

struct Broadcast<C>(C);

impl<C: ColumnComputer> ErasedComputer for Broadcast<C> {
    fn evaluate(&self, selector: &dyn RowSelector, plan: &ExpansionPlan) -> ColumnData {
        let mut values = Vec::with_capacity(plan.row_count());
        for (base_row, descriptor) in selector.rows().iter().enumerate() {
            let row = RowContext {
                descriptor,
                time_frame: selector.time_frame(),
                base_row,
            };
            let value = self.0.compute(&row);
            values.extend(std::iter::repeat(value).take(plan.multiplicity(base_row)));
        }
        C::Output::wrap(values)
    }

    fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        self.0.sources()
    }
}

/// Shared state of the sub-columns registered by one multi-computer.
pub(crate) struct MultiColumnGroup {
    prefix: String,
    computer: Box<dyn MultiColumnComputer>,
    width: usize,
    cache: OnceLock<Vec<ColumnData>>,
}

impl MultiColumnGroup {
    pub(crate) fn new(prefix: String, computer: Box<dyn MultiColumnComputer>, width: usize) -> Self {
        Self {
            prefix,
            computer,
            width,
            cache: OnceLock::new(),
        }
    }

    fn values(&self, selector: &dyn RowSelector, plan: &ExpansionPlan) -> &[ColumnData] {
        self.cache.get_or_init(|| {
            debug!(column = %self.prefix, width = self.width, "evaluating multi-value column group");
            self.evaluate(selector, plan)
        })
    }

    /// Fills each sub-column with one value per expanded row. A single
    /// sample is broadcast; a missing sample becomes `NaN`.
    fn evaluate(&self, selector: &dyn RowSelector, plan: &ExpansionPlan) -> Vec<ColumnData> {
        let mut columns: Vec<Vec<f64>> = (0..self.width)
            .map(|_| Vec::with_capacity(plan.row_count()))
            .collect();

        for (base_row, descriptor) in selector.rows().iter().enumerate() {
            let row = RowContext {
                descriptor,
                time_frame: selector.time_frame(),
                base_row,
            };
            let computed = self.computer.compute(&row);
            let multiplicity = plan.multiplicity(base_row);

            for (position, column) in columns.iter_mut().enumerate() {
                let samples = computed.get(position).map(Vec::as_slice).unwrap_or(&[]);
                if samples.len() > 1 && samples.len() != multiplicity {
                    warn!(
                        column = %self.prefix,
                        base_row,
                        samples = samples.len(),
                        multiplicity,
                        "sample count differs from row multiplicity"
                    );
                }
                for sample in 0..multiplicity {
                    let value = match samples {
                        [] => f64::NAN,
                        [single] => *single,
                        many => many.get(sample).copied().unwrap_or(f64::NAN),
                    };
                    column.push(value);
                }
            }
        }

        columns.into_iter().map(ColumnData::Float).collect()
    }
}

enum ColumnKind {
    Simple {
        computer: Box<dyn ErasedComputer>,
        cache: OnceLock<ColumnData>,
    },
    Sub {
        group: Arc<MultiColumnGroup>,
        position: usize,
    },
}

/// A named, lazily evaluated column of a table.
pub struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    pub(crate) fn simple<C: ColumnComputer>(name: String, computer: C) -> Self {
        Self {
            name,
            kind: ColumnKind::Simple {
                computer: Box::new(Broadcast(computer)),
                cache: OnceLock::new(),
            },
        }
    }

    pub(crate) fn sub(name: String, group: Arc<MultiColumnGroup>, position: usize) -> Self {
        Self {
            name,
            kind: ColumnKind::Sub { group, position },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_materialized(&self) -> bool {
        match &self.kind {
            ColumnKind::Simple { cache, .. } => cache.get().is_some(),
            ColumnKind::Sub { group, .. } => group.cache.get().is_some(),
        }
    }

    /// Whether the column belongs to a multi-value group.
    pub(crate) fn is_multi_valued(&self) -> bool {
        matches!(self.kind, ColumnKind::Sub { .. })
    }

    pub(crate) fn sources(&self) -> Vec<Arc<dyn SampleSource>> {
        match &self.kind {
            ColumnKind::Simple { computer, .. } => computer.sources(),
            ColumnKind::Sub { group, .. } => group.computer.sources(),
        }
    }

    /// Values across all expanded rows, computed on first access.
    pub(crate) fn values(&self, selector: &dyn RowSelector, plan: &ExpansionPlan) -> &ColumnData {
        match &self.kind {
            ColumnKind::Simple { computer, cache } => cache.get_or_init(|| {
                debug!(column = %self.name, rows = plan.row_count(), "evaluating column");
                computer.evaluate(selector, plan)
            }),
            ColumnKind::Sub { group, position } => &group.values(selector, plan)[*position],
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
