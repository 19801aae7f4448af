//! Core library for projecting time-indexed series into uniform tables.
//!
//! Producers hand the crate shared, already parsed series (points, lines,
//! analog samples, events, intervals). Source adapters put those series
//! behind one query contract, a row selector picks the base rows, and column
//! computers derive named values per row. The [`TableBuilder`] validates the
//! configuration and expands rows when exactly one source holds several
//! samples at an index, producing a read-only [`Table`].

pub mod adapters;
pub mod builder;
pub mod column;
pub mod computers;
pub mod config;
pub mod error;
pub mod export;
pub mod selector;
pub mod series;
pub mod table;
pub mod time_frame;

pub use adapters::{
    AnalogAdapter, EventAdapter, IntervalAdapter, LineAdapter, PointAdapter, SampleSource,
    SeriesAdapter, SourceId, SourceInfo,
};
pub use builder::{ExpandedRow, ExpansionPlan, TableBuilder};
pub use column::{Column, ColumnData, ColumnType};
pub use computers::{
    AnalogValueComputer, ColumnComputer, EventCountComputer, EventPresenceComputer,
    IntervalProperty, IntervalPropertyComputer, IntervalReductionComputer, LineSamplingComputer,
    MultiColumnComputer, PointComponentComputer, Reduction, RowContext, SampleCountComputer,
};
pub use config::{AppConfig, ExportConfig, SamplingConfig};
pub use error::{Result, TableError};
pub use selector::{IndexSelector, IntervalSelector, RowDescriptor, RowSelector, TimestampSelector};
pub use series::{
    AnalogSeries, EventSeries, Interval, IntervalSeries, Line2D, LineSeries, Point2D, PointSeries,
    RaggedSeries, TimeSeries,
};
pub use table::Table;
pub use time_frame::{TimeFrame, TimeFrameIndex};
