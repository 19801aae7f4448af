mod common;

use std::sync::Arc;

use common::{setup_logging, LineFixture};
use rstest::{fixture, rstest};
use tableview_core::{
    export, AnalogAdapter, AnalogSeries, AnalogValueComputer, EventAdapter, EventCountComputer,
    EventPresenceComputer, EventSeries, ExportConfig, Interval, IntervalProperty,
    IntervalPropertyComputer, IntervalReductionComputer, IntervalSelector, LineSamplingComputer,
    Reduction, Result, RowDescriptor, Table, TableBuilder, TableError, TimeFrame, TimeFrameIndex,
    TimestampSelector,
};

struct IntervalFixture {
    frame: Arc<TimeFrame>,
    signal: Arc<AnalogAdapter>,
    events: Arc<EventAdapter>,
}

#[fixture]
fn intervals() -> IntervalFixture {
    let frame = Arc::new(TimeFrame::identity(10));
    let signal = AnalogSeries::from_values(frame.clone(), (0..10).map(f64::from).collect());
    let events = EventSeries::new(
        frame.clone(),
        vec![TimeFrameIndex(8), TimeFrameIndex(1), TimeFrameIndex(2)],
    );
    IntervalFixture {
        signal: AnalogAdapter::shared(Arc::new(signal), "signal"),
        events: EventAdapter::shared(Arc::new(events), "events"),
        frame,
    }
}

impl IntervalFixture {
    fn selector(&self) -> IntervalSelector {
        IntervalSelector::new(
            vec![Interval::new(0, 3), Interval::new(5, 9), Interval::new(7, 7)],
            self.frame.clone(),
        )
    }
}

#[rstest]
#[case(Reduction::Mean, [1.5, 7.0, 7.0])]
#[case(Reduction::Max, [3.0, 9.0, 7.0])]
#[case(Reduction::Count, [4.0, 5.0, 1.0])]
#[case(Reduction::Sum, [6.0, 35.0, 7.0])]
fn reduces_signal_over_interval_rows(
    intervals: IntervalFixture,
    #[case] reduction: Reduction,
    #[case] expected: [f64; 3],
) -> Result<()> {
    let mut builder = TableBuilder::new();
    builder.set_row_selector(intervals.selector())?;
    builder.add_column("reduced", IntervalReductionComputer::new(intervals.signal.clone(), reduction))?;
    let table = builder.build()?;

    assert_eq!(table.column_values::<f64>("reduced")?, &expected);
    Ok(())
}

#[rstest]
fn event_and_interval_columns(intervals: IntervalFixture) -> Result<()> {
    setup_logging();
    let mut builder = TableBuilder::new();
    builder.set_row_selector(intervals.selector())?;
    builder.add_column("has_event", EventPresenceComputer::new(intervals.events.clone()))?;
    builder.add_column("events", EventCountComputer::new(intervals.events.clone()))?;
    builder.add_column("duration", IntervalPropertyComputer::new(IntervalProperty::Duration))?;
    builder.add_column("first", AnalogValueComputer::new(intervals.signal.clone()))?;
    let table = builder.build()?;

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_values::<bool>("has_event")?, &[true, true, false]);
    assert_eq!(table.column_values::<i64>("events")?, &[2, 1, 0]);
    assert_eq!(table.column_values::<i64>("duration")?, &[3, 4, 0]);
    assert_eq!(table.column_values::<f64>("first")?, &[0.0, 5.0, 7.0]);
    assert_eq!(
        table.row_descriptor(1),
        Some(&RowDescriptor::Interval(Interval::new(5, 9)))
    );
    Ok(())
}

#[rstest]
fn exports_delimited_text(intervals: IntervalFixture) -> Result<()> {
    let mut builder = TableBuilder::new();
    builder.set_row_selector(intervals.selector())?;
    builder.add_column("start", IntervalPropertyComputer::new(IntervalProperty::Start))?;
    builder.add_column("has_event", EventPresenceComputer::new(intervals.events.clone()))?;
    builder.add_column("mean", IntervalReductionComputer::new(intervals.signal.clone(), Reduction::Mean))?;
    let table = builder.build()?;

    let text = export::to_delimited_string(&table, &ExportConfig::default())?;
    assert_eq!(
        text,
        "start,has_event,mean\n0,true,1.500\n5,true,7.000\n7,false,7.000\n"
    );

    let config = ExportConfig {
        delimiter: '\t',
        precision: 1,
        header: false,
    };
    let text = export::to_delimited_string(&table, &config)?;
    assert_eq!(text.lines().next(), Some("0\ttrue\t1.5"));
    Ok(())
}

#[test]
fn queries_convert_between_frames() -> Result<()> {
    let native = Arc::new(TimeFrame::new((0..100).collect()));
    let signal = AnalogSeries::from_values(native, (0..100).map(f64::from).collect());
    let signal = AnalogAdapter::shared(Arc::new(signal), "fine");

    let coarse = TimeFrame::shared(vec![0, 10, 20, 30]);
    let mut builder = TableBuilder::new();
    builder.set_row_selector(TimestampSelector::new(
        (0..4).map(TimeFrameIndex),
        coarse,
    ))?;
    builder.add_column("value", AnalogValueComputer::new(signal))?;
    let table = builder.build()?;

    assert_eq!(table.column_values::<f64>("value")?, &[0.0, 10.0, 20.0, 30.0]);
    Ok(())
}

#[test]
fn rows_outside_the_row_frame_hold_missing_values() -> Result<()> {
    let native = Arc::new(TimeFrame::new((0..100).collect()));
    let signal = AnalogSeries::from_values(native, (0..100).map(f64::from).collect());
    let signal = AnalogAdapter::shared(Arc::new(signal), "fine");

    let coarse = TimeFrame::shared(vec![0, 10, 20, 30]);
    let mut builder = TableBuilder::new();
    builder.set_row_selector(TimestampSelector::new(
        [2, 5, -1].into_iter().map(TimeFrameIndex),
        coarse,
    ))?;
    builder.add_column("value", AnalogValueComputer::new(signal))?;
    let table = builder.build()?;

    let values = table.column_values::<f64>("value")?;
    assert_eq!(values[0], 20.0);
    assert!(values[1].is_nan());
    assert!(values[2].is_nan());
    Ok(())
}

fn multi_line_table() -> Result<Table> {
    let fixture = LineFixture::new();
    let mut builder = TableBuilder::new();
    builder.set_row_selector(fixture.timestamps(&[0, 1, 2, 3]))?;
    builder.add_columns("MultiLine", LineSamplingComputer::new(fixture.multi.clone(), 1)?)?;
    builder.build()
}

#[test]
fn typed_access_errors() -> Result<()> {
    let table = multi_line_table()?;

    assert!(matches!(
        table.column_values::<i64>("MultiLine.x@0.000"),
        Err(TableError::TypeMismatch { expected: "i64", actual: "f64", .. })
    ));
    assert!(matches!(
        table.column_values::<f64>("MultiLine.z@0.000"),
        Err(TableError::UnknownColumn { .. })
    ));
    assert!(matches!(
        table.value_at::<f64>("MultiLine.x@0.000", 7),
        Err(TableError::RowOutOfRange { row: 7, row_count: 7, .. })
    ));
    assert_eq!(table.value_at::<f64>("MultiLine.y@0.000", 3)?, 2.0);
    Ok(())
}

#[test]
fn materialize_all_evaluates_every_column() -> Result<()> {
    let table = multi_line_table()?;
    assert!(table
        .column_names()
        .iter()
        .all(|name| !table.is_column_materialized(name)));

    table.materialize_all();
    assert!(table
        .column_names()
        .iter()
        .all(|name| table.is_column_materialized(name)));
    assert_eq!(table.column_values::<f64>("MultiLine.x@1.000")?.len(), 7);
    Ok(())
}

#[test]
fn build_requires_selector_and_columns() {
    let fixture = LineFixture::new();

    let mut builder = TableBuilder::new();
    builder
        .add_columns("MultiLine", LineSamplingComputer::new(fixture.multi.clone(), 1).unwrap())
        .unwrap();
    assert!(matches!(builder.build(), Err(TableError::MissingRowSelector)));

    let mut builder = TableBuilder::new();
    builder.set_row_selector(fixture.timestamps(&[0])).unwrap();
    assert!(matches!(builder.build(), Err(TableError::NoColumns)));
    assert!(matches!(
        builder.set_row_selector(fixture.timestamps(&[1])),
        Err(TableError::RowSelectorAlreadySet)
    ));
}

#[test]
fn column_names_are_validated_when_added() {
    let fixture = LineFixture::new();
    let mut builder = TableBuilder::new();

    assert!(matches!(
        builder.add_column("", IntervalPropertyComputer::new(IntervalProperty::Start)),
        Err(TableError::EmptyColumnName)
    ));

    builder
        .add_column("MultiLine.x@0.000", IntervalPropertyComputer::new(IntervalProperty::Start))
        .unwrap();
    let err = builder
        .add_columns("MultiLine", LineSamplingComputer::new(fixture.multi.clone(), 1).unwrap())
        .unwrap_err();
    assert!(matches!(err, TableError::DuplicateColumn { ref name } if name == "MultiLine.x@0.000"));
    // Nothing from the rejected group was added.
    assert_eq!(builder.column_names(), vec!["MultiLine.x@0.000"]);

    assert!(matches!(
        builder.add_column("MultiLine.x@0.000", IntervalPropertyComputer::new(IntervalProperty::End)),
        Err(TableError::DuplicateColumn { .. })
    ));
}

#[test]
fn consumed_builder_needs_a_new_selector() -> Result<()> {
    let fixture = LineFixture::new();
    let mut builder = TableBuilder::new();
    builder.set_row_selector(fixture.timestamps(&[0, 1]))?;
    builder.add_column("start", IntervalPropertyComputer::new(IntervalProperty::Start))?;
    let first = builder.build()?;
    assert_eq!(first.row_count(), 2);
    assert!(builder.is_consumed());

    assert!(matches!(builder.build(), Err(TableError::BuilderConsumed)));
    assert!(matches!(
        builder.add_column("end", IntervalPropertyComputer::new(IntervalProperty::End)),
        Err(TableError::BuilderConsumed)
    ));

    builder.set_row_selector(fixture.timestamps(&[4]))?;
    assert!(builder.column_names().is_empty());
    builder.add_column("end", IntervalPropertyComputer::new(IntervalProperty::End))?;
    let second = builder.build()?;
    assert_eq!(second.column_values::<i64>("end")?, &[4]);
    // The first table is unaffected.
    assert_eq!(first.column_values::<i64>("start")?, &[0, 1]);
    Ok(())
}
