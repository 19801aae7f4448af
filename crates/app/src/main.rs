use std::{io, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use tableview_core::{
    export, AnalogAdapter, AnalogSeries, AnalogValueComputer, AppConfig, Line2D, LineAdapter,
    LineSamplingComputer, LineSeries, Point2D, SampleCountComputer, SampleSource, Table,
    TableBuilder, TimeFrame, TimeFrameIndex, TimestampSelector,
};
use tracing_subscriber::EnvFilter;

fn main() -> tableview_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { source, config } => run_demo(source, config.as_ref()),
        Commands::Sources => {
            list_sources();
            Ok(())
        }
    }
}

fn run_demo(source: DemoSource, config: Option<&PathBuf>) -> tableview_core::Result<()> {
    let config = match config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    tracing::info!(?source, ?config, "building demo table");

    let positions = config.sampling.positions()?;
    let table = build_demo_table(&Dataset::new(), source, &positions)?;
    table.materialize_all();
    tracing::info!(rows = table.row_count(), columns = table.column_count(), "table ready");

    let stdout = io::stdout();
    export::write_delimited(&table, &mut stdout.lock(), &config.export)
}

fn build_demo_table(
    dataset: &Dataset,
    source: DemoSource,
    positions: &[f64],
) -> tableview_core::Result<Table> {
    let sampler = |adapter: &Arc<LineAdapter>| {
        LineSamplingComputer::with_positions(adapter.clone(), positions.to_vec())
    };

    let mut builder = TableBuilder::new();
    builder.set_row_selector(TimestampSelector::new(
        (0..4).map(TimeFrameIndex),
        dataset.frame.clone(),
    ))?;

    match source {
        DemoSource::Single => {
            builder.add_columns("SingleLine", sampler(&dataset.single)?)?;
        }
        DemoSource::Multi => {
            builder.add_columns("MultiLine", sampler(&dataset.multi)?)?;
            builder.add_column("MultiLineCount", SampleCountComputer::new(dataset.multi.clone()))?;
        }
        DemoSource::Mixed => {
            builder.add_columns("SingleLine", sampler(&dataset.single)?)?;
            builder.add_columns("MultiLine", sampler(&dataset.multi)?)?;
        }
        DemoSource::Conflict => {
            builder.add_columns("MultiLine1", sampler(&dataset.multi)?)?;
            builder.add_columns("MultiLine2", sampler(&dataset.conflict)?)?;
        }
    }
    builder.add_column("Signal", AnalogValueComputer::new(dataset.signal.clone()))?;

    builder.build()
}

fn list_sources() {
    let dataset = Dataset::new();
    let sources: [&dyn SampleSource; 4] = [
        dataset.single.as_ref(),
        dataset.multi.as_ref(),
        dataset.conflict.as_ref(),
        dataset.signal.as_ref(),
    ];
    for source in sources {
        println!(
            "{}\t{}\tmulti_samples={}",
            source.name(),
            source.source_id(),
            source.has_multi_samples()
        );
    }
}

/// Reference line data over a five-index frame.
struct Dataset {
    frame: Arc<TimeFrame>,
    single: Arc<LineAdapter>,
    multi: Arc<LineAdapter>,
    conflict: Arc<LineAdapter>,
    signal: Arc<AnalogAdapter>,
}

impl Dataset {
    fn new() -> Self {
        let frame = TimeFrame::shared(vec![0, 1, 2, 3, 4]);

        let mut single = LineSeries::new(frame.clone());
        for t in 0..5 {
            single.add_at_time(TimeFrameIndex(t), segment((t as f32, 0.0), (t as f32 + 1.0, 1.0)));
        }

        // 1, 3, 1, 2, 1 lines per index.
        let mut multi = LineSeries::new(frame.clone());
        multi.add_at_time(TimeFrameIndex(0), segment((0.0, 0.0), (1.0, 1.0)));
        for y in 0..3 {
            let y = y as f32;
            multi.add_at_time(TimeFrameIndex(1), segment((1.0, y), (2.0, y + 1.0)));
        }
        multi.add_at_time(TimeFrameIndex(2), segment((2.0, 0.0), (3.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(3), segment((3.0, 0.0), (4.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(3), segment((3.0, 1.0), (4.0, 2.0)));
        multi.add_at_time(TimeFrameIndex(4), segment((4.0, 0.0), (5.0, 1.0)));

        let mut conflict = LineSeries::new(frame.clone());
        conflict.add_at_time(TimeFrameIndex(0), segment((0.0, 10.0), (1.0, 11.0)));
        conflict.add_at_time(TimeFrameIndex(0), segment((0.0, 12.0), (1.0, 13.0)));
        for t in 1..5 {
            conflict.add_at_time(TimeFrameIndex(t), segment((t as f32, 10.0), (t as f32 + 1.0, 11.0)));
        }

        let signal = AnalogSeries::from_values(frame.clone(), vec![0.5, 1.5, 2.5, 3.5, 4.5]);

        Self {
            single: LineAdapter::shared(Arc::new(single), "SingleSampleLines"),
            multi: LineAdapter::shared(Arc::new(multi), "MultiSampleLines"),
            conflict: LineAdapter::shared(Arc::new(conflict), "ConflictMultiSampleLines"),
            signal: AnalogAdapter::shared(Arc::new(signal), "Signal"),
            frame,
        }
    }
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line2D {
    Line2D::new(vec![Point2D::from(from), Point2D::from(to)])
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds tables from time-indexed series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a table from the bundled line data and print it.
    Demo {
        /// Which line sources feed the table.
        #[arg(short, long, value_enum, default_value_t = DemoSource::Multi)]
        source: DemoSource,
        /// Optional JSON configuration for sampling and output.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the bundled sources and whether they hold several samples per index.
    Sources,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DemoSource {
    Single,
    Multi,
    Mixed,
    Conflict,
}
