#![allow(dead_code)]

use std::sync::Arc;

use tableview_core::{Line2D, LineAdapter, LineSeries, Point2D, TimeFrame, TimeFrameIndex};
use tracing_subscriber::EnvFilter;

pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tableview_core=trace".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

pub fn segment(from: (f32, f32), to: (f32, f32)) -> Line2D {
    Line2D::new(vec![Point2D::from(from), Point2D::from(to)])
}

/// Five-index frame with three line sources:
///
/// * `SingleSampleLines`: one line per index.
/// * `MultiSampleLines`: 1, 3, 1, 2, 1 lines per index.
/// * `ConflictMultiSampleLines`: 2 lines at index 0, one elsewhere.
pub struct LineFixture {
    pub frame: Arc<TimeFrame>,
    pub single: Arc<LineAdapter>,
    pub multi: Arc<LineAdapter>,
    pub conflict: Arc<LineAdapter>,
}

impl LineFixture {
    pub fn new() -> Self {
        let frame = TimeFrame::shared(vec![0, 1, 2, 3, 4]);

        let mut single = LineSeries::new(frame.clone());
        for t in 0..5 {
            let x = t as f32;
            single.add_at_time(TimeFrameIndex(t), segment((x, 0.0), (x + 1.0, 1.0)));
        }

        let mut multi = LineSeries::new(frame.clone());
        multi.add_at_time(TimeFrameIndex(0), segment((0.0, 0.0), (1.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(1), segment((1.0, 0.0), (2.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(1), segment((1.0, 1.0), (2.0, 2.0)));
        multi.add_at_time(TimeFrameIndex(1), segment((1.0, 2.0), (2.0, 3.0)));
        multi.add_at_time(TimeFrameIndex(2), segment((2.0, 0.0), (3.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(3), segment((3.0, 0.0), (4.0, 1.0)));
        multi.add_at_time(TimeFrameIndex(3), segment((3.0, 1.0), (4.0, 2.0)));
        multi.add_at_time(TimeFrameIndex(4), segment((4.0, 0.0), (5.0, 1.0)));

        let mut conflict = LineSeries::new(frame.clone());
        conflict.add_at_time(TimeFrameIndex(0), segment((0.0, 10.0), (1.0, 11.0)));
        conflict.add_at_time(TimeFrameIndex(0), segment((0.0, 12.0), (1.0, 13.0)));
        for t in 1..5 {
            let x = t as f32;
            conflict.add_at_time(TimeFrameIndex(t), segment((x, 10.0), (x + 1.0, 11.0)));
        }

        Self {
            single: LineAdapter::shared(Arc::new(single), "SingleSampleLines"),
            multi: LineAdapter::shared(Arc::new(multi), "MultiSampleLines"),
            conflict: LineAdapter::shared(Arc::new(conflict), "ConflictMultiSampleLines"),
            frame,
        }
    }

    pub fn timestamps(&self, indices: &[i64]) -> tableview_core::TimestampSelector {
        tableview_core::TimestampSelector::new(
            indices.iter().copied().map(TimeFrameIndex),
            self.frame.clone(),
        )
    }
}
