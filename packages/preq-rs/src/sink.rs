//! Receivers of evaluation events
//!
//! The evaluator never holds rendering or persistence state; it pushes raw
//! batch results and closed-window metrics to a `ReportingSink`.

use crate::error::Result;
use crate::types::Label;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub trait ReportingSink {
    /// Raw labels and predictions of one batch, for live charting
    fn on_raw_batch(&mut self, _labels: &[Label], _predictions: &[Label]) -> Result<()> {
        Ok(())
    }

    /// Metrics of a closed window: accuracy, plus kappa when enabled
    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()>;

    /// End of run
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ReportingSink + ?Sized> ReportingSink for &mut S {
    fn on_raw_batch(&mut self, labels: &[Label], predictions: &[Label]) -> Result<()> {
        (**self).on_raw_batch(labels, predictions)
    }

    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()> {
        (**self).on_snapshot(values, global_sample_count)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportingSink for NullSink {
    fn on_snapshot(&mut self, _values: &[f64], _global_sample_count: u64) -> Result<()> {
        Ok(())
    }
}

/// Logs snapshots through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportingSink for LogSink {
    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()> {
        match values {
            [accuracy, kappa] => log::info!(
                "{} samples: accuracy {:.4}, kappa {:.4}",
                global_sample_count,
                accuracy,
                kappa
            ),
            _ => log::info!("{} samples: {:?}", global_sample_count, values),
        }
        Ok(())
    }
}

/// One recorded snapshot event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub sample_count: u64,
    pub values: Vec<f64>,
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub raw_batches: Vec<(Vec<Label>, Vec<Label>)>,
    pub snapshots: Vec<SnapshotEvent>,
    pub finalized: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportingSink for RecordingSink {
    fn on_raw_batch(&mut self, labels: &[Label], predictions: &[Label]) -> Result<()> {
        self.raw_batches.push((labels.to_vec(), predictions.to_vec()));
        Ok(())
    }

    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()> {
        self.snapshots.push(SnapshotEvent {
            sample_count: global_sample_count,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}

/// Writes one JSON object per snapshot
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportingSink for JsonLinesSink<W> {
    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()> {
        let event = SnapshotEvent {
            sample_count: global_sample_count,
            values: values.to_vec(),
        };
        serde_json::to_writer(&mut self.writer, &event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards every event to each inner sink in order
#[derive(Default)]
pub struct FanoutSink<'a> {
    sinks: Vec<Box<dyn ReportingSink + 'a>>,
}

impl<'a> FanoutSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push<S: ReportingSink + 'a>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportingSink for FanoutSink<'_> {
    fn on_raw_batch(&mut self, labels: &[Label], predictions: &[Label]) -> Result<()> {
        for sink in &mut self.sinks {
            sink.on_raw_batch(labels, predictions)?;
        }
        Ok(())
    }

    fn on_snapshot(&mut self, values: &[f64], global_sample_count: u64) -> Result<()> {
        for sink in &mut self.sinks {
            sink.on_snapshot(values, global_sample_count)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finalize()?;
        }
        Ok(())
    }
}
