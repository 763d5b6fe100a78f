//! Running accuracy and kappa statistics
//!
//! Window-local counters are folded into the cumulative statistics with the
//! incremental mean formulas, so no prediction history beyond the kappa
//! window is ever stored.

use crate::error::{EvalError, Result};
use crate::kappa::cohen_kappa;
use crate::ring_buffer::RingBuffer;
use crate::types::{Label, MetricsSnapshot};

/// Default capacity of the kappa windows
pub const DEFAULT_KAPPA_WINDOW: usize = 200;

#[derive(Debug, Clone)]
pub struct RunningMetrics {
    recent_predictions: RingBuffer<Label>,
    recent_labels: RingBuffer<Label>,
    partial_sample_count: u64,
    partial_correct_count: u64,
    global_accuracy: f64,
    global_kappa: f64,
    snapshot_count: u64,
}

impl Default for RunningMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_KAPPA_WINDOW)
    }
}

impl RunningMetrics {
    pub fn new(kappa_window: usize) -> Self {
        Self {
            recent_predictions: RingBuffer::new(kappa_window),
            recent_labels: RingBuffer::new(kappa_window),
            partial_sample_count: 0,
            partial_correct_count: 0,
            global_accuracy: 0.0,
            global_kappa: 0.0,
            snapshot_count: 0,
        }
    }

    /// Record one evaluated batch
    ///
    /// `first_position` is the number of samples evaluated before this batch.
    /// A sample is only counted as correct while its 1-based position is
    /// within `max_instances`. Returns the number of samples counted correct.
    pub fn record(
        &mut self,
        predictions: &[Label],
        labels: &[Label],
        first_position: u64,
        max_instances: u64,
    ) -> Result<u64> {
        if predictions.len() != labels.len() {
            return Err(EvalError::Classifier(format!(
                "Classifier returned {} predictions for {} instances",
                predictions.len(),
                labels.len()
            )));
        }

        // pushed in lockstep so the i-th elements describe the same instance
        self.recent_predictions.extend(predictions.iter().copied());
        self.recent_labels.extend(labels.iter().copied());

        let mut correct = 0u64;
        for (i, (prediction, label)) in predictions.iter().zip(labels).enumerate() {
            let position = first_position + i as u64 + 1;
            if prediction == label && position <= max_instances {
                correct += 1;
            }
        }

        self.partial_correct_count += correct;
        self.partial_sample_count += labels.len() as u64;
        Ok(correct)
    }

    /// Close the current window and fold it into the running statistics
    pub fn snapshot(&mut self, global_sample_count: u64) -> Result<MetricsSnapshot> {
        if self.partial_sample_count == 0 {
            return Err(EvalError::InvalidState(
                "Cannot close a window with no samples".to_string(),
            ));
        }
        if global_sample_count < self.partial_sample_count {
            return Err(EvalError::InvalidState(format!(
                "Global sample count {} is smaller than the window size {}",
                global_sample_count, self.partial_sample_count
            )));
        }

        let total = global_sample_count as f64;
        let window_count = self.partial_sample_count as f64;
        let window_accuracy = self.partial_correct_count as f64 / window_count;

        self.global_accuracy = ((total - window_count) / total) * self.global_accuracy
            + (window_count / total) * window_accuracy;

        let window_kappa = cohen_kappa(
            &self.recent_predictions.snapshot(),
            &self.recent_labels.snapshot(),
        )
        .unwrap_or(1.0);

        self.snapshot_count += 1;
        let count = self.snapshot_count as f64;
        self.global_kappa =
            ((count - 1.0) / count) * self.global_kappa + (1.0 / count) * window_kappa;

        self.partial_sample_count = 0;
        self.partial_correct_count = 0;

        Ok(MetricsSnapshot {
            index: self.snapshot_count,
            window_accuracy,
            window_kappa,
            global_accuracy: self.global_accuracy,
            global_kappa: self.global_kappa,
            global_sample_count,
        })
    }

    /// Forget all state, keeping the window capacity
    pub fn reset(&mut self) {
        *self = Self::new(self.recent_predictions.capacity());
    }

    pub fn partial_sample_count(&self) -> u64 {
        self.partial_sample_count
    }

    pub fn partial_correct_count(&self) -> u64 {
        self.partial_correct_count
    }

    pub fn global_accuracy(&self) -> f64 {
        self.global_accuracy
    }

    pub fn global_kappa(&self) -> f64 {
        self.global_kappa
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }

    pub fn kappa_window(&self) -> usize {
        self.recent_predictions.capacity()
    }

    pub fn recent_predictions(&self) -> Vec<Label> {
        self.recent_predictions.snapshot()
    }

    pub fn recent_labels(&self) -> Vec<Label> {
        self.recent_labels.snapshot()
    }
}
