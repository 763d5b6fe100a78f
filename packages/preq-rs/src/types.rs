use serde::{Deserialize, Serialize};

/// Class label as produced by streams and classifiers
pub type Label = i64;

/// A batch of instances pulled from a stream
///
/// `features[i]` and `labels[i]` describe the same instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceBatch {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<Label>,
}

impl InstanceBatch {
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<Label>) -> Self {
        Self { features, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Interim statistics computed when a window closes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// 1-based position of this snapshot within the run
    pub index: u64,
    pub window_accuracy: f64,
    /// Kappa over the most recent predictions (1.0 when undefined)
    pub window_kappa: f64,
    pub global_accuracy: f64,
    pub global_kappa: f64,
    pub global_sample_count: u64,
}

impl MetricsSnapshot {
    /// Values forwarded to a reporting sink: accuracy, plus kappa when enabled
    pub fn values(&self, show_kappa: bool) -> Vec<f64> {
        if show_kappa {
            vec![self.window_accuracy, self.window_kappa]
        } else {
            vec![self.window_accuracy]
        }
    }
}

/// Why an evaluation run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    StreamExhausted,
    InstanceBudget,
    TimeBudget,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::StreamExhausted => "stream exhausted",
            Self::InstanceBudget => "instance budget reached",
            Self::TimeBudget => "time budget reached",
        };
        f.write_str(text)
    }
}

/// Lifecycle of a single evaluation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "termination", rename_all = "snake_case")]
pub enum EvaluationPhase {
    Idle,
    Pretraining,
    Evaluating,
    Finished(TerminationReason),
}

impl Default for EvaluationPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl EvaluationPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Pretraining | Self::Evaluating)
    }
}

/// Final report of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: String,
    pub started_at: String,
    pub stream: String,
    pub classifier: String,
    pub elapsed_seconds: f64,
    /// Instances evaluated, pretraining excluded
    pub instances_processed: u64,
    pub pretrain_instances: u64,
    pub correct_predictions: u64,
    pub accuracy: f64,
    pub kappa: f64,
    pub snapshot_count: u64,
    pub termination: TerminationReason,
    pub snapshots: Vec<MetricsSnapshot>,
}
