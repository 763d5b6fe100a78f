//! Prequential (test-then-train) evaluation loop
//!
//! Every batch is first scored by the current model and only then used to
//! train it. Running accuracy and kappa are folded in whenever a window of
//! `n_wait` samples closes or the instance budget is reached.

use crate::classifier::Classifier;
use crate::config::{ConfigUpdate, EvaluatorConfig};
use crate::error::{EvalError, Result};
use crate::metrics::RunningMetrics;
use crate::profiling::ProfileScope;
use crate::sink::ReportingSink;
use crate::stream::Stream;
use crate::types::{EvaluationPhase, EvaluationReport, Label, MetricsSnapshot, TerminationReason};
use uuid::Uuid;

/// Log target of the 5% progress lines
pub const PROGRESS_TARGET: &str = "preq::progress";

pub struct PrequentialEvaluator<C: Classifier> {
    config: EvaluatorConfig,
    classifier: Option<C>,
    metrics: RunningMetrics,
    phase: EvaluationPhase,
    global_sample_count: u64,
    global_correct_count: u64,
    snapshots: Vec<MetricsSnapshot>,
}

impl<C: Classifier> PrequentialEvaluator<C> {
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        let metrics = RunningMetrics::new(config.kappa_window);
        Ok(Self {
            config,
            classifier: None,
            metrics,
            phase: EvaluationPhase::Idle,
            global_sample_count: 0,
            global_correct_count: 0,
            snapshots: Vec::new(),
        })
    }

    pub fn with_classifier(mut self, classifier: C) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Bulk configuration update, only allowed between runs
    pub fn apply_update(&mut self, update: &ConfigUpdate) -> Result<()> {
        if self.phase.is_running() {
            return Err(EvalError::InvalidState(
                "Configuration cannot change while a run is in progress".to_string(),
            ));
        }
        self.config.apply(update)
    }

    pub fn phase(&self) -> EvaluationPhase {
        self.phase
    }

    pub fn set_classifier(&mut self, classifier: C) {
        self.classifier = Some(classifier);
    }

    pub fn classifier(&self) -> Option<&C> {
        self.classifier.as_ref()
    }

    pub fn take_classifier(&mut self) -> Option<C> {
        self.classifier.take()
    }

    /// Predict with the configured classifier
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Label>> {
        self.classifier
            .as_ref()
            .ok_or(EvalError::UninitializedClassifier)?
            .predict(features)
    }

    /// Train the configured classifier outside of a run
    pub fn partial_fit(&mut self, features: &[Vec<f64>], labels: &[Label]) -> Result<()> {
        self.classifier
            .as_mut()
            .ok_or(EvalError::UninitializedClassifier)?
            .partial_fit(features, labels, None)
    }

    pub fn global_sample_count(&self) -> u64 {
        self.global_sample_count
    }

    pub fn global_correct_count(&self) -> u64 {
        self.global_correct_count
    }

    pub fn metrics(&self) -> &RunningMetrics {
        &self.metrics
    }

    pub fn snapshots(&self) -> &[MetricsSnapshot] {
        &self.snapshots
    }

    /// Evaluate `classifier` on `stream` and hand the trained model back
    ///
    /// On error the classifier stays inside the evaluator and can be
    /// recovered with `take_classifier`.
    pub fn eval<S, R>(
        &mut self,
        stream: &mut S,
        classifier: C,
        sink: &mut R,
    ) -> Result<(C, EvaluationReport)>
    where
        S: Stream + ?Sized,
        R: ReportingSink + ?Sized,
    {
        self.classifier = Some(classifier);
        let report = self.train_and_test(stream, sink)?;
        let classifier = self
            .classifier
            .take()
            .ok_or(EvalError::UninitializedClassifier)?;
        Ok((classifier, report))
    }

    /// Run the prequential loop with the configured classifier
    pub fn train_and_test<S, R>(&mut self, stream: &mut S, sink: &mut R) -> Result<EvaluationReport>
    where
        S: Stream + ?Sized,
        R: ReportingSink + ?Sized,
    {
        if self.classifier.is_none() {
            return Err(EvalError::UninitializedClassifier);
        }
        if self.phase.is_running() {
            return Err(EvalError::InvalidState(
                "An evaluation run is already in progress".to_string(),
            ));
        }

        let result = self.run(stream, sink);
        if result.is_err() {
            self.phase = EvaluationPhase::Idle;
        }
        result
    }

    fn run<S, R>(&mut self, stream: &mut S, sink: &mut R) -> Result<EvaluationReport>
    where
        S: Stream + ?Sized,
        R: ReportingSink + ?Sized,
    {
        let run_id = Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now().to_rfc3339();
        let run_scope = ProfileScope::new(format!("run {}", run_id));

        self.metrics = RunningMetrics::new(self.config.kappa_window);
        self.global_sample_count = 0;
        self.global_correct_count = 0;
        self.snapshots.clear();

        let classifier = self
            .classifier
            .as_mut()
            .ok_or(EvalError::UninitializedClassifier)?;
        let classifier_name = classifier.name();

        log::info!(
            "[run {}] Evaluating {} on stream {} ({} classes)",
            run_id,
            classifier_name,
            stream.name(),
            stream.n_classes()
        );

        let mut pretrain_instances = 0u64;
        if self.config.pretraining_enabled() {
            self.phase = EvaluationPhase::Pretraining;
            let _scope = ProfileScope::new(format!("run {} pretraining", run_id));
            log::info!(
                "[run {}] Pretraining on {} samples",
                run_id,
                self.config.pretrain_size
            );
            match stream.next_batch(self.config.pretrain_size)? {
                Some(batch) if !batch.is_empty() => {
                    let classes = stream.classes();
                    classifier.partial_fit(&batch.features, &batch.labels, Some(&classes))?;
                    pretrain_instances = batch.len() as u64;
                }
                _ => log::warn!("[run {}] Stream returned no pretraining data", run_id),
            }
        }

        self.phase = EvaluationPhase::Evaluating;
        let _scope = ProfileScope::new(format!("run {} evaluation", run_id));
        log::info!("[run {}] Evaluating...", run_id);

        let max_instances = self.config.max_instances;
        let n_wait = self.config.n_wait;
        let mut progress = ProgressTracker::new(
            expected_total(stream.estimated_remaining(), max_instances),
            run_id.clone(),
        );

        let termination = loop {
            if self.global_sample_count >= max_instances {
                break TerminationReason::InstanceBudget;
            }
            if let Some(max_time) = self.config.max_time {
                if run_scope.elapsed().as_secs_f64() >= max_time {
                    break TerminationReason::TimeBudget;
                }
            }
            if !stream.has_more() {
                break TerminationReason::StreamExhausted;
            }

            let batch = match stream.next_batch(self.config.batch_size)? {
                Some(batch) if !batch.is_empty() => batch,
                _ => {
                    log::debug!("[run {}] Stream returned no data, retrying", run_id);
                    continue;
                }
            };

            // test first, then train on the same instances
            let predictions = classifier.predict(&batch.features)?;
            let first_position = self.global_sample_count;
            let correct =
                self.metrics
                    .record(&predictions, &batch.labels, first_position, max_instances)?;
            self.global_sample_count += batch.len() as u64;
            self.global_correct_count += correct;

            classifier.partial_fit(&batch.features, &batch.labels, None)?;

            if self.config.show_plot {
                sink.on_raw_batch(&batch.labels, &predictions)?;
            }
            progress.advance(self.global_sample_count);

            let window_closed = self.global_sample_count / n_wait > first_position / n_wait;
            if window_closed || self.global_sample_count >= max_instances {
                let snapshot = self.metrics.snapshot(self.global_sample_count)?;
                sink.on_snapshot(
                    &snapshot.values(self.config.show_kappa),
                    self.global_sample_count,
                )?;
                self.snapshots.push(snapshot);
            }
        };

        self.phase = EvaluationPhase::Finished(termination);
        sink.finalize()?;

        let elapsed_seconds = run_scope.elapsed().as_secs_f64();
        let accuracy = if self.global_sample_count > 0 {
            self.global_correct_count as f64 / self.global_sample_count as f64
        } else {
            0.0
        };
        let kappa = self.metrics.global_kappa();

        log::info!("[run {}] Stopped: {}", run_id, termination);
        log::info!("[run {}] Evaluation time: {:.3}s", run_id, elapsed_seconds);
        log::info!(
            "[run {}] Total instances: {}",
            run_id,
            self.global_sample_count
        );
        log::info!("[run {}] Global accuracy: {:.3}", run_id, accuracy);
        log::info!("[run {}] Global kappa statistic: {:.3}", run_id, kappa);

        Ok(EvaluationReport {
            run_id,
            started_at,
            stream: stream.name(),
            classifier: classifier_name,
            elapsed_seconds,
            instances_processed: self.global_sample_count,
            pretrain_instances,
            correct_predictions: self.global_correct_count,
            accuracy,
            kappa,
            snapshot_count: self.metrics.snapshot_count(),
            termination,
            snapshots: self.snapshots.clone(),
        })
    }
}

/// Instances the run expects to evaluate, for progress reporting only
pub(crate) fn expected_total(estimated_remaining: Option<u64>, max_instances: u64) -> u64 {
    match estimated_remaining {
        Some(remaining) if remaining <= max_instances => remaining,
        _ => max_instances,
    }
}

/// Logs completion in 5% steps
pub(crate) struct ProgressTracker {
    expected_total: u64,
    last_step: u64,
    run_id: String,
}

impl ProgressTracker {
    pub(crate) fn new(expected_total: u64, run_id: String) -> Self {
        Self {
            expected_total,
            last_step: 0,
            run_id,
        }
    }

    /// Returns the new percentage when a 5% step was crossed
    pub(crate) fn advance(&mut self, position: u64) -> Option<u64> {
        if self.expected_total == 0 {
            return None;
        }
        let step = position.min(self.expected_total) * 20 / self.expected_total;
        if step <= self.last_step {
            return None;
        }
        self.last_step = step;
        let percent = step * 5;
        log::info!(target: PROGRESS_TARGET, "[run {}] {}%", self.run_id, percent);
        Some(percent)
    }
}
