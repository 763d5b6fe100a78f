pub mod types;
pub mod error;
pub mod ring_buffer;
pub mod kappa;
pub mod naive_bayes;
pub mod metrics;
pub mod config;
pub mod stream;
pub mod classifier;
pub mod sink;
pub mod evaluator;
pub mod profiling;

pub use types::*;
pub use error::{EvalError, Result};
pub use ring_buffer::RingBuffer;
pub use kappa::cohen_kappa;
pub use naive_bayes::{vote, AttributeObserver, GaussianEstimator, Observer};
pub use metrics::RunningMetrics;
pub use config::{ConfigUpdate, EvaluatorConfig};
pub use stream::{DataStream, SeaGenerator, Stream};
pub use classifier::{Classifier, ClassifierInfo, ClassifierKind, MajorityClass, NaiveBayes};
pub use sink::{FanoutSink, JsonLinesSink, LogSink, NullSink, RecordingSink, ReportingSink};
pub use evaluator::PrequentialEvaluator;
