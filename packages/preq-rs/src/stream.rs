//! Instance sources consumed by the evaluator
//!
//! A `Stream` hands out batches of labeled instances in order. Two sources
//! ship with the crate: `DataStream`, which replays rows held in memory (for
//! example parsed from a CSV file), and `SeaGenerator`, an unbounded
//! synthetic source.

use crate::error::{EvalError, Result};
use crate::types::{InstanceBatch, Label};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::path::Path;

pub trait Stream {
    /// Human readable name used in reports
    fn name(&self) -> String;

    /// Every class label the stream can emit, ascending
    fn classes(&self) -> Vec<Label>;

    fn n_classes(&self) -> usize {
        self.classes().len()
    }

    /// Instances left, or `None` when the stream cannot tell
    fn estimated_remaining(&self) -> Option<u64>;

    fn has_more(&self) -> bool;

    /// Pull up to `n` instances; `Ok(None)` when nothing could be read
    fn next_batch(&mut self, n: usize) -> Result<Option<InstanceBatch>>;
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn classes(&self) -> Vec<Label> {
        (**self).classes()
    }

    fn n_classes(&self) -> usize {
        (**self).n_classes()
    }

    fn estimated_remaining(&self) -> Option<u64> {
        (**self).estimated_remaining()
    }

    fn has_more(&self) -> bool {
        (**self).has_more()
    }

    fn next_batch(&mut self, n: usize) -> Result<Option<InstanceBatch>> {
        (**self).next_batch(n)
    }
}

/// Finite stream over rows held in memory
#[derive(Debug, Clone)]
pub struct DataStream {
    name: String,
    features: Vec<Vec<f64>>,
    labels: Vec<Label>,
    classes: Vec<Label>,
    feature_names: Option<Vec<String>>,
    position: usize,
}

impl DataStream {
    pub fn new(name: impl Into<String>, features: Vec<Vec<f64>>, labels: Vec<Label>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(EvalError::InvalidParameter(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let classes: BTreeSet<Label> = labels.iter().copied().collect();
        Ok(Self {
            name: name.into(),
            features,
            labels,
            classes: classes.into_iter().collect(),
            feature_names: None,
            position: 0,
        })
    }

    /// Read a comma-separated file whose last column is the class label
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv")
            .to_string();
        Self::from_csv_str(name, &content)
    }

    /// Parse CSV content
    ///
    /// Blank lines and lines starting with `#` are skipped. A first line that
    /// does not parse as numbers is taken as the header.
    pub fn from_csv_str(name: impl Into<String>, content: &str) -> Result<Self> {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut header: Option<Vec<String>> = None;
        let mut column_count: Option<usize> = None;

        for (line_number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 2 {
                return Err(EvalError::ParseError(format!(
                    "Line {}: expected at least one feature column and a label column",
                    line_number + 1
                )));
            }

            let values: Option<Vec<f64>> = fields[..fields.len() - 1]
                .iter()
                .map(|f| f.parse::<f64>().ok())
                .collect();

            let values = match values {
                Some(values) => values,
                None if column_count.is_none() && header.is_none() => {
                    header = Some(fields.iter().map(|f| f.to_string()).collect());
                    column_count = Some(fields.len());
                    continue;
                }
                None => {
                    return Err(EvalError::ParseError(format!(
                        "Line {}: non-numeric feature value",
                        line_number + 1
                    )));
                }
            };

            match column_count {
                Some(expected) if expected != fields.len() => {
                    return Err(EvalError::ParseError(format!(
                        "Line {} has {} columns, expected {}",
                        line_number + 1,
                        fields.len(),
                        expected
                    )));
                }
                None => column_count = Some(fields.len()),
                _ => {}
            }

            let raw_label = fields[fields.len() - 1];
            let label = parse_label(raw_label).ok_or_else(|| {
                EvalError::ParseError(format!(
                    "Line {}: invalid class label '{}'",
                    line_number + 1,
                    raw_label
                ))
            })?;

            features.push(values);
            labels.push(label);
        }

        let mut stream = Self::new(name, features, labels)?;
        stream.feature_names = header.map(|mut names| {
            names.pop();
            names
        });
        Ok(stream)
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map(Vec::len).unwrap_or(0)
    }

    pub fn n_instances(&self) -> usize {
        self.labels.len()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn restart(&mut self) {
        self.position = 0;
    }
}

fn parse_label(raw: &str) -> Option<Label> {
    if let Ok(label) = raw.parse::<Label>() {
        return Some(label);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as Label)
    } else {
        None
    }
}

impl Stream for DataStream {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn classes(&self) -> Vec<Label> {
        self.classes.clone()
    }

    fn estimated_remaining(&self) -> Option<u64> {
        Some((self.labels.len() - self.position) as u64)
    }

    fn has_more(&self) -> bool {
        self.position < self.labels.len()
    }

    fn next_batch(&mut self, n: usize) -> Result<Option<InstanceBatch>> {
        if n == 0 || !self.has_more() {
            return Ok(None);
        }
        let end = (self.position + n).min(self.labels.len());
        let batch = InstanceBatch::new(
            self.features[self.position..end].to_vec(),
            self.labels[self.position..end].to_vec(),
        );
        self.position = end;
        Ok(Some(batch))
    }
}

/// Thresholds of the four SEA concepts
const SEA_THRESHOLDS: [f64; 4] = [8.0, 9.0, 7.0, 9.5];

/// SEA concepts generator
///
/// Three features uniform in [0, 10); only the first two are relevant. The
/// label is 0 when `f1 + f2 <= threshold`, 1 otherwise, and flipped with
/// probability `noise`.
#[derive(Debug, Clone)]
pub struct SeaGenerator {
    function: usize,
    noise: f64,
    seed: u64,
    rng: StdRng,
}

impl SeaGenerator {
    pub fn new(function: usize, noise: f64, seed: u64) -> Result<Self> {
        if function >= SEA_THRESHOLDS.len() {
            return Err(EvalError::InvalidParameter(format!(
                "SEA function must be in 0..{}, got {}",
                SEA_THRESHOLDS.len(),
                function
            )));
        }
        if !(0.0..=1.0).contains(&noise) {
            return Err(EvalError::InvalidParameter(format!(
                "Noise must be within [0, 1], got {}",
                noise
            )));
        }
        Ok(Self {
            function,
            noise,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn next_instance(&mut self) -> (Vec<f64>, Label) {
        let features: Vec<f64> = (0..3).map(|_| self.rng.gen_range(0.0..10.0)).collect();
        let mut label = if features[0] + features[1] <= SEA_THRESHOLDS[self.function] {
            0
        } else {
            1
        };
        if self.noise > 0.0 && self.rng.gen::<f64>() < self.noise {
            label = 1 - label;
        }
        (features, label)
    }
}

impl Stream for SeaGenerator {
    fn name(&self) -> String {
        format!("sea_f{}", self.function)
    }

    fn classes(&self) -> Vec<Label> {
        vec![0, 1]
    }

    fn estimated_remaining(&self) -> Option<u64> {
        None
    }

    fn has_more(&self) -> bool {
        true
    }

    fn next_batch(&mut self, n: usize) -> Result<Option<InstanceBatch>> {
        if n == 0 {
            return Ok(None);
        }
        let mut batch = InstanceBatch::default();
        for _ in 0..n {
            let (features, label) = self.next_instance();
            batch.features.push(features);
            batch.labels.push(label);
        }
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
# synthetic
x1,x2,class
0.5,1.0,0
1.5,2.0,1

2.5,3.0,1
3.5,4.0,0.0
";

    #[test]
    fn test_csv_with_header_and_comments() {
        let stream = DataStream::from_csv_str("demo", CSV).unwrap();
        assert_eq!(stream.n_instances(), 4);
        assert_eq!(stream.n_features(), 2);
        assert_eq!(stream.classes(), vec![0, 1]);
        assert_eq!(
            stream.feature_names().unwrap(),
            &["x1".to_string(), "x2".to_string()]
        );
    }

    #[test]
    fn test_csv_inconsistent_columns() {
        let result = DataStream::from_csv_str("bad", "1,2,0\n1,0\n");
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }

    #[test]
    fn test_csv_invalid_label() {
        let result = DataStream::from_csv_str("bad", "1,2,0.5\n");
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }

    #[test]
    fn test_csv_late_non_numeric_row() {
        let result = DataStream::from_csv_str("bad", "1,2,0\na,b,1\n");
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }

    #[test]
    fn test_batches_until_exhausted() {
        let mut stream = DataStream::from_csv_str("demo", CSV).unwrap();
        assert_eq!(stream.estimated_remaining(), Some(4));

        let batch = stream.next_batch(3).unwrap().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.labels, vec![0, 1, 1]);
        assert!(stream.has_more());

        let tail = stream.next_batch(3).unwrap().unwrap();
        assert_eq!(tail.len(), 1);
        assert!(!stream.has_more());
        assert!(stream.next_batch(3).unwrap().is_none());

        stream.restart();
        assert_eq!(stream.estimated_remaining(), Some(4));
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        assert!(DataStream::new("x", vec![vec![1.0]], vec![]).is_err());
    }

    #[test]
    fn test_sea_generator_is_deterministic() {
        let mut a = SeaGenerator::new(0, 0.0, 7).unwrap();
        let mut b = SeaGenerator::new(0, 0.0, 7).unwrap();
        let first = a.next_batch(50).unwrap().unwrap();
        assert_eq!(first, b.next_batch(50).unwrap().unwrap());
        for (x, &y) in first.features.iter().zip(&first.labels) {
            assert_eq!(x.len(), 3);
            let expected = if x[0] + x[1] <= 8.0 { 0 } else { 1 };
            assert_eq!(y, expected);
        }
        assert!(a.has_more());
        assert_eq!(a.estimated_remaining(), None);
    }

    #[test]
    fn test_sea_generator_validation() {
        assert!(SeaGenerator::new(4, 0.0, 1).is_err());
        assert!(SeaGenerator::new(0, 1.5, 1).is_err());
    }
}
