//! Incremental naive-Bayes vote aggregation
//!
//! `vote` combines class priors with per-attribute likelihoods supplied by
//! attribute observers. Observers are incremental density models keyed by
//! class: a Gaussian estimator for numeric attributes and a frequency table
//! for nominal ones.

use crate::types::Label;
use std::collections::{BTreeMap, HashMap};

/// Per-attribute model of `P(value | class)`
pub trait AttributeObserver {
    /// Update the model with one observed value of this attribute
    fn observe(&mut self, value: f64, class: Label, weight: f64);

    /// Estimated likelihood of `value` given `class`
    fn probability_of_value_given_class(&self, value: f64, class: Label) -> f64;
}

/// Un-normalized joint score per class: prior × ∏ likelihoods
///
/// With no observed classes (or only zero weights) the sentinel `{0: 0.0}`
/// is returned. Attributes without a registered observer are skipped.
pub fn vote<O: AttributeObserver>(
    features: &[f64],
    class_frequencies: &BTreeMap<Label, f64>,
    observers: &HashMap<usize, O>,
) -> BTreeMap<Label, f64> {
    let total: f64 = class_frequencies.values().sum();
    if class_frequencies.is_empty() || total <= 0.0 {
        return BTreeMap::from([(0, 0.0)]);
    }

    class_frequencies
        .iter()
        .map(|(&class, &frequency)| {
            let mut score = frequency / total;
            for (index, &value) in features.iter().enumerate() {
                if let Some(observer) = observers.get(&index) {
                    score *= observer.probability_of_value_given_class(value, class);
                }
            }
            (class, score)
        })
        .collect()
}

/// Weighted incremental normal distribution (Welford update)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaussianEstimator {
    weight_sum: f64,
    mean: f64,
    variance_sum: f64,
}

impl GaussianEstimator {
    pub fn add(&mut self, value: f64, weight: f64) {
        if self.weight_sum > 0.0 {
            self.weight_sum += weight;
            let last_mean = self.mean;
            self.mean += weight * (value - last_mean) / self.weight_sum;
            self.variance_sum += weight * (value - last_mean) * (value - self.mean);
        } else {
            self.mean = value;
            self.weight_sum = weight;
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.weight_sum > 1.0 {
            self.variance_sum / (self.weight_sum - 1.0)
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Density at `value`; a degenerate (zero-spread) estimator is a point mass
    pub fn probability_density(&self, value: f64) -> f64 {
        if self.weight_sum <= 0.0 {
            return 0.0;
        }
        let std_dev = self.std_dev();
        if std_dev > 0.0 {
            let diff = value - self.mean;
            let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * std_dev);
            norm * (-(diff * diff) / (2.0 * std_dev * std_dev)).exp()
        } else if value == self.mean {
            1.0
        } else {
            0.0
        }
    }
}

/// Numeric attribute observer: one Gaussian per class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericObserver {
    per_class: BTreeMap<Label, GaussianEstimator>,
}

impl AttributeObserver for NumericObserver {
    fn observe(&mut self, value: f64, class: Label, weight: f64) {
        if value.is_nan() {
            return;
        }
        self.per_class.entry(class).or_default().add(value, weight);
    }

    fn probability_of_value_given_class(&self, value: f64, class: Label) -> f64 {
        self.per_class
            .get(&class)
            .map(|estimator| estimator.probability_density(value))
            .unwrap_or(0.0)
    }
}

/// Nominal attribute observer: Laplace-smoothed value counts per class
///
/// Nominal values are integer codes; fractional inputs are rounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NominalObserver {
    per_class: BTreeMap<Label, BTreeMap<i64, f64>>,
}

impl AttributeObserver for NominalObserver {
    fn observe(&mut self, value: f64, class: Label, weight: f64) {
        if value.is_nan() {
            return;
        }
        *self
            .per_class
            .entry(class)
            .or_default()
            .entry(value.round() as i64)
            .or_default() += weight;
    }

    fn probability_of_value_given_class(&self, value: f64, class: Label) -> f64 {
        match self.per_class.get(&class) {
            Some(counts) => {
                let count = counts.get(&(value.round() as i64)).copied().unwrap_or(0.0);
                let total: f64 = counts.values().sum();
                (count + 1.0) / (total + counts.len() as f64)
            }
            None => 0.0,
        }
    }
}

/// Attribute observer tagged by attribute kind
#[derive(Debug, Clone, PartialEq)]
pub enum Observer {
    Numeric(NumericObserver),
    Nominal(NominalObserver),
}

impl Observer {
    pub fn numeric() -> Self {
        Self::Numeric(NumericObserver::default())
    }

    pub fn nominal() -> Self {
        Self::Nominal(NominalObserver::default())
    }
}

impl AttributeObserver for Observer {
    fn observe(&mut self, value: f64, class: Label, weight: f64) {
        match self {
            Self::Numeric(observer) => observer.observe(value, class, weight),
            Self::Nominal(observer) => observer.observe(value, class, weight),
        }
    }

    fn probability_of_value_given_class(&self, value: f64, class: Label) -> f64 {
        match self {
            Self::Numeric(observer) => observer.probability_of_value_given_class(value, class),
            Self::Nominal(observer) => observer.probability_of_value_given_class(value, class),
        }
    }
}
