//! Online classifiers that can be evaluated prequentially

use crate::error::{EvalError, Result};
use crate::naive_bayes::{vote, AttributeObserver, Observer};
use crate::types::Label;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Incrementally trained classifier
pub trait Classifier {
    fn name(&self) -> String;

    /// One label per input row; must not change the model
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Label>>;

    /// Update the model with labeled rows
    ///
    /// `classes` announces the full label set up front, typically on the
    /// first call.
    fn partial_fit(
        &mut self,
        features: &[Vec<f64>],
        labels: &[Label],
        classes: Option<&[Label]>,
    ) -> Result<()>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Label>> {
        (**self).predict(features)
    }

    fn partial_fit(
        &mut self,
        features: &[Vec<f64>],
        labels: &[Label],
        classes: Option<&[Label]>,
    ) -> Result<()> {
        (**self).partial_fit(features, labels, classes)
    }
}

fn check_lengths(features: &[Vec<f64>], labels: &[Label]) -> Result<()> {
    if features.len() != labels.len() {
        return Err(EvalError::Classifier(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }
    Ok(())
}

/// Label with the highest score; ties go to the smallest label
fn arg_max<V: PartialOrd + Copy>(scores: &BTreeMap<Label, V>) -> Option<Label> {
    let mut best: Option<(Label, V)> = None;
    for (&label, &score) in scores {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((label, score)),
        }
    }
    best.map(|(label, _)| label)
}

/// Incremental naive Bayes
///
/// Attributes listed as nominal get a frequency observer, every other
/// attribute a per-class Gaussian.
#[derive(Debug, Clone, Default)]
pub struct NaiveBayes {
    class_frequencies: BTreeMap<Label, f64>,
    observers: HashMap<usize, Observer>,
    nominal_attributes: BTreeSet<usize>,
    known_classes: BTreeSet<Label>,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nominal_attributes<I: IntoIterator<Item = usize>>(attributes: I) -> Self {
        Self {
            nominal_attributes: attributes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Un-normalized class scores for one row
    pub fn votes(&self, row: &[f64]) -> BTreeMap<Label, f64> {
        vote(row, &self.class_frequencies, &self.observers)
    }

    pub fn class_frequencies(&self) -> &BTreeMap<Label, f64> {
        &self.class_frequencies
    }

    fn fallback_label(&self) -> Label {
        self.known_classes.iter().next().copied().unwrap_or(0)
    }
}

impl Classifier for NaiveBayes {
    fn name(&self) -> String {
        "naive_bayes".to_string()
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Label>> {
        if self.class_frequencies.is_empty() {
            return Ok(vec![self.fallback_label(); features.len()]);
        }
        Ok(features
            .iter()
            .map(|row| arg_max(&self.votes(row)).unwrap_or_else(|| self.fallback_label()))
            .collect())
    }

    fn partial_fit(
        &mut self,
        features: &[Vec<f64>],
        labels: &[Label],
        classes: Option<&[Label]>,
    ) -> Result<()> {
        check_lengths(features, labels)?;
        if let Some(classes) = classes {
            self.known_classes.extend(classes.iter().copied());
        }

        for (row, &label) in features.iter().zip(labels) {
            self.known_classes.insert(label);
            *self.class_frequencies.entry(label).or_default() += 1.0;
            for (index, &value) in row.iter().enumerate() {
                let nominal = self.nominal_attributes.contains(&index);
                self.observers
                    .entry(index)
                    .or_insert_with(|| {
                        if nominal {
                            Observer::nominal()
                        } else {
                            Observer::numeric()
                        }
                    })
                    .observe(value, label, 1.0);
            }
        }
        Ok(())
    }
}

/// Predicts the most frequent label seen so far
#[derive(Debug, Clone, Default)]
pub struct MajorityClass {
    counts: BTreeMap<Label, u64>,
    known_classes: BTreeSet<Label>,
}

impl MajorityClass {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for MajorityClass {
    fn name(&self) -> String {
        "majority_class".to_string()
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<Label>> {
        let label = arg_max(&self.counts)
            .or_else(|| self.known_classes.iter().next().copied())
            .unwrap_or(0);
        Ok(vec![label; features.len()])
    }

    fn partial_fit(
        &mut self,
        features: &[Vec<f64>],
        labels: &[Label],
        classes: Option<&[Label]>,
    ) -> Result<()> {
        check_lengths(features, labels)?;
        if let Some(classes) = classes {
            self.known_classes.extend(classes.iter().copied());
        }
        for &label in labels {
            *self.counts.entry(label).or_default() += 1;
        }
        Ok(())
    }
}

/// Classifiers selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    NaiveBayes,
    Majority,
}

/// Descriptive entry for listing classifiers
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supports_nominal: bool,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 2] = [ClassifierKind::NaiveBayes, ClassifierKind::Majority];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "naive-bayes" | "naive_bayes" | "nb" => Some(Self::NaiveBayes),
            "majority" | "majority-class" | "majority_class" => Some(Self::Majority),
            _ => None,
        }
    }

    pub fn info(&self) -> ClassifierInfo {
        match self {
            Self::NaiveBayes => ClassifierInfo {
                name: "naive-bayes",
                description: "Incremental naive Bayes (Gaussian numeric, Laplace-smoothed nominal attributes)",
                supports_nominal: true,
            },
            Self::Majority => ClassifierInfo {
                name: "majority",
                description: "Predicts the most frequent class seen so far",
                supports_nominal: false,
            },
        }
    }

    pub fn build(&self, nominal_attributes: &[usize]) -> Box<dyn Classifier> {
        match self {
            Self::NaiveBayes => Box::new(NaiveBayes::with_nominal_attributes(
                nominal_attributes.iter().copied(),
            )),
            Self::Majority => Box::new(MajorityClass::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrained_naive_bayes_uses_known_classes() {
        let mut nb = NaiveBayes::new();
        assert_eq!(nb.predict(&[vec![1.0]]).unwrap(), vec![0]);
        nb.partial_fit(&[], &[], Some(&[3, 5])).unwrap();
        assert_eq!(nb.predict(&[vec![1.0], vec![2.0]]).unwrap(), vec![3, 3]);
    }

    #[test]
    fn test_naive_bayes_separates_numeric_clusters() {
        let mut nb = NaiveBayes::new();
        let features = vec![
            vec![0.9, 10.0],
            vec![1.1, 11.0],
            vec![1.0, 9.0],
            vec![5.0, -10.0],
            vec![5.2, -11.0],
            vec![4.8, -9.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        nb.partial_fit(&features, &labels, Some(&[0, 1])).unwrap();

        let predictions = nb.predict(&[vec![1.0, 10.0], vec![5.0, -10.0]]).unwrap();
        assert_eq!(predictions, vec![0, 1]);
    }

    #[test]
    fn test_naive_bayes_nominal_attribute() {
        let mut nb = NaiveBayes::with_nominal_attributes([0]);
        let features = vec![vec![0.0], vec![0.0], vec![1.0], vec![1.0], vec![1.0]];
        let labels = vec![7, 7, 9, 9, 9];
        nb.partial_fit(&features, &labels, None).unwrap();
        assert_eq!(nb.predict(&[vec![0.0], vec![1.0]]).unwrap(), vec![7, 9]);

        let votes = nb.votes(&[0.0]);
        // prior 2/5 * (2 + 1) / (2 + 1)
        assert!((votes[&7] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_predict_does_not_mutate() {
        let mut nb = NaiveBayes::new();
        nb.partial_fit(&[vec![1.0]], &[1], None).unwrap();
        let before = nb.class_frequencies().clone();
        nb.predict(&[vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(&before, nb.class_frequencies());
    }

    #[test]
    fn test_partial_fit_length_mismatch() {
        let mut nb = NaiveBayes::new();
        let result = nb.partial_fit(&[vec![1.0]], &[0, 1], None);
        assert!(matches!(result, Err(EvalError::Classifier(_))));
    }

    #[test]
    fn test_majority_class() {
        let mut majority = MajorityClass::new();
        assert_eq!(majority.predict(&[vec![]]).unwrap(), vec![0]);
        majority.partial_fit(&[vec![], vec![], vec![]], &[2, 1, 2], None).unwrap();
        assert_eq!(majority.predict(&[vec![], vec![]]).unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_arg_max_prefers_smallest_on_ties() {
        let scores = BTreeMap::from([(3, 0.5), (1, 0.5), (2, 0.1)]);
        assert_eq!(arg_max(&scores), Some(1));
        assert_eq!(arg_max::<f64>(&BTreeMap::new()), None);
    }

    #[test]
    fn test_kind_registry() {
        assert_eq!(ClassifierKind::from_name("nb"), Some(ClassifierKind::NaiveBayes));
        assert_eq!(ClassifierKind::from_name("majority"), Some(ClassifierKind::Majority));
        assert_eq!(ClassifierKind::from_name("forest"), None);
        for kind in ClassifierKind::ALL {
            let classifier = kind.build(&[]);
            assert!(!classifier.name().is_empty());
        }
    }
}
