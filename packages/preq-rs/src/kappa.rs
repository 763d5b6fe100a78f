//! Cohen's kappa agreement statistic

use crate::types::Label;
use std::collections::BTreeMap;

/// Chance-corrected agreement between `predictions` and `labels`
///
/// Returns `None` when the statistic is undefined: empty or mismatched
/// inputs, or expected agreement equal to 1 (a single class on both sides),
/// which would be 0/0.
pub fn cohen_kappa(predictions: &[Label], labels: &[Label]) -> Option<f64> {
    if predictions.is_empty() || predictions.len() != labels.len() {
        return None;
    }

    let n = predictions.len() as f64;
    let mut predicted: BTreeMap<Label, u64> = BTreeMap::new();
    let mut actual: BTreeMap<Label, u64> = BTreeMap::new();
    let mut agreements = 0u64;

    for (&p, &y) in predictions.iter().zip(labels) {
        *predicted.entry(p).or_default() += 1;
        *actual.entry(y).or_default() += 1;
        if p == y {
            agreements += 1;
        }
    }

    let observed = agreements as f64 / n;
    let expected: f64 = predicted
        .iter()
        .map(|(class, &count)| {
            let truth = actual.get(class).copied().unwrap_or(0);
            (count as f64 / n) * (truth as f64 / n)
        })
        .sum();

    let denominator = 1.0 - expected;
    if denominator.abs() <= f64::EPSILON {
        return None;
    }
    Some((observed - expected) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_perfect_agreement_multiclass() {
        let y = vec![0, 1, 2, 1, 0];
        assert!((cohen_kappa(&y, &y).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_single_class_is_undefined() {
        let y = vec![1, 1, 1, 1];
        assert_eq!(cohen_kappa(&y, &y), None);
    }

    #[test]
    fn test_empty_and_mismatched_are_undefined() {
        assert_eq!(cohen_kappa(&[], &[]), None);
        assert_eq!(cohen_kappa(&[0, 1], &[0]), None);
    }

    #[test]
    fn test_known_value() {
        // p_o = 0.5, p_e = 0.5 * 0.5 + 0.5 * 0.5 = 0.5 -> kappa 0
        let predictions = vec![0, 0, 1, 1];
        let labels = vec![0, 1, 0, 1];
        assert!(cohen_kappa(&predictions, &labels).unwrap().abs() < TOL);

        // p_o = 0.75, p_e = 0.5 * 0.25 + 0.5 * 0.75 = 0.5 -> kappa 0.5
        let predictions = vec![0, 0, 1, 1];
        let labels = vec![0, 1, 1, 1];
        assert!((cohen_kappa(&predictions, &labels).unwrap() - 0.5).abs() < TOL);
    }

    #[test]
    fn test_total_disagreement_is_negative() {
        let predictions = vec![1, 0, 1, 0];
        let labels = vec![0, 1, 0, 1];
        assert!((cohen_kappa(&predictions, &labels).unwrap() + 1.0).abs() < TOL);
    }
}
