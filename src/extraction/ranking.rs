//! Ordering, de-duplication and probability normalization of answer lists.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::types::Answer;

/// Descending total order on scores; NaN ranks below every number.
#[inline]
pub(crate) fn descending(a: f32, b: f32) -> Ordering {
    let rank = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s };
    rank(b).total_cmp(&rank(a))
}

/// Sorts answers by score, highest first. Stable, so equal scores keep their order.
pub fn sort_by_score(answers: &mut [Answer]) {
    answers.sort_by(|a, b| descending(a.score, b.score));
}

/// Keeps the first answer per property name plus the first no-answer candidate.
///
/// On a score-sorted list this is the highest-scoring answer per property.
pub fn suppress_duplicates(answers: Vec<Answer>) -> Vec<Answer> {
    let keep: Vec<bool> = {
        let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(answers.len());
        answers
            .iter()
            .map(|answer| seen.insert(answer.property_name()))
            .collect()
    };
    answers
        .into_iter()
        .zip(keep)
        .filter_map(|(answer, keep)| keep.then_some(answer))
        .collect()
}

/// Numerically stable softmax. Empty input yields an empty vector.
///
/// NaN scores get probability 0.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let Some(max) = scores.iter().copied().filter(|s| !s.is_nan()).reduce(f32::max) else {
        return vec![0.0; scores.len()];
    };

    let exps: Vec<f64> = scores
        .iter()
        .map(|s| {
            if s.is_nan() {
                0.0
            } else {
                (f64::from(*s) - f64::from(max)).exp()
            }
        })
        .collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| (e / sum) as f32).collect()
}

/// Overwrites each answer's `probability` with the softmax over the list's scores.
pub fn assign_probabilities(answers: &mut [Answer]) {
    let scores: Vec<f32> = answers.iter().map(|a| a.score).collect();
    for (answer, probability) in answers.iter_mut().zip(softmax(&scores)) {
        answer.probability = probability;
    }
}
