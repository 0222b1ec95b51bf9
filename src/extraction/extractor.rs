use tracing::trace;

use super::property::{PropertyLocator, determine_best_property};
use super::ranking::{assign_probabilities, descending, sort_by_score, suppress_duplicates};
use super::types::{Answer, NoAnswerStrategy, SampleResult};

/// Turns per-token start/end scores into ranked property answers.
///
/// Stateless apart from the n-best size, so one instance can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct AnswerExtractor {
    n_best: usize,
}

impl AnswerExtractor {
    pub fn new(n_best: usize) -> Self {
        Self { n_best }
    }

    pub fn n_best(&self) -> usize {
        self.n_best
    }

    /// Extracts the answers of one fragment.
    ///
    /// `offset_map[i]` is the char range of token `i` in the paragraph, or `None`
    /// for tokens outside it. The returned list always contains the no-answer
    /// candidate scored at `cls_index`, is sorted by score and carries softmax
    /// probabilities.
    pub fn get_answers(
        &self,
        offset_map: &[Option<(usize, usize)>],
        cls_index: usize,
        paragraph: &PropertyLocator,
        start_scores: &[f32],
        end_scores: &[f32],
        suppress: bool,
    ) -> Vec<Answer> {
        let best_starts = top_indices(start_scores, self.n_best);
        let best_ends = top_indices(end_scores, self.n_best);

        let mut answers = Vec::new();
        for &start in &best_starts {
            let Some(Some((start_char, _))) = offset_map.get(start).copied() else {
                continue;
            };
            for &end in &best_ends {
                let Some(Some((_, end_char))) = offset_map.get(end).copied() else {
                    continue;
                };
                if end < start {
                    continue;
                }

                let properties = paragraph.identify_properties(start_char, end_char);
                let Some(property) = determine_best_property(&properties) else {
                    continue;
                };

                answers.push(Answer {
                    score: start_scores[start] + end_scores[end],
                    span: Some(paragraph.slice(start_char, end_char)),
                    start_char,
                    end_char,
                    property: Some(property.clone()),
                    probability: 0.0,
                });
            }
        }

        trace!(
            candidates = answers.len(),
            n_best = self.n_best,
            "Span candidates after filtering"
        );

        let null_score = score_at(start_scores, cls_index) + score_at(end_scores, cls_index);
        answers.push(Answer::no_answer(null_score, cls_index));

        sort_by_score(&mut answers);
        if suppress {
            answers = suppress_duplicates(answers);
        }
        assign_probabilities(&mut answers);
        answers
    }

    /// Merges the fragment answers of one query into a single ranking.
    ///
    /// No-answer candidates never enter the aggregate. With
    /// [`NoAnswerStrategy::Threshold`] a property answer must also outscore the
    /// weakest no-answer candidate among the fragments.
    pub fn aggregate(&self, samples: &[SampleResult], strategy: NoAnswerStrategy) -> Vec<Answer> {
        let mut answers: Vec<Answer> = samples
            .iter()
            .flat_map(|sample| sample.answers.iter())
            .filter(|answer| !answer.is_no_answer())
            .cloned()
            .collect();

        if strategy == NoAnswerStrategy::Threshold {
            let null_threshold = samples
                .iter()
                .flat_map(|sample| sample.answers.iter())
                .filter(|answer| answer.is_no_answer())
                .map(|answer| answer.score)
                .reduce(f32::min);

            if let Some(threshold) = null_threshold {
                answers.retain(|answer| answer.score > threshold);
            }
        }

        sort_by_score(&mut answers);
        assign_probabilities(&mut answers);
        answers
    }
}

/// Indices of the `n` highest scores, highest first; ties keep index order.
pub(crate) fn top_indices(scores: &[f32], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|a, b| descending(scores[*a], scores[*b]));
    indices.truncate(n);
    indices
}

#[inline]
fn score_at(scores: &[f32], index: usize) -> f32 {
    scores.get(index).copied().unwrap_or(0.0)
}
