use super::options::ProcessOptions;
use crate::extraction::{Answer, QueryResult, assign_probabilities, suppress_duplicates};

/// Applies duplicate suppression, then the `top` limit, then fresh probabilities.
///
/// The aggregate list and every per-fragment list are handled independently.
pub fn finalize(result: &mut QueryResult, options: &ProcessOptions) {
    finalize_answers(&mut result.answers, options);
    for sample in &mut result.tokenized_samples {
        finalize_answers(&mut sample.answers, options);
    }
}

fn finalize_answers(answers: &mut Vec<Answer>, options: &ProcessOptions) {
    if options.suppress_duplicates {
        *answers = suppress_duplicates(std::mem::take(answers));
    }
    if let Some(top) = options.top.filter(|top| *top > 0) {
        answers.truncate(top);
    }
    assign_probabilities(answers);
}
