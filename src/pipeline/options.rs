pub use crate::extraction::NoAnswerStrategy;

/// Per-request post-processing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Keep at most this many answers per list. `None` keeps all.
    pub top: Option<usize>,
    /// Keep one answer per property name and one no-answer.
    pub suppress_duplicates: bool,
    pub no_answer_strategy: NoAnswerStrategy,
}

impl ProcessOptions {
    pub fn with_top(mut self, top: Option<usize>) -> Self {
        self.top = top.filter(|top| *top > 0);
        self
    }

    pub fn with_suppress_duplicates(mut self, suppress: bool) -> Self {
        self.suppress_duplicates = suppress;
        self
    }

    pub fn with_no_answer_strategy(mut self, strategy: NoAnswerStrategy) -> Self {
        self.no_answer_strategy = strategy;
        self
    }
}
