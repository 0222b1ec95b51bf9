use serde::{Deserialize, Serialize};

/// A property path (fully or partially) covered by a candidate span.
///
/// For partial coverage, `name` is reconstructed by scanning outward to the
/// nearest separators while `partial_name`, `length`, `start_char` and
/// `end_char` describe only the covered part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Full property path, e.g. `location.city`.
    pub name: String,
    /// Characters of the path that lie inside the span.
    pub partial_name: String,
    /// Number of covered characters.
    pub length: usize,
    /// `true` if the span covered only part of the path.
    pub partial: bool,
    /// First covered char index in the schema text.
    pub start_char: usize,
    /// One past the last covered char index.
    pub end_char: usize,
}

impl Property {
    pub(crate) fn starting_at(c: char, index: usize) -> Self {
        Self {
            name: c.to_string(),
            partial_name: c.to_string(),
            length: 1,
            partial: false,
            start_char: index,
            end_char: index,
        }
    }

    pub(crate) fn push(&mut self, c: char) {
        self.name.push(c);
        self.partial_name.push(c);
        self.length += 1;
    }
}

/// A scored answer candidate. `property == None` marks the no-answer candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub score: f32,
    pub span: Option<String>,
    pub start_char: usize,
    pub end_char: usize,
    pub property: Option<Property>,
    pub probability: f32,
}

impl Answer {
    /// Creates the synthetic "no matching property" candidate.
    ///
    /// Its char indices point at the CLS token position.
    pub fn no_answer(score: f32, cls_index: usize) -> Self {
        Self {
            score,
            span: None,
            start_char: cls_index,
            end_char: cls_index,
            property: None,
            probability: 0.0,
        }
    }

    #[inline]
    pub fn is_no_answer(&self) -> bool {
        self.property.is_none()
    }

    #[inline]
    pub fn property_name(&self) -> Option<&str> {
        self.property.as_ref().map(|p| p.name.as_str())
    }
}

/// Answers for one tokenized fragment of a query/schema pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResult {
    /// All input tokens (verbose only).
    pub tokens: Option<Vec<String>>,
    /// Decoded paragraph fragment (verbose only).
    pub fragment: Option<String>,
    /// Paragraph tokens of the fragment (verbose only).
    pub fragment_tokens: Option<Vec<String>>,
    pub answers: Vec<Answer>,
}

/// Result attached to one query: the aggregate ranking plus per-fragment detail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub answers: Vec<Answer>,
    pub tokenized_samples: Vec<SampleResult>,
    pub is_cached: bool,
}

/// How no-answer candidates influence the aggregate answer list.
///
/// Part of every cache key: the same schema/query pair cached under one
/// strategy never satisfies a request using the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoAnswerStrategy {
    /// Keep every property answer regardless of the no-answer score.
    #[default]
    Ignore,
    /// Keep only property answers scoring above the weakest per-fragment
    /// no-answer score.
    Threshold,
}

impl NoAnswerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoAnswerStrategy::Ignore => "ignore",
            NoAnswerStrategy::Threshold => "threshold",
        }
    }
}

impl std::fmt::Display for NoAnswerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoAnswerStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(NoAnswerStrategy::Ignore),
            // "treshold" is the spelling older clients send.
            "threshold" | "treshold" => Ok(NoAnswerStrategy::Threshold),
            other => Err(format!(
                "unknown no-answer strategy '{other}', allowed values are 'ignore' and 'threshold'"
            )),
        }
    }
}
