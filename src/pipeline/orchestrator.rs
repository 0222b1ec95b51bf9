use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use super::error::PipelineError;
use super::options::{NoAnswerStrategy, ProcessOptions};
use super::postprocess::finalize;
use super::types::{PredictionRequest, PredictionResponse, QueryOutcome, SchemaResult};
use super::validate::validate;
use crate::cache::ResultCache;
use crate::extraction::{AnswerExtractor, PropertyLocator, QueryResult, SampleResult};
use crate::model::{QaSample, SampleTokenizer, SpanScorer};

/// Where a query's result comes from after partitioning.
enum Slot {
    /// Copy loaded from the cache.
    Cached(QueryResult),
    /// Index into the inference batch.
    Pending(usize),
}

/// Validates requests, answers cache hits, runs inference for the rest and
/// merges everything back into the request structure.
pub struct Pipeline<T, M> {
    tokenizer: T,
    scorer: M,
    extractor: AnswerExtractor,
    cache: Option<Arc<ResultCache>>,
}

impl<T, M> std::fmt::Debug for Pipeline<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("n_best", &self.extractor.n_best())
            .field("cache_enabled", &self.cache.is_some())
            .finish()
    }
}

impl<T: SampleTokenizer, M: SpanScorer> Pipeline<T, M> {
    /// Creates a pipeline without a cache.
    pub fn new(tokenizer: T, scorer: M, n_best: usize) -> Self {
        Self {
            tokenizer,
            scorer,
            extractor: AnswerExtractor::new(n_best),
            cache: None,
        }
    }

    /// Attaches a shared result cache.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn scorer(&self) -> &M {
        &self.scorer
    }

    pub fn n_best(&self) -> usize {
        self.extractor.n_best()
    }

    /// Answers every query of `request`.
    ///
    /// Invalid requests fail before the cache or the model is touched. Fresh
    /// results are written to the cache only after all queries are merged.
    #[instrument(skip(self, request), fields(top = ?options.top, suppress = options.suppress_duplicates, strategy = %options.no_answer_strategy))]
    pub fn process(
        &self,
        request: PredictionRequest,
        options: &ProcessOptions,
    ) -> Result<PredictionResponse, PipelineError> {
        let schemas = validate(request)?;
        let strategy = options.no_answer_strategy;

        let mut samples: Vec<QaSample> = Vec::new();
        let mut slots: Vec<Vec<Slot>> = Vec::with_capacity(schemas.len());
        for schema in &schemas {
            let mut schema_slots = Vec::with_capacity(schema.queries.len());
            for query in &schema.queries {
                let hit = self.cache.as_ref().and_then(|cache| {
                    cache.lookup(&schema.value, &query.value, strategy, query.verbose)
                });
                let slot = match hit {
                    Some(result) => Slot::Cached(result),
                    None => {
                        samples.push(QaSample::new(
                            query.value.clone(),
                            schema.value.clone(),
                            query.verbose,
                        ));
                        Slot::Pending(samples.len() - 1)
                    }
                };
                schema_slots.push(slot);
            }
            slots.push(schema_slots);
        }

        let total: usize = slots.iter().map(Vec::len).sum();
        info!(
            queries = total,
            cached = total - samples.len(),
            to_infer = samples.len(),
            "Partitioned request"
        );

        let fresh = if samples.is_empty() {
            debug!("All results cached, skipping inference");
            Vec::new()
        } else {
            self.infer(&samples, strategy)?
        };

        let mut to_cache: Vec<(String, String, QueryResult, bool)> = Vec::new();
        let mut response = PredictionResponse {
            schemas: Vec::with_capacity(schemas.len()),
        };

        for (schema, schema_slots) in schemas.into_iter().zip(slots) {
            let mut queries = Vec::with_capacity(schema.queries.len());
            for (query, slot) in schema.queries.into_iter().zip(schema_slots) {
                let result = match slot {
                    Slot::Cached(mut result) => {
                        result.is_cached = true;
                        result
                    }
                    Slot::Pending(index) => {
                        let Some(result) = fresh.get(index) else {
                            error!(
                                schema_id = %schema.id,
                                query_id = %query.id,
                                "Query has no result after merge"
                            );
                            return Err(PipelineError::Internal {
                                reason: format!(
                                    "no result for query '{}' of schema '{}'",
                                    query.id, schema.id
                                ),
                            });
                        };
                        if self.cache.is_some() {
                            to_cache.push((
                                schema.value.clone(),
                                query.value.clone(),
                                result.clone(),
                                query.verbose,
                            ));
                        }
                        result.clone()
                    }
                };

                queries.push(QueryOutcome {
                    query_id: query.id,
                    name: query.name,
                    value: query.value,
                    verbose_output: query.verbose,
                    result,
                });
            }

            response.schemas.push(SchemaResult {
                schema_id: schema.id,
                name: schema.name,
                value: schema.value,
                queries,
            });
        }

        if let Some(cache) = &self.cache {
            for (schema, query, result, verbose) in &to_cache {
                cache.store(schema, query, strategy, result, *verbose);
            }
            debug!(stored = to_cache.len(), "Cache write-back complete");
        }

        for schema in &mut response.schemas {
            for query in &mut schema.queries {
                finalize(&mut query.result, options);
            }
        }

        Ok(response)
    }

    /// Tokenizes, scores and extracts one result per sample, in sample order.
    fn infer(
        &self,
        samples: &[QaSample],
        strategy: NoAnswerStrategy,
    ) -> Result<Vec<QueryResult>, PipelineError> {
        let fragments = self.tokenizer.tokenize(samples)?;
        let logits = self.scorer.predict(&fragments)?;
        if logits.len() != fragments.len() {
            error!(
                fragments = fragments.len(),
                logits = logits.len(),
                "Scorer output does not match its input"
            );
            return Err(PipelineError::Internal {
                reason: format!(
                    "scorer returned {} results for {} fragments",
                    logits.len(),
                    fragments.len()
                ),
            });
        }

        let paragraphs: Vec<PropertyLocator> = samples
            .iter()
            .map(|sample| PropertyLocator::new(&sample.paragraph))
            .collect();
        let mut per_sample: Vec<Vec<SampleResult>> = vec![Vec::new(); samples.len()];

        for (fragment, logits) in fragments.iter().zip(&logits) {
            let index = fragment.sample_index;
            let (Some(sample), Some(paragraph)) = (samples.get(index), paragraphs.get(index))
            else {
                error!(sample_index = index, "Fragment refers to an unknown sample");
                return Err(PipelineError::Internal {
                    reason: format!("fragment refers to unknown sample {index}"),
                });
            };

            // Unsuppressed: cached results must not depend on request options.
            let answers = self.extractor.get_answers(
                &fragment.offset_map,
                fragment.cls_index,
                paragraph,
                &logits.start,
                &logits.end,
                false,
            );

            per_sample[index].push(SampleResult {
                tokens: sample.verbose.then(|| fragment.tokens.clone()),
                fragment: fragment.fragment.clone(),
                fragment_tokens: fragment.fragment_tokens.clone(),
                answers,
            });
        }

        debug!(
            samples = samples.len(),
            fragments = fragments.len(),
            "Extracted answers"
        );

        Ok(per_sample
            .into_iter()
            .map(|tokenized_samples| QueryResult {
                answers: self.extractor.aggregate(&tokenized_samples, strategy),
                tokenized_samples,
                is_cached: false,
            })
            .collect())
    }
}
