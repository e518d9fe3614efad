//! Assignment of values (e.g. local files) to candidates (e.g. catalog
//! episodes) using a sequence of metrics as successive tie-breakers.

use std::collections::HashMap;
use std::fmt;

use musubi_parse::CancellationToken;

use crate::error::MusubiError;
use crate::metric::{clamp, MetricSequence, SimilarityMetric};

/// Pair evaluations between two cancellation checks.
const CHECK_INTERVAL: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatcherOptions {
    /// A pair is only committed when its score exceeds this value.
    pub confident_threshold: f32,
    /// Allow several values to share one candidate.
    pub many_to_one: bool,
}

/// One value with its assigned candidate, if any.
#[derive(Debug)]
pub struct Match<'a, V, C> {
    pub value: &'a V,
    pub candidate: Option<&'a C>,
    pub value_index: usize,
    pub candidate_index: Option<usize>,
    /// Best score the pair reached. `0` when unmatched.
    pub score: f32,
    /// Metric level that decided the pair.
    pub level: Option<usize>,
}

impl<V, C> Match<'_, V, C> {
    pub fn is_matched(&self) -> bool {
        self.candidate.is_some()
    }
}

impl<V, C> Clone for Match<'_, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, C> Copy for Match<'_, V, C> {}

pub struct Matcher<V, C = V> {
    metrics: MetricSequence<V, C>,
    options: MatcherOptions,
}

impl<V, C> Matcher<V, C> {
    pub fn new(metrics: MetricSequence<V, C>, options: MatcherOptions) -> Result<Self, MusubiError> {
        if metrics.is_empty() {
            return Err(MusubiError::InvalidMatcher("metric sequence is empty".into()));
        }
        let threshold = options.confident_threshold;
        if !threshold.is_finite() || !(0.0..1.0).contains(&threshold) {
            return Err(MusubiError::InvalidMatcher(format!(
                "confident threshold must be in [0, 1), got {threshold}"
            )));
        }
        Ok(Self { metrics, options })
    }

    pub fn metrics(&self) -> &MetricSequence<V, C> {
        &self.metrics
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Match without a way to cancel.
    pub fn match_all<'a>(&self, values: &'a [V], candidates: &'a [C]) -> Vec<Match<'a, V, C>> {
        self.run(values, candidates, &CancellationToken::new())
            .unwrap_or_default()
    }

    /// Assign each value at most one candidate.
    ///
    /// Returns matches by descending score, then value order, followed by
    /// the unmatched values in input order. Fails only when `token` is
    /// cancelled, in which case nothing is returned.
    #[tracing::instrument(
        name = "match",
        skip_all,
        fields(values = values.len(), candidates = candidates.len())
    )]
    pub fn run<'a>(
        &self,
        values: &'a [V],
        candidates: &'a [C],
        token: &CancellationToken,
    ) -> Result<Vec<Match<'a, V, C>>, MusubiError> {
        let pairs: Vec<Pair> = (0..values.len())
            .flat_map(|v| (0..candidates.len()).map(move |c| Pair::new(v, c)))
            .collect();

        let mut session = Session {
            metrics: &self.metrics,
            threshold: self.options.confident_threshold,
            many_to_one: self.options.many_to_one,
            values,
            candidates,
            token,
            evaluations: 0,
            value_taken: vec![false; values.len()],
            candidate_taken: vec![false; candidates.len()],
            committed: Vec::with_capacity(values.len()),
        };
        session.refine(pairs, 0)?;
        let Session {
            committed,
            value_taken,
            evaluations,
            ..
        } = session;

        let mut matches: Vec<Match<'a, V, C>> = committed
            .into_iter()
            .map(|pair| Match {
                value: &values[pair.value],
                candidate: Some(&candidates[pair.candidate]),
                value_index: pair.value,
                candidate_index: Some(pair.candidate),
                score: pair.best,
                level: Some(pair.level),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.value_index.cmp(&b.value_index))
        });

        let matched = matches.len();
        matches.extend(
            values
                .iter()
                .enumerate()
                .filter(|&(i, _)| !value_taken[i])
                .map(|(i, value)| Match {
                    value,
                    candidate: None,
                    value_index: i,
                    candidate_index: None,
                    score: 0.0,
                    level: None,
                }),
        );

        tracing::debug!(
            matched,
            unmatched = matches.len() - matched,
            evaluations,
            "Matching finished"
        );
        Ok(matches)
    }
}

impl<V, C> fmt::Debug for Matcher<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("metrics", &self.metrics)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Pair {
    value: usize,
    candidate: usize,
    /// Score under the metric currently ranking the pair.
    score: f32,
    best: f32,
    level: usize,
}

impl Pair {
    fn new(value: usize, candidate: usize) -> Self {
        Self {
            value,
            candidate,
            score: 0.0,
            best: f32::NEG_INFINITY,
            level: 0,
        }
    }
}

struct Session<'s, 'a, V, C> {
    metrics: &'s MetricSequence<V, C>,
    threshold: f32,
    many_to_one: bool,
    values: &'a [V],
    candidates: &'a [C],
    token: &'s CancellationToken,
    evaluations: usize,
    value_taken: Vec<bool>,
    candidate_taken: Vec<bool>,
    /// Pairs in commit order.
    committed: Vec<Pair>,
}

impl<V, C> Session<'_, '_, V, C> {
    /// Whether both ends of `pair` can still be assigned.
    fn is_open(&self, pair: &Pair) -> bool {
        !self.value_taken[pair.value] && (self.many_to_one || !self.candidate_taken[pair.candidate])
    }

    fn commit(&mut self, pair: Pair) {
        self.value_taken[pair.value] = true;
        self.candidate_taken[pair.candidate] = true;
        self.committed.push(pair);
    }

    /// Rank the open `pairs` with the metric at `level`, committing pairs
    /// that are unambiguous within their score tier and handing the rest
    /// of each tier to the next metric. Past the last metric, remaining
    /// pairs are committed in order while both ends are free.
    fn refine(&mut self, mut pairs: Vec<Pair>, level: usize) -> Result<(), MusubiError> {
        self.token.check()?;
        pairs.retain(|p| self.is_open(p));
        let metrics = self.metrics;
        let Some(metric) = metrics.get(level) else {
            for pair in pairs {
                if pair.best > self.threshold && self.is_open(&pair) {
                    self.commit(pair);
                }
            }
            return Ok(());
        };

        for pair in &mut pairs {
            self.evaluations += 1;
            if self.evaluations % CHECK_INTERVAL == 0 {
                self.token.check()?;
            }
            let score = clamp(metric.score(&self.values[pair.value], &self.candidates[pair.candidate]));
            // Fold -0.0 into the neutral tier.
            pair.score = if score == 0.0 { 0.0 } else { score };
            pair.best = pair.best.max(pair.score);
            pair.level = level;
        }

        let before = pairs.len();
        pairs.retain(|p| p.score >= 0.0);
        if pairs.len() < before {
            tracing::trace!(
                level,
                metric = SimilarityMetric::<V, C>::name(&**metric),
                vetoed = before - pairs.len(),
                "Dropped vetoed pairs"
            );
        }

        pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
        for tier in pairs.chunk_by(|a, b| a.score == b.score) {
            // Higher tiers may have taken some ends already.
            let tier: Vec<Pair> = tier.iter().copied().filter(|p| self.is_open(p)).collect();
            let Some(first) = tier.first() else {
                continue;
            };
            if first.score <= self.threshold {
                self.refine(tier, level + 1)?;
                continue;
            }
            let mut value_count: HashMap<usize, usize> = HashMap::new();
            let mut candidate_count: HashMap<usize, usize> = HashMap::new();
            for pair in &tier {
                *value_count.entry(pair.value).or_default() += 1;
                *candidate_count.entry(pair.candidate).or_default() += 1;
            }
            let (unique, ambiguous): (Vec<Pair>, Vec<Pair>) = tier.into_iter().partition(|p| {
                value_count[&p.value] == 1 && (self.many_to_one || candidate_count[&p.candidate] == 1)
            });
            for pair in unique {
                self.commit(pair);
            }
            if !ambiguous.is_empty() {
                self.refine(ambiguous, level + 1)?;
            }
        }
        Ok(())
    }
}
