//! Similarity metrics.
//!
//! A metric scores a pair of values in `[-1, 1]`: `1` is a confirmed match,
//! `0` means no evidence either way and anything below `0` is evidence
//! against the pairing (a veto).

pub mod combinator;
pub mod episode;
pub mod name;
pub mod presets;
pub mod properties;
pub mod substring;

use std::fmt;
use std::sync::Arc;

pub use combinator::{Average, Cascade};
pub use episode::{AirDateMetric, SeasonEpisodeMetric};
pub use name::NameMetric;
pub use properties::{PropertiesMetric, PropertyCache, PropertySource, Tolerance};
pub use substring::{SubstringFieldsMetric, SubstringMetric};

/// Scores how similar `a` and `b` are.
pub trait SimilarityMetric<A: ?Sized, B: ?Sized = A> {
    fn score(&self, a: &A, b: &B) -> f32;

    /// Short name for diagnostics.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<A: ?Sized, B: ?Sized, M: SimilarityMetric<A, B> + ?Sized> SimilarityMetric<A, B> for Box<M> {
    fn score(&self, a: &A, b: &B) -> f32 {
        (**self).score(a, b)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A: ?Sized, B: ?Sized, M: SimilarityMetric<A, B> + ?Sized> SimilarityMetric<A, B> for Arc<M> {
    fn score(&self, a: &A, b: &B) -> f32 {
        (**self).score(a, b)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A: ?Sized, B: ?Sized, M: SimilarityMetric<A, B> + ?Sized> SimilarityMetric<A, B> for &M {
    fn score(&self, a: &A, b: &B) -> f32 {
        (**self).score(a, b)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A closure used as a metric. Its result is clamped like every other
/// metric's.
pub struct FnMetric<F> {
    name: String,
    f: F,
}

impl<F> FnMetric<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<A: ?Sized, B: ?Sized, F: Fn(&A, &B) -> f32> SimilarityMetric<A, B> for FnMetric<F> {
    fn score(&self, a: &A, b: &B) -> f32 {
        clamp((self.f)(a, b))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Force a raw score into `[-1, 1]`. NaN carries no evidence.
pub fn clamp(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(-1.0, 1.0)
    }
}

pub type BoxedMetric<A, B> = Box<dyn SimilarityMetric<A, B> + Send + Sync>;

/// Metrics applied in order as successive tie-breakers.
pub struct MetricSequence<A: ?Sized, B: ?Sized = A> {
    metrics: Vec<BoxedMetric<A, B>>,
}

impl<A: ?Sized, B: ?Sized> MetricSequence<A, B> {
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
        }
    }

    /// Append a metric.
    pub fn then(mut self, metric: impl SimilarityMetric<A, B> + Send + Sync + 'static) -> Self {
        self.metrics.push(Box::new(metric));
        self
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn get(&self, level: usize) -> Option<&BoxedMetric<A, B>> {
        self.metrics.get(level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxedMetric<A, B>> {
        self.metrics.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics
            .iter()
            .map(|m| SimilarityMetric::<A, B>::name(&**m))
            .collect()
    }
}

impl<A: ?Sized, B: ?Sized> Default for MetricSequence<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, B: ?Sized> fmt::Debug for MetricSequence<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(f32::NAN), 0.0);
        assert_eq!(clamp(3.0), 1.0);
        assert_eq!(clamp(-7.5), -1.0);
        assert_eq!(clamp(0.25), 0.25);
    }

    #[test]
    fn test_fn_metric_is_clamped() {
        let metric = FnMetric::new("len", |a: &str, b: &str| a.len() as f32 - b.len() as f32);
        assert_eq!(metric.score("abcd", "a"), 1.0);
        assert_eq!(metric.score("a", "abcd"), -1.0);
        assert_eq!(SimilarityMetric::<str>::name(&metric), "len");
    }

    #[test]
    fn test_sequence_order() {
        let sequence: MetricSequence<str> = MetricSequence::new()
            .then(NameMetric)
            .then(SubstringMetric);
        assert_eq!(sequence.names(), vec!["name", "substring"]);
        assert_eq!(sequence.len(), 2);
    }
}
