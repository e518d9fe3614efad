use std::fmt;

use super::{MetricSequence, SimilarityMetric};

/// Score of the first metric that has an opinion, i.e. returns non-zero.
pub struct Cascade<A: ?Sized, B: ?Sized = A> {
    metrics: MetricSequence<A, B>,
}

impl<A: ?Sized, B: ?Sized> Cascade<A, B> {
    pub fn new(metrics: MetricSequence<A, B>) -> Self {
        Self { metrics }
    }
}

impl<A: ?Sized, B: ?Sized> SimilarityMetric<A, B> for Cascade<A, B> {
    fn score(&self, a: &A, b: &B) -> f32 {
        self.metrics
            .iter()
            .map(|m| m.score(a, b))
            .find(|&s| s != 0.0)
            .unwrap_or(0.0)
    }

    fn name(&self) -> &str {
        "cascade"
    }
}

impl<A: ?Sized, B: ?Sized> fmt::Debug for Cascade<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cascade").field(&self.metrics).finish()
    }
}

/// Arithmetic mean of all metrics.
pub struct Average<A: ?Sized, B: ?Sized = A> {
    metrics: MetricSequence<A, B>,
}

impl<A: ?Sized, B: ?Sized> Average<A, B> {
    pub fn new(metrics: MetricSequence<A, B>) -> Self {
        Self { metrics }
    }
}

impl<A: ?Sized, B: ?Sized> SimilarityMetric<A, B> for Average<A, B> {
    fn score(&self, a: &A, b: &B) -> f32 {
        if self.metrics.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.metrics.iter().map(|m| m.score(a, b)).sum();
        sum / self.metrics.len() as f32
    }

    fn name(&self) -> &str {
        "average"
    }
}

impl<A: ?Sized, B: ?Sized> fmt::Debug for Average<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Average").field(&self.metrics).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::FnMetric;

    fn constant(value: f32) -> FnMetric<impl Fn(&str, &str) -> f32> {
        FnMetric::new("constant", move |_: &str, _: &str| value)
    }

    #[test]
    fn test_cascade_takes_first_opinion() {
        let cascade = Cascade::new(
            MetricSequence::<str>::new()
                .then(constant(0.0))
                .then(constant(-1.0))
                .then(constant(1.0)),
        );
        assert_eq!(cascade.score("a", "b"), -1.0);
        assert_eq!(Cascade::new(MetricSequence::<str>::new()).score("a", "b"), 0.0);
    }

    #[test]
    fn test_average() {
        let average = Average::new(
            MetricSequence::<str>::new()
                .then(constant(1.0))
                .then(constant(0.0)),
        );
        assert_eq!(average.score("a", "b"), 0.5);
        assert_eq!(Average::new(MetricSequence::<str>::new()).score("a", "b"), 0.0);
    }
}
