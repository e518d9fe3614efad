use std::sync::Arc;

use chrono::NaiveDate;
use musubi_parse::SxE;

use super::SimilarityMetric;
use crate::subject::{IdentifierCache, Subject};

/// Compares season/episode numbers.
///
/// `1` when both sides share a number, `0.5` when only the episode agrees
/// because one side has no season, `-1` when both sides have numbers and
/// none agree, `0` when either side has none.
#[derive(Debug, Clone, Default)]
pub struct SeasonEpisodeMetric {
    cache: Arc<IdentifierCache>,
}

impl SeasonEpisodeMetric {
    pub fn new(cache: Arc<IdentifierCache>) -> Self {
        Self { cache }
    }

    fn numbers<S: Subject + ?Sized>(&self, subject: &S) -> Vec<SxE> {
        subject
            .identifiers(&self.cache)
            .iter()
            .filter_map(|id| id.as_sxe())
            .collect()
    }
}

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for SeasonEpisodeMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        let left = self.numbers(a);
        let right = self.numbers(b);
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        let pairs = || left.iter().flat_map(|x| right.iter().map(move |y| (x, y)));
        if pairs().any(|(x, y)| x == y) {
            1.0
        } else if pairs().any(|(x, y)| x.matches_partially(y)) {
            0.5
        } else {
            -1.0
        }
    }

    fn name(&self) -> &str {
        "season_episode"
    }
}

/// Compares air dates: `1` on a common date, `-1` when both sides have
/// dates and none agree, `0` otherwise.
#[derive(Debug, Clone, Default)]
pub struct AirDateMetric {
    cache: Arc<IdentifierCache>,
}

impl AirDateMetric {
    pub fn new(cache: Arc<IdentifierCache>) -> Self {
        Self { cache }
    }

    fn dates<S: Subject + ?Sized>(&self, subject: &S) -> Vec<NaiveDate> {
        subject
            .identifiers(&self.cache)
            .iter()
            .filter_map(|id| id.as_date())
            .collect()
    }
}

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for AirDateMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        let left = self.dates(a);
        let right = self.dates(b);
        if left.is_empty() || right.is_empty() {
            0.0
        } else if left.iter().any(|d| right.contains(d)) {
            1.0
        } else {
            -1.0
        }
    }

    fn name(&self) -> &str {
        "air_date"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Episode;

    #[test]
    fn test_season_episode_scores() {
        let metric = SeasonEpisodeMetric::default();
        assert_eq!(metric.score("Show.S01E02", "Show 1x02"), 1.0);
        assert_eq!(metric.score("Show.S01E02", "Show 1x03"), -1.0);
        assert_eq!(metric.score("Show.S01E02", "Show"), 0.0);
        assert_eq!(metric.score("", ""), 0.0);
        assert_eq!(metric.score("Show - 02", "Show S03E02"), 0.5);
        assert_eq!(metric.score("Show - 02", "Show - 02"), 1.0);
    }

    #[test]
    fn test_episode_records() {
        let metric = SeasonEpisodeMetric::default();
        let episode = Episode::new("Greek", 1, 19, "No Campus for Old Rules").with_absolute(42);
        assert_eq!(metric.score("Greek - S01E19", &episode), 1.0);
        assert_eq!(metric.score("Greek - 42", &episode), 1.0);
        assert_eq!(metric.score("Greek - S02E01", &episode), -1.0);
    }

    #[test]
    fn test_air_date_scores() {
        let metric = AirDateMetric::default();
        assert_eq!(metric.score("News 2010-10-24", "News 24.10.2010"), 1.0);
        assert_eq!(metric.score("News 2010-10-24", "News 2010-10-25"), -1.0);
        assert_eq!(metric.score("News 2010-10-24", "News S01E01"), 0.0);
    }
}
