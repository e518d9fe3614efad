//! Ready-made metric sequences for the common matching jobs.

use std::sync::Arc;

use super::{
    AirDateMetric, Average, Cascade, MetricSequence, NameMetric, PropertiesMetric, PropertyCache,
    SeasonEpisodeMetric, SubstringFieldsMetric, SubstringMetric, Tolerance,
};
use crate::subject::{IdentifierCache, Subject};

/// Season/episode numbers, falling back to air dates.
pub fn episode_identifier<A, B>(cache: Arc<IdentifierCache>) -> Cascade<A, B>
where
    A: Subject + ?Sized + 'static,
    B: Subject + ?Sized + 'static,
{
    Cascade::new(
        MetricSequence::new()
            .then(SeasonEpisodeMetric::new(Arc::clone(&cache)))
            .then(AirDateMetric::new(cache)),
    )
}

/// Files against episode records: numbers first, then series/title words,
/// then overall name similarity.
pub fn episode_sequence<A, B>(cache: Arc<IdentifierCache>) -> MetricSequence<A, B>
where
    A: Subject + ?Sized + 'static,
    B: Subject + ?Sized + 'static,
{
    MetricSequence::new()
        .then(episode_identifier::<A, B>(cache))
        .then(SubstringFieldsMetric)
        .then(NameMetric)
}

pub fn movie_sequence<A, B>() -> MetricSequence<A, B>
where
    A: Subject + ?Sized + 'static,
    B: Subject + ?Sized + 'static,
{
    MetricSequence::new().then(SubstringFieldsMetric).then(NameMetric)
}

/// Files against subtitles: name evidence first, stream properties to
/// break ties between equally named candidates.
pub fn subtitle_sequence<A, B>(properties: Arc<PropertyCache>, tolerance: Tolerance) -> MetricSequence<A, B>
where
    A: Subject + ?Sized + 'static,
    B: Subject + ?Sized + 'static,
{
    MetricSequence::new()
        .then(Average::new(
            MetricSequence::new().then(SubstringMetric).then(NameMetric),
        ))
        .then(PropertiesMetric::new(properties, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::SimilarityMetric;
    use crate::models::{Episode, MediaFile, Movie};

    #[test]
    fn test_episode_sequence_names() {
        let sequence = episode_sequence::<MediaFile, Episode>(Arc::default());
        assert_eq!(sequence.names(), vec!["cascade", "substring_fields", "name"]);
    }

    #[test]
    fn test_episode_identifier_prefers_numbers() {
        let metric = episode_identifier::<str, Episode>(Arc::default());
        let episode = Episode::new("News", 1, 2, "Evening")
            .with_airdate(chrono::NaiveDate::from_ymd_opt(2010, 10, 24).unwrap());
        assert_eq!(metric.score("News 1x02", &episode), 1.0);
        assert_eq!(metric.score("News 2010-10-24", &episode), 1.0);
        assert_eq!(metric.score("News 2010-10-25", &episode), -1.0);
    }

    #[test]
    fn test_movie_sequence() {
        let sequence = movie_sequence::<MediaFile, Movie>();
        let file = MediaFile::new("/movies/Avatar (2009)/Avatar.2009.1080p.mkv");
        let first = sequence.get(0).unwrap();
        assert_eq!(first.score(&file, &Movie::new("Avatar", Some(2009))), 1.0);
        assert_eq!(first.score(&file, &Movie::new("Titanic", Some(1997))), 0.0);
    }
}
