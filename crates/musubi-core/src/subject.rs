use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use musubi_parse::{Identifier, PatternExtractor, SxE};

use crate::metric::properties::PropertyCache;
use crate::models::{Episode, MediaFile, MediaProperties, Movie, SubtitleDescriptor};

/// Parsed identifiers, memoized per label and per path for the lifetime
/// of a matching session.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    extractor: PatternExtractor,
    labels: Mutex<HashMap<String, Vec<Identifier>>>,
    paths: Mutex<HashMap<PathBuf, Vec<Identifier>>>,
}

impl IdentifierCache {
    pub fn new(extractor: PatternExtractor) -> Self {
        Self {
            extractor,
            labels: Mutex::default(),
            paths: Mutex::default(),
        }
    }

    pub fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    pub fn extract(&self, label: &str) -> Vec<Identifier> {
        let mut labels = self.labels.lock().unwrap_or_else(PoisonError::into_inner);
        labels
            .entry(label.to_owned())
            .or_insert_with(|| self.extractor.extract(label))
            .clone()
    }

    pub fn match_path(&self, path: &Path) -> Vec<Identifier> {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        paths
            .entry(path.to_owned())
            .or_insert_with(|| self.extractor.match_path(path))
            .clone()
    }
}

/// What similarity metrics can read from a value.
pub trait Subject {
    /// Label used by name-based metrics.
    fn name(&self) -> Cow<'_, str>;

    /// Name-like fields compared pairwise by field-based metrics.
    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![self.name()]
    }

    /// Season/episode numbers and dates, parsed from `name` unless the
    /// value carries them in structured form.
    fn identifiers(&self, cache: &IdentifierCache) -> Vec<Identifier> {
        cache.extract(&self.name())
    }

    fn properties(&self, _cache: &PropertyCache) -> Option<MediaProperties> {
        None
    }
}

impl Subject for str {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Subject for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl<T: Subject + ?Sized> Subject for &T {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }

    fn fields(&self) -> Vec<Cow<'_, str>> {
        (**self).fields()
    }

    fn identifiers(&self, cache: &IdentifierCache) -> Vec<Identifier> {
        (**self).identifiers(cache)
    }

    fn properties(&self, cache: &PropertyCache) -> Option<MediaProperties> {
        (**self).properties(cache)
    }
}

impl Subject for MediaFile {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.stem())
    }

    fn fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![self.name()];
        fields.extend(self.folder().map(Cow::Borrowed));
        fields
    }

    fn identifiers(&self, cache: &IdentifierCache) -> Vec<Identifier> {
        cache.match_path(&self.path)
    }

    fn properties(&self, cache: &PropertyCache) -> Option<MediaProperties> {
        self.properties.or_else(|| cache.get(&self.path))
    }
}

impl Subject for Episode {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.series_name.as_str())];
        fields.extend(self.title.as_deref().map(Cow::Borrowed));
        fields
    }

    fn identifiers(&self, _cache: &IdentifierCache) -> Vec<Identifier> {
        let mut identifiers = Vec::new();
        if let (Some(season), Some(episode)) = (self.season, self.episode) {
            identifiers.push(Identifier::SeasonEpisode(SxE::new(season, episode)));
        } else if let Some(episode) = self.episode {
            identifiers.push(Identifier::SeasonEpisode(SxE::absolute(episode)));
        }
        if let Some(special) = self.special {
            identifiers.push(Identifier::SeasonEpisode(SxE::new(0, special)));
        }
        if let Some(absolute) = self.absolute {
            identifiers.push(Identifier::Absolute(absolute));
        }
        if let Some(airdate) = self.airdate {
            identifiers.push(Identifier::Date(airdate));
        }
        identifiers
    }
}

impl Subject for Movie {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str())]
    }

    fn identifiers(&self, _cache: &IdentifierCache) -> Vec<Identifier> {
        Vec::new()
    }
}

impl Subject for SubtitleDescriptor {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(musubi_parse::tokenizer::strip_extension(&self.name).0)
    }

    fn properties(&self, _cache: &PropertyCache) -> Option<MediaProperties> {
        Some(SubtitleDescriptor::properties(self)).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_episode_reports_structured_identifiers() {
        let cache = IdentifierCache::default();
        let episode = Episode::new("Show", 2, 5, "Title")
            .with_absolute(30)
            .with_airdate(NaiveDate::from_ymd_opt(2010, 10, 24).unwrap());
        assert_eq!(
            episode.identifiers(&cache),
            vec![
                Identifier::SeasonEpisode(SxE::new(2, 5)),
                Identifier::Absolute(30),
                Identifier::Date(NaiveDate::from_ymd_opt(2010, 10, 24).unwrap()),
            ]
        );
        let special = Episode::special("Show", 1, "Pilot");
        assert_eq!(
            special.identifiers(&cache),
            vec![Identifier::SeasonEpisode(SxE::new(0, 1))]
        );
    }

    #[test]
    fn test_media_file_parses_path() {
        let cache = IdentifierCache::default();
        let file = MediaFile::new("/tv/Show S01E07/video.mkv");
        assert_eq!(
            file.identifiers(&cache),
            vec![Identifier::SeasonEpisode(SxE::new(1, 7))]
        );
        assert_eq!(file.name(), "video");
        assert_eq!(file.fields(), vec!["video", "Show S01E07"]);
    }

    #[test]
    fn test_labels_are_memoized() {
        let cache = IdentifierCache::default();
        assert_eq!(cache.extract("Show 1x02"), vec![Identifier::from(SxE::new(1, 2))]);
        assert_eq!(cache.labels.lock().unwrap().len(), 1);
        cache.extract("Show 1x02");
        assert_eq!(cache.labels.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subtitle_properties() {
        let cache = PropertyCache::default();
        let mut subtitle = SubtitleDescriptor::new("Show.S01E01.srt");
        assert_eq!(subtitle.name(), "Show.S01E01");
        assert_eq!(Subject::properties(&subtitle, &cache), None);
        subtitle.frame_rate = Some(23.976);
        assert_eq!(
            Subject::properties(&subtitle, &cache).and_then(|p| p.frame_rate),
            Some(23.976)
        );
    }
}
