use std::borrow::Cow;
use std::path::Path;

use chrono::NaiveDate;

use crate::cancel::{CancellationToken, Cancelled};
use crate::date::{DateHit, DateMatcher};
use crate::identifier::{Identifier, SxE};
use crate::locale::Locale;
use crate::season_episode::{Limits, SeasonEpisodeMatcher};
use crate::tokenizer;

/// Options for [`PatternExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorOptions {
    /// Only explicit season/episode markers.
    pub strict: bool,
    pub limits: Limits,
    /// Languages for written month names.
    pub locales: Vec<Locale>,
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            strict: false,
            limits: Limits::default(),
            locales: vec![Locale::English],
            min_year: 1920,
            max_year: 2050,
        }
    }
}

/// Season/episode and date recognition over a single label.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    season_episode: SeasonEpisodeMatcher,
    dates: DateMatcher,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(ExtractorOptions::default())
    }
}

impl PatternExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self {
            season_episode: SeasonEpisodeMatcher::new(options.strict, options.limits),
            dates: DateMatcher::new(options.locales, options.min_year, options.max_year),
        }
    }

    pub fn season_episode_matcher(&self) -> &SeasonEpisodeMatcher {
        &self.season_episode
    }

    pub fn date_matcher(&self) -> &DateMatcher {
        &self.dates
    }

    /// Identifiers in `label`, season/episode candidates first, then dates.
    /// Empty when nothing is recognized.
    pub fn extract(&self, label: &str) -> Vec<Identifier> {
        self.extract_cancellable(label, &CancellationToken::new())
            .unwrap_or_default()
    }

    pub fn extract_cancellable(
        &self,
        label: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Identifier>, Cancelled> {
        let hits = self.dates.scan(label);
        let blanked = blank(label, &hits);
        let mut identifiers: Vec<Identifier> = self
            .season_episode
            .match_label_cancellable(&blanked, token)?
            .into_iter()
            .map(Identifier::from)
            .collect();
        for date in hits.into_iter().filter_map(|hit| hit.date) {
            let date = Identifier::Date(date);
            if !identifiers.contains(&date) {
                identifiers.push(date);
            }
        }
        tracing::trace!(label, ?identifiers, "extracted");
        Ok(identifiers)
    }

    /// Season/episode candidates, ignoring anything inside a date.
    pub fn season_episodes(&self, label: &str) -> Vec<SxE> {
        let hits = self.dates.scan(label);
        self.season_episode.match_label(&blank(label, &hits))
    }

    pub fn dates(&self, label: &str) -> Vec<NaiveDate> {
        self.dates.match_label(label)
    }

    /// Byte offset of the earliest recognized season/episode or date pattern.
    pub fn find(&self, label: &str) -> Option<usize> {
        let hits = self.dates.scan(label);
        let episode = self.season_episode.find(&blank(label, &hits));
        let date = hits
            .iter()
            .find(|hit| hit.date.is_some())
            .map(|hit| hit.span.start);
        match (episode, date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Identifiers from the file name (extension removed), falling back to
    /// each parent directory name, nearest first.
    pub fn match_path(&self, path: &Path) -> Vec<Identifier> {
        let mut names = path
            .iter()
            .rev()
            .filter_map(|component| component.to_str());
        let Some(file_name) = names.next() else {
            return Vec::new();
        };
        let (stem, _) = tokenizer::strip_extension(file_name);
        std::iter::once(stem)
            .chain(names)
            .map(|name| self.extract(name))
            .find(|identifiers| !identifiers.is_empty())
            .unwrap_or_default()
    }
}

/// Replace every date-shaped span with spaces of the same byte length.
fn blank<'a>(label: &'a str, hits: &[DateHit]) -> Cow<'a, str> {
    if hits.is_empty() {
        return Cow::Borrowed(label);
    }
    let mut out = String::with_capacity(label.len());
    let mut pos = 0;
    for hit in hits {
        out.push_str(&label[pos..hit.span.start]);
        out.push_str(&" ".repeat(hit.span.len()));
        pos = hit.span.end;
    }
    out.push_str(&label[pos..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dates_do_not_leak_episode_numbers() {
        let extractor = PatternExtractor::default();
        assert_eq!(
            extractor.extract("2010-10-24"),
            vec![Identifier::Date(ymd(2010, 10, 24))]
        );
        assert!(extractor.extract("1911-01-01").is_empty());
        assert!(extractor.extract("2099-01-01").is_empty());
    }

    #[test]
    fn test_episodes_before_dates() {
        let extractor = PatternExtractor::default();
        let found = extractor.extract("Show.S02E05.2010-10-24");
        assert_eq!(
            found,
            vec![
                Identifier::SeasonEpisode(SxE::new(2, 5)),
                Identifier::Date(ymd(2010, 10, 24)),
            ]
        );
    }

    #[test]
    fn test_precedence_and_ambiguity() {
        let extractor = PatternExtractor::default();
        let found = extractor.extract("Test.101.1x02.S01E03");
        assert_eq!(found.first(), Some(&Identifier::SeasonEpisode(SxE::new(1, 3))));
        assert_eq!(
            extractor.extract("Test.101"),
            vec![Identifier::from(SxE::new(1, 1)), Identifier::from(SxE::absolute(101))]
        );
        assert_eq!(extractor.extract("02"), vec![Identifier::from(SxE::absolute(2))]);
    }

    #[test]
    fn test_find_prefers_earliest() {
        let extractor = PatternExtractor::default();
        assert_eq!(extractor.find("Show 2010-10-24 S01E02"), Some(5));
        assert_eq!(extractor.find("Show S01E02 2010-10-24"), Some(5));
        assert_eq!(extractor.find("Show"), None);
    }

    #[test]
    fn test_match_path_falls_back_to_folders() {
        let extractor = PatternExtractor::default();
        let path = Path::new("/media/Show/Season 1/Show 1x05.mkv");
        assert_eq!(extractor.match_path(path), vec![Identifier::from(SxE::new(1, 5))]);
        let path = Path::new("/media/Show S01E07/video.mkv");
        assert_eq!(extractor.match_path(path), vec![Identifier::from(SxE::new(1, 7))]);
        let path = Path::new("/media/Show.1.02.mkv");
        assert_eq!(extractor.match_path(path), vec![Identifier::from(SxE::new(1, 2))]);
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result = PatternExtractor::default().extract_cancellable("S01E01", &token);
        assert_eq!(result, Err(Cancelled));
    }
}
