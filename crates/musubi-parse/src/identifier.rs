use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A season/episode pair. `season` is `None` for absolute numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SxE {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    pub episode: u32,
}

impl SxE {
    pub const fn new(season: u32, episode: u32) -> Self {
        Self {
            season: Some(season),
            episode,
        }
    }

    /// Season-less episode number.
    pub const fn absolute(episode: u32) -> Self {
        Self {
            season: None,
            episode,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.season.is_none()
    }

    /// Same episode number where the seasons agree or at least one is undefined.
    pub fn matches_partially(&self, other: &SxE) -> bool {
        let seasons_agree = match (self.season, other.season) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        seasons_agree && self.episode == other.episode
    }
}

impl fmt::Display for SxE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.season {
            Some(season) => write!(f, "{season}x{:02}", self.episode),
            None => write!(f, "{:02}", self.episode),
        }
    }
}

/// A structured identifier recognized in a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identifier {
    SeasonEpisode(SxE),
    Date(NaiveDate),
    /// Catalog-side absolute episode number.
    Absolute(u32),
}

impl Identifier {
    /// Season/episode view of this identifier. `Absolute(n)` compares as a
    /// season-less `SxE`.
    pub fn as_sxe(&self) -> Option<SxE> {
        match *self {
            Identifier::SeasonEpisode(sxe) => Some(sxe),
            Identifier::Absolute(n) => Some(SxE::absolute(n)),
            Identifier::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match *self {
            Identifier::Date(date) => Some(date),
            _ => None,
        }
    }
}

impl From<SxE> for Identifier {
    fn from(sxe: SxE) -> Self {
        Identifier::SeasonEpisode(sxe)
    }
}

impl From<NaiveDate> for Identifier {
    fn from(date: NaiveDate) -> Self {
        Identifier::Date(date)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::SeasonEpisode(sxe) => sxe.fmt(f),
            Identifier::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Identifier::Absolute(n) => write!(f, "#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tolerates_missing_season() {
        assert!(SxE::absolute(5).matches_partially(&SxE::new(3, 5)));
        assert!(SxE::new(3, 5).matches_partially(&SxE::absolute(5)));
        assert!(!SxE::new(2, 5).matches_partially(&SxE::new(3, 5)));
        assert!(!SxE::absolute(5).matches_partially(&SxE::absolute(6)));
    }

    #[test]
    fn absolute_identifier_reads_as_seasonless() {
        assert_eq!(Identifier::Absolute(101).as_sxe(), Some(SxE::absolute(101)));
        let date = NaiveDate::from_ymd_opt(2010, 10, 24).unwrap();
        assert_eq!(Identifier::Date(date).as_sxe(), None);
        assert_eq!(Identifier::Date(date).as_date(), Some(date));
    }

    #[test]
    fn display_formats() {
        assert_eq!(SxE::new(1, 3).to_string(), "1x03");
        assert_eq!(SxE::absolute(101).to_string(), "101");
        let date = NaiveDate::from_ymd_opt(2009, 6, 1).unwrap();
        assert_eq!(Identifier::Date(date).to_string(), "2009-06-01");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Identifier::SeasonEpisode(SxE::absolute(2))).unwrap();
        assert_eq!(json, r#"{"kind":"season_episode","value":{"episode":2}}"#);
        let date = NaiveDate::from_ymd_opt(2010, 10, 24).unwrap();
        let json = serde_json::to_string(&Identifier::Date(date)).unwrap();
        assert_eq!(json, r#"{"kind":"date","value":"2010-10-24"}"#);
    }
}
