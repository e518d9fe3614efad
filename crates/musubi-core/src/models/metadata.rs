use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An episode record from a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub series_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Special number, for episodes outside the regular seasons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<u32>,
    /// Season-independent episode number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airdate: Option<NaiveDate>,
}

impl Episode {
    pub fn new(
        series_name: impl Into<String>,
        season: u32,
        episode: u32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            season: Some(season),
            episode: Some(episode),
            special: None,
            absolute: None,
            title: Some(title.into()),
            airdate: None,
        }
    }

    pub fn special(series_name: impl Into<String>, special: u32, title: impl Into<String>) -> Self {
        Self {
            series_name: series_name.into(),
            season: None,
            episode: None,
            special: Some(special),
            absolute: None,
            title: Some(title.into()),
            airdate: None,
        }
    }

    pub fn with_absolute(mut self, absolute: u32) -> Self {
        self.absolute = Some(absolute);
        self
    }

    pub fn with_airdate(mut self, airdate: NaiveDate) -> Self {
        self.airdate = Some(airdate);
        self
    }
}

impl fmt::Display for Episode {
    /// `Series - 1x19 - Title`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.series_name)?;
        match (self.season, self.episode, self.special, self.absolute) {
            (Some(s), Some(e), _, _) => write!(f, " - {s}x{e:02}")?,
            (_, _, Some(n), _) => write!(f, " - Special {n}")?,
            (None, Some(e), _, _) | (_, _, _, Some(e)) => write!(f, " - {e:02}")?,
            _ => {
                if let Some(date) = self.airdate {
                    write!(f, " - {}", date.format("%Y-%m-%d"))?;
                }
            }
        }
        if let Some(title) = &self.title {
            write!(f, " - {title}")?;
        }
        Ok(())
    }
}

/// A movie record from a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Movie {
    pub fn new(name: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            name: name.into(),
            year,
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({year})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_display() {
        let episode = Episode::new("Greek", 1, 19, "No Campus for Old Rules");
        assert_eq!(episode.to_string(), "Greek - 1x19 - No Campus for Old Rules");
        assert_eq!(Episode::special("Greek", 2, "Pilot").to_string(), "Greek - Special 2 - Pilot");
        let mut daily = Episode::special("News", 1, "Evening");
        daily.special = None;
        daily.airdate = NaiveDate::from_ymd_opt(2010, 10, 24);
        assert_eq!(daily.to_string(), "News - 2010-10-24 - Evening");
    }

    #[test]
    fn test_movie_display() {
        assert_eq!(Movie::new("Avatar", Some(2009)).to_string(), "Avatar (2009)");
        assert_eq!(Movie::new("Avatar", None).to_string(), "Avatar");
    }

    #[test]
    fn test_episode_from_json() {
        let episode: Episode = serde_json::from_str(
            r#"{"series_name":"Veronica Mars","season":1,"episode":19,"title":"Hot Dogs"}"#,
        )
        .unwrap();
        assert_eq!(episode, Episode::new("Veronica Mars", 1, 19, "Hot Dogs"));
    }
}
