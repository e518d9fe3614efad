use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Languages whose month names the date rules understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "pt")]
    Portuguese,
}

/// Keys are lowercase, without a trailing dot.
static ENGLISH: phf::Map<&'static str, u32> = phf_map! {
    "january" => 1, "jan" => 1,
    "february" => 2, "feb" => 2,
    "march" => 3, "mar" => 3,
    "april" => 4, "apr" => 4,
    "may" => 5,
    "june" => 6, "jun" => 6,
    "july" => 7, "jul" => 7,
    "august" => 8, "aug" => 8,
    "september" => 9, "sep" => 9, "sept" => 9,
    "october" => 10, "oct" => 10,
    "november" => 11, "nov" => 11,
    "december" => 12, "dec" => 12,
};

static GERMAN: phf::Map<&'static str, u32> = phf_map! {
    "januar" => 1, "jänner" => 1, "jan" => 1,
    "februar" => 2, "feb" => 2,
    "märz" => 3, "mär" => 3, "maerz" => 3,
    "april" => 4, "apr" => 4,
    "mai" => 5,
    "juni" => 6, "jun" => 6,
    "juli" => 7, "jul" => 7,
    "august" => 8, "aug" => 8,
    "september" => 9, "sep" => 9, "sept" => 9,
    "oktober" => 10, "okt" => 10,
    "november" => 11, "nov" => 11,
    "dezember" => 12, "dez" => 12,
};

static FRENCH: phf::Map<&'static str, u32> = phf_map! {
    "janvier" => 1, "janv" => 1,
    "février" => 2, "fevrier" => 2, "févr" => 2, "fevr" => 2,
    "mars" => 3,
    "avril" => 4, "avr" => 4,
    "mai" => 5,
    "juin" => 6,
    "juillet" => 7, "juil" => 7,
    "août" => 8, "aout" => 8,
    "septembre" => 9, "sept" => 9,
    "octobre" => 10, "oct" => 10,
    "novembre" => 11, "nov" => 11,
    "décembre" => 12, "decembre" => 12, "déc" => 12, "dec" => 12,
};

static SPANISH: phf::Map<&'static str, u32> = phf_map! {
    "enero" => 1, "ene" => 1,
    "febrero" => 2, "feb" => 2,
    "marzo" => 3, "mar" => 3,
    "abril" => 4, "abr" => 4,
    "mayo" => 5, "may" => 5,
    "junio" => 6, "jun" => 6,
    "julio" => 7, "jul" => 7,
    "agosto" => 8, "ago" => 8,
    "septiembre" => 9, "setiembre" => 9, "sep" => 9, "sept" => 9,
    "octubre" => 10, "oct" => 10,
    "noviembre" => 11, "nov" => 11,
    "diciembre" => 12, "dic" => 12,
};

static ITALIAN: phf::Map<&'static str, u32> = phf_map! {
    "gennaio" => 1, "gen" => 1,
    "febbraio" => 2, "feb" => 2,
    "marzo" => 3, "mar" => 3,
    "aprile" => 4, "apr" => 4,
    "maggio" => 5, "mag" => 5,
    "giugno" => 6, "giu" => 6,
    "luglio" => 7, "lug" => 7,
    "agosto" => 8, "ago" => 8,
    "settembre" => 9, "set" => 9,
    "ottobre" => 10, "ott" => 10,
    "novembre" => 11, "nov" => 11,
    "dicembre" => 12, "dic" => 12,
};

static DUTCH: phf::Map<&'static str, u32> = phf_map! {
    "januari" => 1, "jan" => 1,
    "februari" => 2, "feb" => 2,
    "maart" => 3, "mrt" => 3,
    "april" => 4, "apr" => 4,
    "mei" => 5,
    "juni" => 6, "jun" => 6,
    "juli" => 7, "jul" => 7,
    "augustus" => 8, "aug" => 8,
    "september" => 9, "sep" => 9, "sept" => 9,
    "oktober" => 10, "okt" => 10,
    "november" => 11, "nov" => 11,
    "december" => 12, "dec" => 12,
};

static PORTUGUESE: phf::Map<&'static str, u32> = phf_map! {
    "janeiro" => 1, "jan" => 1,
    "fevereiro" => 2, "fev" => 2,
    "março" => 3, "marco" => 3, "mar" => 3,
    "abril" => 4, "abr" => 4,
    "maio" => 5, "mai" => 5,
    "junho" => 6, "jun" => 6,
    "julho" => 7, "jul" => 7,
    "agosto" => 8, "ago" => 8,
    "setembro" => 9, "set" => 9,
    "outubro" => 10, "out" => 10,
    "novembro" => 11, "nov" => 11,
    "dezembro" => 12, "dez" => 12,
};

impl Locale {
    pub const ALL: [Locale; 7] = [
        Locale::English,
        Locale::German,
        Locale::French,
        Locale::Spanish,
        Locale::Italian,
        Locale::Dutch,
        Locale::Portuguese,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::German => "de",
            Locale::French => "fr",
            Locale::Spanish => "es",
            Locale::Italian => "it",
            Locale::Dutch => "nl",
            Locale::Portuguese => "pt",
        }
    }

    fn months(self) -> &'static phf::Map<&'static str, u32> {
        match self {
            Locale::English => &ENGLISH,
            Locale::German => &GERMAN,
            Locale::French => &FRENCH,
            Locale::Spanish => &SPANISH,
            Locale::Italian => &ITALIAN,
            Locale::Dutch => &DUTCH,
            Locale::Portuguese => &PORTUGUESE,
        }
    }

    /// Month number for a full or abbreviated month name, case-insensitive.
    pub fn month(self, name: &str) -> Option<u32> {
        let key = name.trim_end_matches('.').to_lowercase();
        self.months().get(key.as_str()).copied()
    }

    /// All month spellings known for this locale.
    pub fn month_names(self) -> impl Iterator<Item = &'static str> {
        self.months().keys().copied()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Locale::ALL
            .into_iter()
            .find(|l| l.tag() == tag)
            .ok_or_else(|| format!("unsupported locale '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_lookup() {
        assert_eq!(Locale::English.month("October"), Some(10));
        assert_eq!(Locale::English.month("Sept."), Some(9));
        assert_eq!(Locale::German.month("MÄRZ"), Some(3));
        assert_eq!(Locale::French.month("août"), Some(8));
        assert_eq!(Locale::English.month("Oktober"), None);
    }

    #[test]
    fn test_every_locale_covers_twelve_months() {
        for locale in Locale::ALL {
            let mut seen: Vec<u32> = locale.month_names().filter_map(|m| locale.month(m)).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen, (1..=12).collect::<Vec<_>>(), "{locale}");
        }
    }

    #[test]
    fn test_tags() {
        assert_eq!("DE".parse::<Locale>(), Ok(Locale::German));
        assert!("xx".parse::<Locale>().is_err());
        assert_eq!(serde_json::to_string(&Locale::Dutch).unwrap(), r#""nl""#);
    }
}
