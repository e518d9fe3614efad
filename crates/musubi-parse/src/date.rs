use std::collections::BTreeSet;
use std::convert::Infallible;
use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::locale::Locale;
use crate::scan::{self, Flow, Lead};

/// Date layouts, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `2010-10-24`, `2009/6/1`
    YearMonthDay,
    /// `24.10.2010`, `1.1.2010`
    DayMonthYear,
    /// `2010 Oct 24`
    YearNameDay,
    /// `24 October 2010`
    DayNameYear,
    /// `20101024`
    Compact,
    /// `October 24, 2010`
    NameDayYear,
}

const ORDINAL: &str = "(?i:st|nd|rd|th)?";
const SEP: &str = r"[^\p{L}\p{N}]";
const GAP: &str = r"[^\p{L}\p{N}]{1,3}";

/// Every month spelling of every locale, longest first so that `june`
/// is tried before `jun`.
static MONTH_NAMES: LazyLock<String> = LazyLock::new(|| {
    let names: BTreeSet<&str> = Locale::ALL
        .into_iter()
        .flat_map(Locale::month_names)
        .collect();
    let mut names: Vec<&str> = names.into_iter().collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
    let escaped: Vec<String> = names.into_iter().map(regex::escape).collect();
    format!("(?i:{})", escaped.join("|"))
});

static PATTERNS: LazyLock<Vec<(Shape, Regex)>> = LazyLock::new(|| {
    let months = MONTH_NAMES.as_str();
    let date = |shape: Shape, body: String| {
        let regex = Regex::new(&format!(r"(?P<b>{body})(?:[^\p{{L}}\p{{N}}]|$)"))
            .expect("valid date pattern");
        (shape, regex)
    };
    vec![
        date(
            Shape::YearMonthDay,
            format!("(?P<y>[0-9]{{4}}){SEP}(?P<m>[0-9]{{1,2}}){SEP}(?P<d>[0-9]{{1,2}})"),
        ),
        date(
            Shape::DayMonthYear,
            format!("(?P<d>[0-9]{{1,2}}){SEP}(?P<m>[0-9]{{1,2}}){SEP}(?P<y>[0-9]{{4}})"),
        ),
        date(
            Shape::YearNameDay,
            format!("(?P<y>[0-9]{{4}}){GAP}(?P<mn>{months}){GAP}(?P<d>[0-9]{{1,2}}){ORDINAL}"),
        ),
        date(
            Shape::DayNameYear,
            format!("(?P<d>[0-9]{{1,2}}){ORDINAL}{GAP}(?P<mn>{months}){GAP}(?P<y>[0-9]{{4}})"),
        ),
        date(
            Shape::Compact,
            "(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})".to_string(),
        ),
        date(
            Shape::NameDayYear,
            format!("(?P<mn>{months}){GAP}(?P<d>[0-9]{{1,2}}){ORDINAL}{GAP}(?P<y>[0-9]{{4}})"),
        ),
    ]
});

/// A date-shaped span of a label. `date` is `None` when the text looked
/// like a date but is not a legal one inside the accepted year window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateHit {
    pub span: Range<usize>,
    pub date: Option<NaiveDate>,
}

/// Recognizes calendar dates in numeric and written-month forms.
#[derive(Debug, Clone)]
pub struct DateMatcher {
    locales: Vec<Locale>,
    min_year: i32,
    max_year: i32,
}

impl Default for DateMatcher {
    fn default() -> Self {
        Self::new(vec![Locale::English], 1920, 2050)
    }
}

impl DateMatcher {
    pub fn new(locales: Vec<Locale>, min_year: i32, max_year: i32) -> Self {
        Self {
            locales,
            min_year,
            max_year,
        }
    }

    /// Legal dates found in `label`, in order of appearance.
    pub fn match_label(&self, label: &str) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        for date in self.scan(label).into_iter().filter_map(|hit| hit.date) {
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
        dates
    }

    /// Byte offset of the first legal date in `label`.
    pub fn find(&self, label: &str) -> Option<usize> {
        self.scan(label)
            .into_iter()
            .find(|hit| hit.date.is_some())
            .map(|hit| hit.span.start)
    }

    /// All date-shaped spans, including rejected ones, without overlaps.
    pub fn scan(&self, label: &str) -> Vec<DateHit> {
        let mut hits: Vec<DateHit> = Vec::new();
        for (shape, regex) in PATTERNS.iter() {
            let Ok(()) = scan::for_each::<Infallible>(regex, label, Lead::NoAlnum, |caps| {
                let Some(body) = caps.name("b") else {
                    return Ok(None);
                };
                let span = body.range();
                if hits
                    .iter()
                    .any(|h| h.span.start < span.end && span.start < h.span.end)
                {
                    return Ok(Some(Flow::Continue));
                }
                let Some(date) = self.interpret(*shape, caps) else {
                    return Ok(None);
                };
                hits.push(DateHit { span, date });
                Ok(Some(Flow::Continue))
            });
        }
        hits.sort_by_key(|hit| hit.span.start);
        hits
    }

    /// `None` when a month word belongs to no configured locale, which
    /// means the span is not a date at all. `Some(None)` for a rejected
    /// date.
    fn interpret(&self, shape: Shape, caps: &Captures<'_>) -> Option<Option<NaiveDate>> {
        let field = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
        let year = caps.name("y")?.as_str().parse::<i32>().ok()?;
        let day = field("d")?;
        let month = match caps.name("mn") {
            Some(word) => self
                .locales
                .iter()
                .find_map(|locale| locale.month(word.as_str()))?,
            None => field("m")?,
        };
        let text = caps.name("b").map_or("", |m| m.as_str());

        let mut date = NaiveDate::from_ymd_opt(year, month, day);
        if date.is_none() && shape == Shape::DayMonthYear {
            // month-first, as in 10/24/2010
            date = NaiveDate::from_ymd_opt(year, day, month);
        }
        let Some(date) = date else {
            tracing::trace!(text, "skipping illegal date");
            return Some(None);
        };
        if !(self.min_year..=self.max_year).contains(&year) {
            tracing::trace!(text, year, "date outside accepted years");
            return Some(None);
        }
        Some(Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(label: &str) -> Vec<NaiveDate> {
        DateMatcher::default().match_label(label)
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(dates("Show 2010-10-24"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("Show.2009/6/1"), vec![ymd(2009, 6, 1)]);
        assert_eq!(dates("Show 1.1.2010"), vec![ymd(2010, 1, 1)]);
        assert_eq!(dates("Show 24.10.2010"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("Show 10/24/2010"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("show.20101024.hdtv"), vec![ymd(2010, 10, 24)]);
    }

    #[test]
    fn test_written_months() {
        assert_eq!(dates("Show 24 October 2010"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("Show October 24, 2010"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("Show 2010 Oct. 24"), vec![ymd(2010, 10, 24)]);
        assert_eq!(dates("Show 1st June 2009"), vec![ymd(2009, 6, 1)]);
    }

    #[test]
    fn test_locales() {
        assert!(dates("Show 24. März 2010").is_empty());
        let german = DateMatcher::new(vec![Locale::English, Locale::German], 1920, 2050);
        assert_eq!(german.match_label("Show 24. März 2010"), vec![ymd(2010, 3, 24)]);
    }

    #[test]
    fn test_year_window() {
        assert!(dates("1911-01-01").is_empty());
        assert!(dates("2099-01-01").is_empty());
        let hits = DateMatcher::default().scan("2099-01-01");
        assert_eq!(hits, vec![DateHit { span: 0..10, date: None }]);
    }

    #[test]
    fn test_illegal_dates_are_skipped() {
        assert!(dates("Show 2010-02-30").is_empty());
        assert!(dates("Show 2010-13-45").is_empty());
    }

    #[test]
    fn test_scan_keeps_spans_apart() {
        let hits = DateMatcher::default().scan("News 24.10.2010 and 2010-10-25");
        let spans: Vec<_> = hits.iter().map(|h| h.span.clone()).collect();
        assert_eq!(spans, vec![5..15, 20..30]);
        assert_eq!(hits[0].date, Some(ymd(2010, 10, 24)));
        assert_eq!(hits[1].date, Some(ymd(2010, 10, 25)));
    }

    #[test]
    fn test_find() {
        let matcher = DateMatcher::default();
        assert_eq!(matcher.find("Daily Show 2010-10-24"), Some(11));
        assert_eq!(matcher.find("Daily Show"), None);
    }
}
