//! Season/episode recognition.
//!
//! Rules are grouped into classes ordered by how explicit their marker is.
//! The first class with a match decides the result. Lower classes are only
//! consulted to reorder an ambiguous result.

use std::sync::LazyLock;

use bitflags::bitflags;
use regex::{Captures, Regex};

use crate::cancel::{CancellationToken, Cancelled};
use crate::identifier::SxE;
use crate::scan::{self, Flow, Lead};

/// Rule classes in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleClass {
    /// `Season 1 Episode 2`
    SeasonEpisodeWords,
    /// `S01E02`, `s01e01-02-03-04`, `[s01]_[e01]`
    SeasonEpisode,
    /// `1x02`, `1x01x02`, `1x01-03`
    Multiplied,
    /// `1.02`
    Dotted,
    /// `ep1`, `Episode_290-295`, `Part 2`
    EpisodeKeyword,
    /// `1 of 6`
    OfTotal,
    /// `101`, `10102`
    NumericTriple,
    /// `02`
    NumericPair,
    /// `Show101`
    NumericSubstring,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct RuleFlags: u8 {
        /// Kept in strict mode.
        const STRICT = 1;
        /// Only the first accepted match counts.
        const FIRST_ONLY = 1 << 1;
        /// Episode limit applies.
        const EPISODE_LIMIT = 1 << 2;
        /// Season and episode limits apply.
        const SANITY = 1 << 3 | Self::EPISODE_LIMIT.bits();
        /// Bare number: four-digit years are never episodes.
        const NUMERIC = 1 << 4;
    }
}

/// Upper bounds for plausible season/episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_season: u32,
    pub max_episode: u32,
    /// Ranges spanning more episodes than this keep only their endpoints.
    pub max_range_span: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_season: 50,
            max_episode: 1999,
            max_range_span: 50,
        }
    }
}

/// What a single rule match yields before limits are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    One(SxE),
    Range {
        season: Option<u32>,
        from: u32,
        to: u32,
    },
}

struct Rule {
    class: RuleClass,
    regex: Regex,
    lead: Lead,
    flags: RuleFlags,
    parse: fn(&Captures<'_>) -> Vec<Hit>,
}

const NOT_DIGIT: &str = "(?:[^0-9]|$)";
const NOT_ALNUM: &str = r"(?:[^\p{L}\p{N}]|$)";
const SEP: &str = r"[^\p{L}\p{N}]{0,3}";

fn rule_regex(body: &str, tail: &str) -> Regex {
    Regex::new(&format!("(?P<b>{body}){tail}")).expect("valid season/episode pattern")
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule {
            class: RuleClass::SeasonEpisodeWords,
            regex: rule_regex(
                &format!(
                    "(?i:season|series|saison|staffel){SEP}(?P<s>[0-9]{{1,4}}){SEP}\
                     (?i:episode|ep|folge|épisode){SEP}(?P<e>[0-9]{{1,4}})"
                ),
                NOT_DIGIT,
            ),
            lead: Lead::NoAlnum,
            flags: RuleFlags::STRICT,
            parse: parse_pair,
        },
        Rule {
            class: RuleClass::SeasonEpisode,
            regex: rule_regex(
                &format!(
                    "[sS](?P<s>[0-9]{{1,2}}|[0-9]{{4}}){SEP}\
                     (?P<eps>(?i:ep|e)[0-9]{{1,4}}(?:[vV][0-9])?\
                     (?:(?:[-. _]{{0,2}}(?i:ep|e)|-)[0-9]{{1,4}}(?:[vV][0-9])?)*)"
                ),
                NOT_DIGIT,
            ),
            lead: Lead::NoDigit,
            flags: RuleFlags::STRICT | RuleFlags::EPISODE_LIMIT,
            parse: parse_season_episode,
        },
        Rule {
            class: RuleClass::Multiplied,
            regex: rule_regex(
                "(?P<s>[0-9]{1,2})(?P<eps>[xX][0-9]{2,3}(?:[vV][0-9])?\
                 (?:(?:[xX]|-(?:[0-9]{1,2}[xX])?)[0-9]{2,3}(?:[vV][0-9])?)*)",
                NOT_DIGIT,
            ),
            lead: Lead::NoAlnumOrYearDot,
            flags: RuleFlags::STRICT | RuleFlags::SANITY,
            parse: parse_multiplied,
        },
        Rule {
            class: RuleClass::Dotted,
            regex: rule_regex(
                r"(?P<s>[0-9]{1,2})\.(?P<e>[0-9]{2})",
                r"(?:$|[^\p{L}\p{N}.]|\.(?:[^0-9]|$))",
            ),
            lead: Lead::NoAlnumOrYearDot,
            flags: RuleFlags::STRICT | RuleFlags::SANITY,
            parse: parse_pair,
        },
        Rule {
            class: RuleClass::EpisodeKeyword,
            regex: rule_regex(
                "(?i:episode|ep|e|part|pt|folge)[. _-]{0,3}(?P<e>[0-9]{1,4})(?:-(?P<to>[0-9]{1,4}))?",
                NOT_DIGIT,
            ),
            lead: Lead::NoAlnum,
            flags: RuleFlags::SANITY,
            parse: parse_keyword,
        },
        Rule {
            class: RuleClass::OfTotal,
            regex: rule_regex(
                &format!("(?P<e>[0-9]{{1,2}}){SEP}(?i:of){SEP}[0-9]{{1,2}}"),
                NOT_DIGIT,
            ),
            lead: Lead::NoAlnum,
            flags: RuleFlags::SANITY,
            parse: parse_absolute,
        },
        Rule {
            class: RuleClass::NumericTriple,
            regex: rule_regex(
                "(?P<s>[0-9]{1,2})(?P<e>[0-9]{2})(?P<e2>[0-9]{2})?",
                NOT_ALNUM,
            ),
            lead: Lead::NoAlnum,
            flags: RuleFlags::SANITY | RuleFlags::NUMERIC,
            parse: parse_triple,
        },
        Rule {
            class: RuleClass::NumericPair,
            regex: rule_regex("(?P<e>[0-9]{2})", NOT_ALNUM),
            lead: Lead::NoAlnum,
            flags: RuleFlags::SANITY | RuleFlags::NUMERIC,
            parse: parse_absolute,
        },
        Rule {
            class: RuleClass::NumericSubstring,
            regex: rule_regex("(?P<s>[0-9]{1,2})(?P<e>[0-9]{2})", NOT_ALNUM),
            lead: Lead::Any,
            flags: RuleFlags::SANITY | RuleFlags::NUMERIC | RuleFlags::FIRST_ONLY,
            parse: parse_substring,
        },
    ]
});

/// Episode numbers inside an `S01E01E02`-style marker.
static SE_EPISODES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<join>[-. _]*)(?i:ep|e)?(?P<n>[0-9]{1,4})(?:[vV][0-9])?")
        .expect("valid episode list pattern")
});

/// Episode numbers inside a `1x01x02`-style marker. A repeated season
/// (`1x01-1x02`) is skipped.
static X_EPISODES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<join>-?)(?:[0-9]{1,2}[xX]|[xX])?(?P<n>[0-9]{2,3})(?:[vV][0-9])?")
        .expect("valid episode list pattern")
});

static RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[0-9]{3,4}[xX][0-9]{3,4}$").expect("valid resolution pattern")
});

const CODECS: &[&str] = &["x264", "x265", "h264", "h265"];

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn parse_pair(caps: &Captures<'_>) -> Vec<Hit> {
    match (number(caps, "s"), number(caps, "e")) {
        (Some(s), Some(e)) => vec![Hit::One(SxE::new(s, e))],
        _ => Vec::new(),
    }
}

fn parse_season_episode(caps: &Captures<'_>) -> Vec<Hit> {
    episode_list(caps, &SE_EPISODES)
}

fn parse_multiplied(caps: &Captures<'_>) -> Vec<Hit> {
    episode_list(caps, &X_EPISODES)
}

/// Two numbers joined by a dash form a range, anything else is a list.
fn episode_list(caps: &Captures<'_>, numbers: &Regex) -> Vec<Hit> {
    let (Some(season), Some(eps)) = (number(caps, "s"), caps.name("eps")) else {
        return Vec::new();
    };
    let found: Vec<(bool, u32)> = numbers
        .captures_iter(eps.as_str())
        .filter_map(|c| {
            let dash = c.name("join").is_some_and(|m| m.as_str().contains('-'));
            Some((dash, number(&c, "n")?))
        })
        .collect();
    match found.as_slice() {
        [(_, from), (true, to)] => vec![Hit::Range {
            season: Some(season),
            from: *from,
            to: *to,
        }],
        _ => found
            .iter()
            .map(|&(_, e)| Hit::One(SxE::new(season, e)))
            .collect(),
    }
}

fn parse_keyword(caps: &Captures<'_>) -> Vec<Hit> {
    match (number(caps, "e"), number(caps, "to")) {
        (Some(from), Some(to)) => vec![Hit::Range {
            season: None,
            from,
            to,
        }],
        (Some(e), None) => vec![Hit::One(SxE::absolute(e))],
        _ => Vec::new(),
    }
}

fn parse_absolute(caps: &Captures<'_>) -> Vec<Hit> {
    number(caps, "e")
        .map(|e| vec![Hit::One(SxE::absolute(e))])
        .unwrap_or_default()
}

/// `101` reads as 1x01 and as absolute 101, `10102` as 1x01 and 1x02.
fn parse_triple(caps: &Captures<'_>) -> Vec<Hit> {
    let (Some(s), Some(e)) = (number(caps, "s"), number(caps, "e")) else {
        return Vec::new();
    };
    match number(caps, "e2") {
        Some(_) if s == 0 => Vec::new(),
        Some(e2) => vec![Hit::One(SxE::new(s, e)), Hit::One(SxE::new(s, e2))],
        None if s == 0 => vec![Hit::One(SxE::absolute(e))],
        None => vec![
            Hit::One(SxE::new(s, e)),
            Hit::One(SxE::absolute(s * 100 + e)),
        ],
    }
}

fn parse_substring(caps: &Captures<'_>) -> Vec<Hit> {
    match (number(caps, "s"), number(caps, "e")) {
        (Some(s), Some(e)) if s > 0 => vec![Hit::One(SxE::new(s, e))],
        _ => Vec::new(),
    }
}

fn is_year(text: &str) -> bool {
    text.len() == 4
        && text
            .parse::<u32>()
            .is_ok_and(|year| (1900..=2099).contains(&year))
}

/// Pixel dimensions and codec names are never episode markers.
fn is_technical(label: &str, start: usize, end: usize) -> bool {
    let word = scan::enclosing_word(label, start, end);
    RESOLUTION.is_match(word) || CODECS.iter().any(|c| word.eq_ignore_ascii_case(c))
}

/// Collects candidates in order, applying limits and removing duplicates.
struct Emitter<'t> {
    limits: Limits,
    flags: RuleFlags,
    token: &'t CancellationToken,
    out: Vec<SxE>,
}

impl<'t> Emitter<'t> {
    fn new(limits: Limits, flags: RuleFlags, token: &'t CancellationToken) -> Self {
        Self {
            limits,
            flags,
            token,
            out: Vec::new(),
        }
    }

    fn accepts(&self, sxe: &SxE) -> bool {
        let season_ok = !self.flags.contains(RuleFlags::SANITY)
            || sxe.season.map_or(true, |s| s <= self.limits.max_season);
        let episode_ok = !self.flags.contains(RuleFlags::EPISODE_LIMIT)
            || sxe.episode <= self.limits.max_episode;
        season_ok && episode_ok
    }

    fn emit(&mut self, sxe: SxE) {
        if self.accepts(&sxe) && !self.out.contains(&sxe) {
            self.out.push(sxe);
        }
    }

    fn push(&mut self, hit: Hit) -> Result<(), Cancelled> {
        match hit {
            Hit::One(sxe) => self.emit(sxe),
            Hit::Range { season, from, to } => {
                if to < from || to - from > self.limits.max_range_span {
                    self.emit(SxE { season, episode: from });
                    self.emit(SxE { season, episode: to });
                    return Ok(());
                }
                for episode in from..=to {
                    self.token.check()?;
                    self.emit(SxE { season, episode });
                }
            }
        }
        Ok(())
    }
}

/// Outcome of the winning rule class.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    class: RuleClass,
    start: usize,
    candidates: Vec<SxE>,
}

/// Finds season/episode candidates in a label, most probable first.
#[derive(Debug, Clone, Default)]
pub struct SeasonEpisodeMatcher {
    strict: bool,
    limits: Limits,
}

impl SeasonEpisodeMatcher {
    /// In strict mode only explicit markers (classes up to `Dotted`) count.
    pub fn new(strict: bool, limits: Limits) -> Self {
        Self { strict, limits }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Candidates for `label`, or an empty list if nothing is recognized.
    pub fn match_label(&self, label: &str) -> Vec<SxE> {
        self.match_label_cancellable(label, &CancellationToken::new())
            .unwrap_or_default()
    }

    pub fn match_label_cancellable(
        &self,
        label: &str,
        token: &CancellationToken,
    ) -> Result<Vec<SxE>, Cancelled> {
        Ok(self
            .resolve(label, token)?
            .map(|r| r.candidates)
            .unwrap_or_default())
    }

    /// The rule class that decided the result for `label`.
    pub fn classify(&self, label: &str) -> Option<RuleClass> {
        self.resolve(label, &CancellationToken::new())
            .ok()
            .flatten()
            .map(|r| r.class)
    }

    /// Byte offset of the first match of the deciding rule class.
    pub fn find(&self, label: &str) -> Option<usize> {
        self.resolve(label, &CancellationToken::new())
            .ok()
            .flatten()
            .map(|r| r.start)
    }

    fn rules(&self) -> impl Iterator<Item = &'static Rule> {
        let strict = self.strict;
        RULES
            .iter()
            .filter(move |rule| !strict || rule.flags.contains(RuleFlags::STRICT))
    }

    fn resolve(
        &self,
        label: &str,
        token: &CancellationToken,
    ) -> Result<Option<Resolved>, Cancelled> {
        let mut rules = self.rules();
        while let Some(rule) = rules.next() {
            let Some((start, mut groups)) = self.evaluate(rule, label, token)? else {
                continue;
            };
            if groups.len() > 1 {
                let mut confirmed = Vec::new();
                for lower in rules.by_ref() {
                    if let Some((_, found)) = self.evaluate(lower, label, token)? {
                        confirmed.extend(found.into_iter().flatten());
                    }
                }
                groups.sort_by_key(|group| !group.iter().any(|c| confirmed.contains(c)));
            }
            let candidates = groups.concat();
            tracing::trace!(label, class = ?rule.class, ?candidates, "season/episode matched");
            return Ok(Some(Resolved {
                class: rule.class,
                start,
                candidates,
            }));
        }
        Ok(None)
    }

    /// Candidates of one rule, grouped per match, with the offset of the
    /// first accepted match.
    fn evaluate(
        &self,
        rule: &Rule,
        label: &str,
        token: &CancellationToken,
    ) -> Result<Option<(usize, Vec<Vec<SxE>>)>, Cancelled> {
        token.check()?;
        let mut emitter = Emitter::new(self.limits, rule.flags, token);
        let mut groups = Vec::new();
        let mut first = None;
        scan::for_each(&rule.regex, label, rule.lead, |caps| {
            let Some(body) = caps.name("b") else {
                return Ok(None);
            };
            if is_technical(label, body.start(), body.end())
                || (rule.flags.contains(RuleFlags::NUMERIC) && is_year(body.as_str()))
            {
                return Ok(None);
            }
            let before = emitter.out.len();
            for hit in (rule.parse)(caps) {
                emitter.push(hit)?;
            }
            if emitter.out.len() == before {
                return Ok(Some(Flow::Continue));
            }
            groups.push(emitter.out[before..].to_vec());
            first.get_or_insert(body.start());
            if rule.flags.contains(RuleFlags::FIRST_ONLY) {
                Ok(Some(Flow::Stop))
            } else {
                Ok(Some(Flow::Continue))
            }
        })?;
        Ok(first.map(|start| (start, groups)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sxe(label: &str) -> Vec<SxE> {
        SeasonEpisodeMatcher::default().match_label(label)
    }

    fn seasonal(season: u32, episodes: impl IntoIterator<Item = u32>) -> Vec<SxE> {
        episodes.into_iter().map(|e| SxE::new(season, e)).collect()
    }

    #[test]
    fn test_explicit_marker_wins() {
        assert_eq!(sxe("Test.101.1x02.S01E03"), vec![SxE::new(1, 3)]);
        assert_eq!(sxe("Test.101.1x02"), vec![SxE::new(1, 2)]);
    }

    #[test]
    fn test_season_episode_forms() {
        assert_eq!(sxe("The.Show.S01E02.720p.HDTV.x264"), vec![SxE::new(1, 2)]);
        assert_eq!(sxe("Show [s01]_[e01]"), vec![SxE::new(1, 1)]);
        assert_eq!(sxe("Show S01.E02"), vec![SxE::new(1, 2)]);
        assert_eq!(sxe("Show s2010e01"), vec![SxE::new(2010, 1)]);
        assert_eq!(sxe("Show S01E02v2"), vec![SxE::new(1, 2)]);
        assert_eq!(sxe("Season 1 Episode 2"), vec![SxE::new(1, 2)]);
        assert_eq!(sxe("Show - Series 2 - Episode 10"), vec![SxE::new(2, 10)]);
    }

    #[test]
    fn test_multi_episode_expansion() {
        assert_eq!(sxe("s01e01-02-03-04"), seasonal(1, 1..=4));
        assert_eq!(sxe("Show.S01E01-E05"), seasonal(1, 1..=5));
        assert_eq!(sxe("Show.S01E01E02"), seasonal(1, [1, 2]));
        assert_eq!(sxe("1x01x02x03x04"), seasonal(1, 1..=4));
        assert_eq!(sxe("Show 1x01-1x02"), seasonal(1, [1, 2]));
        assert_eq!(sxe("Show 1x01-03"), seasonal(1, 1..=3));
    }

    #[test]
    fn test_keyword_ranges_are_absolute() {
        let expected: Vec<SxE> = (290..=295).map(SxE::absolute).collect();
        assert_eq!(sxe("Episode_290-295"), expected);
        assert_eq!(sxe("Show ep1"), vec![SxE::absolute(1)]);
        assert_eq!(sxe("Show Part 2"), vec![SxE::absolute(2)]);
        assert_eq!(sxe("Show 1 of 6"), vec![SxE::absolute(1)]);
        assert_eq!(sxe("Show 1of6"), vec![SxE::absolute(1)]);
    }

    #[test]
    fn test_episode_limit_without_season_limit() {
        assert_eq!(sxe("Show.S01E9999-E0001"), vec![SxE::new(1, 1)]);
        assert_eq!(sxe("Show s2010e1999"), vec![SxE::new(2010, 1999)]);
    }

    #[test]
    fn test_wide_range_keeps_endpoints() {
        assert_eq!(sxe("S01E01-E99"), seasonal(1, [1, 99]));
    }

    #[test]
    fn test_dotted() {
        assert_eq!(sxe("Show.1.02.Title"), vec![SxE::new(1, 2)]);
        assert!(!sxe("Show.1.02.720").contains(&SxE::new(1, 2)));
    }

    #[test]
    fn test_ambiguous_triple_keeps_both() {
        assert_eq!(sxe("101"), vec![SxE::new(1, 1), SxE::absolute(101)]);
        assert_eq!(sxe("Show 10102"), seasonal(1, [1, 2]));
    }

    #[test]
    fn test_two_digits_are_absolute_only() {
        assert_eq!(sxe("02"), vec![SxE::absolute(2)]);
        assert!(SeasonEpisodeMatcher::new(true, Limits::default())
            .match_label("02")
            .is_empty());
    }

    #[test]
    fn test_substring_fallback() {
        assert_eq!(sxe("Show101"), vec![SxE::new(1, 1)]);
        assert!(sxe("Show2010").is_empty());
    }

    #[test]
    fn test_technical_numbers_are_ignored() {
        assert!(sxe("1280x720").is_empty());
        assert!(sxe("Show [1920x1080]").is_empty());
        assert!(sxe("Show 2010").is_empty());
        assert!(sxe("Show.x264").is_empty());
    }

    #[test]
    fn test_strict_mode_drops_numeric_classes() {
        let strict = SeasonEpisodeMatcher::new(true, Limits::default());
        assert!(strict.match_label("Show 101").is_empty());
        assert_eq!(strict.match_label("Show 1x02"), vec![SxE::new(1, 2)]);
    }

    #[test]
    fn test_classify_and_find() {
        let matcher = SeasonEpisodeMatcher::default();
        assert_eq!(
            matcher.classify("Show.S01E02"),
            Some(RuleClass::SeasonEpisode)
        );
        assert_eq!(matcher.classify("Show 02"), Some(RuleClass::NumericPair));
        assert_eq!(matcher.find("Show.Name.S01E02.mkv"), Some(10));
        assert_eq!(matcher.find("No numbers here"), None);
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let result = SeasonEpisodeMatcher::default().match_label_cancellable("S01E01", &token);
        assert_eq!(result, Err(Cancelled));
    }
}
