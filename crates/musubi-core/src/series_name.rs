//! Inference of the series or movie title shared by a group of labels.

use std::path::Path;

use musubi_parse::tokenizer::{self, is_checksum};
use musubi_parse::PatternExtractor;

use crate::metric::NameMetric;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesOptions {
    /// Share of the labels a sequence must appear in.
    pub frequency_threshold: f32,
    pub min_chars: usize,
    /// Words a title needs. Set to `1` to accept one-word titles.
    pub min_tokens: usize,
    /// Last token index at which a common sequence may start.
    pub max_start_index: usize,
    /// Folder names at least this similar to the inferred name replace it.
    pub folder_similarity: f32,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            frequency_threshold: 0.6,
            min_chars: 2,
            min_tokens: 2,
            max_start_index: 3,
            folder_similarity: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesNameResolver {
    extractor: PatternExtractor,
    options: SeriesOptions,
}

/// A candidate sequence with its support and observed spellings.
struct Candidate {
    key: Vec<String>,
    support: usize,
    spellings: Vec<Vec<String>>,
}

impl SeriesNameResolver {
    pub fn new(extractor: PatternExtractor, options: SeriesOptions) -> Self {
        Self { extractor, options }
    }

    pub fn options(&self) -> &SeriesOptions {
        &self.options
    }

    /// Words of `label` before its first season/episode or date pattern,
    /// without bracketed groups and checksums.
    pub fn focus(&self, label: &str) -> Vec<String> {
        let stem = tokenizer::strip_extension(label).0;
        let head = self.extractor.find(stem).map_or(stem, |at| &stem[..at]);
        tokenizer::tokenize(head)
            .into_iter()
            .filter(|t| t.is_word() && !is_checksum(&t.text))
            .map(|t| t.text.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// The title shared by most of `labels`, or `None` when no word
    /// sequence is common enough.
    pub fn resolve<S: AsRef<str>>(&self, labels: &[S]) -> Option<String> {
        let foci: Vec<Vec<String>> = labels.iter().map(|l| self.focus(l.as_ref())).collect();
        let name = match foci.as_slice() {
            [] => None,
            [only] => self.accept(only).then(|| only.join(" ")),
            _ => self.best_common(&foci),
        };
        tracing::debug!(labels = labels.len(), name = ?name, "Resolved series name");
        name
    }

    /// Every title in `labels`. Sets without one dominant title are split
    /// in halves until each part resolves.
    pub fn resolve_all<S: AsRef<str>>(&self, labels: &[S]) -> Vec<String> {
        let mut names = Vec::new();
        self.collect(labels, &mut names);
        dedup_ignore_case(names)
    }

    fn collect<S: AsRef<str>>(&self, labels: &[S], names: &mut Vec<String>) {
        if labels.is_empty() {
            return;
        }
        if let Some(name) = self.resolve(labels) {
            names.push(name);
        } else if labels.len() > 1 {
            let (left, right) = labels.split_at(labels.len() / 2);
            self.collect(left, names);
            self.collect(right, names);
        }
    }

    /// Titles for files grouped by parent folder, in first-seen folder
    /// order. A folder name close to an inferred title replaces it.
    pub fn resolve_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<String> {
        let mut groups: Vec<(Option<&str>, Vec<&str>)> = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "Skipping path without a file name");
                continue;
            };
            let folder = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str());
            match groups.iter_mut().find(|(f, _)| *f == folder) {
                Some((_, names)) => names.push(file_name),
                None => groups.push((folder, vec![file_name])),
            }
        }

        let mut names = Vec::new();
        for (folder, files) in groups {
            let folder_name = folder
                .map(|f| self.focus(f).join(" "))
                .filter(|f| !f.is_empty());
            for name in self.resolve_all(&files) {
                match &folder_name {
                    Some(f) if NameMetric::similarity(f, &name) >= self.options.folder_similarity => {
                        names.push(f.clone())
                    }
                    _ => names.push(name),
                }
            }
        }
        dedup_ignore_case(names)
    }

    fn accept(&self, words: &[String]) -> bool {
        words.len() >= self.options.min_tokens
            && words.join(" ").chars().count() >= self.options.min_chars
    }

    fn best_common(&self, foci: &[Vec<String>]) -> Option<String> {
        let lower: Vec<Vec<String>> = foci
            .iter()
            .map(|words| words.iter().map(|w| w.to_lowercase()).collect())
            .collect();
        let n = foci.len();
        // Tolerate float error so that 0.6 of 5 labels stays 3.
        let required = f64::from(self.options.frequency_threshold) * n as f64 - 1e-6;
        let threshold = (required.ceil() as usize)
            .max(2)
            .min(n);

        let mut candidates: Vec<Candidate> = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                let Some((start, len)) = self.first_common(&lower[i], &lower[j]) else {
                    continue;
                };
                let key = &lower[i][start..start + len];
                if candidates.iter().any(|c| c.key == key) || !self.accept(&foci[i][start..start + len]) {
                    continue;
                }
                let mut candidate = Candidate {
                    key: key.to_vec(),
                    support: 0,
                    spellings: Vec::new(),
                };
                for (words, lowered) in foci.iter().zip(&lower) {
                    let Some(at) = position(lowered, key) else {
                        continue;
                    };
                    candidate.support += 1;
                    let spelling = words[at..at + len].to_vec();
                    if !candidate.spellings.contains(&spelling) {
                        candidate.spellings.push(spelling);
                    }
                }
                candidates.push(candidate);
            }
        }

        let mut best: Option<(&Candidate, &[String], f32)> = None;
        for candidate in candidates.iter().filter(|c| c.support >= threshold) {
            let Some((spelling, balance)) = best_spelling(&candidate.spellings) else {
                continue;
            };
            let better = best.map_or(true, |(b, _, b_balance)| {
                (candidate.support, candidate.key.len()) > (b.support, b.key.len())
                    || ((candidate.support, candidate.key.len()) == (b.support, b.key.len())
                        && balance > b_balance)
            });
            if better {
                best = Some((candidate, spelling, balance));
            }
        }
        tracing::trace!(candidates = candidates.len(), threshold, "Ranked common sequences");
        best.map(|(_, spelling, _)| spelling.join(" "))
    }

    /// First common word run of `a` and `b` starting early in both: the
    /// first start in `a` with any match, extended to its longest run.
    fn first_common(&self, a: &[String], b: &[String]) -> Option<(usize, usize)> {
        let max = self.options.max_start_index;
        for i in 0..a.len().min(max + 1) {
            let longest = (0..b.len().min(max + 1))
                .map(|j| a[i..].iter().zip(&b[j..]).take_while(|(x, y)| x == y).count())
                .max()
                .unwrap_or(0);
            if longest > 0 {
                return Some((i, longest));
            }
        }
        None
    }
}

fn position(words: &[String], key: &[String]) -> Option<usize> {
    if key.is_empty() || key.len() > words.len() {
        return None;
    }
    words.windows(key.len()).position(|w| w == key)
}

/// Share of words that start upper-case without being all upper-case.
fn title_case_balance(words: &[String]) -> f32 {
    let cased: Vec<&String> = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_alphabetic))
        .collect();
    if cased.is_empty() {
        return 0.0;
    }
    let titled = cased
        .iter()
        .filter(|w| {
            w.chars().next().is_some_and(char::is_uppercase)
                && w.chars().any(char::is_lowercase)
        })
        .count();
    titled as f32 / cased.len() as f32
}

fn best_spelling(spellings: &[Vec<String>]) -> Option<(&[String], f32)> {
    let mut best: Option<(&[String], f32)> = None;
    for spelling in spellings {
        let balance = title_case_balance(spelling);
        if best.map_or(true, |(_, b)| balance > b) {
            best = Some((spelling.as_slice(), balance));
        }
    }
    best
}

fn dedup_ignore_case(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for name in names {
        let key = name.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(name);
        }
    }
    out
}
