use super::SimilarityMetric;
use crate::normalize::tokens;
use crate::subject::Subject;

/// Longest common run of whole words, relative to the shorter label.
///
/// Checks whether one name is contained in the other (a title fragment)
/// rather than how close the full strings are.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMetric;

impl SubstringMetric {
    pub fn similarity(a: &str, b: &str) -> f32 {
        let a = tokens(a);
        let b = tokens(b);
        let shorter = a.len().min(b.len());
        if shorter == 0 {
            return 0.0;
        }
        longest_common_run(&a, &b) as f32 / shorter as f32
    }
}

fn longest_common_run(a: &[String], b: &[String]) -> usize {
    let mut best = 0;
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            row[j + 1] = if x == y { prev[j] + 1 } else { 0 };
            best = best.max(row[j + 1]);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    best
}

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for SubstringMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        Self::similarity(&a.name(), &b.name())
    }

    fn name(&self) -> &str {
        "substring"
    }
}

/// Best [`SubstringMetric`] score over every pair of fields, rounded down
/// to thirds so that near-equal scores tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringFieldsMetric;

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for SubstringFieldsMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        let left = a.fields();
        let right = b.fields();
        let best = left
            .iter()
            .flat_map(|x| right.iter().map(move |y| SubstringMetric::similarity(x, y)))
            .fold(0.0f32, f32::max);
        (best * 3.0).floor() / 3.0
    }

    fn name(&self) -> &str {
        "substring_fields"
    }
}
