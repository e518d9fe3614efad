use super::SimilarityMetric;
use crate::normalize::normalize;
use crate::subject::Subject;

/// Normalized longest-common-subsequence similarity of two names, in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMetric;

impl NameMetric {
    pub fn similarity(a: &str, b: &str) -> f32 {
        let a: Vec<char> = normalize(a).chars().collect();
        let b: Vec<char> = normalize(b).chars().collect();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        2.0 * lcs_len(&a, &b) as f32 / (a.len() + b.len()) as f32
    }
}

/// Length of the longest common subsequence, one row at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for &x in a {
        for (j, &y) in b.iter().enumerate() {
            row[j + 1] = if x == y {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for NameMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        Self::similarity(&a.name(), &b.name())
    }

    fn name(&self) -> &str {
        "name"
    }
}
