// Copyright 2026
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

/// Normalized edit-distance similarity in [0, 1]: 1.0 for equal strings,
/// 0.0 if either is empty, otherwise `1 - distance / max_len`.
pub fn compute_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let distance = levenshtein(a, b) as f64;
    let max_len = a.chars().count().max(b.chars().count()) as f64;
    1.0 - (distance / max_len)
}

/// Space-optimized Levenshtein distance over rune (char) slices.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_score_one() {
        assert_eq!(compute_similarity("cpu high", "cpu high"), 1.0);
    }

    #[test]
    fn either_empty_scores_zero() {
        assert_eq!(compute_similarity("", "x"), 0.0);
        assert_eq!(compute_similarity("x", ""), 0.0);
    }

    #[test]
    fn near_match_scores_high() {
        let score = compute_similarity("CPU high on node-1", "CPU high on node-2");
        assert!(score > 0.9, "expected high similarity, got {score}");
    }

    #[test]
    fn unrelated_strings_score_low() {
        let score = compute_similarity("disk full", "network flapping");
        assert!(score < 0.5, "expected low similarity, got {score}");
    }
}
