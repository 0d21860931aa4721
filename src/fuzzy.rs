//! Approximate string similarity on a 0-100 scale.
//!
//! All scores derive from the normalized indel similarity (insertions and
//! deletions only, computed from the longest common subsequence) over
//! Unicode scalar values. [`weighted_ratio`] combines the plain, partial and
//! token-based variants and is what query expansion uses.

use std::collections::BTreeSet;

/// Scores how similar a candidate is to a query term, from 0 to 100.
pub trait TermMatcher {
    fn similarity(&self, query: &str, candidate: &str) -> f64;
}

/// Case-insensitive [`weighted_ratio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl TermMatcher for WeightedRatio {
    fn similarity(&self, query: &str, candidate: &str) -> f64 {
        weighted_ratio(&query.to_lowercase(), &candidate.to_lowercase())
    }
}

/// Return up to `limit` candidates scoring at least `cutoff`, best first.
///
/// Equal scores keep the order in which `candidates` yielded them.
pub fn extract<'v, M, I>(
    matcher: &M,
    query: &str,
    candidates: I,
    cutoff: f64,
    limit: usize,
) -> Vec<(&'v str, f64)>
where
    M: TermMatcher + ?Sized,
    I: IntoIterator<Item = &'v str>,
{
    let mut matches: Vec<(&str, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = matcher.similarity(query, candidate);
            (score >= cutoff).then_some((candidate, score))
        })
        .collect();
    matches.sort_by(|a, b| b.1.total_cmp(&a.1));
    matches.truncate(limit);
    matches
}

pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any equally long window of
/// the longer one, including windows that hang over either edge.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let m = short.len();
    let n = long.len();
    let mut best = 0.0_f64;

    for start in 0..=(n - m) {
        best = best.max(ratio_chars(short, &long[start..start + m]));
        if best == 100.0 {
            return best;
        }
    }
    for k in 1..m {
        best = best
            .max(ratio_chars(short, &long[..k]))
            .max(ratio_chars(short, &long[n - k..]));
    }

    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Compare the shared tokens and the per-side leftovers separately, so that
/// one string being a token subset of the other scores high.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let common: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let diff_a = only_a.join(" ");
    let diff_b = only_b.join(" ");
    let mut best = ratio(&diff_a, &diff_b);

    let sect_len = char_len(&common.join(" "));
    if sect_len == 0 {
        return best;
    }

    // "common + ' ' + leftover" against "common" alone differs only by the
    // leftover and its joining space.
    for diff_len in [char_len(&diff_a), char_len(&diff_b)] {
        let dist = diff_len + 1;
        let total = sect_len + sect_len + dist;
        best = best.max(100.0 * (1.0 - dist as f64 / total as f64));
    }
    best
}

fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.intersection(&set_b).next().is_some() {
        return 100.0;
    }
    partial_ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Blend of the ratio variants, picking partial matching only when the
/// lengths differ substantially.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    const UNBASE_SCALE: f64 = 0.95;

    let len_a = char_len(a);
    let len_b = char_len(b);
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let mut best = ratio(a, b);

    if len_ratio < 1.5 {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return best.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    best = best.max(partial_ratio(a, b) * partial_scale);
    best.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
