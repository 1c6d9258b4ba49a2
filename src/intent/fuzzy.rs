//! Fuzzy string similarity on a 0..=100 scale
//!
//! The weighted ratio combines a plain edit-distance ratio, a best-window
//! partial ratio and token sort/set ratios that ignore word order and
//! repeated words. Inputs are normalized first so casing and punctuation
//! never affect the score.

use std::collections::BTreeSet;

/// Scale applied to token-based scores so an exact ratio always wins ties
const UNBASE_SCALE: f64 = 0.95;

/// Scale applied to partial scores when lengths differ moderately
const PARTIAL_SCALE: f64 = 0.90;

/// Scale applied to partial scores when one string dwarfs the other
const PARTIAL_SCALE_FAR: f64 = 0.60;

/// Normalize text for comparison
///
/// Lowercases, turns punctuation into spaces and collapses whitespace.
/// Combining marks are kept so scripts like Bengali survive intact.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if is_separator(c) { ' ' } else { c })
        .collect();

    mapped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(c, '।' | '‘' | '’' | '“' | '”' | '…' | '¿' | '¡' | '–' | '—')
}

/// Weighted similarity between two strings, 0..=100
///
/// Both inputs are normalized. Returns 0 when either side is empty after
/// normalization.
#[must_use]
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let p1 = normalize(a);
    let p2 = normalize(b);
    weighted_ratio_normalized(&p1, &p2)
}

/// Weighted similarity for inputs that are already normalized
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn weighted_ratio_normalized(p1: &str, p2: &str) -> u8 {
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = ratio(p1, p2);

    let len1 = p1.chars().count();
    let len2 = p2.chars().count();
    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;

    let best = if len_ratio < 1.5 {
        let tsor = token_sort_ratio(p1, p2, false) * UNBASE_SCALE;
        let tser = token_set_ratio(p1, p2, false) * UNBASE_SCALE;
        base.max(tsor).max(tser)
    } else {
        let scale = if len_ratio > 8.0 {
            PARTIAL_SCALE_FAR
        } else {
            PARTIAL_SCALE
        };
        let partial = partial_ratio(p1, p2) * scale;
        let ptsor = token_sort_ratio(p1, p2, true) * UNBASE_SCALE * scale;
        let ptser = token_set_ratio(p1, p2, true) * UNBASE_SCALE * scale;
        base.max(partial).max(ptsor).max(ptser)
    };

    best.round().clamp(0.0, 100.0) as u8
}

/// Indel similarity ratio: `2 * lcs / (len_a + len_b)`, scaled to 100
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

#[allow(clippy::cast_precision_loss)]
fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let lcs = lcs_len(a, b);
    200.0 * lcs as f64 / total as f64
}

/// Longest common subsequence length, two-row dynamic programming
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Best ratio of the shorter string against every same-length window of the longer
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if short.len() == long.len() {
        return ratio_chars(short, long);
    }

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let score = ratio_chars(short, window);
        if score > 99.5 {
            return 100.0;
        }
        best = best.max(score);
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio after sorting the words of both strings
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str, partial: bool) -> f64 {
    let s1 = sorted_tokens(a);
    let s2 = sorted_tokens(b);
    if partial {
        partial_ratio(&s1, &s2)
    } else {
        ratio(&s1, &s2)
    }
}

/// Ratio over the shared word set plus each side's remainder
///
/// Scores the intersection against each "intersection + difference"
/// string and those against each other, keeping the best.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str, partial: bool) -> f64 {
    let t1: BTreeSet<&str> = a.split_whitespace().collect();
    let t2: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = t1.intersection(&t2).copied().collect::<Vec<_>>().join(" ");
    let diff1 = t1.difference(&t2).copied().collect::<Vec<_>>().join(" ");
    let diff2 = t2.difference(&t1).copied().collect::<Vec<_>>().join(" ");

    let combined1 = format!("{sect} {diff1}").trim().to_string();
    let combined2 = format!("{sect} {diff2}").trim().to_string();

    let scorer = if partial { partial_ratio } else { ratio };

    scorer(&sect, &combined1)
        .max(scorer(&sect, &combined2))
        .max(scorer(&combined1, &combined2))
}
