//! Tiered matching of a requested value against rendered option labels.

use std::collections::HashSet;

use serde::Serialize;

/// Which rule produced a match; earlier tiers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
    TokenOverlap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionMatch {
    /// Position in the rendered list.
    pub index: usize,
    /// The label exactly as rendered.
    pub label: String,
    pub tier: MatchTier,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn tokens(s: &str) -> HashSet<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Pick the best label for `requested`.
///
/// Tiers are tried in order (exact, starts-with, contains, most shared
/// words) on trimmed, lowercased text; within a tier the earliest label in
/// document order wins. An empty request never matches.
pub fn best_match<S: AsRef<str>>(requested: &str, labels: &[S]) -> Option<OptionMatch> {
    let wanted = normalize(requested);
    if wanted.is_empty() {
        return None;
    }
    let normalized: Vec<String> = labels.iter().map(|l| normalize(l.as_ref())).collect();
    let found = |tier: MatchTier, index: usize| OptionMatch {
        index,
        label: labels[index].as_ref().to_string(),
        tier,
    };

    if let Some(i) = normalized.iter().position(|l| *l == wanted) {
        return Some(found(MatchTier::Exact, i));
    }
    if let Some(i) = normalized.iter().position(|l| l.starts_with(&wanted)) {
        return Some(found(MatchTier::Prefix, i));
    }
    if let Some(i) = normalized.iter().position(|l| l.contains(&wanted)) {
        return Some(found(MatchTier::Substring, i));
    }

    let wanted_tokens = tokens(&wanted);
    let mut best: Option<(usize, usize)> = None;
    for (i, label) in normalized.iter().enumerate() {
        let shared = tokens(label).intersection(&wanted_tokens).count();
        if shared > 0 && best.map_or(true, |(_, top)| shared > top) {
            best = Some((i, shared));
        }
    }
    best.map(|(i, _)| found(MatchTier::TokenOverlap, i))
}
