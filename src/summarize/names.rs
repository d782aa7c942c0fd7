//! Per-node attribute summaries.

use std::collections::BTreeMap;
use std::fmt;

use crate::features::NumericRange;

/// Running summary of one attribute over a cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum NameSummary {
    /// Expanding `[min, max]`; `None` until a value is seen.
    Range(Option<NumericRange>),
    /// Token frequencies.
    Tokens(BTreeMap<String, usize>),
}

impl NameSummary {
    /// Widen the range to include `value`. Missing values are ignored.
    pub(crate) fn observe_number(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if let NameSummary::Range(range) = self {
            *range = Some(match range.take() {
                None => NumericRange::new(value, value),
                Some(r) => NumericRange::new(r.min.min(value), r.max.max(value)),
            });
        }
    }

    /// Count one occurrence of `token`.
    pub(crate) fn observe_token(&mut self, token: String) {
        if let NameSummary::Tokens(counts) = self {
            *counts.entry(token).or_default() += 1;
        }
    }

    /// Union ranges, add token counts. Mismatched kinds are left untouched.
    pub(crate) fn merge(&mut self, other: &NameSummary) {
        match (self, other) {
            (NameSummary::Range(mine), NameSummary::Range(Some(theirs))) => {
                *mine = Some(match mine.take() {
                    None => *theirs,
                    Some(r) => NumericRange::new(r.min.min(theirs.min), r.max.max(theirs.max)),
                });
            }
            (NameSummary::Tokens(mine), NameSummary::Tokens(theirs)) => {
                for (token, count) in theirs {
                    *mine.entry(token.clone()).or_default() += count;
                }
            }
            _ => {}
        }
    }

    /// The `n` most frequent tokens, ties broken alphabetically.
    pub fn top_tokens(&self, n: usize) -> Vec<&str> {
        match self {
            NameSummary::Tokens(counts) => {
                let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
                // BTreeMap iteration is alphabetical; the stable sort keeps it for ties.
                ranked.sort_by(|a, b| b.1.cmp(a.1));
                ranked.into_iter().take(n).map(|(t, _)| t.as_str()).collect()
            }
            NameSummary::Range(_) => Vec::new(),
        }
    }

    /// `"min-max"` for ranges, the top `n` tokens for token tables.
    pub fn render(&self, n: usize) -> String {
        match self {
            NameSummary::Range(Some(r)) => format!("{}-{}", r.min, r.max),
            NameSummary::Range(None) => "?".to_string(),
            NameSummary::Tokens(_) => self.top_tokens(n).join(" "),
        }
    }
}

/// Attribute name → summary, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMap {
    entries: Vec<(String, NameSummary)>,
}

impl NameMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute with an empty summary.
    pub(crate) fn push(&mut self, name: impl Into<String>, summary: NameSummary) {
        self.entries.push((name.into(), summary));
    }

    /// Mutable summary at schema position `i`.
    pub(crate) fn summary_mut(&mut self, i: usize) -> Option<&mut NameSummary> {
        self.entries.get_mut(i).map(|(_, s)| s)
    }

    /// Summary for `attribute`.
    pub fn get(&self, attribute: &str) -> Option<&NameSummary> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, s)| s)
    }

    /// Number of summarised attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before any summary has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(attribute, summary)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameSummary)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Fold another map into this one, matching attributes by name.
    pub fn merge(&mut self, other: &NameMap) {
        for (name, theirs) in &other.entries {
            match self.entries.iter_mut().find(|(n, _)| n == name) {
                Some((_, mine)) => mine.merge(theirs),
                None => self.entries.push((name.clone(), theirs.clone())),
            }
        }
    }

    /// `"<attribute>: <summary>; "` for every attribute.
    pub fn render(&self, top_tokens: usize) -> String {
        self.entries
            .iter()
            .map(|(name, s)| format!("{name}: {}; ", s.render(top_tokens)))
            .collect()
    }
}

impl fmt::Display for NameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(2))
    }
}
