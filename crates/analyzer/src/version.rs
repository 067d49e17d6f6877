//! BIOS version normalization and ordering
//!
//! Vendors report firmware versions in many shapes ("1.20", "Ver 1.20 (A03)", "A14",
//! "N1CET90W (1.58 )"). Every input is reduced to a dotted numeric token, tried in this order:
//!
//! 1. a dotted numeric run of two or more components, taken verbatim
//! 2. short "A"-prefixed strings (under 5 characters): the first digit run
//! 3. the first digit run anywhere
//! 4. `0.0`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

static DOTTED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)+").expect("dotted version pattern"));
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run pattern"));

const ZERO_TOKEN: &str = "0.0";

/// Rule that produced a [`VersionToken`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationTier {
    Dotted,
    ShortAPrefix,
    FirstDigits,
    Fallback,
}

/// Normalized, comparable form of a version string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric components with leading zeros stripped, any length.
    ///
    /// `None` when a component is not a run of ASCII digits, which normalization never produces.
    pub fn components(&self) -> Option<Vec<&str>> {
        self.0
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    Some(part.trim_start_matches('0'))
                }
            })
            .collect()
    }

    fn zero() -> Self {
        Self(ZERO_TOKEN.to_string())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw version string. Never fails.
pub fn normalize(raw: &str) -> VersionToken {
    normalize_with_tier(raw).0
}

/// Normalize and report which rule matched
pub fn normalize_with_tier(raw: &str) -> (VersionToken, NormalizationTier) {
    let v = raw.trim();
    if v.is_empty() {
        return (VersionToken::zero(), NormalizationTier::Fallback);
    }

    if let Some(m) = DOTTED_RUN.find(v) {
        return (VersionToken(m.as_str().to_string()), NormalizationTier::Dotted);
    }

    if v.starts_with(['A', 'a']) && v.chars().count() < 5 {
        if let Some(m) = DIGIT_RUN.find(v) {
            return (VersionToken(m.as_str().to_string()), NormalizationTier::ShortAPrefix);
        }
    }

    if let Some(m) = DIGIT_RUN.find(v) {
        return (VersionToken(m.as_str().to_string()), NormalizationTier::FirstDigits);
    }

    (VersionToken::zero(), NormalizationTier::Fallback)
}

/// Compare two raw version strings after normalization.
///
/// Components compare numerically left to right, the shorter side padded with zeros.
/// Normalized tokens always hold digit runs, so the raw string fallback is unreachable.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (left, right) = (normalize(a), normalize(b));
    match (left.components(), right.components()) {
        (Some(left), Some(right)) => compare_components(&left, &right),
        _ => a.cmp(b),
    }
}

fn compare_components(left: &[&str], right: &[&str]) -> Ordering {
    let len = left.len().max(right.len());
    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or("");
            let r = right.get(i).copied().unwrap_or("");
            compare_digits(l, r)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Order two zero-stripped digit strings by numeric value
fn compare_digits(l: &str, r: &str) -> Ordering {
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}
