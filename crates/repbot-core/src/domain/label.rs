//! ScoreLabel codec.
//!
//! The label is the only state the bot persists, and it lives on the
//! platform as a short display string:
//!
//! ```text
//! Positive: <int> Neutral: <int> Negative: <int>
//! ```
//!
//! # Rules
//! - `decode` never fails. Text that does not match the grammar (including
//!   the empty string) decodes to all zeros.
//! - Counters are ASCII digits only; other Unicode digits make the text
//!   unrecognized.
//! - Negative fields are clamped to 0, fields too large for `u64` saturate.
//! - `encode` always writes the canonical form, so `decode(encode(c)) == c`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::Directive;

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Positive: (-?[0-9]+) Neutral: (-?[0-9]+) Negative: (-?[0-9]+)$")
        .expect("label pattern is a valid regex")
});

/// Three reputation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreLabel {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl ScoreLabel {
    pub const fn new(positive: u64, neutral: u64, negative: u64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Parse label text, normalizing anything unrecognized to zero.
    pub fn decode(text: &str) -> Self {
        let Some(caps) = LABEL_PATTERN.captures(text.trim()) else {
            return Self::default();
        };
        Self {
            positive: parse_counter(&caps[1]),
            neutral: parse_counter(&caps[2]),
            negative: parse_counter(&caps[3]),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Bump exactly the counter that `directive` names.
    pub fn increment(mut self, directive: Directive) -> Self {
        let counter = match directive {
            Directive::Positive => &mut self.positive,
            Directive::Neutral => &mut self.neutral,
            Directive::Negative => &mut self.negative,
        };
        *counter = counter.saturating_add(1);
        self
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Positive: {} Neutral: {} Negative: {}",
            self.positive, self.neutral, self.negative
        )
    }
}

fn parse_counter(digits: &str) -> u64 {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    // All ASCII digits: the only parse failure left is overflow.
    digits.parse().unwrap_or(u64::MAX)
}

/// Decode `text`, apply one increment for `directive`, and re-encode.
pub fn apply(text: &str, directive: Directive) -> String {
    ScoreLabel::decode(text).increment(directive).encode()
}

pub fn increment_positive(text: &str) -> String {
    apply(text, Directive::Positive)
}

pub fn increment_neutral(text: &str) -> String {
    apply(text, Directive::Neutral)
}

pub fn increment_negative(text: &str) -> String {
    apply(text, Directive::Negative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn decodes_canonical_text() {
        let label = ScoreLabel::decode("Positive: 2 Neutral: 0 Negative: 1");
        assert_eq!(label, ScoreLabel::new(2, 0, 1));
    }

    #[test]
    fn encodes_in_fixed_order() {
        assert_eq!(
            ScoreLabel::new(10, 4, 7).encode(),
            "Positive: 10 Neutral: 4 Negative: 7"
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("Trusted trader")]
    #[case("Positive: 1 Neutral: 2")]
    #[case("Neutral: 1 Positive: 2 Negative: 3")]
    #[case("positive: 1 neutral: 2 negative: 3")]
    #[case("Positive: a Neutral: 2 Negative: 3")]
    #[case("Positive: 1 Neutral: 2 Negative: 3 extra")]
    #[case("Positive:1 Neutral:2 Negative:3")]
    #[case("Positive: \u{0663} Neutral: 0 Negative: 0")]
    #[case("Positive: 1 Neutral: \u{FF12} Negative: 0")]
    #[case("Positive: 1 Neutral: 0 Negative: -\u{0967}")]
    fn garbage_decodes_to_zero(#[case] text: &str) {
        assert_eq!(ScoreLabel::decode(text), ScoreLabel::default());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let label = ScoreLabel::decode("  Positive: 1 Neutral: 2 Negative: 3\n");
        assert_eq!(label, ScoreLabel::new(1, 2, 3));
    }

    #[test]
    fn leading_zeros_are_accepted() {
        let label = ScoreLabel::decode("Positive: 007 Neutral: 0 Negative: 00");
        assert_eq!(label, ScoreLabel::new(7, 0, 0));
    }

    #[test]
    fn negative_fields_clamp_to_zero() {
        let label = ScoreLabel::decode("Positive: -3 Neutral: 4 Negative: -1");
        assert_eq!(label, ScoreLabel::new(0, 4, 0));
        assert_eq!(
            increment_negative("Positive: -3 Neutral: 4 Negative: -1"),
            "Positive: 0 Neutral: 4 Negative: 1"
        );
    }

    #[test]
    fn non_ascii_digits_never_saturate() {
        let text = "Positive: \u{0663}\u{0663} Neutral: 4 Negative: 1";
        assert_eq!(ScoreLabel::decode(text), ScoreLabel::default());
        assert_eq!(increment_neutral(text), "Positive: 0 Neutral: 1 Negative: 0");
    }

    #[test]
    fn counters_only_accept_ascii_digits() {
        assert_eq!(parse_counter("42"), 42);
        assert_eq!(parse_counter("-7"), 0);
        assert_eq!(parse_counter("\u{0664}2"), 0);
        assert_eq!(parse_counter("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn oversized_fields_saturate() {
        let label = ScoreLabel::decode("Positive: 99999999999999999999999 Neutral: 1 Negative: 2");
        assert_eq!(label.positive, u64::MAX);
        assert_eq!(label.increment(Directive::Positive).positive, u64::MAX);
    }

    #[test]
    fn increment_on_empty_starts_from_zero() {
        assert_eq!(increment_positive(""), "Positive: 1 Neutral: 0 Negative: 0");
        assert_eq!(increment_neutral(""), "Positive: 0 Neutral: 1 Negative: 0");
        assert_eq!(increment_negative(""), "Positive: 0 Neutral: 0 Negative: 1");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(p: u64, n: u64, d: u64) {
            let label = ScoreLabel::new(p, n, d);
            prop_assert_eq!(ScoreLabel::decode(&label.encode()), label);
        }

        #[test]
        fn increment_touches_one_counter(p in 0u64..1_000_000, n in 0u64..1_000_000, d in 0u64..1_000_000) {
            let text = ScoreLabel::new(p, n, d).encode();
            prop_assert_eq!(ScoreLabel::decode(&increment_positive(&text)), ScoreLabel::new(p + 1, n, d));
            prop_assert_eq!(ScoreLabel::decode(&increment_neutral(&text)), ScoreLabel::new(p, n + 1, d));
            prop_assert_eq!(ScoreLabel::decode(&increment_negative(&text)), ScoreLabel::new(p, n, d + 1));
        }
    }
}
