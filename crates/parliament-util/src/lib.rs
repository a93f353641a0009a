//! Shared text and time helpers used across the parliament pipeline.
//!
//! These are small, pure functions: name normalisation (shared by the
//! Hansard scraper and the speaker mapper), a word-overlap similarity
//! score used to align transcript segments against Hansard interventions,
//! and the duration/date formatting used when rendering forum posts.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HONORIFIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"(?i)^(right hon\.?|hon\.?|mrs\.?|mr\.?|ms\.?|mme\.?|m\.|l'honorable)\s+").unwrap()
});

static TRAILING_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"\s*\([^)]*\)\s*$").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| {
        #[expect(clippy::unwrap_used)]
        Regex::new(r"\s+").unwrap()
    });

/// Name-prefix override used by both the speaker mapper and the
/// contribution extractor: a line starting with `Name:` names its own
/// speaker regardless of the alignment cursor.
pub static SPEAKER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used)]
    Regex::new(r"^([A-Z][^:]{2,40}):\s").unwrap()
});

/// Normalise a speaker name for matching across sources: strips common
/// honorifics, diacritics, trailing role parentheticals and a trailing
/// colon, then lowercases and collapses whitespace.
#[must_use]
pub fn normalize_speaker_name(name: &str) -> String {
    let stripped = name.trim().trim_end_matches(':').trim();
    let no_role = TRAILING_ROLE_RE.replace(stripped, "");
    let no_honorific = HONORIFIC_RE.replace(&no_role, "");

    let folded: String = no_honorific
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();

    let lowercased = folded.to_lowercase();
    WHITESPACE_RE.replace_all(lowercased.trim(), " ").into_owned()
}

/// Word-set Jaccard similarity between two strings, used to align a
/// transcript segment with a Hansard intervention when no explicit
/// speaker prefix is present. Returns `0.0` if either string has no words.
#[must_use]
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;

    let words_a: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let words_b: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    if union == 0 {
        0.0
    } else {
        #[expect(clippy::cast_precision_loss)]
        let ratio = intersection as f64 / union as f64;
        ratio
    }
}

/// Format a duration in seconds as `"Xh Ym"` (hours present) or
/// `"Y minutes"` (hours absent), matching the forum post renderer's style.
#[must_use]
pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} minutes")
    }
}

/// Format a date as a long-form English date, e.g. `"July 29, 2026"`.
#[must_use]
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Truncate a string to at most `max_len` characters, appending `"..."`
/// when truncated. Used when selecting key quotes for forum posts.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Mr. John Smith", "john smith")]
    #[test_case("Right Hon. Jean Chretien", "jean chretien")]
    #[test_case("L'honorable Marie Dubois (Quebec)", "marie dubois")]
    #[test_case("Hon. Marc Miller:", "marc miller")]
    #[test_case("  Pierre   Poilievre  ", "pierre poilievre")]
    fn normalizes_names(input: &str, expected: &str) {
        assert_eq!(normalize_speaker_name(input), expected);
    }

    #[test]
    fn jaccard_identical_is_one() {
        assert!((jaccard_similarity("order order", "order order") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_disjoint_is_zero() {
        assert_eq!(jaccard_similarity("the bill passed", "question period today"), 0.0);
    }

    #[test]
    fn jaccard_empty_is_zero() {
        assert_eq!(jaccard_similarity("", "something"), 0.0);
    }

    #[test_case(90, "1h 30m")]
    #[test_case(3661, "1h 1m")]
    #[test_case(300, "5 minutes")]
    #[test_case(0, "0 minutes")]
    fn formats_duration(seconds: i64, expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[test]
    fn formats_long_date() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 29).expect("valid date");
        assert_eq!(format_date_long(date), "July 29, 2026");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
    }

    #[test]
    fn speaker_prefix_detects_name_colon() {
        let captures = SPEAKER_PREFIX_RE.captures("John Smith: I rise on a point of order.");
        assert_eq!(captures.unwrap().get(1).unwrap().as_str(), "John Smith");
    }
}
