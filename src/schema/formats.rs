//! Scalar format checks shared by the schema validator and the
//! cross-document checker.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use semver::Version;

/// Kebab-case identifier segments separated by `/`, e.g. `ops/log-work`.
static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*(/[a-z0-9]+(-[a-z0-9]+)*)*$").expect("id regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));

/// Range comparators, longest first so `>=` wins over `>`.
const COMPARATORS: [&str; 7] = [">=", "<=", "^", "~", ">", "<", "="];

#[must_use]
pub fn is_valid_id(s: &str) -> bool {
    ID_RE.is_match(s)
}

/// Full semver grammar: major.minor.patch with optional pre-release
/// and build metadata.
#[must_use]
pub fn is_valid_semver(s: &str) -> bool {
    Version::parse(s).is_ok()
}

/// Calendar-valid `YYYY-MM-DD`, month lengths and leap years included.
#[must_use]
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calendar- and offset-valid ISO-8601 date-time: hour 0-23,
/// minute/second 0-59, offset `Z` or `±HH:MM` in range.
#[must_use]
pub fn is_valid_datetime(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

/// One or more whitespace-separated comparator+semver tokens:
/// `^`, `~`, `>=`, `<=`, `>`, `<`, `=` or a bare version.
#[must_use]
pub fn is_valid_range(s: &str) -> bool {
    let mut tokens = s.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(is_valid_range_token)
}

fn is_valid_range_token(token: &str) -> bool {
    let version = COMPARATORS
        .iter()
        .find_map(|cmp| token.strip_prefix(cmp))
        .unwrap_or(token);
    is_valid_semver(version)
}

/// Split a `id@range` dependency reference on the *last* `@`, so
/// future scoped ids containing `@` keep working.
#[must_use]
pub fn split_dependency(s: &str) -> Option<(&str, &str)> {
    s.rsplit_once('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_pattern() {
        assert!(is_valid_id("a"));
        assert!(is_valid_id("log-work"));
        assert!(is_valid_id("ops/log-work"));
        assert!(is_valid_id("a1/b2-c3/d"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("Upper"));
        assert!(!is_valid_id("a--b"));
        assert!(!is_valid_id("a/"));
        assert!(!is_valid_id("/a"));
        assert!(!is_valid_id("a_b"));
        assert!(!is_valid_id("-a"));
    }

    #[test]
    fn semver_grammar() {
        assert!(is_valid_semver("0.1.0"));
        assert!(is_valid_semver("1.2.3-alpha.1"));
        assert!(is_valid_semver("1.2.3+build.5"));
        assert!(!is_valid_semver("1.2"));
        assert!(!is_valid_semver("v1.2.3"));
        assert!(!is_valid_semver("not-a-range"));
    }

    #[test]
    fn calendar_dates() {
        assert!(is_valid_date("2026-01-31"));
        assert!(is_valid_date("2024-02-29")); // leap year
        assert!(!is_valid_date("2026-02-29"));
        assert!(!is_valid_date("2026-04-31"));
        assert!(!is_valid_date("2026-13-01"));
        assert!(!is_valid_date("2026-00-10"));
        assert!(!is_valid_date("2026-1-2"));
        assert!(!is_valid_date("yesterday"));
    }

    #[test]
    fn datetimes_with_offsets() {
        assert!(is_valid_datetime("2026-01-02T03:04:05Z"));
        assert!(is_valid_datetime("2026-01-02T03:04:05+05:30"));
        assert!(is_valid_datetime("2026-01-02T23:59:59-08:00"));
        assert!(!is_valid_datetime("2026-01-02T24:00:00Z"));
        assert!(!is_valid_datetime("2026-01-02T03:60:00Z"));
        assert!(!is_valid_datetime("2026-01-02 03:04:05"));
        assert!(!is_valid_datetime("2026-01-02"));
    }

    #[test]
    fn version_ranges() {
        assert!(is_valid_range("^1.0.0"));
        assert!(is_valid_range("~0.2.1"));
        assert!(is_valid_range(">=1.0.0 <2.0.0"));
        assert!(is_valid_range("=1.2.3"));
        assert!(is_valid_range("1.2.3"));
        assert!(!is_valid_range(""));
        assert!(!is_valid_range("   "));
        assert!(!is_valid_range("not-a-range"));
        assert!(!is_valid_range("^1.0"));
        assert!(!is_valid_range(">=1.0.0 oops"));
    }

    #[test]
    fn dependency_split_uses_last_at() {
        assert_eq!(split_dependency("a/b@^1.0.0"), Some(("a/b", "^1.0.0")));
        assert_eq!(split_dependency("a@b@1.0.0"), Some(("a@b", "1.0.0")));
        assert_eq!(split_dependency("no-range"), None);
    }
}
