//! Date phrase resolution
//!
//! Turns phrases like "tomorrow", "on the 22nd", "next Monday" or
//! "from the 14th to the 18th of April" into a concrete date relative to a
//! caller-supplied `now`.
//!
//! Rules are tried in the order of [`RULES`]; the first one that matches
//! wins. Everything here assumes the utterance is about the future, so a
//! bare day number that already passed this month means next month.
//!
//! Resolved dates keep `now`'s time of day.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Month names, index + 1 is the month number.
pub(crate) const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Weekday names, index is days from Sunday.
pub(crate) const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

pub(crate) static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", MONTH_NAMES.join("|"))).expect("valid month regex")
});

pub(crate) static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})s?\b", WEEKDAY_NAMES.join("|"))).expect("valid weekday regex")
});

static NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnext\b").expect("valid next regex"));

pub(crate) static DAY_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:from|between)\s+(?:the\s+)?(\d{1,2})(?:st|nd|rd|th)?\s*(?:to|until|and|through|-)\s*(?:the\s+)?(\d{1,2})(?:st|nd|rd|th)?\b",
    )
    .expect("valid day range regex")
});

/// Group 1: `on/by/for [the]` or `the`; group 2: day; group 3: ordinal suffix.
static SPECIFIC_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:on|by|for)\s+(?:the\s+)?|the\s+)?(\d{1,2})(st|nd|rd|th)?\b(?:\s+of\b)?")
        .expect("valid specific day regex")
});

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})\b").expect("valid numeric date regex")
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = MONTH_NAMES.join("|");
    Regex::new(&format!(
        r"(?i)\b(?:({months})\s+(\d{{1,2}})(?:st|nd|rd|th)?|(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({months}))\b"
    ))
    .expect("valid month day regex")
});

static BARE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("valid bare day regex"));

/// A resolution rule: `Some(date)` when it recognizes the (lower-cased) phrase.
type Rule = fn(&str, NaiveDateTime) -> Option<NaiveDateTime>;

/// Resolution cascade, highest priority first.
pub const RULES: &[(&str, Rule)] = &[
    ("relative_keyword", relative_keyword),
    ("day_range", day_range),
    ("specific_day", specific_day),
    ("weekday", weekday),
    ("numeric_date", numeric_date),
    ("month_day", month_day),
    ("bare_day", bare_day),
];

/// Resolve a date phrase against `now`. Falls back to `now`.
pub fn resolve(phrase: &str, now: NaiveDateTime) -> NaiveDateTime {
    match match_rule(phrase, now) {
        Some((rule, date)) => {
            tracing::debug!(rule, phrase, %date, "Resolved date phrase");
            date
        }
        None => {
            tracing::debug!(phrase, "No date rule matched, using now");
            now
        }
    }
}

/// Run the cascade and report which rule matched.
pub fn match_rule(phrase: &str, now: NaiveDateTime) -> Option<(&'static str, NaiveDateTime)> {
    let lower = phrase.to_lowercase();
    RULES
        .iter()
        .find_map(|(name, rule)| rule(&lower, now).map(|date| (*name, date)))
}

/// True when the text names a date more specifically than a lone number.
pub fn has_date_expression(text: &str, now: NaiveDateTime) -> bool {
    matches!(match_rule(text, now), Some((rule, _)) if rule != "bare_day")
}

/// First month named anywhere in the text (1-based).
pub(crate) fn find_month(text: &str) -> Option<u32> {
    MONTH_RE
        .captures(text)
        .and_then(|caps| month_number(&caps[1]))
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

fn weekday_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    WEEKDAY_NAMES
        .iter()
        .position(|d| *d == name)
        .map(|i| i as u32)
}

/// Last valid day of the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Build a date, clamping the day to the month's length.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

/// Day `day` of `month` (default: `now`'s month). A day that already passed
/// in the current month rolls to next month.
fn upcoming_day(now: NaiveDateTime, day: u32, month: Option<u32>) -> Option<NaiveDateTime> {
    if !(1..=31).contains(&day) {
        return None;
    }

    let mut year = now.year();
    let mut month = month.unwrap_or_else(|| now.month());

    if day < now.day() && month == now.month() {
        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }

    clamped_date(year, month, day).map(|date| date.and_time(now.time()))
}

fn parse_day(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

/// The digits at `end` continue a numeric date or a clock time.
fn continues_number(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    matches!(
        (rest.next(), rest.next()),
        (Some('/' | '-' | ':' | '.'), Some(c)) if c.is_ascii_digit()
    )
}

fn is_clock_time(text: &str, end: usize) -> bool {
    let rest = text[end..].trim_start();
    rest.starts_with("am") || rest.starts_with("pm") || rest.starts_with("o'clock")
}

// ============================================
// Rules
// ============================================

fn relative_keyword(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if text.contains("today") {
        Some(now)
    } else if text.contains("tomorrow") {
        now.checked_add_days(Days::new(1))
    } else if text.contains("next week") {
        now.checked_add_days(Days::new(7))
    } else {
        None
    }
}

fn day_range(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = DAY_RANGE_RE.captures(text)?;
    let start = parse_day(&caps, 1)?;
    upcoming_day(now, start, find_month(text))
}

fn specific_day(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    SPECIFIC_DAY_RE.captures_iter(text).find_map(|caps| {
        let qualified = caps.get(1).is_some() || caps.get(3).is_some();
        let digits = caps.get(2)?;
        if !qualified || continues_number(text, digits.end()) {
            return None;
        }
        upcoming_day(now, parse_day(&caps, 2)?, find_month(text))
    })
}

fn weekday(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = WEEKDAY_RE.captures(text)?;
    let target = weekday_number(&caps[1])? as i64;
    let today = now.weekday().num_days_from_sunday() as i64;

    let mut days_to_add = target - today;
    if days_to_add <= 0 {
        days_to_add += 7;
    }
    if NEXT_RE.is_match(text) && target != today {
        days_to_add += 7;
    }

    now.checked_add_days(Days::new(days_to_add as u64))
}

fn numeric_date(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    NUMERIC_DATE_RE.captures_iter(text).find_map(|caps| {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year_digits = &caps[3];
        let mut year: i32 = year_digits.parse().ok()?;
        if year_digits.len() == 2 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(now.time()))
    })
}

fn month_day(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    MONTH_DAY_RE.captures_iter(text).find_map(|caps| {
        let (month, day) = match (caps.get(1), caps.get(4)) {
            (Some(month), _) => (month_number(month.as_str())?, parse_day(&caps, 2)?),
            (None, Some(month)) => (month_number(month.as_str())?, parse_day(&caps, 3)?),
            (None, None) => return None,
        };
        if !(1..=31).contains(&day) {
            return None;
        }
        clamped_date(now.year(), month, day).map(|date| date.and_time(now.time()))
    })
}

fn bare_day(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    BARE_DAY_RE.captures_iter(text).find_map(|caps| {
        let digits = caps.get(1)?;
        if continues_number(text, digits.end()) || is_clock_time(text, digits.end()) {
            return None;
        }
        if text[..digits.start()].ends_with(['$', ':', '/', '.']) {
            return None;
        }
        upcoming_day(now, digits.as_str().parse().ok()?, None)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    /// Monday, October 19 2026, 10:30
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "relative_keyword",
                "day_range",
                "specific_day",
                "weekday",
                "numeric_date",
                "month_day",
                "bare_day",
            ]
        );
    }

    #[test]
    fn test_relative_keywords() {
        assert_eq!(resolve("today", now()), now());
        assert_eq!(resolve("Tomorrow at noon", now()), now() + chrono::Duration::days(1));
        assert_eq!(resolve("sometime next week", now()), now() + chrono::Duration::days(7));
    }

    #[test]
    fn test_tomorrow_wins_over_everything_else() {
        for phrase in [
            "tomorrow on the 3rd",
            "from the 5th to the 9th, starting tomorrow",
            "friday or tomorrow",
            "12/25/2026 no wait tomorrow",
        ] {
            assert_eq!(resolve(phrase, now()), now() + chrono::Duration::days(1), "{phrase}");
        }
    }

    #[test]
    fn test_day_range_uses_start_day() {
        let date = resolve("from the 22nd to the 25th", now());
        assert_eq!(date.date(), ymd(2026, 10, 22));
        assert_eq!(date.time(), now().time());
    }

    #[test]
    fn test_day_range_with_month_name() {
        let date = resolve("between 14 and 18 of December", now());
        assert_eq!(date.date(), ymd(2026, 12, 14));
    }

    #[test]
    fn test_day_range_rolls_past_day_to_next_month() {
        let date = resolve("from the 3rd through the 6th", now());
        assert_eq!(date.date(), ymd(2026, 11, 3));
    }

    #[test]
    fn test_specific_day() {
        assert_eq!(resolve("on the 22nd", now()).date(), ymd(2026, 10, 22));
        assert_eq!(resolve("due by the 19th", now()).date(), ymd(2026, 10, 19));
        assert_eq!(resolve("the 2nd of november", now()).date(), ymd(2026, 11, 2));
    }

    #[test]
    fn test_specific_day_rollover_wraps_year() {
        let december = ymd(2026, 12, 20).and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(resolve("on the 5th", december).date(), ymd(2027, 1, 5));
    }

    #[test]
    fn test_specific_day_clamps_to_month_length() {
        let late = ymd(2026, 1, 31).and_hms_opt(8, 0, 0).unwrap();
        // 30 < 31 rolls to February, which only has 28 days in 2026
        assert_eq!(resolve("on the 30th", late).date(), ymd(2026, 2, 28));
    }

    #[test]
    fn test_weekday_resolves_to_next_occurrence() {
        // now is a Monday
        assert_eq!(now().weekday(), Weekday::Mon);
        assert_eq!(resolve("wednesday", now()).date(), ymd(2026, 10, 21));
        assert_eq!(resolve("monday", now()).date(), ymd(2026, 10, 26));
        assert_eq!(resolve("sunday brunch", now()).date(), ymd(2026, 10, 25));
    }

    #[test]
    fn test_next_weekday_skips_a_week() {
        assert_eq!(resolve("next wednesday", now()).date(), ymd(2026, 10, 28));
        // same weekday as today: "next" adds nothing extra
        assert_eq!(resolve("next monday", now()).date(), ymd(2026, 10, 26));
    }

    #[test]
    fn test_this_weekday_equals_bare_weekday() {
        assert_eq!(resolve("this friday", now()), resolve("friday", now()));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(resolve("12/25/2026", now()).date(), ymd(2026, 12, 25));
        assert_eq!(resolve("3-7-27", now()).date(), ymd(2027, 3, 7));
        assert_eq!(resolve("on 1/2/2027", now()).date(), ymd(2027, 1, 2));
    }

    #[test]
    fn test_invalid_numeric_date_falls_through() {
        assert_eq!(resolve("13/45/2026", now()), now());
    }

    #[test]
    fn test_month_day_either_order() {
        assert_eq!(resolve("April 15", now()).date(), ymd(2026, 4, 15));
        assert_eq!(resolve("15th of April", now()).date(), ymd(2026, 4, 15));
        assert_eq!(resolve("march 3", now()).date(), ymd(2026, 3, 3));
    }

    #[test]
    fn test_bare_day_rollover() {
        assert_eq!(resolve("25", now()).date(), ymd(2026, 10, 25));
        assert_eq!(resolve("dentist 4", now()).date(), ymd(2026, 11, 4));
    }

    #[test]
    fn test_bare_day_property_past_days_land_next_month() {
        for day in 1..now().day() {
            let date = resolve(&day.to_string(), now());
            assert_eq!((date.year(), date.month()), (2026, 11), "day {day}");
        }
        let december = ymd(2026, 12, 28).and_hms_opt(8, 0, 0).unwrap();
        for day in 1..28 {
            let date = resolve(&day.to_string(), december);
            assert_eq!((date.year(), date.month()), (2027, 1), "day {day}");
        }
    }

    #[test]
    fn test_clock_times_are_not_days() {
        assert_eq!(resolve("at 3pm", now()), now());
        assert_eq!(resolve("at 3:30", now()), now());
    }

    #[test]
    fn test_fallback_is_now() {
        assert_eq!(resolve("whenever works", now()), now());
        assert_eq!(resolve("", now()), now());
    }

    #[test]
    fn test_has_date_expression() {
        assert!(has_date_expression("lunch on friday", now()));
        assert!(has_date_expression("on the 22nd", now()));
        assert!(!has_date_expression("I have 3 kids", now()));
        assert!(!has_date_expression("hello there", now()));
    }
}
