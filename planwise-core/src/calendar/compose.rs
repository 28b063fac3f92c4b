//! Utterance to calendar event
//!
//! Splits an utterance like "put dance recital on the 22nd" into a title
//! ("Dance recital"), a category, and a date phrase ("on the 22nd") that
//! [`date_text::resolve`] turns into a date. Recurrence phrases ("every
//! week until December 1") are picked up alongside.

use super::date_text::{self, DAY_RANGE_RE, MONTH_NAMES, WEEKDAY_NAMES};
use crate::types::{CalendarEvent, EventCategory, RecurringFrequency};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// Title used when nothing better can be extracted
pub const DEFAULT_TITLE: &str = "Calendar Event";

const MAX_TITLE_CHARS: usize = 100;

/// An event built from an utterance, plus the recurrence it asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedEvent {
    pub event: CalendarEvent,
    /// The slice of the utterance the date was resolved from
    pub date_phrase: String,
    pub frequency: RecurringFrequency,
    pub end_date: Option<NaiveDateTime>,
}

static DIRECT_OBJECT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:put|add)\s+(.+?)\s+(?:on|to|in|into)\s+(?:my\s+|the\s+|our\s+)?calendar\b",
        r"(?i)\bschedule\s+(.+?)\s+(?:for|on|at|next|this|tomorrow|today)\b",
        r"(?i)\bremind\s+me\s+(?:to|about)\s+(.+?)(?:\s+(?:on|at|for|by|next|this|tomorrow|today|every)\b|[.!?]?$)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid title regex"))
    .collect()
});

/// Words that end the title part of an utterance.
static TITLE_INDICATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s+(?:on|for|at|by|this|next|every|from|between|starting|tomorrow|today|tonight)\b",
    )
    .expect("valid title indicator regex")
});

static TEMPORAL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:{}|{}|tomorrow|today|tonight)\b|\d",
        WEEKDAY_NAMES.join("|"),
        MONTH_NAMES.join("|")
    ))
    .expect("valid temporal keyword regex")
});

static LEADING_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:please|can you|could you|i need to|i want to|i have|i've got|put|add|schedule|create|set up|book|plan|remind me to|remind me about|next week|this week|a|an|the|my|our|on|for|at|by|in|this|next|every|today|tomorrow|tonight)(?:\s+|$)",
    )
    .expect("valid leading noise regex")
});

/// Words that start the date part of an utterance.
static DATE_INDICATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:on|for|by|this|next|every|from|between|starting|tomorrow|today|tonight)\b",
    )
    .expect("valid date indicator regex")
});

static DATE_CUTOFF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:at|with|because|every|until)\b").expect("valid date cutoff regex")
});

static TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+to\b").expect("valid to regex"));

static DAY_BEFORE_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d(?:st|nd|rd|th)?$").expect("valid day end regex"));

static DAY_AFTER_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+(?:the\s+)?\d").expect("valid day start regex"));

static STUDY_REQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:study|learning)\s+(?:schedule|plan)\b").expect("valid study regex")
});

static WEEK_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bweek\s+of\s+({})\s+(\d{{1,2}})(?:st|nd|rd|th)?\s*(?:-|to|through)\s*(\d{{1,2}})(?:st|nd|rd|th)?",
        MONTH_NAMES.join("|")
    ))
    .expect("valid week range regex")
});

static UNTIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\buntil\s+([^.!?]+)").expect("valid until regex"));

/// Frequency phrases, checked in order.
static FREQUENCY_RULES: LazyLock<Vec<(RecurringFrequency, Regex)>> = LazyLock::new(|| {
    [
        (
            RecurringFrequency::Daily,
            r"(?i)\b(?:every\s+day|each\s+day|daily)\b".to_string(),
        ),
        (
            RecurringFrequency::Biweekly,
            r"(?i)\b(?:every\s+other\s+week|every\s+two\s+weeks|bi-?weekly|fortnightly)\b"
                .to_string(),
        ),
        (
            RecurringFrequency::Monthly,
            r"(?i)\b(?:every\s+month|each\s+month|monthly)\b".to_string(),
        ),
        (
            RecurringFrequency::Weekly,
            format!(
                r"(?i)\b(?:every\s+week|each\s+week|weekly|every\s+(?:{})s?)\b",
                WEEKDAY_NAMES.join("|")
            ),
        ),
    ]
    .into_iter()
    .map(|(frequency, pattern)| {
        (
            frequency,
            Regex::new(&pattern).expect("valid frequency regex"),
        )
    })
    .collect()
});

/// Category keyword sets, checked in order. Keywords match at a word start.
static CATEGORY_RULES: LazyLock<Vec<(EventCategory, Regex)>> = LazyLock::new(|| {
    [
        (
            EventCategory::Finance,
            &[
                "bill", "payment", "pay", "rent", "tax", "bank", "budget", "invoice",
                "mortgage", "loan", "insurance", "paycheck",
            ][..],
        ),
        (
            EventCategory::Health,
            &[
                "doctor", "dentist", "gym", "workout", "therapy", "therapist", "medical",
                "checkup", "check-up", "hospital", "medication", "clinic", "yoga", "physio",
            ][..],
        ),
        (
            EventCategory::Career,
            &[
                "meeting", "interview", "work", "deadline", "presentation", "conference",
                "client", "standup", "office", "review",
            ][..],
        ),
        (
            EventCategory::Learning,
            &[
                "study", "class", "exam", "test", "lecture", "course", "homework", "lesson",
                "learn", "tutor", "school",
            ][..],
        ),
    ]
    .into_iter()
    .map(|(category, words)| {
        let pattern = format!(r"(?i)\b(?:{})", words.join("|"));
        (category, Regex::new(&pattern).expect("valid category regex"))
    })
    .collect()
});

/// Build an event from an utterance. `None` for blank input.
pub fn compose(text: &str, now: NaiveDateTime) -> Option<ComposedEvent> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let title = truncate_title(&extract_title(text));
    let mut category = categorize(text);
    let mut description = Some(text.to_string());

    let date_phrase = match study_week(text) {
        Some((phrase, week_description)) => {
            category = EventCategory::Learning;
            description = Some(week_description);
            phrase
        }
        None => extract_date_phrase(text),
    };

    let date = date_text::resolve(&date_phrase, now);
    let frequency = detect_frequency(text);
    let end_date = match frequency {
        RecurringFrequency::None => None,
        _ => detect_end_date(text, now),
    };

    let mut event = CalendarEvent::new(title, category, date);
    event.description = description;

    tracing::debug!(
        title = %event.title,
        category = category.as_str(),
        date_phrase = %date_phrase,
        frequency = frequency.as_str(),
        "Composed calendar event"
    );

    Some(ComposedEvent {
        event,
        date_phrase,
        frequency,
        end_date,
    })
}

/// Title cascade: direct object, text before an indicator word, text before
/// a temporal keyword, then [`DEFAULT_TITLE`].
pub fn extract_title(text: &str) -> String {
    let direct = DIRECT_OBJECT_RES
        .iter()
        .find_map(|re| re.captures(text).map(|caps| clean_title(&caps[1])));

    let candidates = [
        direct,
        TITLE_INDICATOR_RE
            .find(text)
            .map(|m| clean_title(&text[..m.start()])),
        TEMPORAL_KEYWORD_RE
            .find(text)
            .map(|m| clean_title(&text[..m.start()])),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn clean_title(raw: &str) -> String {
    let mut title = raw
        .trim()
        .trim_end_matches(['.', ',', '!', '?', ':', ';', '$', '€', '£'])
        .trim();
    while let Some(m) = LEADING_NOISE_RE.find(title) {
        title = title[m.end()..].trim_start();
    }

    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
    format!("{}...", head.trim_end())
}

/// First matching category, defaulting to general.
pub fn categorize(text: &str) -> EventCategory {
    CATEGORY_RULES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

/// Study schedule requests prefer a `week of April 14-18` range.
/// Returns the date phrase for the start of the week and a description.
fn study_week(text: &str) -> Option<(String, String)> {
    if !STUDY_REQUEST_RE.is_match(text) {
        return None;
    }
    let caps = WEEK_RANGE_RE.captures(text)?;
    let month = capitalize(&caps[1]);
    Some((
        format!("{} {}", month, &caps[2]),
        format!("Study week of {} {}-{}", month, &caps[2], &caps[3]),
    ))
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Date phrase cascade: explicit day range, slice from the first indicator
/// word trimmed at cutoff words, then the whole text.
pub fn extract_date_phrase(text: &str) -> String {
    if let Some(range) = DAY_RANGE_RE.find(text) {
        let mut phrase = range.as_str().to_string();
        if let Some(month) = date_text::find_month(text) {
            if date_text::find_month(&phrase).is_none() {
                phrase.push(' ');
                phrase.push_str(MONTH_NAMES[month as usize - 1]);
            }
        }
        return phrase;
    }

    if let Some(indicator) = DATE_INDICATOR_RE.find(text) {
        let slice = &text[indicator.start()..];
        let phrase = trim_at_cutoff(slice);
        if !phrase.is_empty() {
            return phrase.to_string();
        }
    }

    text.to_string()
}

fn trim_at_cutoff(slice: &str) -> &str {
    let mut end = slice.len();

    if let Some(cut) = DATE_CUTOFF_RE.find(slice) {
        end = end.min(cut.start());
    }

    // "to" ends the phrase unless it joins two days ("the 14th to the 18th")
    for to in TO_RE.find_iter(slice) {
        let joins_days = DAY_BEFORE_TO_RE.is_match(&slice[..to.start()])
            && DAY_AFTER_TO_RE.is_match(&slice[to.end()..]);
        if !joins_days {
            end = end.min(to.start());
            break;
        }
    }

    slice[..end].trim().trim_end_matches(['.', ',', '!', '?'])
}

/// Recurrence named in the text, or [`RecurringFrequency::None`].
pub fn detect_frequency(text: &str) -> RecurringFrequency {
    FREQUENCY_RULES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(frequency, _)| *frequency)
        .unwrap_or_default()
}

/// End date from an `until <date>` phrase, when it resolves.
pub fn detect_end_date(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = UNTIL_RE.captures(text)?;
    date_text::match_rule(caps[1].trim(), now).map(|(_, date)| date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    /// Monday, October 19 2026
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_dance_recital_round_trip() {
        let composed = compose("Dance recital on the 22nd", now()).unwrap();
        assert_eq!(composed.event.title, "Dance recital");
        assert_eq!(composed.event.date.day(), 22);
        assert_eq!(composed.date_phrase, "on the 22nd");
        assert_eq!(composed.frequency, RecurringFrequency::None);
    }

    #[test]
    fn test_day_22_survives_month_rollover() {
        let late = NaiveDate::from_ymd_opt(2026, 10, 28)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let composed = compose("Dance recital on the 22nd", late).unwrap();
        assert_eq!(composed.event.date.day(), 22);
        assert_eq!(composed.event.date.month(), 11);
    }

    #[test]
    fn test_direct_object_titles() {
        assert_eq!(
            extract_title("put dance recital on my calendar for the 22nd"),
            "Dance recital"
        );
        assert_eq!(
            extract_title("Add the quarterly review to calendar next friday"),
            "Quarterly review"
        );
        assert_eq!(
            extract_title("schedule a dentist appointment for next tuesday"),
            "Dentist appointment"
        );
        assert_eq!(
            extract_title("remind me to call the bank tomorrow"),
            "Call the bank"
        );
    }

    #[test]
    fn test_indicator_split_strips_command_words() {
        assert_eq!(extract_title("put dance recital on the 22nd"), "Dance recital");
        assert_eq!(extract_title("Team lunch at noon"), "Team lunch");
    }

    #[test]
    fn test_temporal_keyword_fallback() {
        assert_eq!(extract_title("Dentist Friday 3pm"), "Dentist");
        // a currency sign before the cut digit is dropped
        assert_eq!(
            extract_title("Eventually I want to invest $500 in stocks"),
            "Eventually I want to invest"
        );
    }

    #[test]
    fn test_default_title() {
        assert_eq!(extract_title("tomorrow"), DEFAULT_TITLE);
        assert_eq!(extract_title("on the 5th"), DEFAULT_TITLE);
    }

    #[test]
    fn test_title_is_truncated_with_ellipsis() {
        let long = format!("{} on friday", "x".repeat(150));
        let composed = compose(&long, now()).unwrap();
        assert_eq!(composed.event.title.chars().count(), 100);
        assert!(composed.event.title.ends_with("..."));
    }

    #[test]
    fn test_category_cascade_order() {
        assert_eq!(categorize("pay rent on the 1st"), EventCategory::Finance);
        assert_eq!(categorize("dentist on friday"), EventCategory::Health);
        assert_eq!(categorize("client meeting monday"), EventCategory::Career);
        assert_eq!(categorize("chemistry exam on the 3rd"), EventCategory::Learning);
        assert_eq!(categorize("dance recital"), EventCategory::General);
        // finance is checked before career
        assert_eq!(categorize("budget review meeting"), EventCategory::Finance);
    }

    #[test]
    fn test_date_phrase_trims_at_cutoffs() {
        assert_eq!(
            extract_date_phrase("Dentist for next friday at 3pm with Dr. Lee"),
            "for next friday"
        );
        assert_eq!(
            extract_date_phrase("Gym on monday because leg day"),
            "on monday"
        );
        assert_eq!(
            extract_date_phrase("Drive on saturday to the lake"),
            "on saturday"
        );
    }

    #[test]
    fn test_date_phrase_keeps_day_range_to() {
        assert_eq!(
            extract_date_phrase("Conference on the 14th to the 18th at the hotel"),
            "on the 14th to the 18th"
        );
    }

    #[test]
    fn test_date_phrase_explicit_range_picks_up_month() {
        let phrase = extract_date_phrase("Vacation in December from the 20th to the 27th");
        assert_eq!(phrase, "from the 20th to the 27th december");
        let composed = compose("Vacation in December from the 20th to the 27th", now()).unwrap();
        assert_eq!(composed.event.date.date(), NaiveDate::from_ymd_opt(2026, 12, 20).unwrap());
    }

    #[test]
    fn test_date_phrase_whole_text_fallback() {
        assert_eq!(extract_date_phrase("Dentist Friday 3pm"), "Dentist Friday 3pm");
    }

    #[test]
    fn test_study_schedule_prefers_week_range() {
        let composed = compose(
            "Create a study schedule for the week of April 14-18",
            now(),
        )
        .unwrap();
        assert_eq!(composed.event.title, "Study schedule");
        assert_eq!(composed.event.category, EventCategory::Learning);
        assert_eq!(composed.date_phrase, "April 14");
        assert_eq!(
            composed.event.date.date(),
            NaiveDate::from_ymd_opt(2026, 4, 14).unwrap()
        );
        assert_eq!(
            composed.event.description.as_deref(),
            Some("Study week of April 14-18")
        );
    }

    #[test]
    fn test_detect_frequency() {
        assert_eq!(detect_frequency("yoga every day"), RecurringFrequency::Daily);
        assert_eq!(detect_frequency("standup daily at 9"), RecurringFrequency::Daily);
        assert_eq!(detect_frequency("payroll every other week"), RecurringFrequency::Biweekly);
        assert_eq!(detect_frequency("book club monthly"), RecurringFrequency::Monthly);
        assert_eq!(detect_frequency("piano every Tuesday"), RecurringFrequency::Weekly);
        assert_eq!(detect_frequency("1:1 weekly"), RecurringFrequency::Weekly);
        assert_eq!(detect_frequency("dance recital"), RecurringFrequency::None);
    }

    #[test]
    fn test_recurring_utterance() {
        let composed = compose("Piano lesson every tuesday until December 1", now()).unwrap();
        assert_eq!(composed.event.title, "Piano lesson");
        assert_eq!(composed.frequency, RecurringFrequency::Weekly);
        assert_eq!(composed.date_phrase, "every tuesday");
        assert_eq!(
            composed.event.date.date(),
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
        );
        assert_eq!(
            composed.end_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2026, 12, 1)
        );
    }

    #[test]
    fn test_blank_input() {
        assert!(compose("   ", now()).is_none());
    }
}
