//! Financial entity extraction
//!
//! Every field has its own ordered list of patterns anchored on cue words
//! ("rent", "salary", "down payment", ...). Fields are independent, so one
//! utterance can fill several. A field nobody mentions stays `None`.
//!
//! Amounts accept an optional `$` and comma thousands separators. An
//! amount directly followed by `%` or a year unit is a rate or a term, not
//! money, and is skipped.

use crate::types::ExtractedFinancialData;
use regex::Regex;
use std::sync::LazyLock;

/// Category assigned to rent when it is recorded as an expense
pub const HOUSING_CATEGORY: &str = "Housing";

/// Money amount: `1,800`, `1800`, `1800.50`
const AMOUNT: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";

/// Up to 20 characters between a cue word and its number, never a digit or `$`
const GAP: &str = r"[^$\d]{0,20}?";

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid extraction regex"))
        .collect()
}

static INCOME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[format!(
        r"\b(?:income|salary|make|earn)\w*\b{GAP}\$?\s?{AMOUNT}"
    )])
});

static RENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:rent|lease|apartment|housing)\w*\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\bapartment\s+that\s+(?:will\s+be|is|costs?)\s+\$?\s?{AMOUNT}"),
    ])
});

/// Last resort for rent, only tried when the text talks about rent at all
static MONTHLY_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\$?\s?{AMOUNT}\s*(?:per|a|/)\s*month"))
        .expect("valid monthly amount regex")
});

static MENTIONS_RENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:apartment|rent)").expect("valid rent mention regex")
});

static EXPENSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:spend|expense|cost|pay|budget)\w*\b{GAP}\$?\s?{AMOUNT}[^.,!?\d]{{0,20}}?\b(?:for|on)\s+([^.,!?\n]+)"
    ))
    .expect("valid expense regex")
});

static HOME_PRICE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:home|house|property)\s+(?:price|cost|worth|value)\w*\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\$\s?{AMOUNT}\s+(?:home|house|property)\b"),
        format!(r"\b(?:home|house|property)\s+(?:for|at|priced\s+at|that\s+costs?)\s+\$\s?{AMOUNT}"),
    ])
});

static DOWN_PAYMENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\bdown\s*-?\s*payments?\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\$?\s?{AMOUNT}\s+down\b"),
    ])
});

static LOAN_AMOUNT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:loan|borrow)\w*\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\$\s?{AMOUNT}\s+loan\b"),
    ])
});

static INTEREST_RATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:interest|rate)\w*\b{GAP}(\d+(?:\.\d+)?)\s*%?"),
        r"(\d+(?:\.\d+)?)\s*(?:%|percent)\s+(?:interest|apr|rate)\b".to_string(),
        format!(r"\bapr\b{GAP}(\d+(?:\.\d+)?)\s*%?"),
    ])
});

static LOAN_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*-?\s*(?:years?|yrs?)\b(\s+old\b)?").expect("valid loan term regex")
});

static DEBT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:debt|owe)\w*\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\$\s?{AMOUNT}\s+(?:in|of)\s+(?:credit\s+card\s+|student\s+loan\s+)?debt\b"),
    ])
});

static SAVINGS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"\b(?:saved|savings)\b{GAP}\$?\s?{AMOUNT}"),
        format!(r"\$?\s?{AMOUNT}\s+(?:saved|in\s+savings)\b"),
    ])
});

static RETIREMENT_AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bretire(?:ment|d)?\s+(?:at|age)\s+(?:age\s+)?(\d{2,3})\b")
        .expect("valid retirement age regex")
});

static NOT_MONEY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:%|percent\b|-?\s*(?:years?|yrs?)\b)").expect("valid suffix regex")
});

/// A number followed by a year unit is a term, never a rate
static TERM_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*-?\s*(?:years?|yrs?)\b").expect("valid term suffix regex")
});

/// Extract every financial field mentioned in `text`.
pub fn extract(text: &str) -> ExtractedFinancialData {
    let mut data = ExtractedFinancialData {
        income: first_amount(&INCOME_RES, text),
        ..Default::default()
    };

    if let Some(rent) = extract_rent(text) {
        data.rent = Some(rent);
        data.expense = Some(rent);
        data.expense_category = Some(HOUSING_CATEGORY.to_string());
    }

    // Evaluated after rent so an explicit category wins
    if let Some((amount, category)) = extract_expense(text) {
        data.expense = Some(amount);
        data.expense_category = Some(category);
    }

    data.home_price = first_amount(&HOME_PRICE_RES, text);
    data.down_payment = first_amount(&DOWN_PAYMENT_RES, text);
    data.loan_amount = first_amount(&LOAN_AMOUNT_RES, text);
    data.interest_rate = INTEREST_RATE_RES.iter().find_map(|re| rate_in(re, text));
    data.loan_term = extract_loan_term(text);
    data.debt_amount = first_amount(&DEBT_RES, text);
    data.savings_amount = first_amount(&SAVINGS_RES, text);
    data.retirement_age = RETIREMENT_AGE_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok());

    if !data.is_empty() {
        tracing::debug!(extracted = ?data, "Extracted financial fields");
    }

    data
}

/// Parse "1,800.50" as 1800.5.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// First money amount any of `patterns` captures in group 1.
fn first_amount(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns
        .iter()
        .find_map(|re| amount_in(re, text))
}

fn amount_in(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text).find_map(|caps| {
        let amount = caps.get(1)?;
        if NOT_MONEY_SUFFIX_RE.is_match(&text[amount.end()..]) {
            return None;
        }
        parse_amount(amount.as_str())
    })
}

fn rate_in(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text).find_map(|caps| {
        let rate = caps.get(1)?;
        if TERM_SUFFIX_RE.is_match(&text[rate.end()..]) {
            return None;
        }
        rate.as_str().parse().ok()
    })
}

fn extract_rent(text: &str) -> Option<f64> {
    first_amount(&RENT_RES, text).or_else(|| {
        if MENTIONS_RENT_RE.is_match(text) {
            amount_in(&MONTHLY_AMOUNT_RE, text)
        } else {
            None
        }
    })
}

fn extract_expense(text: &str) -> Option<(f64, String)> {
    EXPENSE_RE.captures_iter(text).find_map(|caps| {
        let amount = caps.get(1)?;
        if NOT_MONEY_SUFFIX_RE.is_match(&text[amount.end()..]) {
            return None;
        }
        let category = caps.get(2)?.as_str().trim();
        if category.is_empty() {
            return None;
        }
        Some((parse_amount(amount.as_str())?, category.to_string()))
    })
}

fn extract_loan_term(text: &str) -> Option<u32> {
    LOAN_TERM_RE.captures_iter(text).find_map(|caps| {
        // "35 years old" is an age, not a term
        if caps.get(2).is_some() {
            return None;
        }
        caps[1].parse().ok()
    })
}
