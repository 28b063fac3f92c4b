//! Formatting helpers for user-facing response text.

use chrono::NaiveDateTime;

/// Format an amount as whole US dollars (e.g., "$1,800").
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}", sign, grouped)
}

/// Format a rate with a percent sign (e.g., "6.5%").
pub fn format_percent(rate: f64) -> String {
    format!("{}%", rate)
}

/// Format a term in years (e.g., "30 years", "1 year").
pub fn format_years(years: u32) -> String {
    if years == 1 {
        "1 year".to_string()
    } else {
        format!("{} years", years)
    }
}

/// Format a calendar date for confirmations (e.g., "Thursday, October 22, 2026").
pub fn format_event_date(date: NaiveDateTime) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
