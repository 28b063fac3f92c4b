//! Keyword cascade mapping an utterance to one [`FinanceIntent`]
//!
//! Keywords match at a word start, so `invest` catches "investing" while
//! `rent` leaves "current" alone. The first intent with a hit wins.

use super::extract::extract;
use crate::types::FinanceIntent;
use regex::Regex;
use std::sync::LazyLock;

/// Intent keyword table, in precedence order
pub const CASCADE: &[(FinanceIntent, &[&str])] = &[
    (
        FinanceIntent::Budget,
        &[
            "budget",
            "spending",
            "track expense",
            "rent",
            "lease",
            "apartment",
            "housing",
        ],
    ),
    (
        FinanceIntent::Mortgage,
        &["mortgage", "home buy", "house payment"],
    ),
    (FinanceIntent::Tax, &["tax", "fica", "income tax"]),
    (FinanceIntent::Investment, &["invest", "stock", "portfolio"]),
    (FinanceIntent::Loan, &["loan", "compare", "interest rate"]),
    (
        FinanceIntent::Retirement,
        &["retire", "future plan", "savings"],
    ),
    (FinanceIntent::Debt, &["debt", "payoff", "credit card"]),
];

static CASCADE_RES: LazyLock<Vec<(FinanceIntent, Regex)>> = LazyLock::new(|| {
    CASCADE
        .iter()
        .map(|(intent, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k).replace(' ', r"\s+"))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"(?i)\b(?:{})", alternation))
                .expect("valid intent keyword regex");
            (*intent, re)
        })
        .collect()
});

/// Classify `text` into exactly one intent, `General` when nothing matches.
pub fn classify(text: &str) -> FinanceIntent {
    let intent = CASCADE_RES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(intent, _)| *intent)
        .unwrap_or(FinanceIntent::General);

    tracing::debug!(intent = intent.as_str(), "Classified finance intent");
    intent
}

/// Whether the utterance is about money at all.
///
/// True when the cascade lands on a specific tool or the extractor finds
/// any field, so "I make $4,000" counts even without a tool keyword.
pub fn is_finance_request(text: &str) -> bool {
    classify(text) != FinanceIntent::General || !extract(text).is_empty()
}
