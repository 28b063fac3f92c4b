//! Core domain types for planwise
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Utterance** | One free-text message from the person to the assistant |
//! | **Cue word** | A fixed keyword anchoring a field-specific extraction pattern |
//! | **Intent** | Which financial tool an utterance is about ([`FinanceIntent`]) |
//! | **Recurrence instance** | One materialized occurrence of a recurring [`CalendarEvent`] |
//! | **Dedup key** | Utterance plus the head of the prior response, see [`crate::dedup`] |
//!
//! Calendar dates are [`NaiveDateTime`] in the assistant's local wall clock.
//! The pipeline never reads the clock itself; callers pass `now` in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================
// Calendar
// ============================================

/// How often a calendar event repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    /// Identity case: no expansion
    #[default]
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurringFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringFrequency::None => "none",
            RecurringFrequency::Daily => "daily",
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Biweekly => "biweekly",
            RecurringFrequency::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for RecurringFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RecurringFrequency::None),
            "daily" => Ok(RecurringFrequency::Daily),
            "weekly" => Ok(RecurringFrequency::Weekly),
            "biweekly" => Ok(RecurringFrequency::Biweekly),
            "monthly" => Ok(RecurringFrequency::Monthly),
            _ => Err(format!("unknown recurring frequency: {}", s)),
        }
    }
}

/// Broad bucket an event is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Finance,
    Health,
    Career,
    Learning,
    #[default]
    General,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Finance => "finance",
            EventCategory::Health => "health",
            EventCategory::Career => "career",
            EventCategory::Learning => "learning",
            EventCategory::General => "general",
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finance" => Ok(EventCategory::Finance),
            "health" => Ok(EventCategory::Health),
            "career" => Ok(EventCategory::Career),
            "learning" => Ok(EventCategory::Learning),
            "general" => Ok(EventCategory::General),
            _ => Err(format!("unknown event category: {}", s)),
        }
    }
}

/// A calendar entry, either created from an utterance or materialized
/// from a recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Unique id; recurrence instances use `"<baseId>-<epochMillis>"`
    pub id: String,
    pub title: String,
    pub category: EventCategory,
    pub date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurringFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
}

impl CalendarEvent {
    /// Create a one-off event with a fresh UUID.
    pub fn new(title: impl Into<String>, category: EventCategory, date: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            date,
            description: None,
            recurring: None,
            end_date: None,
        }
    }

    /// Id of a recurrence instance of this event falling on `date`.
    pub fn instance_id(&self, date: NaiveDateTime) -> String {
        format!("{}-{}", self.id, date.and_utc().timestamp_millis())
    }
}

// ============================================
// Finance
// ============================================

/// The financial tool an utterance is about. Exactly one per utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceIntent {
    Budget,
    Mortgage,
    Tax,
    Investment,
    Loan,
    Retirement,
    Debt,
    General,
}

impl FinanceIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinanceIntent::Budget => "budget",
            FinanceIntent::Mortgage => "mortgage",
            FinanceIntent::Tax => "tax",
            FinanceIntent::Investment => "investment",
            FinanceIntent::Loan => "loan",
            FinanceIntent::Retirement => "retirement",
            FinanceIntent::Debt => "debt",
            FinanceIntent::General => "general",
        }
    }

    /// Display name of the tool this intent opens
    pub fn tool_name(&self) -> &'static str {
        match self {
            FinanceIntent::Budget => "Budget Planner",
            FinanceIntent::Mortgage => "Mortgage Calculator",
            FinanceIntent::Tax => "Tax Estimator",
            FinanceIntent::Investment => "Investment Calculator",
            FinanceIntent::Loan => "Loan Comparison",
            FinanceIntent::Retirement => "Retirement Planner",
            FinanceIntent::Debt => "Debt Payoff Planner",
            FinanceIntent::General => "Financial Tools",
        }
    }

    /// Route of the tool this intent opens
    pub fn route(&self) -> &'static str {
        match self {
            FinanceIntent::Budget => "/budget",
            FinanceIntent::Mortgage => "/mortgage-calculator",
            FinanceIntent::Tax => "/tax-calculator",
            FinanceIntent::Investment => "/investment-calculator",
            FinanceIntent::Loan => "/loan-comparison",
            FinanceIntent::Retirement => "/retirement-planner",
            FinanceIntent::Debt => "/debt-payoff",
            FinanceIntent::General => "/financial-tools",
        }
    }

    /// Id of the form on the tool's page
    pub fn form_id(&self) -> &'static str {
        match self {
            FinanceIntent::Budget => "budget-form",
            FinanceIntent::Mortgage => "mortgage-form",
            FinanceIntent::Tax => "tax-form",
            FinanceIntent::Investment => "investment-form",
            FinanceIntent::Loan => "loan-form",
            FinanceIntent::Retirement => "retirement-form",
            FinanceIntent::Debt => "debt-form",
            FinanceIntent::General => "financial-form",
        }
    }
}

impl std::str::FromStr for FinanceIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget" => Ok(FinanceIntent::Budget),
            "mortgage" => Ok(FinanceIntent::Mortgage),
            "tax" => Ok(FinanceIntent::Tax),
            "investment" => Ok(FinanceIntent::Investment),
            "loan" => Ok(FinanceIntent::Loan),
            "retirement" => Ok(FinanceIntent::Retirement),
            "debt" => Ok(FinanceIntent::Debt),
            "general" => Ok(FinanceIntent::General),
            _ => Err(format!("unknown finance intent: {}", s)),
        }
    }
}

/// Numbers pulled out of an utterance.
///
/// Every field is independent: `None` means "not mentioned", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFinancialData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    /// Years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_term: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<u32>,
}

impl ExtractedFinancialData {
    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill every field still missing here from `other`.
    pub fn fill_missing_from(&mut self, other: &ExtractedFinancialData) {
        fn fill<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }

        fill(&mut self.income, &other.income);
        fill(&mut self.expense, &other.expense);
        fill(&mut self.expense_category, &other.expense_category);
        fill(&mut self.rent, &other.rent);
        fill(&mut self.home_price, &other.home_price);
        fill(&mut self.down_payment, &other.down_payment);
        fill(&mut self.loan_amount, &other.loan_amount);
        fill(&mut self.interest_rate, &other.interest_rate);
        fill(&mut self.loan_term, &other.loan_term);
        fill(&mut self.debt_amount, &other.debt_amount);
        fill(&mut self.savings_amount, &other.savings_amount);
        fill(&mut self.retirement_age, &other.retirement_age);
    }
}

// ============================================
// Assistant response payload
// ============================================

/// A side effect the UI should perform after showing the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AiAction {
    #[serde(rename_all = "camelCase")]
    Navigate {
        route: String,
        permission_granted: bool,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    FillForm {
        form_id: String,
        form_data: serde_json::Map<String, serde_json::Value>,
        auto_focus: bool,
    },
}

/// A follow-up link shown under the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub path: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: path.into(),
        }
    }
}

/// The conversational payload handed back to the chat layer.
///
/// Treated as a value: the pipeline builds new responses from prior ones
/// and only ever appends to `actions` and `suggestions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub response: String,
    #[serde(default)]
    pub actions: Vec<AiAction>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl AiResponse {
    /// Copy of `prior` (or an empty response) with new text and the given
    /// actions and suggestions appended.
    pub fn rebuilt_from(
        prior: Option<&AiResponse>,
        response: String,
        actions: impl IntoIterator<Item = AiAction>,
        suggestions: impl IntoIterator<Item = Suggestion>,
    ) -> Self {
        let base = prior.cloned().unwrap_or_default();
        let mut all_actions = base.actions;
        all_actions.extend(actions);
        let mut all_suggestions = base.suggestions;
        all_suggestions.extend(suggestions);

        Self {
            response,
            actions: all_actions,
            suggestions: all_suggestions,
        }
    }
}
