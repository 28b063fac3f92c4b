//! Turn an intent plus extracted fields into an [`AiResponse`]
//!
//! Each intent only cares about a handful of fields. Those that were
//! extracted become one acknowledgment clause each and the payload of a
//! `fill_form` action for the tool's form.

use crate::format::{format_currency, format_percent, format_years};
use crate::types::{AiAction, AiResponse, ExtractedFinancialData, FinanceIntent, Suggestion};
use serde_json::{Map, Value};

pub const LEARN_SUGGESTION_TEXT: &str = "Learn the basics of personal finance";
pub const LEARN_SUGGESTION_PATH: &str = "/learn/financial-literacy";

/// A form field a tool can be pre-filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Income,
    Rent,
    Expense,
    HomePrice,
    DownPayment,
    LoanAmount,
    InterestRate,
    LoanTerm,
    DebtAmount,
    SavingsAmount,
    RetirementAge,
}

enum FieldValue {
    Currency(f64),
    Percent(f64),
    Years(u32),
    Age(u32),
}

impl FieldValue {
    fn display(&self) -> String {
        match self {
            FieldValue::Currency(amount) => format_currency(*amount),
            FieldValue::Percent(rate) => format_percent(*rate),
            FieldValue::Years(years) => format_years(*years),
            FieldValue::Age(age) => age.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Currency(v) | FieldValue::Percent(v) => Value::from(*v),
            FieldValue::Years(v) | FieldValue::Age(v) => Value::from(*v),
        }
    }
}

impl Field {
    /// Form key, matching the wire name of the extracted field
    pub fn key(&self) -> &'static str {
        match self {
            Field::Income => "income",
            Field::Rent => "rent",
            Field::Expense => "expense",
            Field::HomePrice => "homePrice",
            Field::DownPayment => "downPayment",
            Field::LoanAmount => "loanAmount",
            Field::InterestRate => "interestRate",
            Field::LoanTerm => "loanTerm",
            Field::DebtAmount => "debtAmount",
            Field::SavingsAmount => "savingsAmount",
            Field::RetirementAge => "retirementAge",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Field::Income => "income",
            Field::Rent => "rent",
            Field::Expense => "expense",
            Field::HomePrice => "home price",
            Field::DownPayment => "down payment",
            Field::LoanAmount => "loan amount",
            Field::InterestRate => "interest rate",
            Field::LoanTerm => "loan term",
            Field::DebtAmount => "debt",
            Field::SavingsAmount => "savings",
            Field::RetirementAge => "target retirement age",
        }
    }

    fn value(&self, data: &ExtractedFinancialData) -> Option<FieldValue> {
        match self {
            Field::Income => data.income.map(FieldValue::Currency),
            Field::Rent => data.rent.map(FieldValue::Currency),
            Field::Expense => data.expense.map(FieldValue::Currency),
            Field::HomePrice => data.home_price.map(FieldValue::Currency),
            Field::DownPayment => data.down_payment.map(FieldValue::Currency),
            Field::LoanAmount => data.loan_amount.map(FieldValue::Currency),
            Field::InterestRate => data.interest_rate.map(FieldValue::Percent),
            Field::LoanTerm => data.loan_term.map(FieldValue::Years),
            Field::DebtAmount => data.debt_amount.map(FieldValue::Currency),
            Field::SavingsAmount => data.savings_amount.map(FieldValue::Currency),
            Field::RetirementAge => data.retirement_age.map(FieldValue::Age),
        }
    }
}

/// Fields each intent's tool accepts, in clause order.
pub fn relevant_fields(intent: FinanceIntent) -> &'static [Field] {
    match intent {
        FinanceIntent::Budget => &[Field::Income, Field::Rent, Field::Expense],
        FinanceIntent::Mortgage => &[
            Field::HomePrice,
            Field::DownPayment,
            Field::InterestRate,
            Field::LoanTerm,
        ],
        FinanceIntent::Tax => &[Field::Income],
        FinanceIntent::Loan => &[Field::LoanAmount, Field::InterestRate, Field::LoanTerm],
        FinanceIntent::Retirement => &[
            Field::Income,
            Field::SavingsAmount,
            Field::RetirementAge,
        ],
        FinanceIntent::Debt => &[Field::DebtAmount, Field::InterestRate],
        FinanceIntent::Investment | FinanceIntent::General => &[],
    }
}

/// Build the response for `intent` on top of `prior`.
///
/// `prior` is never modified; its actions and suggestions are carried over
/// and the new navigate / fill_form actions and the learning suggestion
/// are appended after them.
pub fn synthesize(
    intent: FinanceIntent,
    extracted: &ExtractedFinancialData,
    prior: Option<&AiResponse>,
) -> AiResponse {
    let mut text = format!("I'll open the {} for you.", intent.tool_name());
    let mut form_data = Map::new();

    for field in relevant_fields(intent) {
        let Some(value) = field.value(extracted) else {
            continue;
        };
        form_data.insert(field.key().to_string(), value.to_json());

        if *field == Field::Expense {
            if let Some(category) = &extracted.expense_category {
                form_data.insert(
                    "expenseCategory".to_string(),
                    Value::String(category.clone()),
                );
            }
            if is_rent_echo(extracted) {
                continue;
            }
        }

        text.push(' ');
        text.push_str(&clause(*field, &value, extracted));
    }

    let mut actions = vec![AiAction::Navigate {
        route: intent.route().to_string(),
        permission_granted: true,
        reason: format!("Opening the {}", intent.tool_name()),
    }];
    if !form_data.is_empty() {
        actions.push(AiAction::FillForm {
            form_id: intent.form_id().to_string(),
            form_data,
            auto_focus: true,
        });
    }

    tracing::debug!(
        intent = intent.as_str(),
        actions = actions.len(),
        "Synthesized finance response"
    );

    AiResponse::rebuilt_from(
        prior,
        text,
        actions,
        [Suggestion::new(LEARN_SUGGESTION_TEXT, LEARN_SUGGESTION_PATH)],
    )
}

fn clause(field: Field, value: &FieldValue, extracted: &ExtractedFinancialData) -> String {
    match (field, &extracted.expense_category) {
        (Field::Expense, Some(category)) => format!(
            "I've noted your {} of {} for {}.",
            field.label(),
            value.display(),
            category
        ),
        _ => format!("I've noted your {} of {}.", field.label(), value.display()),
    }
}

/// The expense is only the rent copied over as housing
fn is_rent_echo(extracted: &ExtractedFinancialData) -> bool {
    extracted.rent.is_some()
        && extracted.expense == extracted.rent
        && extracted.expense_category.as_deref() == Some(super::extract::HOUSING_CATEGORY)
}
