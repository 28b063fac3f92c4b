//! Finance path
//!
//! - [`extract`]: utterance → sparse numeric fields
//! - [`classify`]: utterance → one [`FinanceIntent`](crate::types::FinanceIntent)
//! - [`synthesize`]: intent + fields → acknowledgment and UI actions

pub mod classify;
pub mod extract;
pub mod synthesize;

pub use classify::{classify, is_finance_request};
pub use extract::extract;
pub use synthesize::synthesize;
