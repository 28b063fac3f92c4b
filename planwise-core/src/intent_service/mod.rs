//! Remote finance intent service
//!
//! Optional pre-classifier for finance utterances. The service is consulted
//! first when configured, but it is never load-bearing:
//! - Local extraction always runs, whatever the service says
//! - Any transport, status or payload failure falls back to the local cascade
//!
//! ## Usage
//!
//! Enable it in `~/.config/planwise/config.toml`:
//!
//! ```toml
//! [intent_service]
//! enabled = true
//! endpoint = "https://intent.example.com/classify"
//! api_key = "sk_xxxxxxxx"
//! ```

mod client;

pub use client::{FinanceInfo, IntentServiceClient, IntentServiceResponse};
