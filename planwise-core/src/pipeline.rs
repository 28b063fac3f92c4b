//! Utterance routing
//!
//! One call to [`Pipeline::process`] handles one conversational turn:
//!
//! 1. [`DedupGuard`] drops repeats.
//! 2. Explicit calendar wording ("schedule", "remind me", ...) goes to the
//!    calendar path.
//! 3. Finance utterances go to the finance path. The remote intent service
//!    decides when it is configured and reachable, the local cascade
//!    otherwise.
//! 4. Anything else that names a date goes to the calendar path.
//!
//! Nothing here surfaces an error to the caller: a turn either produces a
//! new [`AiResponse`] or `None`, and the caller keeps what it had.

use crate::calendar::{self, date_text, ComposedEvent};
use crate::config::{CalendarConfig, Config};
use crate::db::EventStore;
use crate::dedup::DedupGuard;
use crate::finance;
use crate::format::format_event_date;
use crate::intent_service::IntentServiceClient;
use crate::types::{AiAction, AiResponse, CalendarEvent, FinanceIntent, RecurringFrequency};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

pub const CALENDAR_ROUTE: &str = "/calendar";

static CALENDAR_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:calendars?|schedule|remind\s+me|appointments?|events?|recitals?|meetings?)\b",
    )
    .expect("valid calendar cue regex")
});

/// The assistant's extraction pipeline over an event store.
pub struct Pipeline<S: EventStore> {
    store: S,
    calendar: CalendarConfig,
    intent_client: Option<IntentServiceClient>,
    dedup: DedupGuard,
}

impl<S: EventStore> Pipeline<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            calendar: config.calendar.clone(),
            intent_client: IntentServiceClient::from_config(&config.intent_service),
            dedup: DedupGuard::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dedup(&self) -> &DedupGuard {
        &self.dedup
    }

    /// Handle one utterance. `None` means nothing to do for this turn.
    pub async fn process(
        &self,
        message: &str,
        prior: Option<&AiResponse>,
        now: NaiveDateTime,
    ) -> Option<AiResponse> {
        if !self
            .dedup
            .should_process(message, prior.map(|p| p.response.as_str()))
        {
            return None;
        }

        if CALENDAR_CUE_RE.is_match(message) {
            tracing::debug!("Routing to calendar: explicit cue");
            return self.calendar_path(message, prior, now);
        }

        if let Some(response) = self.finance_path(message, prior).await {
            return Some(response);
        }

        if date_text::has_date_expression(message, now) {
            tracing::debug!("Routing to calendar: date expression");
            return self.calendar_path(message, prior, now);
        }

        tracing::debug!("No route for utterance");
        None
    }

    async fn finance_path(&self, message: &str, prior: Option<&AiResponse>) -> Option<AiResponse> {
        let mut extracted = finance::extract(message);

        let remote = match &self.intent_client {
            Some(client) => match client.classify(message).await {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!(error = %e, "Intent service failed, classifying locally");
                    None
                }
            },
            None => None,
        };

        let intent = match remote {
            Some(response) => {
                let info = response.finance_info.filter(|_| response.is_finance_request)?;
                if let Some(remote_data) = &info.extracted_data {
                    extracted.fill_missing_from(remote_data);
                }
                info.intent
            }
            None => {
                let intent = finance::classify(message);
                if intent == FinanceIntent::General && extracted.is_empty() {
                    return None;
                }
                intent
            }
        };

        tracing::info!(intent = intent.as_str(), "Handling finance request");
        Some(finance::synthesize(intent, &extracted, prior))
    }

    fn calendar_path(
        &self,
        message: &str,
        prior: Option<&AiResponse>,
        now: NaiveDateTime,
    ) -> Option<AiResponse> {
        let ComposedEvent {
            event,
            frequency,
            end_date,
            ..
        } = calendar::compose(message, now)?;

        let events = self.persist(event, frequency, end_date)?;
        let text = confirmation(&events);

        tracing::info!(
            event_id = %events[0].id,
            occurrences = events.len(),
            "Added calendar event"
        );

        Some(AiResponse::rebuilt_from(
            prior,
            text,
            [AiAction::Navigate {
                route: CALENDAR_ROUTE.to_string(),
                permission_granted: true,
                reason: "Opening your calendar".to_string(),
            }],
            [],
        ))
    }

    /// Store the event (expanded when recurring). `None` when nothing could
    /// be written.
    fn persist(
        &self,
        event: CalendarEvent,
        frequency: RecurringFrequency,
        end_date: Option<NaiveDateTime>,
    ) -> Option<Vec<CalendarEvent>> {
        if frequency != RecurringFrequency::None {
            let events = calendar::expand(&self.store, &self.calendar, event, frequency, end_date);
            // A successful expansion always tags the original
            if events[0].recurring.is_some() {
                return Some(events);
            }
            return self.persist_single(events.into_iter().next()?);
        }
        self.persist_single(event)
    }

    fn persist_single(&self, event: CalendarEvent) -> Option<Vec<CalendarEvent>> {
        match self.store.upsert(&event) {
            Ok(()) => Some(vec![event]),
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Failed to store calendar event");
                None
            }
        }
    }
}

/// `Added "<title>" to your calendar for <date>.` plus the recurrence summary.
fn confirmation(events: &[CalendarEvent]) -> String {
    let Some(first) = events.first() else {
        return String::new();
    };

    let mut text = format!(
        "Added \"{}\" to your calendar for {}.",
        first.title,
        format_event_date(first.date)
    );

    if let (Some(frequency), Some(end)) = (first.recurring, first.end_date) {
        text.push_str(&format!(
            " Repeats {} until {} ({} occurrences).",
            frequency.as_str(),
            format_event_date(end),
            events.len()
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::{Error, Result};
    use crate::types::Suggestion;
    use chrono::{Datelike, NaiveDate};

    /// Monday, October 19 2026
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn pipeline() -> Pipeline<Database> {
        crate::logging::init_test();
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        Pipeline::new(db, &Config::default())
    }

    struct BrokenStore;

    impl EventStore for BrokenStore {
        fn get_all(&self) -> Result<Vec<CalendarEvent>> {
            Ok(vec![])
        }

        fn upsert(&self, _event: &CalendarEvent) -> Result<()> {
            Err(Error::Config("store offline".to_string()))
        }

        fn delete_by_id(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_calendar_cue_adds_event() {
        let pipeline = pipeline();
        let response = pipeline
            .process("put dance recital on the 22nd", None, now())
            .await
            .unwrap();

        assert_eq!(
            response.response,
            "Added \"Dance recital\" to your calendar for Thursday, October 22, 2026."
        );
        assert!(matches!(
            &response.actions[0],
            AiAction::Navigate { route, .. } if route == CALENDAR_ROUTE
        ));

        let events = pipeline.store().list_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date.day(), 22);
    }

    #[tokio::test]
    async fn test_recurring_event_is_expanded() {
        let pipeline = pipeline();
        let response = pipeline
            .process("schedule piano lesson every tuesday until November 10", None, now())
            .await
            .unwrap();

        // Oct 20, 27, Nov 3, 10
        assert_eq!(pipeline.store().count_events().unwrap(), 4);
        assert!(response
            .response
            .ends_with("Repeats weekly until Tuesday, November 10, 2026 (4 occurrences)."));
    }

    #[tokio::test]
    async fn test_finance_path_locally() {
        let pipeline = pipeline();
        let response = pipeline
            .process("my rent will be $1,800 a month", None, now())
            .await
            .unwrap();

        assert_eq!(
            response.response,
            "I'll open the Budget Planner for you. I've noted your rent of $1,800."
        );
        assert_eq!(response.actions.len(), 2);
        assert_eq!(pipeline.store().count_events().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_date_without_cue_goes_to_calendar() {
        let pipeline = pipeline();
        let response = pipeline
            .process("dentist tomorrow at 3pm", None, now())
            .await
            .unwrap();
        assert!(response.response.contains("Tuesday, October 20, 2026"));
    }

    #[tokio::test]
    async fn test_cue_words_need_whole_word_match() {
        let pipeline = pipeline();
        let response = pipeline
            .process("Eventually I want to invest $500 in stocks", None, now())
            .await
            .unwrap();

        assert!(response
            .response
            .starts_with("I'll open the Investment Calculator"));
        assert_eq!(pipeline.store().count_events().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unroutable_utterance() {
        let pipeline = pipeline();
        assert!(pipeline.process("hello there", None, now()).await.is_none());
    }

    #[tokio::test]
    async fn test_repeat_turn_is_skipped() {
        let pipeline = pipeline();
        let prior = AiResponse::default();
        assert!(pipeline
            .process("help me budget", Some(&prior), now())
            .await
            .is_some());
        assert!(pipeline
            .process("help me budget", Some(&prior), now())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_prior_actions_are_preserved() {
        let pipeline = pipeline();
        let prior = AiResponse {
            response: "Welcome back".to_string(),
            actions: vec![],
            suggestions: vec![Suggestion::new("Tour", "/tour")],
        };
        let response = pipeline
            .process("remind me to call mom on Friday", Some(&prior), now())
            .await
            .unwrap();
        assert_eq!(response.suggestions, prior.suggestions);
        assert_eq!(response.actions.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_yields_no_response() {
        let pipeline = Pipeline::new(BrokenStore, &Config::default());
        assert!(pipeline
            .process("put dance recital on the 22nd", None, now())
            .await
            .is_none());
        assert!(pipeline
            .process("yoga class every day schedule", None, now())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back_locally() {
        let mut config = Config::default();
        config.intent_service.enabled = true;
        config.intent_service.endpoint = Some("http://127.0.0.1:9/classify".to_string());
        config.intent_service.timeout_secs = 1;

        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let pipeline = Pipeline::new(db, &config);

        let response = pipeline
            .process("What mortgage rate should I expect?", None, now())
            .await
            .unwrap();
        assert!(response.response.starts_with("I'll open the Mortgage Calculator"));
    }

    #[test]
    fn test_confirmation_text() {
        let date = now();
        let mut event = CalendarEvent::new("Standup", crate::types::EventCategory::Career, date);
        assert_eq!(
            confirmation(std::slice::from_ref(&event)),
            "Added \"Standup\" to your calendar for Monday, October 19, 2026."
        );

        event.recurring = Some(RecurringFrequency::Daily);
        event.end_date = Some(date + chrono::Duration::days(2));
        let events = vec![event.clone(), event.clone(), event];
        assert_eq!(
            confirmation(&events),
            "Added \"Standup\" to your calendar for Monday, October 19, 2026. \
             Repeats daily until Wednesday, October 21, 2026 (3 occurrences)."
        );
    }
}
