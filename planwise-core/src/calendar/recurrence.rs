//! Recurrence expansion
//!
//! A recurring event is stored as its original plus one materialized
//! instance per occurrence up to the end date. Instance `k` is always
//! computed from the original date (`date + k * step`), so monthly
//! occurrences stay anchored on the original day-of-month instead of
//! drifting after a short month.

use crate::config::CalendarConfig;
use crate::db::EventStore;
use crate::error::{Error, Result};
use crate::types::{CalendarEvent, RecurringFrequency};
use chrono::{Days, Months, NaiveDateTime};

/// Expand `event` into its occurrences and persist them.
///
/// With [`RecurringFrequency::None`] the event comes back untouched and
/// nothing is written. Otherwise the original (with `recurring` and
/// `end_date` attached) and every instance are upserted as one batch and
/// returned in chronological order.
///
/// Never fails: any error is logged and the result degrades to `[event]`.
pub fn expand(
    store: &dyn EventStore,
    config: &CalendarConfig,
    event: CalendarEvent,
    frequency: RecurringFrequency,
    end_date: Option<NaiveDateTime>,
) -> Vec<CalendarEvent> {
    if frequency == RecurringFrequency::None {
        return vec![event];
    }

    let expanded = default_end_date(&event, config, end_date).and_then(|end| {
        let events = generate(&event, frequency, end, config.max_recurrence_instances)?;
        store.upsert_batch(&events)?;
        Ok(events)
    });

    match expanded {
        Ok(events) => {
            tracing::info!(
                event_id = %event.id,
                frequency = frequency.as_str(),
                instances = events.len() - 1,
                "Expanded recurring event"
            );
            events
        }
        Err(e) => {
            tracing::warn!(
                event_id = %event.id,
                error = %e,
                "Recurrence expansion failed, keeping the base event only"
            );
            vec![event]
        }
    }
}

fn default_end_date(
    event: &CalendarEvent,
    config: &CalendarConfig,
    end_date: Option<NaiveDateTime>,
) -> Result<NaiveDateTime> {
    match end_date {
        Some(end) => Ok(end),
        None => event
            .date
            .checked_add_months(Months::new(config.default_recurrence_months))
            .ok_or_else(|| Error::DateOutOfRange(format!("{} + default months", event.date))),
    }
}

/// Build the original (with recurrence metadata) followed by every
/// instance dated on or before `end`, without touching a store.
pub fn generate(
    event: &CalendarEvent,
    frequency: RecurringFrequency,
    end: NaiveDateTime,
    max_instances: usize,
) -> Result<Vec<CalendarEvent>> {
    let original = CalendarEvent {
        recurring: Some(frequency),
        end_date: Some(end),
        ..event.clone()
    };

    let mut events = vec![original.clone()];
    if frequency == RecurringFrequency::None {
        return Ok(events);
    }

    for k in 1u32.. {
        let date = occurrence(event.date, frequency, k)?;
        if date > end {
            break;
        }
        if events.len() > max_instances {
            tracing::warn!(
                event_id = %event.id,
                max_instances,
                "Recurrence hit the instance cap, truncating"
            );
            break;
        }

        events.push(CalendarEvent {
            id: original.instance_id(date),
            date,
            ..original.clone()
        });
    }

    Ok(events)
}

/// Date of the `k`-th occurrence after `base`.
pub fn occurrence(
    base: NaiveDateTime,
    frequency: RecurringFrequency,
    k: u32,
) -> Result<NaiveDateTime> {
    let step_days = match frequency {
        RecurringFrequency::None => return Ok(base),
        RecurringFrequency::Daily => 1,
        RecurringFrequency::Weekly => 7,
        RecurringFrequency::Biweekly => 14,
        RecurringFrequency::Monthly => {
            return base
                .checked_add_months(Months::new(k))
                .ok_or_else(|| Error::DateOutOfRange(format!("{} + {} months", base, k)));
        }
    };

    base.checked_add_days(Days::new(step_days * u64::from(k)))
        .ok_or_else(|| Error::DateOutOfRange(format!("{} + {} days", base, step_days * u64::from(k))))
}
