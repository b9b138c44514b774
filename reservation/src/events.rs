use abi::{Date, Error, Event, EventKind, Timestamp, MAX_EVENTS};
use tracing::debug;

/// Append-only login / logout audit trail.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn records(&self) -> &[Event] {
        &self.events
    }

    pub fn record(
        &mut self,
        user_id: &str,
        kind: EventKind,
        timestamp: Timestamp,
    ) -> Result<Event, Error> {
        if self.events.len() >= MAX_EVENTS {
            return Err(Error::EventLogFull(MAX_EVENTS));
        }
        let event = Event {
            seq: self.events.len() as u32 + 1,
            user_id: user_id.to_string(),
            kind,
            timestamp,
        };
        debug!("{} {} at {}", event.user_id, event.kind, event.timestamp);
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn by_user(&self, user_id: &str) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Events whose timestamp string sorts within `[start, end]`.
    ///
    /// Each bound is a date or a timestamp and `start` must sort before
    /// `end`. Bounds are compared as plain strings, so a bare `YYYY-MM-DD`
    /// end bound stops at midnight of that day.
    pub fn between(&self, start: &str, end: &str) -> Result<Vec<Event>, Error> {
        check_bound(start)?;
        check_bound(end)?;
        if start >= end {
            return Err(Error::InvalidQuery(format!(
                "start {} must be earlier than end {}",
                start, end
            )));
        }
        Ok(self
            .events
            .iter()
            .filter(|e| e.timestamp.as_str() >= start && e.timestamp.as_str() <= end)
            .cloned()
            .collect())
    }
}

fn check_bound(bound: &str) -> Result<(), Error> {
    if bound.parse::<Timestamp>().is_ok() || bound.parse::<Date>().is_ok() {
        return Ok(());
    }
    Err(Error::InvalidQuery(format!(
        "{} is neither YYYY-MM-DD nor YYYY-MM-DD HH:MM:SS",
        bound
    )))
}
