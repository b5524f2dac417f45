use crate::action::ActionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a discrete event while a transition runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// An attempt of an action started
    ActionStarted {
        index: usize,
        action: ActionKind,
        attempt: u32,
        at: DateTime<Utc>,
    },
    /// An action finished successfully
    ActionSucceeded {
        index: usize,
        action: ActionKind,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    /// An attempt failed and another one is scheduled
    ActionRetried {
        index: usize,
        action: ActionKind,
        attempt: u32,
        error: String,
        at: DateTime<Utc>,
    },
    /// An action failed for good
    ActionFailed {
        index: usize,
        action: ActionKind,
        error: String,
        at: DateTime<Utc>,
    },
    /// The transition budget ran out
    BudgetExhausted { index: usize, at: DateTime<Utc> },
    /// The engine was cleaned up mid-flight
    Cancelled { index: usize, at: DateTime<Utc> },
}

impl TimelineEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEvent::ActionStarted { at, .. }
            | TimelineEvent::ActionSucceeded { at, .. }
            | TimelineEvent::ActionRetried { at, .. }
            | TimelineEvent::ActionFailed { at, .. }
            | TimelineEvent::BudgetExhausted { at, .. }
            | TimelineEvent::Cancelled { at, .. } => *at,
        }
    }
}

/// A sequential record of one transition attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of retries recorded for the action at `index`.
    pub fn retries_of(&self, index: usize) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::ActionRetried { index: i, .. } if *i == index))
            .count()
    }

    /// Sort events by timestamp
    pub fn sort(&mut self) {
        self.events.sort_by_key(TimelineEvent::timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_counted_per_index() {
        let now = Utc::now();
        let mut timeline = Timeline::new();
        for attempt in 1..=2 {
            timeline.push(TimelineEvent::ActionRetried {
                index: 1,
                action: ActionKind::CalculateRoute,
                attempt,
                error: "busy".into(),
                at: now,
            });
        }
        timeline.push(TimelineEvent::ActionSucceeded {
            index: 1,
            action: ActionKind::CalculateRoute,
            elapsed_ms: 12,
            at: now,
        });
        assert_eq!(timeline.retries_of(1), 2);
        assert_eq!(timeline.retries_of(0), 0);
    }
}
