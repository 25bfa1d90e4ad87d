use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use timberline_core::{ActivityId, ProjectId, UserId};

use crate::Event;

/// One entry of a project's append-only activity feed.
///
/// Records are written in the same atomic batch as the state change they
/// describe and are never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub project_id: ProjectId,
    pub actor_id: UserId,
    /// Stable event type identifier (see [`Event::event_type`]).
    pub kind: String,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
    /// Other users or documents the entry concerns (professional, quote, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_ids: Vec<String>,
}

impl ActivityRecord {
    /// Build a feed entry from a typed domain event.
    pub fn from_event<E: Event>(
        project_id: ProjectId,
        actor_id: UserId,
        event: &E,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            project_id,
            actor_id,
            kind: event.event_type().to_string(),
            message: message.into(),
            occurred_at: event.occurred_at(),
            subject_ids: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject_ids.push(subject.to_string());
        self
    }
}
