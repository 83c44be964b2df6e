// ── In-app notification ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::field::FieldValue;
use super::record::{Lifecycle, Record, TransitionPayload, require_text};
use crate::error::CoreError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
    Archived,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationAction {
    MarkRead,
    MarkUnread,
    Archive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Record for Notification {
    const KIND: &'static str = "notification";
    type Draft = NotificationDraft;
    type Patch = NotificationPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "title" => Some(self.title.as_str().into()),
            "message" => Some(self.message.as_str().into()),
            "priority" => Some(self.priority.to_string().into()),
            // Numeric rank so lists can sort by urgency rather than name.
            "priority_rank" => Some(FieldValue::Integer(match self.priority {
                Priority::Low => 0,
                Priority::Normal => 1,
                Priority::High => 2,
                Priority::Critical => 3,
            })),
            "status" => Some(self.status.to_string().into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            "read_at" => self.read_at.map(FieldValue::from),
            _ => None,
        }
    }

    fn from_draft(
        id: EntityId,
        draft: NotificationDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        require_text("title", &draft.title)?;
        Ok(Self {
            id,
            title: draft.title,
            message: draft.message,
            priority: draft.priority,
            status: NotificationStatus::Unread,
            created_at: now,
            updated_at: now,
            read_at: None,
        })
    }

    fn apply_patch(&mut self, patch: NotificationPatch) -> Result<(), CoreError> {
        if let Some(ref title) = patch.title {
            require_text("title", title)?;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Lifecycle for Notification {
    type Status = NotificationStatus;
    type Action = NotificationAction;

    fn status(&self) -> NotificationStatus {
        self.status
    }

    fn next_status(
        from: NotificationStatus,
        action: NotificationAction,
    ) -> Option<NotificationStatus> {
        use NotificationAction as A;
        use NotificationStatus as S;
        match (from, action) {
            (S::Unread, A::MarkRead) => Some(S::Read),
            (S::Read, A::MarkUnread) => Some(S::Unread),
            (S::Unread | S::Read, A::Archive) => Some(S::Archived),
            _ => None,
        }
    }

    fn enter(
        &mut self,
        to: NotificationStatus,
        action: NotificationAction,
        _payload: &TransitionPayload,
        now: DateTime<Utc>,
    ) {
        match action {
            NotificationAction::MarkRead => self.read_at = Some(now),
            NotificationAction::MarkUnread => self.read_at = None,
            NotificationAction::Archive => {}
        }
        self.status = to;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::record::apply_transition;

    #[test]
    fn read_unread_round_trip_tracks_read_at() {
        let mut n = Notification::from_draft(
            EntityId::from("ntf-1"),
            NotificationDraft {
                title: "Creditor meeting scheduled".into(),
                message: String::new(),
                priority: Priority::High,
            },
            Utc::now(),
        )
        .unwrap();
        let p = TransitionPayload::default();

        apply_transition(&mut n, NotificationAction::MarkRead, &p, Utc::now()).unwrap();
        assert!(n.read_at.is_some());
        apply_transition(&mut n, NotificationAction::MarkUnread, &p, Utc::now()).unwrap();
        assert!(n.read_at.is_none());
        apply_transition(&mut n, NotificationAction::Archive, &p, Utc::now()).unwrap();
        assert_eq!(n.status, NotificationStatus::Archived);

        assert!(apply_transition(&mut n, NotificationAction::MarkRead, &p, Utc::now()).is_err());
    }

    #[test]
    fn actions_parse_from_snake_case() {
        assert_eq!(
            Notification::parse_action("mark_read").unwrap(),
            NotificationAction::MarkRead
        );
    }
}
