use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::CollapseState;
use crate::ui::labels::trim_name;
use crate::ui::time_format::{format_full_timestamp, format_message_timestamp};

// --- Data Structures ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    #[default]
    Chat,
    Notification,
    ListHeader,
    Info,
    Error,
}

impl MessageKind {
    pub fn is_notice(self) -> bool {
        !matches!(self, MessageKind::Chat)
    }
}

/// A chat message or system notice living in exactly one room's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Empty for system notices.
    #[serde(default)]
    pub sender_name: String,
    pub timestamp: DateTime<Local>,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,

    // --- Presentation state, derived by the timeline ---
    #[serde(default = "default_true")]
    pub show_sender: bool,
    #[serde(default)]
    pub continued: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub collapse: Option<CollapseState>,
    /// Expand/collapse affordance text shown after a notice.
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub sender_label: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub full_date: String,
}

fn default_true() -> bool {
    true
}

impl Message {
    pub fn chat(
        id: impl Into<String>,
        sender_name: impl Into<String>,
        timestamp: DateTime<Local>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_name: sender_name.into(),
            timestamp,
            content: content.into(),
            kind: MessageKind::Chat,
            show_sender: true,
            continued: false,
            hidden: false,
            collapse: None,
            info: String::new(),
            sender_label: String::new(),
            when: String::new(),
            full_date: String::new(),
        }
    }

    /// System notices get a locally generated id so they can be addressed
    /// by expand/collapse requests.
    pub fn notice(kind: MessageKind, content: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            id: format!("n-{}", Uuid::new_v4()),
            sender_name: String::new(),
            timestamp,
            content: content.into(),
            kind,
            show_sender: false,
            continued: false,
            hidden: false,
            collapse: None,
            info: String::new(),
            sender_label: String::new(),
            when: String::new(),
            full_date: String::new(),
        }
    }

    /// Fill in the display strings shown next to the message.
    pub fn process(&mut self, now: DateTime<Local>, name_max_chars: usize) {
        self.sender_label = trim_name(&self.sender_name, name_max_chars);
        self.when = format_message_timestamp(self.timestamp, now);
        self.full_date = format_full_timestamp(self.timestamp);
    }

    pub fn is_chat(&self) -> bool {
        self.kind == MessageKind::Chat
    }

    /// Rows this entry occupies in the message list; hidden entries take none.
    pub fn height(&self) -> usize {
        if self.hidden {
            0
        } else {
            self.content.lines().count().max(1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub gravatar_hash: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub typing: bool,
    #[serde(default)]
    pub is_owner: bool,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravatar_hash: String::new(),
            active: true,
            typing: false,
            is_owner: false,
        }
    }
}

/// One row of the lobby's public room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyRoom {
    pub name: String,
    pub count: usize,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub description: String,
}
