use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::User;
use crate::state::registry::RoomId;
use crate::state::timeline::Timeline;
use crate::ui::labels::tab_label;

/// Whether a room is the one currently on screen. `locked` is tracked
/// separately on the room since it combines with either state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    Inactive,
    Active,
}

/// Presentation state of a single room.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub is_lobby: bool,
    pub status: RoomStatus,
    pub locked: bool,
    /// History has been loaded at least once.
    pub initialized: bool,
    pub unread_count: usize,
    pub has_mentions: bool,
    /// Unread count recorded when the current separator was placed.
    pub last_separator_unread: usize,
    pub history_exhausted: bool,
    pub timeline: Timeline,
    pub users: Vec<User>,
    pub access_key: Option<char>,
    /// Last reported scroll offset of the message list, in rows from the top.
    pub scroll_top: usize,
    /// Oldest message id of a history request not yet answered.
    pub pending_history_request: Option<String>,
    label: String,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>, is_lobby: bool) -> Self {
        let name = name.into();
        Self {
            id,
            label: name.clone(),
            name,
            is_lobby,
            status: RoomStatus::Inactive,
            locked: false,
            initialized: false,
            unread_count: 0,
            has_mentions: false,
            last_separator_unread: 0,
            history_exhausted: false,
            timeline: Timeline::new(),
            users: Vec::new(),
            access_key: None,
            scroll_top: 0,
            pending_history_request: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RoomStatus::Active
    }

    /// Caption shown on the room's tab.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn make_active(&mut self) {
        let unread_before = self.unread_count;

        self.status = RoomStatus::Active;
        self.unread_count = 0;
        self.has_mentions = false;
        self.label = self.name.clone();

        // nothing new arrived since the separator went in
        if unread_before <= self.last_separator_unread && self.timeline.remove_separator() {
            debug!(room = %self.name, "removed read separator");
            self.last_separator_unread = 0;
        }
    }

    pub fn make_inactive(&mut self) {
        self.status = RoomStatus::Inactive;
    }

    /// Count one more unread message. Places the separator when the count
    /// reaches `separator_threshold` on an inactive, initialized room.
    pub fn update_unread(&mut self, is_mentioned: bool, separator_threshold: usize) {
        self.unread_count += 1;
        self.has_mentions |= is_mentioned;
        self.label = tab_label(&self.name, self.unread_count, self.has_mentions);

        if self.needs_separator(separator_threshold) {
            self.place_separator();
        }
    }

    fn needs_separator(&self, threshold: usize) -> bool {
        !self.is_lobby && !self.is_active() && self.initialized && self.unread_count == threshold
    }

    fn place_separator(&mut self) {
        if self.timeline.has_separator() {
            self.timeline.remove_separator();
        }
        let unread = self.unread_count;
        self.timeline.insert_separator_before_recent(unread, unread);
        self.last_separator_unread = unread;
        debug!(room = %self.name, unread, "placed unread separator");
    }

    pub fn remove_separator(&mut self) -> bool {
        let removed = self.timeline.remove_separator();
        if removed {
            self.last_separator_unread = 0;
        }
        removed
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn set_initialized(&mut self) {
        self.initialized = true;
    }

    // --- Users ---

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn user_mut(&mut self, name: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.name == name)
    }

    /// Returns false when a user with that name is already present.
    pub fn add_user(&mut self, user: User) -> bool {
        if self.user(&user.name).is_some() {
            return false;
        }
        self.users.push(user);
        true
    }

    pub fn remove_user(&mut self, name: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.name != name);
        before != self.users.len()
    }

    /// Rename a member and every message reference to them. Refused when the
    /// new name already belongs to someone else in the room.
    pub fn rename_user(&mut self, old_name: &str, user: &User) -> bool {
        if old_name != user.name && self.user(&user.name).is_some() {
            debug!(room = %self.name, from = old_name, to = %user.name, "rename would duplicate member");
            return false;
        }
        let Some(existing) = self.user_mut(old_name) else {
            return false;
        };
        existing.name = user.name.clone();
        self.timeline.rename_sender(old_name, &user.name);
        true
    }
}
