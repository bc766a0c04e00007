use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Message, MessageKind};
use crate::ui::time_format::{format_date_delimiter, is_different_day};

/// One entry of a room's message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "kebab-case")]
pub enum TimelineItem {
    Message(Message),
    /// Boundary between read and unread content, tagged with the unread
    /// count at placement.
    Separator { unread: usize },
}

impl TimelineItem {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            TimelineItem::Message(message) => Some(message),
            TimelineItem::Separator { .. } => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut Message> {
        match self {
            TimelineItem::Message(message) => Some(message),
            TimelineItem::Separator { .. } => None,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            TimelineItem::Message(message) => message.height(),
            TimelineItem::Separator { .. } => 1,
        }
    }

    fn is_chat(&self) -> bool {
        self.as_message().is_some_and(Message::is_chat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrependOutcome {
    Prepended(usize),
    /// Empty batch: there is no older history left.
    Exhausted,
}

/// Ordered message list of one room, with sender grouping and date headers.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    items: Vec<TimelineItem>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [TimelineItem] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.items.iter().filter_map(TimelineItem::as_message)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_message().is_some_and(|m| m.id == id))
    }

    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages().find(|m| m.id == id)
    }

    /// Oldest loaded chat message; its id anchors history pagination.
    pub fn oldest_chat_message(&self) -> Option<&Message> {
        self.messages().find(|m| m.is_chat())
    }

    fn last_message_mut(&mut self) -> Option<&mut Message> {
        self.items.iter_mut().rev().find_map(TimelineItem::as_message_mut)
    }

    /// Append a live chat message. Returns the index it landed at.
    ///
    /// The sender label is hidden when the previous entry is a chat message
    /// from the same sender, and a date header is inserted when the calendar
    /// day changes (against `now` for an empty timeline).
    pub fn append_message(&mut self, mut message: Message, now: DateTime<Local>) -> usize {
        let mut previous_timestamp = now;
        let mut show_sender = true;

        if let Some(previous) = self.last_message_mut() {
            previous_timestamp = previous.timestamp;
            if previous.is_chat() && previous.sender_name == message.sender_name {
                show_sender = false;
                previous.continued = true;
            }
        }
        message.show_sender = show_sender;

        if is_different_day(message.timestamp, previous_timestamp) {
            let header = Message::notice(
                MessageKind::ListHeader,
                format_date_delimiter(message.timestamp),
                message.timestamp,
            );
            debug!(day = %header.content, "inserting date header");
            self.items.push(TimelineItem::Message(header));
        }

        self.items.push(TimelineItem::Message(message));
        self.items.len() - 1
    }

    /// Append a system notice as-is. Returns the index it landed at.
    pub fn push_notice(&mut self, notice: Message) -> usize {
        self.items.push(TimelineItem::Message(notice));
        self.items.len() - 1
    }

    /// Insert a batch of older history (chronological order) before the
    /// current oldest entry.
    pub fn prepend_history(&mut self, batch: Vec<Message>) -> PrependOutcome {
        if batch.is_empty() {
            return PrependOutcome::Exhausted;
        }

        let mut prepared: Vec<TimelineItem> = Vec::with_capacity(batch.len());
        for mut message in batch {
            let mut show_sender = true;
            if let Some(TimelineItem::Message(previous)) = prepared.last_mut() {
                if previous.sender_name == message.sender_name {
                    show_sender = false;
                    previous.continued = true;
                }
            }
            message.show_sender = show_sender;
            prepared.push(TimelineItem::Message(message));
        }

        let count = prepared.len();
        self.items.splice(0..0, prepared);
        PrependOutcome::Prepended(count)
    }

    /// Stream more content into an existing message.
    pub fn append_content(&mut self, id: &str, content: &str) -> bool {
        match self
            .items
            .iter_mut()
            .filter_map(TimelineItem::as_message_mut)
            .find(|m| m.id == id)
        {
            Some(message) => {
                message.content.push_str(content);
                true
            }
            None => false,
        }
    }

    /// Re-point sender references after a nick change. Returns how many
    /// messages were touched.
    pub fn rename_sender(&mut self, old_name: &str, new_name: &str) -> usize {
        let mut renamed = 0;
        for message in self.items.iter_mut().filter_map(TimelineItem::as_message_mut) {
            if message.is_chat() && message.sender_name == old_name {
                message.sender_name = new_name.to_string();
                renamed += 1;
            }
        }
        renamed
    }

    pub fn has_separator(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, TimelineItem::Separator { .. }))
    }

    pub fn separator_unread(&self) -> Option<usize> {
        self.items.iter().find_map(|item| match item {
            TimelineItem::Separator { unread } => Some(*unread),
            TimelineItem::Message(_) => None,
        })
    }

    pub fn remove_separator(&mut self) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !matches!(item, TimelineItem::Separator { .. }));
        before != self.items.len()
    }

    /// Place a separator immediately before the `recent` most recent chat
    /// messages. With fewer chat messages loaded it goes before the oldest.
    pub fn insert_separator_before_recent(&mut self, recent: usize, unread: usize) -> usize {
        let chat_positions: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_chat())
            .map(|(index, _)| index)
            .collect();

        let index = if recent == 0 {
            self.items.len()
        } else if recent <= chat_positions.len() {
            chat_positions[chat_positions.len() - recent]
        } else {
            chat_positions.first().copied().unwrap_or(self.items.len())
        };

        self.items.insert(index, TimelineItem::Separator { unread });
        index
    }

    /// Rows above the entry at `index`.
    pub fn top_of(&self, index: usize) -> usize {
        self.items[..index.min(self.items.len())]
            .iter()
            .map(TimelineItem::height)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, d, h, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn chat(id: &str, sender: &str, d: u32, h: u32) -> Message {
        Message::chat(id, sender, at(d, h), format!("hello from {sender}"))
    }

    fn message(timeline: &Timeline, id: &str) -> Message {
        timeline.find(id).expect("message should exist").clone()
    }

    #[test]
    fn same_sender_continues_previous_message() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 9), at(10, 9));
        timeline.append_message(chat("2", "alice", 10, 10), at(10, 10));
        timeline.append_message(chat("3", "bob", 10, 11), at(10, 11));

        assert!(message(&timeline, "1").continued);
        assert!(!message(&timeline, "2").show_sender);
        assert!(!message(&timeline, "2").continued);
        assert!(message(&timeline, "3").show_sender);
    }

    #[test]
    fn day_change_inserts_exactly_one_header() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 22), at(10, 22));
        timeline.append_message(chat("2", "bob", 11, 9), at(11, 9));

        let headers: Vec<_> = timeline
            .messages()
            .filter(|m| m.kind == MessageKind::ListHeader)
            .collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].content, "March 11th, 2025");
        assert_eq!(timeline.position(&headers[0].id), Some(1));
        assert_eq!(timeline.position("2"), Some(2));
    }

    #[test]
    fn first_message_compares_against_now() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 9), at(12, 9));
        assert_eq!(timeline.len(), 2);

        let mut same_day = Timeline::new();
        same_day.append_message(chat("1", "alice", 12, 9), at(12, 18));
        assert_eq!(same_day.len(), 1);
    }

    #[test]
    fn notices_break_sender_grouping() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 9), at(10, 9));
        timeline.push_notice(Message::notice(MessageKind::Notification, "bob joined", at(10, 9)));
        timeline.append_message(chat("2", "alice", 10, 10), at(10, 10));

        assert!(!message(&timeline, "1").continued);
        assert!(message(&timeline, "2").show_sender);
    }

    #[test]
    fn prepends_history_batch_before_oldest() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("10", "carol", 10, 12), at(10, 12));

        let outcome = timeline.prepend_history(vec![
            chat("7", "alice", 10, 8),
            chat("8", "alice", 10, 9),
            chat("9", "bob", 10, 10),
        ]);

        assert_eq!(outcome, PrependOutcome::Prepended(3));
        let ids: Vec<_> = timeline.messages().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "8", "9", "10"]);
        assert!(message(&timeline, "7").show_sender);
        assert!(message(&timeline, "7").continued);
        assert!(!message(&timeline, "8").show_sender);
        assert!(message(&timeline, "9").show_sender);
    }

    #[test]
    fn empty_history_batch_reports_exhausted() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.prepend_history(Vec::new()), PrependOutcome::Exhausted);
        assert!(timeline.is_empty());
    }

    #[test]
    fn streams_content_into_existing_message() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 9), at(10, 9));
        assert!(timeline.append_content("1", " and more"));
        assert!(!timeline.append_content("404", "lost"));
        assert_eq!(message(&timeline, "1").content, "hello from alice and more");
    }

    #[test]
    fn separator_goes_before_recent_chat_messages() {
        let mut timeline = Timeline::new();
        for id in 1..=6 {
            timeline.append_message(chat(&id.to_string(), "alice", 10, 9), at(10, 9));
        }

        let index = timeline.insert_separator_before_recent(5, 5);
        assert_eq!(index, timeline.position("2").expect("message 2") - 1);
        assert_eq!(timeline.separator_unread(), Some(5));

        assert!(timeline.remove_separator());
        assert!(!timeline.has_separator());
    }

    #[test]
    fn renames_sender_references() {
        let mut timeline = Timeline::new();
        timeline.append_message(chat("1", "alice", 10, 9), at(10, 9));
        timeline.append_message(chat("2", "bob", 10, 9), at(10, 9));
        assert_eq!(timeline.rename_sender("alice", "alicia"), 1);
        assert_eq!(message(&timeline, "1").sender_name, "alicia");
    }
}
