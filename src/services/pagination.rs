use tracing::debug;

use crate::state::Room;

/// Ask for messages older than `before` in `room`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub room: String,
    pub before: String,
}

/// Business logic for scroll-triggered history loading
pub struct PaginationService;

impl PaginationService {
    /// Record a scroll position and decide whether older history is due.
    ///
    /// A request goes out when the list is within `threshold` rows of the top,
    /// the room still has older history, and a chat message exists to anchor
    /// the query. While a request for the same anchor is outstanding no
    /// further request is made.
    pub fn on_scroll(room: &mut Room, offset: usize, threshold: usize) -> Option<HistoryRequest> {
        room.scroll_top = offset;

        if offset > threshold || room.history_exhausted {
            return None;
        }
        let before = room.timeline.oldest_chat_message()?.id.clone();
        if room.pending_history_request.as_deref() == Some(before.as_str()) {
            debug!(room = %room.name, before, "history request already in flight");
            return None;
        }

        room.pending_history_request = Some(before.clone());
        Some(HistoryRequest {
            room: room.name.clone(),
            before,
        })
    }

    /// A batch arrived (possibly empty); the next scroll may ask again.
    pub fn on_batch(room: &mut Room, exhausted: bool) {
        room.pending_history_request = None;
        if exhausted {
            debug!(room = %room.name, "history exhausted");
            room.history_exhausted = true;
        }
    }
}
