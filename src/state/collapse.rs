use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Message, MessageKind};
use crate::state::timeline::{Timeline, TimelineItem};
use crate::ui::labels::collapse_label;

/// Affordance attached to the visible entry of a notification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum CollapseState {
    /// Run is folded; `hidden` entries sit behind an "expand" link.
    Expand { hidden: usize },
    /// Run is unfolded; the link folds it again.
    Collapse { hidden: usize },
}

/// New scroll offset (rows from the top) that keeps an expanded anchor in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAdjust {
    pub offset: usize,
}

fn is_notification(item: &TimelineItem) -> bool {
    item.as_message()
        .is_some_and(|m| m.kind == MessageKind::Notification)
}

/// Contiguous notification entries directly before `index`.
fn run_before(timeline: &Timeline, index: usize) -> Range<usize> {
    let items = timeline.items();
    let mut start = index.min(items.len());
    while start > 0 && is_notification(&items[start - 1]) {
        start -= 1;
    }
    start..index
}

fn set_state(message: &mut Message, state: CollapseState) {
    message.info = collapse_label(&state);
    message.collapse = Some(state);
}

fn set_hidden(timeline: &mut Timeline, run: Range<usize>, hidden: bool) {
    for item in &mut timeline.items_mut()[run] {
        if let Some(message) = item.as_message_mut() {
            message.hidden = hidden;
            if hidden {
                message.collapse = None;
                message.info.clear();
            }
        }
    }
}

/// Fold the notification run ending at `index` when it is longer than
/// `threshold`. Returns the number of hidden entries.
pub fn collapse_run(timeline: &mut Timeline, index: usize, threshold: usize) -> Option<usize> {
    if !timeline.items().get(index).is_some_and(is_notification) {
        return None;
    }

    let run = run_before(timeline, index);
    let hidden = run.len();
    if hidden < threshold {
        return None;
    }

    set_hidden(timeline, run, true);
    let anchor = timeline.items_mut()[index].as_message_mut()?;
    anchor.hidden = false;
    set_state(anchor, CollapseState::Expand { hidden });
    debug!(hidden, "collapsed notification run");
    Some(hidden)
}

/// Reveal the run folded behind the notification `id`.
///
/// `scroll_top` is the current offset of the message list; the returned
/// offset keeps the anchor entry where the reader last saw it.
pub fn expand(timeline: &mut Timeline, id: &str, scroll_top: usize) -> Option<ScrollAdjust> {
    let index = timeline.position(id)?;
    let hidden = match timeline.items()[index].as_message()?.collapse {
        Some(CollapseState::Expand { hidden }) => hidden,
        _ => return None,
    };

    let top_before = timeline.top_of(index);
    let run = run_before(timeline, index);
    set_hidden(timeline, run, false);

    let anchor = timeline.items_mut()[index].as_message_mut()?;
    set_state(anchor, CollapseState::Collapse { hidden });
    let anchor_height = anchor.height();

    let top_after = timeline.top_of(index);
    let offset = (scroll_top + top_after + anchor_height).saturating_sub(top_before);
    Some(ScrollAdjust { offset })
}

/// Fold a previously expanded run again.
pub fn collapse(timeline: &mut Timeline, id: &str) -> bool {
    let Some(index) = timeline.position(id) else {
        return false;
    };
    let is_expanded = timeline.items()[index]
        .as_message()
        .is_some_and(|m| matches!(m.collapse, Some(CollapseState::Collapse { .. })));
    if !is_expanded {
        return false;
    }

    let run = run_before(timeline, index);
    let hidden = run.len();
    set_hidden(timeline, run, true);
    if let Some(anchor) = timeline.items_mut()[index].as_message_mut() {
        set_state(anchor, CollapseState::Expand { hidden });
    }
    true
}
