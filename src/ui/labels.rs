use crate::state::CollapseState;

/// Tab caption for a room: `*(3) general` with mentions pending, `(3) general`
/// with plain unread messages, or just the name.
pub fn tab_label(name: &str, unread: usize, has_mentions: bool) -> String {
    if unread == 0 {
        return name.to_string();
    }
    let marker = if has_mentions { "*" } else { "" };
    format!("{marker}({unread}) {name}")
}

/// Affordance text appended to the visible entry of a notification run.
pub fn collapse_label(state: &CollapseState) -> String {
    match state {
        CollapseState::Expand { hidden } => {
            format!(" (plus {hidden} hidden... click to expand)")
        }
        CollapseState::Collapse { .. } => " (click to collapse)".to_string(),
    }
}

/// Shorten a sender name for labels and toast titles.
pub fn trim_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars).collect();
    format!("{kept}...")
}

/// Shorten a message body for a toast, keeping room for the ellipsis.
pub fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let kept: String = content.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
