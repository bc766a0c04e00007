pub mod collapse;
pub mod notification;
pub mod registry;
pub mod room;
pub mod timeline;

pub use collapse::{CollapseState, ScrollAdjust};
pub use notification::{DesktopAlert, FocusState};
pub use registry::{room_id, ActivateOutcome, RoomError, RoomId, RoomRegistry};
pub use room::{Room, RoomStatus};
pub use timeline::{PrependOutcome, Timeline, TimelineItem};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration constants for the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Unread count at which a "new messages" separator is placed.
    pub separator_unread_threshold: usize,
    /// Notification runs longer than this collapse into one entry.
    pub collapse_run_threshold: usize,
    /// Rows from the top at which older history is requested.
    pub scroll_top_threshold: usize,
    pub toast_timeout_ms: u64,
    pub sender_label_max_chars: usize,
    pub toast_body_max_chars: usize,
    pub lobby_name: String,
    pub tick_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            separator_unread_threshold: 5,
            collapse_run_threshold: 3,
            scroll_top_threshold: 5,
            toast_timeout_ms: 10_000,
            sender_label_max_chars: 21,
            toast_body_max_chars: 100,
            lobby_name: "Lobby".to_string(),
            tick_interval_ms: 100,
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Event channel is closed")]
    ChannelClosed,
}

pub type AppResult<T> = Result<T, AppError>;
