use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::model::{Command, LobbyRoom, Message, MessageKind, User};

/// Requests and signals sent from the client core to its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum OutboundEvent {
    SendMessage { text: String },
    OpenRoom { room: String },
    CloseRoom { room: String },
    FetchOlderHistory { room: String, before_message_id: String },
    ActiveRoomChanged { room: String },
    Typing,
    FocusChanged { focused: bool },
    HistoryNavigatePrev,
    HistoryNavigateNext,
    /// Keep an expanded notification run anchored on screen.
    ScrollTo { room: String, offset: usize },
    RequestWindowFocus,
    /// Full input lines the current draft can be completed to.
    Completions { input: String, completions: Vec<String> },
}

/// Everything the transport and window layers can tell the client core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InboundEvent {
    AddRoom { room: String },
    RemoveRoom { room: String },
    SetActiveRoom { room: String },
    /// Route to a room, asking for it to be opened when it is not known yet.
    NavigateToRoom { room: String },
    CloseRoom { room: String },
    AddUser { user: User, room: String },
    RemoveUser { user: String, room: String },
    ChangeUserName { old_name: String, user: User, room: String },
    ChangeAvatar { user: User, room: String },
    SetUserActivity { user: User },
    SetUserTyping { user: String, room: String, typing: bool },
    AddChatMessage { message: Message, room: String },
    PrependChatMessages { messages: Vec<Message>, room: String },
    AppendMessageContent { id: String, content: String },
    AddSystemNotice {
        content: String,
        kind: MessageKind,
        #[serde(default)]
        room: Option<String>,
    },
    UpdateUnread {
        #[serde(default)]
        room: Option<String>,
        /// Derived from the room's newest message when left out.
        #[serde(default)]
        is_mentioned: Option<bool>,
    },
    PopulateLobbyRoomList { rooms: Vec<LobbyRoom> },
    UpdateLobbyRoomCount {
        room: String,
        count: usize,
        #[serde(default)]
        private: bool,
    },
    SetRoomLocked { room: String },
    SetRoomOwner { user: String, room: String },
    ClearRoomOwner { user: String, room: String },
    SetInitialized { room: String },
    SetCommands { commands: Vec<Command> },
    /// Name of the signed-in user, used for mention detection.
    SetCurrentUser { name: String },
    /// Complete the trailing `@`, `#` or `/` word of the draft.
    Autocomplete { input: String },
    Scroll { room: String, offset: usize },
    Focus,
    Blur,
    AlertActivated,
    ExpandNotifications { room: String, id: String },
    CollapseNotifications { room: String, id: String },
    SubmitMessage { text: String },
    Typing,
    HistoryPrev,
    HistoryNext,
    ToggleDesktopAlerts,
}

/// Fire-and-forget handle for outbound events.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<OutboundEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: OutboundEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!("Dropping outbound event, receiver is gone: {:?}", e.0);
        }
    }
}
