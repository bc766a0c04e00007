use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::desktop_notifications::AlertSink;
use crate::events::{EventSender, InboundEvent, OutboundEvent};
use crate::model::{Command, LobbyRoom, Message, MessageKind, User};
use crate::services::{AutocompleteService, Candidates, MessageService, PaginationService};
use crate::state::{
    collapse, ActivateOutcome, AppConfig, DesktopAlert, FocusState, PrependOutcome, Room,
    RoomRegistry, TimelineItem,
};

/// Presentation state of the whole client, driven one event at a time.
pub struct App {
    pub registry: RoomRegistry,
    pub focus: FocusState,
    pub commands: Vec<Command>,
    pub config: AppConfig,
    /// Signed-in user; messages naming them count as mentions.
    pub current_user: Option<String>,
    alerts: Box<dyn AlertSink>,
    events: EventSender,
    clock: fn() -> DateTime<Local>,
}

impl App {
    pub fn new(
        config: AppConfig,
        alerts_enabled: bool,
        alerts: Box<dyn AlertSink>,
        events: EventSender,
    ) -> App {
        App {
            registry: RoomRegistry::new(&config.lobby_name),
            focus: FocusState::new(alerts_enabled),
            commands: Vec::new(),
            config,
            current_user: None,
            alerts,
            events,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for date headers and notice timestamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> App {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Local> {
        (self.clock)()
    }

    fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.config.toast_timeout_ms)
    }

    fn emit(&self, event: OutboundEvent) {
        self.events.emit(event);
    }

    fn room_mut(&mut self, name: Option<&str>) -> Option<&mut Room> {
        let room = match name {
            Some(name) => self.registry.resolve_mut(name),
            None => self.registry.active_mut(),
        };
        if room.is_none() {
            debug!(room = ?name, "dropping operation for unknown room");
        }
        room
    }

    pub fn handle_event(&mut self, event: InboundEvent) -> bool {
        match event {
            InboundEvent::AddRoom { room } => self.add_room(&room),
            InboundEvent::RemoveRoom { room } => self.remove_room(&room),
            InboundEvent::SetActiveRoom { room } => self.set_active_room(&room),
            InboundEvent::NavigateToRoom { room } => self.navigate_to_room(&room),
            InboundEvent::CloseRoom { room } => self.close_room(&room),
            InboundEvent::AddUser { user, room } => self.add_user(user, &room),
            InboundEvent::RemoveUser { user, room } => self.remove_user(&user, &room),
            InboundEvent::ChangeUserName { old_name, user, room } => {
                self.change_user_name(&old_name, &user, &room)
            }
            InboundEvent::ChangeAvatar { user, room } => self.change_avatar(&user, &room),
            InboundEvent::SetUserActivity { user } => self.set_user_activity(&user),
            InboundEvent::SetUserTyping { user, room, typing } => {
                self.set_user_typing(&user, &room, typing)
            }
            InboundEvent::AddChatMessage { message, room } => self.add_chat_message(message, &room),
            InboundEvent::PrependChatMessages { messages, room } => {
                self.prepend_chat_messages(messages, &room)
            }
            InboundEvent::AppendMessageContent { id, content } => {
                self.append_message_content(&id, &content)
            }
            InboundEvent::AddSystemNotice { content, kind, room } => self
                .add_system_notice(&content, kind, room.as_deref())
                .is_some(),
            InboundEvent::UpdateUnread { room, is_mentioned } => {
                self.update_unread(room.as_deref(), is_mentioned)
            }
            InboundEvent::PopulateLobbyRoomList { rooms } => {
                self.populate_lobby_room_list(rooms);
                true
            }
            InboundEvent::UpdateLobbyRoomCount { room, count, private } => {
                self.update_lobby_room_count(&room, count, private)
            }
            InboundEvent::SetRoomLocked { room } => self.set_room_locked(&room),
            InboundEvent::SetRoomOwner { user, room } => self.set_room_owner(&user, &room),
            InboundEvent::ClearRoomOwner { user, room } => self.clear_room_owner(&user, &room),
            InboundEvent::SetInitialized { room } => self.set_initialized(&room),
            InboundEvent::SetCommands { commands } => {
                self.set_commands(commands);
                true
            }
            InboundEvent::SetCurrentUser { name } => {
                self.current_user = Some(name);
                true
            }
            InboundEvent::Autocomplete { input } => !self.autocomplete(&input).is_empty(),
            InboundEvent::Scroll { room, offset } => self.scroll(&room, offset),
            InboundEvent::Focus => {
                self.focus();
                true
            }
            InboundEvent::Blur => {
                self.blur();
                true
            }
            InboundEvent::AlertActivated => {
                self.alert_activated();
                true
            }
            InboundEvent::ExpandNotifications { room, id } => self.expand_notifications(&room, &id),
            InboundEvent::CollapseNotifications { room, id } => {
                self.collapse_notifications(&room, &id)
            }
            InboundEvent::SubmitMessage { text } => self.submit_message(&text),
            InboundEvent::Typing => {
                self.emit(OutboundEvent::Typing);
                true
            }
            InboundEvent::HistoryPrev => {
                self.emit(OutboundEvent::HistoryNavigatePrev);
                true
            }
            InboundEvent::HistoryNext => {
                self.emit(OutboundEvent::HistoryNavigateNext);
                true
            }
            InboundEvent::ToggleDesktopAlerts => {
                self.toggle_desktop_alerts();
                true
            }
        }
    }

    // --- Rooms ---

    pub fn add_room(&mut self, name: &str) -> bool {
        match self.registry.create(name) {
            Ok(_) => true,
            Err(e) => {
                debug!("add_room: {}", e);
                false
            }
        }
    }

    pub fn remove_room(&mut self, name: &str) -> bool {
        let was_active = self.registry.resolve(name).is_some_and(Room::is_active);
        match self.registry.remove(name) {
            Ok(_) => {
                if was_active {
                    let lobby = self.registry.lobby().name.clone();
                    self.emit(OutboundEvent::ActiveRoomChanged { room: lobby });
                }
                true
            }
            Err(e) => {
                debug!("remove_room: {}", e);
                false
            }
        }
    }

    /// Switch rooms. Returns false when the room is unknown; the caller has to
    /// open it first.
    pub fn set_active_room(&mut self, name: &str) -> bool {
        match self.registry.set_active(name) {
            Ok(ActivateOutcome::AlreadyActive) => {}
            Ok(ActivateOutcome::Switched) => self.trigger_focus(),
            Err(e) => {
                debug!("set_active_room: {}", e);
                return false;
            }
        }
        let room = self
            .registry
            .resolve(name)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| name.to_string());
        self.emit(OutboundEvent::ActiveRoomChanged { room });
        true
    }

    /// Route to a room, requesting it be opened when it is not joined yet.
    pub fn navigate_to_room(&mut self, name: &str) -> bool {
        if self.set_active_room(name) {
            return true;
        }
        info!(room = name, "requesting room open");
        self.emit(OutboundEvent::OpenRoom { room: name.to_string() });
        false
    }

    pub fn close_room(&mut self, name: &str) -> bool {
        let Some(room) = self.registry.resolve(name) else {
            return false;
        };
        let room = room.name.clone();
        self.emit(OutboundEvent::CloseRoom { room });
        true
    }

    pub fn set_room_locked(&mut self, room: &str) -> bool {
        match self.room_mut(Some(room)) {
            Some(room) => {
                room.lock();
                true
            }
            None => false,
        }
    }

    pub fn set_initialized(&mut self, room: &str) -> bool {
        match self.room_mut(Some(room)) {
            Some(room) => {
                room.set_initialized();
                true
            }
            None => false,
        }
    }

    // --- Lobby listing ---

    pub fn populate_lobby_room_list(&mut self, rooms: Vec<LobbyRoom>) {
        self.registry.populate_lobby(rooms);
    }

    pub fn update_lobby_room_count(&mut self, room: &str, count: usize, private: bool) -> bool {
        self.registry.update_lobby_room_count(room, count, private)
    }

    // --- Users ---

    pub fn add_user(&mut self, user: User, room: &str) -> bool {
        self.room_mut(Some(room)).is_some_and(|r| r.add_user(user))
    }

    pub fn remove_user(&mut self, name: &str, room: &str) -> bool {
        self.room_mut(Some(room)).is_some_and(|r| r.remove_user(name))
    }

    pub fn change_user_name(&mut self, old_name: &str, user: &User, room: &str) -> bool {
        self.room_mut(Some(room))
            .is_some_and(|r| r.rename_user(old_name, user))
    }

    pub fn change_avatar(&mut self, user: &User, room: &str) -> bool {
        match self.room_mut(Some(room)).and_then(|r| r.user_mut(&user.name)) {
            Some(existing) => {
                existing.gravatar_hash = user.gravatar_hash.clone();
                true
            }
            None => false,
        }
    }

    /// Activity is per user, so every room listing them is updated.
    pub fn set_user_activity(&mut self, user: &User) -> bool {
        let mut found = false;
        for room in self.registry.rooms_mut() {
            if let Some(existing) = room.user_mut(&user.name) {
                existing.active = user.active;
                found = true;
            }
        }
        found
    }

    pub fn set_user_typing(&mut self, name: &str, room: &str, typing: bool) -> bool {
        match self.room_mut(Some(room)).and_then(|r| r.user_mut(name)) {
            Some(user) => {
                user.typing = typing;
                true
            }
            None => false,
        }
    }

    pub fn set_room_owner(&mut self, name: &str, room: &str) -> bool {
        self.mark_owner(name, room, true)
    }

    pub fn clear_room_owner(&mut self, name: &str, room: &str) -> bool {
        self.mark_owner(name, room, false)
    }

    fn mark_owner(&mut self, name: &str, room: &str, is_owner: bool) -> bool {
        match self.room_mut(Some(room)).and_then(|r| r.user_mut(name)) {
            Some(user) => {
                user.is_owner = is_owner;
                true
            }
            None => false,
        }
    }

    // --- Messages ---

    pub fn add_chat_message(&mut self, mut message: Message, room: &str) -> bool {
        let now = self.now();
        message.process(now, self.config.sender_label_max_chars);
        let Some(target) = self.room_mut(Some(room)) else {
            return false;
        };
        let room_name = target.name.clone();
        target.timeline.append_message(message.clone(), now);

        if self.focus.should_alert() {
            self.toast_message(&message, room_name);
        }
        true
    }

    pub fn prepend_chat_messages(&mut self, mut messages: Vec<Message>, room: &str) -> bool {
        let now = self.now();
        for message in &mut messages {
            message.process(now, self.config.sender_label_max_chars);
        }
        let Some(target) = self.room_mut(Some(room)) else {
            return false;
        };
        let outcome = target.timeline.prepend_history(messages);
        PaginationService::on_batch(target, outcome == PrependOutcome::Exhausted);
        true
    }

    /// Stream more content into a message, wherever it lives.
    pub fn append_message_content(&mut self, id: &str, content: &str) -> bool {
        let found = self
            .registry
            .rooms_mut()
            .any(|room| room.timeline.append_content(id, content));
        if !found {
            debug!(id, "no message to append content to");
        }
        found
    }

    /// Add a system notice to `room` (the active room when `None`).
    /// Returns the notice id.
    pub fn add_system_notice(
        &mut self,
        content: &str,
        kind: MessageKind,
        room: Option<&str>,
    ) -> Option<String> {
        let now = self.now();
        let threshold = self.config.collapse_run_threshold;
        let target = self.room_mut(room)?;

        let mut notice = Message::notice(kind, content, now);
        notice.process(now, 0);
        let id = notice.id.clone();
        let index = target.timeline.push_notice(notice);
        if kind == MessageKind::Notification && !target.is_lobby {
            collapse::collapse_run(&mut target.timeline, index, threshold);
        }
        Some(id)
    }

    /// Count an unread message. Skipped while the room is on screen.
    ///
    /// Without an explicit `is_mentioned`, the room's newest chat message is
    /// checked for the current user's name.
    pub fn update_unread(&mut self, room: Option<&str>, is_mentioned: Option<bool>) -> bool {
        let has_focus = self.focus.has_focus();
        let threshold = self.config.separator_unread_threshold;
        let me = self.current_user.clone();
        let Some(target) = self.room_mut(room) else {
            return false;
        };
        if has_focus && target.is_active() {
            return false;
        }
        let is_mentioned =
            is_mentioned.unwrap_or_else(|| me.is_some_and(|me| mentions_user(target, &me)));
        target.update_unread(is_mentioned, threshold);
        true
    }

    pub fn submit_message(&mut self, text: &str) -> bool {
        let sent = match MessageService::validate_message(text) {
            Ok(text) => {
                self.emit(OutboundEvent::SendMessage { text });
                true
            }
            Err(e) => {
                debug!("not sending: {}", e);
                false
            }
        };

        self.trigger_focus();
        if let Some(room) = self.registry.active_mut() {
            room.remove_separator();
        }
        sent
    }

    pub fn set_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
    }

    pub fn candidates(&self, prefix: char) -> Candidates<'_> {
        AutocompleteService::candidates(prefix, &self.registry, &self.commands)
    }

    /// Offer completed input lines for the trailing `@`, `#` or `/` word.
    pub fn autocomplete(&self, input: &str) -> Vec<String> {
        let Some((prefix, partial)) = AutocompleteService::query(input) else {
            return Vec::new();
        };
        let completions: Vec<String> =
            AutocompleteService::complete(self.candidates(prefix), partial)
                .iter()
                .map(|name| AutocompleteService::apply_suggestion(input, prefix, partial, name))
                .collect();
        self.emit(OutboundEvent::Completions {
            input: input.to_string(),
            completions: completions.clone(),
        });
        completions
    }

    // --- Scrolling ---

    pub fn scroll(&mut self, room: &str, offset: usize) -> bool {
        let threshold = self.config.scroll_top_threshold;
        let Some(target) = self.room_mut(Some(room)) else {
            return false;
        };
        match PaginationService::on_scroll(target, offset, threshold) {
            Some(request) => {
                debug!(room = %request.room, before = %request.before, "fetching older history");
                self.emit(OutboundEvent::FetchOlderHistory {
                    room: request.room,
                    before_message_id: request.before,
                });
                true
            }
            None => false,
        }
    }

    pub fn expand_notifications(&mut self, room: &str, id: &str) -> bool {
        let Some(target) = self.room_mut(Some(room)) else {
            return false;
        };
        let Some(adjust) = collapse::expand(&mut target.timeline, id, target.scroll_top) else {
            return false;
        };
        target.scroll_top = adjust.offset;
        let room = target.name.clone();
        self.emit(OutboundEvent::ScrollTo {
            room,
            offset: adjust.offset,
        });
        true
    }

    pub fn collapse_notifications(&mut self, room: &str, id: &str) -> bool {
        self.room_mut(Some(room))
            .is_some_and(|r| collapse::collapse(&mut r.timeline, id))
    }

    // --- Focus and desktop alerts ---

    pub fn blur(&mut self) {
        self.focus.blur();
        self.emit(OutboundEvent::FocusChanged { focused: false });
    }

    /// Window regained focus: clear the active room's unread state and drop
    /// any alert still showing.
    pub fn focus(&mut self) {
        if let Some(room) = self.registry.active_mut() {
            room.make_active();
        }
        self.trigger_focus();
    }

    fn trigger_focus(&mut self) {
        if self.focus.focus().is_some() {
            self.alerts.dismiss();
        }
        self.emit(OutboundEvent::FocusChanged { focused: true });
    }

    /// The user clicked the desktop alert.
    pub fn alert_activated(&mut self) {
        self.emit(OutboundEvent::RequestWindowFocus);
    }

    pub fn toggle_desktop_alerts(&mut self) -> bool {
        let enabled = self.focus.toggle_alerts();
        info!(enabled, "desktop alerts toggled");
        enabled
    }

    fn toast_message(&mut self, message: &Message, room: String) {
        if !self.alerts.permission_granted() {
            debug!("desktop alerts not permitted");
            return;
        }
        let (title, body) = MessageService::alert_text(
            &message.sender_name,
            &message.content,
            self.config.sender_label_max_chars,
            self.config.toast_body_max_chars,
        );
        let alert = DesktopAlert { room, title, body };
        let timeout = self.toast_timeout();

        if let Some(replaced) = self.focus.set_alert(alert.clone(), Instant::now(), timeout) {
            debug!(room = %replaced.room, "replacing desktop alert");
        }
        self.alerts.show(&alert, timeout);
    }

    /// Periodic housekeeping; closes an alert whose time is up.
    pub fn on_tick(&mut self, now: Instant) {
        if self.focus.should_close_alert(now) {
            if let Some(alert) = self.focus.clear_alert() {
                debug!(room = %alert.room, "desktop alert expired");
            }
            self.alerts.dismiss();
        }
    }

    /// Inbound events that failed to decode end up here.
    pub fn reject(&self, line: &str, error: &serde_json::Error) {
        warn!("Ignoring malformed event {:?}: {}", line, error);
    }
}

fn mentions_user(room: &Room, name: &str) -> bool {
    room.timeline
        .items()
        .iter()
        .rev()
        .filter_map(TimelineItem::as_message)
        .find(|m| m.is_chat())
        .is_some_and(|m| m.sender_name != name && MessageService::is_mentioned(&m.content, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop_notifications::RecordingAlerts;
    use crate::ui::time_format::format_message_timestamp;
    use chrono::TimeZone;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 6, 16, 12, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn app_with(alerts: RecordingAlerts) -> (App, UnboundedReceiver<OutboundEvent>) {
        let (events, rx) = EventSender::channel();
        let app = App::new(AppConfig::default(), true, Box::new(alerts), events)
            .with_clock(fixed_now);
        (app, rx)
    }

    fn app() -> (App, UnboundedReceiver<OutboundEvent>) {
        app_with(RecordingAlerts::new(true))
    }

    fn drain(rx: &mut UnboundedReceiver<OutboundEvent>) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn chat(id: &str, sender: &str, content: &str) -> Message {
        Message::chat(id, sender, fixed_now(), content)
    }

    #[test]
    fn switching_rooms_emits_change_and_focus() {
        let (mut app, mut rx) = app();
        assert!(app.add_room("General"));
        assert!(!app.add_room("general"));
        drain(&mut rx);

        assert!(app.set_active_room("General"));
        assert_eq!(
            drain(&mut rx),
            vec![
                OutboundEvent::FocusChanged { focused: true },
                OutboundEvent::ActiveRoomChanged { room: "General".into() },
            ]
        );

        // already active: only the change signal repeats
        assert!(app.set_active_room("General"));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::ActiveRoomChanged { room: "General".into() }]
        );
    }

    #[test]
    fn navigating_to_unknown_room_requests_open() {
        let (mut app, mut rx) = app();
        assert!(!app.navigate_to_room("Elsewhere"));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::OpenRoom { room: "Elsewhere".into() }]
        );
    }

    #[test]
    fn unread_ignored_for_focused_active_room() {
        let (mut app, _rx) = app();
        app.add_room("General");
        app.set_active_room("General");

        assert!(!app.update_unread(None, Some(true)));
        app.blur();
        assert!(app.update_unread(None, Some(true)));

        let room = app.registry.resolve("General").expect("room");
        assert_eq!(room.unread_count, 1);
        assert_eq!(room.label(), "*(1) General");

        app.focus();
        let room = app.registry.resolve("General").expect("room");
        assert_eq!(room.unread_count, 0);
        assert!(!room.has_mentions);
    }

    #[test]
    fn lobby_listing_orders_by_count() {
        let (mut app, _rx) = app();
        app.populate_lobby_room_list(vec![
            LobbyRoom { name: "A".into(), count: 3, private: false },
            LobbyRoom { name: "B".into(), count: 10, private: false },
        ]);
        let order: Vec<_> = app.candidates('#').collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn unfocused_message_raises_alert_until_refocus() {
        let alerts = RecordingAlerts::new(true);
        let shown = alerts.shown.clone();
        let dismissed = alerts.dismissed.clone();
        let (mut app, mut rx) = app_with(alerts);

        app.add_room("General");
        app.set_active_room("General");
        app.blur();

        app.add_chat_message(chat("1", "alice", "first"), "General");
        app.add_chat_message(chat("2", "bob", "hello there"), "General");

        let current = app.focus.current_alert().expect("alert showing").clone();
        assert_eq!(current.title, "bob");
        assert_eq!(current.body, "hello there");
        assert_eq!(shown.borrow().len(), 2);

        drain(&mut rx);
        app.focus();
        assert_eq!(app.focus.current_alert(), None);
        assert_eq!(dismissed.get(), 1);
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::FocusChanged { focused: true }]
        );
    }

    #[test]
    fn alert_expires_on_tick() {
        let alerts = RecordingAlerts::new(true);
        let dismissed = alerts.dismissed.clone();
        let (mut app, _rx) = app_with(alerts);
        app.add_room("General");
        app.blur();

        app.add_chat_message(chat("1", "alice", "ping"), "General");
        assert!(app.focus.current_alert().is_some());

        app.on_tick(Instant::now());
        assert!(app.focus.current_alert().is_some());

        app.on_tick(Instant::now() + Duration::from_secs(11));
        assert_eq!(app.focus.current_alert(), None);
        assert_eq!(dismissed.get(), 1);
    }

    #[test]
    fn no_alert_without_permission_or_while_focused() {
        let alerts = RecordingAlerts::new(false);
        let shown = alerts.shown.clone();
        let (mut app, _rx) = app_with(alerts);
        app.add_room("General");

        app.add_chat_message(chat("1", "alice", "focused"), "General");
        app.blur();
        app.add_chat_message(chat("2", "alice", "no permission"), "General");
        assert!(shown.borrow().is_empty());
        assert_eq!(app.focus.current_alert(), None);
    }

    #[test]
    fn alert_activation_requests_window_focus() {
        let (mut app, mut rx) = app();
        assert!(app.handle_event(InboundEvent::AlertActivated));
        assert_eq!(drain(&mut rx), vec![OutboundEvent::RequestWindowFocus]);
    }

    #[test]
    fn exhausted_history_stops_pagination() {
        let (mut app, mut rx) = app();
        app.add_room("General");
        app.add_chat_message(chat("42", "alice", "hi"), "General");

        assert!(app.scroll("General", 2));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::FetchOlderHistory {
                room: "General".into(),
                before_message_id: "42".into(),
            }]
        );

        assert!(app.prepend_chat_messages(Vec::new(), "General"));
        for offset in [0, 3, 5] {
            assert!(!app.scroll("General", offset));
        }
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn notification_runs_collapse_outside_lobby() {
        let (mut app, mut rx) = app();
        app.add_room("General");

        let mut last = None;
        for n in 0..4 {
            last = app.add_system_notice(
                &format!("user{n} joined"),
                MessageKind::Notification,
                Some("General"),
            );
        }
        let last = last.expect("notice id");
        let visible = |app: &App| {
            app.registry
                .resolve("General")
                .map(|r| r.timeline.messages().filter(|m| !m.hidden).count())
                .unwrap_or_default()
        };
        assert_eq!(visible(&app), 1);

        assert!(app.expand_notifications("General", &last));
        assert_eq!(visible(&app), 4);
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::ScrollTo { room: "General".into(), offset: 4 }]
        );

        assert!(app.collapse_notifications("General", &last));
        assert_eq!(visible(&app), 1);

        for n in 0..4 {
            app.add_system_notice(&format!("user{n} joined"), MessageKind::Notification, None);
        }
        assert!(app.registry.lobby().timeline.messages().all(|m| !m.hidden));
    }

    #[test]
    fn submit_sends_trimmed_text_and_clears_separator() {
        let (mut app, mut rx) = app();
        app.add_room("General");
        app.set_initialized("General");
        // one more after the separator keeps it through activation
        for n in 0..6 {
            app.add_chat_message(chat(&n.to_string(), "alice", "hi"), "General");
            app.update_unread(Some("General"), Some(false));
        }
        app.set_active_room("General");
        assert!(app
            .registry
            .resolve("General")
            .is_some_and(|r| r.timeline.has_separator()));
        drain(&mut rx);

        assert!(!app.submit_message("   "));
        assert!(app.submit_message("  hello  "));
        assert_eq!(
            drain(&mut rx),
            vec![
                OutboundEvent::FocusChanged { focused: true },
                OutboundEvent::SendMessage { text: "hello".into() },
                OutboundEvent::FocusChanged { focused: true },
            ]
        );
        let room = app.registry.resolve("General").expect("room");
        assert!(!room
            .timeline
            .items()
            .iter()
            .any(|i| matches!(i, TimelineItem::Separator { .. })));
    }

    #[test]
    fn separator_lands_before_first_unread_message() {
        let (mut app, _rx) = app();
        app.add_room("General");
        app.set_active_room("General");
        app.add_chat_message(chat("r1", "alice", "read"), "General");
        app.add_chat_message(chat("r2", "alice", "read too"), "General");
        app.set_initialized("General");
        app.set_active_room("Lobby");

        for n in 1..=7 {
            let id = format!("m{n}");
            app.add_chat_message(chat(&id, "bob", "news"), "General");
            app.update_unread(Some("General"), Some(false));
        }

        let room = app.registry.resolve("General").expect("room");
        assert_eq!(room.unread_count, 7);
        let items = room.timeline.items();
        let at = items
            .iter()
            .position(|i| matches!(i, TimelineItem::Separator { .. }))
            .expect("separator placed");
        let id_at = |idx: usize| items.get(idx).and_then(TimelineItem::as_message).map(|m| m.id.as_str());
        assert_eq!(id_at(at - 1), Some("r2"));
        assert_eq!(id_at(at + 1), Some("m1"));
        let order: Vec<&str> = room.timeline.messages().map(|m| m.id.as_str()).collect();
        assert_eq!(order.iter().position(|id| *id == "m1"), Some(2));
    }

    #[test]
    fn reenabled_alerts_reach_the_desktop() {
        let alerts = RecordingAlerts::new(true);
        let shown = alerts.shown.clone();
        let (events, _rx) = EventSender::channel();
        let mut app = App::new(AppConfig::default(), false, Box::new(alerts), events)
            .with_clock(fixed_now);
        app.add_room("General");
        app.blur();

        app.add_chat_message(chat("1", "alice", "while off"), "General");
        assert!(shown.borrow().is_empty());

        assert!(app.toggle_desktop_alerts());
        app.add_chat_message(chat("2", "alice", "while on"), "General");
        assert_eq!(shown.borrow().len(), 1);
        assert_eq!(
            app.focus.current_alert().map(|a| a.body.as_str()),
            Some("while on")
        );
    }

    #[test]
    fn unread_mentions_come_from_newest_message() {
        let (mut app, _rx) = app();
        app.add_room("General");
        app.add_room("Random");
        app.handle_event(InboundEvent::SetCurrentUser { name: "alice".into() });

        app.add_chat_message(chat("1", "bob", "hey @Alice, look"), "General");
        assert!(app.handle_event(InboundEvent::UpdateUnread {
            room: Some("General".into()),
            is_mentioned: None,
        }));
        let general = app.registry.resolve("General").expect("room");
        assert!(general.has_mentions);
        assert_eq!(general.label(), "*(1) General");

        // own messages and near misses do not count
        app.add_chat_message(chat("2", "alice", "alice here"), "Random");
        app.update_unread(Some("Random"), None);
        app.add_chat_message(chat("3", "bob", "malice"), "Random");
        app.update_unread(Some("Random"), None);
        assert!(!app.registry.resolve("Random").expect("room").has_mentions);

        // an explicit flag wins
        app.update_unread(Some("Random"), Some(true));
        assert!(app.registry.resolve("Random").expect("room").has_mentions);
    }

    #[test]
    fn autocomplete_emits_completed_lines() {
        let (mut app, mut rx) = app();
        app.add_room("General");
        app.set_active_room("General");
        for name in ["bob", "Alice", "albert"] {
            app.add_user(User::new(name), "General");
        }
        drain(&mut rx);

        assert!(app.handle_event(InboundEvent::Autocomplete { input: "hey @al".into() }));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::Completions {
                input: "hey @al".into(),
                completions: vec!["hey @albert ".into(), "hey @Alice ".into()],
            }]
        );

        assert!(!app.handle_event(InboundEvent::Autocomplete { input: "plain words".into() }));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn user_events_update_membership() {
        let (mut app, _rx) = app();
        app.add_room("General");
        app.add_room("Random");
        assert!(app.add_user(User::new("alice"), "General"));
        assert!(!app.add_user(User::new("alice"), "General"));
        assert!(app.add_user(User::new("alice"), "Random"));

        let mut idle = User::new("alice");
        idle.active = false;
        assert!(app.set_user_activity(&idle));
        assert!(app.registry.rooms().all(|r| r.user("alice").map_or(true, |u| !u.active)));

        assert!(app.set_room_owner("alice", "General"));
        assert!(app.set_user_typing("alice", "General", true));
        let room = app.registry.resolve("General").expect("room");
        let alice = room.user("alice").expect("alice");
        assert!(alice.is_owner && alice.typing);

        assert!(app.clear_room_owner("alice", "General"));
        assert!(app.remove_user("alice", "General"));
        assert!(!app.remove_user("alice", "General"));
        assert!(!app.add_user(User::new("ghost"), "Nowhere"));
    }

    #[test]
    fn incoming_messages_get_display_strings() {
        let (mut app, _rx) = app();
        app.add_room("General");
        let long_name = "a_very_long_sender_name_indeed";
        app.add_chat_message(chat("1", long_name, "hi"), "General");

        let room = app.registry.resolve("General").expect("room");
        let message = room.timeline.find("1").expect("message");
        assert_eq!(message.sender_label, "a_very_long_sender_na...");
        assert_eq!(message.when, format_message_timestamp(fixed_now(), fixed_now()));
        assert!(message.full_date.contains("2025"));
    }

    #[test]
    fn streamed_content_finds_message_in_any_room() {
        let (mut app, _rx) = app();
        app.add_room("General");
        app.add_chat_message(chat("7", "alice", "part one"), "General");
        assert!(app.append_message_content("7", ", part two"));
        assert!(!app.append_message_content("8", "lost"));
        let room = app.registry.resolve("General").expect("room");
        assert_eq!(
            room.timeline.find("7").map(|m| m.content.as_str()),
            Some("part one, part two")
        );
    }

    #[test]
    fn removing_active_room_falls_back_to_lobby() {
        let (mut app, mut rx) = app();
        app.add_room("General");
        app.set_active_room("General");
        drain(&mut rx);

        assert!(app.remove_room("General"));
        assert!(!app.remove_room("Lobby"));
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::ActiveRoomChanged { room: "Lobby".into() }]
        );
    }
}
