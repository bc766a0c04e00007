use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::LobbyRoom;
use crate::state::room::Room;

/// Stable identifier derived from a room's display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase the name and replace every character outside `[a-z0-9]` with `_`.
pub fn room_id(name: &str) -> RoomId {
    let id = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect();
    RoomId(id)
}

/// Access key for the tab at `index`: '1'..'9', then '0', then none.
pub fn access_key(index: usize) -> Option<char> {
    match index {
        0..=8 => char::from_digit(index as u32 + 1, 10),
        9 => Some('0'),
        _ => None,
    }
}

/// Errors that can occur while looking up or mutating rooms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room '{0}' was not found")]
    NotFound(String),
    #[error("room '{0}' already exists")]
    Duplicate(String),
    #[error("the lobby cannot be removed")]
    LobbyPinned,
    #[error("no room is currently active")]
    NoActiveRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// Target was already active; only the change signal is repeated.
    AlreadyActive,
    Switched,
}

/// Index of all open rooms, keyed by derived id, plus the lobby listing.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    order: Vec<RoomId>,
    lobby_id: RoomId,
    active: Option<RoomId>,
    lobby_listing: Vec<LobbyRoom>,
}

impl RoomRegistry {
    /// Create a registry holding only the lobby, which starts active.
    pub fn new(lobby_name: &str) -> Self {
        let lobby_id = room_id(lobby_name);
        let mut lobby = Room::new(lobby_id.clone(), lobby_name, true);
        lobby.make_active();

        let mut registry = Self {
            rooms: HashMap::from([(lobby_id.clone(), lobby)]),
            order: vec![lobby_id.clone()],
            lobby_id: lobby_id.clone(),
            active: Some(lobby_id),
            lobby_listing: Vec::new(),
        };
        registry.assign_access_keys();
        registry
    }

    pub fn resolve(&self, name: &str) -> Option<&Room> {
        self.rooms.get(&room_id(name))
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.get_mut(&room_id(name))
    }

    pub fn lobby(&self) -> &Room {
        &self.rooms[&self.lobby_id]
    }

    pub fn active(&self) -> Option<&Room> {
        self.active.as_ref().and_then(|id| self.rooms.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Room> {
        match &self.active {
            Some(id) => self.rooms.get_mut(id),
            None => None,
        }
    }

    /// Rooms in tab order: lobby first, the rest by name.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.order.iter().filter_map(|id| self.rooms.get(id))
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn create(&mut self, name: &str) -> Result<&mut Room, RoomError> {
        let id = room_id(name);
        if self.rooms.contains_key(&id) {
            return Err(RoomError::Duplicate(name.to_string()));
        }

        info!(room = name, id = %id, "adding room");
        self.rooms.insert(id.clone(), Room::new(id.clone(), name, false));
        self.order.push(id.clone());
        self.reorder_rooms();
        self.assign_access_keys();

        self.rooms
            .get_mut(&id)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))
    }

    /// Drop a room. Removing the active room hands activity back to the lobby.
    pub fn remove(&mut self, name: &str) -> Result<Room, RoomError> {
        let id = room_id(name);
        if id == self.lobby_id {
            return Err(RoomError::LobbyPinned);
        }
        let room = self
            .rooms
            .remove(&id)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;

        info!(room = name, "removing room");
        self.order.retain(|existing| existing != &id);
        if self.active.as_ref() == Some(&id) {
            self.active = Some(self.lobby_id.clone());
            if let Some(lobby) = self.rooms.get_mut(&self.lobby_id) {
                lobby.make_active();
            }
        }
        self.assign_access_keys();
        Ok(room)
    }

    /// Stable sort: lobby pinned first, others case-insensitive by name.
    pub fn reorder_rooms(&mut self) {
        let rooms = &self.rooms;
        let lobby_id = &self.lobby_id;
        self.order.sort_by_cached_key(|id| {
            let name = rooms.get(id).map(|r| r.name.to_lowercase()).unwrap_or_default();
            (id != lobby_id, name)
        });
    }

    pub fn assign_access_keys(&mut self) {
        for (index, id) in self.order.iter().enumerate() {
            if let Some(room) = self.rooms.get_mut(id) {
                room.access_key = access_key(index);
            }
        }
    }

    /// Switch the active room.
    pub fn set_active(&mut self, name: &str) -> Result<ActivateOutcome, RoomError> {
        let id = room_id(name);
        let target_active = self
            .rooms
            .get(&id)
            .map(Room::is_active)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;
        if target_active {
            return Ok(ActivateOutcome::AlreadyActive);
        }

        let current = self.active.clone().ok_or(RoomError::NoActiveRoom)?;
        if let Some(previous) = self.rooms.get_mut(&current) {
            previous.make_inactive();
        }
        if let Some(target) = self.rooms.get_mut(&id) {
            target.make_active();
        }
        self.active = Some(id);
        debug!(from = %current, to = name, "active room changed");
        Ok(ActivateOutcome::Switched)
    }

    // --- Lobby listing ---

    pub fn lobby_listing(&self) -> &[LobbyRoom] {
        &self.lobby_listing
    }

    /// Replace the public room listing, most populated first.
    pub fn populate_lobby(&mut self, mut rooms: Vec<LobbyRoom>) {
        rooms.sort_by(|a, b| b.count.cmp(&a.count));
        self.lobby_listing = rooms;
    }

    pub fn update_lobby_room_count(&mut self, name: &str, count: usize, private: bool) -> bool {
        match self.lobby_listing.iter_mut().find(|r| r.name == name) {
            Some(entry) => {
                entry.count = count;
                entry.private |= private;
                true
            }
            None => false,
        }
    }
}
