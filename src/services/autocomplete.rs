use std::slice;

use crate::model::{Command, LobbyRoom, User};
use crate::state::RoomRegistry;

/// Candidate names for one trigger prefix. Cloning restarts the sequence.
#[derive(Debug, Clone)]
pub enum Candidates<'a> {
    Users(slice::Iter<'a, User>),
    Rooms(slice::Iter<'a, LobbyRoom>),
    Commands(slice::Iter<'a, Command>),
    Empty,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Candidates::Users(users) => users.next().map(|u| u.name.as_str()),
            Candidates::Rooms(rooms) => rooms.next().map(|r| r.name.as_str()),
            Candidates::Commands(commands) => commands.next().map(|c| c.name.as_str()),
            Candidates::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Candidates::Users(users) => users.size_hint(),
            Candidates::Rooms(rooms) => rooms.size_hint(),
            Candidates::Commands(commands) => commands.size_hint(),
            Candidates::Empty => (0, Some(0)),
        }
    }
}

/// Business logic for prefix-triggered completion
pub struct AutocompleteService;

impl AutocompleteService {
    /// `@` users of the active room, `#` rooms in the lobby listing,
    /// `/` registered commands.
    pub fn candidates<'a>(
        prefix: char,
        registry: &'a RoomRegistry,
        commands: &'a [Command],
    ) -> Candidates<'a> {
        match prefix {
            '@' => registry
                .active()
                .map(|room| Candidates::Users(room.users.iter()))
                .unwrap_or(Candidates::Empty),
            '#' => Candidates::Rooms(registry.lobby_listing().iter()),
            '/' => Candidates::Commands(commands.iter()),
            _ => Candidates::Empty,
        }
    }

    /// Candidates starting with `partial`, ignoring case, sorted.
    pub fn complete(candidates: Candidates<'_>, partial: &str) -> Vec<String> {
        let partial = partial.to_lowercase();
        let mut matches: Vec<String> = candidates
            .filter(|name| name.to_lowercase().starts_with(&partial))
            .map(str::to_string)
            .collect();
        matches.sort_by_key(|name| name.to_lowercase());
        matches
    }

    /// Trigger prefix and partial word at the end of `input`, if the last
    /// word starts with one.
    pub fn query(input: &str) -> Option<(char, &str)> {
        let word_start = input
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let word = &input[word_start..];
        let prefix = word.chars().next()?;
        if !matches!(prefix, '@' | '#' | '/') {
            return None;
        }
        // commands only complete at the start of the line
        if prefix == '/' && word_start != 0 {
            return None;
        }
        let partial = &word[prefix.len_utf8()..];
        if partial
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
        {
            Some((prefix, partial))
        } else {
            None
        }
    }

    /// Replace the trailing `prefix partial` word of `input` with the chosen
    /// suggestion followed by a space.
    pub fn apply_suggestion(input: &str, prefix: char, partial: &str, suggestion: &str) -> String {
        let mut result = input.to_string();
        let token = format!("{prefix}{partial}");
        if let Some(idx) = input.rfind(&token) {
            result.replace_range(idx..idx + token.len(), &format!("{prefix}{suggestion} "));
        }
        result
    }
}
