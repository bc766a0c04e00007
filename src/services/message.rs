use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::ui::labels::{preview, trim_name};

// a word, optionally written as an @mention
static WORD_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"@?([\w\-]+)").ok());

const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message cannot be empty")]
    Empty,
    #[error("Message too long (max {0} characters)")]
    TooLong(usize),
}

/// Service for message validation and processing
pub struct MessageService;

impl MessageService {
    /// Validate message content
    pub fn validate_message(content: &str) -> Result<String, MessageError> {
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return Err(MessageError::Empty);
        }

        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(MessageError::TooLong(MAX_MESSAGE_CHARS));
        }

        Ok(trimmed.to_string())
    }

    /// Whether `content` addresses `name`, either as `@name` or as a whole word.
    pub fn is_mentioned(content: &str, name: &str) -> bool {
        let Some(re) = WORD_RE.as_ref() else {
            return false;
        };
        let name = name.to_lowercase();
        !name.is_empty()
            && re
                .captures_iter(content)
                .filter_map(|cap| cap.get(1))
                .any(|word| word.as_str().to_lowercase() == name)
    }

    /// Title and body of the desktop alert raised for a message.
    pub fn alert_text(sender: &str, content: &str, name_max: usize, body_max: usize) -> (String, String) {
        (trim_name(sender, name_max), preview(content, body_max))
    }
}
