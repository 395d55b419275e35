use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;
use crate::models::{ChatMessage, ChatRequest, Role};

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 3500;
const CARD_IDS: std::ops::RangeInclusive<u32> = 1..=15;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>?").unwrap();
}

// Shape checks that serde can't express
pub fn validate_chat_request(req: &ChatRequest, max_message_chars: usize) -> Result<(), AppError> {
    if let Some(card) = req.card_id {
        if !CARD_IDS.contains(&card) {
            return Err(AppError::BadRequest(format!(
                "cardId must be between {} and {}",
                CARD_IDS.start(),
                CARD_IDS.end()
            )));
        }
    }

    // only the newest user message is length checked
    if let Some(last) = req.messages.last() {
        if last.role == Role::User && last.content.chars().count() > max_message_chars {
            return Err(AppError::BadRequest(format!(
                "Message exceeds {} characters limit.",
                max_message_chars
            )));
        }
    }

    Ok(())
}

// Basic HTML tag stripping
pub fn sanitize_input(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

// User content gets sanitized, assistant/system turns pass through
pub fn sanitize_messages(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    messages
        .into_iter()
        .map(|m| match m.role {
            Role::User => ChatMessage {
                content: sanitize_input(&m.content),
                ..m
            },
            _ => m,
        })
        .collect()
}
