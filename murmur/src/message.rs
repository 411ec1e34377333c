//! The unit of the stream and the rules it must satisfy before the store
//! accepts it.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, TimeZone, Utc};

use crate::{constants::MAX_TEXT_LEN, error::InvalidInput};

/// A message as stored and delivered. Created once by the persistence layer
/// on append and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    /// Strictly increasing, never reused.
    pub id: i64,
    pub sender: String,
    pub text: String,
    /// Creation time in epoch milliseconds (UTC).
    pub created_at: i64,
}

impl Message {
    /// The creation time, if it's representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}

/// Renders the message as a chat line: `[HH:MM] sender: text`.
impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.created_at_utc() {
            Some(ts) => write!(f, "[{}] {}: {}", ts.format("%H:%M"), self.sender, self.text),
            None => write!(f, "[{}] {}: {}", self.created_at, self.sender, self.text),
        }
    }
}

/// Current time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Printable ascii plus newline and tab.
fn is_allowed(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\t' | 0x20..=0x7E)
}

fn check_ascii(field: &'static str, value: &str) -> Result<(), InvalidInput> {
    match value.bytes().position(|b| !is_allowed(b)) {
        Some(position) => Err(InvalidInput::NonAscii { field, position }),
        None => Ok(()),
    }
}

/// Check a message against the acceptance rules: both fields non-empty,
/// printable ascii only (plus `\n` and `\t`) and a body of at most
/// [MAX_TEXT_LEN] bytes.
pub fn validate(sender: &str, text: &str) -> Result<(), InvalidInput> {
    if sender.is_empty() {
        return Err(InvalidInput::EmptySender);
    }
    if text.is_empty() {
        return Err(InvalidInput::EmptyText);
    }
    if text.len() > MAX_TEXT_LEN {
        return Err(InvalidInput::TextTooLong {
            len: text.len(),
            limit: MAX_TEXT_LEN,
        });
    }
    check_ascii("sender", sender)?;
    check_ascii("text", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_message() {
        assert_eq!(validate("Bob", "hi"), Ok(()));
        assert_eq!(validate("Bob", "line one\n\tline two ~"), Ok(()));
    }

    #[test]
    fn rejects_oversized_text() {
        let text = "x".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(
            validate("Bob", &text),
            Err(InvalidInput::TextTooLong {
                len: 1025,
                limit: 1024
            })
        );
        assert_eq!(validate("Bob", &"x".repeat(MAX_TEXT_LEN)), Ok(()));
    }

    #[test]
    fn rejects_non_ascii() {
        // zero width space between "Ali" and "ce"
        assert_eq!(
            validate("Ali\u{200B}ce", "x"),
            Err(InvalidInput::NonAscii {
                field: "sender",
                position: 3
            })
        );
        assert!(validate("Bob", "caf\u{e9}").is_err());
        assert!(validate("Bob", "bell\u{7}").is_err());
        assert!(validate("Bob", "del\u{7f}").is_err());
        assert!(validate("Bob", "cr\r").is_err());
    }

    #[test]
    fn rejects_empty_fields() {
        assert_eq!(validate("", "hi"), Err(InvalidInput::EmptySender));
        assert_eq!(validate("Bob", ""), Err(InvalidInput::EmptyText));
    }

    #[test]
    fn display_as_chat_line() {
        let message = Message {
            id: 1,
            sender: "A".to_string(),
            text: "one".to_string(),
            // 2023-11-14T22:13:20Z
            created_at: 1_700_000_000_000,
        };
        assert_eq!(message.to_string(), "[22:13] A: one");
    }
}
