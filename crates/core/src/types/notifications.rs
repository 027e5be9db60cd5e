//! Seller notification queue and its single-column text encoding.
//!
//! Messages are joined with `;`. Inside a message, `\` is written `\\`, `;`
//! is written `\;`, and a leading `-` is written `\-`, so no non-empty queue
//! can encode to the empty sentinel `-1`. The decoder treats `\x` as a literal
//! `x` for any `x`, which also reads rows written by encoders that escaped
//! only `;`.

use std::fmt;

use crate::types::EMPTY_SENTINEL;

/// Errors from appending to a [`Notifications`] queue.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification message cannot be empty")]
    EmptyMessage,
}

/// An ordered queue of user-visible messages.
///
/// ```
/// use bazaar_core::Notifications;
///
/// let mut queue = Notifications::decode("-1");
/// queue.push("Lamp; brass").unwrap();
/// queue.push("Chair").unwrap();
/// assert_eq!(queue.encode(), "Lamp\\; brass;Chair");
///
/// let drained = Notifications::decode(&queue.encode());
/// assert_eq!(drained.messages(), ["Lamp; brass", "Chair"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    messages: Vec<String>,
}

impl Notifications {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Decode the stored text form. Every input decodes; `-1` and the empty
    /// string are the empty queue.
    #[must_use]
    pub fn decode(text: &str) -> Self {
        if text.is_empty() || text == EMPTY_SENTINEL {
            return Self::new();
        }

        let mut messages = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => current.push(chars.next().unwrap_or('\\')),
                ';' => {
                    if !current.is_empty() {
                        messages.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            messages.push(current);
        }

        Self { messages }
    }

    /// Encode to the stored text form.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.messages.is_empty() {
            return EMPTY_SENTINEL.to_owned();
        }
        self.messages
            .iter()
            .map(|m| escape(m))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Append a message at the end of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::EmptyMessage`] for an empty message.
    pub fn push(&mut self, message: impl Into<String>) -> Result<(), NotificationError> {
        let message = message.into();
        if message.is_empty() {
            return Err(NotificationError::EmptyMessage);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Append `message` to the stored queue `text`, returning the new text.
///
/// # Errors
///
/// Returns [`NotificationError::EmptyMessage`] for an empty message.
pub fn append_notification(text: &str, message: &str) -> Result<String, NotificationError> {
    let mut queue = Notifications::decode(text);
    queue.push(message)?;
    Ok(queue.encode())
}

/// Read every queued message from `text`.
///
/// Returns the messages in append order together with the text the column
/// must be reset to. Persisting the reset is the caller's job; once it is
/// persisted the messages are gone.
#[must_use]
pub fn drain_notifications(text: &str) -> (Vec<String>, &'static str) {
    (Notifications::decode(text).into_messages(), EMPTY_SENTINEL)
}

fn escape(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 2);
    for (i, c) in message.chars().enumerate() {
        match c {
            '\\' | ';' => {
                out.push('\\');
                out.push(c);
            }
            '-' if i == 0 => out.push_str("\\-"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_empty() {
        assert!(Notifications::decode("-1").is_empty());
        assert!(Notifications::decode("").is_empty());
        assert_eq!(Notifications::new().encode(), "-1");
    }

    #[test]
    fn test_append_to_empty_then_existing() {
        let text = append_notification("-1", "Table").unwrap();
        assert_eq!(text, "Table");
        let text = append_notification(&text, "Bicycle").unwrap();
        assert_eq!(text, "Table;Bicycle");
    }

    #[test]
    fn test_drain_returns_messages_in_order_and_resets() {
        let mut text = "-1".to_owned();
        for name in ["first", "second; with semicolon", "third"] {
            text = append_notification(&text, name).unwrap();
        }
        let (messages, reset) = drain_notifications(&text);
        assert_eq!(messages, ["first", "second; with semicolon", "third"]);
        assert_eq!(reset, "-1");
        assert!(drain_notifications(reset).0.is_empty());
    }

    #[test]
    fn test_messages_that_look_like_encoding_round_trip() {
        let tricky = ["-1", "ends with \\", "\\;", "a;b;c", "-", "- 1"];
        let mut queue = Notifications::new();
        for m in tricky {
            queue.push(m).unwrap();
        }
        let encoded = queue.encode();
        assert_ne!(encoded, "-1");
        assert_eq!(Notifications::decode(&encoded).messages(), tricky);
    }

    #[test]
    fn test_single_dash_one_message_does_not_become_sentinel() {
        let text = append_notification("-1", "-1").unwrap();
        assert_eq!(text, "\\-1");
        assert_eq!(drain_notifications(&text).0, ["-1"]);
    }

    #[test]
    fn test_reads_rows_that_only_escaped_semicolons() {
        let queue = Notifications::decode("Sofa\\; green;Lamp");
        assert_eq!(queue.messages(), ["Sofa; green", "Lamp"]);
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_eq!(
            append_notification("-1", ""),
            Err(NotificationError::EmptyMessage)
        );
    }
}
