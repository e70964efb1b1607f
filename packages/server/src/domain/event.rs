//! Events fanned out to the members of a room.

use super::value_object::MessageContent;

/// Envelope delivered to every recipient's outbound path.
///
/// Constructed once per broadcast and shared between recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// A chat message sent by one member of the room
    ChatMessage { message: MessageContent },
}

impl RoomEvent {
    pub fn chat_message(message: MessageContent) -> Self {
        Self::ChatMessage { message }
    }

    /// Event type name (`"chat_message"`)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatMessage { .. } => "chat_message",
        }
    }
}
