//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{MemberInfo, MessageContent, RoomDetail, RoomEvent, RoomSummary};
use crate::infrastructure::dto::{http, websocket};

// ========================================
// DTO → Domain
// ========================================

impl From<websocket::InboundChatMessage> for MessageContent {
    fn from(dto: websocket::InboundChatMessage) -> Self {
        MessageContent::new(dto.message)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&RoomEvent> for websocket::OutboundChatMessage {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::ChatMessage { message } => Self {
                message: message.as_str().to_string(),
            },
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            name: summary.name.into_string(),
            member_count: summary.member_count,
            created_at: timestamp_to_rfc3339(summary.created_at.value()),
        }
    }
}

impl From<MemberInfo> for http::MemberDto {
    fn from(member: MemberInfo) -> Self {
        Self {
            connection_id: member.connection_id.to_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        }
    }
}

impl From<RoomDetail> for http::RoomDetailDto {
    fn from(detail: RoomDetail) -> Self {
        Self {
            name: detail.name.into_string(),
            created_at: timestamp_to_rfc3339(detail.created_at.value()),
            members: detail.members.into_iter().map(Into::into).collect(),
        }
    }
}
