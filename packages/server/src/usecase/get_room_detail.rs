//! UseCase: Room 詳細取得

use std::sync::Arc;

use crate::domain::{RoomDetail, RoomName, RoomRegistry};

use super::error::GetRoomDetailError;

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム名を検証し、Room の詳細を返す
    pub async fn execute(&self, room_name: String) -> Result<RoomDetail, GetRoomDetailError> {
        let room_name = RoomName::new(room_name)?;
        self.registry
            .room(&room_name)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
