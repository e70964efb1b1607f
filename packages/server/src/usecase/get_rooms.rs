//! UseCase: Room 一覧取得

use std::sync::Arc;

use crate::domain::{RoomRegistry, RoomSummary};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// メンバーのいる Room を名前順で返す
    pub async fn execute(&self) -> Vec<RoomSummary> {
        self.registry.rooms().await
    }
}
