//! UseCase: Room からの退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, LeaveOutcome, RoomName, RoomRegistry};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 退出を実行（既に退出済みでも失敗しない）
    pub async fn execute(&self, room_name: &RoomName, connection_id: &ConnectionId) -> LeaveOutcome {
        self.registry.leave(room_name, connection_id).await
    }
}
