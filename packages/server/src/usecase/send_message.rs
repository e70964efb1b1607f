//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含む全メンバーへの配送（エコーバック）
//! - 正常系：送信者を除外する設定
//! - 異常系：Registry の不変条件違反

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, BroadcastScope, ConnectionId, MessageContent, RoomEvent, RoomName,
    RoomRegistry,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Registry（Room 管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// 送信者自身にも配送するかどうか
    scope: BroadcastScope,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, scope: BroadcastScope) -> Self {
        Self { registry, scope }
    }

    /// メッセージ送信を実行
    ///
    /// `chat_message` イベントを組み立て、Room の現在のメンバーに配送する。
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 配送結果
    /// * `Err(SendMessageError)` - Registry の不変条件違反
    pub async fn execute(
        &self,
        room_name: &RoomName,
        sender: &ConnectionId,
        content: MessageContent,
    ) -> Result<BroadcastReport, SendMessageError> {
        let event = RoomEvent::chat_message(content);
        let report = self
            .registry
            .broadcast(room_name, sender, event, self.scope)
            .await?;

        tracing::debug!(
            "Broadcast in room '{}' from '{}': delivered={}, dropped={}, skipped={}",
            room_name,
            sender,
            report.delivered,
            report.dropped.len(),
            report.skipped
        );

        Ok(report)
    }
}
