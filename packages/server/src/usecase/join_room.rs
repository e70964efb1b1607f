//! UseCase: Room への参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：Room の作成、既存 Room への参加
//! - 異常系：不正なルーム名、接続の所属 Room と異なる Room への参加

use std::sync::Arc;

use crate::domain::{Connection, JoinOutcome, RoomName, RoomRegistry};

use super::error::JoinError;

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（Room 管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム名を検証する
    ///
    /// 英数字・ハイフン・ピリオド以外を含む名前は `JoinError::InvalidRoomName`。
    pub fn validate(&self, room_name: &str) -> Result<RoomName, JoinError> {
        Ok(RoomName::try_from(room_name)?)
    }

    /// 接続を、その接続が属する Room に参加させる
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功（作成 / 参加 / 参加済み）
    /// * `Err(JoinError)` - 参加失敗
    pub async fn execute(&self, connection: Arc<dyn Connection>) -> Result<JoinOutcome, JoinError> {
        let room_name = connection.room().clone();
        Ok(self.registry.join(&room_name, connection).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RegistryError, ValueObjectError},
        infrastructure::{connection::ChannelConnection, registry::InMemoryRoomRegistry},
    };

    fn create_usecase() -> (JoinRoomUseCase, Arc<InMemoryRoomRegistry>) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        (JoinRoomUseCase::new(registry.clone()), registry)
    }

    #[tokio::test]
    async fn test_join_creates_then_joins() {
        // テスト項目: 1 人目は Room を作成し、2 人目は参加する
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let lobby = usecase.validate("lobby").unwrap();
        let (alice, _rx_a) = ChannelConnection::new(lobby.clone(), 8);
        let (bob, _rx_b) = ChannelConnection::new(lobby.clone(), 8);

        // when (操作):
        let first = usecase.execute(Arc::new(alice)).await;
        let second = usecase.execute(Arc::new(bob)).await;

        // then (期待する結果):
        assert_eq!(first, Ok(JoinOutcome::Created));
        assert_eq!(second, Ok(JoinOutcome::Joined));
        assert_eq!(registry.room(&lobby).await.unwrap().members.len(), 2);
    }

    #[test]
    fn test_validate_rejects_invalid_room_name() {
        // テスト項目: 不正なルーム名は InvalidRoomName になる
        // given (前提条件):
        let (usecase, _registry) = create_usecase();

        // when (操作):
        let result = usecase.validate("bad room!");

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::InvalidRoomName(ValueObjectError::InvalidRoomName(
                "bad room!".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_registry_error_is_propagated() {
        // テスト項目: Registry のエラーは JoinError::Registry として返される
        // given (前提条件):
        let mut registry = crate::domain::MockRoomRegistry::new();
        registry.expect_join().times(1).returning(|_, _| {
            Err(RegistryError::InvariantViolation("broken".to_string()))
        });
        let usecase = JoinRoomUseCase::new(Arc::new(registry));
        let (alice, _rx) = ChannelConnection::new(RoomName::try_from("lobby").unwrap(), 8);

        // when (操作):
        let result = usecase.execute(Arc::new(alice)).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::Registry(RegistryError::InvariantViolation(
                "broken".to_string()
            )))
        );
    }
}
