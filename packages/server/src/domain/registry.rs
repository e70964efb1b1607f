//! RoomRegistry trait 定義
//!
//! ルーム名 → Room の対応を管理するプロセス全体のレジストリのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 不変条件
//!
//! - Room はメンバーが 1 人以上いる間だけレジストリに存在する
//! - 同じルーム名に対する join / leave / broadcast は互いに線形化可能
//! - broadcast は配送時点でメンバーである接続にのみ配送する

use std::sync::Arc;

use async_trait::async_trait;

use super::{Connection, ConnectionId, RegistryError, RoomEvent, RoomName, Timestamp};

/// Whether the sender receives its own broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastScope {
    /// Echo back to the sender as well (baseline behavior)
    #[default]
    IncludeSender,
    ExcludeSender,
}

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist and was created for this connection
    Created,
    /// The connection was added to an existing room
    Joined,
    /// The connection was already a member; nothing changed
    AlreadyMember,
}

/// Result of a leave (leave never fails)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Removed; the room still has members
    Left,
    /// Removed; the room became empty and was deleted
    RoomDeleted,
    /// The room or the member was already absent
    NotMember,
}

/// Per-broadcast delivery summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients whose outbound path accepted the event
    pub delivered: usize,
    /// Recipients that failed delivery and were removed from the room
    pub dropped: Vec<ConnectionId>,
    /// Recipients that left after the snapshot but before delivery
    pub skipped: usize,
}

/// Identity and join time of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

/// Short description of a live room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: RoomName,
    pub member_count: usize,
    pub created_at: Timestamp,
}

/// Detailed view of a live room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetail {
    pub name: RoomName,
    pub created_at: Timestamp,
    pub members: Vec<MemberInfo>,
}

/// Room Registry trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Room に接続を追加する（Room が無ければ作成する）
    ///
    /// 同じ接続の 2 回目の join は何もしない（`JoinOutcome::AlreadyMember`）。
    async fn join(
        &self,
        room_name: &RoomName,
        connection: Arc<dyn Connection>,
    ) -> Result<JoinOutcome, RegistryError>;

    /// Room から接続を削除する（空になった Room は削除する）
    async fn leave(&self, room_name: &RoomName, connection_id: &ConnectionId) -> LeaveOutcome;

    /// Room の現在のメンバーにイベントを配送する
    ///
    /// Room が存在しない場合は何もしない。配送に失敗したメンバーは
    /// 閉じられ、leave と同じ経路で Room から削除される。
    async fn broadcast(
        &self,
        room_name: &RoomName,
        sender: &ConnectionId,
        event: RoomEvent,
        scope: BroadcastScope,
    ) -> Result<BroadcastReport, RegistryError>;

    /// メンバーのいる Room の一覧を名前順で取得
    async fn rooms(&self) -> Vec<RoomSummary>;

    /// Room の詳細を取得
    async fn room(&self, room_name: &RoomName) -> Option<RoomDetail>;
}
