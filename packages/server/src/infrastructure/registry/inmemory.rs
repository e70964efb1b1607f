//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//!
//! ## ロック設計
//!
//! - `rooms`: ルーム名 → `RoomEntry` のマップ。エントリの検索・追加・削除の間だけ保持する
//! - `RoomEntry::state`: Room ごとの排他スコープ。メンバーの追加・削除とスナップショット取得を保護する
//! - `RoomEntry::delivery`: Room ごとの配送順序ロック。broadcast を発行順に直列化する
//!
//! ロック順序は `delivery` → `state` → `rooms`。`rooms` を保持したまま
//! `state` を待つ処理は存在しない。
//!
//! 最後のメンバーが leave した Room は `state` を `None`（退役）にしてから、
//! `state` を保持したままマップから取り除く。退役したエントリを見つけた
//! join は作り直しからやり直すため、削除と作成が競合してもメンバーが
//! 失われることはない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastReport, BroadcastScope, Connection, ConnectionId, JoinOutcome, LeaveOutcome,
    RegistryError, Room, RoomDetail, RoomEvent, RoomName, RoomRegistry, RoomSummary, Timestamp,
};

struct RoomEntry {
    /// `None` once the room has been retired
    state: Mutex<Option<Room>>,
    delivery: Mutex<()>,
}

impl RoomEntry {
    fn new(room: Room) -> Self {
        Self {
            state: Mutex::new(Some(room)),
            delivery: Mutex::new(()),
        }
    }
}

/// インメモリ Room Registry 実装
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<RoomName, Arc<RoomEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 時刻の取得元を指定して作成（テスト用）
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    async fn entry(&self, room_name: &RoomName) -> Option<Arc<RoomEntry>> {
        self.rooms.lock().await.get(room_name).cloned()
    }

    /// Remove `entry` from the map if it is still the current entry for
    /// `room_name`. Returns `false` if the map holds something else.
    async fn retire(&self, room_name: &RoomName, entry: &Arc<RoomEntry>) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(room_name) {
            Some(current) if Arc::ptr_eq(current, entry) => {
                rooms.remove(room_name);
                true
            }
            _ => false,
        }
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(
        &self,
        room_name: &RoomName,
        connection: Arc<dyn Connection>,
    ) -> Result<JoinOutcome, RegistryError> {
        if connection.room() != room_name {
            return Err(RegistryError::RoomMismatch {
                connection_id: connection.id().to_string(),
                owner: connection.room().to_string(),
                requested: room_name.to_string(),
            });
        }

        loop {
            let entry = {
                let mut rooms = self.rooms.lock().await;
                match rooms.get(room_name) {
                    Some(entry) => entry.clone(),
                    None => {
                        // the first member goes in before the room becomes visible
                        let now = self.now();
                        let mut room = Room::new(room_name.clone(), now);
                        room.add_member(connection.clone(), now);
                        rooms.insert(room_name.clone(), Arc::new(RoomEntry::new(room)));
                        tracing::info!(
                            "Room '{}' created by connection '{}'",
                            room_name,
                            connection.id()
                        );
                        return Ok(JoinOutcome::Created);
                    }
                }
            };

            let mut slot = entry.state.lock().await;
            if let Some(room) = slot.as_mut() {
                if !room.add_member(connection.clone(), self.now()) {
                    tracing::debug!(
                        "Connection '{}' is already a member of room '{}'",
                        connection.id(),
                        room_name
                    );
                    return Ok(JoinOutcome::AlreadyMember);
                }

                tracing::info!(
                    "Connection '{}' joined room '{}' ({} members)",
                    connection.id(),
                    room_name,
                    room.len()
                );
                return Ok(JoinOutcome::Joined);
            }

            // retired by a leave that never finished removing it
            drop(slot);
            self.retire(room_name, &entry).await;
        }
    }

    async fn leave(&self, room_name: &RoomName, connection_id: &ConnectionId) -> LeaveOutcome {
        let Some(entry) = self.entry(room_name).await else {
            return LeaveOutcome::NotMember;
        };

        let mut slot = entry.state.lock().await;
        let Some(room) = slot.as_mut() else {
            return LeaveOutcome::NotMember;
        };

        if room.remove_member(connection_id).is_none() {
            return LeaveOutcome::NotMember;
        }

        if !room.is_empty() {
            tracing::info!(
                "Connection '{}' left room '{}' ({} members)",
                connection_id,
                room_name,
                room.len()
            );
            return LeaveOutcome::Left;
        }

        *slot = None;
        // `slot` stays locked until the entry is gone from the map
        if self.retire(room_name, &entry).await {
            tracing::info!(
                "Connection '{}' left room '{}'; room deleted",
                connection_id,
                room_name
            );
        } else {
            tracing::error!(
                "{}",
                RegistryError::InvariantViolation(format!(
                    "room '{}' was replaced in the registry before it was retired",
                    room_name
                ))
            );
        }
        LeaveOutcome::RoomDeleted
    }

    async fn broadcast(
        &self,
        room_name: &RoomName,
        sender: &ConnectionId,
        event: RoomEvent,
        scope: BroadcastScope,
    ) -> Result<BroadcastReport, RegistryError> {
        let mut report = BroadcastReport::default();
        let Some(entry) = self.entry(room_name).await else {
            tracing::debug!("Room '{}' does not exist, dropping broadcast", room_name);
            return Ok(report);
        };

        let event = Arc::new(event);
        let mut failed: Vec<Arc<dyn Connection>> = Vec::new();
        {
            let _delivery = entry.delivery.lock().await;

            let recipients = {
                let slot = entry.state.lock().await;
                match slot.as_ref() {
                    Some(room) if room.name() == room_name => room.snapshot_members(),
                    Some(room) => {
                        let violation = RegistryError::InvariantViolation(format!(
                            "registry entry '{}' holds room '{}'",
                            room_name,
                            room.name()
                        ));
                        tracing::error!("{}", violation);
                        return Err(violation);
                    }
                    None => return Ok(report),
                }
            };

            for connection in recipients {
                if scope == BroadcastScope::ExcludeSender && connection.id() == sender {
                    continue;
                }

                // membership is re-checked at delivery time
                let result = {
                    let slot = entry.state.lock().await;
                    match slot.as_ref() {
                        Some(room) if room.contains(connection.id()) => {
                            Some(connection.enqueue(event.clone()))
                        }
                        _ => None,
                    }
                };

                match result {
                    Some(Ok(())) => {
                        report.delivered += 1;
                        tracing::debug!(
                            "Delivered {} to connection '{}' in room '{}'",
                            event.kind(),
                            connection.id(),
                            room_name
                        );
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            "Failed to deliver to connection '{}' in room '{}': {}",
                            connection.id(),
                            room_name,
                            e
                        );
                        failed.push(connection);
                    }
                    None => report.skipped += 1,
                }
            }
        }

        for connection in failed {
            connection.close();
            self.leave(room_name, connection.id()).await;
            report.dropped.push(*connection.id());
        }

        Ok(report)
    }

    async fn rooms(&self) -> Vec<RoomSummary> {
        let entries: Vec<Arc<RoomEntry>> = self.rooms.lock().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(entries.len());
        for entry in entries {
            let slot = entry.state.lock().await;
            if let Some(room) = slot.as_ref()
                && !room.is_empty()
            {
                summaries.push(RoomSummary {
                    name: room.name().clone(),
                    member_count: room.len(),
                    created_at: room.created_at(),
                });
            }
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    async fn room(&self, room_name: &RoomName) -> Option<RoomDetail> {
        let entry = self.entry(room_name).await?;
        let slot = entry.state.lock().await;
        let room = slot.as_ref().filter(|room| !room.is_empty())?;

        Some(RoomDetail {
            name: room.name().clone(),
            created_at: room.created_at(),
            members: room.member_infos(),
        })
    }
}
