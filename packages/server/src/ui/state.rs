//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::{
    config::ServerConfig,
    domain::RoomRegistry,
    usecase::{
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（Room 詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Outbound queue size of each new connection
    pub outbound_capacity: usize,
    /// How long a closing connection may flush queued frames
    pub close_grace: Duration,
}

impl AppState {
    /// Wire every use case to the same registry.
    pub fn new(registry: Arc<dyn RoomRegistry>, config: &ServerConfig) -> Self {
        Self {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(registry.clone())),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(registry.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                registry.clone(),
                config.broadcast_scope(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(registry.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(registry)),
            outbound_capacity: config.outbound_capacity,
            close_grace: config.close_grace(),
        }
    }
}
