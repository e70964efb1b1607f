//! UseCase layer: application operations on top of the room registry.

mod error;
mod get_room_detail;
mod get_rooms;
mod join_room;
mod leave_room;
mod send_message;

pub use error::{GetRoomDetailError, JoinError, SendMessageError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
