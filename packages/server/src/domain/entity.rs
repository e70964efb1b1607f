//! Room entity.

use std::{collections::HashMap, sync::Arc};

use super::{
    connection::Connection,
    registry::MemberInfo,
    value_object::{ConnectionId, RoomName, Timestamp},
};

/// A member of a room
#[derive(Clone)]
pub struct Member {
    pub connection: Arc<dyn Connection>,
    pub joined_at: Timestamp,
    /// Join order within the room
    seq: u64,
}

/// A named set of connections.
///
/// Membership is unique per `ConnectionId`. The entity itself is not
/// synchronized; the registry guards it with the room's exclusive-access
/// scope.
pub struct Room {
    name: RoomName,
    created_at: Timestamp,
    members: HashMap<ConnectionId, Member>,
    next_seq: u64,
}

impl Room {
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self {
            name,
            created_at,
            members: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Add a member. Returns `false` (and keeps the existing entry) if the
    /// connection is already a member.
    pub fn add_member(&mut self, connection: Arc<dyn Connection>, joined_at: Timestamp) -> bool {
        let id = *connection.id();
        if self.members.contains_key(&id) {
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.members.insert(
            id,
            Member {
                connection,
                joined_at,
                seq,
            },
        );
        true
    }

    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        self.members.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Copy of the current members in join order.
    pub fn snapshot_members(&self) -> Vec<Arc<dyn Connection>> {
        self.ordered_members()
            .into_iter()
            .map(|member| member.connection.clone())
            .collect()
    }

    /// Member identities and join times in join order.
    pub fn member_infos(&self) -> Vec<MemberInfo> {
        self.ordered_members()
            .into_iter()
            .map(|member| MemberInfo {
                connection_id: *member.connection.id(),
                joined_at: member.joined_at,
            })
            .collect()
    }

    fn ordered_members(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by_key(|member| member.seq);
        members
    }
}
