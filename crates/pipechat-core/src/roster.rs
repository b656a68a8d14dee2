//! Presence and room list.
//!
//! Holds the latest `USERS` and `ROOMS` snapshots. Snapshots are full
//! replacements: each one discards the previous, so a user who left simply
//! stops appearing. Nothing is merged.

use pipechat_proto::{RoomInfo, RosterUser};

use crate::display::{color_seed, initials};

/// A user present in the current room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Username.
    pub identity: String,
    /// Avatar initials. Derived from the name when the server sent none.
    pub display_initials: String,
    /// Palette index for the avatar.
    pub color_seed: u8,
    /// Server-assigned session identifier.
    pub unique_id: Option<String>,
    /// Remote address the server saw.
    pub origin_ip: Option<String>,
}

impl From<RosterUser> for RosterEntry {
    fn from(user: RosterUser) -> Self {
        let display_initials = user
            .avatar
            .filter(|avatar| !avatar.trim().is_empty())
            .unwrap_or_else(|| initials(&user.username));
        Self {
            color_seed: color_seed(&user.username),
            display_initials,
            identity: user.username,
            unique_id: user.unique_id,
            origin_ip: user.ip,
        }
    }
}

/// A room on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    /// Room name.
    pub name: String,
    /// Connected members.
    pub member_count: u32,
    /// Joining requires a password.
    pub has_password: bool,
}

impl From<RoomInfo> for RoomSummary {
    fn from(room: RoomInfo) -> Self {
        Self { name: room.name, member_count: room.count, has_password: room.has_password }
    }
}

/// Latest user and room snapshots.
#[derive(Debug, Clone, Default)]
pub struct RosterTracker {
    users: Vec<RosterEntry>,
    rooms: Vec<RoomSummary>,
}

impl RosterTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the user snapshot.
    pub fn replace_users(&mut self, users: Vec<RosterUser>) {
        self.users = users.into_iter().map(RosterEntry::from).collect();
    }

    /// Replace the room snapshot.
    pub fn replace_rooms(&mut self, rooms: Vec<RoomInfo>) {
        self.rooms = rooms.into_iter().map(RoomSummary::from).collect();
    }

    /// Everyone in the current room, the local user included.
    pub fn users(&self) -> &[RosterEntry] {
        &self.users
    }

    /// Everyone except `identity`. This is what the roster panel lists; its
    /// header still counts [`Self::users`].
    pub fn others<'a>(&'a self, identity: &'a str) -> impl Iterator<Item = &'a RosterEntry> {
        self.users.iter().filter(move |user| user.identity != identity)
    }

    /// Look up a user by name.
    pub fn user(&self, identity: &str) -> Option<&RosterEntry> {
        self.users.iter().find(|user| user.identity == identity)
    }

    /// Rooms on the server.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Look up a room by name.
    pub fn room(&self, name: &str) -> Option<&RoomSummary> {
        self.rooms.iter().find(|room| room.name == name)
    }
}
