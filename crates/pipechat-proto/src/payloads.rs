//! JSON payloads carried by snapshot frames.
//!
//! `USERS|<json>` and `ROOMS|<json>` carry a JSON array after the tag. The
//! server serializes loosely (missing or null fields happen when a session is
//! half torn down), so every field except the primary name is optional.

use serde::{Deserialize, Serialize};

/// One user in a `USERS` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUser {
    /// Display name and identity.
    pub username: String,
    /// Avatar initials chosen at join time.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Short server-assigned session identifier.
    #[serde(default)]
    pub unique_id: Option<String>,
    /// Remote address the server saw.
    #[serde(default)]
    pub ip: Option<String>,
}

/// One room in a `ROOMS` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Room name.
    pub name: String,
    /// Number of connected members.
    #[serde(default)]
    pub count: u32,
    /// Room requires a password to join.
    #[serde(default)]
    pub has_password: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn roster_user_accepts_server_shape() {
        let json = r#"{"username":"x","avatar":"X","uniqueId":"1","ip":"10.0.0.1"}"#;
        let user: RosterUser = serde_json::from_str(json).unwrap();

        assert_eq!(user.username, "x");
        assert_eq!(user.avatar.as_deref(), Some("X"));
        assert_eq!(user.unique_id.as_deref(), Some("1"));
        assert_eq!(user.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn roster_user_tolerates_nulls() {
        let json = r#"{"username":"x","avatar":null,"uniqueId":null}"#;
        let user: RosterUser = serde_json::from_str(json).unwrap();

        assert!(user.avatar.is_none());
        assert!(user.unique_id.is_none());
        assert!(user.ip.is_none());
    }

    #[test]
    fn room_info_password_flag_defaults_to_false() {
        let room: RoomInfo = serde_json::from_str(r#"{"name":"lobby","count":3}"#).unwrap();
        assert_eq!(room, RoomInfo { name: "lobby".into(), count: 3, has_password: false });

        let room: RoomInfo =
            serde_json::from_str(r#"{"name":"vault","count":1,"hasPassword":true}"#).unwrap();
        assert!(room.has_password);
    }
}
