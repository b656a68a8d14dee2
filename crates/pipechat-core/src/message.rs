//! Rendered chat messages.

use pipechat_proto::{Body, Direction, Post};

/// A chat message as stored in a timeline or conversation.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author of the message.
    pub sender: String,
    /// Text or file.
    pub body: Body,
    /// Server timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Whether the local user wrote it.
    pub originated_locally: bool,
}

impl Message {
    /// Room post (live or replayed). Authorship is decided by comparing the
    /// sender to the local identity.
    pub fn from_room(post: Post, identity: &str) -> Self {
        let originated_locally = post.sender == identity;
        Self { sender: post.sender, body: post.body, timestamp: post.timestamp, originated_locally }
    }

    /// Private post. On the wire `post.sender` is always the other party, so
    /// the author is recovered from the direction.
    pub fn from_private(post: Post, direction: Direction, identity: &str) -> Self {
        let (sender, originated_locally) = match direction {
            Direction::Incoming => (post.sender, false),
            Direction::Outgoing => (identity.to_string(), true),
        };
        Self { sender, body: post.body, timestamp: post.timestamp, originated_locally }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(sender: &str) -> Post {
        Post { sender: sender.into(), body: Body::Text("hi".into()), timestamp: 1 }
    }

    #[test]
    fn room_authorship_follows_identity() {
        assert!(!Message::from_room(post("alice"), "bob").originated_locally);
        assert!(Message::from_room(post("bob"), "bob").originated_locally);
    }

    #[test]
    fn outgoing_private_is_authored_locally() {
        let message = Message::from_private(post("carol"), Direction::Outgoing, "bob");

        assert_eq!(message.sender, "bob");
        assert!(message.originated_locally);
    }

    #[test]
    fn incoming_private_keeps_peer_as_sender() {
        let message = Message::from_private(post("carol"), Direction::Incoming, "bob");

        assert_eq!(message.sender, "carol");
        assert_eq!(message.body, Body::Text("hi".into()));
    }
}
