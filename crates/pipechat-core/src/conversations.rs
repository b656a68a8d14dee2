//! Private conversations.
//!
//! One ordered log and one unread counter per peer. The store is the single
//! source of truth for private chat: a message is recorded whether or not its
//! view is open, and opening a view reads back the full log.
//!
//! # Invariants
//!
//! - Conservation: the length of a peer's log equals the number of private
//!   events recorded for that peer. Logs only grow.
//! - Unread: a peer's counter is the number of incoming messages recorded
//!   while its view was closed since the view was last opened. Opening
//!   resets it to zero in the same call that returns the log.
//! - Open state is read before the append, so a message never both renders
//!   and counts as unread.

use std::collections::HashMap;

use crate::Message;

/// One peer's private history.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    log: Vec<Message>,
    unread: u32,
}

impl Conversation {
    /// Messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    /// Unread incoming messages.
    pub fn unread(&self) -> u32 {
        self.unread
    }
}

/// What the caller should do with a freshly recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The peer's view is open: render the message now.
    Rendered,
    /// Incoming message for a closed view. Carries the new unread count.
    Unread {
        /// Unread count after this message.
        count: u32,
    },
    /// Outgoing message for a closed view: stored only.
    Recorded,
}

/// All private conversations of the session.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
    open_peer: Option<String>,
}

impl ConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message the peer sent us.
    pub fn record_incoming(&mut self, peer: &str, message: Message) -> Delivery {
        let open = self.is_open(peer);
        let conversation = self.conversations.entry(peer.to_string()).or_default();
        conversation.log.push(message);

        if open {
            Delivery::Rendered
        } else {
            conversation.unread += 1;
            Delivery::Unread { count: conversation.unread }
        }
    }

    /// Record a message we sent to the peer (the server's `*_SENT` echo).
    pub fn record_outgoing(&mut self, peer: &str, message: Message) -> Delivery {
        let open = self.is_open(peer);
        self.conversations.entry(peer.to_string()).or_default().log.push(message);

        if open { Delivery::Rendered } else { Delivery::Recorded }
    }

    /// Open the view for `peer`, resetting its unread count, and return its
    /// full log. Any other open view is closed.
    pub fn open_conversation(&mut self, peer: &str) -> &[Message] {
        self.open_peer = Some(peer.to_string());
        let conversation = self.conversations.entry(peer.to_string()).or_default();
        conversation.unread = 0;
        &conversation.log
    }

    /// Close the open view, returning whose it was.
    pub fn close_conversation(&mut self) -> Option<String> {
        self.open_peer.take()
    }

    /// Peer whose view is open.
    pub fn open_peer(&self) -> Option<&str> {
        self.open_peer.as_deref()
    }

    /// Whether the view for `peer` is open.
    pub fn is_open(&self, peer: &str) -> bool {
        self.open_peer.as_deref() == Some(peer)
    }

    /// Unread count for `peer`; zero for unknown peers.
    pub fn unread_for(&self, peer: &str) -> u32 {
        self.conversations.get(peer).map_or(0, Conversation::unread)
    }

    /// Unread messages across every peer.
    pub fn total_unread(&self) -> u32 {
        self.conversations.values().map(Conversation::unread).sum()
    }

    /// Log for `peer` without opening it.
    pub fn messages(&self, peer: &str) -> &[Message] {
        self.conversations.get(peer).map(Conversation::messages).unwrap_or_default()
    }
}
