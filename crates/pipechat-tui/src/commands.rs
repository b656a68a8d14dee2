//! Slash-command parser.
//!
//! Lines starting with `/` are commands; everything else is a message for
//! whatever the chat pane shows. Parsing is pure and never fails: bad input
//! becomes [`Command::Unknown`] or [`Command::InvalidArgs`] for the caller to
//! report.

use std::path::PathBuf;

/// A parsed composer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <room> [password]`
    Join {
        /// Room name.
        room: String,
        /// Room password.
        password: Option<String>,
    },
    /// `/create <name>`
    Create {
        /// Room name, possibly with surrounding whitespace.
        name: String,
    },
    /// `/delete <room>`
    Delete {
        /// Room name.
        room: String,
    },
    /// `/msg <user> <text>`
    PrivateMessage {
        /// Recipient.
        peer: String,
        /// Message text.
        text: String,
    },
    /// `/open <user>`
    Open {
        /// Peer.
        peer: String,
    },
    /// `/close`
    Close,
    /// `/upload <path>`
    Upload {
        /// Local file.
        path: PathBuf,
    },
    /// `/dismiss`: drop failed upload placeholders.
    Dismiss,
    /// `/clear`
    Clear,
    /// `/go`: activate the newest notification.
    Go,
    /// `/quit` or `/q`
    Quit,
    /// Plain text.
    Message {
        /// Line as typed.
        content: String,
    },
    /// Unrecognised command.
    Unknown {
        /// Line as typed.
        input: String,
    },
    /// Known command, wrong arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: String,
        /// Usage hint.
        error: String,
    },
}

/// Parse one composer line.
pub fn parse(line: &str) -> Command {
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message { content: line.to_string() };
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let args = args.trim();

    match name {
        "join" | "j" => {
            let mut parts = args.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(room), password, None) => Command::Join {
                    room: room.to_string(),
                    password: password.map(str::to_string),
                },
                _ => usage("join", "<room> [password]"),
            }
        },
        "create" => {
            if args.is_empty() {
                usage("create", "<name>")
            } else {
                Command::Create { name: args.to_string() }
            }
        },
        "delete" => match single("delete", args, "<room>") {
            Ok(room) => Command::Delete { room },
            Err(hint) => hint,
        },
        "msg" | "m" => match args.split_once(char::is_whitespace) {
            Some((peer, text)) if !text.trim().is_empty() => {
                Command::PrivateMessage { peer: peer.to_string(), text: text.trim().to_string() }
            },
            _ => usage("msg", "<user> <text>"),
        },
        "open" => match single("open", args, "<user>") {
            Ok(peer) => Command::Open { peer },
            Err(hint) => hint,
        },
        "close" => Command::Close,
        "upload" => {
            if args.is_empty() {
                usage("upload", "<path>")
            } else {
                Command::Upload { path: PathBuf::from(args) }
            }
        },
        "dismiss" => Command::Dismiss,
        "clear" => Command::Clear,
        "go" => Command::Go,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: line.to_string() },
    }
}

fn usage(command: &str, args: &str) -> Command {
    Command::InvalidArgs { command: command.to_string(), error: format!("usage: /{command} {args}") }
}

/// Exactly one whitespace-free argument.
fn single(command: &str, args: &str, hint: &str) -> Result<String, Command> {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(usage(command, hint)),
    }
}
