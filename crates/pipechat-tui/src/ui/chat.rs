//! Chat area
//!
//! Displays the active room timeline or the open private conversation,
//! followed by placeholders for uploads started from that view.

use pipechat_client::{Environment, PendingUpload, UploadStatus};
use pipechat_core::{Message, Notice, NoticeKind, TimelineEntry, color_seed, format_size};
use pipechat_proto::Body;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::{avatar_color, clock};
use crate::{App, View};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();

    let (title, mut items): (String, Vec<ListItem>) = match app.view() {
        View::Room => {
            let entries = session.timeline().entries().iter().map(entry_item);
            match session.timeline().active_room() {
                Some(room) => (format!(" #{room} "), entries.collect()),
                // Notices still show without a room, e.g. after disconnecting.
                None => (
                    " No Room ".to_string(),
                    std::iter::once(hint("Join a room with /join <room>, or Tab through the list"))
                        .chain(entries)
                        .collect(),
                ),
            }
        },
        View::Private(peer) => (
            format!(" @{peer} (Esc to close) "),
            session.conversations().messages(peer).iter().map(message_item).collect(),
        ),
    };

    let scope = app.upload_scope();
    items.extend(session.uploads().in_scope(&scope).map(upload_item));

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(List::new(visible_items).block(block), area);
}

fn hint(text: &str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))))
}

fn entry_item(entry: &TimelineEntry) -> ListItem<'static> {
    match entry {
        TimelineEntry::Message(message) => message_item(message),
        TimelineEntry::Notice(notice) => notice_item(notice),
    }
}

fn notice_item(notice: &Notice) -> ListItem<'static> {
    let (marker, style) = match notice.kind {
        NoticeKind::System => {
            ("*", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        },
        NoticeKind::Error => ("!", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
    };
    ListItem::new(Line::from(Span::styled(format!("{marker} {}", notice.text), style)))
}

fn message_item(message: &Message) -> ListItem<'static> {
    let mut sender_style = Style::default().fg(avatar_color(color_seed(&message.sender)));
    if message.originated_locally {
        sender_style = sender_style.add_modifier(Modifier::BOLD);
    }

    let body = match &message.body {
        Body::Text(text) => Span::raw(text.clone()),
        Body::File(file) => Span::styled(
            format!("📎 {} ({}, {}) {}", file.name, file.kind, format_size(file.size_bytes), file.url),
            Style::default().fg(Color::Cyan),
        ),
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("[{}] ", clock(message.timestamp)), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("<{}>", message.sender), sender_style),
        Span::raw(" "),
        body,
    ]))
}

fn upload_item(upload: &PendingUpload) -> ListItem<'static> {
    let line = match &upload.status {
        UploadStatus::Uploading => Span::styled(
            format!("📤 Uploading {} ({})...", upload.name, format_size(upload.size_bytes)),
            Style::default().fg(Color::Yellow),
        ),
        UploadStatus::Failed { reason } => Span::styled(
            format!("❌ Upload failed: {} ({reason}) /dismiss to clear", upload.name),
            Style::default().fg(Color::Red),
        ),
    };
    ListItem::new(Line::from(line))
}
