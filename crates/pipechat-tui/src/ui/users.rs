//! Users sidebar
//!
//! Shows who else is in the room, with avatar initials and a count of
//! unread private messages per peer. The server-assigned id and address sit
//! on a second line under the name when the snapshot carried them.

use pipechat_client::Environment;
use pipechat_core::RosterEntry;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::avatar_color;
use crate::App;

/// Render the users sidebar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();
    let conversations = session.conversations();

    let items: Vec<ListItem> = session
        .roster()
        .others(session.identity())
        .map(|user| {
            let avatar = Style::default()
                .fg(Color::Black)
                .bg(avatar_color(user.color_seed))
                .add_modifier(Modifier::BOLD);

            let mut spans = vec![
                Span::styled(format!("{:<2}", user.display_initials), avatar),
                Span::raw(" "),
                Span::raw(user.identity.clone()),
            ];
            let unread = conversations.unread_for(&user.identity);
            if unread > 0 {
                spans.push(Span::styled(format!(" ({unread})"), Style::default().fg(Color::Red)));
            }
            if conversations.is_open(&user.identity) {
                spans.push(Span::styled(" *", Style::default().fg(Color::Yellow)));
            }
            let mut lines = vec![Line::from(spans)];
            lines.extend(detail_line(user));
            ListItem::new(lines)
        })
        .collect();

    let title = format!(" Users ({}) ", session.roster().users().len());
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(List::new(items).block(block), area);
}

/// `ID: … | IP: …`, indented under the name.
fn detail_line(user: &RosterEntry) -> Option<Line<'static>> {
    let parts: Vec<String> = [("ID", &user.unique_id), ("IP", &user.origin_ip)]
        .into_iter()
        .filter_map(|(label, value)| {
            value.as_deref().filter(|v| !v.is_empty()).map(|v| format!("{label}: {v}"))
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(Line::from(Span::styled(
        format!("   {}", parts.join(" | ")),
        Style::default().fg(Color::DarkGray),
    )))
}
