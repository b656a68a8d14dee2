//! Rooms sidebar
//!
//! Lists the rooms from the latest server snapshot.

use pipechat_client::Environment;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::App;

const ACTIVE_PREFIX: &str = ">";
const INACTIVE_PREFIX: &str = " ";
const ROOM_PREFIX: &str = "#";
const LOCKED_MARKER: &str = " 🔒";

/// Render the rooms sidebar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();
    let active = session.timeline().active_room();

    let items: Vec<ListItem> = session
        .roster()
        .rooms()
        .iter()
        .map(|room| {
            let (prefix, style) = if active == Some(room.name.as_str()) {
                (ACTIVE_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (INACTIVE_PREFIX, Style::default())
            };
            let lock = if room.has_password { LOCKED_MARKER } else { "" };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("{ROOM_PREFIX}{}", room.name), style),
                Span::raw(lock),
                Span::styled(format!(" ({})", room.member_count), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Rooms ");
    frame.render_widget(List::new(items).block(block), area);
}
