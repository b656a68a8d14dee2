//! Status bar and activity line
//!
//! The status bar shows connection state, who we are and where. The activity
//! line above the composer shows the newest notification and who is typing.

use pipechat_client::{ConnectionStatus, Environment};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Render the status bar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let session = app.session();

    let connection_status = match session.status() {
        ConnectionStatus::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionStatus::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ConnectionStatus::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
    };

    let mut info = format!(" | {}", session.identity());
    if let Some(room) = session.timeline().active_room() {
        info.push_str(&format!(" | #{room}"));
    }
    let unread = session.conversations().total_unread();
    if unread > 0 {
        info.push_str(&format!(" | Private: {unread}"));
    }
    info.push_str(&format!(" | {}", app.title()));

    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::styled(info, Style::default().fg(Color::Gray)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

/// Render the activity line: newest notification, then the typing indicator.
pub fn render_activity<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let mut spans = Vec::new();

    if let Some(toast) = app.toasts().last() {
        spans.push(Span::styled(
            toast.line(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" (/go to open)", Style::default().fg(Color::DarkGray)));
    }

    if let Some(typing) = app.session().typing_indicator() {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            typing,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
