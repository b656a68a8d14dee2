//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into a frame.

mod chat;
mod input;
mod rooms;
mod status;
mod users;

use chrono::{DateTime, Local, Utc};
use pipechat_client::Environment;
use pipechat_core::PALETTE_SIZE;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
};

use crate::{App, InputState};

/// Avatar colours, indexed by `color_seed`.
const PALETTE: [Color; PALETTE_SIZE as usize] =
    [Color::Magenta, Color::Cyan, Color::Green, Color::Yellow, Color::Blue, Color::LightRed];

/// Render the entire UI.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const ACTIVITY_HEIGHT: u16 = 1;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(ACTIVITY_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, activity_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    status::render_activity(frame, app, *activity_area);
    input::render(frame, input, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (rooms sidebar + chat + users).
fn render_main_area<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    const ROOM_SIDEBAR_WIDTH: u16 = 20;
    const USER_SIDEBAR_WIDTH: u16 = 34;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(ROOM_SIDEBAR_WIDTH),
            Constraint::Min(CHAT_AREA_MIN_WIDTH),
            Constraint::Length(USER_SIDEBAR_WIDTH),
        ])
        .split(area);

    let [rooms_area, chat_area, users_area] = chunks.as_ref() else {
        return;
    };

    rooms::render(frame, app, *rooms_area);
    chat::render(frame, app, *chat_area);
    users::render(frame, app, *users_area);
}

/// Colour for a palette index.
fn avatar_color(seed: u8) -> Color {
    PALETTE[usize::from(seed) % PALETTE.len()]
}

/// Local wall-clock `HH:MM` for a server timestamp in milliseconds.
fn clock(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_hours_and_minutes() {
        let shown = clock(1_700_000_000_000);
        assert_eq!(shown.len(), 5);
        assert_eq!(shown.as_bytes()[2], b':');
    }

    #[test]
    fn clock_out_of_range() {
        assert_eq!(clock(u64::MAX), "--:--");
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(avatar_color(0), avatar_color(6));
    }
}
