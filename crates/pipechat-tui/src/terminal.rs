//! Terminal setup and teardown.
//!
//! [`TerminalGuard`] puts the terminal into raw mode on the alternate screen
//! with focus reporting enabled, and puts everything back when dropped, even
//! if the runtime returns early with an error.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{DisableFocusChange, EnableFocusChange},
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use pipechat_client::Environment;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{App, InputState, ui};

/// Owns the terminal while the UI runs.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        match Self::enter() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                restore();
                Err(e)
            },
        }
    }

    fn enter() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut out = stdout();
        out.execute(EnterAlternateScreen)?;
        out.execute(EnableFocusChange)?;
        Terminal::new(CrosstermBackend::new(stdout()))
    }

    /// Draw one frame.
    pub fn draw<E: Environment>(&mut self, app: &App<E>, input: &InputState) -> io::Result<()> {
        self.terminal.draw(|frame| ui::render(frame, app, input))?;
        Ok(())
    }

    /// Set the window title.
    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        stdout().execute(SetTitle(title))?;
        Ok(())
    }

    /// Terminal dimensions (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore();
    }
}

fn restore() {
    let mut out = stdout();
    let _ = out.execute(DisableFocusChange);
    let _ = out.execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}
