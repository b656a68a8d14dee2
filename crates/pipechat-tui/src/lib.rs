//! Terminal UI for Pipechat
//!
//! A thin shell over [`pipechat_client::Session`] that provides terminal
//! I/O. The [`App`] state machine adapts session actions to the terminal;
//! [`runtime::Runtime`] owns the sockets, the terminal and the event loop.
//!
//! # Architecture
//!
//! ```text
//! crossterm keys ──▶ InputState ──▶ App ──▶ Session
//! server frames  ──────────────────▶ App ──▶ Session
//!                                     │
//!                                     ▼
//!                                 AppAction ──▶ Runtime (send, draw, upload)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod app;
pub mod commands;
pub mod config;
pub mod input;
pub mod runtime;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use app::{App, AppAction, AppEvent, Toast, View};
pub use input::{InputState, KeyInput};
pub use system_env::SystemEnv;
