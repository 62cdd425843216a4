//! TUI components for fwscope
//!
//! This crate provides the terminal user interface for browsing firewall
//! logs: state and actions, keybindings, event handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Effect, Notice, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, NoticePopup, StatusBar, log_table_hints};
pub use ui::screens::LogTableScreen;
pub use ui::{Layout, Theme};
