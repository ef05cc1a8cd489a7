//! Shared application state and commands
//!
//! `AppCommand` is the command type sent by any front end. `AppSnapshot` is
//! the plain state handed to the rendering sink after every change.

use std::borrow::Cow;

use bento::{BoardSnapshot, Category, ThemeChange};
use chrono::NaiveDate;

/// Commands sent by any front end
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Dashboards
    AddDashboard(String),
    RenameDashboard {
        id: String,
        name: String,
    },
    DeleteDashboard(String),
    /// Deferred: applied after the transition delay
    SwitchDashboard(String),

    // Items of the active dashboard
    AddItem {
        category: Category,
        name: String,
        url: String,
    },
    DeleteItem {
        category: Category,
        index: usize,
    },
    MoveItem {
        category: Category,
        from: usize,
        to: usize,
    },

    // Theme
    SetTheme(ThemeChange),
    /// Slider drag: shown, not persisted
    PreviewBlur(u32),
    SaveTheme,
    ResetTheme,

    // Todos
    AddTodo {
        day: NaiveDate,
        text: String,
    },
    ToggleTodo {
        day: NaiveDate,
        index: usize,
    },
    DeleteTodo {
        day: NaiveDate,
        index: usize,
    },

    // Shutdown the controller loop
    Shutdown,

    // Internal: transition delay elapsed (not sent by front ends)
    InternalSwitchDue {
        generation: u64,
    },
}

/// Snapshot of app state, published after every handled command
#[derive(Clone, Debug, PartialEq)]
pub struct AppSnapshot {
    pub board: BoardSnapshot,
    /// True between a switch request and the data swap
    pub is_transitioning: bool,
    /// Dashboard the pending switch will load
    pub pending_switch: Option<String>,
    /// Last failed command
    pub last_error: Option<String>,
    pub status_text: Cow<'static, str>,
}

impl AppSnapshot {
    pub fn new(board: BoardSnapshot) -> Self {
        Self {
            board,
            ..Self::default()
        }
    }
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            board: BoardSnapshot::default(),
            is_transitioning: false,
            pending_switch: None,
            last_error: None,
            status_text: Cow::Borrowed("Ready"),
        }
    }
}
