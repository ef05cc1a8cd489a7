//! Bento Board Store
//!
//! Dashboards of link lists (favorites, playlist, readings, resources),
//! per-day todos and theme settings, persisted through a key/value store.
//! [`Board`] ties the pieces together; the modules can also be used alone.

pub mod board;
pub mod clock;
pub mod config;
pub mod dashboards;
pub mod error;
pub mod export;
pub mod migration;
pub mod reorder;
pub mod storage;
pub mod theme;
pub mod todos;
pub mod types;
pub mod workspace;

// Re-export common types
pub use board::{Board, BoardSnapshot, DashboardTab};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboards::{DashboardRepository, Deleted};
pub use error::{BoardError, Result};
pub use export::ExportDocument;
pub use reorder::{ItemBounds, ReorderSession};
pub use storage::{config_dir, data_path, JsonFileStore, KeyValueStore, MemoryStore};
pub use theme::{
    Accent, FontSize, Presentation, PresentationSink, ThemeChange, ThemeId, ThemeSettings,
};
pub use todos::TodoStore;
pub use types::{Category, Dashboard, LinkItem, TodoItem, WorkspaceData};
pub use workspace::WorkspaceCache;
