//! Backup export
//!
//! Read-only snapshot of everything the board persists, in one document.

use crate::config::{export, keys};
use crate::dashboards::DashboardRepository;
use crate::error::Result;
use crate::storage::{self, KeyValueStore};
use crate::theme::ThemeSettings;
use crate::todos;
use crate::types::{Dashboard, TodoItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Export file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub dashboards: Vec<Dashboard>,
    pub current_dashboard_id: String,
    pub theme_settings: ThemeSettings,
    /// Legacy background setting, empty if never set
    pub background: String,
    /// Every recorded day, by store key
    pub todos: BTreeMap<String, Vec<TodoItem>>,
    pub version: String,
}

impl ExportDocument {
    /// Collect the document
    ///
    /// Todo days come from the index as persisted at call time, so days
    /// added through any path since the board was opened are included.
    pub fn build(
        store: &dyn KeyValueStore,
        repo: &DashboardRepository,
        theme: &ThemeSettings,
    ) -> Result<Self> {
        let mut todos = BTreeMap::new();
        for key in todos::read_index(store)? {
            match storage::get_json::<Vec<TodoItem>>(store, &key) {
                Ok(Some(list)) => {
                    todos.insert(key, list);
                }
                Ok(None) => {
                    tracing::debug!(key = %key, "Indexed todo day has no data, skipping");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Unreadable todo day, skipping");
                }
            }
        }

        Ok(Self {
            dashboards: repo.dashboards().to_vec(),
            current_dashboard_id: repo.current_id().to_string(),
            theme_settings: theme.clone(),
            background: store.get(keys::BACKGROUND)?.unwrap_or_default(),
            todos,
            version: export::VERSION.to_string(),
        })
    }

    /// Pretty-printed JSON, as written to the download
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Download file name for an export taken on `date`
pub fn file_name(date: NaiveDate) -> String {
    format!("{}{}.json", export::FILE_PREFIX, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use crate::todos::TodoStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_export_includes_every_todo_day() {
        let mut store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let mut todos = TodoStore::load(&mut store).unwrap();
        todos.add(&mut store, day(1), "first").unwrap();
        todos.add(&mut store, day(2), "second").unwrap();

        let doc = ExportDocument::build(&store, &repo, &ThemeSettings::default()).unwrap();
        assert_eq!(doc.dashboards.len(), 1);
        assert_eq!(doc.current_dashboard_id, "default");
        assert_eq!(doc.version, "2.0");
        assert_eq!(doc.background, "");
        assert_eq!(doc.todos.len(), 2);
        assert_eq!(doc.todos["todos_2024-05-01"], vec![TodoItem::new("first")]);
        assert_eq!(doc.todos["todos_2024-05-02"], vec![TodoItem::new("second")]);
    }

    #[test]
    fn test_export_sees_days_written_by_another_handle() {
        let mut store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let _ours = TodoStore::load(&mut store).unwrap();

        // A second flow writes a day after we loaded
        let mut theirs = TodoStore::load(&mut store).unwrap();
        theirs.add(&mut store, day(3), "late").unwrap();

        let doc = ExportDocument::build(&store, &repo, &ThemeSettings::default()).unwrap();
        assert!(doc.todos.contains_key("todos_2024-05-03"));
    }

    #[test]
    fn test_export_is_read_only() {
        let mut store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        store.set(keys::BACKGROUND, "https://bg.png").unwrap();
        let before = store.clone();

        let doc = ExportDocument::build(&store, &repo, &ThemeSettings::default()).unwrap();
        assert_eq!(doc.background, "https://bg.png");
        assert_eq!(store, before);
    }

    #[test]
    fn test_document_layout() {
        let mut store = MemoryStore::new();
        let clock = ManualClock::new(1_000);
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let doc = ExportDocument::build(&store, &repo, &ThemeSettings::default()).unwrap();

        let text = doc.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["currentDashboardId"], "default");
        assert_eq!(value["themeSettings"]["blurIntensity"], 15);
        assert_eq!(value["themeSettings"]["accentColor"], "mauve");
        assert!(value["todos"].is_object());
        assert_eq!(value["version"], "2.0");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(day(9)), "bento-dashboard-backup-2024-05-09.json");
    }
}
