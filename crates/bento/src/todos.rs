//! Per-day todo lists
//!
//! Each calendar day with todos has its own key (`todos_YYYY-MM-DD`). The
//! set of day keys is kept in an explicit index next to them, updated on
//! every write, so export never has to scan the whole store. A store written
//! before the index existed gets it rebuilt once from a key scan.

use crate::config::keys;
use crate::error::Result;
use crate::storage::{self, KeyValueStore};
use crate::types::TodoItem;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Store key of a day's list
pub fn day_key(day: NaiveDate) -> String {
    format!("{}{}", keys::TODO_PREFIX, day.format("%Y-%m-%d"))
}

/// Parse a day key back into its date
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    let date = key.strip_prefix(keys::TODO_PREFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Todo lists keyed by day
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    days: BTreeSet<String>,
}

impl TodoStore {
    /// Load the day index, rebuilding it when absent
    pub fn load(store: &mut dyn KeyValueStore) -> Result<Self> {
        match storage::get_json::<BTreeSet<String>>(store, keys::TODO_DAYS)? {
            Some(days) => Ok(Self { days }),
            None => {
                let days: BTreeSet<String> = store
                    .keys()?
                    .into_iter()
                    .filter(|k| parse_day_key(k).is_some())
                    .collect();
                if !days.is_empty() {
                    tracing::info!(days = days.len(), "Rebuilt todo day index");
                }
                let todos = Self { days };
                todos.save_index(store)?;
                Ok(todos)
            }
        }
    }

    /// Day keys recorded in memory
    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(String::as_str)
    }

    /// Todos of a day (empty if none were ever added)
    pub fn list(&self, store: &dyn KeyValueStore, day: NaiveDate) -> Result<Vec<TodoItem>> {
        read_day(store, &day_key(day))
    }

    /// Append a todo; blank text is ignored (returns false)
    pub fn add(
        &mut self,
        store: &mut dyn KeyValueStore,
        day: NaiveDate,
        text: &str,
    ) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let key = day_key(day);
        let mut todos = read_day(store, &key)?;
        todos.push(TodoItem::new(text));
        self.write_day(store, key, &todos)?;
        Ok(true)
    }

    /// Flip a todo's completed flag; out-of-range indices are ignored
    pub fn toggle(
        &mut self,
        store: &mut dyn KeyValueStore,
        day: NaiveDate,
        index: usize,
    ) -> Result<bool> {
        let key = day_key(day);
        let mut todos = read_day(store, &key)?;
        let Some(todo) = todos.get_mut(index) else {
            return Ok(false);
        };
        todo.completed = !todo.completed;
        self.write_day(store, key, &todos)?;
        Ok(true)
    }

    /// Remove a todo; out-of-range indices are ignored
    ///
    /// The day keeps its (possibly empty) list and stays in the index.
    pub fn delete(
        &mut self,
        store: &mut dyn KeyValueStore,
        day: NaiveDate,
        index: usize,
    ) -> Result<Option<TodoItem>> {
        let key = day_key(day);
        let mut todos = read_day(store, &key)?;
        if index >= todos.len() {
            return Ok(None);
        }
        let removed = todos.remove(index);
        self.write_day(store, key, &todos)?;
        Ok(Some(removed))
    }

    fn write_day(
        &mut self,
        store: &mut dyn KeyValueStore,
        key: String,
        todos: &[TodoItem],
    ) -> Result<()> {
        storage::set_json(store, &key, todos)?;
        if self.days.insert(key) {
            self.save_index(store)?;
        }
        Ok(())
    }

    fn save_index(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        storage::set_json(store, keys::TODO_DAYS, &self.days)
    }
}

/// Read the persisted day index as it is right now
pub fn read_index(store: &dyn KeyValueStore) -> Result<BTreeSet<String>> {
    Ok(storage::get_json(store, keys::TODO_DAYS)?.unwrap_or_default())
}

/// Read one day's list by key
pub fn read_day(store: &dyn KeyValueStore, key: &str) -> Result<Vec<TodoItem>> {
    Ok(storage::get_json(store, key)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_day_key_format() {
        assert_eq!(day_key(day(5)), "todos_2024-03-05");
        assert_eq!(parse_day_key("todos_2024-03-05"), Some(day(5)));
        assert_eq!(parse_day_key("todos_later"), None);
        assert_eq!(parse_day_key("bento_dashboards"), None);
    }

    #[test]
    fn test_add_toggle_delete() {
        let mut store = MemoryStore::new();
        let mut todos = TodoStore::load(&mut store).unwrap();

        assert!(todos.add(&mut store, day(1), "Write report").unwrap());
        assert!(todos.add(&mut store, day(1), "Call bank").unwrap());
        assert!(!todos.add(&mut store, day(1), "   ").unwrap());

        assert!(todos.toggle(&mut store, day(1), 0).unwrap());
        assert!(!todos.toggle(&mut store, day(1), 9).unwrap());

        let list = todos.list(&store, day(1)).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].completed);
        assert!(!list[1].completed);

        let removed = todos.delete(&mut store, day(1), 0).unwrap().unwrap();
        assert_eq!(removed.text, "Write report");
        assert_eq!(todos.delete(&mut store, day(1), 5).unwrap(), None);
        assert_eq!(todos.list(&store, day(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_index_tracks_written_days() {
        let mut store = MemoryStore::new();
        let mut todos = TodoStore::load(&mut store).unwrap();

        todos.add(&mut store, day(2), "a").unwrap();
        todos.add(&mut store, day(1), "b").unwrap();
        todos.add(&mut store, day(2), "c").unwrap();

        let index = read_index(&store).unwrap();
        assert_eq!(
            index.into_iter().collect::<Vec<_>>(),
            vec!["todos_2024-03-01".to_string(), "todos_2024-03-02".to_string()]
        );
        assert_eq!(todos.days().count(), 2);
    }

    #[test]
    fn test_index_rebuilt_from_existing_keys() {
        let mut store = MemoryStore::new();
        store.set("todos_2024-03-09", r#"[{"text":"old","completed":true}]"#).unwrap();
        store.set("todos_notes", "[]").unwrap();
        store.set("bento_dashboards", "[]").unwrap();

        let todos = TodoStore::load(&mut store).unwrap();
        assert_eq!(todos.days().collect::<Vec<_>>(), vec!["todos_2024-03-09"]);
        assert_eq!(read_index(&store).unwrap().len(), 1);

        let list = todos.list(&store, day(9)).unwrap();
        assert_eq!(list, vec![TodoItem { text: "old".to_string(), completed: true }]);
    }

    #[test]
    fn test_unknown_day_is_empty() {
        let mut store = MemoryStore::new();
        let todos = TodoStore::load(&mut store).unwrap();
        assert!(todos.list(&store, day(20)).unwrap().is_empty());
    }
}
