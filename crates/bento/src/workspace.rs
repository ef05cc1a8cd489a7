//! Workspace data cache
//!
//! Working copy of the active dashboard's four lists. The cache itself never
//! touches storage; [`Board`](crate::board::Board) flushes it to the
//! repository after every mutation.

use crate::types::{Category, Dashboard, LinkItem, WorkspaceData};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceCache {
    data: WorkspaceData,
}

impl WorkspaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every list with owned copies of the dashboard's data
    pub fn load_from(&mut self, dashboard: &Dashboard) {
        self.data = dashboard.data.clone();
    }

    /// Owned copy of the current lists, for flushing
    pub fn to_data(&self) -> WorkspaceData {
        self.data.clone()
    }

    pub fn data(&self) -> &WorkspaceData {
        &self.data
    }

    pub fn list(&self, category: Category) -> &[LinkItem] {
        self.data.list(category)
    }

    /// Append an item, normalizing its url for the category
    ///
    /// Returns false (nothing added) when the name is blank.
    pub fn add(&mut self, category: Category, name: &str, url: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let url = category.normalize_url(url);
        self.data.list_mut(category).push(LinkItem::new(name, url));
        true
    }

    /// Remove the item at `index`, `None` if out of range
    pub fn remove(&mut self, category: Category, index: usize) -> Option<LinkItem> {
        let list = self.data.list_mut(category);
        (index < list.len()).then(|| list.remove(index))
    }

    /// Replace a whole list (used when a reorder commits)
    pub fn replace(&mut self, category: Category, items: Vec<LinkItem>) {
        *self.data.list_mut(category) = items;
    }
}
