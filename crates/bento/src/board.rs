//! Board context
//!
//! [`Board`] is the one object every operation goes through: it owns the
//! store, the dashboard repository, the working copy of the active
//! dashboard, the theme settings and the todo index. Item mutations are
//! write-through: the working copy is flushed to the repository (and so to
//! the store) before the call returns.

use crate::clock::{Clock, SystemClock};
use crate::dashboards::{DashboardRepository, Deleted};
use crate::error::Result;
use crate::export::ExportDocument;
use crate::reorder::ReorderSession;
use crate::storage::KeyValueStore;
use crate::theme::{PresentationSink, ThemeChange, ThemeSettings, ThemeStore};
use crate::todos::TodoStore;
use crate::types::{Category, Dashboard, LinkItem, TodoItem, WorkspaceData};
use crate::workspace::WorkspaceCache;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Tab strip entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardTab {
    pub id: String,
    pub name: String,
    pub icon: String,
}

/// Plain copy of everything a renderer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub tabs: Vec<DashboardTab>,
    pub current_id: String,
    pub data: WorkspaceData,
    pub theme: ThemeSettings,
    /// Delete is offered only with more than one dashboard
    pub can_delete: bool,
}

pub struct Board<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock + Send>,
    rng: Box<dyn RngCore + Send>,
    repo: DashboardRepository,
    cache: WorkspaceCache,
    theme: ThemeStore,
    todos: TodoStore,
}

impl<S: KeyValueStore> Board<S> {
    /// Open a board with the wall clock and an entropy-seeded RNG
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, Box::new(SystemClock), Box::new(StdRng::from_entropy()))
    }

    /// Open a board with explicit time and randomness sources
    pub fn open_with(
        mut store: S,
        clock: Box<dyn Clock + Send>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        let theme = ThemeStore::load(&store)?;
        let repo = DashboardRepository::load(&mut store, clock.as_ref())?;
        let todos = TodoStore::load(&mut store)?;

        let mut cache = WorkspaceCache::new();
        cache.load_from(repo.current());

        Ok(Self {
            store,
            clock,
            rng,
            repo,
            cache,
            theme,
            todos,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn repository(&self) -> &DashboardRepository {
        &self.repo
    }

    pub fn dashboards(&self) -> &[Dashboard] {
        self.repo.dashboards()
    }

    pub fn current_dashboard(&self) -> &Dashboard {
        self.repo.current()
    }

    /// Working copy of the active dashboard's lists
    pub fn workspace(&self) -> &WorkspaceData {
        self.cache.data()
    }

    pub fn theme(&self) -> &ThemeSettings {
        self.theme.settings()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tabs: self
                .repo
                .dashboards()
                .iter()
                .map(|d| DashboardTab {
                    id: d.id.clone(),
                    name: d.name.clone(),
                    icon: d.icon.clone(),
                })
                .collect(),
            current_id: self.repo.current_id().to_string(),
            data: self.cache.to_data(),
            theme: self.theme.settings().clone(),
            can_delete: self.repo.can_delete(),
        }
    }

    /// Today's date according to the board's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // =========================================================================
    // Dashboards
    // =========================================================================

    /// Create a dashboard and make it active
    ///
    /// Returns the new id, or `None` for a blank name.
    pub fn add_dashboard(&mut self, name: &str) -> Result<Option<String>> {
        let id = self
            .repo
            .add(&mut self.store, name, self.clock.as_ref(), self.rng.as_mut())?;
        if let Some(id) = &id {
            self.switch_dashboard(id)?;
        }
        Ok(id)
    }

    pub fn rename_dashboard(&mut self, id: &str, name: &str) -> Result<bool> {
        self.repo.rename(&mut self.store, id, name)
    }

    /// Delete a dashboard, reloading the working copy if it was active
    pub fn delete_dashboard(&mut self, id: &str) -> Result<Option<Deleted>> {
        let before = self.repo.current_id().to_string();
        let deleted = self.repo.delete(&mut self.store, id);
        self.reload_if_moved(&before);
        deleted
    }

    /// Flush the working copy into the active dashboard, then load another
    ///
    /// Returns false for unknown ids.
    pub fn switch_dashboard(&mut self, id: &str) -> Result<bool> {
        let before = self.repo.current_id().to_string();
        let outgoing = self.cache.to_data();
        let switched = self.repo.switch_active(&mut self.store, id, outgoing);
        self.reload_if_moved(&before);
        switched
    }

    /// The working copy always belongs to the active dashboard
    fn reload_if_moved(&mut self, previous_id: &str) {
        if self.repo.current_id() != previous_id {
            self.cache.load_from(self.repo.current());
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Add an item to the active dashboard; blank names are ignored
    pub fn add_item(&mut self, category: Category, name: &str, url: &str) -> Result<bool> {
        if !self.cache.add(category, name, url) {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Remove an item from the active dashboard
    pub fn delete_item(&mut self, category: Category, index: usize) -> Result<Option<LinkItem>> {
        let removed = self.cache.remove(category, index);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Pick up an item for a drag reorder
    pub fn begin_drag(&self, category: Category, index: usize) -> Option<ReorderSession> {
        ReorderSession::begin(self.cache.list(category).len(), index)
    }

    /// Commit a drag: the previewed order becomes the list order
    ///
    /// Returns false (nothing written) if the order did not change.
    pub fn commit_drag(&mut self, category: Category, session: ReorderSession) -> Result<bool> {
        if !session.is_moved() {
            session.cancel();
            return Ok(false);
        }
        let items = session.commit(self.cache.list(category))?;
        self.cache.replace(category, items);
        self.flush()?;
        Ok(true)
    }

    /// Move one item to a new position without a pointer gesture
    pub fn move_item(&mut self, category: Category, from: usize, to: usize) -> Result<bool> {
        let Some(mut session) = self.begin_drag(category, from) else {
            return Ok(false);
        };
        session.move_to(to);
        self.commit_drag(category, session)
    }

    /// Write the working copy through; on failure drop the unsaved edit
    fn flush(&mut self) -> Result<()> {
        let result = self
            .repo
            .store_current_data(&mut self.store, self.cache.to_data());
        if result.is_err() {
            self.cache.load_from(self.repo.current());
        }
        result
    }

    // =========================================================================
    // Theme
    // =========================================================================

    /// Attach the live presentation (applied immediately)
    pub fn attach_presentation(&mut self, sink: PresentationSink) {
        self.theme.attach(sink);
    }

    pub fn set_theme(&mut self, change: ThemeChange) -> Result<()> {
        self.theme.set(&mut self.store, change)
    }

    pub fn preview_blur(&mut self, px: u32) {
        self.theme.preview_blur(px);
    }

    pub fn save_theme(&mut self) -> Result<()> {
        self.theme.save(&mut self.store)
    }

    pub fn reset_theme(&mut self) -> Result<()> {
        self.theme.reset(&mut self.store)
    }

    // =========================================================================
    // Todos
    // =========================================================================

    pub fn todos(&self, day: NaiveDate) -> Result<Vec<TodoItem>> {
        self.todos.list(&self.store, day)
    }

    pub fn add_todo(&mut self, day: NaiveDate, text: &str) -> Result<bool> {
        self.todos.add(&mut self.store, day, text)
    }

    pub fn toggle_todo(&mut self, day: NaiveDate, index: usize) -> Result<bool> {
        self.todos.toggle(&mut self.store, day, index)
    }

    pub fn delete_todo(&mut self, day: NaiveDate, index: usize) -> Result<Option<TodoItem>> {
        self.todos.delete(&mut self.store, day, index)
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export(&self) -> Result<ExportDocument> {
        ExportDocument::build(&self.store, &self.repo, self.theme.settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::keys;
    use crate::error::BoardError;
    use crate::reorder::ItemBounds;
    use crate::storage::{get_json, FailingStore, MemoryStore};
    use crate::theme::ThemeId;
    use std::sync::atomic::Ordering;

    fn board() -> Board<MemoryStore> {
        board_with(MemoryStore::new())
    }

    fn board_with(store: MemoryStore) -> Board<MemoryStore> {
        Board::open_with(
            store,
            Box::new(ManualClock::new(1_700_000_000_000)),
            Box::new(StdRng::seed_from_u64(1)),
        )
        .unwrap()
    }

    fn stored(board: &Board<MemoryStore>) -> Vec<Dashboard> {
        get_json(board.store(), keys::DASHBOARDS).unwrap().unwrap()
    }

    #[test]
    fn test_open_loads_active_dashboard() {
        let board = board();
        assert_eq!(board.current_dashboard().id, "default");
        assert_eq!(board.workspace(), &board.current_dashboard().data);
    }

    #[test]
    fn test_snapshot() {
        let mut board = board();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.tabs.len(), 1);
        assert_eq!(snapshot.tabs[0].icon, "🏠");
        assert!(!snapshot.can_delete);

        let work = board.add_dashboard("Work").unwrap().unwrap();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.current_id, work);
        assert_eq!(snapshot.tabs[1].name, "Work");
        assert_eq!(snapshot.data, WorkspaceData::default());
        assert!(snapshot.can_delete);
    }

    #[test]
    fn test_item_mutations_write_through() {
        let mut board = board();
        assert!(board.add_item(Category::Favorites, "GitHub", "github.com").unwrap());
        assert!(!board.add_item(Category::Favorites, " ", "x").unwrap());

        let favorites = &stored(&board)[0].data.favorites;
        assert_eq!(favorites, &vec![LinkItem::new("GitHub", "https://github.com")]);

        let removed = board.delete_item(Category::Playlist, 0).unwrap();
        assert_eq!(removed.unwrap().name, "Lofi Girl Focus");
        assert!(stored(&board)[0].data.playlist.is_empty());
        assert_eq!(board.delete_item(Category::Playlist, 0).unwrap(), None);
    }

    #[test]
    fn test_switch_keeps_edits_separate() {
        let mut board = board();
        let work = board.add_dashboard("Work").unwrap().unwrap();
        assert_eq!(board.current_dashboard().id, work);
        assert_eq!(board.workspace(), &WorkspaceData::default());

        board.add_item(Category::Readings, "Notes", "https://notes").unwrap();
        board.switch_dashboard("default").unwrap();
        assert!(board
            .workspace()
            .readings
            .iter()
            .all(|r| r.name != "Notes"));

        board.add_item(Category::Favorites, "Home", "https://home").unwrap();
        board.switch_dashboard(&work).unwrap();
        assert_eq!(board.workspace().readings, vec![LinkItem::new("Notes", "https://notes")]);
        assert!(board.workspace().favorites.is_empty());

        board.switch_dashboard("default").unwrap();
        assert_eq!(board.workspace().favorites, vec![LinkItem::new("Home", "https://home")]);
    }

    #[test]
    fn test_switch_unknown_is_noop() {
        let mut board = board();
        board.add_item(Category::Favorites, "A", "https://a").unwrap();
        assert!(!board.switch_dashboard("nope").unwrap());
        assert_eq!(board.workspace().favorites.len(), 1);
    }

    #[test]
    fn test_dashboard_count_never_drops_to_zero() {
        let mut board = board();
        let a = board.add_dashboard("A").unwrap().unwrap();
        let b = board.add_dashboard("B").unwrap().unwrap();

        assert!(board.delete_dashboard(&a).unwrap().is_some());
        assert!(board.delete_dashboard("default").unwrap().is_some());
        assert!(matches!(
            board.delete_dashboard(&b),
            Err(BoardError::LastDashboard)
        ));
        assert_eq!(board.dashboards().len(), 1);
        assert_eq!(board.current_dashboard().id, b);
    }

    #[test]
    fn test_invariants_hold_over_random_operations() {
        use rand::Rng;

        let mut board = board();
        let mut rng = StdRng::seed_from_u64(99);
        for step in 0..200 {
            let ids: Vec<String> = board.dashboards().iter().map(|d| d.id.clone()).collect();
            let pick = ids[rng.gen_range(0..ids.len())].clone();
            match rng.gen_range(0..5) {
                0 => {
                    board.add_dashboard(&format!("D{step}")).unwrap();
                }
                1 => {
                    let _ = board.delete_dashboard(&pick);
                }
                2 => {
                    board.switch_dashboard(&pick).unwrap();
                }
                3 => {
                    board
                        .add_item(Category::Favorites, &format!("f{step}"), "x.dev")
                        .unwrap();
                }
                _ => {
                    board.delete_item(Category::Favorites, 0).unwrap();
                }
            }

            assert!(!board.dashboards().is_empty());
            let current = board.repository().current_id().to_string();
            assert!(board.repository().contains(&current));
            assert_eq!(stored(&board), board.dashboards());
            assert_eq!(
                board.store().get(keys::CURRENT_DASHBOARD).unwrap(),
                Some(current)
            );
        }
    }

    #[test]
    fn test_delete_active_reloads_first() {
        let mut board = board();
        let work = board.add_dashboard("Work").unwrap().unwrap();
        board.add_item(Category::Favorites, "W", "https://w").unwrap();

        let deleted = board.delete_dashboard(&work).unwrap().unwrap();
        assert!(deleted.was_active);
        assert_eq!(board.current_dashboard().id, "default");
        assert_eq!(board.workspace(), &board.current_dashboard().data);
        assert!(board.workspace().favorites.is_empty());
    }

    #[test]
    fn test_failed_switch_keeps_dashboards_apart() {
        let store = FailingStore::new(MemoryStore::new());
        let failing = store.switch();
        let mut board = Board::open_with(
            store,
            Box::new(ManualClock::new(1_700_000_000_000)),
            Box::new(StdRng::seed_from_u64(1)),
        )
        .unwrap();
        let work = board.add_dashboard("Work").unwrap().unwrap();
        board.add_item(Category::Favorites, "WorkOnly", "https://w").unwrap();

        failing.store(true, Ordering::SeqCst);
        assert!(board.switch_dashboard("default").is_err());
        assert!(board.delete_dashboard(&work).is_err());
        assert!(board.add_item(Category::Favorites, "Lost", "https://l").is_err());

        // Still on Work, with Work's lists
        assert_eq!(board.current_dashboard().id, work);
        assert_eq!(board.workspace(), &board.current_dashboard().data);
        assert_eq!(board.workspace().favorites.len(), 1);

        failing.store(false, Ordering::SeqCst);
        board.switch_dashboard("default").unwrap();
        board.add_item(Category::Readings, "Book", "https://book").unwrap();
        assert!(board.workspace().favorites.is_empty());

        let default = board.repository().get("default").unwrap();
        assert!(default.data.favorites.is_empty());
        let work = board.repository().get(&work).unwrap();
        assert_eq!(work.data.favorites, vec![LinkItem::new("WorkOnly", "https://w")]);
    }

    #[test]
    fn test_drag_reorders_favorites() {
        let mut board = board();
        for name in ["a", "b", "c"] {
            board
                .add_item(Category::Favorites, name, &format!("https://{name}"))
                .unwrap();
        }

        let bounds: Vec<_> = (0..3).map(|i| ItemBounds::new(i as f64 * 80.0, 80.0)).collect();
        let mut session = board.begin_drag(Category::Favorites, 0).unwrap();
        session.hover(230.0, &bounds);
        assert!(board.commit_drag(Category::Favorites, session).unwrap());

        let names: Vec<_> = stored(&board)[0]
            .data
            .favorites
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_stale_drag_is_rejected() {
        let mut board = board();
        board.add_item(Category::Favorites, "a", "https://a").unwrap();
        board.add_item(Category::Favorites, "b", "https://b").unwrap();

        let mut session = board.begin_drag(Category::Favorites, 0).unwrap();
        session.move_to(1);
        board.delete_item(Category::Favorites, 1).unwrap();

        let err = board.commit_drag(Category::Favorites, session).unwrap_err();
        assert!(matches!(err, BoardError::StaleDrag { .. }));
        assert_eq!(board.workspace().favorites.len(), 1);
    }

    #[test]
    fn test_move_item() {
        let mut board = board();
        assert!(board.move_item(Category::Resources, 1, 0).unwrap());
        assert_eq!(board.workspace().resources[0].name, "IELTS Preparation");
        assert!(!board.move_item(Category::Resources, 0, 0).unwrap());
        assert!(!board.move_item(Category::Resources, 7, 0).unwrap());
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut board = board();
        let work = board.add_dashboard("Work").unwrap().unwrap();
        board.add_item(Category::Playlist, "Song", "https://song").unwrap();
        board.set_theme(ThemeChange::Theme(ThemeId::Latte)).unwrap();
        let today = board.today();
        board.add_todo(today, "Ship it").unwrap();

        let reopened = board_with(board.into_store());
        assert_eq!(reopened.current_dashboard().id, work);
        assert_eq!(reopened.workspace().playlist[0].name, "Song");
        assert_eq!(reopened.theme().theme, ThemeId::Latte);
        assert_eq!(reopened.todos(today).unwrap()[0].text, "Ship it");
    }

    #[test]
    fn test_export_snapshot() {
        let mut board = board();
        let today = board.today();
        board.add_todo(today, "one").unwrap();
        board.add_todo(today.succ_opt().unwrap(), "two").unwrap();

        let doc = board.export().unwrap();
        assert_eq!(doc.dashboards.len(), 1);
        assert_eq!(doc.todos.len(), 2);
        assert_eq!(doc.current_dashboard_id, "default");
    }
}
