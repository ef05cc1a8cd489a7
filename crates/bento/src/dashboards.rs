//! Dashboard repository
//!
//! Owns the dashboard collection and the active-dashboard pointer. Every
//! structural change persists immediately. The collection is never empty and
//! the active id always names one of its members.

use crate::clock::Clock;
use crate::config::{defaults, keys};
use crate::error::{BoardError, Result};
use crate::migration;
use crate::storage::{self, KeyValueStore};
use crate::types::{Dashboard, WorkspaceData};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde_json::Value;

/// Outcome of a successful delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub dashboard: Dashboard,
    /// The deleted dashboard was active; the first one took over
    pub was_active: bool,
}

/// Manages dashboards in memory, backed by a key/value store
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    dashboards: Vec<Dashboard>,
    current_id: String,
}

impl DashboardRepository {
    /// Load, normalize and persist the stored collection
    ///
    /// Seeds the default dashboard when nothing is stored. A stored value that
    /// is not a JSON array is an error rather than something to overwrite.
    pub fn load(store: &mut dyn KeyValueStore, clock: &dyn Clock) -> Result<Self> {
        let dashboards = match storage::get_json::<Value>(store, keys::DASHBOARDS)? {
            None => {
                tracing::info!("No dashboards stored, seeding default dashboard");
                vec![Dashboard::seeded(clock.now_millis())]
            }
            Some(Value::Array(entries)) => {
                let legacy = migration::read_legacy(store);
                let normalized = migration::normalize(entries, &legacy);
                if normalized.repairs > 0 {
                    tracing::warn!(repairs = normalized.repairs, "Repaired stored dashboards");
                }
                if normalized.dashboards.is_empty() {
                    tracing::warn!("No usable dashboards stored, seeding default dashboard");
                    vec![Dashboard::seeded(clock.now_millis())]
                } else {
                    normalized.dashboards
                }
            }
            Some(_) => {
                return Err(BoardError::Storage(format!(
                    "'{}' does not hold a dashboard array",
                    keys::DASHBOARDS
                )))
            }
        };

        let stored_id = store
            .get(keys::CURRENT_DASHBOARD)?
            .filter(|id| !id.is_empty());

        let mut repo = Self {
            current_id: dashboards[0].id.clone(),
            dashboards,
        };

        if let Some(id) = stored_id {
            if repo.contains(&id) {
                repo.current_id = id;
            } else {
                tracing::warn!(id = %id, "Active dashboard no longer exists, using the first one");
            }
        }

        repo.save(store)?;
        Ok(repo)
    }

    /// Write the collection and the active id
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        storage::set_json(store, keys::DASHBOARDS, &self.dashboards)?;
        store.set(keys::CURRENT_DASHBOARD, &self.current_id)?;
        tracing::debug!(
            dashboards = self.dashboards.len(),
            current = %self.current_id,
            "Saved dashboards"
        );
        Ok(())
    }

    /// All dashboards in display order
    pub fn dashboards(&self) -> &[Dashboard] {
        &self.dashboards
    }

    /// Id of the active dashboard
    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    /// The active dashboard
    pub fn current(&self) -> &Dashboard {
        let index = self.position(&self.current_id).unwrap_or(0);
        &self.dashboards[index]
    }

    pub fn get(&self, id: &str) -> Option<&Dashboard> {
        self.dashboards.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Get number of dashboards (never zero)
    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }

    /// Whether a delete would be accepted
    pub fn can_delete(&self) -> bool {
        self.dashboards.len() > 1
    }

    /// Append a new empty dashboard and persist
    ///
    /// Returns `None` (and changes nothing) for a blank name. The new
    /// dashboard is not made active here; that goes through
    /// [`switch_active`](Self::switch_active) so the outgoing data is flushed.
    pub fn add(
        &mut self,
        store: &mut dyn KeyValueStore,
        name: &str,
        clock: &dyn Clock,
        rng: &mut dyn RngCore,
    ) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let created = clock.now_millis();
        let id = self.allocate_id(created);
        let icon = defaults::DASHBOARD_ICONS
            .choose(rng)
            .copied()
            .unwrap_or(defaults::DASHBOARD_ICON);

        let before = self.clone();
        self.dashboards.push(Dashboard::new(id.clone(), name, icon, created));
        self.commit(store, before)?;
        tracing::info!(id = %id, name, "Added dashboard");
        Ok(Some(id))
    }

    /// Rename a dashboard and persist
    ///
    /// Returns false (and changes nothing) for a blank name or unknown id.
    pub fn rename(&mut self, store: &mut dyn KeyValueStore, id: &str, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let before = self.clone();
        self.dashboards[index].name = name.to_string();
        self.commit(store, before)?;
        Ok(true)
    }

    /// Delete a dashboard and persist
    ///
    /// Refused with [`BoardError::LastDashboard`] when only one is left.
    /// Unknown ids are a no-op (`Ok(None)`). If the active dashboard goes,
    /// the first remaining one becomes active; the caller must reload its
    /// working copy from [`current`](Self::current).
    pub fn delete(&mut self, store: &mut dyn KeyValueStore, id: &str) -> Result<Option<Deleted>> {
        if !self.can_delete() {
            return Err(BoardError::LastDashboard);
        }
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let before = self.clone();
        let dashboard = self.dashboards.remove(index);
        let was_active = self.current_id == dashboard.id;
        if was_active {
            self.current_id = self.dashboards[0].id.clone();
        }

        self.commit(store, before)?;
        tracing::info!(id = %dashboard.id, was_active, "Deleted dashboard");
        Ok(Some(Deleted {
            dashboard,
            was_active,
        }))
    }

    /// Make another dashboard active and persist
    ///
    /// `outgoing` is the working copy of the currently active dashboard; it is
    /// stored before the pointer moves. Returns false for unknown ids, in
    /// which case nothing is flushed or written.
    pub fn switch_active(
        &mut self,
        store: &mut dyn KeyValueStore,
        id: &str,
        outgoing: WorkspaceData,
    ) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }

        let before = self.clone();
        self.current_mut().data = outgoing;
        self.current_id = id.to_string();
        self.commit(store, before)?;
        tracing::info!(id, "Switched dashboard");
        Ok(true)
    }

    /// Store the working copy into the active dashboard and persist
    pub fn store_current_data(
        &mut self,
        store: &mut dyn KeyValueStore,
        data: WorkspaceData,
    ) -> Result<()> {
        let before = self.clone();
        self.current_mut().data = data;
        self.commit(store, before)
    }

    /// Persist the current state, or put `before` back if that fails
    ///
    /// Memory never reflects a change the store refused. The store may hold
    /// half of a failed write; restoring it is attempted once.
    fn commit(&mut self, store: &mut dyn KeyValueStore, before: Self) -> Result<()> {
        if let Err(e) = self.save(store) {
            tracing::warn!(error = %e, "Save failed, restoring previous dashboards");
            *self = before;
            if let Err(restore) = self.save(store) {
                tracing::debug!(error = %restore, "Could not restore stored dashboards");
            }
            return Err(e);
        }
        Ok(())
    }

    fn current_mut(&mut self) -> &mut Dashboard {
        let index = self.position(&self.current_id).unwrap_or(0);
        &mut self.dashboards[index]
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.dashboards.iter().position(|d| d.id == id)
    }

    /// Time-derived id, bumped until it is unique
    fn allocate_id(&self, millis: i64) -> String {
        let mut stamp = millis;
        loop {
            let id = format!("{}{}", defaults::DASHBOARD_ID_PREFIX, stamp);
            if !self.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{get_json, set_json, FailingStore, MemoryStore};
    use crate::types::LinkItem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    const T0: i64 = 1_700_000_000_000;

    fn setup() -> (MemoryStore, ManualClock, StdRng) {
        (MemoryStore::new(), ManualClock::new(T0), StdRng::seed_from_u64(7))
    }

    fn stored_dashboards(store: &MemoryStore) -> Vec<Dashboard> {
        get_json(store, keys::DASHBOARDS).unwrap().unwrap()
    }

    #[test]
    fn test_seeds_default_dashboard() {
        let (mut store, clock, _) = setup();
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();

        assert_eq!(repo.len(), 1);
        let dashboard = repo.current();
        assert_eq!(dashboard.id, "default");
        assert_eq!(dashboard.name, "Main");
        assert_eq!(dashboard.icon, "🏠");
        assert_eq!(dashboard.created, T0);
        assert!(dashboard.data.item_count() > 0);

        // Seed is persisted right away
        assert_eq!(stored_dashboards(&store).len(), 1);
        assert_eq!(
            store.get(keys::CURRENT_DASHBOARD).unwrap(),
            Some("default".to_string())
        );
    }

    #[test]
    fn test_dangling_current_id_recovers() {
        let (mut store, clock, _) = setup();
        set_json(
            &mut store,
            keys::DASHBOARDS,
            &json!([{"id": "a", "name": "A", "icon": "🏠", "created": 1, "data": {}},
                    {"id": "b", "name": "B", "icon": "💼", "created": 2, "data": {}}]),
        )
        .unwrap();
        store.set(keys::CURRENT_DASHBOARD, "gone").unwrap();

        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(repo.current_id(), "a");
        assert_eq!(store.get(keys::CURRENT_DASHBOARD).unwrap(), Some("a".to_string()));
    }

    #[test]
    fn test_stored_current_id_is_kept() {
        let (mut store, clock, _) = setup();
        set_json(
            &mut store,
            keys::DASHBOARDS,
            &json!([{"id": "a", "name": "A", "icon": "🏠", "created": 1},
                    {"id": "b", "name": "B", "icon": "💼", "created": 2}]),
        )
        .unwrap();
        store.set(keys::CURRENT_DASHBOARD, "b").unwrap();

        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(repo.current_id(), "b");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let (mut store, clock, _) = setup();
        set_json(
            &mut store,
            keys::DASHBOARDS,
            &json!([{"id": "a", "name": "A", "icon": "🏠", "created": 1},
                    {"id": "b", "name": "B", "icon": "💼", "created": 2, "data": {"favorites": 1}}]),
        )
        .unwrap();
        set_json(&mut store, keys::legacy::FAVORITES, &vec![LinkItem::new("x", "https://x")])
            .unwrap();
        set_json(&mut store, keys::legacy::RESOURCES, &vec![LinkItem::new("y", "https://y")])
            .unwrap();

        let first = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(first.dashboards()[0].data.favorites.len(), 1);
        assert_eq!(first.dashboards()[0].data.resources.len(), 1);
        // Legacy keys are left untouched
        assert!(store.get(keys::legacy::FAVORITES).unwrap().is_some());

        store.remove(keys::legacy::FAVORITES).unwrap();
        store.remove(keys::legacy::RESOURCES).unwrap();

        let second = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(first.dashboards(), second.dashboards());
        assert_eq!(first.current_id(), second.current_id());
    }

    #[test]
    fn test_non_array_collection_is_an_error() {
        let (mut store, clock, _) = setup();
        store.set(keys::DASHBOARDS, "{\"id\": \"a\"}").unwrap();
        assert!(DashboardRepository::load(&mut store, &clock).is_err());

        store.set(keys::DASHBOARDS, "[oops").unwrap();
        let err = DashboardRepository::load(&mut store, &clock).unwrap_err();
        assert!(matches!(err, BoardError::Parse { .. }));
    }

    #[test]
    fn test_empty_collection_reseeds() {
        let (mut store, clock, _) = setup();
        store.set(keys::DASHBOARDS, "[]").unwrap();
        let repo = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.current_id(), "default");
    }

    #[test]
    fn test_add_blank_name_is_noop() {
        let (mut store, clock, mut rng) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();

        assert_eq!(repo.add(&mut store, "   ", &clock, &mut rng).unwrap(), None);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_add_allocates_unique_ids() {
        let (mut store, clock, mut rng) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();

        let a = repo.add(&mut store, " Work ", &clock, &mut rng).unwrap().unwrap();
        let b = repo.add(&mut store, "Study", &clock, &mut rng).unwrap().unwrap();

        assert_eq!(a, format!("dashboard_{}", T0));
        assert_eq!(b, format!("dashboard_{}", T0 + 1));
        assert_eq!(repo.get(&a).unwrap().name, "Work");
        assert!(repo.get(&a).unwrap().data.item_count() == 0);
        assert_eq!(stored_dashboards(&store).len(), 3);
        // Adding does not move the pointer by itself
        assert_eq!(repo.current_id(), "default");
    }

    #[test]
    fn test_icon_choice_is_deterministic_with_seed() {
        let clock = ManualClock::new(T0);
        let pick = |seed| {
            let mut store = MemoryStore::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();
            let id = repo.add(&mut store, "X", &clock, &mut rng).unwrap().unwrap();
            repo.get(&id).unwrap().icon.clone()
        };

        let icon = pick(42);
        assert_eq!(icon, pick(42));
        assert!(defaults::DASHBOARD_ICONS.contains(&icon.as_str()));
    }

    #[test]
    fn test_rename() {
        let (mut store, clock, _) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();

        assert!(!repo.rename(&mut store, "default", "  ").unwrap());
        assert!(!repo.rename(&mut store, "missing", "New").unwrap());
        assert!(repo.rename(&mut store, "default", " Home ").unwrap());

        assert_eq!(repo.current().name, "Home");
        assert_eq!(stored_dashboards(&store)[0].name, "Home");
    }

    #[test]
    fn test_delete_last_is_refused() {
        let (mut store, clock, _) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();

        let err = repo.delete(&mut store, "default").unwrap_err();
        assert!(matches!(err, BoardError::LastDashboard));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_delete_active_falls_back_to_first() {
        let (mut store, clock, mut rng) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let id = repo.add(&mut store, "Work", &clock, &mut rng).unwrap().unwrap();
        repo.switch_active(&mut store, &id, WorkspaceData::default()).unwrap();

        let deleted = repo.delete(&mut store, &id).unwrap().unwrap();
        assert!(deleted.was_active);
        assert_eq!(repo.current_id(), "default");
        assert_eq!(
            store.get(keys::CURRENT_DASHBOARD).unwrap(),
            Some("default".to_string())
        );
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut store, clock, mut rng) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();
        repo.add(&mut store, "Work", &clock, &mut rng).unwrap();

        assert_eq!(repo.delete(&mut store, "missing").unwrap(), None);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        let (store, clock, mut rng) = setup();
        let mut store = FailingStore::new(store);
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let id = repo.add(&mut store, "Work", &clock, &mut rng).unwrap().unwrap();
        let before = repo.clone();

        store.fail(true);
        let mut edited = WorkspaceData::default();
        edited.favorites.push(LinkItem::new("x", "https://x"));
        assert!(repo.switch_active(&mut store, &id, edited).is_err());
        assert!(repo.delete(&mut store, "default").is_err());
        assert!(repo.rename(&mut store, "default", "Home").is_err());
        assert!(repo.add(&mut store, "Study", &clock, &mut rng).is_err());

        assert_eq!(repo.current_id(), "default");
        assert_eq!(repo.dashboards(), before.dashboards());

        store.fail(false);
        let reloaded = DashboardRepository::load(&mut store, &clock).unwrap();
        assert_eq!(reloaded.dashboards(), before.dashboards());
        assert_eq!(reloaded.current_id(), "default");
    }

    #[test]
    fn test_switch_flushes_outgoing_data() {
        let (mut store, clock, mut rng) = setup();
        let mut repo = DashboardRepository::load(&mut store, &clock).unwrap();
        let id = repo.add(&mut store, "Work", &clock, &mut rng).unwrap().unwrap();

        let mut edited = repo.current().data.clone();
        edited.favorites.push(LinkItem::new("GitHub", "https://github.com"));

        assert!(repo.switch_active(&mut store, &id, edited.clone()).unwrap());
        assert_eq!(repo.current_id(), id);
        assert_eq!(repo.get("default").unwrap().data, edited);
        assert_eq!(stored_dashboards(&store)[0].data, edited);

        assert!(!repo.switch_active(&mut store, "missing", WorkspaceData::default()).unwrap());
        assert_eq!(repo.current_id(), id);
    }
}
