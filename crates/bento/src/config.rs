//! Configuration constants for the bento board

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "bento";

    /// Store file name inside the config directory
    pub const STORE_FILE: &str = "storage.json";
}

/// Persisted key names
pub mod keys {
    /// Full dashboard collection (`Dashboard[]`)
    pub const DASHBOARDS: &str = "bento_dashboards";

    /// Active dashboard id (raw string, not JSON)
    pub const CURRENT_DASHBOARD: &str = "bento_current_dashboard";

    /// Theme settings object (partial or full)
    pub const THEME_SETTINGS: &str = "bento_theme_settings";

    /// Legacy background image url, only read by export
    pub const BACKGROUND: &str = "bento_bg";

    /// Sorted list of every todo day key ever written
    pub const TODO_DAYS: &str = "bento_todo_days";

    /// Prefix of per-day todo lists (`todos_YYYY-MM-DD`)
    pub const TODO_PREFIX: &str = "todos_";

    /// Pre-dashboard flat storage, read once during migration
    pub mod legacy {
        pub const FAVORITES: &str = "bento_favs";
        pub const PLAYLIST: &str = "bento_playlist";
        pub const READINGS: &str = "bento_readings";
        pub const RESOURCES: &str = "bento_resources";
    }
}

/// Seed data and fixed choices
pub mod defaults {
    /// Id of the dashboard seeded on first run
    pub const DASHBOARD_ID: &str = "default";

    /// Name of the seeded dashboard
    pub const DASHBOARD_NAME: &str = "Main";

    /// Icon of the seeded dashboard
    pub const DASHBOARD_ICON: &str = "🏠";

    /// Prefix for ids of user-created dashboards
    pub const DASHBOARD_ID_PREFIX: &str = "dashboard_";

    /// Icons assigned to new dashboards
    pub const DASHBOARD_ICONS: [&str; 10] =
        ["📝", "💼", "🎓", "🎯", "🚀", "💡", "🎨", "⚡", "🌟", "🔥"];

    /// Starter playlist of the seeded dashboard (name, url)
    pub const STARTER_PLAYLIST: &[(&str, &str)] = &[("Lofi Girl Focus", "https://youtube.com")];

    /// Starter readings of the seeded dashboard
    pub const STARTER_READINGS: &[(&str, &str)] =
        &[("Eloquent JS", "https://eloquentjavascript.net/")];

    /// Starter resources of the seeded dashboard
    pub const STARTER_RESOURCES: &[(&str, &str)] = &[
        ("The Odin Project", "https://www.theodinproject.com/"),
        ("IELTS Preparation", "https://www.ielts.org/"),
    ];

    /// Default blur intensity in pixels
    pub const BLUR_INTENSITY_PX: u32 = 15;
}

/// Export document
pub mod export {
    /// Document format version
    pub const VERSION: &str = "2.0";

    /// Download file name prefix, followed by the ISO date
    pub const FILE_PREFIX: &str = "bento-dashboard-backup-";
}

/// Dashboard switch transition
pub mod transitions {
    /// Delay between marking the view as transitioning and swapping data
    pub const SWITCH_DELAY_MS: u64 = 150;
}
