//! Common data types for persistence
//!
//! Shared types used across the board modules. Field names follow the
//! persisted JSON layout (camelCase where the stored documents use it).

use crate::config::defaults;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LinkItem
// =============================================================================

/// A named link, the element of every board list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub name: String,
    pub url: String,
}

impl LinkItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// One of the four lists of a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Favorites,
    Playlist,
    Readings,
    Resources,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Favorites,
        Category::Playlist,
        Category::Readings,
        Category::Resources,
    ];

    /// Persisted field name inside `WorkspaceData`
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Favorites => "favorites",
            Category::Playlist => "playlist",
            Category::Readings => "readings",
            Category::Resources => "resources",
        }
    }

    /// Key of the pre-dashboard flat list for this category
    pub fn legacy_key(&self) -> &'static str {
        use crate::config::keys::legacy;
        match self {
            Category::Favorites => legacy::FAVORITES,
            Category::Playlist => legacy::PLAYLIST,
            Category::Readings => legacy::READINGS,
            Category::Resources => legacy::RESOURCES,
        }
    }

    /// Normalize a user-entered url the way each list expects it
    ///
    /// Favorites and resources get an `https://` prefix when the scheme is
    /// missing; readings without a link become `#`; playlist urls are kept.
    pub fn normalize_url(&self, url: &str) -> String {
        let url = url.trim();
        match self {
            Category::Favorites if !url.starts_with("http") => format!("https://{url}"),
            Category::Resources if !url.contains("http") => format!("https://{url}"),
            Category::Readings if !url.contains("http") => "#".to_string(),
            _ => url.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "favorites" | "favorite" | "favs" | "fav" => Ok(Category::Favorites),
            "playlist" => Ok(Category::Playlist),
            "readings" | "reading" => Ok(Category::Readings),
            "resources" | "resource" => Ok(Category::Resources),
            other => Err(format!(
                "unknown category '{other}' (expected favorites, playlist, readings or resources)"
            )),
        }
    }
}

// =============================================================================
// WorkspaceData
// =============================================================================

/// The four ordered lists of one dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceData {
    pub favorites: Vec<LinkItem>,
    pub playlist: Vec<LinkItem>,
    pub readings: Vec<LinkItem>,
    pub resources: Vec<LinkItem>,
}

impl WorkspaceData {
    /// Data of the dashboard seeded on first run
    pub fn starter() -> Self {
        fn items(pairs: &[(&str, &str)]) -> Vec<LinkItem> {
            pairs.iter().map(|(n, u)| LinkItem::new(*n, *u)).collect()
        }

        Self {
            favorites: Vec::new(),
            playlist: items(defaults::STARTER_PLAYLIST),
            readings: items(defaults::STARTER_READINGS),
            resources: items(defaults::STARTER_RESOURCES),
        }
    }

    pub fn list(&self, category: Category) -> &[LinkItem] {
        match category {
            Category::Favorites => &self.favorites,
            Category::Playlist => &self.playlist,
            Category::Readings => &self.readings,
            Category::Resources => &self.resources,
        }
    }

    pub fn list_mut(&mut self, category: Category) -> &mut Vec<LinkItem> {
        match category {
            Category::Favorites => &mut self.favorites,
            Category::Playlist => &mut self.playlist,
            Category::Readings => &mut self.readings,
            Category::Resources => &mut self.resources,
        }
    }

    /// Total number of items across all lists
    pub fn item_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.list(*c).len()).sum()
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// A named, independently switchable board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Creation time (Unix millis)
    pub created: i64,
    pub data: WorkspaceData,
}

impl Dashboard {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        created: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            created,
            data: WorkspaceData::default(),
        }
    }

    /// The dashboard seeded when nothing is stored yet
    pub fn seeded(created: i64) -> Self {
        Self {
            data: WorkspaceData::starter(),
            ..Self::new(
                defaults::DASHBOARD_ID,
                defaults::DASHBOARD_NAME,
                defaults::DASHBOARD_ICON,
                created,
            )
        }
    }
}

// =============================================================================
// TodoItem
// =============================================================================

/// One entry of a day's todo list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}
