//! Theme and display settings
//!
//! Stored separately from the dashboards. Loading merges whatever is stored
//! over the defaults field by field, so older or newer documents still load:
//! missing fields and fields with unusable values take the default, unknown
//! fields are ignored.

use crate::config::{defaults, keys};
use crate::error::{BoardError, Result};
use crate::storage::{self, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Latte,
    Frappe,
    Macchiato,
    #[default]
    Mocha,
}

impl ThemeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Latte => "latte",
            ThemeId::Frappe => "frappe",
            ThemeId::Macchiato => "macchiato",
            ThemeId::Mocha => "mocha",
        }
    }

    /// Only latte is a light scheme
    pub fn is_dark(&self) -> bool {
        !matches!(self, ThemeId::Latte)
    }
}

/// Base font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    /// CSS value of `--font-size-base`
    pub fn css_size(&self) -> &'static str {
        match self {
            FontSize::Small => "0.875rem",
            FontSize::Medium => "1rem",
            FontSize::Large => "1.125rem",
        }
    }
}

/// Accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Rosewater,
    Flamingo,
    Pink,
    #[default]
    Mauve,
    Red,
    Maroon,
    Peach,
    Yellow,
    Green,
    Teal,
    Sky,
    Sapphire,
    Blue,
    Lavender,
}

impl Accent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Rosewater => "rosewater",
            Accent::Flamingo => "flamingo",
            Accent::Pink => "pink",
            Accent::Mauve => "mauve",
            Accent::Red => "red",
            Accent::Maroon => "maroon",
            Accent::Peach => "peach",
            Accent::Yellow => "yellow",
            Accent::Green => "green",
            Accent::Teal => "teal",
            Accent::Sky => "sky",
            Accent::Sapphire => "sapphire",
            Accent::Blue => "blue",
            Accent::Lavender => "lavender",
        }
    }
}

macro_rules! impl_name_traits {
    ($($ty:ty => $what:literal),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                serde_json::from_value(Value::String(s.trim().to_lowercase()))
                    .map_err(|_| format!("unknown {} '{}'", $what, s))
            }
        }
    )*};
}

impl_name_traits!(ThemeId => "theme", FontSize => "font size", Accent => "accent color");

// =============================================================================
// ThemeSettings
// =============================================================================

/// Persisted display preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    #[serde(default, deserialize_with = "or_default")]
    pub theme: ThemeId,

    /// Backdrop blur in pixels
    #[serde(default = "default_blur", deserialize_with = "blur_or_default")]
    pub blur_intensity: u32,

    #[serde(default, deserialize_with = "or_default")]
    pub font_size: FontSize,

    #[serde(default, deserialize_with = "or_default")]
    pub accent_color: Accent,

    /// Background image url, empty for none
    #[serde(default, deserialize_with = "or_default")]
    pub background: String,
}

fn default_blur() -> u32 {
    defaults::BLUR_INTENSITY_PX
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            theme: ThemeId::default(),
            blur_intensity: default_blur(),
            font_size: FontSize::default(),
            accent_color: Accent::default(),
            background: String::new(),
        }
    }
}

/// Field value, or the type's default when the stored value doesn't fit
fn or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Unusable theme setting, using default");
        T::default()
    }))
}

/// Blur in whole pixels; fractional values round, anything else defaults
fn blur_or_default<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let px = value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| v.round() as u32)
        });
    Ok(px.unwrap_or_else(|| {
        tracing::warn!(value = %value, "Unusable blur intensity, using default");
        default_blur()
    }))
}

impl ThemeSettings {
    /// What the presentation layer needs to apply these settings
    pub fn presentation(&self) -> Presentation {
        Presentation {
            theme: self.theme.as_str(),
            blur_intensity: format!("{}px", self.blur_intensity),
            font_size_base: self.font_size.css_size(),
            accent_color: self.accent_color.as_str(),
            background_image: (!self.background.is_empty())
                .then(|| format!("url('{}')", self.background)),
        }
    }

    /// Apply a single change in memory
    pub fn apply(&mut self, change: ThemeChange) {
        match change {
            ThemeChange::Theme(theme) => self.theme = theme,
            ThemeChange::BlurIntensity(px) => self.blur_intensity = px,
            ThemeChange::FontSize(size) => self.font_size = size,
            ThemeChange::AccentColor(accent) => self.accent_color = accent,
            ThemeChange::Background(url) => self.background = url.trim().to_string(),
        }
    }
}

/// One settings change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeChange {
    Theme(ThemeId),
    BlurIntensity(u32),
    FontSize(FontSize),
    AccentColor(Accent),
    Background(String),
}

/// Values handed to the live presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Theme attribute of the document root
    pub theme: &'static str,
    /// `--blur-intensity`
    pub blur_intensity: String,
    /// `--font-size-base`
    pub font_size_base: &'static str,
    pub accent_color: &'static str,
    /// Body background image, `None` to clear it
    pub background_image: Option<String>,
}

/// Receives every presentation change before it is persisted
pub type PresentationSink = Box<dyn FnMut(&Presentation) + Send>;

// =============================================================================
// ThemeStore
// =============================================================================

/// Settings plus their persistence and live application
pub struct ThemeStore {
    settings: ThemeSettings,
    sink: Option<PresentationSink>,
}

impl ThemeStore {
    /// Load settings, merging over defaults
    ///
    /// A stored value that can't be parsed at all is logged and replaced by
    /// defaults; storage failures are returned.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let settings = match storage::get_json::<Value>(store, keys::THEME_SETTINGS) {
            Ok(Some(value @ Value::Object(_))) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Unreadable theme settings, using defaults");
                ThemeSettings::default()
            }),
            Ok(Some(_)) => {
                tracing::warn!("Theme settings are not an object, using defaults");
                ThemeSettings::default()
            }
            Ok(None) => ThemeSettings::default(),
            Err(BoardError::Parse { source, .. }) => {
                tracing::warn!(error = %source, "Unparsable theme settings, using defaults");
                ThemeSettings::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            settings,
            sink: None,
        })
    }

    /// Attach the live presentation and apply the current settings to it
    pub fn attach(&mut self, sink: PresentationSink) {
        self.sink = Some(sink);
        self.present();
    }

    pub fn settings(&self) -> &ThemeSettings {
        &self.settings
    }

    /// Apply a change to the presentation, then persist
    pub fn set(&mut self, store: &mut dyn KeyValueStore, change: ThemeChange) -> Result<()> {
        tracing::debug!(?change, "Theme change");
        self.settings.apply(change);
        self.present();
        self.save(store)
    }

    /// Show a blur value without persisting it (slider drag)
    ///
    /// The value is kept in memory and written by the next `save` or `set`.
    pub fn preview_blur(&mut self, px: u32) {
        self.settings.blur_intensity = px;
        self.present();
    }

    /// Write the full settings object
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        storage::set_json(store, keys::THEME_SETTINGS, &self.settings)
    }

    /// Restore defaults, apply and persist
    pub fn reset(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        self.settings = ThemeSettings::default();
        self.present();
        self.save(store)
    }

    fn present(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink(&self.settings.presentation());
        }
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("settings", &self.settings)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
