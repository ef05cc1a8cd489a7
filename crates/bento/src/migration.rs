//! Dashboard collection normalization
//!
//! Stored collections may predate the current layout or have been edited by
//! hand. Normalization works on the raw JSON so that one bad field never
//! costs the rest of a dashboard:
//!
//! - a sub-list that is missing or not an array becomes empty, except on the
//!   first dashboard, where it is backfilled from the legacy flat keys;
//! - list entries that are not `{name, url}` objects are dropped;
//! - dashboards without a string id, and repeated ids, are dropped.
//!
//! Legacy keys are only read, never removed.

use crate::config::defaults;
use crate::storage::{self, KeyValueStore};
use crate::types::{Category, Dashboard, LinkItem, WorkspaceData};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Result of normalizing a stored collection
#[derive(Debug)]
pub struct Normalized {
    pub dashboards: Vec<Dashboard>,
    /// Number of fields or entries that had to be repaired or dropped
    pub repairs: usize,
}

/// Read the pre-dashboard flat lists
///
/// Best effort: a missing or unreadable key yields an empty list.
pub fn read_legacy(store: &dyn KeyValueStore) -> WorkspaceData {
    let mut data = WorkspaceData::default();
    for category in Category::ALL {
        let key = category.legacy_key();
        match storage::get_json::<Value>(store, key) {
            Ok(Some(Value::Array(entries))) => {
                *data.list_mut(category) = parse_items(entries, &mut 0);
            }
            Ok(Some(_)) => {
                tracing::warn!(key, "Legacy list is not an array, ignoring");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "Unreadable legacy list, ignoring");
            }
        }
    }
    data
}

/// Normalize a stored dashboard array
///
/// `legacy` supplies the lists missing from the first dashboard.
pub fn normalize(entries: Vec<Value>, legacy: &WorkspaceData) -> Normalized {
    let mut repairs = 0;
    let mut seen = HashSet::new();
    let mut dashboards = Vec::with_capacity(entries.len());

    for entry in entries {
        let Value::Object(mut fields) = entry else {
            tracing::warn!("Dropping dashboard entry that is not an object");
            repairs += 1;
            continue;
        };

        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                tracing::warn!("Dropping dashboard without an id");
                repairs += 1;
                continue;
            }
        };

        if !seen.insert(id.clone()) {
            tracing::warn!(id = %id, "Dropping dashboard with duplicate id");
            repairs += 1;
            continue;
        }

        let backfill = dashboards.is_empty().then_some(legacy);
        let data = normalize_data(fields.remove("data"), backfill, &mut repairs);

        let name = match fields.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                repairs += 1;
                id.clone()
            }
        };
        let icon = match fields.get("icon").and_then(Value::as_str) {
            Some(icon) => icon.to_string(),
            None => {
                repairs += 1;
                defaults::DASHBOARD_ICONS[0].to_string()
            }
        };
        let created = fields
            .get("created")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0);

        dashboards.push(Dashboard {
            id,
            name,
            icon,
            created,
            data,
        });
    }

    Normalized {
        dashboards,
        repairs,
    }
}

fn normalize_data(
    data: Option<Value>,
    backfill: Option<&WorkspaceData>,
    repairs: &mut usize,
) -> WorkspaceData {
    let mut fields = match data {
        Some(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    let mut out = WorkspaceData::default();
    for category in Category::ALL {
        let list = match fields.remove(category.as_str()) {
            Some(Value::Array(entries)) => parse_items(entries, repairs),
            _ => {
                if backfill.is_none() {
                    *repairs += 1;
                }
                backfill
                    .map(|legacy| legacy.list(category).to_vec())
                    .unwrap_or_default()
            }
        };
        *out.list_mut(category) = list;
    }
    out
}

fn parse_items(entries: Vec<Value>, repairs: &mut usize) -> Vec<LinkItem> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<LinkItem>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed list entry");
                *repairs += 1;
                None
            }
        })
        .collect()
}
