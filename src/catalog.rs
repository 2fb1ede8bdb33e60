//! Zone Catalog - immutable zone list loaded once at startup
//!
//! Shared read-only by the highlight engine, search and the borough submenus.
//! Only the catalog fetch completion handler writes it.

use rustc_hash::FxHashMap;

use crate::model::{BoroughScope, Bounds, ZoneId, ZoneRecord};

#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    zones: Vec<ZoneRecord>,
    /// ZoneId -> position in `zones`
    index: FxHashMap<ZoneId, usize>,
    loaded: bool,
}

/// Contents of a borough submenu
#[derive(Debug, Clone, PartialEq)]
pub enum SubmenuState<'a> {
    /// Catalog has not arrived yet
    Loading,
    /// Catalog loaded but the borough has no zones
    Empty,
    Zones(Vec<&'a ZoneRecord>),
}

impl ZoneCatalog {
    pub fn from_records(zones: Vec<ZoneRecord>) -> Self {
        let index = zones
            .iter()
            .enumerate()
            .map(|(i, z)| (z.id, i))
            .collect();
        Self {
            zones,
            index,
            loaded: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneRecord> {
        self.zones.iter()
    }

    pub fn get(&self, id: ZoneId) -> Option<&ZoneRecord> {
        self.index.get(&id).map(|&i| &self.zones[i])
    }

    /// Case-insensitive substring match on zone or borough name, catalog order
    pub fn search(&self, query: &str, limit: usize) -> Vec<&ZoneRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.zones
            .iter()
            .filter(|z| {
                z.zone_name.to_lowercase().contains(&needle)
                    || z.borough.to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect()
    }

    pub fn zones_in(&self, borough: &str) -> SubmenuState<'_> {
        if !self.loaded {
            return SubmenuState::Loading;
        }
        let zones: Vec<&ZoneRecord> = self.zones.iter().filter(|z| z.borough == borough).collect();
        if zones.is_empty() {
            SubmenuState::Empty
        } else {
            SubmenuState::Zones(zones)
        }
    }

    /// Bounds of every zone inside `scope` that carries geometry
    pub fn scope_bounds(&self, scope: &BoroughScope) -> Option<Bounds> {
        Bounds::union_all(
            self.zones
                .iter()
                .filter(|z| scope.contains(&z.borough))
                .filter_map(|z| z.geometry.as_ref().and_then(|g| g.bounds())),
        )
    }
}
