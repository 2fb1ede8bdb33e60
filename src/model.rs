//! Core data model shared by every component
//!
//! Zone records are immutable catalog entries loaded once at startup. Gap
//! records are replaced wholesale on every scope-affecting refresh.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a taxi zone (location id on the aggregate service)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Scope selectors
// ============================================================================

/// Borough selector: "all" or one named borough
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BoroughScope {
    #[default]
    All,
    Borough(String),
}

impl BoroughScope {
    /// Parse a selector value; "all" (any case) and blank mean citywide
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            BoroughScope::All
        } else {
            BoroughScope::Borough(trimmed.to_string())
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        BoroughScope::parse(&name.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, BoroughScope::All)
    }

    /// Borough name when a single borough is selected
    pub fn name(&self) -> Option<&str> {
        match self {
            BoroughScope::All => None,
            BoroughScope::Borough(name) => Some(name),
        }
    }

    /// Whether a zone in `borough` falls inside this scope
    pub fn contains(&self, borough: &str) -> bool {
        match self {
            BoroughScope::All => true,
            BoroughScope::Borough(name) => name == borough,
        }
    }

    /// Value used in endpoint paths ("all" for citywide)
    pub fn as_path_segment(&self) -> &str {
        self.name().unwrap_or("all")
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("Citywide")
    }
}

impl fmt::Display for BoroughScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

/// Quick-filter chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuickFilter {
    #[default]
    All,
    Underserved,
    Normal,
}

impl QuickFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(QuickFilter::All),
            "underserved" => Some(QuickFilter::Underserved),
            "normal" => Some(QuickFilter::Normal),
            _ => None,
        }
    }

    /// Whether a zone with the given gap membership is shown under this chip
    pub fn shows(&self, is_gap: bool) -> bool {
        match self {
            QuickFilter::All => true,
            QuickFilter::Underserved => is_gap,
            QuickFilter::Normal => !is_gap,
        }
    }
}

/// Optional, independent date bounds (open-ended ranges allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Start after end; the service answers these with an empty result
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Axis-aligned lon/lat bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    fn point(lon: f64, lat: f64) -> Self {
        Self {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Union of all bounds, `None` if the iterator is empty
    pub fn union_all(iter: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        iter.into_iter().reduce(Bounds::union)
    }
}

/// GeoJSON geometry, kept opaque apart from its bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(pub serde_json::Value);

impl Geometry {
    /// Bounding box over every coordinate pair in the geometry
    pub fn bounds(&self) -> Option<Bounds> {
        let coords = self.0.get("coordinates")?;
        let mut acc = None;
        collect_bounds(coords, &mut acc);
        acc
    }
}

fn collect_bounds(value: &serde_json::Value, acc: &mut Option<Bounds>) {
    let Some(items) = value.as_array() else {
        return;
    };
    // A position is an array whose first two members are numbers
    if let (Some(lon), Some(lat)) = (
        items.first().and_then(|v| v.as_f64()),
        items.get(1).and_then(|v| v.as_f64()),
    ) {
        let point = Bounds::point(lon, lat);
        *acc = Some(match acc.take() {
            Some(b) => b.union(point),
            None => point,
        });
        return;
    }
    for item in items {
        collect_bounds(item, acc);
    }
}

// ============================================================================
// Records
// ============================================================================

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: ZoneId,
    pub borough: String,
    #[serde(rename = "zone")]
    pub zone_name: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Underserved zone reported by the coverage-gaps endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRecord {
    #[serde(rename = "zone")]
    pub zone_name: String,
    #[serde(default)]
    pub borough: Option<String>,
    /// Drop-offs divided by pick-ups
    pub ratio: f64,
}

/// Current gap set, keyed by zone name (the service reports gaps by name)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapSet {
    by_zone: FxHashMap<String, GapRecord>,
}

impl GapSet {
    pub fn from_records(records: Vec<GapRecord>) -> Self {
        let by_zone = records
            .into_iter()
            .map(|g| (g.zone_name.clone(), g))
            .collect();
        Self { by_zone }
    }

    pub fn contains(&self, zone_name: &str) -> bool {
        self.by_zone.contains_key(zone_name)
    }

    pub fn get(&self, zone_name: &str) -> Option<&GapRecord> {
        self.by_zone.get(zone_name)
    }

    pub fn len(&self) -> usize {
        self.by_zone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zone.is_empty()
    }
}

/// Gap-derived coverage status of a single zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoverageStatus {
    Underserved { ratio: f64 },
    Normal,
}

impl CoverageStatus {
    pub fn of(zone: &ZoneRecord, gaps: &GapSet) -> Self {
        match gaps.get(&zone.zone_name) {
            Some(gap) => CoverageStatus::Underserved { ratio: gap.ratio },
            None => CoverageStatus::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoverageStatus::Underserved { .. } => "Underserved Area",
            CoverageStatus::Normal => "Normal Coverage",
        }
    }
}
