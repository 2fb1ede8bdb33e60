//! Panel Controller - zone/borough detail panel lifecycle
//!
//! Both panels live in one slot, so at most one of them can be open at any
//! time: opening either replaces whatever occupied the slot. Each panel goes
//! Closed -> Loading -> (Loaded | Errored) -> Closed.
//!
//! The controller also owns the underserved highlight toggled from the
//! borough panel. Closing a panel never touches the highlight; only the
//! toggle does.

use crate::data_client::{BoroughStats, ZoneStats};
use crate::error::{DashboardError, Result};
use crate::highlight::HighlightState;
use crate::model::{BoroughScope, CoverageStatus, GapSet, ZoneId, ZoneRecord};

/// Zone panel target plus the placeholder shown while stats load
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTarget {
    pub id: ZoneId,
    pub zone_name: String,
    pub borough: String,
    /// Gap-derived status known before the fetch, kept on error
    pub status: CoverageStatus,
}

impl ZoneTarget {
    pub fn from_record(zone: &ZoneRecord, gaps: &GapSet) -> Self {
        Self {
            id: zone.id,
            zone_name: zone.zone_name.clone(),
            borough: zone.borough.clone(),
            status: CoverageStatus::of(zone, gaps),
        }
    }
}

/// Observable state of one panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T, D> {
    Closed,
    Loading(T),
    Loaded(T, D),
    Errored(T, String),
}

impl<T, D> PanelState<T, D> {
    pub fn is_closed(&self) -> bool {
        matches!(self, PanelState::Closed)
    }

    pub fn target(&self) -> Option<&T> {
        match self {
            PanelState::Closed => None,
            PanelState::Loading(t) | PanelState::Loaded(t, _) | PanelState::Errored(t, _) => Some(t),
        }
    }
}

impl<T: Clone, D: Clone> PanelState<&T, &D> {
    /// Owned snapshot of a borrowed panel view
    pub fn cloned(&self) -> PanelState<T, D> {
        match self {
            PanelState::Closed => PanelState::Closed,
            PanelState::Loading(t) => PanelState::Loading((*t).clone()),
            PanelState::Loaded(t, d) => PanelState::Loaded((*t).clone(), (*d).clone()),
            PanelState::Errored(t, e) => PanelState::Errored((*t).clone(), e.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase<T, D> {
    Loading(T),
    Loaded(T, D),
    Errored(T, String),
}

impl<T, D> Phase<T, D> {
    fn view(&self) -> PanelState<&T, &D> {
        match self {
            Phase::Loading(t) => PanelState::Loading(t),
            Phase::Loaded(t, d) => PanelState::Loaded(t, d),
            Phase::Errored(t, e) => PanelState::Errored(t, e.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Slot {
    #[default]
    Closed,
    Zone(Phase<ZoneTarget, ZoneStats>),
    Borough(Phase<BoroughScope, BoroughStats>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Zone,
    Borough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightChange {
    Applied(usize),
    Cleared,
}

#[derive(Debug, Default)]
pub struct PanelController {
    slot: Slot,
    highlight: HighlightState,
}

impl PanelController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_kind(&self) -> Option<PanelKind> {
        match self.slot {
            Slot::Closed => None,
            Slot::Zone(_) => Some(PanelKind::Zone),
            Slot::Borough(_) => Some(PanelKind::Borough),
        }
    }

    pub fn zone_panel(&self) -> PanelState<&ZoneTarget, &ZoneStats> {
        match &self.slot {
            Slot::Zone(phase) => phase.view(),
            _ => PanelState::Closed,
        }
    }

    pub fn borough_panel(&self) -> PanelState<&BoroughScope, &BoroughStats> {
        match &self.slot {
            Slot::Borough(phase) => phase.view(),
            _ => PanelState::Closed,
        }
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    // ========================================================================
    // Zone panel
    // ========================================================================

    /// Force the borough panel closed and show the zone placeholder
    pub fn open_zone_panel(&mut self, target: ZoneTarget) {
        tracing::debug!(zone = %target.id, "opening zone panel");
        self.slot = Slot::Zone(Phase::Loading(target));
    }

    /// Land a zone stats response; ignored unless still loading that zone
    pub fn resolve_zone(&mut self, zone: ZoneId, result: Result<ZoneStats>) -> bool {
        let Slot::Zone(Phase::Loading(target)) = &self.slot else {
            return false;
        };
        if target.id != zone {
            return false;
        }
        let target = target.clone();
        self.slot = Slot::Zone(match result {
            Ok(stats) => Phase::Loaded(target, stats),
            Err(e) => Phase::Errored(target, e.to_string()),
        });
        true
    }

    pub fn close_zone_panel(&mut self) -> bool {
        if matches!(self.slot, Slot::Zone(_)) {
            self.slot = Slot::Closed;
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Borough panel
    // ========================================================================

    /// Force the zone panel closed, reset the toggle indicator and show the
    /// borough placeholder
    pub fn open_borough_panel(&mut self, scope: BoroughScope) {
        tracing::debug!(scope = %scope, "opening borough panel");
        self.highlight.toggle_active = false;
        self.slot = Slot::Borough(Phase::Loading(scope));
    }

    pub fn resolve_borough(&mut self, scope: &BoroughScope, result: Result<BoroughStats>) -> bool {
        let Slot::Borough(Phase::Loading(target)) = &self.slot else {
            return false;
        };
        if target != scope {
            return false;
        }
        let target = target.clone();
        self.slot = Slot::Borough(match result {
            Ok(stats) => Phase::Loaded(target, stats),
            Err(e) => Phase::Errored(target, e.to_string()),
        });
        true
    }

    pub fn close_borough_panel(&mut self) -> bool {
        if matches!(self.slot, Slot::Borough(_)) {
            self.slot = Slot::Closed;
            true
        } else {
            false
        }
    }

    /// Flip the underserved highlight from the loaded borough panel
    ///
    /// Clears an applied highlight (even one left over from an earlier panel),
    /// otherwise emphasizes the panel's full underserved list.
    pub fn toggle_underserved_highlight(&mut self) -> Result<HighlightChange> {
        let Slot::Borough(Phase::Loaded(scope, stats)) = &self.slot else {
            return Err(DashboardError::HighlightUnavailable);
        };
        // The count alone can be positive while the id list is empty
        if stats.underserved_count == 0 || stats.underserved_zones.is_empty() {
            return Err(DashboardError::HighlightUnavailable);
        }

        if self.highlight.is_applied() {
            self.highlight.clear();
            Ok(HighlightChange::Cleared)
        } else {
            let ids = stats.underserved_ids();
            let count = ids.len();
            self.highlight.apply(scope.clone(), ids);
            Ok(HighlightChange::Applied(count))
        }
    }
}

/// Reading of a zone's drop-off/pick-up balance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoverageAssessment {
    /// No pick-ups recorded, ratio undefined
    NoPickups,
    /// Pick-ups recorded but no drop-offs at all
    NoDropoffs { pickups: u64 },
    /// Drop-offs exceed pick-ups more than twofold
    ServiceGap { ratio: f64 },
    /// Pick-ups exceed drop-offs more than twofold
    DeparturePoint { pickup_multiple: f64 },
    Balanced { ratio: f64 },
}

impl CoverageAssessment {
    /// The service rounds the ratio to two places, so a strong departure
    /// point can arrive as 0.0; the raw counts decide the edge cases.
    pub fn from_stats(stats: &ZoneStats) -> Self {
        if stats.pickup_count == 0 {
            return CoverageAssessment::NoPickups;
        }
        if stats.dropoff_count == 0 {
            return CoverageAssessment::NoDropoffs {
                pickups: stats.pickup_count,
            };
        }
        let ratio = stats.coverage_ratio;
        if ratio > 2.0 {
            CoverageAssessment::ServiceGap { ratio }
        } else if ratio < 0.5 {
            let multiple = stats.pickup_count as f64 / stats.dropoff_count as f64;
            CoverageAssessment::DeparturePoint {
                pickup_multiple: (multiple * 10.0).round() / 10.0,
            }
        } else {
            CoverageAssessment::Balanced { ratio }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CoverageAssessment::NoPickups => "No pick-ups recorded for this zone in the selected period.".to_string(),
            CoverageAssessment::NoDropoffs { pickups } => format!(
                "This zone recorded {} pick-ups and no drop-offs, making it purely a departure point.",
                pickups
            ),
            CoverageAssessment::ServiceGap { ratio } => format!(
                "This zone receives {}x more drop-offs than pick-ups, indicating potential service gaps.",
                ratio
            ),
            CoverageAssessment::DeparturePoint { pickup_multiple } => format!(
                "This zone has {:.1}x more pick-ups than drop-offs, suggesting it's primarily a departure point.",
                pickup_multiple
            ),
            CoverageAssessment::Balanced { ratio } => format!(
                "This zone has balanced pick-up and drop-off activity (ratio: {}).",
                ratio
            ),
        }
    }
}
