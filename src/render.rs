//! Rendering capabilities
//!
//! The coordinator never talks to a map or chart library directly. It drives
//! these traits with complete view values (full style sets, full bar series,
//! full panel states) so a renderer can replace what it shows wholesale.

use crate::catalog::SubmenuState;
use crate::chart::BarSeries;
use crate::data_client::{AnomalyDetails, BoroughStats, TripSummary, ZoneStats};
use crate::highlight::{HighlightState, MapStyle};
use crate::model::{BoroughScope, Bounds, ZoneRecord};
use crate::panels::{CoverageAssessment, PanelState, ZoneTarget};
use crate::report::ReportView;

/// Health percentage under which the tile takes the warning tone
pub const HEALTH_WARNING_BELOW: f64 = 95.0;

/// "Render geometry with style"
pub trait GeoRenderer {
    fn apply_styles(&mut self, styles: &MapStyle);
    fn fit_bounds(&mut self, bounds: Bounds, padding: u32);
}

/// "Render a bar series"
pub trait ChartRenderer {
    fn render_bars(&mut self, series: &BarSeries);
    fn set_chart_loading(&mut self, loading: bool);
}

/// Tiles, banners, detail panels and the report view
pub trait DashboardSurface {
    fn render_summary(&mut self, tiles: &SummaryTiles);
    /// Zero-trip banner, distinct from any error state
    fn set_no_data(&mut self, visible: bool);
    /// Quick filter left nothing visible on the map
    fn set_empty_state(&mut self, visible: bool);
    fn render_search_results(&mut self, query: &str, matches: &[&ZoneRecord]);
    fn render_submenu(&mut self, borough: &str, submenu: &SubmenuState<'_>);
    fn render_zone_panel(&mut self, panel: PanelState<&ZoneTarget, &ZoneStats>);
    fn render_borough_panel(
        &mut self,
        panel: PanelState<&BoroughScope, &BoroughStats>,
        highlight: &HighlightState,
    );
    fn set_report_trigger(&mut self, enabled: bool);
    fn render_report(&mut self, report: &ReportView);
    /// Modal alert the user must dismiss
    fn notify_blocking(&mut self, message: &str);
}

/// Everything the coordinator needs from the presentation side
pub trait Renderer: GeoRenderer + ChartRenderer + DashboardSurface {}

impl<T: GeoRenderer + ChartRenderer + DashboardSurface> Renderer for T {}

// ============================================================================
// Summary tiles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTiles {
    pub health_pct: f64,
    pub health_warning: bool,
    pub avg_speed_mph: f64,
    pub anomalies: u64,
    pub anomaly_breakdown: Option<AnomalyDetails>,
    pub trips: u64,
    pub passengers: u64,
}

impl SummaryTiles {
    pub fn from_summary(summary: &TripSummary) -> Self {
        Self {
            health_pct: summary.system_health,
            health_warning: summary.system_health < HEALTH_WARNING_BELOW,
            avg_speed_mph: summary.avg_mobility_speed,
            anomalies: summary.total_anomalies,
            anomaly_breakdown: summary.anomaly_details,
            trips: summary.total_trips,
            passengers: summary.total_passengers,
        }
    }
}

// ============================================================================
// Log-only renderer
// ============================================================================

/// Renders every view as structured log events; used by the headless driver
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl GeoRenderer for TracingRenderer {
    fn apply_styles(&mut self, styles: &MapStyle) {
        tracing::info!(
            features = styles.features.len(),
            visible = styles.visible_count,
            "map restyled"
        );
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32) {
        tracing::info!(
            min_lon = bounds.min_lon,
            min_lat = bounds.min_lat,
            max_lon = bounds.max_lon,
            max_lat = bounds.max_lat,
            padding,
            "viewport fitted"
        );
    }
}

impl ChartRenderer for TracingRenderer {
    fn render_bars(&mut self, series: &BarSeries) {
        let peak = series.peak().map(|b| b.label.as_str()).unwrap_or("-");
        tracing::info!(title = series.title, bars = series.bars.len(), peak, "chart rendered");
    }

    fn set_chart_loading(&mut self, loading: bool) {
        tracing::debug!(loading, "chart loading");
    }
}

impl DashboardSurface for TracingRenderer {
    fn render_summary(&mut self, tiles: &SummaryTiles) {
        tracing::info!(
            health = tiles.health_pct,
            warning = tiles.health_warning,
            speed = tiles.avg_speed_mph,
            anomalies = tiles.anomalies,
            trips = tiles.trips,
            passengers = tiles.passengers,
            "summary tiles"
        );
    }

    fn set_no_data(&mut self, visible: bool) {
        if visible {
            tracing::info!("no trips match the current filters");
        }
    }

    fn set_empty_state(&mut self, visible: bool) {
        if visible {
            tracing::info!("no zones match the quick filter");
        }
    }

    fn render_search_results(&mut self, query: &str, matches: &[&ZoneRecord]) {
        for zone in matches {
            tracing::info!(query, id = %zone.id, zone = %zone.zone_name, borough = %zone.borough, "search match");
        }
        if matches.is_empty() {
            tracing::info!(query, "no zones found");
        }
    }

    fn render_submenu(&mut self, borough: &str, submenu: &SubmenuState<'_>) {
        match submenu {
            SubmenuState::Loading => tracing::info!(borough, "submenu waiting for zone catalog"),
            SubmenuState::Empty => tracing::info!(borough, "no zones in borough"),
            SubmenuState::Zones(zones) => {
                for zone in zones {
                    tracing::info!(borough, id = %zone.id, zone = %zone.zone_name, "submenu zone");
                }
            }
        }
    }

    fn render_zone_panel(&mut self, panel: PanelState<&ZoneTarget, &ZoneStats>) {
        match panel {
            PanelState::Closed => tracing::info!("zone panel closed"),
            PanelState::Loading(t) => {
                tracing::info!(zone = %t.zone_name, borough = %t.borough, status = t.status.label(), "zone panel loading")
            }
            PanelState::Loaded(t, stats) => tracing::info!(
                zone = %t.zone_name,
                pickups = stats.pickup_count,
                dropoffs = stats.dropoff_count,
                passengers = stats.total_passengers,
                avg_speed = stats.avg_speed,
                vs_borough = stats.speed_comparison,
                assessment = %CoverageAssessment::from_stats(stats).describe(),
                "zone panel"
            ),
            PanelState::Errored(t, message) => {
                tracing::warn!(zone = %t.zone_name, status = t.status.label(), %message, "zone panel error")
            }
        }
    }

    fn render_borough_panel(
        &mut self,
        panel: PanelState<&BoroughScope, &BoroughStats>,
        highlight: &HighlightState,
    ) {
        match panel {
            PanelState::Closed => tracing::info!("borough panel closed"),
            PanelState::Loading(scope) => tracing::info!(scope = scope.display_name(), "borough panel loading"),
            PanelState::Loaded(scope, stats) => tracing::info!(
                scope = scope.display_name(),
                zones = stats.zone_count,
                trips = stats.total_trips,
                avg_speed = stats.avg_speed,
                underserved = stats.underserved_count,
                highlight_on = highlight.toggle_active,
                top_zone = stats.top_zones.first().map(|z| z.zone.as_str()).unwrap_or("-"),
                "borough panel"
            ),
            PanelState::Errored(scope, message) => {
                tracing::warn!(scope = scope.display_name(), %message, "borough panel error")
            }
        }
    }

    fn set_report_trigger(&mut self, enabled: bool) {
        tracing::debug!(enabled, "report trigger");
    }

    fn render_report(&mut self, report: &ReportView) {
        tracing::info!(metadata = %report.metadata_line, "report");
        for card in &report.cards {
            tracing::info!(label = card.label, value = %card.value, "report metric");
        }
        if let Some(ref peak) = report.peak_period {
            tracing::info!(peak = %peak, "report peak period");
        }
        if let Some(ref alert) = report.congestion_alert {
            tracing::warn!(label = alert.severity.label(), impact = alert.impact_pct, "report congestion alert");
        }
        tracing::info!(gaps = report.gaps.len(), noise = report.noise.len(), "report findings");
    }

    fn notify_blocking(&mut self, message: &str) {
        tracing::error!(%message, "blocking notification");
    }
}
