// Shared fixtures for the coordinator integration tests
//
// ScriptedClient answers every endpoint from in-memory data after a
// configurable delay (tokio's paused clock makes delays deterministic),
// records each request, and can fail the next N calls of an endpoint.
// RecordingRenderer keeps everything the coordinator drew.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde_json::json;

use mobility_dashboard::catalog::SubmenuState;
use mobility_dashboard::chart::BarSeries;
use mobility_dashboard::data_client::{
    BoroughStats, CongestionSeries, HourBucket, HourlySeries, Report, ReportMetadata, RushHour, TripSummary,
    UnderservedZone, ZoneStats, ZoneTrips,
};
use mobility_dashboard::highlight::{HighlightState, MapStyle};
use mobility_dashboard::model::{Bounds, Geometry};
use mobility_dashboard::panels::{PanelState, ZoneTarget};
use mobility_dashboard::render::SummaryTiles;
use mobility_dashboard::{
    BoroughScope, ChartRenderer, DashboardConfig, DashboardError, DashboardSurface, DataClient, Endpoint,
    GapRecord, GeoRenderer, QueryParams, ReportView, Result, SyncCoordinator, ZoneId, ZoneRecord,
};

pub const ALPHABET_CITY: ZoneId = ZoneId(1);
pub const BATTERY_PARK: ZoneId = ZoneId(2);
pub const CANARSIE: ZoneId = ZoneId(3);
pub const RED_HOOK: ZoneId = ZoneId(4);
pub const PARK_SLOPE: ZoneId = ZoneId(5);
pub const ASTORIA: ZoneId = ZoneId(6);

const DEFAULT_DELAY: Duration = Duration::from_millis(20);

// ============================================================================
// Fixture data
// ============================================================================

fn square(lon: f64, lat: f64) -> Geometry {
    let d = 0.01;
    Geometry(json!({
        "type": "Polygon",
        "coordinates": [[[lon, lat], [lon + d, lat], [lon + d, lat + d], [lon, lat + d], [lon, lat]]]
    }))
}

fn zone(id: ZoneId, borough: &str, name: &str, lon: f64, lat: f64) -> ZoneRecord {
    ZoneRecord {
        id,
        borough: borough.to_string(),
        zone_name: name.to_string(),
        geometry: Some(square(lon, lat)),
    }
}

/// Manhattan {Alphabet City (gap), Battery Park}, Brooklyn {Canarsie (gap),
/// Red Hook (gap), Park Slope}, Queens {Astoria}
pub fn catalog() -> Vec<ZoneRecord> {
    vec![
        zone(ALPHABET_CITY, "Manhattan", "Alphabet City", -73.98, 40.72),
        zone(BATTERY_PARK, "Manhattan", "Battery Park", -74.02, 40.70),
        zone(CANARSIE, "Brooklyn", "Canarsie", -73.90, 40.63),
        zone(RED_HOOK, "Brooklyn", "Red Hook", -74.01, 40.67),
        zone(PARK_SLOPE, "Brooklyn", "Park Slope", -73.98, 40.67),
        zone(ASTORIA, "Queens", "Astoria", -73.92, 40.76),
    ]
}

pub fn gaps() -> Vec<GapRecord> {
    vec![
        GapRecord { zone_name: "Alphabet City".into(), borough: Some("Manhattan".into()), ratio: 2.4 },
        GapRecord { zone_name: "Canarsie".into(), borough: Some("Brooklyn".into()), ratio: 3.1 },
        GapRecord { zone_name: "Red Hook".into(), borough: Some("Brooklyn".into()), ratio: 2.2 },
    ]
}

pub fn summary(total_trips: u64) -> TripSummary {
    TripSummary {
        total_trips,
        total_passengers: total_trips * 2,
        system_health: 97.0,
        avg_mobility_speed: 11.5,
        ..Default::default()
    }
}

fn hourly() -> HourlySeries {
    [(8u8, 120u64, 9.0), (17, 300, 4.5), (22, 40, 14.0)]
        .into_iter()
        .map(|(h, trips, speed)| (h, HourBucket { trips, speed }))
        .collect()
}

fn borough_stats(scope: &BoroughScope) -> BoroughStats {
    let underserved: &[(ZoneId, &str)] = match scope.name() {
        Some("Brooklyn") => &[(CANARSIE, "Canarsie"), (RED_HOOK, "Red Hook"), (PARK_SLOPE, "Park Slope")],
        Some("Manhattan") => &[(ALPHABET_CITY, "Alphabet City")],
        _ => &[],
    };
    BoroughStats {
        borough: scope.display_name().to_string(),
        zone_count: 3,
        total_trips: 900,
        avg_speed: 10.0,
        top_zones: vec![ZoneTrips { zone: "Park Slope".into(), trips: 400 }],
        underserved_count: underserved.len() as u64,
        underserved_zones: underserved
            .iter()
            .map(|&(id, name)| UnderservedZone { zone: name.to_string(), id })
            .collect(),
        ..Default::default()
    }
}

// ============================================================================
// Scripted data client
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub params: QueryParams,
    /// Zone id or borough segment for the detail endpoints
    pub target: Option<String>,
}

struct Script {
    zones: Vec<ZoneRecord>,
    gaps: Vec<GapRecord>,
    summary: TripSummary,
    report: Report,
    delays: FxHashMap<Endpoint, Duration>,
    zone_delays: FxHashMap<ZoneId, Duration>,
    failures: FxHashMap<Endpoint, u32>,
    log: Vec<Request>,
}

pub struct ScriptedClient {
    script: Mutex<Script>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script {
                zones: catalog(),
                gaps: gaps(),
                summary: summary(1000),
                report: Report {
                    metadata: ReportMetadata {
                        scope: "Citywide".into(),
                        period: "All time".into(),
                        generated_at: "2024-01-08 09:00".into(),
                        is_citywide: true,
                        ..Default::default()
                    },
                    summary: summary(1000),
                    rush_hour: RushHour { hour: 17, trips: 300, trend: hourly(), ..Default::default() },
                    ..Default::default()
                },
                delays: FxHashMap::default(),
                zone_delays: FxHashMap::default(),
                failures: FxHashMap::default(),
                log: Vec::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn set_delay(&self, endpoint: Endpoint, delay: Duration) {
        self.lock().delays.insert(endpoint, delay);
    }

    /// Delay for any request scoped to `zone`, overriding the endpoint delay
    pub fn set_zone_delay(&self, zone: ZoneId, delay: Duration) {
        self.lock().zone_delays.insert(zone, delay);
    }

    pub fn fail_next(&self, endpoint: Endpoint, times: u32) {
        self.lock().failures.insert(endpoint, times);
    }

    pub fn set_gaps(&self, gaps: Vec<GapRecord>) {
        self.lock().gaps = gaps;
    }

    pub fn set_summary(&self, summary: TripSummary) {
        self.lock().summary = summary;
    }

    pub fn requests(&self, endpoint: Endpoint) -> Vec<Request> {
        self.lock().log.iter().filter(|r| r.endpoint == endpoint).cloned().collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.requests(endpoint).len()
    }

    pub fn last(&self, endpoint: Endpoint) -> Option<Request> {
        self.requests(endpoint).pop()
    }

    pub fn total_requests(&self) -> usize {
        self.lock().log.len()
    }

    pub fn clear_log(&self) {
        self.lock().log.clear();
    }

    /// Log the request and decide its delay and whether it fails
    fn begin(&self, endpoint: Endpoint, params: &QueryParams, target: Option<String>) -> (Duration, bool) {
        let mut script = self.lock();
        script.log.push(Request { endpoint, params: params.clone(), target });
        let delay = params
            .zone_id
            .and_then(|z| script.zone_delays.get(&z).copied())
            .or_else(|| script.delays.get(&endpoint).copied())
            .unwrap_or(DEFAULT_DELAY);
        let fail = match script.failures.get_mut(&endpoint) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        (delay, fail)
    }

    async fn finish<T>(&self, endpoint: Endpoint, (delay, fail): (Duration, bool), value: T) -> Result<T> {
        tokio::time::sleep(delay).await;
        if fail {
            Err(DashboardError::network(endpoint, Some(500), "API Error: 500"))
        } else {
            Ok(value)
        }
    }
}

impl DataClient for ScriptedClient {
    async fn zones(&self) -> Result<Vec<ZoneRecord>> {
        let plan = self.begin(Endpoint::ZoneCatalog, &QueryParams::default(), None);
        let zones = self.lock().zones.clone();
        self.finish(Endpoint::ZoneCatalog, plan, zones).await
    }

    /// Zone-scoped summaries report `zone id * 100` trips
    async fn trip_summary(&self, params: &QueryParams) -> Result<TripSummary> {
        let plan = self.begin(Endpoint::TripSummary, params, None);
        let value = match params.zone_id {
            Some(zone) => summary(zone.0 as u64 * 100),
            None => self.lock().summary.clone(),
        };
        self.finish(Endpoint::TripSummary, plan, value).await
    }

    async fn hourly(&self, params: &QueryParams) -> Result<HourlySeries> {
        let plan = self.begin(Endpoint::HourlyHistogram, params, None);
        self.finish(Endpoint::HourlyHistogram, plan, hourly()).await
    }

    async fn congestion(&self, params: &QueryParams) -> Result<CongestionSeries> {
        let plan = self.begin(Endpoint::CongestionSeries, params, None);
        let series: CongestionSeries = [("Brooklyn".to_string(), 1.4), ("Manhattan".to_string(), 2.1)]
            .into_iter()
            .collect();
        self.finish(Endpoint::CongestionSeries, plan, series).await
    }

    async fn coverage_gaps(&self, params: &QueryParams) -> Result<Vec<GapRecord>> {
        let plan = self.begin(Endpoint::CoverageGaps, params, None);
        let gaps = self.lock().gaps.clone();
        self.finish(Endpoint::CoverageGaps, plan, gaps).await
    }

    async fn zone_stats(&self, zone: ZoneId, params: &QueryParams) -> Result<ZoneStats> {
        let mut scoped = params.clone();
        scoped.zone_id = Some(zone);
        let plan = self.begin(Endpoint::ZoneStats, &scoped, Some(zone.to_string()));
        let stats = ZoneStats {
            zone: format!("zone {}", zone),
            pickup_count: 50,
            dropoff_count: 120,
            coverage_ratio: 2.4,
            ..Default::default()
        };
        self.finish(Endpoint::ZoneStats, plan, stats).await
    }

    async fn borough_stats(&self, scope: &BoroughScope, params: &QueryParams) -> Result<BoroughStats> {
        let plan = self.begin(Endpoint::BoroughStats, params, Some(scope.as_path_segment().to_string()));
        self.finish(Endpoint::BoroughStats, plan, borough_stats(scope)).await
    }

    async fn report(&self, params: &QueryParams) -> Result<Report> {
        let plan = self.begin(Endpoint::Report, params, None);
        let report = self.lock().report.clone();
        self.finish(Endpoint::Report, plan, report).await
    }
}

// ============================================================================
// Recording renderer
// ============================================================================

/// Owned copy of a rendered borough submenu
#[derive(Debug, Clone, PartialEq)]
pub enum SubmenuView {
    Loading,
    Empty,
    Zones(Vec<ZoneId>),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub styles: Vec<MapStyle>,
    pub fits: Vec<(Bounds, u32)>,
    pub charts: Vec<BarSeries>,
    pub chart_loading: bool,
    pub summaries: Vec<SummaryTiles>,
    pub no_data: bool,
    pub empty_state: bool,
    pub search_results: Vec<(String, Vec<ZoneId>)>,
    pub submenus: Vec<(String, SubmenuView)>,
    pub zone_panels: Vec<PanelState<ZoneTarget, ZoneStats>>,
    pub borough_panels: Vec<(PanelState<BoroughScope, BoroughStats>, bool)>,
    pub report_trigger: Option<bool>,
    pub reports: Vec<ReportView>,
    pub alerts: Vec<String>,
}

impl RecordingRenderer {
    pub fn last_summary(&self) -> Option<&SummaryTiles> {
        self.summaries.last()
    }

    pub fn last_zone_panel(&self) -> Option<&PanelState<ZoneTarget, ZoneStats>> {
        self.zone_panels.last()
    }
}

impl GeoRenderer for RecordingRenderer {
    fn apply_styles(&mut self, styles: &MapStyle) {
        self.styles.push(styles.clone());
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32) {
        self.fits.push((bounds, padding));
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render_bars(&mut self, series: &BarSeries) {
        self.charts.push(series.clone());
    }

    fn set_chart_loading(&mut self, loading: bool) {
        self.chart_loading = loading;
    }
}

impl DashboardSurface for RecordingRenderer {
    fn render_summary(&mut self, tiles: &SummaryTiles) {
        self.summaries.push(tiles.clone());
    }

    fn set_no_data(&mut self, visible: bool) {
        self.no_data = visible;
    }

    fn set_empty_state(&mut self, visible: bool) {
        self.empty_state = visible;
    }

    fn render_search_results(&mut self, query: &str, matches: &[&ZoneRecord]) {
        self.search_results
            .push((query.to_string(), matches.iter().map(|z| z.id).collect()));
    }

    fn render_submenu(&mut self, borough: &str, submenu: &SubmenuState<'_>) {
        let view = match submenu {
            SubmenuState::Loading => SubmenuView::Loading,
            SubmenuState::Empty => SubmenuView::Empty,
            SubmenuState::Zones(zones) => SubmenuView::Zones(zones.iter().map(|z| z.id).collect()),
        };
        self.submenus.push((borough.to_string(), view));
    }

    fn render_zone_panel(&mut self, panel: PanelState<&ZoneTarget, &ZoneStats>) {
        self.zone_panels.push(panel.cloned());
    }

    fn render_borough_panel(
        &mut self,
        panel: PanelState<&BoroughScope, &BoroughStats>,
        highlight: &HighlightState,
    ) {
        self.borough_panels.push((panel.cloned(), highlight.toggle_active));
    }

    fn set_report_trigger(&mut self, enabled: bool) {
        self.report_trigger = Some(enabled);
    }

    fn render_report(&mut self, report: &ReportView) {
        self.reports.push(report.clone());
    }

    fn notify_blocking(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

// ============================================================================
// Harness
// ============================================================================

pub type Dashboard = SyncCoordinator<ScriptedClient, RecordingRenderer>;

pub fn dashboard(client: &Arc<ScriptedClient>) -> Dashboard {
    SyncCoordinator::new(Arc::clone(client), RecordingRenderer::default(), DashboardConfig::default())
}

/// Dashboard with the catalog, gap set, summary and chart already landed
pub async fn booted(client: &Arc<ScriptedClient>) -> Dashboard {
    let mut dashboard = dashboard(client);
    dashboard.bootstrap();
    dashboard.settle().await;
    dashboard
}

pub fn at_most_one_panel_open(dashboard: &Dashboard) -> bool {
    dashboard.panels().zone_panel().is_closed() || dashboard.panels().borough_panel().is_closed()
}
