//! Sync Coordinator - reactive core of the dashboard
//!
//! Owns the filter state, catalog, gap set, panel controller and report
//! generator, and translates each user action into the minimal set of
//! concurrent fetches plus client-side restyles.
//!
//! All application logic runs on the task that drives the coordinator. Fetches
//! run as spawned tasks in a `JoinSet` and come back as [`Completion`]s, each
//! stamped with a [`Ticket`]; only the latest ticket per fetch kind lands.
//! Bundle members complete independently, so one failure never holds back or
//! aborts its siblings.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use smallvec::SmallVec;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};

use crate::catalog::{SubmenuState, ZoneCatalog};
use crate::chart::{ChartData, ChartTab};
use crate::config::DashboardConfig;
use crate::data_client::{BoroughStats, DataClient, Endpoint, Report, TripSummary, ZoneStats};
use crate::debounce::Debouncer;
use crate::error::{DashboardError, Result};
use crate::filter_state::FilterState;
use crate::highlight::{HighlightEngine, HighlightInputs, MapStyle};
use crate::model::{BoroughScope, DateRange, GapRecord, GapSet, QuickFilter, ZoneId, ZoneRecord};
use crate::panels::{HighlightChange, PanelController, ZoneTarget};
use crate::render::{Renderer, SummaryTiles};
use crate::report::ReportGenerator;
use crate::sequence::{FetchKind, RequestSequencer, Ticket};

/// Viewport padding around a single zone
pub const ZONE_FIT_PADDING: u32 = 50;
/// Viewport padding around a borough or the whole city
pub const SCOPE_FIT_PADDING: u32 = 20;

// ============================================================================
// Events and outcomes
// ============================================================================

/// Where a zone selection came from; every source shares one code path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    MapClick,
    SearchResult,
    Submenu,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    DateRangeChanged {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    BoroughSelected(BoroughScope),
    ZoneSelected {
        zone: ZoneId,
        source: SelectionSource,
    },
    SearchInput(String),
    /// Borough submenu expanded; lists that borough's zones
    SubmenuOpened(String),
    QuickFilterChanged(QuickFilter),
    ChartTabChanged(ChartTab),
    UnderservedToggled,
    ZonePanelClosed,
    BoroughPanelClosed,
    InsightsRequested,
    ReportRequested,
}

/// What a handler set in motion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionOutcome {
    /// Fetch kinds dispatched, in issue order
    pub fetches: SmallVec<[FetchKind; 4]>,
    /// Map styles were recomputed and pushed to the renderer
    pub restyled: bool,
    /// A debounced refresh is pending until this instant
    pub debounced_until: Option<Instant>,
}

impl ActionOutcome {
    pub fn dispatched(&self, kind: FetchKind) -> bool {
        self.fetches.contains(&kind)
    }
}

/// Result of a spawned fetch, tagged with the ticket it was issued under
#[derive(Debug)]
pub enum Completion {
    Catalog(Ticket, Result<Vec<ZoneRecord>>),
    Summary(Ticket, Result<TripSummary>),
    Chart(Ticket, Result<ChartData>),
    Gaps(Ticket, Result<Vec<GapRecord>>),
    ZoneDetail(Ticket, ZoneId, Result<ZoneStats>),
    BoroughDetail(Ticket, BoroughScope, Result<BoroughStats>),
    Report(Ticket, Result<Report>),
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::Catalog(t, _)
            | Completion::Summary(t, _)
            | Completion::Chart(t, _)
            | Completion::Gaps(t, _)
            | Completion::ZoneDetail(t, _, _)
            | Completion::BoroughDetail(t, _, _)
            | Completion::Report(t, _) => *t,
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

pub struct SyncCoordinator<C: DataClient, R: Renderer> {
    client: Arc<C>,
    renderer: R,
    config: DashboardConfig,
    filters: FilterState,
    catalog: ZoneCatalog,
    gaps: GapSet,
    panels: PanelController,
    reports: ReportGenerator,
    sequencer: RequestSequencer,
    date_debounce: Debouncer<DateRange>,
    chart_tab: ChartTab,
    map_style: MapStyle,
    in_flight: JoinSet<Completion>,
}

impl<C: DataClient, R: Renderer> SyncCoordinator<C, R> {
    pub fn new(client: Arc<C>, renderer: R, config: DashboardConfig) -> Self {
        let date_debounce = Debouncer::new(config.debounce);
        Self {
            client,
            renderer,
            config,
            filters: FilterState::new(),
            catalog: ZoneCatalog::default(),
            gaps: GapSet::default(),
            panels: PanelController::new(),
            reports: ReportGenerator::new(),
            sequencer: RequestSequencer::new(),
            date_debounce,
            chart_tab: ChartTab::default(),
            map_style: MapStyle::default(),
            in_flight: JoinSet::new(),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    pub fn gaps(&self) -> &GapSet {
        &self.gaps
    }

    pub fn panels(&self) -> &PanelController {
        &self.panels
    }

    pub fn map_style(&self) -> &MapStyle {
        &self.map_style
    }

    pub fn chart_tab(&self) -> ChartTab {
        self.chart_tab
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn report_in_flight(&self) -> bool {
        self.reports.is_in_flight()
    }

    /// Fetch tasks not yet collected
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    pub fn debounce_pending(&self) -> bool {
        self.date_debounce.is_pending()
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    /// Bootstrap, then service events, debounce deadlines and fetch
    /// completions until the channel closes and everything has landed
    pub async fn run(&mut self, mut events: mpsc::Receiver<DashboardEvent>) {
        self.bootstrap();
        let mut events_open = true;

        loop {
            let deadline = self.date_debounce.deadline();
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        tracing::info!("event channel closed, draining outstanding fetches");
                        events_open = false;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_due_debounce();
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.collect(joined);
                }
                else => break,
            }
        }
    }

    /// Drive the pending debounce and every outstanding fetch to completion
    pub async fn settle(&mut self) {
        loop {
            let deadline = self.date_debounce.deadline();
            tokio::select! {
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_due_debounce();
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.collect(joined);
                }
                else => break,
            }
        }
    }

    /// Route one event to its handler; refusals are logged, not propagated
    pub fn dispatch(&mut self, event: DashboardEvent) {
        tracing::debug!(?event, "dashboard event");
        let refused = match event {
            DashboardEvent::DateRangeChanged { start, end } => {
                self.on_date_range_changed(start, end);
                None
            }
            DashboardEvent::BoroughSelected(scope) => {
                self.on_borough_selected(scope);
                None
            }
            DashboardEvent::ZoneSelected { zone, source } => self.on_zone_selected(zone, source).err(),
            DashboardEvent::SearchInput(text) => {
                self.on_search_input(&text);
                None
            }
            DashboardEvent::SubmenuOpened(borough) => {
                self.on_submenu_opened(&borough);
                None
            }
            DashboardEvent::QuickFilterChanged(filter) => {
                self.on_quick_filter_changed(filter);
                None
            }
            DashboardEvent::ChartTabChanged(tab) => {
                self.on_chart_tab_changed(tab);
                None
            }
            DashboardEvent::UnderservedToggled => self.on_underserved_toggle().err(),
            DashboardEvent::ZonePanelClosed => {
                self.on_zone_panel_closed();
                None
            }
            DashboardEvent::BoroughPanelClosed => {
                self.on_borough_panel_closed();
                None
            }
            DashboardEvent::InsightsRequested => {
                self.on_insights_requested();
                None
            }
            DashboardEvent::ReportRequested => self.on_report_requested().err(),
        };
        if let Some(e) = refused {
            tracing::warn!(error = %e, "action refused");
        }
    }

    // ========================================================================
    // Action handlers
    // ========================================================================

    /// Load the catalog and the unfiltered summary and chart
    pub fn bootstrap(&mut self) -> ActionOutcome {
        tracing::info!(api = %self.config.api_base, "bootstrapping dashboard");
        let mut outcome = ActionOutcome::default();
        outcome.fetches.push(self.fetch_catalog());
        outcome.fetches.push(self.fetch_summary());
        outcome.fetches.push(self.fetch_chart());
        self.renderer.set_report_trigger(true);
        outcome
    }

    /// Apply the new bounds now; the bundle refresh waits for the quiet period
    pub fn on_date_range_changed(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> ActionOutcome {
        self.filters.set_date_range(start, end);
        let range = self.filters.date_range();
        if range.is_inverted() {
            tracing::debug!(?range, "start date after end date");
        }
        let fires_at = self.date_debounce.schedule(range, Instant::now());
        ActionOutcome {
            debounced_until: Some(fires_at),
            ..Default::default()
        }
    }

    pub fn on_borough_selected(&mut self, scope: BoroughScope) -> ActionOutcome {
        tracing::info!(scope = %scope, "borough selected");
        // The bundle below already carries the latest dates
        if self.date_debounce.cancel().is_some() {
            tracing::debug!("pending date refresh folded into borough refresh");
        }
        self.filters.set_borough(scope.clone());
        self.restyle();

        if let Some(bounds) = self.catalog.scope_bounds(&scope) {
            self.renderer.fit_bounds(bounds, SCOPE_FIT_PADDING);
        }

        let mut outcome = self.refresh_bundle();
        outcome.restyled = true;
        outcome.fetches.push(self.open_borough_panel(scope));
        outcome
    }

    /// Map click, search result and submenu pick all land here
    pub fn on_zone_selected(&mut self, zone: ZoneId, source: SelectionSource) -> Result<ActionOutcome> {
        let record = self
            .catalog
            .get(zone)
            .cloned()
            .ok_or(DashboardError::UnknownZone(zone))?;
        tracing::info!(zone = %zone, name = %record.zone_name, ?source, "zone selected");

        self.filters.set_zone(zone);
        self.restyle();

        let mut outcome = ActionOutcome {
            restyled: true,
            ..Default::default()
        };
        outcome.fetches.push(self.fetch_summary());
        outcome.fetches.push(self.fetch_chart());

        if let Some(bounds) = record.geometry.as_ref().and_then(|g| g.bounds()) {
            self.renderer.fit_bounds(bounds, ZONE_FIT_PADDING);
        }
        outcome.fetches.push(self.open_zone_panel(&record));
        Ok(outcome)
    }

    /// Client-side only: restyle already-loaded geometry
    pub fn on_quick_filter_changed(&mut self, filter: QuickFilter) -> ActionOutcome {
        self.filters.set_quick_filter(filter);
        self.restyle();
        ActionOutcome {
            restyled: true,
            ..Default::default()
        }
    }

    /// Zone ids matching `text`, at most `search_limit` of them
    pub fn on_search_input(&mut self, text: &str) -> Vec<ZoneId> {
        self.filters.set_search_query(text);
        let matches = self.catalog.search(text, self.config.search_limit);
        self.renderer.render_search_results(text, &matches);
        matches.iter().map(|z| z.id).collect()
    }

    /// Zones listed under `borough`; empty while the catalog is still loading
    pub fn on_submenu_opened(&mut self, borough: &str) -> Vec<ZoneId> {
        let submenu = self.catalog.zones_in(borough);
        self.renderer.render_submenu(borough, &submenu);
        match submenu {
            SubmenuState::Zones(zones) => zones.iter().map(|z| z.id).collect(),
            SubmenuState::Loading | SubmenuState::Empty => Vec::new(),
        }
    }

    pub fn on_chart_tab_changed(&mut self, tab: ChartTab) -> ActionOutcome {
        self.chart_tab = tab;
        let mut outcome = ActionOutcome::default();
        outcome.fetches.push(self.fetch_chart());
        outcome
    }

    /// Flip the borough panel's underserved highlight; restyle only
    pub fn on_underserved_toggle(&mut self) -> Result<HighlightChange> {
        let change = self.panels.toggle_underserved_highlight()?;
        tracing::info!(?change, "underserved highlight toggled");
        self.restyle();
        self.render_borough_panel();
        Ok(change)
    }

    pub fn on_zone_panel_closed(&mut self) -> bool {
        let closed = self.panels.close_zone_panel();
        if closed {
            self.sequencer.supersede(FetchKind::ZoneDetail);
            self.render_zone_panel();
        }
        closed
    }

    pub fn on_borough_panel_closed(&mut self) -> bool {
        let closed = self.panels.close_borough_panel();
        if closed {
            self.sequencer.supersede(FetchKind::BoroughDetail);
            self.render_borough_panel();
        }
        closed
    }

    /// Reopen details for the active zone, or for the current borough scope
    pub fn on_insights_requested(&mut self) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        let active = self
            .filters
            .active_zone()
            .and_then(|zone| self.catalog.get(zone))
            .cloned();
        match active {
            Some(record) => outcome.fetches.push(self.open_zone_panel(&record)),
            None => {
                let scope = self.filters.borough().clone();
                outcome.fetches.push(self.open_borough_panel(scope));
            }
        }
        outcome
    }

    /// Start a report for the current filters; refused while one is outstanding
    pub fn on_report_requested(&mut self) -> Result<ActionOutcome> {
        let params = self.reports.begin(&self.filters)?;
        self.renderer.set_report_trigger(false);

        let ticket = self.sequencer.issue(FetchKind::Report);
        let client = Arc::clone(&self.client);
        self.spawn(async move { Completion::Report(ticket, client.report(&params).await) });

        let mut outcome = ActionOutcome::default();
        outcome.fetches.push(FetchKind::Report);
        Ok(outcome)
    }

    // ========================================================================
    // Panels
    // ========================================================================

    fn open_zone_panel(&mut self, record: &ZoneRecord) -> FetchKind {
        self.panels.open_zone_panel(ZoneTarget::from_record(record, &self.gaps));
        self.sequencer.supersede(FetchKind::BoroughDetail);
        self.render_borough_panel();
        self.render_zone_panel();

        let ticket = self.sequencer.issue(FetchKind::ZoneDetail);
        let client = Arc::clone(&self.client);
        let params = self.filters.date_query();
        let zone = record.id;
        self.spawn(async move {
            Completion::ZoneDetail(ticket, zone, client.zone_stats(zone, &params).await)
        });
        FetchKind::ZoneDetail
    }

    fn open_borough_panel(&mut self, scope: BoroughScope) -> FetchKind {
        self.panels.open_borough_panel(scope.clone());
        self.sequencer.supersede(FetchKind::ZoneDetail);
        self.render_zone_panel();
        self.render_borough_panel();

        let ticket = self.sequencer.issue(FetchKind::BoroughDetail);
        let client = Arc::clone(&self.client);
        let params = self.filters.date_query();
        self.spawn(async move {
            let result = client.borough_stats(&scope, &params).await;
            Completion::BoroughDetail(ticket, scope, result)
        });
        FetchKind::BoroughDetail
    }

    fn render_zone_panel(&mut self) {
        self.renderer.render_zone_panel(self.panels.zone_panel());
    }

    fn render_borough_panel(&mut self) {
        self.renderer
            .render_borough_panel(self.panels.borough_panel(), self.panels.highlight());
    }

    // ========================================================================
    // Fetch dispatch
    // ========================================================================

    fn spawn<F>(&mut self, fetch: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight.spawn(fetch);
    }

    /// Summary, chart and gaps for the current scope
    fn refresh_bundle(&mut self) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        outcome.fetches.push(self.fetch_summary());
        outcome.fetches.push(self.fetch_chart());
        outcome.fetches.push(self.fetch_gaps());
        outcome
    }

    fn fire_due_debounce(&mut self) {
        if let Some(range) = self.date_debounce.take_due(Instant::now()) {
            tracing::debug!(?range, "date range settled, refreshing");
            self.refresh_bundle();
        }
    }

    fn fetch_catalog(&mut self) -> FetchKind {
        let ticket = self.sequencer.issue(FetchKind::Catalog);
        let client = Arc::clone(&self.client);
        self.spawn(async move { Completion::Catalog(ticket, client.zones().await) });
        FetchKind::Catalog
    }

    fn fetch_summary(&mut self) -> FetchKind {
        let ticket = self.sequencer.issue(FetchKind::Summary);
        let client = Arc::clone(&self.client);
        let params = self.filters.query();
        self.spawn(async move { Completion::Summary(ticket, client.trip_summary(&params).await) });
        FetchKind::Summary
    }

    fn fetch_chart(&mut self) -> FetchKind {
        let ticket = self.sequencer.issue(FetchKind::Chart);
        let client = Arc::clone(&self.client);
        let params = self.filters.query();
        let tab = self.chart_tab;
        self.renderer.set_chart_loading(true);
        self.spawn(async move {
            let result = match tab {
                ChartTab::RushHour => client.hourly(&params).await.map(ChartData::Hourly),
                ChartTab::Congestion => client.congestion(&params).await.map(ChartData::Congestion),
            };
            Completion::Chart(ticket, result)
        });
        FetchKind::Chart
    }

    fn fetch_gaps(&mut self) -> FetchKind {
        let ticket = self.sequencer.issue(FetchKind::Gaps);
        let client = Arc::clone(&self.client);
        let params = self.filters.query();
        self.spawn(async move { Completion::Gaps(ticket, client.coverage_gaps(&params).await) });
        FetchKind::Gaps
    }

    // ========================================================================
    // Completion handling
    // ========================================================================

    fn collect(&mut self, joined: std::result::Result<Completion, JoinError>) {
        match joined {
            Ok(completion) => self.apply(completion),
            Err(e) => tracing::error!(error = %e, "fetch task did not complete"),
        }
    }

    /// Land one completion if its ticket is still the latest for its kind
    pub fn apply(&mut self, completion: Completion) {
        let ticket = completion.ticket();
        if !self.sequencer.is_latest(ticket) {
            tracing::debug!(kind = ?ticket.kind, seq = ticket.seq, "discarding superseded response");
            return;
        }

        match completion {
            Completion::Catalog(_, Ok(zones)) => {
                tracing::info!(zones = zones.len(), "zone catalog loaded");
                self.catalog = ZoneCatalog::from_records(zones);
                self.restyle();
                if let Some(bounds) = self.catalog.scope_bounds(&BoroughScope::All) {
                    self.renderer.fit_bounds(bounds, SCOPE_FIT_PADDING);
                }
                self.fetch_gaps();
            }
            Completion::Catalog(_, Err(e)) => {
                tracing::error!(error = %e, "zone catalog unavailable, map stays empty");
            }
            Completion::Summary(_, Ok(summary)) => {
                self.renderer.render_summary(&SummaryTiles::from_summary(&summary));
                self.renderer.set_no_data(summary.is_empty());
            }
            Completion::Summary(_, Err(e)) => log_kept(&e, Endpoint::TripSummary),
            Completion::Chart(_, result) => {
                self.renderer.set_chart_loading(false);
                match result {
                    Ok(data) => self.renderer.render_bars(&data.to_series()),
                    Err(e) => log_kept(&e, Endpoint::HourlyHistogram),
                }
            }
            Completion::Gaps(_, Ok(records)) => {
                self.gaps = GapSet::from_records(records);
                tracing::debug!(gaps = self.gaps.len(), "gap set refreshed");
                self.restyle();
            }
            Completion::Gaps(_, Err(e)) => log_kept(&e, Endpoint::CoverageGaps),
            Completion::ZoneDetail(_, zone, result) => {
                if let Err(ref e) = result {
                    tracing::warn!(zone = %zone, error = %e, "zone stats failed");
                }
                if self.panels.resolve_zone(zone, result) {
                    self.render_zone_panel();
                }
            }
            Completion::BoroughDetail(_, scope, result) => {
                if let Err(ref e) = result {
                    tracing::warn!(scope = %scope, error = %e, "borough stats failed");
                }
                if self.panels.resolve_borough(&scope, result) {
                    self.render_borough_panel();
                }
            }
            Completion::Report(_, result) => self.finish_report(result),
        }
    }

    fn finish_report(&mut self, result: Result<Report>) {
        match self.reports.finish(result) {
            Ok(view) => self.renderer.render_report(&view),
            Err(message) => {
                tracing::warn!(%message, "report failed");
                self.renderer.notify_blocking(&message);
            }
        }
        self.renderer.set_report_trigger(true);
    }

    /// Recompute every feature style from current inputs
    fn restyle(&mut self) {
        let style = HighlightEngine::compute(&HighlightInputs {
            catalog: &self.catalog,
            gaps: &self.gaps,
            scope: self.filters.borough(),
            highlight: self.panels.highlight(),
            quick_filter: self.filters.quick_filter(),
        });
        self.renderer.apply_styles(&style);

        let empty = self.catalog.is_loaded()
            && self.filters.quick_filter() != QuickFilter::All
            && style.is_empty_selection();
        self.renderer.set_empty_state(empty);
        self.map_style = style;
    }
}

/// Failure of a tile/chart/gap fetch: the region keeps its prior content
fn log_kept(error: &DashboardError, fallback: Endpoint) {
    let endpoint = error.endpoint().unwrap_or(fallback);
    tracing::warn!(%endpoint, error = %error, "fetch failed, keeping previous view");
}
