//! Mobility Dashboard Synchronization Engine
//!
//! Filter/view synchronization for the urban-mobility dashboard: one filter
//! state, five dependent panels, and an aggregate service that computes every
//! number. The engine decides which panels refresh on each change, issues the
//! fetches concurrently, and lands only the responses that still match the
//! current state.
//!
//! Layout:
//! - `filter_state`, `model`, `catalog`: state and shared read-only data
//! - `highlight`, `panels`, `chart`, `report`: pure view computation
//! - `coordinator`: action handlers, debounce, sequencing and the event loop
//! - `data_client` / `http_client`: the aggregate service boundary
//! - `render`: capability traits the coordinator draws through

pub mod catalog;
pub mod chart;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod data_client;
pub mod debounce;
pub mod error;
pub mod filter_state;
pub mod highlight;
pub mod model;
pub mod panels;
pub mod render;
pub mod report;
pub mod sequence;

#[cfg(feature = "http")]
pub mod http_client;

// Re-export commonly used types
pub use catalog::{SubmenuState, ZoneCatalog};
pub use chart::{BarSeries, ChartTab};
pub use config::DashboardConfig;
pub use coordinator::{ActionOutcome, DashboardEvent, SelectionSource, SyncCoordinator};
pub use data_client::{DataClient, Endpoint};
pub use error::{DashboardError, Result};
pub use filter_state::{FilterState, QueryParams};
pub use highlight::{HighlightEngine, HighlightState, MapStyle, StyleTier};
pub use model::{BoroughScope, DateRange, GapRecord, GapSet, QuickFilter, ZoneId, ZoneRecord};
pub use panels::{PanelController, PanelState};
pub use render::{ChartRenderer, DashboardSurface, GeoRenderer, Renderer, TracingRenderer};
pub use report::{ReportGenerator, ReportView};

#[cfg(feature = "http")]
pub use http_client::HttpDataClient;
