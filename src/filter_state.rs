//! Filter state and query precedence
//!
//! One state bag owned by the coordinator. Every outgoing query is built
//! through [`FilterState::query`], so map clicks, search results and submenu
//! picks all resolve scope the same way: an active zone wins over the borough
//! selector, and the borough is only sent when it is not "all".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{BoroughScope, DateRange, QuickFilter, ZoneId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    date_range: DateRange,
    borough: BoroughScope,
    active_zone: Option<ZoneId>,
    search_query: String,
    quick_filter: QuickFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// Borough selector; governs visible map scope even while a zone is active
    pub fn borough(&self) -> &BoroughScope {
        &self.borough
    }

    pub fn active_zone(&self) -> Option<ZoneId> {
        self.active_zone
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn quick_filter(&self) -> QuickFilter {
        self.quick_filter
    }

    /// Focus a zone: resets the borough selector to "all" and clears search
    pub fn set_zone(&mut self, zone: ZoneId) {
        self.active_zone = Some(zone);
        self.borough = BoroughScope::All;
        self.search_query.clear();
    }

    /// Choose a borough explicitly; drops any zone focus
    pub fn set_borough(&mut self, borough: BoroughScope) {
        self.borough = borough;
        self.active_zone = None;
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.date_range = DateRange::new(start, end);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_quick_filter(&mut self, filter: QuickFilter) {
        self.quick_filter = filter;
    }

    /// Parameters for summary, chart, gap and report queries
    pub fn query(&self) -> QueryParams {
        let (borough, zone_id) = match self.active_zone {
            Some(zone) => (None, Some(zone)),
            None => (self.borough.name().map(str::to_string), None),
        };
        QueryParams {
            start_date: self.date_range.start,
            end_date: self.date_range.end,
            borough,
            zone_id,
        }
    }

    /// Parameters for per-zone and per-borough detail endpoints (dates only)
    pub fn date_query(&self) -> QueryParams {
        QueryParams {
            start_date: self.date_range.start,
            end_date: self.date_range.end,
            ..Default::default()
        }
    }
}

/// Recognised query parameters of the aggregate service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borough: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ZoneId>,
}

impl QueryParams {
    /// Flattened `(name, value)` pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(ref borough) = self.borough {
            pairs.push(("borough", borough.clone()));
        }
        if let Some(zone) = self.zone_id {
            pairs.push(("zone_id", zone.to_string()));
        }
        pairs
    }
}
