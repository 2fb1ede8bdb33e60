//! Report Generator - one-shot composite report
//!
//! A report is built from a single snapshot of the filter state and rendered
//! as one self-contained view. Only one request may be outstanding; there is
//! no caching, every invocation fetches again.

use crate::chart::{trend_series, BarSeries};
use crate::data_client::Report;
use crate::error::{DashboardError, Result};
use crate::filter_state::{FilterState, QueryParams};

/// Congestion impact (percent) below which the alert is critical
pub const CRITICAL_CONGESTION_BELOW: f64 = -15.0;

/// `HH:00–HH:00` label for the hour starting at `hour`; `None` outside 0-23
pub fn peak_period_label(hour: u8) -> Option<String> {
    if hour > 23 {
        return None;
    }
    Some(format!("{:02}:00–{:02}:00", hour, (hour + 1) % 24))
}

#[derive(Debug, Default)]
pub struct ReportGenerator {
    in_flight: bool,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Snapshot the filters for a new request; refused while one is outstanding
    pub fn begin(&mut self, filters: &FilterState) -> Result<QueryParams> {
        if self.in_flight {
            return Err(DashboardError::ReportInFlight);
        }
        self.in_flight = true;
        Ok(filters.query())
    }

    /// Resolve the outstanding request into a view, or the message for a
    /// blocking notification
    pub fn finish(&mut self, result: Result<Report>) -> std::result::Result<ReportView, String> {
        self.in_flight = false;
        match result {
            Ok(report) => Ok(ReportView::from_report(&report)),
            Err(e) => Err(format!("Failed to generate report: {}", e)),
        }
    }
}

// ============================================================================
// View
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

fn card(label: &'static str, value: impl Into<String>) -> MetricCard {
    MetricCard {
        label,
        value: value.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionSeverity {
    Critical,
    HeavyTraffic,
}

impl CongestionSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            CongestionSeverity::Critical => "CRITICAL CONGESTION",
            CongestionSeverity::HeavyTraffic => "HEAVY TRAFFIC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CongestionAlert {
    pub severity: CongestionSeverity,
    /// Percent by which the peak-hour speed trails the daily average
    pub impact_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapItem {
    pub zone: String,
    /// Borough, or the report scope when the service omitted it
    pub location: String,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseItem {
    pub title: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopZoneRow {
    pub zone: String,
    pub borough: String,
    pub trips: u64,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub metadata_line: String,
    pub cards: Vec<MetricCard>,
    pub top_zones_title: &'static str,
    pub top_zones: Vec<TopZoneRow>,
    pub peak_period: Option<String>,
    pub peak_trips: u64,
    pub peak_speed: f64,
    pub congestion_alert: Option<CongestionAlert>,
    pub gaps: Vec<GapItem>,
    pub noise: Vec<NoiseItem>,
    pub trend: BarSeries,
    /// Zero trips in scope; rendered as a banner, not an error
    pub no_data: bool,
}

impl ReportView {
    pub fn from_report(report: &Report) -> Self {
        let meta = &report.metadata;
        let summary = &report.summary;
        let borough_meta = meta.borough_metadata.as_ref();

        let mut metadata_line = format!(
            "Scope: {} | Period: {} | Generated: {}",
            meta.scope, meta.period, meta.generated_at
        );
        if let Some(count) = borough_meta.and_then(|b| b.zone_count).filter(|&c| c > 0) {
            metadata_line.push_str(&format!(" | Total Zones: {}", count));
        }

        let mut cards = vec![
            card("Total Trips", summary.total_trips.to_string()),
            card("Total Passengers", summary.total_passengers.to_string()),
            card("Revenue", format!("${}", summary.total_revenue)),
            card("Avg Speed", format!("{} MPH", summary.avg_speed)),
            card("Avg Distance", format!("{} MI", summary.avg_distance)),
            card("Detected Noise", summary.total_anomalies.to_string()),
            card("Health Score", format!("{}%", summary.system_health)),
        ];
        if meta.is_zone_report {
            if let Some(ref cmp) = meta.comparison {
                cards.push(card("Zone Speed", format!("{} MPH", cmp.zone_speed)));
                cards.push(card("Borough Speed", format!("{} MPH", cmp.borough_speed)));
                cards.push(card("Var vs Borough", format!("{}%", cmp.diff)));
            }
        }
        if let Some(b) = borough_meta {
            if let (Some(pu), Some(dropoff)) = (b.pickup_passengers, b.dropoff_passengers) {
                cards.push(card("Total Zones", b.zone_count.unwrap_or(0).to_string()));
                cards.push(card("PU Passengers", pu.to_string()));
                cards.push(card("DO Passengers", dropoff.to_string()));
            }
        }

        let rush = &report.rush_hour;
        let congestion_alert = match rush.congestion_impact {
            Some(impact) if meta.is_citywide => Some(CongestionAlert {
                severity: if impact < CRITICAL_CONGESTION_BELOW {
                    CongestionSeverity::Critical
                } else {
                    CongestionSeverity::HeavyTraffic
                },
                impact_pct: impact.abs(),
            }),
            _ => None,
        };

        let gaps = match borough_meta.and_then(|b| b.underserved_zones.as_ref()) {
            Some(list) => list
                .iter()
                .map(|g| GapItem {
                    zone: g.zone.clone(),
                    location: g.borough.clone().unwrap_or_else(|| meta.scope.clone()),
                    ratio: g.ratio,
                })
                .collect(),
            None => report
                .coverage_gaps
                .iter()
                .map(|g| GapItem {
                    zone: g.zone_name.clone(),
                    location: g.borough.clone().unwrap_or_else(|| meta.scope.clone()),
                    ratio: Some(g.ratio),
                })
                .collect(),
        };

        let mut noise = Vec::new();
        if let Some(details) = summary.anomaly_details {
            if details.speed > 0 {
                noise.push(NoiseItem {
                    title: format!("Speed Violations ({})", details.speed),
                    description: "Trips recorded above 80 MPH, a logging error or a severe speed violation.",
                });
            }
            if details.fare > 0 {
                noise.push(NoiseItem {
                    title: format!("Suspicious Fare/Distance ({})", details.fare),
                    description: "Trips under 1 mile with fares above $100, a meter fault or bad data entry.",
                });
            }
        }

        Self {
            metadata_line,
            cards,
            top_zones_title: if meta.is_zone_report {
                "Top Destination Zones"
            } else {
                "Top Zones by Trip Volume"
            },
            top_zones: report
                .top_zones
                .iter()
                .map(|z| TopZoneRow {
                    zone: z.zone.clone(),
                    borough: z.borough.clone(),
                    trips: z.trips,
                    speed: z.speed,
                })
                .collect(),
            peak_period: peak_period_label(rush.hour),
            peak_trips: rush.trips,
            peak_speed: rush.avg_speed,
            congestion_alert,
            gaps,
            noise,
            trend: trend_series(&rush.trend, rush.hour),
            no_data: summary.is_empty(),
        }
    }

    pub fn card(&self, label: &str) -> Option<&MetricCard> {
        self.cards.iter().find(|c| c.label == label)
    }
}
