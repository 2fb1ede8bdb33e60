//! Data Client - gateway to the aggregate endpoints
//!
//! The service computes every aggregate; this side only builds parameters and
//! decodes the response contracts below. Shapes follow the service's
//! camelCase field names, and missing numeric fields decode as zero.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter_state::QueryParams;
use crate::model::{BoroughScope, GapRecord, ZoneId, ZoneRecord};

/// Endpoints consumed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ZoneCatalog,
    TripSummary,
    HourlyHistogram,
    CongestionSeries,
    CoverageGaps,
    ZoneStats,
    BoroughStats,
    Report,
}

impl Endpoint {
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::ZoneCatalog => "zone catalog",
            Endpoint::TripSummary => "trip summary",
            Endpoint::HourlyHistogram => "hourly histogram",
            Endpoint::CongestionSeries => "congestion series",
            Endpoint::CoverageGaps => "coverage gaps",
            Endpoint::ZoneStats => "zone stats",
            Endpoint::BoroughStats => "borough stats",
            Endpoint::Report => "report",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only access to the aggregate service
///
/// Implementations must be shareable across the tasks that hold outstanding
/// requests, so every returned future is `Send`.
pub trait DataClient: Send + Sync + 'static {
    fn zones(&self) -> impl Future<Output = Result<Vec<ZoneRecord>>> + Send;

    fn trip_summary(&self, params: &QueryParams) -> impl Future<Output = Result<TripSummary>> + Send;

    fn hourly(&self, params: &QueryParams) -> impl Future<Output = Result<HourlySeries>> + Send;

    fn congestion(&self, params: &QueryParams)
        -> impl Future<Output = Result<CongestionSeries>> + Send;

    fn coverage_gaps(&self, params: &QueryParams)
        -> impl Future<Output = Result<Vec<GapRecord>>> + Send;

    fn zone_stats(
        &self,
        zone: ZoneId,
        params: &QueryParams,
    ) -> impl Future<Output = Result<ZoneStats>> + Send;

    fn borough_stats(
        &self,
        scope: &BoroughScope,
        params: &QueryParams,
    ) -> impl Future<Output = Result<BoroughStats>> + Send;

    fn report(&self, params: &QueryParams) -> impl Future<Output = Result<Report>> + Send;
}

// ============================================================================
// Summary tiles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyDetails {
    pub speed: u64,
    pub fare: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripSummary {
    pub total_trips: u64,
    pub total_passengers: u64,
    /// Share of trips that are not anomalies, in percent
    pub system_health: f64,
    pub avg_mobility_speed: f64,
    pub total_anomalies: u64,
    pub anomaly_details: Option<AnomalyDetails>,
    pub avg_fare: f64,
    pub total_revenue: f64,
    pub avg_distance: f64,
    pub avg_speed: f64,
}

impl TripSummary {
    /// Successful response with zero matching trips
    pub fn is_empty(&self) -> bool {
        self.total_trips == 0
    }
}

// ============================================================================
// Time series
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourBucket {
    pub trips: u64,
    pub speed: f64,
}

/// Hour of day (0-23) -> trips and average speed
pub type HourlySeries = BTreeMap<u8, HourBucket>;

/// Borough -> congestion index (lower is better)
pub type CongestionSeries = BTreeMap<String, f64>;

// ============================================================================
// Detail panels
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneStats {
    pub zone: String,
    pub borough: String,
    pub pickup_count: u64,
    pub dropoff_count: u64,
    /// Drop-offs per pick-up
    pub coverage_ratio: f64,
    pub pickup_passengers: u64,
    pub dropoff_passengers: u64,
    pub total_passengers: u64,
    pub avg_distance: f64,
    /// Minutes
    pub avg_duration: f64,
    pub avg_speed: f64,
    pub avg_fare: f64,
    pub borough_avg_speed: f64,
    /// Percent difference against the borough average speed
    pub speed_comparison: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTrips {
    pub zone: String,
    pub trips: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderservedZone {
    pub zone: String,
    pub id: ZoneId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoroughStats {
    pub borough: String,
    pub zone_count: u64,
    pub total_trips: u64,
    pub avg_speed: f64,
    pub avg_distance: f64,
    pub pickup_passengers: u64,
    pub dropoff_passengers: u64,
    pub total_passengers: u64,
    pub top_zones: Vec<ZoneTrips>,
    pub underserved_count: u64,
    pub underserved_zones: Vec<UnderservedZone>,
}

impl BoroughStats {
    pub fn underserved_ids(&self) -> Vec<ZoneId> {
        self.underserved_zones.iter().map(|z| z.id).collect()
    }
}

// ============================================================================
// Composite report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeedComparison {
    pub zone_speed: f64,
    pub borough_speed: f64,
    pub diff: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportGap {
    pub zone: String,
    pub borough: Option<String>,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoroughMetadata {
    pub zone_count: Option<u64>,
    pub pickup_passengers: Option<u64>,
    pub dropoff_passengers: Option<u64>,
    pub underserved_zones: Option<Vec<ReportGap>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportMetadata {
    pub scope: String,
    pub period: String,
    pub generated_at: String,
    pub is_zone_report: bool,
    pub is_citywide: bool,
    pub comparison: Option<SpeedComparison>,
    pub borough_metadata: Option<BoroughMetadata>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportZone {
    pub zone: String,
    pub borough: String,
    pub trips: u64,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RushHour {
    /// Peak hour of day, 0-23
    pub hour: u8,
    pub trips: u64,
    pub avg_speed: f64,
    /// Peak speed vs daily average, percent; absent outside citywide reports
    pub congestion_impact: Option<f64>,
    pub trend: HourlySeries,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: TripSummary,
    pub top_zones: Vec<ReportZone>,
    pub rush_hour: RushHour,
    pub coverage_gaps: Vec<GapRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_contract_with_missing_fields() {
        let summary: TripSummary = serde_json::from_value(json!({
            "totalTrips": 1200,
            "systemHealth": 97.5,
            "avgMobilitySpeed": 11.2,
            "totalAnomalies": 30,
            "anomalyDetails": {"speed": 20, "fare": 10}
        }))
        .unwrap();
        assert_eq!(summary.total_trips, 1200);
        assert_eq!(summary.total_passengers, 0);
        assert_eq!(summary.anomaly_details, Some(AnomalyDetails { speed: 20, fare: 10 }));
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_hourly_keys_decode_from_strings() {
        let series: HourlySeries = serde_json::from_value(json!({
            "0": {"trips": 5, "speed": 12.5},
            "17": {"trips": 90, "speed": 4.2}
        }))
        .unwrap();
        assert_eq!(series[&17].trips, 90);
        assert_eq!(series.keys().copied().collect::<Vec<_>>(), vec![0, 17]);
    }

    #[test]
    fn test_borough_stats_underserved_ids() {
        let stats: BoroughStats = serde_json::from_value(json!({
            "borough": "Brooklyn",
            "zoneCount": 61,
            "underservedCount": 2,
            "underservedZones": [{"zone": "Canarsie", "id": 39}, {"zone": "Red Hook", "id": 195}],
            "topZones": [{"zone": "Park Slope", "trips": 400}]
        }))
        .unwrap();
        assert_eq!(stats.underserved_ids(), vec![ZoneId(39), ZoneId(195)]);
        assert_eq!(stats.top_zones[0].trips, 400);
    }

    #[test]
    fn test_report_contract() {
        let report: Report = serde_json::from_value(json!({
            "metadata": {"scope": "Citywide", "period": "All time", "generatedAt": "2024-01-08 10:00",
                         "isZoneReport": false, "isCitywide": true},
            "summary": {"totalTrips": 10},
            "topZones": [],
            "rushHour": {"hour": 23, "trips": 4, "avgSpeed": 9.0, "congestionImpact": -20.5,
                         "trend": {"23": {"trips": 4}}},
            "coverageGaps": [{"zone": "Astoria", "borough": "Queens", "ratio": 2.5}]
        }))
        .unwrap();
        assert!(report.metadata.is_citywide);
        assert_eq!(report.rush_hour.congestion_impact, Some(-20.5));
        assert_eq!(report.coverage_gaps[0].zone_name, "Astoria");
    }
}
