//! Bar series construction for the time-series panel and the report trend

use crate::data_client::{CongestionSeries, HourBucket, HourlySeries};

/// Average speed (mph) under which a busy hour counts as congested
pub const CONGESTED_SPEED_MPH: f64 = 5.0;

/// Which series the time-series panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    RushHour,
    Congestion,
}

impl ChartTab {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rush-hour" | "rush_hour" | "hourly" => Some(ChartTab::RushHour),
            "congestion" | "revenue" => Some(ChartTab::Congestion),
            _ => None,
        }
    }
}

/// Raw response for whichever tab was requested
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Hourly(HourlySeries),
    Congestion(CongestionSeries),
}

impl ChartData {
    pub fn to_series(&self) -> BarSeries {
        match self {
            ChartData::Hourly(series) => rush_hour_series(series),
            ChartData::Congestion(series) => congestion_series(series),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Drawn in the accent color (peak hour)
    pub emphasized: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: &'static str,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn peak(&self) -> Option<&Bar> {
        self.bars.iter().find(|b| b.emphasized)
    }
}

/// All 24 hours, missing ones filled with zero
fn normalized_hours(series: &HourlySeries) -> impl Iterator<Item = (u8, HourBucket)> + '_ {
    (0u8..24).map(move |h| (h, series.get(&h).copied().unwrap_or_default()))
}

/// Trip volume per hour with the busiest hour emphasized
pub fn rush_hour_series(series: &HourlySeries) -> BarSeries {
    let max_trips = series.values().map(|b| b.trips).max().unwrap_or(0);
    let mut peak_marked = false;

    let bars = normalized_hours(series)
        .map(|(hour, bucket)| {
            let emphasized = !peak_marked && max_trips > 0 && bucket.trips == max_trips;
            peak_marked |= emphasized;
            let congested = bucket.trips > 0 && bucket.speed < CONGESTED_SPEED_MPH;
            Bar {
                label: format!("{}:00", hour),
                value: bucket.trips as f64,
                emphasized,
                note: Some(format!(
                    "Avg Speed: {} MPH{}",
                    bucket.speed,
                    if congested { " (Congested)" } else { "" }
                )),
            }
        })
        .collect();

    BarSeries {
        title: "Trip Volume",
        bars,
    }
}

pub fn congestion_series(series: &CongestionSeries) -> BarSeries {
    BarSeries {
        title: "Congestion Index (Lower is Better)",
        bars: series
            .iter()
            .map(|(borough, index)| Bar {
                label: borough.clone(),
                value: *index,
                emphasized: false,
                note: None,
            })
            .collect(),
    }
}

/// Report trend: hours present in the response, the reported peak emphasized
pub fn trend_series(trend: &HourlySeries, peak_hour: u8) -> BarSeries {
    BarSeries {
        title: "Hourly Throughput",
        bars: trend
            .iter()
            .map(|(hour, bucket)| Bar {
                label: format!("{}:00", hour),
                value: bucket.trips as f64,
                emphasized: *hour == peak_hour,
                note: None,
            })
            .collect(),
    }
}
