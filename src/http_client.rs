//! reqwest-backed [`DataClient`]
//!
//! Every endpoint is a GET under the configured base path. Query parameters
//! come from [`QueryParams::to_pairs`], so absent filters are simply omitted.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::DashboardConfig;
use crate::data_client::{
    BoroughStats, CongestionSeries, DataClient, Endpoint, HourlySeries, Report, TripSummary, ZoneStats,
};
use crate::error::{DashboardError, Result};
use crate::filter_state::QueryParams;
use crate::model::{BoroughScope, GapRecord, ZoneId, ZoneRecord};

#[derive(Debug, Clone)]
pub struct HttpDataClient {
    client: Client,
    base_url: String,
}

impl HttpDataClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, endpoint: Endpoint, path: &str, params: &QueryParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = join_url(&self.base_url, path);
        tracing::debug!(%endpoint, %url, params = ?params.to_pairs(), "GET");
        let response = self
            .client
            .get(&url)
            .query(&params.to_pairs())
            .send()
            .await
            .map_err(|e| DashboardError::network(endpoint, None, e.to_string()))?;
        parse_response(endpoint, response).await
    }
}

async fn parse_response<T>(endpoint: Endpoint, response: reqwest::Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(|e| DashboardError::Decode {
            endpoint,
            message: e.to_string(),
        })
    } else {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unavailable>".to_string());
        Err(DashboardError::network(
            endpoint,
            Some(status.as_u16()),
            format!("API Error: {}", body.trim()),
        ))
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

impl DataClient for HttpDataClient {
    async fn zones(&self) -> Result<Vec<ZoneRecord>> {
        self.get_json(Endpoint::ZoneCatalog, "/zones", &QueryParams::default())
            .await
    }

    async fn trip_summary(&self, params: &QueryParams) -> Result<TripSummary> {
        self.get_json(Endpoint::TripSummary, "/trips/summary", params).await
    }

    async fn hourly(&self, params: &QueryParams) -> Result<HourlySeries> {
        self.get_json(Endpoint::HourlyHistogram, "/trips/hourly", params).await
    }

    async fn congestion(&self, params: &QueryParams) -> Result<CongestionSeries> {
        self.get_json(Endpoint::CongestionSeries, "/trips/revenue", params).await
    }

    async fn coverage_gaps(&self, params: &QueryParams) -> Result<Vec<GapRecord>> {
        self.get_json(Endpoint::CoverageGaps, "/trips/gaps", params).await
    }

    async fn zone_stats(&self, zone: ZoneId, params: &QueryParams) -> Result<ZoneStats> {
        let path = format!("/zones/{}/stats", zone);
        self.get_json(Endpoint::ZoneStats, &path, params).await
    }

    async fn borough_stats(&self, scope: &BoroughScope, params: &QueryParams) -> Result<BoroughStats> {
        let path = format!("/boroughs/{}/stats", urlencoding::encode(scope.as_path_segment()));
        self.get_json(Endpoint::BoroughStats, &path, params).await
    }

    async fn report(&self, params: &QueryParams) -> Result<Report> {
        self.get_json(Endpoint::Report, "/report", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/api/", "/zones"), "http://h/api/zones");
        assert_eq!(join_url("http://h/api", "report"), "http://h/api/report");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let config = DashboardConfig {
            api_base: "http://127.0.0.1:5000/api/".into(),
            ..Default::default()
        };
        let client = HttpDataClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5000/api");
    }
}
