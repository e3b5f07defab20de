use std::collections::HashMap;

use async_trait::async_trait;
use availability::{AvailableCampsite, Campsite};
use chrono::{Datelike, Months, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::http::{build_client, check_status};
use crate::provider::{AvailabilityProvider, FetchError};

const BASE_URL: &str = "https://www.recreation.gov";
const SEARCH_ENDPOINT: &str = "/api/search";
const AVAILABILITY_ENDPOINT: &str = "/api/camps/availability/campground";

/// Client for the recreation.gov availability API.
pub struct RecGovClient {
    client: Client,
    base_url: String,
}

/// Response from the campground name search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    entity_id: Option<String>,
}

/// Response from the monthly availability grid endpoint.
#[derive(Debug, Deserialize)]
struct MonthResponse {
    campsites: HashMap<String, RecGovCampsite>,
}

/// Per-site entry in the monthly availability grid.
#[derive(Debug, Deserialize)]
pub struct RecGovCampsite {
    /// ISO datetime string to availability status, e.g. "Available"
    pub availabilities: HashMap<String, String>,

    /// Site label or number
    pub site: String,

    /// Loop or sub-area the site belongs to
    #[serde(rename = "loop")]
    pub campsite_loop: String,

    /// "Overnight" for campsites, "Day" for picnic/day-use units
    pub type_of_use: String,
}

/// Classify a recreation.gov availability status string.
///
/// "Reserved", "Open", "Not Available", and anything unrecognized all mean
/// the night cannot be booked.
fn is_available(status: &str) -> bool {
    status == "Available"
}

impl RecGovClient {
    /// Create a client against the production recreation.gov API.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different base url (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a campground name to its recreation.gov entity id.
    pub async fn resolve_campground(&self, query: &str) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, SEARCH_ENDPOINT);
        let response = self.client.get(&url).query(&[("q", query)]).send().await?;

        let search: SearchResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let campground_id = search
            .entity_id
            .ok_or_else(|| FetchError::CampgroundNotFound(query.to_string()))?;

        info!(campground = query, campground_id, "found campground");
        Ok(campground_id)
    }

    /// Fetch one month of the availability grid for a campground.
    async fn fetch_month(
        &self,
        campground_id: &str,
        month_start: NaiveDate,
    ) -> Result<Vec<AvailableCampsite>, FetchError> {
        let url = format!(
            "{}{}/{}/month",
            self.base_url, AVAILABILITY_ENDPOINT, campground_id
        );
        // The API insists on the first day of the month in ISO format with
        // a trailing .000Z.
        let start_date_param = format!("{}T00:00:00.000Z", month_start.format("%Y-%m-%d"));

        debug!(campground_id, start_date = %start_date_param, "fetching month grid");

        let response = self
            .client
            .get(&url)
            .query(&[("start_date", start_date_param.as_str())])
            .send()
            .await?;

        let month: MonthResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut results = Vec::new();
        for campsite in month.campsites.into_values() {
            // Day-use units (picnic sites) are not overnight stays.
            if campsite.type_of_use == "Day" {
                continue;
            }

            for (date_string, status) in &campsite.availabilities {
                if !is_available(status) {
                    continue;
                }
                let Some(date_prefix) = date_string.get(..10) else {
                    warn!(date = %date_string, "malformed availability date");
                    continue;
                };
                match NaiveDate::parse_from_str(date_prefix, "%Y-%m-%d") {
                    Ok(date) => results.push(AvailableCampsite::new(
                        date,
                        Campsite::new(&campsite.campsite_loop, &campsite.site),
                    )),
                    Err(_) => warn!(date = %date_string, "failed to parse availability date"),
                }
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl AvailabilityProvider for RecGovClient {
    async fn fetch_availability(
        &self,
        campground_id: &str,
        start_date: NaiveDate,
        months: u32,
    ) -> Result<Vec<AvailableCampsite>, FetchError> {
        let first_of_month =
            NaiveDate::from_ymd_opt(start_date.year(), start_date.month(), 1).ok_or_else(
                || FetchError::Parse(format!("invalid start date: {start_date}")),
            )?;

        let mut results = Vec::new();
        for offset in 0..months {
            let month_start = first_of_month + Months::new(offset);
            results.extend(self.fetch_month(campground_id, month_start).await?);
        }
        Ok(results)
    }

    fn campground_url(&self, campground_id: &str) -> String {
        format!(
            "{}/camping/campgrounds/{}/availability",
            self.base_url, campground_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn availability_vocabulary_is_classified() {
        assert!(is_available("Available"));
        assert!(!is_available("Reserved"));
        assert!(!is_available("Open"));
        assert!(!is_available("Not Available"));
        assert!(!is_available("Something New"));
    }

    fn month_body() -> serde_json::Value {
        json!({
            "campsites": {
                "100": {
                    "availabilities": {
                        "2024-07-01T00:00:00Z": "Available",
                        "2024-07-02T00:00:00Z": "Reserved",
                    },
                    "site": "A12",
                    "loop": "Upper Loop",
                    "type_of_use": "Overnight",
                },
                "101": {
                    "availabilities": {
                        "2024-07-01T00:00:00Z": "Available",
                    },
                    "site": "P1",
                    "loop": "Picnic Area",
                    "type_of_use": "Day",
                },
            }
        })
    }

    #[tokio::test]
    async fn month_grid_becomes_one_record_per_available_night() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/camps/availability/campground/232447/month"))
            .and(query_param("start_date", "2024-07-01T00:00:00.000Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(month_body()))
            .mount(&server)
            .await;

        let client = RecGovClient::new().unwrap().with_base_url(server.uri());
        let start = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let records = client
            .fetch_availability("232447", start, 1)
            .await
            .unwrap();

        // Reserved nights and the day-use unit emit nothing; the request
        // is normalized to the first of the month.
        assert_eq!(
            records,
            vec![AvailableCampsite::new(
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                Campsite::new("Upper Loop", "A12"),
            )]
        );
    }

    #[tokio::test]
    async fn campground_search_resolves_entity_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("q", "Kirby Cove"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "entity_id": "232769" })),
            )
            .mount(&server)
            .await;

        let client = RecGovClient::new().unwrap().with_base_url(server.uri());
        assert_eq!(client.resolve_campground("Kirby Cove").await.unwrap(), "232769");
    }

    #[tokio::test]
    async fn missing_entity_id_is_campground_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = RecGovClient::new().unwrap().with_base_url(server.uri());
        let err = client.resolve_campground("Nowhere").await.unwrap_err();
        assert!(matches!(err, FetchError::CampgroundNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn upstream_failure_is_a_retryable_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = RecGovClient::new().unwrap().with_base_url(server.uri());
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let err = client.fetch_availability("232447", start, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn rate_limiting_is_reported_distinctly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = RecGovClient::new().unwrap().with_base_url(server.uri());
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let err = client.fetch_availability("232447", start, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited));
    }
}
