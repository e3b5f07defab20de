use std::collections::HashMap;

use async_trait::async_trait;
use availability::{AvailableCampsite, Campsite};
use chrono::{Months, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::http::{build_client, check_status};
use crate::provider::{AvailabilityProvider, FetchError};

const BASE_URL: &str = "https://calirdr.usedirect.com";
const SEARCH_ENDPOINT: &str = "/rdr/rdr/fd/citypark/namecontains/";
const PLACE_ENDPOINT: &str = "/rdr/rdr/search/place";
const AVAILABILITY_ENDPOINT: &str = "/rdr/rdr/search/grid";
const CAMPGROUND_URL: &str = "https://www.reservecalifornia.com/";
const DATE_FORMAT: &str = "%m-%d-%Y";

/// Client for the ReserveCalifornia (UseDirect) reservation API.
pub struct ReserveCaliforniaClient {
    client: Client,
    base_url: String,
}

/// One hit from the park name search endpoint.
#[derive(Debug, Deserialize)]
struct ParkHit {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "PlaceId")]
    place_id: i64,
}

#[derive(Debug, Deserialize)]
struct PlaceResponse {
    #[serde(rename = "SelectedPlace")]
    selected_place: Option<SelectedPlace>,
}

#[derive(Debug, Deserialize)]
struct SelectedPlace {
    #[serde(rename = "Facilities")]
    facilities: HashMap<String, FacilityInfo>,
}

#[derive(Debug, Deserialize)]
struct FacilityInfo {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "FacilityId")]
    facility_id: i64,
}

/// A facility (campground) inside a park, listed when resolving a park name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityEntry {
    /// Campground name
    pub campground: String,

    /// Facility id to pass back as the campground argument
    pub facility_id: String,
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    #[serde(rename = "Facility")]
    facility: GridFacility,
}

#[derive(Debug, Deserialize)]
struct GridFacility {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Units")]
    units: Option<HashMap<String, GridUnit>>,
}

/// Per-unit entry in the availability grid.
#[derive(Debug, Deserialize)]
struct GridUnit {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "IsWebViewable")]
    is_web_viewable: bool,
    #[serde(rename = "Slices")]
    slices: HashMap<String, GridSlice>,
}

/// One bookable-night slot of a unit.
#[derive(Debug, Deserialize)]
struct GridSlice {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "IsFree")]
    is_free: bool,
}

impl ReserveCaliforniaClient {
    /// Create a client against the production UseDirect API.
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

    /// Resolve a park name to its ReserveCalifornia place id.
    pub async fn resolve_park(&self, query: &str) -> Result<String, FetchError> {
        let url = format!(
            "{}{}{}",
            self.base_url,
            SEARCH_ENDPOINT,
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;

        let hits: Vec<ParkHit> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let top_hit = hits
            .first()
            .ok_or_else(|| FetchError::CampgroundNotFound(query.to_string()))?;

        info!(park = %top_hit.name, place_id = top_hit.place_id, "found park");
        Ok(top_hit.place_id.to_string())
    }

    /// List the facilities (campgrounds) of a park, sorted by name.
    ///
    /// ReserveCalifornia availability is keyed by facility id, which the
    /// website does not surface; this lookup gives users the id to rerun
    /// the watch with.
    pub async fn list_facilities(
        &self,
        park: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<FacilityEntry>, FetchError> {
        let place_id = self.resolve_park(park).await?;

        let url = format!("{}{}", self.base_url, PLACE_ENDPOINT);
        let body = json!({
            "PlaceId": place_id,
            "StartDate": start_date.format(DATE_FORMAT).to_string(),
        });
        let response = self.client.post(&url).json(&body).send().await?;

        let place: PlaceResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let selected = place
            .selected_place
            .ok_or_else(|| FetchError::CampgroundNotFound(park.to_string()))?;

        let mut facilities: Vec<FacilityEntry> = selected
            .facilities
            .into_values()
            .map(|facility| FacilityEntry {
                campground: facility.name,
                facility_id: facility.facility_id.to_string(),
            })
            .collect();
        facilities.sort_by(|a, b| a.campground.cmp(&b.campground));

        Ok(facilities)
    }
}

#[async_trait]
impl AvailabilityProvider for ReserveCaliforniaClient {
    async fn fetch_availability(
        &self,
        campground_id: &str,
        start_date: NaiveDate,
        months: u32,
    ) -> Result<Vec<AvailableCampsite>, FetchError> {
        let end_date = start_date + Months::new(months);

        let url = format!("{}{}", self.base_url, AVAILABILITY_ENDPOINT);
        let body = json!({
            "FacilityId": campground_id,
            "StartDate": start_date.format(DATE_FORMAT).to_string(),
            "EndDate": end_date.format(DATE_FORMAT).to_string(),
        });

        debug!(campground_id, %start_date, %end_date, "fetching availability grid");

        let response = self.client.post(&url).json(&body).send().await?;
        let grid: GridResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let campground = grid.facility.name;
        if campground.is_empty() {
            return Err(FetchError::CampgroundNotFound(campground_id.to_string()));
        }
        info!(campground = %campground, campground_id, "found campground");

        let mut results = Vec::new();
        for unit in grid.facility.units.unwrap_or_default().into_values() {
            // Units hidden from web booking are not reservable overnight
            // stays (day-use and walk-in inventory).
            if !unit.is_web_viewable {
                continue;
            }
            for slice in unit.slices.into_values() {
                if slice.is_free {
                    results.push(AvailableCampsite::new(
                        slice.date,
                        Campsite::new(&campground, &unit.name),
                    ));
                }
            }
        }

        Ok(results)
    }

    fn campground_url(&self, _campground_id: &str) -> String {
        CAMPGROUND_URL.to_string()
    }
}
