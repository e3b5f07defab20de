use async_trait::async_trait;
use availability::AvailableCampsite;
use chrono::NaiveDate;

/// Errors from provider fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Upstream responded with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// Rate limited by the upstream API
    #[error("rate limited by upstream API")]
    RateLimited,

    /// Network or transport failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Campground query did not resolve to anything upstream
    #[error("campground {0} not found, try being more specific")]
    CampgroundNotFound(String),
}

impl FetchError {
    /// Whether the poll loop may retry this error on a later cycle.
    ///
    /// An unresolvable campground is a configuration problem and will not
    /// fix itself; everything else is transient upstream behavior.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::CampgroundNotFound(_))
    }
}

/// Common contract implemented by each reservation provider.
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Fetch every bookable night for a campground over `months` months
    /// starting from `start_date`, one record per available night.
    async fn fetch_availability(
        &self,
        campground_id: &str,
        start_date: NaiveDate,
        months: u32,
    ) -> Result<Vec<AvailableCampsite>, FetchError>;

    /// Booking page for a campground, included in log and notification copy.
    fn campground_url(&self, campground_id: &str) -> String;
}
