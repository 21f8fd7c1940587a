use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::dates::month_start_param;
use crate::types::{AvailabilitySnapshot, MonthAvailabilityResponse, RecGovError};

/// Default base URL of the recreation.gov internal API
pub const DEFAULT_BASE_URL: &str = "https://www.recreation.gov/api";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.0.0 Safari/537.36";

/// Source of monthly campground availability
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetch availability of every site in a campground for the month containing `month`
    async fn month_availability(
        &self,
        campground_id: &str,
        month: NaiveDate,
    ) -> Result<AvailabilitySnapshot, RecGovError>;
}

/// Client for the recreation.gov month availability API
pub struct RecGovClient {
    client: Client,
    base_url: String,
}

impl RecGovClient {
    /// Create a client against the public recreation.gov API
    pub fn new() -> Result<Self, RecGovError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RecGovError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .cookie_store(true)
            .build()
            .map_err(|e| RecGovError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of the month availability endpoint for a campground
    pub fn month_url(&self, campground_id: &str) -> String {
        format!(
            "{}/camps/availability/campground/{}/month",
            self.base_url, campground_id
        )
    }

    /// Get availability for the month containing `month`
    pub async fn get_month_availability(
        &self,
        campground_id: &str,
        month: NaiveDate,
    ) -> Result<AvailabilitySnapshot, RecGovError> {
        let url = self.month_url(campground_id);
        let start_date_param = month_start_param(month);

        debug!("Making request to: {}?start_date={}", url, start_date_param);

        let response = self
            .client
            .get(&url)
            .query(&[("start_date", start_date_param.as_str())])
            .send()
            .await
            .map_err(|e| RecGovError::Http(e.to_string()))?;

        debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            warn!("API request failed with status {}: {}", status, body);

            return Err(match status.as_u16() {
                429 => RecGovError::RateLimited,
                401 | 403 => RecGovError::AuthenticationFailed,
                404 => RecGovError::NotFound(campground_id.to_string()),
                code => RecGovError::Api { status: code, body },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RecGovError::Http(e.to_string()))?;

        parse_month_response(campground_id, &body)
    }
}

#[async_trait]
impl AvailabilitySource for RecGovClient {
    async fn month_availability(
        &self,
        campground_id: &str,
        month: NaiveDate,
    ) -> Result<AvailabilitySnapshot, RecGovError> {
        self.get_month_availability(campground_id, month).await
    }
}

/// Parse a month availability body into a snapshot
pub fn parse_month_response(
    campground_id: &str,
    body: &str,
) -> Result<AvailabilitySnapshot, RecGovError> {
    let response: MonthAvailabilityResponse =
        serde_json::from_str(body).map_err(|e| RecGovError::Parse(e.to_string()))?;

    Ok(AvailabilitySnapshot::from_response(campground_id, response))
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "accept",
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert(
        "referer",
        HeaderValue::from_static("https://www.recreation.gov/camping/campgrounds/10039845?tab=campsites"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers
}
