use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Status string Rec.gov reports for a bookable day.
pub const AVAILABLE: &str = "Available";

/// Response structure from the recreation.gov month availability endpoint
#[derive(Debug, Deserialize)]
pub struct MonthAvailabilityResponse {
    /// Campsites keyed by Rec.gov's internal campsite key
    pub campsites: BTreeMap<String, CampsiteAvailabilityData>,
}

/// Availability data for one campsite in the month response
#[derive(Debug, Deserialize)]
pub struct CampsiteAvailabilityData {
    /// Human-readable site identifier, e.g. `018` or `T004`
    pub site: String,
    /// Day timestamp (`2024-06-13T00:00:00Z`) to status string
    pub availabilities: HashMap<String, String>,
}

/// Day timestamp to status, for each campsite entry sharing one site label
type SiteEntries = BTreeMap<String, HashMap<String, String>>;

/// One month of per-site, per-day availability for a single campground.
///
/// Sites are keyed by their human-readable identifier and kept sorted, so
/// iterating a snapshot is deterministic. Campgrounds with several loops can
/// reuse a site label under different internal campsite keys; each entry
/// keeps its own days, ordered by that key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    campground_id: String,
    sites: BTreeMap<String, SiteEntries>,
}

impl AvailabilitySnapshot {
    /// Create an empty snapshot for a campground
    pub fn new(campground_id: impl Into<String>) -> Self {
        Self {
            campground_id: campground_id.into(),
            sites: BTreeMap::new(),
        }
    }

    /// Convert a month response into a snapshot keyed by human-readable site
    pub fn from_response(
        campground_id: impl Into<String>,
        response: MonthAvailabilityResponse,
    ) -> Self {
        let mut snapshot = Self::new(campground_id);

        for (campsite_key, data) in response.campsites {
            snapshot
                .sites
                .entry(data.site)
                .or_default()
                .entry(campsite_key)
                .or_default()
                .extend(data.availabilities);
        }

        snapshot
    }

    /// Record the status of one site on one day.
    ///
    /// The site label doubles as the campsite key.
    pub fn insert_day(
        &mut self,
        site: impl Into<String>,
        day: impl Into<String>,
        status: impl Into<String>,
    ) {
        let site = site.into();
        self.sites
            .entry(site.clone())
            .or_default()
            .entry(site)
            .or_default()
            .insert(day.into(), status.into());
    }

    /// Provider ID of the campground this snapshot describes
    pub fn campground_id(&self) -> &str {
        &self.campground_id
    }

    /// Site identifiers present in the snapshot, in sorted order
    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Number of distinct site labels in the snapshot
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the snapshot has no sites
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Status of a site on a day, from the first campsite entry (by
    /// internal key) that reports the day
    pub fn status(&self, site: &str, day: &str) -> Option<&str> {
        self.sites
            .get(site)?
            .values()
            .find_map(|days| days.get(day))
            .map(String::as_str)
    }

    /// Whether every listed day is `Available` for the site.
    ///
    /// True when any one campsite entry with that label covers the whole
    /// list. Each entry stops at its first missing or unavailable day.
    pub fn is_fully_available(&self, site: &str, days: &[String]) -> bool {
        let Some(entries) = self.sites.get(site) else {
            return false;
        };

        entries.values().any(|availabilities| {
            days.iter()
                .all(|day| availabilities.get(day).map(String::as_str) == Some(AVAILABLE))
        })
    }

    /// Fold another month of the same campground into this snapshot.
    ///
    /// Days join the entry with the same site label and campsite key.
    pub fn merge(&mut self, other: AvailabilitySnapshot) {
        for (site, entries) in other.sites {
            let merged = self.sites.entry(site).or_default();
            for (campsite_key, days) in entries {
                merged.entry(campsite_key).or_default().extend(days);
            }
        }
    }
}

/// Errors returned by the Rec.gov client
#[derive(Debug, thiserror::Error)]
pub enum RecGovError {
    /// Failed to build the HTTP client
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Request never produced a response
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Rate limited by recreation.gov
    #[error("Rate limited by recreation.gov")]
    RateLimited,

    /// Rejected by recreation.gov
    #[error("Authentication failed with recreation.gov")]
    AuthenticationFailed,

    /// Campground unknown to recreation.gov
    #[error("Campground {0} not found")]
    NotFound(String),

    /// Any other non-success status
    #[error("HTTP {status} - {body}")]
    Api {
        /// Response status code
        status: u16,
        /// Response body, if it could be read
        body: String,
    },

    /// Body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),
}
