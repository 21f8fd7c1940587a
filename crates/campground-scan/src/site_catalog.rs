use std::collections::BTreeMap;

use chrono::NaiveDate;
use rec_gov::{AvailabilitySource, month_start};
use tracing::{debug, info, warn};

use crate::scan_types::{Campground, ScanError};

/// Sites tracked for one campground.
///
/// `true` means the site has not been notified yet in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCampground {
    /// Human label used in alerts
    pub label: String,
    /// Recreation.gov campground ID
    pub campground_id: String,
    sites: BTreeMap<String, bool>,
}

impl TrackedCampground {
    /// Track the given sites, all eligible
    pub fn new<I, S>(label: impl Into<String>, campground_id: impl Into<String>, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            campground_id: campground_id.into(),
            sites: sites.into_iter().map(|site| (site.into(), true)).collect(),
        }
    }

    /// Whether the site is tracked and not yet notified
    pub fn is_eligible(&self, site: &str) -> bool {
        self.sites.get(site).copied().unwrap_or(false)
    }

    /// Clear the site's eligibility. Returns `false` if it was untracked or already cleared.
    pub fn mark_notified(&mut self, site: &str) -> bool {
        match self.sites.get_mut(site) {
            Some(eligible) if *eligible => {
                *eligible = false;
                true
            }
            _ => false,
        }
    }

    /// Tracked site identifiers, sorted
    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Number of tracked sites
    pub fn tracked_count(&self) -> usize {
        self.sites.len()
    }

    /// Number of sites still eligible for an alert
    pub fn eligible_count(&self) -> usize {
        self.sites.values().filter(|eligible| **eligible).count()
    }
}

/// The tracking table for a run, one entry per configured campground in
/// configuration order.
///
/// The set of sites is fixed when the catalog is built. Only eligibility
/// flags change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteCatalog {
    campgrounds: Vec<TrackedCampground>,
}

impl SiteCatalog {
    /// Build the catalog from the current month's availability of each campground
    pub async fn build(
        source: &dyn AvailabilitySource,
        campgrounds: &[Campground],
        today: NaiveDate,
    ) -> Result<Self, ScanError> {
        let month = month_start(today);
        let mut tracked = Vec::with_capacity(campgrounds.len());

        for campground in campgrounds {
            debug!(
                "Loading sites for {} ({}) from {}",
                campground.label, campground.campground_id, month
            );

            let snapshot = source
                .month_availability(&campground.campground_id, month)
                .await?;

            if snapshot.is_empty() {
                warn!(
                    "No sites reported for {} ({}), nothing to track",
                    campground.label,
                    snapshot.campground_id()
                );
            }

            let entry = TrackedCampground::new(
                campground.label.clone(),
                campground.campground_id.clone(),
                snapshot.site_ids(),
            );

            info!(
                "Tracking {} sites at {} ({})",
                entry.tracked_count(),
                entry.label,
                entry.campground_id
            );
            tracked.push(entry);
        }

        Ok(Self {
            campgrounds: tracked,
        })
    }

    /// Build a catalog from explicit entries
    pub fn from_entries(entries: impl IntoIterator<Item = TrackedCampground>) -> Self {
        Self {
            campgrounds: entries.into_iter().collect(),
        }
    }

    /// Tracked campgrounds in configuration order
    pub fn campgrounds(&self) -> &[TrackedCampground] {
        &self.campgrounds
    }

    pub(crate) fn campgrounds_mut(&mut self) -> impl Iterator<Item = &mut TrackedCampground> {
        self.campgrounds.iter_mut()
    }

    /// Look up a campground by label
    pub fn campground(&self, label: &str) -> Option<&TrackedCampground> {
        self.campgrounds.iter().find(|c| c.label == label)
    }

    /// Whether a site of a campground is tracked and not yet notified
    pub fn is_eligible(&self, label: &str, site: &str) -> bool {
        self.campground(label)
            .is_some_and(|campground| campground.is_eligible(site))
    }

    /// Clear a site's eligibility. Returns whether a flag was flipped.
    pub fn mark_notified(&mut self, label: &str, site: &str) -> bool {
        self.campgrounds
            .iter_mut()
            .find(|c| c.label == label)
            .is_some_and(|campground| campground.mark_notified(site))
    }

    /// Number of tracked sites across all campgrounds
    pub fn tracked_count(&self) -> usize {
        self.campgrounds.iter().map(|c| c.tracked_count()).sum()
    }

    /// Number of sites still eligible across all campgrounds
    pub fn eligible_count(&self) -> usize {
        self.campgrounds.iter().map(|c| c.eligible_count()).sum()
    }
}
