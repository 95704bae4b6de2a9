//! Owner dashboard: recent schools plus visit/save totals.
//!
//! Visit and save counts come from a `SchoolAnalytics` source. No analytics
//! backend exists yet, so the shipped source reports zeros.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use crate::net::store::SchoolStore;
use crate::net::types::{School, User};

pub const RECENT_SCHOOLS_LIMIT: usize = 5;
pub const LOAD_FAILED: &str = "Failed to load dashboard data";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchoolCounts {
    pub visits: u64,
    pub saves: u64,
}

/// Per-school engagement counts.
pub trait SchoolAnalytics {
    fn counts(&self, school_id: &str) -> SchoolCounts;
}

/// Analytics source used until real visit/save tracking exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnalytics;

impl SchoolAnalytics for NoAnalytics {
    fn counts(&self, _school_id: &str) -> SchoolCounts {
        SchoolCounts::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSchool {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub counts: SchoolCounts,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_schools: usize,
    pub total_visits: u64,
    pub total_saves: u64,
}

impl DashboardStats {
    pub fn from_schools(schools: &[DashboardSchool]) -> Self {
        Self {
            total_schools: schools.len(),
            total_visits: schools.iter().map(|s| s.counts.visits).sum(),
            total_saves: schools.iter().map(|s| s.counts.saves).sum(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardState {
    pub schools: Vec<DashboardSchool>,
    pub stats: DashboardStats,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    /// Fetch up to five owned schools and total their counts. Does nothing
    /// when signed out.
    pub async fn load(&mut self, store: &dyn SchoolStore, analytics: &dyn SchoolAnalytics, user: Option<&User>) {
        let Some(user) = user else {
            return;
        };
        self.loading = true;
        match store.list_owned_summaries(&user.id, RECENT_SCHOOLS_LIMIT).await {
            Ok(rows) => {
                self.schools = rows.iter().map(|s| with_counts(s, analytics)).collect();
                self.stats = DashboardStats::from_schools(&self.schools);
                self.error = None;
            }
            Err(e) => {
                leptos::logging::error!("Error fetching dashboard data: {e}");
                self.error = Some(e.message_or(LOAD_FAILED));
            }
        }
        self.loading = false;
    }
}

fn with_counts(school: &School, analytics: &dyn SchoolAnalytics) -> DashboardSchool {
    DashboardSchool {
        id: school.id.clone(),
        name: school.name.clone(),
        city: school.city_str().to_owned(),
        state: school.state_str().to_owned(),
        counts: analytics.counts(&school.id),
    }
}
