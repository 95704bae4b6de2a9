//! Search filter state shared by the search bar, facet panel and results.
//!
//! DESIGN
//! ======
//! `SearchFilters` is a plain value with pure update/reset/count operations;
//! `FilterStore` wraps it in a signal so every view reading it re-renders on
//! change. The active-filter count is derived on read, never stored, so it
//! cannot drift from the facets.
//!
//! Translating filters into a backend query is the query layer's job; the
//! local `matches`/`apply` pair covers already-fetched lists.

#[cfg(test)]
#[path = "filters_test.rs"]
mod filters_test;

use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::net::types::School;

pub const DEFAULT_DISTANCE_MILES: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("distance must be a non-negative number of miles, got {0}")]
    InvalidDistance(f64),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Distance,
    Name,
    Rating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Tri-state facets: `None` = don't care, `Some(b)` = require `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    Gi,
    Nogi,
    Kids,
    Showers,
    OpenMat,
    CompetitionTraining,
    WomensOnlyClasses,
    BeginnerClasses,
    MorningClasses,
    EveningClasses,
    WeekendClasses,
    Premium,
}

impl Facet {
    pub const ALL: [Facet; 12] = [
        Facet::Gi,
        Facet::Nogi,
        Facet::Kids,
        Facet::Showers,
        Facet::OpenMat,
        Facet::CompetitionTraining,
        Facet::WomensOnlyClasses,
        Facet::BeginnerClasses,
        Facet::MorningClasses,
        Facet::EveningClasses,
        Facet::WeekendClasses,
        Facet::Premium,
    ];

    /// Key used in the serialized filter object.
    pub fn key(self) -> &'static str {
        match self {
            Facet::Gi => "hasGi",
            Facet::Nogi => "hasNogi",
            Facet::Kids => "hasKids",
            Facet::Showers => "hasShowers",
            Facet::OpenMat => "hasOpenMat",
            Facet::CompetitionTraining => "hasCompetitionTraining",
            Facet::WomensOnlyClasses => "hasWomensOnlyClasses",
            Facet::BeginnerClasses => "hasBeginnerClasses",
            Facet::MorningClasses => "hasMorningClasses",
            Facet::EveningClasses => "hasEveningClasses",
            Facet::WeekendClasses => "hasWeekendClasses",
            Facet::Premium => "isPremium",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// The school's value for this facet; an unknown flag counts as `false`.
    pub fn school_value(self, school: &School) -> bool {
        let flag = match self {
            Facet::Gi => school.has_gi,
            Facet::Nogi => school.has_nogi,
            Facet::Kids => school.has_kids,
            Facet::Showers => school.has_showers,
            Facet::OpenMat => school.has_open_mat,
            Facet::CompetitionTraining => school.has_competition_training,
            Facet::WomensOnlyClasses => school.has_womens_only_classes,
            Facet::BeginnerClasses => school.has_beginner_classes,
            Facet::MorningClasses => school.has_morning_classes,
            Facet::EveningClasses => school.has_evening_classes,
            Facet::WeekendClasses => school.has_weekend_classes,
            Facet::Premium => Some(school.is_premium),
        };
        flag.unwrap_or(false)
    }
}

/// A single-field write to the filter object.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterUpdate {
    Query(String),
    Location(String),
    Distance(f64),
    Facet(Facet, Option<bool>),
    SortBy(SortBy),
    SortDirection(SortDirection),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub query: String,
    pub location: String,
    /// Radius in miles.
    pub distance: f64,

    pub has_gi: Option<bool>,
    pub has_nogi: Option<bool>,
    pub has_kids: Option<bool>,

    pub has_showers: Option<bool>,
    pub has_open_mat: Option<bool>,

    pub has_competition_training: Option<bool>,
    pub has_womens_only_classes: Option<bool>,
    pub has_beginner_classes: Option<bool>,

    pub has_morning_classes: Option<bool>,
    pub has_evening_classes: Option<bool>,
    pub has_weekend_classes: Option<bool>,

    pub is_premium: Option<bool>,

    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            location: String::new(),
            distance: DEFAULT_DISTANCE_MILES,
            has_gi: None,
            has_nogi: None,
            has_kids: None,
            has_showers: None,
            has_open_mat: None,
            has_competition_training: None,
            has_womens_only_classes: None,
            has_beginner_classes: None,
            has_morning_classes: None,
            has_evening_classes: None,
            has_weekend_classes: None,
            is_premium: None,
            sort_by: SortBy::Distance,
            sort_direction: SortDirection::Asc,
        }
    }
}

impl SearchFilters {
    pub fn facet(&self, facet: Facet) -> Option<bool> {
        match facet {
            Facet::Gi => self.has_gi,
            Facet::Nogi => self.has_nogi,
            Facet::Kids => self.has_kids,
            Facet::Showers => self.has_showers,
            Facet::OpenMat => self.has_open_mat,
            Facet::CompetitionTraining => self.has_competition_training,
            Facet::WomensOnlyClasses => self.has_womens_only_classes,
            Facet::BeginnerClasses => self.has_beginner_classes,
            Facet::MorningClasses => self.has_morning_classes,
            Facet::EveningClasses => self.has_evening_classes,
            Facet::WeekendClasses => self.has_weekend_classes,
            Facet::Premium => self.is_premium,
        }
    }

    fn facet_mut(&mut self, facet: Facet) -> &mut Option<bool> {
        match facet {
            Facet::Gi => &mut self.has_gi,
            Facet::Nogi => &mut self.has_nogi,
            Facet::Kids => &mut self.has_kids,
            Facet::Showers => &mut self.has_showers,
            Facet::OpenMat => &mut self.has_open_mat,
            Facet::CompetitionTraining => &mut self.has_competition_training,
            Facet::WomensOnlyClasses => &mut self.has_womens_only_classes,
            Facet::BeginnerClasses => &mut self.has_beginner_classes,
            Facet::MorningClasses => &mut self.has_morning_classes,
            Facet::EveningClasses => &mut self.has_evening_classes,
            Facet::WeekendClasses => &mut self.has_weekend_classes,
            Facet::Premium => &mut self.is_premium,
        }
    }

    /// Write one field, leaving every other field untouched.
    ///
    /// # Errors
    ///
    /// Rejects a negative or non-finite distance; the filters are unchanged.
    pub fn update(&mut self, update: FilterUpdate) -> Result<(), FilterError> {
        match update {
            FilterUpdate::Query(q) => self.query = q,
            FilterUpdate::Location(l) => self.location = l,
            FilterUpdate::Distance(d) => {
                if !d.is_finite() || d < 0.0 {
                    return Err(FilterError::InvalidDistance(d));
                }
                self.distance = d;
            }
            FilterUpdate::Facet(facet, value) => *self.facet_mut(facet) = value,
            FilterUpdate::SortBy(s) => self.sort_by = s,
            FilterUpdate::SortDirection(d) => self.sort_direction = d,
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of facets set to an explicit include/exclude.
    pub fn active_filter_count(&self) -> usize {
        Facet::ALL.iter().filter(|f| self.facet(**f).is_some()).count()
    }

    /// Whether `school` passes the text and facet filters. Distance is not
    /// evaluated here: schools carry no geocoded origin to measure from.
    pub fn matches(&self, school: &School) -> bool {
        if !school_matches_query(school, &self.query) {
            return false;
        }

        let location = self.location.trim().to_lowercase();
        if !location.is_empty() {
            let fields = [
                school.city.as_deref(),
                school.state.as_deref(),
                school.zipcode.as_deref(),
                school.address.as_deref(),
            ];
            if !fields.iter().flatten().any(|f| f.to_lowercase().contains(&location)) {
                return false;
            }
        }

        Facet::ALL
            .iter()
            .all(|f| self.facet(*f).is_none_or(|wanted| f.school_value(school) == wanted))
    }

    /// Keep matching schools and order them.
    ///
    /// Name sorting is case-insensitive and honors the direction; distance and
    /// rating keep the backend's ranking.
    pub fn apply(&self, schools: &[School]) -> Vec<School> {
        let mut out: Vec<School> = schools.iter().filter(|s| self.matches(s)).cloned().collect();
        if self.sort_by == SortBy::Name {
            out.sort_by_key(|s| s.name.to_lowercase());
            if self.sort_direction == SortDirection::Desc {
                out.reverse();
            }
        }
        out
    }
}

/// Case-insensitive substring match across name, city and state. The query
/// is used verbatim, whitespace included; an empty query matches everything.
pub fn school_matches_query(school: &School, query: &str) -> bool {
    let needle = query.to_lowercase();
    [school.name.as_str(), school.city_str(), school.state_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Signal-backed filter store provided to views as context.
#[derive(Clone, Copy, Debug)]
pub struct FilterStore {
    filters: RwSignal<SearchFilters>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        Self { filters: RwSignal::new(SearchFilters::default()) }
    }

    /// Current filters (tracked).
    pub fn filters(&self) -> SearchFilters {
        self.filters.get()
    }

    /// Current filters without subscribing the caller.
    pub fn snapshot(&self) -> SearchFilters {
        self.filters.get_untracked()
    }

    /// Validate then write one field; subscribers are only notified on success.
    ///
    /// # Errors
    ///
    /// See [`SearchFilters::update`].
    pub fn update_filter(&self, update: FilterUpdate) -> Result<(), FilterError> {
        let mut next = self.filters.get_untracked();
        next.update(update)?;
        self.filters.set(next);
        Ok(())
    }

    pub fn reset_filters(&self) {
        self.filters.set(SearchFilters::default());
    }

    /// Derived count of active facets (tracked).
    pub fn active_filter_count(&self) -> usize {
        self.filters.with(SearchFilters::active_filter_count)
    }
}
