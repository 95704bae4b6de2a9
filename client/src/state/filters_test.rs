use super::*;
use leptos::prelude::Owner;

fn school(name: &str, city: &str, state: &str) -> School {
    School {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_owned(),
        city: Some(city.to_owned()),
        state: Some(state.to_owned()),
        ..School::default()
    }
}

// =============================================================
// Defaults / reset
// =============================================================

#[test]
fn defaults_match_documented_values() {
    let f = SearchFilters::default();
    assert_eq!(f.query, "");
    assert_eq!(f.location, "");
    assert_eq!(f.distance, 25.0);
    assert!(Facet::ALL.iter().all(|facet| f.facet(*facet).is_none()));
    assert_eq!(f.sort_by, SortBy::Distance);
    assert_eq!(f.sort_direction, SortDirection::Asc);
    assert_eq!(f.active_filter_count(), 0);
}

#[test]
fn reset_restores_defaults_from_any_state() {
    let mut f = SearchFilters::default();
    f.update(FilterUpdate::Query("gracie".to_owned())).unwrap();
    f.update(FilterUpdate::Location("Austin".to_owned())).unwrap();
    f.update(FilterUpdate::Distance(100.0)).unwrap();
    for facet in Facet::ALL {
        f.update(FilterUpdate::Facet(facet, Some(false))).unwrap();
    }
    f.update(FilterUpdate::SortBy(SortBy::Rating)).unwrap();
    f.update(FilterUpdate::SortDirection(SortDirection::Desc)).unwrap();

    f.reset();

    assert_eq!(f, SearchFilters::default());
}

// =============================================================
// update
// =============================================================

#[test]
fn update_preserves_other_fields() {
    let mut f = SearchFilters::default();
    f.update(FilterUpdate::Query("alpha".to_owned())).unwrap();
    f.update(FilterUpdate::Facet(Facet::Kids, Some(true))).unwrap();

    let expected = SearchFilters { query: "alpha".to_owned(), has_kids: Some(true), ..SearchFilters::default() };
    assert_eq!(f, expected);
}

#[test]
fn last_write_per_key_wins() {
    let mut f = SearchFilters::default();
    let writes = [
        FilterUpdate::Facet(Facet::Gi, Some(true)),
        FilterUpdate::Query("a".to_owned()),
        FilterUpdate::Facet(Facet::Premium, Some(false)),
        FilterUpdate::Facet(Facet::Gi, Some(false)),
        FilterUpdate::Distance(10.0),
        FilterUpdate::Query("b".to_owned()),
        FilterUpdate::Facet(Facet::OpenMat, Some(true)),
        FilterUpdate::Facet(Facet::Premium, None),
        FilterUpdate::Distance(0.0),
    ];
    for w in writes {
        f.update(w).unwrap();
    }

    assert_eq!(f.has_gi, Some(false));
    assert_eq!(f.query, "b");
    assert_eq!(f.is_premium, None);
    assert_eq!(f.has_open_mat, Some(true));
    assert_eq!(f.distance, 0.0);
    assert_eq!(f.active_filter_count(), 2);
}

#[test]
fn negative_distance_is_rejected_without_change() {
    let mut f = SearchFilters::default();
    let err = f.update(FilterUpdate::Distance(-1.0)).unwrap_err();
    assert_eq!(err, FilterError::InvalidDistance(-1.0));
    assert_eq!(f.distance, DEFAULT_DISTANCE_MILES);
}

#[test]
fn non_finite_distance_is_rejected() {
    let mut f = SearchFilters::default();
    assert!(f.update(FilterUpdate::Distance(f64::NAN)).is_err());
    assert!(f.update(FilterUpdate::Distance(f64::INFINITY)).is_err());
    assert_eq!(f.distance, DEFAULT_DISTANCE_MILES);
}

// =============================================================
// active_filter_count
// =============================================================

#[test]
fn has_gi_toggle_scenario() {
    let mut f = SearchFilters::default();
    f.update(FilterUpdate::Facet(Facet::Gi, Some(true))).unwrap();
    assert_eq!(f.active_filter_count(), 1);
    f.update(FilterUpdate::Facet(Facet::Gi, None)).unwrap();
    assert_eq!(f.active_filter_count(), 0);
}

#[test]
fn explicit_false_counts_as_active() {
    let mut f = SearchFilters::default();
    f.update(FilterUpdate::Facet(Facet::Showers, Some(false))).unwrap();
    assert_eq!(f.active_filter_count(), 1);
}

#[test]
fn non_facet_fields_never_count() {
    let mut f = SearchFilters::default();
    f.update(FilterUpdate::Query("x".to_owned())).unwrap();
    f.update(FilterUpdate::Location("y".to_owned())).unwrap();
    f.update(FilterUpdate::Distance(5.0)).unwrap();
    f.update(FilterUpdate::SortBy(SortBy::Name)).unwrap();
    f.update(FilterUpdate::SortDirection(SortDirection::Desc)).unwrap();
    assert_eq!(f.active_filter_count(), 0);
}

#[test]
fn every_facet_counts_once() {
    let mut f = SearchFilters::default();
    for (i, facet) in Facet::ALL.into_iter().enumerate() {
        f.update(FilterUpdate::Facet(facet, Some(i % 2 == 0))).unwrap();
        assert_eq!(f.active_filter_count(), i + 1);
    }
}

// =============================================================
// Facet keys / serialization
// =============================================================

#[test]
fn facet_keys_round_trip() {
    for facet in Facet::ALL {
        assert_eq!(Facet::from_key(facet.key()), Some(facet));
    }
    assert_eq!(Facet::from_key("sortBy"), None);
}

#[test]
fn serialized_keys_match_facet_keys() {
    let value = serde_json::to_value(SearchFilters::default()).unwrap();
    for facet in Facet::ALL {
        assert!(value.get(facet.key()).is_some(), "missing {}", facet.key());
    }
    assert_eq!(value["sortBy"], serde_json::json!("distance"));
    assert_eq!(value["sortDirection"], serde_json::json!("asc"));
}

// =============================================================
// matches / apply
// =============================================================

#[test]
fn query_bj_matches_only_alpha() {
    let schools = vec![school("Alpha BJJ", "Austin", "TX"), school("Beta Jiu-Jitsu", "Boston", "MA")];
    let f = SearchFilters { query: "bj".to_owned(), ..SearchFilters::default() };
    let names: Vec<String> = f.apply(&schools).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Alpha BJJ".to_owned()]);
}

#[test]
fn empty_query_matches_all() {
    let schools = vec![school("Alpha BJJ", "Austin", "TX"), school("Beta Jiu-Jitsu", "Boston", "MA")];
    assert_eq!(SearchFilters::default().apply(&schools).len(), 2);
}

#[test]
fn query_whitespace_is_significant_on_both_search_screens() {
    let schools = vec![school("Alpha BJJ", "Austin", "TX"), school("Beta Jiu-Jitsu", "Boston", "MA")];
    for query in [" bj", "bjj ", "  "] {
        let f = SearchFilters { query: query.to_owned(), ..SearchFilters::default() };
        let directory: Vec<String> = f.apply(&schools).into_iter().map(|s| s.name).collect();
        let owner: Vec<String> =
            crate::state::schools::filter_schools(&schools, query).into_iter().map(|s| s.name.clone()).collect();
        assert_eq!(directory, owner, "query {query:?}");
    }
    let f = SearchFilters { query: " bj".to_owned(), ..SearchFilters::default() };
    assert_eq!(f.apply(&schools).len(), 1);
    let f = SearchFilters { query: "bjj ".to_owned(), ..SearchFilters::default() };
    assert!(f.apply(&schools).is_empty());
}

#[test]
fn query_matches_city_and_state_case_insensitively() {
    let s = school("Alpha BJJ", "Austin", "TX");
    assert!(school_matches_query(&s, "AUS"));
    assert!(school_matches_query(&s, "tx"));
    assert!(!school_matches_query(&s, "boston"));
}

#[test]
fn location_matches_zipcode() {
    let mut s = school("Alpha BJJ", "Austin", "TX");
    s.zipcode = Some("78701".to_owned());
    let f = SearchFilters { location: "787".to_owned(), ..SearchFilters::default() };
    assert!(f.matches(&s));
    let f = SearchFilters { location: "Denver".to_owned(), ..SearchFilters::default() };
    assert!(!f.matches(&s));
}

#[test]
fn facets_require_exact_flag() {
    let mut gi_school = school("Alpha BJJ", "Austin", "TX");
    gi_school.has_gi = Some(true);
    let unknown = school("Beta Jiu-Jitsu", "Boston", "MA");

    let want_gi = SearchFilters { has_gi: Some(true), ..SearchFilters::default() };
    assert!(want_gi.matches(&gi_school));
    assert!(!want_gi.matches(&unknown));

    let exclude_gi = SearchFilters { has_gi: Some(false), ..SearchFilters::default() };
    assert!(!exclude_gi.matches(&gi_school));
    assert!(exclude_gi.matches(&unknown));
}

#[test]
fn premium_facet_reads_is_premium() {
    let mut premium = school("Alpha BJJ", "Austin", "TX");
    premium.is_premium = true;
    let f = SearchFilters { is_premium: Some(true), ..SearchFilters::default() };
    assert!(f.matches(&premium));
    assert!(!f.matches(&school("Beta", "Boston", "MA")));
}

#[test]
fn apply_sorts_by_name_in_both_directions() {
    let schools = vec![school("charlie", "A", "A"), school("Alpha", "A", "A"), school("bravo", "A", "A")];
    let asc = SearchFilters { sort_by: SortBy::Name, ..SearchFilters::default() };
    let names: Vec<String> = asc.apply(&schools).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Alpha", "bravo", "charlie"]);

    let desc = SearchFilters { sort_by: SortBy::Name, sort_direction: SortDirection::Desc, ..SearchFilters::default() };
    let names: Vec<String> = desc.apply(&schools).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["charlie", "bravo", "Alpha"]);
}

#[test]
fn apply_keeps_backend_order_for_distance() {
    let schools = vec![school("charlie", "A", "A"), school("Alpha", "A", "A")];
    let names: Vec<String> = SearchFilters::default().apply(&schools).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["charlie", "Alpha"]);
}

// =============================================================
// FilterStore
// =============================================================

#[test]
fn store_update_and_reset() {
    let owner = Owner::new();
    owner.with(|| {
        let store = FilterStore::new();
        store.update_filter(FilterUpdate::Facet(Facet::Gi, Some(true))).unwrap();
        assert_eq!(store.active_filter_count(), 1);
        assert_eq!(store.snapshot().has_gi, Some(true));

        store.reset_filters();
        assert_eq!(store.snapshot(), SearchFilters::default());
        assert_eq!(store.active_filter_count(), 0);
    });
}

#[test]
fn store_rejected_update_leaves_snapshot() {
    let owner = Owner::new();
    owner.with(|| {
        let store = FilterStore::new();
        assert!(store.update_filter(FilterUpdate::Distance(-3.0)).is_err());
        assert_eq!(store.snapshot(), SearchFilters::default());
    });
}
