mod common;

use common::{fixture, fixture_with_records};
use mortality_dashboard::data::{AgeCategory, ALL_VALUE};
use mortality_dashboard::stats::{
    Aggregator, DashboardFilters, MISSING_DESCRIPTION, TOP_CAUSES, TOP_HOMICIDE_MUNICIPALITIES,
};

#[test]
fn unfiltered_total_is_the_row_count() {
    let data = fixture().load();
    let total = Aggregator::total_deaths(&data.table, &DashboardFilters::default()).unwrap();
    assert_eq!(total, data.table.len() as u64);

    let all = DashboardFilters::default()
        .with_sex(ALL_VALUE)
        .with_region(ALL_VALUE)
        .with_age_category(ALL_VALUE);
    assert_eq!(Aggregator::total_deaths(&data.table, &all).unwrap(), 9);
}

#[test]
fn unmatched_filters_give_empty_results() {
    let data = fixture().load();
    let filters = DashboardFilters::default().with_region("ATLÁNTIDA");
    let summary = Aggregator::summary(&data.table, &filters).unwrap();

    assert_eq!(summary.total_deaths, 0);
    assert!(summary.regions.is_empty());
    assert!(summary.monthly.is_empty());
    assert!(summary.top_homicide_municipalities.is_empty());
    assert!(summary.least_deaths_municipalities.is_empty());
    assert!(summary.top_causes.is_empty());
    assert!(summary.sex_by_region.is_empty());
    assert!(summary.age_histogram.is_empty());
}

#[test]
fn homicide_ranking_requires_manner_and_firearm_code() {
    let data = fixture().load();
    let rows = Aggregator::top_homicide_municipalities(
        &data.table,
        &DashboardFilters::default(),
        TOP_HOMICIDE_MUNICIPALITIES,
    )
    .unwrap();

    let ranked: Vec<(&str, u64)> = rows.iter().map(|r| (r.municipality.as_str(), r.deaths)).collect();
    // Cali's X95 death is an accident and Bogotá's X990 homicide is not a firearm code.
    assert_eq!(ranked, vec![("MEDELLÍN", 2), ("BOGOTÁ, D.C.", 1)]);
}

#[test]
fn least_deaths_skip_unresolved_divisions() {
    let data = fixture().load();
    let rows = Aggregator::least_deaths_municipalities(&data.table, &DashboardFilters::default(), 10)
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.municipality.as_str()).collect();
    assert_eq!(names, vec!["ABEJORRAL", "CALI", "BOGOTÁ, D.C.", "MEDELLÍN"]);
}

#[test]
fn unmatched_causes_keep_their_rows() {
    let data = fixture().load();
    let causes = Aggregator::top_causes(&data.table, &DashboardFilters::default(), TOP_CAUSES).unwrap();

    assert_eq!(causes[0].code, "X954");
    assert_eq!(causes[0].deaths, 4);
    assert_eq!(causes[0].description, "Agresión con disparo, calle");
    let missing = causes.iter().find(|c| c.code == "R99X").expect("R99X is listed");
    assert_eq!(missing.description, MISSING_DESCRIPTION);
    assert_eq!(causes.iter().map(|c| c.deaths).sum::<u64>(), 9);
}

#[test]
fn map_honors_manner_but_other_panels_do_not() {
    let data = fixture().load();
    let filters = DashboardFilters::default().with_manner("homicidio");

    let regions = Aggregator::region_counts(&data.table, &filters).unwrap();
    let deaths: Vec<(&str, u64)> = regions.iter().map(|r| (r.region.as_str(), r.deaths)).collect();
    // Ties are ordered by region code.
    assert_eq!(deaths, vec![("ANTIOQUIA", 2), ("BOGOTÁ, D.C.", 2)]);

    assert_eq!(Aggregator::total_deaths(&data.table, &filters).unwrap(), 9);
}

#[test]
fn age_buckets_span_infants_to_centenarians() {
    let fx = fixture_with_records(
        "2019,05001,05,001,1,1,5,I219,Natural\n\
         2019,05001,05,001,1,1,21,I219,Natural\n\
         2019,05001,05,001,1,2,28,I219,Natural\n",
    );
    let data = fx.load();
    let histogram = Aggregator::age_histogram(&data.table, &DashboardFilters::default()).unwrap();

    let buckets: Vec<(AgeCategory, u64)> = histogram.iter().map(|r| (r.category, r.deaths)).collect();
    assert_eq!(
        buckets,
        vec![
            (AgeCategory::Infant, 1),
            (AgeCategory::OldAge, 1),
            (AgeCategory::Longevity, 1),
        ]
    );
}

#[test]
fn repeated_aggregation_is_identical() {
    let data = fixture().load();
    let filters = DashboardFilters::default().with_sex("Masculino");
    let first = Aggregator::summary(&data.table, &filters).unwrap();
    let second = Aggregator::summary(&data.table, &filters).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.total_deaths, 5);
}
