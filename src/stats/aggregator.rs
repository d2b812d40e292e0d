//! Aggregator Module
//! Grouped summaries of the mortality table, one per dashboard panel.
//!
//! Every function is a pure projection over a filtered lazy view of the
//! table: no caching, no shared state. Ties are broken by name so repeated
//! calls return identical output.

use super::filters::DashboardFilters;
use crate::data::{
    columns, count_values, i32_values, string_values, AgeCategory, MortalityTable, Sex,
    UNRESOLVED_NAME,
};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Homicide ranking length.
pub const TOP_HOMICIDE_MUNICIPALITIES: usize = 5;
/// Length of the fewest-deaths municipality list.
pub const LEAST_DEATHS_MUNICIPALITIES: usize = 10;
/// Cause ranking length.
pub const TOP_CAUSES: usize = 10;

pub const MISSING_DESCRIPTION: &str = "Descripción no disponible";
pub const MISSING_CODE: &str = "Sin código";

const DEATHS: &str = "deaths";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region_code: String,
    pub region: String,
    pub deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: i32,
    pub deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalityCount {
    pub municipality: String,
    pub region: String,
    pub deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseCount {
    pub code: String,
    pub description: String,
    pub deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SexRegionCount {
    pub region: String,
    pub sex: String,
    pub deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeCategoryCount {
    pub category: AgeCategory,
    pub label: String,
    pub deaths: u64,
}

/// All panels for one filter combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub filters: DashboardFilters,
    pub total_deaths: u64,
    pub regions: Vec<RegionCount>,
    pub monthly: Vec<MonthlyCount>,
    pub top_homicide_municipalities: Vec<MunicipalityCount>,
    pub least_deaths_municipalities: Vec<MunicipalityCount>,
    pub top_causes: Vec<CauseCount>,
    pub sex_by_region: Vec<SexRegionCount>,
    pub age_histogram: Vec<AgeCategoryCount>,
}

/// Stateless aggregation entry points.
pub struct Aggregator;

impl Aggregator {
    /// Rows matching the filters (manner excluded, as for every panel but the map).
    pub fn total_deaths(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<u64, AggregateError> {
        let df = Self::filtered(table, filters, false)
            .select([len().alias(DEATHS)])
            .collect()?;
        Ok(count_values(&df, DEATHS)?.first().copied().unwrap_or(0))
    }

    /// Deaths per region for the choropleth; honors the manner filter.
    pub fn region_counts(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<Vec<RegionCount>, AggregateError> {
        let df = Self::filtered(table, filters, true)
            .filter(col(columns::REGION_CODE).is_not_null())
            .group_by([col(columns::REGION_CODE), col(columns::REGION)])
            .agg([len().alias(DEATHS)])
            .sort_by_exprs(
                [col(DEATHS), col(columns::REGION_CODE), col(columns::REGION)],
                Self::order([true, false, false]),
            )
            .collect()?;

        let codes = string_values(&df, columns::REGION_CODE)?;
        let names = string_values(&df, columns::REGION)?;
        let deaths = count_values(&df, DEATHS)?;

        Ok(codes
            .into_iter()
            .zip(names)
            .zip(deaths)
            .filter_map(|((code, name), deaths)| {
                Some(RegionCount {
                    region_code: code?,
                    region: name.unwrap_or_else(|| UNRESOLVED_NAME.to_string()),
                    deaths,
                })
            })
            .collect())
    }

    /// Deaths per calendar month, ascending; months outside 1..=12 are dropped.
    pub fn monthly_counts(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<Vec<MonthlyCount>, AggregateError> {
        let df = Self::filtered(table, filters, false)
            .filter(
                col(columns::MONTH)
                    .gt_eq(lit(1))
                    .and(col(columns::MONTH).lt_eq(lit(12))),
            )
            .group_by([col(columns::MONTH)])
            .agg([len().alias(DEATHS)])
            .sort_by_exprs([col(columns::MONTH)], Self::order([false]))
            .collect()?;

        let months = i32_values(&df, columns::MONTH)?;
        let deaths = count_values(&df, DEATHS)?;

        Ok(months
            .into_iter()
            .zip(deaths)
            .filter_map(|(month, deaths)| Some(MonthlyCount { month: month?, deaths }))
            .collect())
    }

    /// Municipalities with the most homicides (manner HOMICIDIO and code X95*).
    pub fn top_homicide_municipalities(
        table: &MortalityTable,
        filters: &DashboardFilters,
        n: usize,
    ) -> Result<Vec<MunicipalityCount>, AggregateError> {
        let lf = Self::filtered(table, filters, false).filter(col(columns::IS_HOMICIDE));
        Self::municipality_ranking(lf, n, true)
    }

    /// Municipalities with the fewest recorded deaths.
    pub fn least_deaths_municipalities(
        table: &MortalityTable,
        filters: &DashboardFilters,
        n: usize,
    ) -> Result<Vec<MunicipalityCount>, AggregateError> {
        let lf = Self::filtered(table, filters, false);
        Self::municipality_ranking(lf, n, false)
    }

    /// Most frequent causes with their catalog description.
    pub fn top_causes(
        table: &MortalityTable,
        filters: &DashboardFilters,
        n: usize,
    ) -> Result<Vec<CauseCount>, AggregateError> {
        let df = Self::filtered(table, filters, false)
            .group_by([col(columns::CAUSE_CODE), col(columns::CAUSE_DESCRIPTION)])
            .agg([len().alias(DEATHS)])
            .sort_by_exprs(
                [col(DEATHS), col(columns::CAUSE_CODE)],
                Self::order([true, false]),
            )
            .limit(n as IdxSize)
            .collect()?;

        let codes = string_values(&df, columns::CAUSE_CODE)?;
        let descriptions = string_values(&df, columns::CAUSE_DESCRIPTION)?;
        let deaths = count_values(&df, DEATHS)?;

        Ok(codes
            .into_iter()
            .zip(descriptions)
            .zip(deaths)
            .map(|((code, description), deaths)| CauseCount {
                code: code.unwrap_or_else(|| MISSING_CODE.to_string()),
                description: description.unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
                deaths,
            })
            .collect())
    }

    /// Deaths per (region, sex) for the stacked bar chart.
    pub fn sex_by_region(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<Vec<SexRegionCount>, AggregateError> {
        let df = Self::filtered(table, filters, false)
            .group_by([col(columns::REGION), col(columns::SEX)])
            .agg([len().alias(DEATHS)])
            .sort_by_exprs(
                [col(DEATHS), col(columns::REGION), col(columns::SEX)],
                Self::order([true, false, false]),
            )
            .collect()?;

        let regions = string_values(&df, columns::REGION)?;
        let sexes = string_values(&df, columns::SEX)?;
        let deaths = count_values(&df, DEATHS)?;

        Ok(regions
            .into_iter()
            .zip(sexes)
            .zip(deaths)
            .map(|((region, sex), deaths)| SexRegionCount {
                region: region.unwrap_or_else(|| UNRESOLVED_NAME.to_string()),
                sex: sex.unwrap_or_else(|| Sex::Unknown.label().to_string()),
                deaths,
            })
            .collect())
    }

    /// Deaths per age category present, in bucket order.
    pub fn age_histogram(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<Vec<AgeCategoryCount>, AggregateError> {
        let df = Self::filtered(table, filters, false)
            .group_by([col(columns::AGE_CATEGORY)])
            .agg([len().alias(DEATHS)])
            .collect()?;

        let labels = string_values(&df, columns::AGE_CATEGORY)?;
        let deaths = count_values(&df, DEATHS)?;

        let mut rows: Vec<AgeCategoryCount> = labels
            .into_iter()
            .zip(deaths)
            .map(|(label, deaths)| {
                let category = label
                    .as_deref()
                    .and_then(AgeCategory::from_label)
                    .unwrap_or(AgeCategory::Unknown);
                AgeCategoryCount {
                    category,
                    label: category.label().to_string(),
                    deaths,
                }
            })
            .collect();
        rows.sort_by_key(|row| row.category.rank());
        Ok(rows)
    }

    /// Every panel for one filter combination.
    pub fn summary(
        table: &MortalityTable,
        filters: &DashboardFilters,
    ) -> Result<DashboardSummary, AggregateError> {
        Ok(DashboardSummary {
            filters: filters.clone(),
            total_deaths: Self::total_deaths(table, filters)?,
            regions: Self::region_counts(table, filters)?,
            monthly: Self::monthly_counts(table, filters)?,
            top_homicide_municipalities: Self::top_homicide_municipalities(
                table,
                filters,
                TOP_HOMICIDE_MUNICIPALITIES,
            )?,
            least_deaths_municipalities: Self::least_deaths_municipalities(
                table,
                filters,
                LEAST_DEATHS_MUNICIPALITIES,
            )?,
            top_causes: Self::top_causes(table, filters, TOP_CAUSES)?,
            sex_by_region: Self::sex_by_region(table, filters)?,
            age_histogram: Self::age_histogram(table, filters)?,
        })
    }

    fn filtered(table: &MortalityTable, filters: &DashboardFilters, include_manner: bool) -> LazyFrame {
        let lf = table.lazy();
        match filters.predicate(include_manner) {
            Some(predicate) => lf.filter(predicate),
            None => lf,
        }
    }

    fn municipality_ranking(
        lf: LazyFrame,
        n: usize,
        most_first: bool,
    ) -> Result<Vec<MunicipalityCount>, AggregateError> {
        let df = lf
            .filter(col(columns::MUNICIPALITY).neq(lit(UNRESOLVED_NAME)))
            .group_by([col(columns::MUNICIPALITY), col(columns::REGION)])
            .agg([len().alias(DEATHS)])
            .sort_by_exprs(
                [col(DEATHS), col(columns::MUNICIPALITY), col(columns::REGION)],
                Self::order([most_first, false, false]),
            )
            .limit(n as IdxSize)
            .collect()?;

        let municipalities = string_values(&df, columns::MUNICIPALITY)?;
        let regions = string_values(&df, columns::REGION)?;
        let deaths = count_values(&df, DEATHS)?;

        Ok(municipalities
            .into_iter()
            .zip(regions)
            .zip(deaths)
            .filter(|(_, deaths)| *deaths > 0)
            .filter_map(|((municipality, region), deaths)| {
                Some(MunicipalityCount {
                    municipality: municipality?,
                    region: region.unwrap_or_else(|| UNRESOLVED_NAME.to_string()),
                    deaths,
                })
            })
            .collect())
    }

    fn order<const N: usize>(descending: [bool; N]) -> SortMultipleOptions {
        SortMultipleOptions::default()
            .with_order_descending_multi(descending)
            .with_nulls_last(true)
            .with_maintain_order(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    /// (dane code, sex, age group, cause code, manner, month)
    type Row = (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str);

    fn table(rows: &[Row]) -> MortalityTable {
        let pick = |f: fn(&Row) -> String| rows.iter().map(f).collect::<Vec<_>>();
        let records = df!(
            "COD_DANE" => pick(|r| r.0.to_string()),
            "COD_DEPARTAMENTO" => pick(|r| r.0[..2].to_string()),
            "COD_MUNICIPIO" => pick(|r| r.0[2..].to_string()),
            "SEXO" => pick(|r| r.1.to_string()),
            "GRUPO_EDAD1" => pick(|r| r.2.to_string()),
            "COD_MUERTE" => pick(|r| r.3.to_string()),
            "MANERA_MUERTE" => pick(|r| r.4.to_string()),
            "MES" => pick(|r| r.5.to_string())
        )
        .unwrap();
        let divisions = df!(
            "COD_DANE" => ["05001", "05002", "11001", "76001"],
            "COD_DEPARTAMENTO" => ["05", "05", "11", "76"],
            "DEPARTAMENTO" => ["ANTIOQUIA", "ANTIOQUIA", "BOGOTÁ, D.C.", "VALLE DEL CAUCA"],
            "MUNICIPIO" => ["MEDELLÍN", "ABEJORRAL", "BOGOTÁ, D.C.", "CALI"]
        )
        .unwrap();
        let causes = df!(
            "column_1" => ["20", "09"],
            "column_2" => ["Causas externas", "Circulatorio"],
            "column_3" => ["X95", "I21"],
            "column_4" => ["Agresión con disparo", "Infarto agudo"],
            "column_5" => ["X954", "I219"],
            "column_6" => ["Agresión con disparo, calle", "Infarto agudo del miocardio"]
        )
        .unwrap();
        DataLoader::build_table(&records, &causes, &divisions).unwrap()
    }

    fn sample() -> MortalityTable {
        table(&[
            ("05001", "1", "13", "X954", "Homicidio", "1"),
            ("05001", "1", "12", "X954", "Homicidio", "1"),
            ("05001", "2", "21", "I219", "Natural", "2"),
            ("05002", "2", "22", "I219", "Natural", "3"),
            ("11001", "1", "13", "X954", "Homicidio", "3"),
            ("11001", "2", "20", "I219", "Natural", "3"),
            ("11001", "1", "14", "X990", "Homicidio", "4"),
            ("76001", "1", "14", "X954", "Accidente", "5"),
            ("76001", "2", "29", "R99X", "Natural", "5"),
            ("99999", "1", "27", "I219", "Natural", "6"),
        ])
    }

    #[test]
    fn empty_filters_cover_every_row() {
        let table = sample();
        let filters = DashboardFilters::default();
        assert_eq!(Aggregator::total_deaths(&table, &filters).unwrap(), table.len() as u64);

        let by_region: u64 = Aggregator::region_counts(&table, &filters)
            .unwrap()
            .iter()
            .map(|r| r.deaths)
            .sum();
        let by_sex: u64 = Aggregator::sex_by_region(&table, &filters)
            .unwrap()
            .iter()
            .map(|r| r.deaths)
            .sum();
        let by_age: u64 = Aggregator::age_histogram(&table, &filters)
            .unwrap()
            .iter()
            .map(|r| r.deaths)
            .sum();
        assert_eq!(by_region, 10);
        assert_eq!(by_sex, 10);
        assert_eq!(by_age, 10);
    }

    #[test]
    fn unmatched_filters_yield_empty_results() {
        let table = sample();
        let filters = DashboardFilters::default().with_region("ATLANTIS");
        let summary = Aggregator::summary(&table, &filters).unwrap();
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
    fn region_counts_apply_manner_case_insensitively() {
        let table = sample();
        let filters = DashboardFilters::default().with_manner("homicidio");
        let regions = Aggregator::region_counts(&table, &filters).unwrap();
        assert_eq!(
            regions,
            vec![
                RegionCount {
                    region_code: "05".into(),
                    region: "ANTIOQUIA".into(),
                    deaths: 2
                },
                RegionCount {
                    region_code: "11".into(),
                    region: "BOGOTÁ, D.C.".into(),
                    deaths: 2
                },
            ]
        );
    }

    #[test]
    fn manner_filter_does_not_touch_other_panels() {
        let table = sample();
        let filters = DashboardFilters::default().with_manner("Homicidio");
        assert_eq!(Aggregator::total_deaths(&table, &filters).unwrap(), 10);
        assert_eq!(Aggregator::monthly_counts(&table, &filters).unwrap().len(), 6);
    }

    #[test]
    fn monthly_counts_are_ascending() {
        let table = sample();
        let monthly = Aggregator::monthly_counts(&table, &DashboardFilters::default()).unwrap();
        let months: Vec<i32> = monthly.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(monthly[2].deaths, 3);
    }

    #[test]
    fn homicide_ranking_requires_manner_and_code() {
        let table = sample();
        let top = Aggregator::top_homicide_municipalities(
            &table,
            &DashboardFilters::default(),
            TOP_HOMICIDE_MUNICIPALITIES,
        )
        .unwrap();
        assert_eq!(
            top,
            vec![
                MunicipalityCount {
                    municipality: "MEDELLÍN".into(),
                    region: "ANTIOQUIA".into(),
                    deaths: 2
                },
                MunicipalityCount {
                    municipality: "BOGOTÁ, D.C.".into(),
                    region: "BOGOTÁ, D.C.".into(),
                    deaths: 1
                },
            ]
        );
        assert!(top.iter().all(|m| m.municipality != "CALI"));
    }

    #[test]
    fn least_deaths_excludes_unresolved_municipalities() {
        let table = sample();
        let least = Aggregator::least_deaths_municipalities(&table, &DashboardFilters::default(), 2)
            .unwrap();
        assert_eq!(least.len(), 2);
        assert_eq!(least[0].municipality, "ABEJORRAL");
        assert_eq!(least[0].deaths, 1);
        assert_eq!(least[1].municipality, "CALI");
        assert!(least.iter().all(|m| m.municipality != UNRESOLVED_NAME));
    }

    #[test]
    fn top_causes_fill_missing_descriptions() {
        let table = sample();
        let causes = Aggregator::top_causes(&table, &DashboardFilters::default(), TOP_CAUSES).unwrap();
        assert_eq!(causes[0].code, "I219");
        assert_eq!(causes[0].deaths, 4);
        assert_eq!(causes[1].code, "X954");
        let unknown = causes.iter().find(|c| c.code == "R99X").unwrap();
        assert_eq!(unknown.description, MISSING_DESCRIPTION);
    }

    #[test]
    fn filters_combine_conjunctively() {
        let table = sample();
        let filters = DashboardFilters::default()
            .with_sex("Femenino")
            .with_region("ANTIOQUIA");
        assert_eq!(Aggregator::total_deaths(&table, &filters).unwrap(), 2);

        let filters = filters.with_age_category("Juventud");
        assert_eq!(Aggregator::total_deaths(&table, &filters).unwrap(), 0);
    }

    #[test]
    fn age_histogram_for_one_region() {
        let table = table(&[
            ("05001", "1", "5", "I219", "Natural", "1"),
            ("05001", "2", "21", "I219", "Natural", "1"),
            ("05001", "1", "28", "I219", "Natural", "1"),
            ("11001", "1", "21", "I219", "Natural", "1"),
        ]);
        let filters = DashboardFilters::default().with_region("ANTIOQUIA");
        let histogram = Aggregator::age_histogram(&table, &filters).unwrap();
        let categories: Vec<AgeCategory> = histogram.iter().map(|h| h.category).collect();
        assert_eq!(
            categories,
            vec![AgeCategory::Infant, AgeCategory::OldAge, AgeCategory::Longevity]
        );
        assert!(histogram.iter().all(|h| h.deaths == 1));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let table = sample();
        let filters = DashboardFilters::default().with_sex("Masculino");
        let first = Aggregator::summary(&table, &filters).unwrap();
        let second = Aggregator::summary(&table, &filters).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn region_ties_on_code_are_ordered_by_name() {
        // 05999 is not in the division catalog but keeps department 05.
        let table = table(&[
            ("05999", "1", "21", "I219", "Natural", "1"),
            ("05001", "1", "21", "I219", "Natural", "1"),
        ]);
        let filters = DashboardFilters::default();
        let expected = vec![
            RegionCount {
                region_code: "05".into(),
                region: "ANTIOQUIA".into(),
                deaths: 1,
            },
            RegionCount {
                region_code: "05".into(),
                region: UNRESOLVED_NAME.into(),
                deaths: 1,
            },
        ];
        for _ in 0..200 {
            assert_eq!(Aggregator::region_counts(&table, &filters).unwrap(), expected);
        }
    }

    #[test]
    fn out_of_range_months_are_dropped() {
        let table = table(&[
            ("05001", "1", "21", "I219", "Natural", "1"),
            ("05001", "1", "21", "I219", "Natural", "12"),
            ("05001", "1", "21", "I219", "Natural", "13"),
            ("05001", "1", "21", "I219", "Natural", "0"),
            ("05001", "1", "21", "I219", "Natural", "-2147483648"),
        ]);
        let monthly = Aggregator::monthly_counts(&table, &DashboardFilters::default()).unwrap();
        let months: Vec<i32> = monthly.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 12]);
    }
}
