//! The merged mortality table and the filter options derived from it.

use super::categories::AgeCategory;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// Column names of the merged table.
pub mod columns {
    pub const DANE_CODE: &str = "dane_code";
    pub const REGION_CODE: &str = "region_code";
    pub const MUNICIPALITY_CODE: &str = "municipality_code";
    pub const REGION: &str = "region";
    pub const MUNICIPALITY: &str = "municipality";
    pub const SEX_CODE: &str = "sex_code";
    pub const SEX: &str = "sex";
    pub const AGE_GROUP: &str = "age_group";
    pub const AGE_CATEGORY: &str = "age_category";
    pub const CAUSE_CODE: &str = "cause_code";
    pub const CAUSE_DESCRIPTION: &str = "cause_description";
    pub const CAUSE_CODE_3: &str = "cause_code_3";
    pub const CAUSE_DESCRIPTION_3: &str = "cause_description_3";
    pub const CAUSE_CHAPTER: &str = "cause_chapter";
    pub const CAUSE_CHAPTER_NAME: &str = "cause_chapter_name";
    pub const MANNER: &str = "manner";
    pub const MANNER_KEY: &str = "manner_key";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const IS_HOMICIDE: &str = "is_homicide";
}

/// Name given to divisions whose code has no catalog entry.
pub const UNRESOLVED_NAME: &str = "SIN REGISTRO";

/// Values offered by the dashboard dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub sexes: Vec<String>,
    pub regions: Vec<String>,
    pub age_categories: Vec<String>,
    pub manners: Vec<String>,
}

impl FilterOptions {
    fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let distinct = |name: &str| -> PolarsResult<Vec<String>> {
            let set: BTreeSet<String> = string_values(df, name)?.into_iter().flatten().collect();
            Ok(set.into_iter().collect())
        };

        let present: BTreeSet<String> = string_values(df, columns::AGE_CATEGORY)?
            .into_iter()
            .flatten()
            .collect();
        let age_categories = AgeCategory::ORDER
            .iter()
            .map(|cat| cat.label().to_string())
            .filter(|label| present.contains(label))
            .collect();

        Ok(Self {
            sexes: distinct(columns::SEX)?,
            regions: distinct(columns::REGION)?,
            age_categories,
            manners: distinct(columns::MANNER)?,
        })
    }
}

/// Immutable, denormalized death records built once at startup.
///
/// Cloning is cheap: polars columns are reference counted.
#[derive(Debug, Clone)]
pub struct MortalityTable {
    df: DataFrame,
    options: FilterOptions,
}

impl MortalityTable {
    pub fn new(df: DataFrame) -> PolarsResult<Self> {
        let options = FilterOptions::from_frame(&df)?;
        Ok(Self { df, options })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Lazy view over the table; the underlying data is never mutated.
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Read a column as optional strings, casting if needed.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read a column as optional `i32`s, casting if needed.
pub fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}

/// Read a count column (as produced by `len()`) as `u64`s; nulls count as zero.
pub fn count_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<u64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    Ok(series
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect())
}
