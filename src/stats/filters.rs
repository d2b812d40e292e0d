//! Active dashboard filters and their translation to Polars predicates.

use crate::data::{columns, ALL_VALUE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Conjunctive filter set. `None`, blank or `ALL` means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, rename = "age")]
    pub age_category: Option<String>,
    /// Applies to the region map only.
    #[serde(default)]
    pub manner: Option<String>,
}

impl DashboardFilters {
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_age_category(mut self, category: impl Into<String>) -> Self {
        self.age_category = Some(category.into());
        self
    }

    pub fn with_manner(mut self, manner: impl Into<String>) -> Self {
        self.manner = Some(manner.into());
        self
    }

    /// Combined predicate, or `None` when nothing is restricted.
    pub fn predicate(&self, include_manner: bool) -> Option<Expr> {
        let mut conditions = Vec::new();

        if let Some(sex) = active(&self.sex) {
            conditions.push(col(columns::SEX).eq(lit(sex.to_string())));
        }
        if let Some(region) = active(&self.region) {
            conditions.push(col(columns::REGION).eq(lit(region.to_string())));
        }
        if let Some(category) = active(&self.age_category) {
            conditions.push(col(columns::AGE_CATEGORY).eq(lit(category.to_string())));
        }
        if include_manner {
            if let Some(manner) = active(&self.manner) {
                conditions.push(col(columns::MANNER_KEY).eq(lit(manner.to_uppercase())));
            }
        }

        conditions.into_iter().reduce(|acc, cond| acc.and(cond))
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_all_mean_no_restriction() {
        assert!(DashboardFilters::default().predicate(true).is_none());
        let filters = DashboardFilters::default()
            .with_sex(ALL_VALUE)
            .with_region("  ")
            .with_manner(ALL_VALUE);
        assert!(filters.predicate(true).is_none());
    }

    #[test]
    fn manner_only_applies_when_requested() {
        let filters = DashboardFilters::default().with_manner("Homicidio");
        assert!(filters.predicate(false).is_none());
        assert!(filters.predicate(true).is_some());
    }
}
