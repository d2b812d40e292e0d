//! Stats module - filtered aggregations of the mortality table

mod aggregator;
mod filters;

pub use aggregator::{
    AgeCategoryCount, AggregateError, Aggregator, CauseCount, DashboardSummary, MonthlyCount,
    MunicipalityCount, RegionCount, SexRegionCount, LEAST_DEATHS_MUNICIPALITIES,
    MISSING_CODE, MISSING_DESCRIPTION, TOP_CAUSES, TOP_HOMICIDE_MUNICIPALITIES,
};
pub use filters::DashboardFilters;
