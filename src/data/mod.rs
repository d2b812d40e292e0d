//! Data module - source loading, normalization and the merged table

mod boundaries;
mod categories;
mod loader;
mod normalize;
mod table;
mod workbook;

pub use boundaries::{RegionBoundaries, RegionShape};
pub use categories::{is_homicide, AgeCategory, Sex, ALL_VALUE, HOMICIDE_CODE_PREFIX, HOMICIDE_MANNER};
pub use loader::{
    DataLoader, LoaderError, MortalityData, SourcePaths, DEFAULT_BOUNDARIES_FILE,
    DEFAULT_CATALOG_SKIP_ROWS, DEFAULT_CAUSE_CATALOG_FILE, DEFAULT_DIVISIONS_FILE,
    DEFAULT_RECORDS_FILE, DEFAULT_RECORDS_SHEET, DIVISION_COLUMNS, RECORD_COLUMNS,
};
pub use normalize::fold_place_name;
pub use table::{
    columns, count_values, i32_values, string_values, FilterOptions, MortalityTable, UNRESOLVED_NAME,
};
pub use workbook::WorkbookError;
