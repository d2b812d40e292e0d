//! Mortality Data Loader Module
//! Reads the four static sources with Polars and joins them into one table.

use super::boundaries::RegionBoundaries;
use super::categories::{is_homicide, AgeCategory, Sex};
use super::normalize::{clean_text, normalize_numeric_code, parse_integer, upper_text};
use super::table::{columns, string_values, MortalityTable, UNRESOLVED_NAME};
use super::workbook::{self, WorkbookError};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns the records source must provide.
pub const RECORD_COLUMNS: [&str; 8] = [
    "COD_DANE",
    "COD_DEPARTAMENTO",
    "COD_MUNICIPIO",
    "SEXO",
    "GRUPO_EDAD1",
    "COD_MUERTE",
    "MANERA_MUERTE",
    "MES",
];

/// Columns the division catalog must provide.
pub const DIVISION_COLUMNS: [&str; 4] = ["COD_DANE", "COD_DEPARTAMENTO", "DEPARTAMENTO", "MUNICIPIO"];

/// Positional layout of the cause catalog.
const CAUSE_CATALOG_LAYOUT: [&str; 6] = [
    "chapter",
    "chapter name",
    "3-character code",
    "3-character description",
    "4-character code",
    "4-character description",
];

const YEAR_COLUMN: &str = "AÑO";
const DIVISION_REGION_CODE: &str = "division_region_code";
const RECORD_REGION_CODE: &str = "record_region_code";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Required source file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to read workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: WorkbookError,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid boundary file {}: {source}", path.display())]
    Boundaries {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn {
        source_name: &'static str,
        column: String,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub const DEFAULT_RECORDS_FILE: &str = "Anexo1.NoFetal2019_CE_15-03-23.xlsx";
pub const DEFAULT_CAUSE_CATALOG_FILE: &str = "Anexo2.CodigosDeMuerte_CE_15-03-23.xlsx";
pub const DEFAULT_DIVISIONS_FILE: &str = "Divipola_CE_.xlsx";
pub const DEFAULT_BOUNDARIES_FILE: &str = "colombia_departamentos.geojson";
/// Sheet holding the death records inside the records workbook.
pub const DEFAULT_RECORDS_SHEET: &str = "No_Fetales_2019";
pub const DEFAULT_CATALOG_SKIP_ROWS: usize = 5;

/// Locations of the four static inputs.
///
/// Tabular sources may be workbooks (`.xlsx`, `.xls`, `.ods`, ...) or CSV
/// exports; the extension decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub records: PathBuf,
    pub cause_catalog: PathBuf,
    pub divisions: PathBuf,
    pub boundaries: PathBuf,
    /// Records sheet; `None` reads the first sheet.
    pub records_sheet: Option<String>,
    /// Preamble rows above the cause catalog's data.
    pub catalog_skip_rows: usize,
}

impl SourcePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            records: dir.join(DEFAULT_RECORDS_FILE),
            cause_catalog: dir.join(DEFAULT_CAUSE_CATALOG_FILE),
            divisions: dir.join(DEFAULT_DIVISIONS_FILE),
            boundaries: dir.join(DEFAULT_BOUNDARIES_FILE),
            records_sheet: Some(DEFAULT_RECORDS_SHEET.to_string()),
            catalog_skip_rows: DEFAULT_CATALOG_SKIP_ROWS,
        }
    }

    fn all(&self) -> [&Path; 4] {
        [
            &self.records,
            &self.cause_catalog,
            &self.divisions,
            &self.boundaries,
        ]
    }
}

/// Everything the dashboard needs, loaded once per process.
#[derive(Debug, Clone)]
pub struct MortalityData {
    pub table: MortalityTable,
    pub boundaries: RegionBoundaries,
}

/// Loads and joins the mortality sources.
pub struct DataLoader;

impl DataLoader {
    /// Load every source; any missing or malformed input is an error.
    pub fn load(paths: &SourcePaths) -> Result<MortalityData, LoaderError> {
        if let Some(missing) = paths.all().into_iter().find(|p| !p.exists()) {
            return Err(LoaderError::MissingFile(missing.to_path_buf()));
        }

        let records = Self::read_table(&paths.records, paths.records_sheet.as_deref(), true, 0)?;
        log::info!("Read {} death records from {}", records.height(), paths.records.display());
        let causes = Self::read_table(&paths.cause_catalog, None, false, paths.catalog_skip_rows)?;
        log::info!("Read {} cause catalog rows from {}", causes.height(), paths.cause_catalog.display());
        let divisions = Self::read_table(&paths.divisions, None, true, 0)?;
        log::info!("Read {} division rows from {}", divisions.height(), paths.divisions.display());

        let table = Self::build_table(&records, &causes, &divisions)?;
        let boundaries = Self::load_boundaries(&paths.boundaries)?;
        if boundaries.is_empty() {
            log::warn!("{} has no features; the map will be empty", paths.boundaries.display());
        }
        log::info!(
            "Loaded {} region boundaries from {}",
            boundaries.shapes().len(),
            paths.boundaries.display()
        );

        let unmatched: Vec<&str> = table
            .options()
            .regions
            .iter()
            .filter(|r| r.as_str() != UNRESOLVED_NAME && boundaries.shape_for(r).is_none())
            .map(String::as_str)
            .collect();
        if !unmatched.is_empty() {
            log::warn!("Regions without a boundary shape: {}", unmatched.join(", "));
        }

        Ok(MortalityData { table, boundaries })
    }

    /// Read a workbook sheet or a CSV file as all-text columns.
    pub fn read_table(
        path: &Path,
        sheet: Option<&str>,
        has_header: bool,
        skip_rows: usize,
    ) -> Result<DataFrame, LoaderError> {
        if !workbook::is_workbook(path) {
            return Self::read_text_csv(path, has_header, skip_rows);
        }
        workbook::read_sheet(path, sheet, has_header, skip_rows).map_err(|source| {
            LoaderError::Workbook {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Read a CSV with every column as text so codes keep their leading zeros.
    pub fn read_text_csv(
        path: &Path,
        has_header: bool,
        skip_rows: usize,
    ) -> Result<DataFrame, LoaderError> {
        LazyCsvReader::new(path)
            .with_has_header(has_header)
            .with_skip_rows(skip_rows)
            .with_infer_schema_length(Some(0))
            .with_encoding(CsvEncoding::LossyUtf8)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load_boundaries(path: &Path) -> Result<RegionBoundaries, LoaderError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        RegionBoundaries::from_geojson_str(&text).map_err(|source| LoaderError::Boundaries {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Normalize the raw frames and left-join names and cause descriptions
    /// onto the records.
    pub fn build_table(
        records: &DataFrame,
        causes: &DataFrame,
        divisions: &DataFrame,
    ) -> Result<MortalityTable, LoaderError> {
        let records = Self::prepare_records(records)?;
        let divisions = Self::prepare_divisions(divisions)?;
        let causes = Self::prepare_causes(causes)?;

        let joined = records
            .lazy()
            .join(
                divisions.lazy(),
                [col(columns::DANE_CODE)],
                [col(columns::DANE_CODE)],
                JoinArgs::new(JoinType::Left),
            )
            .join(
                causes.lazy(),
                [col(columns::CAUSE_CODE)],
                [col(columns::CAUSE_CODE)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()?;

        Self::report_join_quality(&joined)?;

        let merged = joined
            .lazy()
            .with_columns([
                col(DIVISION_REGION_CODE)
                    .fill_null(col(RECORD_REGION_CODE))
                    .alias(columns::REGION_CODE),
                col(columns::REGION).fill_null(lit(UNRESOLVED_NAME)),
                col(columns::MUNICIPALITY).fill_null(lit(UNRESOLVED_NAME)),
            ])
            .select([
                col(columns::DANE_CODE),
                col(columns::REGION_CODE),
                col(columns::MUNICIPALITY_CODE),
                col(columns::REGION),
                col(columns::MUNICIPALITY),
                col(columns::SEX_CODE),
                col(columns::SEX),
                col(columns::AGE_GROUP),
                col(columns::AGE_CATEGORY),
                col(columns::CAUSE_CODE),
                col(columns::CAUSE_DESCRIPTION),
                col(columns::CAUSE_CODE_3),
                col(columns::CAUSE_DESCRIPTION_3),
                col(columns::CAUSE_CHAPTER),
                col(columns::CAUSE_CHAPTER_NAME),
                col(columns::MANNER),
                col(columns::MANNER_KEY),
                col(columns::YEAR),
                col(columns::MONTH),
                col(columns::IS_HOMICIDE),
            ])
            .collect()?;

        log::debug!("Merged table: {} rows, {} columns", merged.height(), merged.width());
        Ok(MortalityTable::new(merged)?)
    }

    fn prepare_records(raw: &DataFrame) -> Result<DataFrame, LoaderError> {
        let text = |name: &str| Self::required_text(raw, "records source", name);

        let dane_codes: Vec<Option<String>> = text("COD_DANE")?
            .iter()
            .map(|v| normalize_numeric_code(v.as_deref(), 5))
            .collect();
        let region_codes: Vec<Option<String>> = text("COD_DEPARTAMENTO")?
            .iter()
            .map(|v| normalize_numeric_code(v.as_deref(), 2))
            .collect();
        let municipality_codes: Vec<Option<String>> = text("COD_MUNICIPIO")?
            .iter()
            .map(|v| normalize_numeric_code(v.as_deref(), 3))
            .collect();

        let sex_codes: Vec<Option<i32>> = text("SEXO")?
            .iter()
            .map(|v| to_i32(v.as_deref()))
            .collect();
        let sexes: Vec<String> = sex_codes
            .iter()
            .map(|&code| Sex::from_code(code).label().to_string())
            .collect();

        let age_groups: Vec<Option<i32>> = text("GRUPO_EDAD1")?
            .iter()
            .map(|v| to_i32(v.as_deref()))
            .collect();
        let age_categories: Vec<String> = age_groups
            .iter()
            .map(|&code| AgeCategory::from_group_code(code).label().to_string())
            .collect();

        let cause_codes: Vec<Option<String>> = text("COD_MUERTE")?
            .iter()
            .map(|v| upper_text(v.as_deref()))
            .collect();
        let manners: Vec<Option<String>> = text("MANERA_MUERTE")?
            .iter()
            .map(|v| clean_text(v.as_deref()))
            .collect();
        let manner_keys: Vec<Option<String>> = manners
            .iter()
            .map(|m| m.as_ref().map(|m| m.to_uppercase()))
            .collect();
        let homicides: Vec<bool> = manners
            .iter()
            .zip(&cause_codes)
            .map(|(manner, code)| is_homicide(manner.as_deref(), code.as_deref()))
            .collect();

        let months: Vec<Option<i32>> = text("MES")?
            .iter()
            .map(|v| to_i32(v.as_deref()))
            .collect();
        let years: Vec<Option<i32>> = if has_column(raw, YEAR_COLUMN) {
            string_values(raw, YEAR_COLUMN)?
                .iter()
                .map(|v| to_i32(v.as_deref()))
                .collect()
        } else {
            vec![None; raw.height()]
        };

        let df = DataFrame::new(vec![
            Column::new(columns::DANE_CODE.into(), dane_codes),
            Column::new(RECORD_REGION_CODE.into(), region_codes),
            Column::new(columns::MUNICIPALITY_CODE.into(), municipality_codes),
            Column::new(columns::SEX_CODE.into(), sex_codes),
            Column::new(columns::SEX.into(), sexes),
            Column::new(columns::AGE_GROUP.into(), age_groups),
            Column::new(columns::AGE_CATEGORY.into(), age_categories),
            Column::new(columns::CAUSE_CODE.into(), cause_codes),
            Column::new(columns::MANNER.into(), manners),
            Column::new(columns::MANNER_KEY.into(), manner_keys),
            Column::new(columns::YEAR.into(), years),
            Column::new(columns::MONTH.into(), months),
            Column::new(columns::IS_HOMICIDE.into(), homicides),
        ])?;

        Ok(df)
    }

    /// One row per DANE code; the first catalog row wins.
    fn prepare_divisions(raw: &DataFrame) -> Result<DataFrame, LoaderError> {
        let text = |name: &str| Self::required_text(raw, "division catalog", name);

        let dane = text("COD_DANE")?;
        let region_code = text("COD_DEPARTAMENTO")?;
        let region = text("DEPARTAMENTO")?;
        let municipality = text("MUNICIPIO")?;

        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        let mut dane_codes: Vec<String> = Vec::new();
        let mut region_codes: Vec<Option<String>> = Vec::new();
        let mut regions: Vec<Option<String>> = Vec::new();
        let mut municipalities: Vec<Option<String>> = Vec::new();

        for i in 0..raw.height() {
            let Some(code) = normalize_numeric_code(dane[i].as_deref(), 5) else {
                continue;
            };
            if !seen.insert(code.clone()) {
                duplicates += 1;
                continue;
            }
            dane_codes.push(code);
            region_codes.push(normalize_numeric_code(region_code[i].as_deref(), 2));
            regions.push(upper_text(region[i].as_deref()));
            municipalities.push(upper_text(municipality[i].as_deref()));
        }

        if duplicates > 0 {
            log::warn!("Division catalog has {} duplicate DANE codes; kept the first of each", duplicates);
        }

        let df = DataFrame::new(vec![
            Column::new(columns::DANE_CODE.into(), dane_codes),
            Column::new(DIVISION_REGION_CODE.into(), region_codes),
            Column::new(columns::REGION.into(), regions),
            Column::new(columns::MUNICIPALITY.into(), municipalities),
        ])?;

        Ok(df)
    }

    /// One row per four-character code; rows without a code are dropped.
    fn prepare_causes(raw: &DataFrame) -> Result<DataFrame, LoaderError> {
        let source: Vec<&Column> = raw.get_columns().iter().collect();
        if source.len() < CAUSE_CATALOG_LAYOUT.len() {
            return Err(LoaderError::MissingColumn {
                source_name: "cause catalog",
                column: CAUSE_CATALOG_LAYOUT[source.len()].to_string(),
            });
        }

        let mut fields = Vec::with_capacity(CAUSE_CATALOG_LAYOUT.len());
        for column in &source[..CAUSE_CATALOG_LAYOUT.len()] {
            fields.push(column_text(column)?);
        }

        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        let mut codes: Vec<String> = Vec::new();
        let mut chapters: Vec<Option<String>> = Vec::new();
        let mut chapter_names: Vec<Option<String>> = Vec::new();
        let mut codes_3: Vec<Option<String>> = Vec::new();
        let mut descriptions_3: Vec<Option<String>> = Vec::new();
        let mut descriptions: Vec<Option<String>> = Vec::new();

        for i in 0..raw.height() {
            let Some(code) = upper_text(fields[4][i].as_deref()) else {
                continue;
            };
            if !seen.insert(code.clone()) {
                duplicates += 1;
                continue;
            }
            codes.push(code);
            chapters.push(clean_text(fields[0][i].as_deref()));
            chapter_names.push(clean_text(fields[1][i].as_deref()));
            codes_3.push(upper_text(fields[2][i].as_deref()));
            descriptions_3.push(clean_text(fields[3][i].as_deref()));
            descriptions.push(clean_text(fields[5][i].as_deref()));
        }

        if duplicates > 0 {
            log::warn!("Cause catalog has {} duplicate codes; kept the first of each", duplicates);
        }

        let df = DataFrame::new(vec![
            Column::new(columns::CAUSE_CODE.into(), codes),
            Column::new(columns::CAUSE_CHAPTER.into(), chapters),
            Column::new(columns::CAUSE_CHAPTER_NAME.into(), chapter_names),
            Column::new(columns::CAUSE_CODE_3.into(), codes_3),
            Column::new(columns::CAUSE_DESCRIPTION_3.into(), descriptions_3),
            Column::new(columns::CAUSE_DESCRIPTION.into(), descriptions),
        ])?;

        Ok(df)
    }

    /// Log unresolved division codes and cause codes missing from the catalog.
    fn report_join_quality(joined: &DataFrame) -> Result<(), LoaderError> {
        let unresolved = joined.column(columns::REGION)?.null_count();
        if unresolved > 0 {
            log::warn!(
                "{} records have a DANE code missing from the division catalog",
                unresolved
            );
        }

        let codes = string_values(joined, columns::CAUSE_CODE)?;
        let descriptions = string_values(joined, columns::CAUSE_DESCRIPTION)?;
        let unmatched: HashSet<&str> = codes
            .iter()
            .zip(&descriptions)
            .filter_map(|(code, desc)| match (code, desc) {
                (Some(code), None) => Some(code.as_str()),
                _ => None,
            })
            .collect();
        if !unmatched.is_empty() {
            let mut sample: Vec<&str> = unmatched.iter().copied().collect();
            sample.sort_unstable();
            sample.truncate(10);
            log::warn!(
                "{} cause codes have no catalog description (e.g. {})",
                unmatched.len(),
                sample.join(", ")
            );
        }

        Ok(())
    }

    fn required_text(
        df: &DataFrame,
        source_name: &'static str,
        name: &str,
    ) -> Result<Vec<Option<String>>, LoaderError> {
        if !has_column(df, name) {
            return Err(LoaderError::MissingColumn {
                source_name,
                column: name.to_string(),
            });
        }
        Ok(string_values(df, name)?)
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn column_text(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn to_i32(raw: Option<&str>) -> Option<i32> {
    parse_integer(raw).and_then(|v| i32::try_from(v).ok())
}
