//! Command-line configuration using clap derive API

use crate::data::{
    SourcePaths, DEFAULT_BOUNDARIES_FILE, DEFAULT_CATALOG_SKIP_ROWS, DEFAULT_CAUSE_CATALOG_FILE,
    DEFAULT_DIVISIONS_FILE, DEFAULT_RECORDS_FILE, DEFAULT_RECORDS_SHEET,
};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Colombian 2019 non-fetal mortality dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "mortality-dashboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the input files
    #[arg(long, env = "MORTALITY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Death records workbook (a .csv export is read as CSV)
    #[arg(long, env = "MORTALITY_RECORDS", default_value = DEFAULT_RECORDS_FILE)]
    pub records: PathBuf,

    /// Sheet holding the death records
    #[arg(long, env = "MORTALITY_RECORDS_SHEET", default_value = DEFAULT_RECORDS_SHEET)]
    pub records_sheet: String,

    /// ICD-10 cause catalog (preamble rows skipped)
    #[arg(long, env = "MORTALITY_CAUSE_CATALOG", default_value = DEFAULT_CAUSE_CATALOG_FILE)]
    pub cause_catalog: PathBuf,

    /// Administrative division catalog (DIVIPOLA)
    #[arg(long, env = "MORTALITY_DIVISIONS", default_value = DEFAULT_DIVISIONS_FILE)]
    pub divisions: PathBuf,

    /// Region boundary polygons (GeoJSON)
    #[arg(long, env = "MORTALITY_BOUNDARIES", default_value = DEFAULT_BOUNDARIES_FILE)]
    pub boundaries: PathBuf,

    /// Preamble rows above the cause catalog header
    #[arg(long, default_value_t = DEFAULT_CATALOG_SKIP_ROWS)]
    pub catalog_skip_rows: usize,

    /// Address to bind the HTTP server to
    #[arg(long, env = "MORTALITY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to serve on
    #[arg(long, env = "MORTALITY_PORT", default_value_t = 8050)]
    pub port: u16,

    /// Open the dashboard in the default browser
    #[arg(long)]
    pub open: bool,

    /// Render every chart and the dashboard JSON into DIR, then exit
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Input locations, relative names resolved against `data_dir`.
    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths {
            records: self.resolve(&self.records),
            cause_catalog: self.resolve(&self.cause_catalog),
            divisions: self.resolve(&self.divisions),
            boundaries: self.resolve(&self.boundaries),
            records_sheet: Some(self.records_sheet.clone()),
            catalog_skip_rows: self.catalog_skip_rows,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}
