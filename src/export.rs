//! Static export: every chart for the unfiltered view plus the dashboard JSON.

use crate::charts::{ChartKind, StaticChartRenderer};
use crate::data::MortalityData;
use crate::stats::{Aggregator, DashboardFilters};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the JSON summary written next to the charts.
pub const SUMMARY_FILE: &str = "dashboard.json";

/// Write `<dir>/<kind>.svg` for every chart and `<dir>/dashboard.json`.
/// Returns the written paths, charts first in panel order.
pub fn export_static(data: &MortalityData, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let filters = DashboardFilters::default();

    // Charts render independently; rayon keeps panel order in the output.
    let mut written: Vec<PathBuf> = ChartKind::ALL
        .par_iter()
        .map(|&kind| -> Result<PathBuf> {
            let svg = StaticChartRenderer::render(kind, data, &filters)
                .with_context(|| format!("Failed to render chart '{}'", kind))?;
            let path = dir.join(format!("{}.svg", kind.slug()));
            fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
            log::debug!("Wrote {}", path.display());
            Ok(path)
        })
        .collect::<Result<_>>()?;

    let summary = Aggregator::summary(&data.table, &filters).context("Failed to aggregate dashboard")?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);

    log::info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}
