//! Static Chart Renderer
//! Draws each dashboard panel as an SVG document with plotters.
//!
//! Panels:
//! 1. Region choropleth (Reds scale) from the boundary polygons
//! 2. Monthly line series with markers
//! 3. Horizontal bars of the homicide ranking, colored by region
//! 4. Pie of the municipalities with the fewest deaths
//! 5. Stacked bars of deaths by region and sex
//! 6. Bars of deaths by age category
//!
//! An empty aggregate renders a centered message instead of a chart.

use super::plotter::{ChartKind, ChartPlotter, NO_DATA};
use crate::data::{MortalityData, RegionBoundaries, Sex};
use crate::stats::{
    AgeCategoryCount, AggregateError, Aggregator, DashboardFilters, MonthlyCount,
    MunicipalityCount, RegionCount, SexRegionCount, LEAST_DEATHS_MUNICIPALITIES,
    TOP_HOMICIDE_MUNICIPALITIES,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use std::error::Error as StdError;
use thiserror::Error;

const FONT: &str = "sans-serif";
const LINE_COLOR: RGBColor = RGBColor(52, 152, 219);
const BORDER: RGBColor = RGBColor(255, 255, 255);
/// Calendar month axis.
const MONTHS: std::ops::RangeInclusive<i32> = 1..=12;

type DrawResult = Result<(), Box<dyn StdError>>;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Aggregate and draw one panel for the given filters.
    pub fn render(
        kind: ChartKind,
        data: &MortalityData,
        filters: &DashboardFilters,
    ) -> Result<String, ChartError> {
        let table = &data.table;
        match kind {
            ChartKind::RegionMap => {
                let rows = Aggregator::region_counts(table, filters)?;
                Self::region_map(&rows, &data.boundaries)
            }
            ChartKind::Monthly => Self::monthly(&Aggregator::monthly_counts(table, filters)?),
            ChartKind::HomicideMunicipalities => Self::homicide_municipalities(
                &Aggregator::top_homicide_municipalities(table, filters, TOP_HOMICIDE_MUNICIPALITIES)?,
            ),
            ChartKind::LeastDeathsMunicipalities => Self::least_deaths_municipalities(
                &Aggregator::least_deaths_municipalities(table, filters, LEAST_DEATHS_MUNICIPALITIES)?,
            ),
            ChartKind::SexByRegion => Self::sex_by_region(&Aggregator::sex_by_region(table, filters)?),
            ChartKind::AgeHistogram => Self::age_histogram(&Aggregator::age_histogram(table, filters)?),
        }
    }

    /// Placeholder figure with a centered message.
    pub fn empty(kind: ChartKind) -> Result<String, ChartError> {
        Self::svg(kind.size(), |root| {
            let (w, h) = root.dim_in_pixel();
            let style = (FONT, 16)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw_text(kind.empty_message(), &style, (w as i32 / 2, h as i32 / 2))?;
            Ok(())
        })
    }

    pub fn region_map(rows: &[RegionCount], boundaries: &RegionBoundaries) -> Result<String, ChartError> {
        let kind = ChartKind::RegionMap;
        let counts: HashMap<&str, u64> = rows
            .iter()
            .filter_map(|r| Some((boundaries.geo_id_for(&r.region)?, r.deaths)))
            .collect();
        let Some(bounds) = boundaries.bounds() else {
            return Self::empty(kind);
        };
        if counts.is_empty() {
            return Self::empty(kind);
        }
        let min = counts.values().copied().min().unwrap_or(0);
        let max = counts.values().copied().max().unwrap_or(0);

        Self::svg(kind.size(), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 18))
                .margin(10)
                .build_cartesian_2d(bounds.min_lon..bounds.max_lon, bounds.min_lat..bounds.max_lat)?;

            for shape in boundaries.shapes() {
                let fill = counts
                    .get(shape.geo_id.as_str())
                    .map(|&v| ChartPlotter::reds_scale(v, min, max))
                    .unwrap_or(NO_DATA);
                chart.draw_series(
                    shape
                        .rings
                        .iter()
                        .map(|ring| Polygon::new(ring.clone(), fill.filled())),
                )?;
                chart.draw_series(
                    shape
                        .rings
                        .iter()
                        .map(|ring| PathElement::new(ring.clone(), BORDER.stroke_width(1))),
                )?;
            }

            // Color scale legend: low and high swatches with their counts.
            let (w, h) = root.dim_in_pixel();
            let (x, y) = (w as i32 - 150, h as i32 - 40);
            let label = (FONT, 12).into_font().color(&BLACK);
            root.draw(&Rectangle::new(
                [(x, y), (x + 14, y + 14)],
                ChartPlotter::reds_scale(min, min, max).filled(),
            ))?;
            root.draw_text(&min.to_string(), &label, (x + 18, y))?;
            root.draw(&Rectangle::new(
                [(x + 70, y), (x + 84, y + 14)],
                ChartPlotter::reds_scale(max, min, max).filled(),
            ))?;
            root.draw_text(&max.to_string(), &label, (x + 88, y))?;
            Ok(())
        })
    }

    pub fn monthly(rows: &[MonthlyCount]) -> Result<String, ChartError> {
        let kind = ChartKind::Monthly;
        if rows.is_empty() {
            return Self::empty(kind);
        }
        let max = rows.iter().map(|r| r.deaths).max().unwrap_or(0);

        Self::svg(kind.size(), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 18))
                .margin(15)
                .x_label_area_size(35)
                .y_label_area_size(60)
                .build_cartesian_2d(*MONTHS.start()..*MONTHS.end(), 0u64..ChartPlotter::axis_ceiling(max))?;

            chart
                .configure_mesh()
                .x_labels(12)
                .x_desc("Mes")
                .y_desc("Muertes")
                .draw()?;

            let points: Vec<(i32, u64)> = rows
                .iter()
                .filter(|r| MONTHS.contains(&r.month))
                .map(|r| (r.month, r.deaths))
                .collect();
            chart.draw_series(LineSeries::new(
                points.iter().copied(),
                LINE_COLOR.stroke_width(2),
            ))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|&point| Circle::new(point, 4, LINE_COLOR.filled())),
            )?;
            Ok(())
        })
    }

    /// Horizontal bars, highest first, one color per region.
    pub fn homicide_municipalities(rows: &[MunicipalityCount]) -> Result<String, ChartError> {
        let kind = ChartKind::HomicideMunicipalities;
        if rows.is_empty() {
            return Self::empty(kind);
        }
        let n = rows.len() as u32;
        let max = rows.iter().map(|r| r.deaths).max().unwrap_or(0);
        // Slot 0 is the bottom of the axis; the top rank goes last.
        let slot_of = |rank: usize| n - 1 - rank as u32;
        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(slot) if *slot < n => {
                ChartPlotter::truncate_label(&rows[(n - 1 - slot) as usize].municipality, 22)
            }
            _ => String::new(),
        };

        let mut regions: Vec<&str> = Vec::new();
        for row in rows {
            if !regions.contains(&row.region.as_str()) {
                regions.push(&row.region);
            }
        }

        Self::svg(kind.size(), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 18))
                .margin(15)
                .x_label_area_size(35)
                .y_label_area_size(170)
                .build_cartesian_2d(0u64..ChartPlotter::axis_ceiling(max), (0u32..n).into_segmented())?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(n as usize + 1)
                .y_label_formatter(&label_of)
                .x_desc("Homicidios")
                .draw()?;

            for (idx, region) in regions.iter().enumerate() {
                let color = ChartPlotter::series_color(idx);
                chart
                    .draw_series(
                        rows.iter()
                            .enumerate()
                            .filter(|(_, r)| r.region == *region)
                            .map(|(rank, r)| {
                                let slot = slot_of(rank);
                                let mut bar = Rectangle::new(
                                    [
                                        (0, SegmentValue::Exact(slot)),
                                        (r.deaths, SegmentValue::Exact(slot + 1)),
                                    ],
                                    color.filled(),
                                );
                                bar.set_margin(6, 6, 0, 0);
                                bar
                            }),
                    )?
                    .label(*region)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::LowerRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })
    }

    pub fn least_deaths_municipalities(rows: &[MunicipalityCount]) -> Result<String, ChartError> {
        let kind = ChartKind::LeastDeathsMunicipalities;
        if rows.is_empty() {
            return Self::empty(kind);
        }

        Self::svg(kind.size(), |root| {
            let root = root.titled(kind.title(), (FONT, 18))?;
            let (w, h) = root.dim_in_pixel();
            let center = (w as i32 / 2, h as i32 / 2);
            let radius = w.min(h) as f64 * 0.32;
            let sizes: Vec<f64> = rows.iter().map(|r| r.deaths as f64).collect();
            let colors: Vec<RGBColor> = (0..rows.len()).map(ChartPlotter::series_color).collect();
            let labels: Vec<String> = rows
                .iter()
                .map(|r| format!("{} ({})", ChartPlotter::truncate_label(&r.municipality, 20), r.region))
                .collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.label_style((FONT, 11).into_font().color(&BLACK));
            pie.percentages((FONT, 10).into_font().color(&WHITE));
            root.draw(&pie)?;
            Ok(())
        })
    }

    /// Regions by total deaths, one stacked segment per sex.
    pub fn sex_by_region(rows: &[SexRegionCount]) -> Result<String, ChartError> {
        let kind = ChartKind::SexByRegion;
        if rows.is_empty() {
            return Self::empty(kind);
        }

        let mut totals: Vec<(&str, u64)> = Vec::new();
        let mut counts: HashMap<(&str, &str), u64> = HashMap::new();
        for row in rows {
            *counts.entry((row.region.as_str(), row.sex.as_str())).or_insert(0) += row.deaths;
            match totals.iter_mut().find(|(region, _)| *region == row.region) {
                Some((_, total)) => *total += row.deaths,
                None => totals.push((&row.region, row.deaths)),
            }
        }
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let sex_rank = |label: &str| {
            [Sex::Male, Sex::Female, Sex::Unknown]
                .iter()
                .position(|s| s.label() == label)
                .unwrap_or(usize::MAX)
        };
        let mut sexes: Vec<&str> = Vec::new();
        for row in rows {
            if !sexes.contains(&row.sex.as_str()) {
                sexes.push(&row.sex);
            }
        }
        sexes.sort_by_key(|label| sex_rank(label));

        let n = totals.len() as u32;
        let max = totals.iter().map(|(_, t)| *t).max().unwrap_or(0);
        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => totals
                .get(*i as usize)
                .map(|(region, _)| ChartPlotter::truncate_label(region, 16))
                .unwrap_or_default(),
            _ => String::new(),
        };

        Self::svg(kind.size(), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 18))
                .margin(15)
                .x_label_area_size(120)
                .y_label_area_size(60)
                .build_cartesian_2d((0u32..n).into_segmented(), 0u64..ChartPlotter::axis_ceiling(max))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n as usize + 1)
                .x_label_formatter(&label_of)
                .x_label_style((FONT, 10).into_font().transform(FontTransform::Rotate90))
                .y_desc("Muertes")
                .draw()?;

            let mut base = vec![0u64; totals.len()];
            for (idx, sex) in sexes.iter().enumerate() {
                let color = ChartPlotter::series_color(idx);
                let mut bars = Vec::new();
                for (slot, (region, _)) in totals.iter().enumerate() {
                    let value = counts.get(&(*region, *sex)).copied().unwrap_or(0);
                    if value == 0 {
                        continue;
                    }
                    let low = base[slot];
                    base[slot] += value;
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(slot as u32), low),
                            (SegmentValue::Exact(slot as u32 + 1), base[slot]),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 3, 3);
                    bars.push(bar);
                }
                chart
                    .draw_series(bars)?
                    .label(*sex)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            Ok(())
        })
    }

    pub fn age_histogram(rows: &[AgeCategoryCount]) -> Result<String, ChartError> {
        let kind = ChartKind::AgeHistogram;
        if rows.is_empty() {
            return Self::empty(kind);
        }
        let n = rows.len() as u32;
        let max = rows.iter().map(|r| r.deaths).max().unwrap_or(0);
        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => rows
                .get(*i as usize)
                .map(|r| ChartPlotter::truncate_label(&r.label, 18))
                .unwrap_or_default(),
            _ => String::new(),
        };

        Self::svg(kind.size(), |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 18))
                .margin(15)
                .x_label_area_size(90)
                .y_label_area_size(60)
                .build_cartesian_2d((0u32..n).into_segmented(), 0u64..ChartPlotter::axis_ceiling(max))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n as usize + 1)
                .x_label_formatter(&label_of)
                .x_label_style((FONT, 10).into_font().transform(FontTransform::Rotate90))
                .y_desc("Muertes")
                .draw()?;

            chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i as u32), 0),
                        (SegmentValue::Exact(i as u32 + 1), r.deaths),
                    ],
                    ChartPlotter::series_color(0).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))?;
            Ok(())
        })
    }

    /// Draw onto an in-memory SVG document of the given size.
    fn svg<F>(size: (u32, u32), draw: F) -> Result<String, ChartError>
    where
        F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult,
    {
        let mut document = String::new();
        {
            let root = SVGBackend::with_string(&mut document, size).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_error)?;
            draw(&root).map_err(|e| ChartError::Drawing(e.to_string()))?;
            root.present().map_err(drawing_error)?;
        }
        Ok(document)
    }
}

fn drawing_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}
