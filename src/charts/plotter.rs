//! Chart Plotter Module
//! Chart catalog, color palette and axis helpers shared by the renderers.

use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;

/// Series palette (region / sex / slice colors)
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Fill for map regions without data.
pub const NO_DATA: RGBColor = RGBColor(230, 230, 230);

/// Ends of the sequential "Reds" scale.
const REDS_LOW: RGBColor = RGBColor(254, 229, 217);
const REDS_HIGH: RGBColor = RGBColor(165, 15, 21);

/// The dashboard's chart panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    RegionMap,
    Monthly,
    HomicideMunicipalities,
    LeastDeathsMunicipalities,
    SexByRegion,
    AgeHistogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::RegionMap,
        ChartKind::Monthly,
        ChartKind::HomicideMunicipalities,
        ChartKind::LeastDeathsMunicipalities,
        ChartKind::SexByRegion,
        ChartKind::AgeHistogram,
    ];

    /// URL / file name segment.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::RegionMap => "map",
            ChartKind::Monthly => "monthly",
            ChartKind::HomicideMunicipalities => "homicides",
            ChartKind::LeastDeathsMunicipalities => "least-deaths",
            ChartKind::SexByRegion => "sex-by-region",
            ChartKind::AgeHistogram => "age",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::RegionMap => "Distribución por departamento",
            ChartKind::Monthly => "Serie mensual de muertes",
            ChartKind::HomicideMunicipalities => "Top 5 ciudades más violentas (homicidios)",
            ChartKind::LeastDeathsMunicipalities => "10 ciudades con menor mortalidad",
            ChartKind::SexByRegion => "Muertes por sexo y departamento",
            ChartKind::AgeHistogram => "Distribución por categorías de edad",
        }
    }

    /// Placeholder text when the aggregate is empty.
    pub fn empty_message(self) -> &'static str {
        match self {
            ChartKind::RegionMap => "Sin datos para los filtros seleccionados.",
            ChartKind::Monthly => "No hay datos mensuales.",
            ChartKind::HomicideMunicipalities => "No hay registros de homicidios con estos filtros.",
            ChartKind::LeastDeathsMunicipalities => "No hay ciudades disponibles.",
            ChartKind::SexByRegion => "Sin datos para construir la comparación por sexo.",
            ChartKind::AgeHistogram => "No existen registros para las categorías seleccionadas.",
        }
    }

    /// Pixel size of the rendered SVG.
    pub fn size(self) -> (u32, u32) {
        match self {
            ChartKind::RegionMap => (560, 620),
            ChartKind::SexByRegion => (900, 520),
            _ => (720, 420),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.strip_suffix(".svg").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == slug)
            .ok_or_else(|| format!("Unknown chart '{}'", s))
    }
}

/// Color and axis helpers.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the `index`-th series, cycling through the palette.
    pub fn series_color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    /// Linear "Reds" scale; a flat range maps to the darkest shade.
    pub fn reds_scale(value: u64, min: u64, max: u64) -> RGBColor {
        let t = if max > min {
            (value.saturating_sub(min)) as f64 / (max - min) as f64
        } else {
            1.0
        };
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        RGBColor(
            lerp(REDS_LOW.0, REDS_HIGH.0),
            lerp(REDS_LOW.1, REDS_HIGH.1),
            lerp(REDS_LOW.2, REDS_HIGH.2),
        )
    }

    /// Upper bound of a count axis with ~10% headroom, never zero.
    pub fn axis_ceiling(max: u64) -> u64 {
        (max + max / 10).max(max + 1)
    }

    /// Shorten long category names for axis labels.
    pub fn truncate_label(label: &str, max_chars: usize) -> String {
        if label.chars().count() <= max_chars {
            return label.to_string();
        }
        let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_kinds_round_trip_through_slugs() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.slug().parse::<ChartKind>(), Ok(kind));
        }
        assert_eq!("map.svg".parse::<ChartKind>(), Ok(ChartKind::RegionMap));
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn reds_scale_spans_low_to_high() {
        assert_eq!(ChartPlotter::reds_scale(0, 0, 10), REDS_LOW);
        assert_eq!(ChartPlotter::reds_scale(10, 0, 10), REDS_HIGH);
        assert_eq!(ChartPlotter::reds_scale(5, 5, 5), REDS_HIGH);
        let mid = ChartPlotter::reds_scale(5, 0, 10);
        assert!(mid.1 < REDS_LOW.1 && mid.1 > REDS_HIGH.1);
    }

    #[test]
    fn axis_ceiling_leaves_headroom() {
        assert_eq!(ChartPlotter::axis_ceiling(0), 1);
        assert_eq!(ChartPlotter::axis_ceiling(5), 6);
        assert_eq!(ChartPlotter::axis_ceiling(100), 110);
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(ChartPlotter::truncate_label("CALI", 10), "CALI");
        assert_eq!(ChartPlotter::truncate_label("NORTE DE SANTANDER", 8), "NORTE D…");
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(ChartPlotter::series_color(0), ChartPlotter::series_color(PALETTE.len()));
    }
}
