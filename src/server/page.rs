//! Dashboard page template. Filters are rendered server side; the page
//! script swaps chart URLs and refreshes the cause table when a dropdown changes.

use crate::charts::ChartKind;
use crate::data::{FilterOptions, ALL_VALUE};
use askama::Template;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub all_value: &'static str,
    pub filters: Vec<FilterSelect<'a>>,
    /// Map-only dropdown.
    pub manner: FilterSelect<'a>,
    pub panels: Vec<ChartPanel>,
}

pub struct FilterSelect<'a> {
    pub id: &'static str,
    pub label: &'static str,
    pub values: &'a [String],
}

pub struct ChartPanel {
    pub slug: &'static str,
    pub title: &'static str,
    pub wide: bool,
    pub with_manner: bool,
}

impl<'a> DashboardPage<'a> {
    pub fn new(options: &'a FilterOptions) -> Self {
        let select = |id, label, values: &'a [String]| FilterSelect { id, label, values };
        Self {
            all_value: ALL_VALUE,
            filters: vec![
                select("sex", "Sexo", &options.sexes),
                select("region", "Departamento", &options.regions),
                select("age", "Categoría de edad", &options.age_categories),
            ],
            manner: select("manner", "Manera de muerte", &options.manners),
            panels: ChartKind::ALL
                .into_iter()
                .map(|kind| ChartPanel {
                    slug: kind.slug(),
                    title: kind.title(),
                    wide: kind == ChartKind::SexByRegion,
                    with_manner: kind == ChartKind::RegionMap,
                })
                .collect(),
        }
    }
}

/// Full dashboard page for the given dropdown options.
pub fn render(options: &FilterOptions) -> Result<String, askama::Error> {
    DashboardPage::new(options).render()
}
