//! Region boundary polygons loaded from a GeoJSON FeatureCollection.

use super::normalize::fold_place_name;
use serde::Deserialize;
use std::collections::HashMap;

/// Folded names whose catalog spelling differs from the boundary file.
const NAME_FIXES: [(&str, &str); 1] = [(
    "ARCHIPIELAGODESANANDRESPROVIDENCIAYSANTACATALINA",
    "SANANDRESYPROVIDENCIA",
)];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(rename = "NAME_1")]
    name: String,
    #[serde(rename = "GID_1")]
    gid: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// One region outline; `rings` holds every polygon ring as (lon, lat).
#[derive(Debug, Clone)]
pub struct RegionShape {
    pub geo_id: String,
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RegionBoundaries {
    shapes: Vec<RegionShape>,
    by_name: HashMap<String, usize>,
}

impl RegionBoundaries {
    pub fn from_geojson_str(text: &str) -> Result<Self, serde_json::Error> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        Ok(Self::from_features(collection.features))
    }

    fn from_features(features: Vec<Feature>) -> Self {
        let mut shapes = Vec::with_capacity(features.len());
        let mut by_name = HashMap::with_capacity(features.len());

        for feature in features {
            let rings = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => to_rings(coordinates),
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().flat_map(to_rings).collect()
                }
                Some(Geometry::Unsupported) | None => Vec::new(),
            };
            by_name
                .entry(fold_place_name(&feature.properties.name))
                .or_insert(shapes.len());
            shapes.push(RegionShape {
                geo_id: feature.properties.gid,
                name: feature.properties.name,
                rings,
            });
        }

        Self { shapes, by_name }
    }

    pub fn shapes(&self) -> &[RegionShape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Find the shape for a region name as spelled in the division catalog.
    pub fn shape_for(&self, region: &str) -> Option<&RegionShape> {
        let mut key = fold_place_name(region);
        if let Some((_, fixed)) = NAME_FIXES.iter().find(|(from, _)| *from == key) {
            key = (*fixed).to_string();
        }
        self.by_name.get(&key).map(|&idx| &self.shapes[idx])
    }

    pub fn geo_id_for(&self, region: &str) -> Option<&str> {
        self.shape_for(region).map(|shape| shape.geo_id.as_str())
    }

    /// Bounding box of every ring, or `None` when no coordinates were loaded.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .shapes
            .iter()
            .flat_map(|s| s.rings.iter())
            .flat_map(|r| r.iter());
        let &(lon, lat) = points.next()?;
        let init = Bounds {
            min_lon: lon,
            max_lon: lon,
            min_lat: lat,
            max_lat: lat,
        };
        Some(points.fold(init, |b, &(lon, lat)| Bounds {
            min_lon: b.min_lon.min(lon),
            max_lon: b.max_lon.max(lon),
            min_lat: b.min_lat.min(lat),
            max_lat: b.max_lat.max(lat),
        }))
    }
}

fn to_rings(polygon: Vec<Vec<Vec<f64>>>) -> Vec<Vec<(f64, f64)>> {
    polygon
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| (pos[0], pos[1]))
                .collect::<Vec<_>>()
        })
        .filter(|ring| ring.len() >= 3)
        .collect()
}
