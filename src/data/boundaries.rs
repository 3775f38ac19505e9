//! World boundary polygons
//!
//! The boundary dataset is a GeoJSON FeatureCollection in the layout of
//! Natural Earth's low resolution admin-0 countries: every feature has a
//! `name` and a `continent` property and a (Multi)Polygon geometry.

use super::error::{MapError, Result};
use super::projection::{reproject_multipolygon, Crs};
use geo::{Geometry, MultiPolygon};
use geojson::{Feature, GeoJson};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Identifier of the bundled low resolution world dataset
pub const NATURALEARTH_LOWRES: &str = "naturalearth_lowres";

/// Source property holding the country name; renamed to `country_name`
pub const SOURCE_NAME_PROPERTY: &str = "name";
pub const CONTINENT_PROPERTY: &str = "continent";

/// One country outline
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryGeometry {
    /// Country name, kept apart from the wage table's `name`
    pub country_name: String,
    pub continent: String,
    pub geometry: MultiPolygon<f64>,
}

/// Country outlines sharing one coordinate reference system
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    pub crs: Crs,
    pub rows: Vec<BoundaryGeometry>,
}

impl BoundaryLayer {
    /// Load a boundary dataset by identifier or path (geographic coordinates)
    pub fn load(source: &str) -> Result<Self> {
        let path = resolve_dataset_path(source);
        info!("Loading boundaries from {}", path.display());
        let json = std::fs::read_to_string(&path).map_err(|e| MapError::io(&path, e))?;
        Self::from_geojson_str(&json)
    }

    /// Parse a GeoJSON FeatureCollection
    pub fn from_geojson_str(json: &str) -> Result<Self> {
        let geojson: GeoJson = json.parse()?;
        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => {
                return Err(MapError::Schema(
                    "boundary dataset must contain features, found a bare geometry".to_string(),
                ))
            }
        };

        let total = features.len();
        let mut rows = Vec::with_capacity(total);
        for feature in features {
            if let Some(row) = boundary_from_feature(feature)? {
                rows.push(row);
            }
        }

        info!("Boundaries: {} of {} features usable", rows.len(), total);
        Ok(Self {
            crs: Crs::Wgs84,
            rows,
        })
    }

    /// Reproject every outline into `target`
    pub fn to_crs(&self, target: Crs) -> Result<Self> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                Ok(BoundaryGeometry {
                    country_name: row.country_name.clone(),
                    continent: row.continent.clone(),
                    geometry: reproject_multipolygon(&row.geometry, self.crs, target)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Reprojected {} boundaries {} -> {}", rows.len(), self.crs, target);
        Ok(Self { crs: target, rows })
    }

    /// Keep outlines on `continent` plus the explicitly listed countries
    pub fn filter_region(&self, continent: &str, extra_countries: &[String]) -> Self {
        let rows: Vec<BoundaryGeometry> = self
            .rows
            .iter()
            .filter(|row| {
                row.continent == continent || extra_countries.iter().any(|c| *c == row.country_name)
            })
            .cloned()
            .collect();

        info!(
            "Region filter '{}' + {:?}: {} of {} boundaries kept",
            continent,
            extra_countries,
            rows.len(),
            self.rows.len()
        );
        Self {
            crs: self.crs,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Dataset identifiers resolve to `<identifier>.geojson`; anything that
/// already looks like a file path is used as is.
pub fn resolve_dataset_path(source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.extension().is_some() || path.exists() {
        path.to_path_buf()
    } else {
        path.with_extension("geojson")
    }
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Convert a feature to a boundary row; non-areal features are skipped
fn boundary_from_feature(feature: Feature) -> Result<Option<BoundaryGeometry>> {
    let country_name = string_property(&feature, SOURCE_NAME_PROPERTY).ok_or_else(|| {
        MapError::Schema(format!(
            "boundary feature without a '{}' property",
            SOURCE_NAME_PROPERTY
        ))
    })?;
    let continent = string_property(&feature, CONTINENT_PROPERTY).ok_or_else(|| {
        MapError::Schema(format!(
            "boundary '{}' has no '{}' property",
            country_name, CONTINENT_PROPERTY
        ))
    })?;

    let value = match feature.geometry {
        Some(geometry) => geometry.value,
        None => {
            warn!("Boundary '{}' has no geometry, skipped", country_name);
            return Ok(None);
        }
    };

    let geometry: Geometry<f64> = value.try_into()?;
    let geometry = match geometry {
        Geometry::MultiPolygon(mp) => mp,
        Geometry::Polygon(p) => MultiPolygon(vec![p]),
        _ => {
            warn!("Boundary '{}' is not areal, skipped", country_name);
            return Ok(None);
        }
    };

    Ok(Some(BoundaryGeometry {
        country_name,
        continent,
        geometry,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn square_feature(name: &str, continent: &str, lon: f64, lat: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"name":"{name}","continent":"{continent}"}},
               "geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#,
            name = name,
            continent = continent,
            x0 = lon - 1.0,
            x1 = lon + 1.0,
            y0 = lat - 1.0,
            y1 = lat + 1.0,
        )
    }

    /// Small world: three European countries, Turkey in Asia, two others
    pub(crate) fn sample_world_geojson() -> String {
        let features = [
            square_feature("France", "Europe", 2.0, 46.0),
            square_feature("Germany", "Europe", 10.0, 51.0),
            square_feature("Czechia", "Europe", 15.0, 50.0),
            square_feature("Turkey", "Asia", 35.0, 39.0),
            square_feature("Japan", "Asia", 138.0, 36.0),
            square_feature("Brazil", "South America", -52.0, -10.0),
        ];
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn test_parse_feature_collection() {
        let layer = BoundaryLayer::from_geojson_str(&sample_world_geojson()).unwrap();
        assert_eq!(layer.crs, Crs::Wgs84);
        assert_eq!(layer.len(), 6);
        assert_eq!(layer.rows[0].country_name, "France");
        assert_eq!(layer.rows[0].continent, "Europe");
        assert_eq!(layer.rows[0].geometry.0.len(), 1);
    }

    #[test]
    fn test_region_filter_keeps_europe_and_turkey() {
        let layer = BoundaryLayer::from_geojson_str(&sample_world_geojson()).unwrap();
        let europe = layer.filter_region("Europe", &["Turkey".to_string()]);
        let names: Vec<&str> = europe.rows.iter().map(|r| r.country_name.as_str()).collect();
        assert_eq!(names, vec!["France", "Germany", "Czechia", "Turkey"]);
        for row in &europe.rows {
            assert!(row.continent == "Europe" || row.country_name == "Turkey");
        }
    }

    #[test]
    fn test_reprojection_tags_layer() {
        let layer = BoundaryLayer::from_geojson_str(&sample_world_geojson()).unwrap();
        let europe = layer
            .filter_region("Europe", &["Turkey".to_string()])
            .to_crs(Crs::EtrsLaea)
            .unwrap();
        assert_eq!(europe.crs, Crs::EtrsLaea);
        let germany = &europe.rows[1].geometry.0[0];
        let first = germany.exterior().0[0];
        // Metres, near the false origin
        assert!(first.x > 4_000_000.0 && first.x < 4_500_000.0);
    }

    #[test]
    fn test_point_features_skipped() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Dot","continent":"Europe"},
             "geometry":{"type":"Point","coordinates":[1.0,2.0]}}]}"#;
        let layer = BoundaryLayer::from_geojson_str(json).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_missing_continent_is_schema_error() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Nowhere"},
             "geometry":{"type":"Point","coordinates":[1.0,2.0]}}]}"#;
        assert!(matches!(
            BoundaryLayer::from_geojson_str(json),
            Err(MapError::Schema(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_geojson_error() {
        assert!(matches!(
            BoundaryLayer::from_geojson_str("{not json"),
            Err(MapError::GeoJson(_))
        ));
    }

    #[test]
    fn test_resolve_dataset_path() {
        assert_eq!(
            resolve_dataset_path(NATURALEARTH_LOWRES),
            PathBuf::from("naturalearth_lowres.geojson")
        );
        assert_eq!(
            resolve_dataset_path("maps/world.json"),
            PathBuf::from("maps/world.json")
        );
    }
}
