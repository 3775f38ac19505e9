//! Joins between wage records, boundaries and country centres

use super::boundaries::BoundaryLayer;
use super::centroids::CountryCentroid;
use super::error::{MapError, Result};
use super::projection::{reproject_point, Crs};
use super::wages::{WageRecord, WageTable};
use geo::{MultiPolygon, Point};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A country outline with the wage that colors it
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethRegion {
    pub country_name: String,
    pub continent: String,
    pub geometry: MultiPolygon<f64>,
    pub wage: WageRecord,
}

/// Boundaries inner-joined with wages
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethLayer {
    pub crs: Crs,
    pub regions: Vec<ChoroplethRegion>,
}

/// A wage record anchored at its country centre
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPoint {
    pub wage: WageRecord,
    /// Geographic centre, None when the country has no centre
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Centre in the layer's CRS
    pub position: Option<Point<f64>>,
}

/// Wages left-joined with country centres
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayer {
    pub crs: Crs,
    pub points: Vec<LabelPoint>,
}

/// Inner join of boundaries and wages on `country_name == name`
///
/// Boundary order is preserved. Names present on only one side are dropped
/// without error.
pub fn merge_boundaries(boundaries: &BoundaryLayer, wages: &WageTable) -> ChoroplethLayer {
    let mut by_name: HashMap<&str, Vec<&WageRecord>> = HashMap::new();
    for record in wages.iter() {
        by_name.entry(record.name.as_str()).or_default().push(record);
    }

    let mut regions = Vec::new();
    for row in &boundaries.rows {
        match by_name.get(row.country_name.as_str()) {
            Some(records) => {
                for record in records {
                    regions.push(ChoroplethRegion {
                        country_name: row.country_name.clone(),
                        continent: row.continent.clone(),
                        geometry: row.geometry.clone(),
                        wage: (*record).clone(),
                    });
                }
            }
            None => debug!("No wage for boundary '{}'", row.country_name),
        }
    }

    for record in wages.iter() {
        if !boundaries.rows.iter().any(|r| r.country_name == record.name) {
            debug!("No boundary for wage country '{}'", record.name);
        }
    }

    info!(
        "Boundary join: {} boundaries x {} wages -> {} regions",
        boundaries.len(),
        wages.len(),
        regions.len()
    );
    ChoroplethLayer {
        crs: boundaries.crs,
        regions,
    }
}

/// Left join of wages with centroids on name, as geographic points
///
/// Every wage record survives. When the centroid table repeats a name the
/// first row wins.
pub fn attach_centroids(wages: &WageTable, centroids: &[CountryCentroid]) -> LabelLayer {
    let mut by_name: HashMap<&str, &CountryCentroid> = HashMap::new();
    for centroid in centroids {
        by_name.entry(centroid.name.as_str()).or_insert(centroid);
    }

    let points: Vec<LabelPoint> = wages
        .iter()
        .map(|record| match by_name.get(record.name.as_str()) {
            Some(c) => LabelPoint {
                wage: record.clone(),
                longitude: Some(c.longitude),
                latitude: Some(c.latitude),
                position: Some(Point::new(c.longitude, c.latitude)),
            },
            None => {
                warn!("No country centre for '{}', label omitted", record.name);
                LabelPoint {
                    wage: record.clone(),
                    longitude: None,
                    latitude: None,
                    position: None,
                }
            }
        })
        .collect();

    info!(
        "Centre join: {} wages, {} with a centre",
        points.len(),
        points.iter().filter(|p| p.position.is_some()).count()
    );
    LabelLayer {
        crs: Crs::Wgs84,
        points,
    }
}

impl LabelLayer {
    /// Reproject every positioned point into `target`
    pub fn to_crs(&self, target: Crs) -> Result<Self> {
        let points = self
            .points
            .iter()
            .map(|p| {
                let position = p
                    .position
                    .map(|pos| reproject_point(pos, self.crs, target))
                    .transpose()?;
                Ok(LabelPoint {
                    position,
                    ..p.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            crs: target,
            points,
        })
    }

    /// Points that have a position
    pub fn positioned(&self) -> impl Iterator<Item = (&LabelPoint, Point<f64>)> {
        self.points
            .iter()
            .filter_map(|p| p.position.map(|pos| (p, pos)))
    }
}

/// Fail unless both layers share a CRS
pub fn ensure_same_crs(choropleth: &ChoroplethLayer, labels: &LabelLayer) -> Result<()> {
    if choropleth.crs == labels.crs {
        Ok(())
    } else {
        Err(MapError::Projection(format!(
            "label layer is in {} but regions are in {}",
            labels.crs, choropleth.crs
        )))
    }
}
