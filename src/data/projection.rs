//! Coordinate reference systems and reprojection
//!
//! Only the two systems the map needs are modelled: geographic WGS84
//! longitude/latitude (EPSG:4326) and the ETRS89 Lambert Azimuthal Equal Area
//! grid (EPSG:3035). The LAEA forward formulas follow the ellipsoidal form in
//! IOGP Guidance Note 7-2 on the GRS80 ellipsoid.

use super::error::{MapError, Result};
use geo::{Coord, MapCoords, MultiPolygon, Point};
use std::fmt;

/// Coordinate reference system tag carried by every map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// WGS84 longitude/latitude in degrees
    Wgs84,
    /// ETRS89-extended / LAEA Europe, metres
    EtrsLaea,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::EtrsLaea => 3035,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Forward map projection from geographic degrees to planar metres
pub trait Projection {
    /// Project one (longitude, latitude) pair. None when the point has no
    /// finite image (e.g. the antipode of an azimuthal projection centre).
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;
}

/// Lambert Azimuthal Equal Area on an ellipsoid
#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    e: f64,
    e2: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    qp: f64,
    rq: f64,
    d: f64,
    sin_beta0: f64,
    cos_beta0: f64,
}

impl LambertAzimuthalEqualArea {
    /// Build a projection. Angles in degrees, offsets in metres.
    pub fn new(
        semi_major: f64,
        inverse_flattening: f64,
        lat0: f64,
        lon0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let f = 1.0 / inverse_flattening;
        let e2 = 2.0 * f - f * f;
        let e = e2.sqrt();
        let phi0 = lat0.to_radians();

        let qp = authalic_q(std::f64::consts::FRAC_PI_2, e, e2);
        let q0 = authalic_q(phi0, e, e2);
        let beta0 = (q0 / qp).clamp(-1.0, 1.0).asin();
        let rq = semi_major * (qp / 2.0).sqrt();
        let d = semi_major * (phi0.cos() / (1.0 - e2 * phi0.sin().powi(2)).sqrt())
            / (rq * beta0.cos());

        Self {
            e,
            e2,
            lon0: lon0.to_radians(),
            false_easting,
            false_northing,
            qp,
            rq,
            d,
            sin_beta0: beta0.sin(),
            cos_beta0: beta0.cos(),
        }
    }

    /// EPSG:3035, ETRS89-extended / LAEA Europe
    pub fn etrs89() -> Self {
        Self::new(6_378_137.0, 298.257_222_101, 52.0, 10.0, 4_321_000.0, 3_210_000.0)
    }
}

/// Authalic latitude helper q(φ)
fn authalic_q(phi: f64, e: f64, e2: f64) -> f64 {
    let sin_phi = phi.sin();
    let e_sin = e * sin_phi;
    (1.0 - e2)
        * (sin_phi / (1.0 - e2 * sin_phi * sin_phi)
            - (1.0 / (2.0 * e)) * ((1.0 - e_sin) / (1.0 + e_sin)).ln())
}

impl Projection for LambertAzimuthalEqualArea {
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }

        let phi = lat.clamp(-90.0, 90.0).to_radians();
        let dlon = lon.to_radians() - self.lon0;

        let q = authalic_q(phi, self.e, self.e2);
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
        let (sin_beta, cos_beta) = beta.sin_cos();

        let denom = 1.0 + self.sin_beta0 * sin_beta + self.cos_beta0 * cos_beta * dlon.cos();
        if denom <= 1e-12 {
            return None;
        }
        let b = self.rq * (2.0 / denom).sqrt();

        let x = self.false_easting + b * self.d * cos_beta * dlon.sin();
        let y = self.false_northing
            + (b / self.d) * (self.cos_beta0 * sin_beta - self.sin_beta0 * cos_beta * dlon.cos());

        Some((x, y))
    }
}

/// Projection from `from` to `to`, or None for the identity
fn projection_between(from: Crs, to: Crs) -> Result<Option<LambertAzimuthalEqualArea>> {
    match (from, to) {
        (a, b) if a == b => Ok(None),
        (Crs::Wgs84, Crs::EtrsLaea) => Ok(Some(LambertAzimuthalEqualArea::etrs89())),
        (a, b) => Err(MapError::Projection(format!(
            "reprojection from {} to {} is not supported",
            a, b
        ))),
    }
}

/// Reproject a point between systems
pub fn reproject_point(point: Point<f64>, from: Crs, to: Crs) -> Result<Point<f64>> {
    match projection_between(from, to)? {
        None => Ok(point),
        Some(proj) => proj
            .project(point.x(), point.y())
            .map(|(x, y)| Point::new(x, y))
            .ok_or_else(|| {
                MapError::Projection(format!(
                    "point ({}, {}) has no image in {}",
                    point.x(),
                    point.y(),
                    to
                ))
            }),
    }
}

/// Reproject a multipolygon between systems
///
/// Vertices without a finite image are rejected as a whole, the same way a
/// single point is.
pub fn reproject_multipolygon(
    geometry: &MultiPolygon<f64>,
    from: Crs,
    to: Crs,
) -> Result<MultiPolygon<f64>> {
    let proj = match projection_between(from, to)? {
        None => return Ok(geometry.clone()),
        Some(proj) => proj,
    };

    let proj = &proj;
    geometry.try_map_coords(move |c: Coord<f64>| {
        proj.project(c.x, c.y)
            .map(|(x, y)| Coord { x, y })
            .ok_or_else(|| {
                MapError::Projection(format!(
                    "vertex ({}, {}) has no image in {}",
                    c.x, c.y, to
                ))
            })
    })
}
