use geo::{Area, EuclideanLength, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::{Result, SurveyError};

/// `(x, y)`: longitude/latitude in degrees or easting/northing in metres.
pub type Coordinate = (f64, f64);

/// Shapes a collection can be aggregated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Point,
    LineString,
    Polygon,
}

impl ShapeKind {
    /// Fewest members the shape can be built from.
    pub fn min_points(&self) -> usize {
        match self {
            ShapeKind::Point => 1,
            ShapeKind::LineString => 2,
            ShapeKind::Polygon => 3,
        }
    }
}

/// Geometry in one coordinate frame. Serializes GeoJSON style
/// (`{"type": "LineString", "coordinates": [[x, y], ...]}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    /// Exterior ring only, closed.
    Polygon(Vec<Vec<Coordinate>>),
}

impl Geometry {
    /// Build `kind` from ordered coordinates. Points become a multipoint and
    /// polygon rings are closed by repeating the first coordinate if needed.
    /// A polygon needs three distinct vertices.
    pub fn from_coordinates(kind: ShapeKind, mut coordinates: Vec<Coordinate>) -> Result<Self> {
        if coordinates.len() < kind.min_points() {
            return Err(SurveyError::IncompleteGeometry(format!(
                "{:?} needs at least {} points, got {}",
                kind,
                kind.min_points(),
                coordinates.len()
            )));
        }

        Ok(match kind {
            ShapeKind::Point => Geometry::MultiPoint(coordinates),
            ShapeKind::LineString => Geometry::LineString(coordinates),
            ShapeKind::Polygon => {
                if coordinates.first() != coordinates.last() {
                    coordinates.push(coordinates[0]);
                }
                let distinct = distinct_vertices(&coordinates);
                if distinct < 3 {
                    return Err(SurveyError::IncompleteGeometry(format!(
                        "Polygon needs at least 3 distinct vertices, got {}",
                        distinct
                    )));
                }
                Geometry::Polygon(vec![coordinates])
            }
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => ShapeKind::Point,
            Geometry::LineString(_) => ShapeKind::LineString,
            Geometry::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// All vertices; for polygons the closed exterior ring.
    pub fn coordinates(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(c) => std::slice::from_ref(c),
            Geometry::MultiPoint(cs) | Geometry::LineString(cs) => cs,
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Individual points of a (multi)point geometry.
    pub fn points(&self) -> Vec<Geometry> {
        self.coordinates().iter().map(|c| Geometry::Point(*c)).collect()
    }

    /// Planar length of a path or ring perimeter; 0 for points.
    pub fn length(&self) -> f64 {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
            Geometry::LineString(cs) => LineString::from(cs.clone()).euclidean_length(),
            Geometry::Polygon(_) => exterior(self.coordinates()).exterior().euclidean_length(),
        }
    }

    /// Planar area of a polygon; 0 for other shapes.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Polygon(_) => exterior(self.coordinates()).unsigned_area(),
            _ => 0.0,
        }
    }

    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Point(c) => format!("POINT ({})", wkt_coordinate(c)),
            Geometry::MultiPoint(cs) => {
                let parts: Vec<String> =
                    cs.iter().map(|c| format!("({})", wkt_coordinate(c))).collect();
                format!("MULTIPOINT ({})", parts.join(", "))
            }
            Geometry::LineString(cs) => format!("LINESTRING ({})", wkt_sequence(cs)),
            Geometry::Polygon(rings) => {
                let mut wkt = String::from("POLYGON (");
                for (i, ring) in rings.iter().enumerate() {
                    if i > 0 {
                        wkt.push_str(", ");
                    }
                    let _ = write!(wkt, "({})", wkt_sequence(ring));
                }
                wkt.push(')');
                wkt
            }
        }
    }
}

/// Area positive for counter-clockwise rings. Works on open or closed rings.
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    exterior(ring).signed_area()
}

// `Polygon::new` closes an open ring.
fn exterior(ring: &[Coordinate]) -> Polygon<f64> {
    Polygon::new(LineString::from(ring.to_vec()), vec![])
}

fn distinct_vertices(ring: &[Coordinate]) -> usize {
    let mut vertices = ring.to_vec();
    vertices.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    vertices.dedup();
    vertices.len()
}

fn wkt_coordinate(c: &Coordinate) -> String {
    format!("{} {}", c.0, c.1)
}

fn wkt_sequence(cs: &[Coordinate]) -> String {
    cs.iter().map(wkt_coordinate).collect::<Vec<_>>().join(", ")
}
