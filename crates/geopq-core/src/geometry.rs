//! Geometry encoding, type tags and bounds.

use geo::BoundingRect;
use geo_types::Geometry;
use geopq_geoparquet::{GeoParquetColumnEncoding, GeoParquetGeometryType};
use geozero::{CoordDimensions, ToWkb};
use thiserror::Error;

/// A geometry could not be turned into bytes.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EncodeError {
    pub message: String,
}

impl EncodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Serializes geometries for the geometry column.
pub trait GeometryEncoder {
    /// Encoding name recorded in the `geo` metadata.
    fn encoding(&self) -> GeoParquetColumnEncoding;

    /// Encode one geometry.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when the geometry cannot be represented.
    fn encode(&self, geometry: &Geometry<f64>) -> Result<Vec<u8>, EncodeError>;
}

/// 2D Well-known Binary encoder backed by `geozero`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WkbEncoder;

impl GeometryEncoder for WkbEncoder {
    fn encoding(&self) -> GeoParquetColumnEncoding {
        GeoParquetColumnEncoding::WKB
    }

    fn encode(&self, geometry: &Geometry<f64>) -> Result<Vec<u8>, EncodeError> {
        geometry
            .to_wkb(CoordDimensions::xy())
            .map_err(|err| EncodeError::new(err.to_string()))
    }
}

/// GeoParquet type tag of a geometry.
///
/// `Line` is reported as `LineString`; `Rect` and `Triangle` as `Polygon`.
#[must_use]
pub fn geometry_type(geometry: &Geometry<f64>) -> GeoParquetGeometryType {
    match geometry {
        Geometry::Point(_) => GeoParquetGeometryType::Point,
        Geometry::Line(_) | Geometry::LineString(_) => GeoParquetGeometryType::LineString,
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            GeoParquetGeometryType::Polygon
        },
        Geometry::MultiPoint(_) => GeoParquetGeometryType::MultiPoint,
        Geometry::MultiLineString(_) => GeoParquetGeometryType::MultiLineString,
        Geometry::MultiPolygon(_) => GeoParquetGeometryType::MultiPolygon,
        Geometry::GeometryCollection(_) => GeoParquetGeometryType::GeometryCollection,
    }
}

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bound {
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest bound enclosing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// `[xmin, ymin, xmax, ymax]`
    #[must_use]
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Bound of a geometry, or `None` for empty geometries.
#[must_use]
pub fn geometry_bound(geometry: &Geometry<f64>) -> Option<Bound> {
    geometry.bounding_rect().map(|rect| {
        let (min, max) = (rect.min(), rect.max());
        Bound::new(min.x, min.y, max.x, max.y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{
        Coord, GeometryCollection, Line, LineString, MultiPoint, Point, Rect, line_string, point,
        polygon,
    };

    #[test]
    fn encode_point_as_wkb() {
        let wkb = WkbEncoder
            .encode(&Geometry::Point(point!(x: 1.0, y: 2.0)))
            .unwrap();

        // byte order + type + two coordinates
        assert_eq!(wkb.len(), 21);
        assert_eq!(wkb[0], 1);
        assert_eq!(u32::from_le_bytes([wkb[1], wkb[2], wkb[3], wkb[4]]), 1);
        assert_eq!(f64::from_le_bytes(wkb[5..13].try_into().unwrap()), 1.0);
        assert_eq!(f64::from_le_bytes(wkb[13..21].try_into().unwrap()), 2.0);
        assert_eq!(WkbEncoder.encoding(), GeoParquetColumnEncoding::WKB);
    }

    #[test]
    fn encode_polygon_as_wkb() {
        let polygon = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ];
        let wkb = WkbEncoder.encode(&Geometry::Polygon(polygon)).unwrap();
        assert_eq!(u32::from_le_bytes([wkb[1], wkb[2], wkb[3], wkb[4]]), 3);
    }

    #[test]
    fn type_tags() {
        let line = Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });

        assert_eq!(
            geometry_type(&Geometry::Point(Point::new(0.0, 0.0))),
            GeoParquetGeometryType::Point
        );
        assert_eq!(
            geometry_type(&Geometry::Line(line)),
            GeoParquetGeometryType::LineString
        );
        assert_eq!(
            geometry_type(&Geometry::Rect(rect)),
            GeoParquetGeometryType::Polygon
        );
        assert_eq!(
            geometry_type(&Geometry::MultiPoint(MultiPoint::new(vec![]))),
            GeoParquetGeometryType::MultiPoint
        );
        assert_eq!(
            geometry_type(&Geometry::GeometryCollection(GeometryCollection::default())),
            GeoParquetGeometryType::GeometryCollection
        );
    }

    #[test]
    fn bound_of_line_string() {
        let ls = line_string![(x: 3.0, y: -1.0), (x: -2.0, y: 5.0), (x: 0.5, y: 0.5)];
        assert_eq!(
            geometry_bound(&Geometry::LineString(ls)),
            Some(Bound::new(-2.0, -1.0, 3.0, 5.0))
        );
    }

    #[test]
    fn empty_geometry_has_no_bound() {
        assert_eq!(
            geometry_bound(&Geometry::LineString(LineString::new(vec![]))),
            None
        );
        assert_eq!(
            geometry_bound(&Geometry::MultiPoint(MultiPoint::new(vec![]))),
            None
        );
    }

    #[test]
    fn union_is_order_independent() {
        let bounds = [
            Bound::new(0.0, 0.0, 1.0, 1.0),
            Bound::new(-5.0, 2.0, -4.0, 3.0),
            Bound::new(10.0, -10.0, 11.0, 0.0),
        ];

        let forward = bounds[1..]
            .iter()
            .fold(bounds[0], |acc, b| acc.union(b));
        let backward = bounds[..2]
            .iter()
            .rev()
            .fold(bounds[2], |acc, b| acc.union(b));

        assert_eq!(forward, backward);
        assert_eq!(forward.to_bbox(), [-5.0, -10.0, 11.0, 3.0]);
    }
}
