use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, SurveyError};
use crate::geometry::{signed_area, Coordinate, FrameCoordinates, OutputFrame, ShapeKind};
use crate::models::{GeodeticPosition, SurveyPointCollection};
use crate::projection::{CoordinateTransformer, Projected};
use crate::utils::constants::{
    DEFAULT_BASE_SIZE, DEFAULT_FIRST_SIZE, DEFAULT_LABEL_CLEARANCE_M, DEFAULT_LABEL_STEP,
    DEFAULT_STEP_SIZE,
};

/// Which members get a label and how large their marker is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Step for [`LabelPlacer::place_configured_labels`]; 0 or 1 labels all.
    pub step: usize,
    pub label_last: bool,
    pub base_size: u32,
    pub step_size: u32,
    pub first_size: u32,
    /// Distance polygon labels are pushed outside the boundary, in metres.
    pub clearance_m: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_LABEL_STEP,
            label_last: true,
            base_size: DEFAULT_BASE_SIZE,
            step_size: DEFAULT_STEP_SIZE,
            first_size: DEFAULT_FIRST_SIZE,
            clearance_m: DEFAULT_LABEL_CLEARANCE_M,
        }
    }
}

/// A label to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub anchor: GeodeticPosition,
    pub size: u32,
    pub style_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LabelPlacer {
    config: LabelConfig,
    style_url: Option<String>,
}

impl LabelPlacer {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            config,
            style_url: None,
        }
    }

    /// Placer using the `[labels]` section of `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.labels.clone())
    }

    /// Attach a style reference (e.g. a KML `#style` id) to every label.
    pub fn with_style_url(mut self, style_url: &str) -> Self {
        self.style_url = Some(style_url.to_string());
        self
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Assign `label`, `point_size` and `label_cds` to every member.
    ///
    /// With 1-based position `k`, a member is labeled when `k % step == 0`.
    /// The first member is always labeled, the last one too with
    /// `label_last`. An unset step, 0 or 1 labels every member. Returns the
    /// number of labeled members.
    pub fn place_labels(&self, collection: &mut SurveyPointCollection, step: Option<usize>) -> usize {
        let step = step.unwrap_or(1).max(1);
        let n = collection.len();
        let mut labeled = 0;

        for index in 0..n {
            let Some(point) = collection.get_mut(index) else {
                continue;
            };
            let k = index + 1;
            let size = if k == 1 {
                Some(self.config.first_size)
            } else if k % step == 0 || (k == n && self.config.label_last) {
                Some(self.config.step_size)
            } else {
                None
            };

            match size {
                Some(size) => {
                    point.label = Some(point.display_name().unwrap_or_default());
                    point.point_size = Some(size);
                    point.label_cds = point.position();
                    labeled += 1;
                }
                None => {
                    point.label = Some(String::new());
                    point.point_size = Some(self.config.base_size);
                    point.label_cds = None;
                }
            }
        }

        debug!(step, labeled, total = n, "placed labels");
        labeled
    }

    /// [`place_labels`](Self::place_labels) with the configured step.
    pub fn place_configured_labels(&self, collection: &mut SurveyPointCollection) -> usize {
        self.place_labels(collection, Some(self.config.step))
    }

    /// Anchors for every labeled member. Point and line labels sit on the
    /// member itself; polygon labels are pushed outward from the vertex by the
    /// configured clearance. Updates `label_cds`.
    pub fn calculate_label_positions(
        &self,
        collection: &mut SurveyPointCollection,
        kind: ShapeKind,
    ) -> Result<Vec<Label>> {
        let anchors: Vec<Option<GeodeticPosition>> = match kind {
            ShapeKind::Point | ShapeKind::LineString => collection
                .iter()
                .map(|p| if p.is_labeled() { p.require_position().map(Some) } else { Ok(None) })
                .collect::<Result<_>>()?,
            ShapeKind::Polygon => self.polygon_anchors(collection)?,
        };

        let mut labels = Vec::new();
        for (index, anchor) in anchors.into_iter().enumerate() {
            let (Some(anchor), Some(point)) = (anchor, collection.get_mut(index)) else {
                continue;
            };
            point.label_cds = Some(anchor);
            labels.push(Label {
                text: point.label.clone().unwrap_or_default(),
                anchor,
                size: point.point_size.unwrap_or(self.config.step_size),
                style_url: self.style_url.clone(),
            });
        }
        Ok(labels)
    }

    fn polygon_anchors(
        &self,
        collection: &SurveyPointCollection,
    ) -> Result<Vec<Option<GeodeticPosition>>> {
        if collection.len() < ShapeKind::Polygon.min_points() {
            return Err(SurveyError::IncompleteGeometry(format!(
                "polygon labels need at least 3 points, got {}",
                collection.len()
            )));
        }

        let FrameCoordinates { key, coordinates } = collection.coordinates(OutputFrame::Utm)?;
        // +1 for counter-clockwise rings, whose outward side is to the right of each edge
        let orientation = if signed_area(&coordinates) >= 0.0 { 1.0 } else { -1.0 };
        let transformer = CoordinateTransformer::new();

        collection
            .iter()
            .enumerate()
            .map(|(i, point)| -> Result<Option<GeodeticPosition>> {
                if !point.is_labeled() {
                    return Ok(None);
                }
                let normal = outward_normal(&coordinates, i, orientation).ok_or_else(|| {
                    SurveyError::IncompleteGeometry(format!(
                        "{} has no distinct neighbours to place a label against",
                        point.describe()
                    ))
                })?;
                let (easting, northing) = coordinates[i];
                let anchor = transformer.unproject(&Projected {
                    key,
                    easting: easting + normal.0 * self.config.clearance_m,
                    northing: northing + normal.1 * self.config.clearance_m,
                });
                Ok(Some(anchor))
            })
            .collect()
    }
}

/// Unit vector bisecting the outward normals of the two edges meeting at
/// vertex `i`. Neighbours coinciding with the vertex are skipped.
fn outward_normal(ring: &[Coordinate], i: usize, orientation: f64) -> Option<Coordinate> {
    let n = ring.len();
    let vertex = ring[i];
    let differs = |j: &usize| ring[*j] != vertex;
    let prev = (1..n).map(|d| (i + n - d) % n).find(differs)?;
    let next = (1..n).map(|d| (i + d) % n).find(differs)?;

    let edge_normal = |from: Coordinate, to: Coordinate| {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = dx.hypot(dy);
        (orientation * dy / len, -orientation * dx / len)
    };
    let a = edge_normal(ring[prev], vertex);
    let b = edge_normal(vertex, ring[next]);

    let (x, y) = (a.0 + b.0, a.1 + b.1);
    let len = x.hypot(y);
    // A spike folds back on itself; fall back to the incoming edge normal
    if len < 1e-12 {
        Some(a)
    } else {
        Some((x / len, y / len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortColumn, SurveyPoint};
    use pretty_assertions::assert_eq;

    fn named(name: f64) -> SurveyPoint {
        SurveyPoint::builder()
            .group_name("A")
            .point_name(name)
            .coordinates(141.0 + name * 1e-4, 40.0)
            .build()
            .unwrap()
    }

    fn six_points() -> SurveyPointCollection {
        let points = [1.0, 2.0, 3.0, 4.0, 5.0, 1.1].into_iter().map(named).collect();
        SurveyPointCollection::new(points, SortColumn::PointName, false)
    }

    fn labels(collection: &SurveyPointCollection) -> Vec<String> {
        collection
            .iter()
            .map(|p| p.label.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_configured_labels() {
        let mut c = six_points();
        let labeled = LabelPlacer::default().place_configured_labels(&mut c);
        assert_eq!(labels(&c), ["A-1", "", "", "", "A-4", "A-5"]);
        assert_eq!(labeled, 3);

        let sizes: Vec<u32> = c.iter().map(|p| p.point_size.unwrap()).collect();
        assert_eq!(sizes, [6, 2, 2, 2, 4, 4]);
        assert_eq!(c.get(0).unwrap().label_cds, c.get(0).unwrap().position());
        assert_eq!(c.get(1).unwrap().label_cds, None);

        let mut c = six_points();
        assert_eq!(LabelPlacer::default().place_labels(&mut c, Some(5)), 3);
        assert_eq!(labels(&c), ["A-1", "", "", "", "A-4", "A-5"]);
    }

    #[test]
    fn test_unset_step_labels_everything() {
        let mut c = six_points();
        let labeled = LabelPlacer::default().place_labels(&mut c, None);
        assert_eq!(labeled, 6);
        assert_eq!(labels(&c), ["A-1", "A-1.1", "A-2", "A-3", "A-4", "A-5"]);

        let sizes: Vec<u32> = c.iter().map(|p| p.point_size.unwrap()).collect();
        assert_eq!(sizes, [6, 4, 4, 4, 4, 4]);
    }

    #[test]
    fn test_placer_from_settings() {
        let mut settings = Settings::default();
        settings.labels.step = 2;
        settings.labels.label_last = false;
        let placer = LabelPlacer::from_settings(&settings);
        assert_eq!(placer.config(), &settings.labels);

        let mut c = six_points();
        assert_eq!(placer.place_configured_labels(&mut c), 4);
        assert_eq!(labels(&c), ["A-1", "A-1.1", "", "A-3", "", "A-5"]);
    }

    #[test]
    fn test_labels_without_last() {
        let mut c = six_points();
        let placer = LabelPlacer::new(LabelConfig {
            label_last: false,
            ..Default::default()
        });
        placer.place_configured_labels(&mut c);
        assert_eq!(labels(&c), ["A-1", "", "", "", "A-4", ""]);

        placer.place_labels(&mut c, Some(2));
        assert_eq!(labels(&c), ["A-1", "A-1.1", "", "A-3", "", "A-5"]);
    }

    #[test]
    fn test_step_one_labels_everything() {
        let mut c = six_points();
        assert_eq!(LabelPlacer::default().place_labels(&mut c, Some(0)), 6);
        assert!(c.iter().all(|p| p.is_labeled()));
    }

    #[test]
    fn test_point_label_positions() {
        let mut c = six_points();
        let placer = LabelPlacer::default().with_style_url("#label");
        placer.place_configured_labels(&mut c);
        let labels = placer.calculate_label_positions(&mut c, ShapeKind::Point).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].text, "A-1");
        assert_eq!(labels[0].size, 6);
        assert_eq!(Some(labels[0].anchor), c.get(0).unwrap().position());
        assert_eq!(labels[2].style_url.as_deref(), Some("#label"));
    }

    fn square(counter_clockwise: bool) -> SurveyPointCollection {
        let mut corners = vec![(141.0, 40.0), (141.001, 40.0), (141.001, 40.001), (141.0, 40.001)];
        if !counter_clockwise {
            corners[1..].reverse();
        }
        let points = corners
            .into_iter()
            .map(|(lon, lat)| SurveyPoint::builder().coordinates(lon, lat).build().unwrap())
            .collect();
        SurveyPointCollection::new(points, SortColumn::PointNumber, false)
    }

    #[test]
    fn test_polygon_labels_point_outward() {
        for ccw in [true, false] {
            let mut c = square(ccw);
            let placer = LabelPlacer::default();
            placer.place_labels(&mut c, Some(1));
            let labels = placer.calculate_label_positions(&mut c, ShapeKind::Polygon).unwrap();
            assert_eq!(labels.len(), 4);

            for (label, point) in labels.iter().zip(c.iter()) {
                let vertex = point.position().unwrap();
                // Outward from the centre of the square
                let centre = (141.0005, 40.0005);
                let before = (vertex.longitude - centre.0).hypot(vertex.latitude - centre.1);
                let after =
                    (label.anchor.longitude - centre.0).hypot(label.anchor.latitude - centre.1);
                assert!(after > before, "ccw = {}, {:?} -> {:?}", ccw, vertex, label.anchor);
                assert_eq!(point.label_cds, Some(label.anchor));
            }

            // The south-west corner moves south-west
            let sw = c.get(0).unwrap();
            assert!(sw.label_cds.unwrap().longitude < 141.0);
            assert!(sw.label_cds.unwrap().latitude < 40.0);
        }
    }

    #[test]
    fn test_polygon_labels_skip_duplicate_vertices() {
        let mut points = square(true).into_points();
        points.push(SurveyPoint::builder().coordinates(141.0, 40.0).build().unwrap());
        let mut c = SurveyPointCollection::new(points, SortColumn::PointNumber, false);
        let placer = LabelPlacer::default();
        placer.place_labels(&mut c, Some(1));
        let labels = placer.calculate_label_positions(&mut c, ShapeKind::Polygon).unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[0].anchor, labels[4].anchor);
    }

    #[test]
    fn test_polygon_labels_need_three_points() {
        let points = vec![named(1.0), named(2.0)];
        let mut c = SurveyPointCollection::new(points, SortColumn::PointName, false);
        let placer = LabelPlacer::default();
        placer.place_labels(&mut c, None);
        assert!(matches!(
            placer.calculate_label_positions(&mut c, ShapeKind::Polygon),
            Err(SurveyError::IncompleteGeometry(_))
        ));
    }
}
