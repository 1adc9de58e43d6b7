use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use super::survey_point::SurveyPoint;
use crate::config::Settings;
use crate::error::{Result, SurveyError};
use crate::measure::TraverseTable;
use crate::projection::{CoordinateTransformer, Datum, ProjectionMode};
use crate::utils::text;

/// Attribute a collection is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortColumn {
    Start,
    End,
    PointName,
    #[default]
    PointNumber,
}

/// Ordered survey points of one session.
///
/// Points live in an arena; the ordering is a separate list of arena slots,
/// so reordering never moves a point.
#[derive(Debug, Clone, Default)]
pub struct SurveyPointCollection {
    arena: Vec<Option<SurveyPoint>>,
    order: Vec<usize>,
    sort_column: SortColumn,
    descending: bool,
    datum: Datum,
}

impl SurveyPointCollection {
    /// Take ownership of `points`, number and name the ones that lack it, and
    /// order everything by `sort_column`.
    pub fn new(points: Vec<SurveyPoint>, sort_column: SortColumn, descending: bool) -> Self {
        let order = (0..points.len()).collect();
        let mut collection = Self {
            arena: points.into_iter().map(Some).collect(),
            order,
            sort_column,
            descending,
            datum: Datum::default(),
        };
        collection.reset_point_numbers();
        collection.reset_point_names();
        collection.sort_by_column();
        collection
    }

    /// [`new`](Self::new), with the collection and every member on the
    /// configured default datum.
    pub fn from_settings(
        points: Vec<SurveyPoint>,
        sort_column: SortColumn,
        descending: bool,
        settings: &Settings,
    ) -> Result<Self> {
        let mut collection = Self::new(points, sort_column, descending);
        collection.set_datum(&settings.default_datum)?;
        Ok(collection)
    }

    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = datum;
        self
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Change the datum of the collection and every member.
    pub fn set_datum(&mut self, datum_name: &str) -> Result<()> {
        let datum = Datum::parse(datum_name)?;
        for point in self.arena.iter_mut().flatten() {
            point.set_datum(datum_name)?;
        }
        self.datum = datum;
        Ok(())
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort_column
    }

    pub fn set_sort_column(&mut self, sort_column: SortColumn) {
        self.sort_column = sort_column;
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn set_descending(&mut self, descending: bool) {
        self.descending = descending;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SurveyPoint> {
        let slot = *self.order.get(index)?;
        self.arena[slot].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SurveyPoint> {
        let slot = *self.order.get(index)?;
        self.arena[slot].as_mut()
    }

    pub fn first(&self) -> Option<&SurveyPoint> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&SurveyPoint> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Members in order.
    pub fn iter(&self) -> impl Iterator<Item = &SurveyPoint> + '_ {
        self.order
            .iter()
            .filter_map(move |&slot| self.arena[slot].as_ref())
    }

    pub fn into_points(mut self) -> Vec<SurveyPoint> {
        self.order
            .iter()
            .filter_map(|&slot| self.arena[slot].take())
            .collect()
    }

    /// Reorder so that the member now at `i` is the one previously at `permutation[i]`.
    pub fn sort(&mut self, permutation: &[usize]) -> Result<()> {
        let n = self.len();
        let mut seen = vec![false; n];
        let valid = permutation.len() == n
            && permutation.iter().all(|&i| {
                if i >= n || seen[i] {
                    return false;
                }
                seen[i] = true;
                true
            });

        if !valid {
            return Err(SurveyError::InvalidPermutation(format!(
                "{:?} is not a permutation of 0..{}",
                permutation, n
            )));
        }

        self.order = permutation.iter().map(|&i| self.order[i]).collect();
        debug!(?permutation, "reordered collection");
        Ok(())
    }

    /// Take the member at `from` out and reinsert it at `to`.
    pub fn move_point(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(SurveyError::IndexOutOfRange { index, len });
            }
        }

        let slot = self.order.remove(from);
        self.order.insert(to, slot);
        debug!(from, to, "moved point");
        Ok(())
    }

    /// Delete and return the member at `index`.
    pub fn remove(&mut self, index: usize) -> Result<SurveyPoint> {
        let len = self.len();
        if index >= len {
            return Err(SurveyError::IndexOutOfRange { index, len });
        }

        let slot = self.order.remove(index);
        let point = self.arena[slot]
            .take()
            .ok_or(SurveyError::IndexOutOfRange { index, len })?;
        debug!(index, point = %point.describe(), "removed point");
        Ok(point)
    }

    /// Append points after the current members, keeping the existing order.
    pub fn add<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = SurveyPoint>,
    {
        let before = self.len();
        for point in points {
            self.order.push(self.arena.len());
            self.arena.push(Some(point));
        }
        debug!(added = self.len() - before, total = self.len(), "added points");
    }

    pub fn push(&mut self, point: SurveyPoint) {
        self.add(std::iter::once(point));
    }

    /// Stable sort by the collection's sort column. Members without a value
    /// for it go last in either direction.
    pub fn sort_by_column(&mut self) {
        let column = self.sort_column;
        let descending = self.descending;
        let arena = &self.arena;

        self.order.sort_by(|&a, &b| {
            let (Some(a), Some(b)) = (arena[a].as_ref(), arena[b].as_ref()) else {
                return Ordering::Equal;
            };
            compare_by(a, b, column, descending)
        });
        debug!(?column, descending, "sorted collection");
    }

    /// Give members without a point number `max + 1`, `max + 2`... in order.
    /// Numbering starts at 0 when nobody has one.
    pub fn reset_point_numbers(&mut self) {
        let mut next = self
            .iter()
            .filter_map(|p| p.point_number)
            .max()
            .map_or(0, |max| max + 1);

        for &slot in &self.order {
            if let Some(point) = self.arena[slot].as_mut() {
                if point.point_number.is_none() {
                    point.point_number = Some(next);
                    next += 1;
                }
            }
        }
    }

    /// Same as [`SurveyPointCollection::reset_point_numbers`] for point names.
    pub fn reset_point_names(&mut self) {
        let mut next = self
            .iter()
            .filter_map(|p| p.point_name)
            .max_by(|a, b| a.total_cmp(b))
            .map_or(0.0, |max| max + 1.0);

        for &slot in &self.order {
            if let Some(point) = self.arena[slot].as_mut() {
                if point.point_name.is_none() {
                    point.point_name = Some(next);
                    next += 1.0;
                }
            }
        }
    }

    pub fn set_office(&mut self, office: &str) {
        let office = text::clean_office_name(office);
        self.for_each_point(|p| p.office = Some(office.clone()));
    }

    pub fn set_branch_office(&mut self, branch_office: &str) {
        let branch_office = text::clean_branch_office_name(branch_office);
        self.for_each_point(|p| p.branch_office = Some(branch_office.clone()));
    }

    pub fn set_local_area(&mut self, local_area: &str) {
        let local_area = text::clean_local_area_name(local_area);
        self.for_each_point(|p| p.local_area = Some(local_area.clone()));
    }

    pub fn set_address(&mut self, address: &str) {
        let address = text::to_half_width(address);
        self.for_each_point(|p| p.address = Some(address.clone()));
    }

    pub fn set_project_year(&mut self, year: i32) {
        self.for_each_point(|p| p.project_year = Some(year));
    }

    pub fn set_project_name(&mut self, name: &str) {
        let name = text::to_half_width(name);
        self.for_each_point(|p| p.project_name = Some(name.clone()));
    }

    pub fn set_surveyor(&mut self, surveyor: &str) {
        self.for_each_point(|p| p.surveyor = Some(surveyor.to_string()));
    }

    pub fn set_group_name(&mut self, group: &str) {
        self.for_each_point(|p| p.group_name = Some(group.to_string()));
    }

    /// Fill every positioned member's projection cache for `mode`.
    pub fn project_all(&mut self, mode: ProjectionMode) -> Result<()> {
        let transformer = CoordinateTransformer::new();
        let datum = self.datum.name();
        for &slot in &self.order {
            if let Some(point) = self.arena[slot].as_mut() {
                if point.has_position() {
                    transformer.project_cached(point, datum, mode)?;
                }
            }
        }
        Ok(())
    }

    /// Leg table between consecutive members, closing back to the first.
    pub fn traverse(&self, slope: bool) -> Result<TraverseTable> {
        let points: Vec<&SurveyPoint> = self.iter().collect();
        TraverseTable::build(&points, self.datum, slope)
    }

    fn for_each_point<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut SurveyPoint),
    {
        for &slot in &self.order {
            if let Some(point) = self.arena[slot].as_mut() {
                f(point);
            }
        }
    }
}

fn compare_by(a: &SurveyPoint, b: &SurveyPoint, column: SortColumn, descending: bool) -> Ordering {
    match column {
        SortColumn::Start => compare_optional(a.start, b.start, descending, Ord::cmp),
        SortColumn::End => compare_optional(a.end, b.end, descending, Ord::cmp),
        SortColumn::PointName => {
            compare_optional(a.point_name, b.point_name, descending, |x, y| x.total_cmp(y))
        }
        SortColumn::PointNumber => {
            compare_optional(a.point_number, b.point_number, descending, Ord::cmp)
        }
    }
}

fn compare_optional<T, F>(a: Option<T>, b: Option<T>, descending: bool, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) if descending => cmp(&b, &a),
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
