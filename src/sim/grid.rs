//! Broad-phase uniform grid
//!
//! Space is divided into square cells. Each body is registered in every cell
//! its bounding box overlaps, so only bodies that share a cell are paired.
//!
//! ```text
//!   +---+---+---+
//!   | A |A B|   |   A and B each span two cells and share the
//!   +---+---+---+   middle-top one, so the pair is emitted exactly
//!   |   | B |   |   once, from the first cell they share.
//!   +---+---+---+
//! ```
//!
//! Bodies whose bounds would cover more than [`MAX_CELLS_PER_BODY`] cells
//! (floors, walls) are kept aside and tested against everyone by bounds.

use std::collections::BTreeMap;

use super::body::BodyId;
use crate::consts::DEFAULT_CELL_SIZE;
use crate::geometry::Aabb;

/// Bodies covering more cells than this skip the grid
pub const MAX_CELLS_PER_BODY: i64 = 1024;

type CellKey = (i32, i32);

/// Inclusive range of cells covered by one body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: CellKey,
    max: CellKey,
}

impl CellRange {
    /// Saturates at `i64::MAX` for ranges spanning the whole cell space
    fn cell_count(&self) -> i64 {
        let width = self.max.0 as i64 - self.min.0 as i64 + 1;
        let height = self.max.1 as i64 - self.min.1 as i64 + 1;
        width.checked_mul(height).unwrap_or(i64::MAX)
    }

    fn cells(&self) -> impl Iterator<Item = CellKey> + '_ {
        (self.min.1..=self.max.1).flat_map(move |cy| (self.min.0..=self.max.0).map(move |cx| (cx, cy)))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    aabb: Aabb,
    /// `None` for oversized bodies
    range: Option<CellRange>,
}

/// Spatial grid mapping cells to the bodies overlapping them
#[derive(Debug, Clone)]
pub struct Grid {
    cell_size: f64,
    inv_cell_size: f64,
    cells: BTreeMap<CellKey, Vec<BodyId>>,
    entries: BTreeMap<BodyId, Entry>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl Grid {
    /// Grid with square cells of `cell_size` world units
    pub fn new(cell_size: f64) -> Self {
        let cell_size = sanitize_cell_size(cell_size);
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Twice the average largest extent of the given boxes
    pub fn derive_cell_size<'a>(aabbs: impl IntoIterator<Item = &'a Aabb>) -> f64 {
        let (sum, count) = aabbs
            .into_iter()
            .filter(|b| b.is_valid())
            .fold((0.0, 0usize), |(sum, count), b| {
                let e = b.extent();
                (sum + e.x.max(e.y), count + 1)
            });
        if count == 0 {
            return DEFAULT_CELL_SIZE;
        }
        sanitize_cell_size(2.0 * sum / count as f64)
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Change the cell size. Clears the grid.
    pub fn set_cell_size(&mut self, cell_size: f64) {
        self.cell_size = sanitize_cell_size(cell_size);
        self.inv_cell_size = 1.0 / self.cell_size;
        self.clear();
    }

    /// Number of bodies registered
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }

    /// Clear and re-insert every body
    pub fn rebuild(&mut self, bodies: impl IntoIterator<Item = (BodyId, Aabb)>) {
        self.clear();
        for (id, aabb) in bodies {
            self.insert(id, &aabb);
        }
    }

    #[inline]
    fn cell_of(&self, x: f64, y: f64) -> CellKey {
        // Float-to-int casts saturate
        (
            (x * self.inv_cell_size).floor() as i32,
            (y * self.inv_cell_size).floor() as i32,
        )
    }

    fn range_of(&self, aabb: &Aabb) -> CellRange {
        CellRange {
            min: self.cell_of(aabb.min.x, aabb.min.y),
            max: self.cell_of(aabb.max.x, aabb.max.y),
        }
    }

    /// Register `id` in every cell `aabb` overlaps.
    ///
    /// Re-inserting an id replaces its previous placement. Invalid boxes
    /// (NaN, inverted) are ignored.
    pub fn insert(&mut self, id: BodyId, aabb: &Aabb) {
        self.remove(id);

        if !aabb.is_valid() {
            log::debug!("Grid: skipping body {} with invalid bounds {:?}", id.0, aabb);
            return;
        }

        let range = self.range_of(aabb);
        if range.cell_count() > MAX_CELLS_PER_BODY {
            self.entries.insert(id, Entry { aabb: *aabb, range: None });
            return;
        }

        for key in range.cells() {
            let cell = self.cells.entry(key).or_default();
            // Keep cells sorted so pairs come out as (low, high)
            if let Err(pos) = cell.binary_search(&id) {
                cell.insert(pos, id);
            }
        }
        self.entries.insert(
            id,
            Entry {
                aabb: *aabb,
                range: Some(range),
            },
        );
    }

    /// Unregister `id`. Returns whether it was present.
    pub fn remove(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        if let Some(range) = entry.range {
            for key in range.cells() {
                if let Some(cell) = self.cells.get_mut(&key) {
                    if let Ok(pos) = cell.binary_search(&id) {
                        cell.remove(pos);
                    }
                    if cell.is_empty() {
                        self.cells.remove(&key);
                    }
                }
            }
        }
        true
    }

    /// True if `key` is the first cell both ranges share
    fn is_home_cell(&self, key: CellKey, a: &CellRange, b: &CellRange) -> bool {
        key == (a.min.0.max(b.min.0), a.min.1.max(b.min.1))
    }

    /// Lazily enumerate pairs whose bounds overlap.
    ///
    /// Each pair is yielded once as `(low, high)` in a deterministic order.
    pub fn candidate_pairs(&self) -> impl Iterator<Item = (BodyId, BodyId)> + '_ {
        let celled = self.cells.iter().flat_map(move |(&key, ids)| {
            (0..ids.len()).flat_map(move |i| {
                ((i + 1)..ids.len()).filter_map(move |j| {
                    let (a, b) = (ids[i], ids[j]);
                    let ea = self.entries.get(&a)?;
                    let eb = self.entries.get(&b)?;
                    let (ra, rb) = (ea.range.as_ref()?, eb.range.as_ref()?);
                    (self.is_home_cell(key, ra, rb) && ea.aabb.overlaps(&eb.aabb)).then_some((a, b))
                })
            })
        });

        let oversized = self
            .entries
            .iter()
            .filter(|(_, e)| e.range.is_none())
            .flat_map(move |(&big, big_entry)| {
                self.entries.iter().filter_map(move |(&other, entry)| {
                    if other == big {
                        return None;
                    }
                    // Two oversized bodies pair from the lower id's side only
                    if entry.range.is_none() && other < big {
                        return None;
                    }
                    if !big_entry.aabb.overlaps(&entry.aabb) {
                        return None;
                    }
                    Some(if big < other { (big, other) } else { (other, big) })
                })
            });

        celled.chain(oversized)
    }

    /// Bodies whose bounds overlap `region`, ascending and deduplicated
    pub fn query(&self, region: &Aabb) -> Vec<BodyId> {
        if !region.is_valid() {
            return Vec::new();
        }
        let range = self.range_of(region);
        let mut found: Vec<BodyId> = if range.cell_count() > MAX_CELLS_PER_BODY {
            self.entries
                .iter()
                .filter(|(_, e)| e.range.is_some())
                .map(|(&id, _)| id)
                .collect()
        } else {
            range
                .cells()
                .filter_map(|key| self.cells.get(&key))
                .flatten()
                .copied()
                .collect()
        };
        found.extend(
            self.entries
                .iter()
                .filter(|(_, e)| e.range.is_none())
                .map(|(&id, _)| id),
        );
        found.sort_unstable();
        found.dedup();
        found.retain(|id| {
            self.entries
                .get(id)
                .is_some_and(|e| e.aabb.overlaps(region))
        });
        found
    }
}

fn sanitize_cell_size(cell_size: f64) -> f64 {
    if cell_size.is_finite() && cell_size > 0.0 {
        cell_size
    } else {
        log::warn!("Invalid grid cell size {cell_size}, using {DEFAULT_CELL_SIZE}");
        DEFAULT_CELL_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use std::collections::HashSet;

    fn square(x: f64, y: f64, half: f64) -> Aabb {
        Aabb::from_center(DVec2::new(x, y), DVec2::splat(half))
    }

    #[test]
    fn test_insert_covers_every_overlapped_cell() {
        let mut grid = Grid::new(10.0);
        // Spans x in [5, 25], y in [5, 15] -> cells (0..=2, 0..=1)
        grid.insert(BodyId(1), &Aabb::new(DVec2::new(5.0, 5.0), DVec2::new(25.0, 15.0)));
        assert_eq!(grid.cell_count(), 6);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_pair_emitted_once_across_shared_cells() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(2), &Aabb::new(DVec2::new(0.0, 0.0), DVec2::new(25.0, 25.0)));
        grid.insert(BodyId(1), &Aabb::new(DVec2::new(5.0, 5.0), DVec2::new(22.0, 22.0)));
        let pairs: Vec<_> = grid.candidate_pairs().collect();
        assert_eq!(pairs, vec![(BodyId(1), BodyId(2))]);
    }

    #[test]
    fn test_far_bodies_not_paired() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(1), &square(0.0, 0.0, 2.0));
        grid.insert(BodyId(2), &square(100.0, 0.0, 2.0));
        assert_eq!(grid.candidate_pairs().count(), 0);
    }

    #[test]
    fn test_same_cell_but_disjoint_bounds_not_paired() {
        let mut grid = Grid::new(100.0);
        grid.insert(BodyId(1), &square(10.0, 10.0, 1.0));
        grid.insert(BodyId(2), &square(50.0, 50.0, 1.0));
        assert_eq!(grid.candidate_pairs().count(), 0);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(1), &square(-0.5, -0.5, 1.0));
        grid.insert(BodyId(2), &square(0.5, 0.5, 1.0));
        assert_eq!(grid.candidate_pairs().count(), 1);
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(1), &square(0.0, 0.0, 3.0));
        grid.insert(BodyId(2), &square(1.0, 0.0, 3.0));
        assert!(grid.remove(BodyId(2)));
        assert!(!grid.remove(BodyId(2)));
        assert_eq!(grid.candidate_pairs().count(), 0);

        // Moving a body replaces its old placement
        grid.insert(BodyId(1), &square(200.0, 0.0, 3.0));
        grid.insert(BodyId(2), &square(0.0, 0.0, 3.0));
        assert_eq!(grid.candidate_pairs().count(), 0);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_invalid_bounds_skipped() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(1), &Aabb::new(DVec2::new(f64::NAN, 0.0), DVec2::ONE));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_oversized_body_pairs_by_bounds() {
        let mut grid = Grid::new(1.0);
        // A floor far larger than the cell limit
        grid.insert(BodyId(1), &Aabb::new(DVec2::new(-5000.0, -1.0), DVec2::new(5000.0, 0.0)));
        grid.insert(BodyId(2), &square(10.0, 0.5, 0.5));
        grid.insert(BodyId(3), &square(10.0, 50.0, 0.5));
        grid.insert(BodyId(4), &Aabb::new(DVec2::new(-5000.0, -0.5), DVec2::new(5000.0, 0.5)));
        let pairs: HashSet<_> = grid.candidate_pairs().collect();
        let expected: HashSet<_> = [
            (BodyId(1), BodyId(2)),
            (BodyId(1), BodyId(4)),
            (BodyId(2), BodyId(4)),
        ]
        .into_iter()
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_pairs_unique_and_ordered() {
        let mut grid = Grid::new(4.0);
        for i in 0..50u32 {
            let x = (i % 7) as f64 * 1.5;
            let y = (i / 7) as f64 * 1.5;
            grid.insert(BodyId(i), &square(x, y, 1.0));
        }
        let pairs: Vec<_> = grid.candidate_pairs().collect();
        let unique: HashSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());
        assert!(pairs.iter().all(|(a, b)| a < b));
    }

    #[test]
    fn test_query_region() {
        let mut grid = Grid::new(10.0);
        grid.insert(BodyId(1), &square(0.0, 0.0, 1.0));
        grid.insert(BodyId(2), &square(30.0, 0.0, 1.0));
        grid.insert(BodyId(3), &square(5.0, 5.0, 1.0));
        let found = grid.query(&Aabb::new(DVec2::new(-2.0, -2.0), DVec2::new(6.0, 6.0)));
        assert_eq!(found, vec![BodyId(1), BodyId(3)]);
    }

    #[test]
    fn test_huge_bounds_treated_as_oversized() {
        let mut grid = Grid::new(1.0);
        // Both axes saturate the i32 cell range
        grid.insert(BodyId(1), &square(0.0, 0.0, 3.0e9));
        grid.insert(BodyId(2), &square(0.0, 0.0, 1.0));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell_count(), 9);
        let pairs: Vec<_> = grid.candidate_pairs().collect();
        assert_eq!(pairs, vec![(BodyId(1), BodyId(2))]);
        assert_eq!(grid.query(&square(5.0, 5.0, 3.0e9)), vec![BodyId(1), BodyId(2)]);
    }

    #[test]
    fn test_derive_cell_size() {
        let boxes = [square(0.0, 0.0, 1.0), square(0.0, 0.0, 3.0)];
        // extents 2 and 6 -> average 4 -> cell size 8
        assert!((Grid::derive_cell_size(&boxes) - 8.0).abs() < 1e-12);
        assert_eq!(Grid::derive_cell_size(std::iter::empty()), DEFAULT_CELL_SIZE);
    }
}
