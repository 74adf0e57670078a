//! A uniform-grid spatial hash.
//!
//! The plane is cut into square cells of side `cell_size`; each occupied cell
//! holds the keys (and positions) of the members currently inside it. A radius
//! query visits only the cells overlapping the query disc's bounding box and
//! then applies the exact Euclidean test. With `cell_size` equal to the query
//! radius, that is the 3×3 block of cells around the query point.

use crate::position::Position;
use crate::HashMap;

type Cell = (i64, i64);

pub struct SpatialIndex<K> {
    cell_size: f64,
    cells: HashMap<Cell, Vec<(K, Position)>>,
    len: usize,
}

impl<K: Copy + PartialEq> SpatialIndex<K> {
    /// # Panics
    ///
    /// Panics if `cell_size` is not a positive finite number.
    #[must_use]
    pub fn new(cell_size: f64) -> SpatialIndex<K> {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size must be positive"
        );
        SpatialIndex {
            cell_size,
            cells: HashMap::default(),
            len: 0,
        }
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[allow(clippy::cast_possible_truncation)]
    fn coordinate(&self, value: f64) -> i64 {
        (value / self.cell_size).floor() as i64
    }

    fn cell_of(&self, position: Position) -> Cell {
        (self.coordinate(position.x), self.coordinate(position.y))
    }

    pub fn insert(&mut self, key: K, position: Position) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push((key, position));
        self.len += 1;
    }

    /// Removes `key` from the cell containing `position`. Returns `false` if it wasn't there.
    pub fn remove(&mut self, key: K, position: Position) -> bool {
        let cell = self.cell_of(position);
        let Some(members) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(index) = members.iter().position(|(member, _)| *member == key) else {
            return false;
        };
        members.swap_remove(index);
        if members.is_empty() {
            self.cells.remove(&cell);
        }
        self.len -= 1;
        true
    }

    /// Moves `key` from `from` to `to`.
    pub fn relocate(&mut self, key: K, from: Position, to: Position) {
        let old_cell = self.cell_of(from);
        let new_cell = self.cell_of(to);
        if old_cell == new_cell {
            if let Some(entry) = self
                .cells
                .get_mut(&old_cell)
                .and_then(|members| members.iter_mut().find(|(member, _)| *member == key))
            {
                entry.1 = to;
                return;
            }
        } else if self.remove(key, from) {
            self.insert(key, to);
            return;
        }
        // Not present where the caller said it was; add it at its new position.
        self.insert(key, to);
    }

    /// All members strictly closer than `radius` to `point`.
    #[must_use]
    pub fn query(&self, point: Position, radius: f64) -> Vec<K> {
        let mut found = Vec::new();
        let (x_min, x_max) = (self.coordinate(point.x - radius), self.coordinate(point.x + radius));
        let (y_min, y_max) = (self.coordinate(point.y - radius), self.coordinate(point.y + radius));
        for cx in x_min..=x_max {
            for cy in y_min..=y_max {
                let Some(members) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                found.extend(
                    members
                        .iter()
                        .filter(|(_, position)| position.distance(point) < radius)
                        .map(|(key, _)| *key),
                );
            }
        }
        found
    }

    /// All members strictly inside the open rectangle spanned by `bottom_left` and `top_right`.
    #[must_use]
    pub fn query_region(&self, bottom_left: Position, top_right: Position) -> Vec<K> {
        let inside = |p: &Position| {
            bottom_left.x < p.x && p.x < top_right.x && bottom_left.y < p.y && p.y < top_right.y
        };
        let (x_min, x_max) = (self.coordinate(bottom_left.x), self.coordinate(top_right.x));
        let (y_min, y_max) = (self.coordinate(bottom_left.y), self.coordinate(top_right.y));
        if x_max < x_min || y_max < y_min {
            return Vec::new();
        }

        #[allow(clippy::cast_sign_loss)]
        let cells_in_range = (x_max - x_min + 1) as u64 * (y_max - y_min + 1) as u64;
        if cells_in_range > self.cells.len() as u64 {
            // Cheaper to walk the occupied cells than every cell in the range.
            return self
                .cells
                .values()
                .flatten()
                .filter(|(_, position)| inside(position))
                .map(|(key, _)| *key)
                .collect();
        }

        let mut found = Vec::new();
        for cx in x_min..=x_max {
            for cy in y_min..=y_max {
                if let Some(members) = self.cells.get(&(cx, cy)) {
                    found.extend(
                        members
                            .iter()
                            .filter(|(_, position)| inside(position))
                            .map(|(key, _)| *key),
                    );
                }
            }
        }
        found
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialIndex;
    use crate::position::Position;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn sorted(mut keys: Vec<usize>) -> Vec<usize> {
        keys.sort_unstable();
        keys
    }

    #[test]
    fn three_point_scenario() {
        let mut index = SpatialIndex::new(5.0);
        index.insert(0, Position::new(0.0, 0.0));
        index.insert(1, Position::new(1.0, 0.0));
        index.insert(2, Position::new(10.0, 10.0));

        assert_eq!(sorted(index.query(Position::ORIGIN, 5.0)), vec![0, 1]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn distance_test_is_strict() {
        let mut index = SpatialIndex::new(5.0);
        index.insert(0, Position::new(5.0, 0.0));
        assert!(index.query(Position::ORIGIN, 5.0).is_empty());
    }

    #[test]
    fn negative_coordinates_use_floor() {
        let mut index = SpatialIndex::new(5.0);
        index.insert(0, Position::new(-0.5, -0.5));
        index.insert(1, Position::new(-4.9, 0.1));
        assert_eq!(
            sorted(index.query(Position::new(-1.0, 0.0), 5.0)),
            vec![0, 1]
        );
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(7);
        let radius = 5.0;
        let mut index = SpatialIndex::new(radius);
        let points: Vec<Position> = (0..2000)
            .map(|_| Position::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)))
            .collect();
        for (key, point) in points.iter().enumerate() {
            index.insert(key, *point);
        }

        for _ in 0..100 {
            let probe = Position::new(rng.random_range(-55.0..55.0), rng.random_range(-55.0..55.0));
            let expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| p.distance(probe) < radius)
                .map(|(key, _)| key)
                .collect();
            assert_eq!(sorted(index.query(probe, radius)), expected);
        }
    }

    #[test]
    fn larger_radius_than_cell() {
        let mut index = SpatialIndex::new(1.0);
        index.insert(0, Position::new(4.5, 0.0));
        index.insert(1, Position::new(6.0, 0.0));
        assert_eq!(index.query(Position::ORIGIN, 5.0), vec![0]);
    }

    #[test]
    fn remove_and_relocate() {
        let mut index = SpatialIndex::new(5.0);
        let start = Position::new(1.0, 1.0);
        index.insert(0, start);
        index.insert(1, Position::new(2.0, 2.0));

        let far = Position::new(30.0, 30.0);
        index.relocate(0, start, far);
        assert_eq!(index.query(Position::ORIGIN, 5.0), vec![1]);
        assert_eq!(index.query(far, 1.0), vec![0]);

        // Same-cell move keeps the stored position exact.
        let near_far = Position::new(31.0, 30.0);
        index.relocate(0, far, near_far);
        assert!(index.query(far, 0.5).is_empty());
        assert_eq!(index.query(near_far, 0.5), vec![0]);
        assert_eq!(index.len(), 2);

        assert!(index.remove(1, Position::new(2.0, 2.0)));
        assert!(!index.remove(1, Position::new(2.0, 2.0)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn region_query_is_open() {
        let mut index = SpatialIndex::new(5.0);
        index.insert(0, Position::new(0.0, 0.0));
        index.insert(1, Position::new(3.0, 3.0));
        index.insert(2, Position::new(12.0, 3.0));
        let bottom_left = Position::new(0.0, 0.0);
        let top_right = Position::new(10.0, 10.0);
        assert_eq!(index.query_region(bottom_left, top_right), vec![1]);

        // A huge region takes the occupied-cell path and finds the same members.
        let everything = index.query_region(Position::new(-1e9, -1e9), Position::new(1e9, 1e9));
        assert_eq!(sorted(everything), vec![0, 1, 2]);

        // An inverted region is empty.
        assert!(index.query_region(top_right, bottom_left).is_empty());
    }
}
