// Uniform-grid broad phase for pairwise mob queries.

use std::collections::HashMap;

pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, index: usize, x: f32, y: f32) {
        let key = self.cell(x, y);
        self.cells.entry(key).or_default().push(index);
    }

    /// Fills `out` with every index whose cell intersects the query square.
    /// Callers still do the exact distance test.
    pub fn query_nearby_into(&self, x: f32, y: f32, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        let (min_cx, min_cy) = self.cell(x - radius, y - radius);
        let (max_cx, max_cy) = self.cell(x + radius, y + radius);
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }
}
