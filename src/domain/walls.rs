// Static obstacle geometry: segment walls or merged zone-grid rectangles.

use crate::domain::geometry::{Rect, Segment, closest_point_on_segment, dist};
use crate::domain::tuning::world::WorldTuning;

/// Obstacle representation; both variants answer the same queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacles {
    /// Line segments with a shared half-width.
    Segments {
        segments: Vec<Segment>,
        half_width: f32,
    },
    /// Axis-aligned rectangles merged from a zone grid.
    Rects(Vec<Rect>),
}

/// The room's wall set plus the playable bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Walls {
    pub width: f32,
    pub height: f32,
    pub obstacles: Obstacles,
    prune_margin: f32,
    passes: usize,
}

#[derive(Debug, PartialEq)]
pub enum ZoneGridError {
    Empty,
    InvalidCellSize,
    RaggedRows,
    UnknownCell(char),
}

/// Walkable/blocked grid authored per room; `#` marks a wall cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGrid {
    pub cell_size: f32,
    cells: Vec<Vec<bool>>,
}

impl ZoneGrid {
    pub fn parse(cell_size: f32, rows: &[String]) -> Result<Self, ZoneGridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ZoneGridError::InvalidCellSize);
        }
        let Some(first) = rows.first() else {
            return Err(ZoneGridError::Empty);
        };
        let cols = first.chars().count();
        if cols == 0 {
            return Err(ZoneGridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            let parsed = row
                .chars()
                .map(|c| match c {
                    '#' => Ok(true),
                    '.' | ' ' => Ok(false),
                    other => Err(ZoneGridError::UnknownCell(other)),
                })
                .collect::<Result<Vec<bool>, _>>()?;
            if parsed.len() != cols {
                return Err(ZoneGridError::RaggedRows);
            }
            cells.push(parsed);
        }

        Ok(Self { cell_size, cells })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Merges wall cells into as few rectangles as a greedy pass finds.
    ///
    /// Each row is split into horizontal runs; a run that exactly matches an
    /// open run from the row above extends that rectangle downward.
    pub fn merge_rects(&self) -> Vec<Rect> {
        // (col_start, col_end_exclusive, row_start, row_count)
        let mut open: Vec<(usize, usize, usize, usize)> = Vec::new();
        let mut done: Vec<(usize, usize, usize, usize)> = Vec::new();

        for (row_idx, row) in self.cells.iter().enumerate() {
            let mut runs = Vec::new();
            let mut col = 0;
            while col < row.len() {
                if row[col] {
                    let start = col;
                    while col < row.len() && row[col] {
                        col += 1;
                    }
                    runs.push((start, col));
                } else {
                    col += 1;
                }
            }

            let mut next_open = Vec::with_capacity(runs.len());
            for (start, end) in runs {
                if let Some(pos) = open.iter().position(|r| r.0 == start && r.1 == end) {
                    let mut rect = open.swap_remove(pos);
                    rect.3 += 1;
                    next_open.push(rect);
                } else {
                    next_open.push((start, end, row_idx, 1));
                }
            }
            done.append(&mut open);
            open = next_open;
        }
        done.append(&mut open);

        let cs = self.cell_size;
        done.into_iter()
            .map(|(start, end, row, count)| Rect {
                x: start as f32 * cs,
                y: row as f32 * cs,
                w: (end - start) as f32 * cs,
                h: count as f32 * cs,
            })
            .collect()
    }
}

impl Walls {
    pub fn new(width: f32, height: f32, obstacles: Obstacles, tuning: &WorldTuning) -> Self {
        Self {
            width,
            height,
            obstacles,
            prune_margin: tuning.wall_prune_margin,
            passes: tuning.wall_passes.max(1),
        }
    }

    /// The built-in arena: a handful of segment walls inside a square map.
    pub fn default_map(tuning: &WorldTuning) -> Self {
        let w = tuning.width;
        let h = tuning.height;
        let segments = vec![
            Segment::new(w * 0.2, h * 0.2, w * 0.4, h * 0.2),
            Segment::new(w * 0.2, h * 0.2, w * 0.2, h * 0.4),
            Segment::new(w * 0.6, h * 0.8, w * 0.8, h * 0.8),
            Segment::new(w * 0.8, h * 0.6, w * 0.8, h * 0.8),
            Segment::new(w * 0.45, h * 0.5, w * 0.55, h * 0.5),
            Segment::new(w * 0.5, h * 0.45, w * 0.5, h * 0.55),
        ];
        Self::new(
            w,
            h,
            Obstacles::Segments {
                segments,
                half_width: tuning.wall_half_width,
            },
            tuning,
        )
    }

    pub fn from_zone_grid(grid: &ZoneGrid, tuning: &WorldTuning) -> Self {
        Self::new(
            grid.cols() as f32 * grid.cell_size,
            grid.rows() as f32 * grid.cell_size,
            Obstacles::Rects(grid.merge_rects()),
            tuning,
        )
    }

    pub fn point_in_wall(&self, x: f32, y: f32) -> bool {
        match &self.obstacles {
            Obstacles::Segments {
                segments,
                half_width,
            } => segments.iter().any(|s| {
                let (cx, cy) = closest_point_on_segment(x, y, s);
                dist(x, y, cx, cy) <= *half_width
            }),
            Obstacles::Rects(rects) => rects.iter().any(|r| r.contains(x, y)),
        }
    }

    /// True when the center and four extremal points of the circle are all in walls.
    pub fn encloses_circle(&self, x: f32, y: f32, r: f32) -> bool {
        self.point_in_wall(x, y)
            && self.point_in_wall(x + r, y)
            && self.point_in_wall(x - r, y)
            && self.point_in_wall(x, y + r)
            && self.point_in_wall(x, y - r)
    }

    pub fn clamp_to_bounds(&self, x: &mut f32, y: &mut f32, r: f32) {
        let r_x = r.min(self.width / 2.0);
        let r_y = r.min(self.height / 2.0);
        *x = x.clamp(r_x, self.width - r_x);
        *y = y.clamp(r_y, self.height - r_y);
    }

    /// Pushes a circle out of every nearby obstacle; returns true if it moved.
    ///
    /// Runs up to the configured number of passes so corners formed by several
    /// walls settle without full physics integration.
    pub fn resolve_circle(&self, x: &mut f32, y: &mut f32, r: f32) -> bool {
        let mut moved = false;
        for _ in 0..self.passes {
            let pushed = match &self.obstacles {
                Obstacles::Segments {
                    segments,
                    half_width,
                } => self.resolve_segments(segments, *half_width, x, y, r),
                Obstacles::Rects(rects) => self.resolve_rects(rects, x, y, r),
            };
            if !pushed {
                break;
            }
            moved = true;
        }
        if moved {
            self.clamp_to_bounds(x, y, r);
        }
        moved
    }

    fn resolve_segments(
        &self,
        segments: &[Segment],
        half_width: f32,
        x: &mut f32,
        y: &mut f32,
        r: f32,
    ) -> bool {
        let reach = half_width + r;
        let mut pushed = false;
        for seg in segments {
            if !seg.bounds(reach + self.prune_margin).contains(*x, *y) {
                continue;
            }
            let (cx, cy) = closest_point_on_segment(*x, *y, seg);
            let dx = *x - cx;
            let dy = *y - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= reach {
                continue;
            }
            // Center on the wall's spine: push along the segment normal.
            let (nx, ny) = if d > 1e-4 {
                (dx / d, dy / d)
            } else {
                let sx = seg.x2 - seg.x1;
                let sy = seg.y2 - seg.y1;
                let len = (sx * sx + sy * sy).sqrt().max(1e-4);
                (-sy / len, sx / len)
            };
            *x = cx + nx * reach;
            *y = cy + ny * reach;
            pushed = true;
        }
        pushed
    }

    fn resolve_rects(&self, rects: &[Rect], x: &mut f32, y: &mut f32, r: f32) -> bool {
        let mut pushed = false;
        for rect in rects {
            let grown = rect.expanded(r);
            if !grown.contains(*x, *y) {
                continue;
            }
            // Shallowest axis wins, like an AABB push-out.
            let left = *x - grown.x;
            let right = grown.x + grown.w - *x;
            let top = *y - grown.y;
            let bottom = grown.y + grown.h - *y;
            let min_x = left.min(right);
            let min_y = top.min(bottom);
            if min_x < min_y {
                if left < right {
                    *x = grown.x - 0.01;
                } else {
                    *x = grown.x + grown.w + 0.01;
                }
            } else if top < bottom {
                *y = grown.y - 0.01;
            } else {
                *y = grown.y + grown.h + 0.01;
            }
            pushed = true;
        }
        pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::segment_distance;

    fn segment_walls() -> Walls {
        Walls::new(
            1000.0,
            1000.0,
            Obstacles::Segments {
                segments: vec![Segment::new(100.0, 500.0, 900.0, 500.0)],
                half_width: 25.0,
            },
            &WorldTuning::default(),
        )
    }

    fn grid(rows: &[&str]) -> ZoneGrid {
        let rows: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
        ZoneGrid::parse(100.0, &rows).expect("valid grid")
    }

    #[test]
    fn when_point_is_within_half_width_then_it_is_in_wall() {
        let walls = segment_walls();
        assert!(walls.point_in_wall(500.0, 520.0));
        assert!(!walls.point_in_wall(500.0, 530.0));
    }

    #[test]
    fn when_circle_overlaps_segment_then_it_is_pushed_clear() {
        let walls = segment_walls();
        let (mut x, mut y) = (400.0, 510.0);

        assert!(walls.resolve_circle(&mut x, &mut y, 10.0));

        let Obstacles::Segments { segments, .. } = &walls.obstacles else {
            panic!("segment walls expected");
        };
        assert!(segment_distance(x, y, &segments[0]) >= 35.0 - 1e-3);
        assert!(y > 500.0);
    }

    #[test]
    fn when_circle_sits_on_the_spine_then_it_still_leaves_the_wall() {
        let walls = segment_walls();
        let (mut x, mut y) = (400.0, 500.0);

        walls.resolve_circle(&mut x, &mut y, 10.0);

        assert!(!walls.point_in_wall(x, y));
    }

    #[test]
    fn when_grid_has_a_block_then_rows_merge_into_one_rect() {
        let g = grid(&["....", ".##.", ".##.", "...."]);
        let rects = g.merge_rects();

        assert_eq!(
            rects,
            vec![Rect {
                x: 100.0,
                y: 100.0,
                w: 200.0,
                h: 200.0
            }]
        );
    }

    #[test]
    fn when_runs_differ_between_rows_then_they_stay_separate() {
        let g = grid(&["##..", "###.", "...#"]);
        assert_eq!(g.merge_rects().len(), 3);
    }

    #[test]
    fn when_grid_is_ragged_or_unknown_then_parse_fails() {
        let ragged = vec!["##".to_string(), "#".to_string()];
        assert_eq!(ZoneGrid::parse(10.0, &ragged), Err(ZoneGridError::RaggedRows));
        let odd = vec!["#x".to_string()];
        assert_eq!(ZoneGrid::parse(10.0, &odd), Err(ZoneGridError::UnknownCell('x')));
        assert_eq!(ZoneGrid::parse(0.0, &odd), Err(ZoneGridError::InvalidCellSize));
        assert_eq!(ZoneGrid::parse(10.0, &[]), Err(ZoneGridError::Empty));
    }

    #[test]
    fn when_circle_overlaps_rect_then_it_exits_through_the_nearest_side() {
        let g = grid(&["....", ".##.", ".##.", "...."]);
        let walls = Walls::from_zone_grid(&g, &WorldTuning::default());
        let (mut x, mut y) = (110.0, 200.0);

        assert!(walls.resolve_circle(&mut x, &mut y, 10.0));

        assert!(x < 90.0, "x={x}");
        assert!(!walls.point_in_wall(x, y));
    }

    #[test]
    fn when_circle_is_fully_inside_rect_then_it_is_enclosed() {
        let g = grid(&["....", ".##.", ".##.", "...."]);
        let walls = Walls::from_zone_grid(&g, &WorldTuning::default());

        assert!(walls.encloses_circle(200.0, 200.0, 30.0));
        assert!(!walls.encloses_circle(110.0, 200.0, 30.0));
    }
}
