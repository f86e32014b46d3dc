//! Cursor painting: segment clipping, Bresenham line rasterization and grid
//! clipping of single points.

/// How a held button marks cells between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintMode {
    /// Only the cell under the current cursor.
    Point,
    /// Every cell on the line from the previous cursor position to the
    /// current one, so fast pointer motion leaves no gaps.
    #[default]
    Line,
}

/// Lazy Bresenham walk over integer points, both endpoints included.
///
/// Deltas and the error term are kept in `i128` so any pair of `i64`
/// endpoints is walkable without overflow.
#[derive(Clone, Debug)]
pub struct LinePoints {
    x: i64,
    y: i64,
    x1: i64,
    y1: i64,
    dx: i128,
    dy: i128,
    sx: i64,
    sy: i64,
    err: i128,
    done: bool,
}

impl Iterator for LinePoints {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<(i64, i64)> {
        if self.done {
            return None;
        }
        let point = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(point);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(point)
    }
}

/// Integer points on the segment `from -> to`, both endpoints included.
pub fn line_points(from: (i64, i64), to: (i64, i64)) -> LinePoints {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = (x1 as i128 - x0 as i128).abs();
    let dy = -(y1 as i128 - y0 as i128).abs();
    LinePoints {
        x: x0,
        y: y0,
        x1,
        y1,
        dx,
        dy,
        sx: if x0 < x1 { 1 } else { -1 },
        sy: if y0 < y1 { 1 } else { -1 },
        err: dx + dy,
        done: false,
    }
}

/// Clip the segment `from -> to` to the cell box `[0, width) x [0, height)`
/// (Liang-Barsky). `None` when the segment misses the grid entirely.
///
/// The returned endpoints lie inside the grid, so walking them costs at most
/// `max(width, height)` steps however far the inputs are.
pub fn clip_segment(
    from: (i64, i64),
    to: (i64, i64),
    width: usize,
    height: usize,
) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let dx = to.0 as f64 - x0;
    let dy = to.1 as f64 - y0;
    let x_max = (width - 1) as f64;
    let y_max = (height - 1) as f64;

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    // Unclipped ends are taken exactly; f64 rounding on huge inputs can
    // report t == 0 or 1 for an end that is really off-grid.
    let at = |t: f64| {
        if t <= 0.0 {
            return from;
        }
        if t >= 1.0 {
            return to;
        }
        let x = (x0 + t * dx).round().clamp(0.0, x_max) as i64;
        let y = (y0 + t * dy).round().clamp(0.0, y_max) as i64;
        (x, y)
    };
    let (start, end) = (at(t0), at(t1));
    clip(start, width, height)?;
    clip(end, width, height)?;
    Some((start, end))
}

/// `Some((x, y))` when the point lies inside a `width x height` grid.
#[inline]
pub fn clip(point: (i64, i64), width: usize, height: usize) -> Option<(usize, usize)> {
    let (x, y) = point;
    let x = usize::try_from(x).ok().filter(|&x| x < width)?;
    let y = usize::try_from(y).ok().filter(|&y| y < height)?;
    Some((x, y))
}
