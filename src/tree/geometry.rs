use serde::Serialize;

/// Integer device-pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate of this point along the given axis.
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Move the point by `delta` along the given axis.
    pub fn shifted(&self, axis: Axis, delta: i32) -> Point {
        match axis {
            Axis::Horizontal => Point::new(self.x.saturating_add(delta), self.y),
            Axis::Vertical => Point::new(self.x, self.y.saturating_add(delta)),
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Axis-aligned widget rectangle as reported by the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Bounds {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Bounds {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            top_left: Point::new(x1, y1),
            bottom_right: Point::new(x2, y2),
        }
    }

    /// Saturates at the `i32` range for rectangles wider than it.
    pub fn width(&self) -> i32 {
        saturate(i64::from(self.bottom_right.x) - i64::from(self.top_left.x))
    }

    pub fn height(&self) -> i32 {
        saturate(i64::from(self.bottom_right.y) - i64::from(self.top_left.y))
    }

    pub fn center(&self) -> Point {
        Point::new(
            midpoint(self.top_left.x, self.bottom_right.x),
            midpoint(self.top_left.y, self.bottom_right.y),
        )
    }

    /// Extent along an axis as `(start, end)`.
    pub fn span(&self, axis: Axis) -> (i32, i32) {
        (self.top_left.along(axis), self.bottom_right.along(axis))
    }

    pub fn length(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    /// Point containment, inclusive on every edge.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.top_left.x
            && x <= self.bottom_right.x
            && y >= self.top_left.y
            && y <= self.bottom_right.y
    }

    /// Half-open overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.top_left.x < other.bottom_right.x
            && self.bottom_right.x > other.top_left.x
            && self.top_left.y < other.bottom_right.y
            && self.bottom_right.y > other.top_left.y
    }

    /// Nearest point inside these bounds, edges included.
    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.max(self.top_left.x).min(self.bottom_right.x),
            p.y.max(self.top_left.y).min(self.bottom_right.y),
        )
    }

    /// Clamp both corners into `[0, width] x [0, height]` of `outer`.
    pub fn clamped_to(&self, outer: &Bounds) -> Bounds {
        let max_x = outer.width().max(0);
        let max_y = outer.height().max(0);
        Bounds::new(
            self.top_left.x.clamp(0, max_x),
            self.top_left.y.clamp(0, max_y),
            self.bottom_right.x.clamp(0, max_x),
            self.bottom_right.y.clamp(0, max_y),
        )
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Start plus half the extent, rounded towards the start like `x1 + w / 2`.
fn midpoint(start: i32, end: i32) -> i32 {
    let (start, end) = (i64::from(start), i64::from(end));
    saturate(start + (end - start) / 2)
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{},{}][{},{}]",
            self.top_left.x, self.top_left.y, self.bottom_right.x, self.bottom_right.y
        )
    }
}
