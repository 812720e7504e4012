/// A point in integer pixel space, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by another point
    pub const fn offset(self, by: Point) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }

    /// Express this point relative to `origin`
    pub const fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle defined by its top-left corner and size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// A rect at the origin covering `size`
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    pub const fn x(&self) -> i32 {
        self.origin.x
    }

    pub const fn y(&self) -> i32 {
        self.origin.y
    }

    pub const fn width(&self) -> u32 {
        self.size.width
    }

    pub const fn height(&self) -> u32 {
        self.size.height
    }

    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height as i32
    }

    /// Check if a point is inside this rectangle (right/bottom edges exclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x() && point.x < self.right() && point.y >= self.y() && point.y < self.bottom()
    }

    /// Get the intersection of this rect with another.
    ///
    /// Disjoint rects intersect in an empty rect anchored at the clamped corner,
    /// so the result can always be used as a scissor box.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let min_x = self.x().max(other.x());
        let min_y = self.y().max(other.y());
        let max_x = self.right().min(other.right()).max(min_x);
        let max_y = self.bottom().min(other.bottom()).max(min_y);

        Rect::new(min_x, min_y, (max_x - min_x) as u32, (max_y - min_y) as u32)
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect {
            origin: self.origin.offset(by),
            size: self.size,
        }
    }

    /// Corner positions as floats, in (left, top, right, bottom) order
    pub fn to_f32(&self) -> [f32; 4] {
        [
            self.x() as f32,
            self.y() as f32,
            self.right() as f32,
            self.bottom() as f32,
        ]
    }
}
