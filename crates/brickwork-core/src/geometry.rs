use std::ops::Mul;

/// Axis-aligned rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect<f32> {
    pub const ZERO: Self = Rect::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size<f32> {
        Size::new(self.width, self.height)
    }

    /// Whether the two rectangles share any area. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect<f32>) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Whether `self` lies entirely within `other`.
    pub fn is_within(&self, other: &Rect<f32>) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.right() <= other.right()
            && self.bottom() <= other.bottom()
    }

    /// Width and height of the overlapping region, if any.
    pub fn intersection(&self, other: &Rect<f32>) -> Option<Size<f32>> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Size::new(
            self.right().min(other.right()) - self.x.max(other.x),
            self.bottom().min(other.bottom()) - self.y.max(other.y),
        ))
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

impl<T> Pos<T> {
    pub const fn new(x: T, y: T) -> Self {
        Pos { x, y }
    }
}

/// Per-edge insets, used for both margins and border widths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub const ZERO: Self = Margins::uniform(0.0);

    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Margins {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Margins::new(value, value, value, value)
    }

    #[inline]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}
