//! Device-space geometry.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use numbat_common::Fx;
use serde::{Deserialize, Serialize};

/// A rectangle positioned relative to its parent primitive.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutRect {
    /// Horizontal position of the top-left corner.
    pub x: Fx,
    /// Vertical position of the top-left corner.
    pub y: Fx,
    /// Width of the rectangle.
    pub w: Fx,
    /// Height of the rectangle.
    pub h: Fx,
}

impl LayoutRect {
    /// A rectangle from its four components.
    #[must_use]
    pub const fn new(x: Fx, y: Fx, w: Fx, h: Fx) -> Self {
        Self { x, y, w, h }
    }

    /// The right edge, `x + w`.
    #[must_use]
    pub fn right(&self) -> Fx {
        self.x + self.w
    }

    /// The bottom edge, `y + h`.
    #[must_use]
    pub fn bottom(&self) -> Fx {
        self.y + self.h
    }

    /// This rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: Fx, dy: Fx) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// A natural or resolved size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub w: Fx,
    /// Height.
    pub h: Fx,
}

impl Size {
    /// A size from whole pixels.
    #[must_use]
    pub const fn from_whole(w: i32, h: i32) -> Self {
        Self {
            w: Fx::from_whole(w),
            h: Fx::from_whole(h),
        }
    }
}

/// [§ 5.1 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
///
/// Corner radii clockwise from top-left.
pub type Radii = [Fx; 4];
