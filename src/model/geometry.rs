//! Pixel dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl Dimension {
    /// The "no size declared" marker, `(0, 0)`.
    pub const UNSPECIFIED: Dimension = Dimension {
        width: 0,
        height: 0,
    };

    /// Create a new dimension.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when no size was declared.
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }

    /// True when either axis is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when both axes are at least as large as `other`'s.
    pub fn covers(&self, other: Dimension) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimension {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}
