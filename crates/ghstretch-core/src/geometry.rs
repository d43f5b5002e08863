//! Image-space rectangles and point types.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image-space pixel coordinates.
///
/// `x1`/`y1` are exclusive. An empty rectangle has zero width or height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle covering a full image of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Clip this rectangle to the bounds of an image of the given size.
    pub fn clipped_to(&self, width: u32, height: u32) -> Self {
        Self {
            x0: self.x0.min(width),
            y0: self.y0.min(height),
            x1: self.x1.min(width),
            y1: self.y1.min(height),
        }
    }

    /// Window of the given (odd) size centered at a point, clipped to the
    /// image bounds. The window spans `[c - size/2, c + size/2 + 1)`.
    pub fn window(cx: i64, cy: i64, size: u32, width: u32, height: u32) -> Self {
        let half = i64::from(size / 2);
        let x0 = (cx - half).clamp(0, i64::from(width)) as u32;
        let y0 = (cy - half).clamp(0, i64::from(height)) as u32;
        let x1 = (cx + half + 1).clamp(0, i64::from(width)) as u32;
        let y1 = (cy + half + 1).clamp(0, i64::from(height)) as u32;
        Self { x0, y0, x1, y1 }
    }
}
