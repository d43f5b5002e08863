//! Viewport mapping for zoom-and-pan interaction.
//!
//! Maps between the image-space selection rectangle and a scaled,
//! letterboxed display frame. The selection is never upscaled past 1:1;
//! smaller-than-frame selections are centered.

use crate::geometry::Rect;

/// A point in display coordinates.
pub type ViewPoint = (f64, f64);

/// Bidirectional affine mapping between a selection and a display frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapper {
    selection: Rect,
    frame_width: u32,
    frame_height: u32,
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
}

impl ViewportMapper {
    pub fn new(selection: Rect, frame_width: u32, frame_height: u32) -> Result<Self, String> {
        if selection.is_empty() {
            return Err("Viewport selection is empty".to_string());
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(format!(
                "Viewport frame is degenerate: {}x{}",
                frame_width, frame_height
            ));
        }
        let iw = f64::from(selection.width());
        let ih = f64::from(selection.height());
        let zoom = (f64::from(frame_width) / iw)
            .min(f64::from(frame_height) / ih)
            .min(1.0);
        let offset_x = ((f64::from(frame_width) - zoom * iw) * 0.5).max(0.0);
        let offset_y = ((f64::from(frame_height) - zoom * ih) * 0.5).max(0.0);
        Ok(Self {
            selection,
            frame_width,
            frame_height,
            zoom,
            offset_x,
            offset_y,
        })
    }

    pub fn selection(&self) -> Rect {
        self.selection
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Display rectangle actually covered by the zoomed selection
    /// (x, y, width, height).
    pub fn viewport(&self) -> (f64, f64, f64, f64) {
        (
            self.offset_x,
            self.offset_y,
            self.zoom * f64::from(self.selection.width()),
            self.zoom * f64::from(self.selection.height()),
        )
    }

    /// Map an image-space point into display coordinates.
    pub fn image_to_view(&self, x: f64, y: f64) -> ViewPoint {
        (
            (x - f64::from(self.selection.x0)) * self.zoom + self.offset_x,
            (y - f64::from(self.selection.y0)) * self.zoom + self.offset_y,
        )
    }

    /// Map a display point back into image space.
    pub fn view_to_image(&self, x: f64, y: f64) -> ViewPoint {
        (
            (x - self.offset_x) / self.zoom + f64::from(self.selection.x0),
            (y - self.offset_y) / self.zoom + f64::from(self.selection.y0),
        )
    }

    /// Map an image-space rectangle into display coordinates
    /// (x, y, width, height).
    pub fn rect_to_view(&self, rect: &Rect) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.image_to_view(f64::from(rect.x0), f64::from(rect.y0));
        let (x1, y1) = self.image_to_view(f64::from(rect.x1), f64::from(rect.y1));
        (x0, y0, x1 - x0, y1 - y0)
    }

    /// Clamp a display point to the viewport rectangle, for drag
    /// interactions that must not leave the rendered area.
    pub fn clamp_to_viewport(&self, x: f64, y: f64) -> ViewPoint {
        let (vx, vy, vw, vh) = self.viewport();
        (x.clamp(vx, vx + vw), y.clamp(vy, vy + vh))
    }

    /// Resolve a released drag rectangle (display coordinates) into a new
    /// image-space selection. Returns `None` for a zero-area drag.
    ///
    /// The drag corners are clamped to the viewport first, so the result
    /// is always inside the current selection.
    pub fn drag_to_selection(&self, start: ViewPoint, end: ViewPoint) -> Option<Rect> {
        let (sx, sy) = self.clamp_to_viewport(start.0, start.1);
        let (ex, ey) = self.clamp_to_viewport(end.0, end.1);
        let (ix0, iy0) = self.view_to_image(sx.min(ex), sy.min(ey));
        let (ix1, iy1) = self.view_to_image(sx.max(ex), sy.max(ey));
        let rect = Rect::new(
            ix0.round().max(0.0) as u32,
            iy0.round().max(0.0) as u32,
            ix1.round().max(0.0) as u32,
            iy1.round().max(0.0) as u32,
        );
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}
