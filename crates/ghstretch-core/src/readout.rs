//! Windowed readout statistics at a cursor location.
//!
//! Samples mean/median/max/min over an odd-sized window around an
//! image-space point, matching the semantics of the active channel mode
//! (direct channel, pooled RGB, lightness, saturation or weighted
//! luminance). The readout is taken on the un-masked transform buffer.

pub use crate::buffer::RegionStats as ReadoutStats;

use crate::buffer::{stats_of, SampleBuffer};
use crate::color::{rgb_to_hsl, rgb_to_hsv, weighted_luminance};
use crate::geometry::Rect;
use crate::models::ChannelMode;

/// Cursor readout state: point, window size and the last computed
/// sampling area and statistics.
#[derive(Debug, Clone)]
pub struct ReadoutSampler {
    point: (i64, i64),
    window: u32,
    last_area: Option<Rect>,
    last_stats: Option<ReadoutStats>,
}

impl ReadoutSampler {
    /// Window size must be odd so the window centers on the point.
    pub fn new(point: (i64, i64), window: u32) -> Result<Self, String> {
        if window == 0 || window % 2 == 0 {
            return Err(format!("Readout window size must be odd, got {}", window));
        }
        Ok(Self {
            point,
            window,
            last_area: None,
            last_stats: None,
        })
    }

    pub fn point(&self) -> (i64, i64) {
        self.point
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn set_point(&mut self, point: (i64, i64)) {
        self.point = point;
    }

    pub fn set_window(&mut self, window: u32) -> Result<(), String> {
        if window == 0 || window % 2 == 0 {
            return Err(format!("Readout window size must be odd, got {}", window));
        }
        self.window = window;
        Ok(())
    }

    /// Compute statistics over the window, channel-mode aware. Stores and
    /// returns the sampling rectangle and the `[mean, median, max, min]`
    /// tuple. An off-image window yields all-zero statistics over an
    /// empty area.
    pub fn sample(
        &mut self,
        buffer: &SampleBuffer,
        mode: ChannelMode,
        lum_coefficients: &[f64; 3],
    ) -> Result<(Rect, ReadoutStats), String> {
        let area = Rect::window(
            self.point.0,
            self.point.1,
            self.window,
            buffer.width(),
            buffer.height(),
        );
        let values = channel_values(buffer, &area, mode, lum_coefficients)?;
        let stats = stats_of(&values);
        self.last_area = Some(area);
        self.last_stats = Some(stats);
        Ok((area, stats))
    }

    /// The last computed area and statistics, if any.
    pub fn last(&self) -> Option<(Rect, ReadoutStats)> {
        match (self.last_area, self.last_stats) {
            (Some(a), Some(s)) => Some((a, s)),
            _ => None,
        }
    }
}

/// Values of the active channel semantics over a region.
fn channel_values(
    buffer: &SampleBuffer,
    area: &Rect,
    mode: ChannelMode,
    lum_coefficients: &[f64; 3],
) -> Result<Vec<f32>, String> {
    if let Some(c) = mode.direct_channel() {
        if c >= buffer.channels() {
            return Err(format!(
                "Readout channel {} not available, image has {}",
                c,
                buffer.channels()
            ));
        }
        return Ok(buffer.region_values(area, c));
    }
    if mode.is_derived() && buffer.channels() != 3 {
        return Err(format!(
            "Readout mode {:?} requires an RGB image, got {} channel(s)",
            mode,
            buffer.channels()
        ));
    }

    let area = area.clipped_to(buffer.width(), buffer.height());
    let mut values = Vec::with_capacity(
        area.width() as usize * area.height() as usize * buffer.channels() as usize,
    );
    for y in area.y0..area.y1 {
        for x in area.x0..area.x1 {
            match mode {
                ChannelMode::Rgb => {
                    for c in 0..buffer.channels() {
                        values.push(buffer.sample(x, y, c));
                    }
                }
                ChannelMode::Lightness => {
                    let (r, g, b) = (
                        buffer.sample(x, y, 0),
                        buffer.sample(x, y, 1),
                        buffer.sample(x, y, 2),
                    );
                    values.push(rgb_to_hsl(r, g, b).l);
                }
                ChannelMode::Saturation => {
                    let (r, g, b) = (
                        buffer.sample(x, y, 0),
                        buffer.sample(x, y, 1),
                        buffer.sample(x, y, 2),
                    );
                    values.push(rgb_to_hsv(r, g, b).s);
                }
                ChannelMode::Luminance => {
                    let (r, g, b) = (
                        buffer.sample(x, y, 0),
                        buffer.sample(x, y, 1),
                        buffer.sample(x, y, 2),
                    );
                    values.push(weighted_luminance(r, g, b, lum_coefficients) as f32);
                }
                _ => unreachable!("direct modes handled above"),
            }
        }
    }
    Ok(values)
}
