//! Normalized floating-point sample buffers.
//!
//! A `SampleBuffer` holds interleaved per-channel samples in a conceptual
//! [0, 1] range (values may transiently exceed it during intermediate
//! math). Buffers are row-major with 1 (mono) or 3 (RGB) channels.

use crate::geometry::Rect;

/// Interleaved row-major f32 sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<f32>,
}

/// Windowed statistics over a region of one (possibly derived) channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

impl RegionStats {
    pub(crate) fn zero() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            max: 0.0,
            min: 0.0,
        }
    }
}

impl SampleBuffer {
    /// Create a zero-filled buffer.
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![0.0; len],
        }
    }

    /// Wrap existing interleaved data. Fails if the length does not match
    /// `width * height * channels`.
    pub fn from_data(width: u32, height: u32, channels: u8, data: Vec<f32>) -> Result<Self, String> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(format!(
                "Buffer length {} does not match {}x{}x{} = {}",
                data.len(),
                width,
                height,
                channels,
                expected
            ));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn bounds(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32, channel: u8) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize + channel as usize
    }

    /// Sample at (x, y) for a channel. Out-of-range channels reuse
    /// channel 0 (single-channel masks applied to RGB targets).
    #[inline]
    pub fn sample(&self, x: u32, y: u32, channel: u8) -> f32 {
        let c = if channel < self.channels { channel } else { 0 };
        self.data[self.index(x, y, c)]
    }

    #[inline]
    pub fn set_sample(&mut self, x: u32, y: u32, channel: u8, value: f32) {
        let i = self.index(x, y, channel);
        self.data[i] = value;
    }

    /// Copy a sub-rectangle into a new buffer. The rectangle is clipped to
    /// the image bounds first.
    pub fn crop(&self, region: &Rect) -> SampleBuffer {
        let r = region.clipped_to(self.width, self.height);
        let mut out = SampleBuffer::new(r.width(), r.height(), self.channels);
        let ch = self.channels as usize;
        let row_len = r.width() as usize * ch;
        for (row, y) in (r.y0..r.y1).enumerate() {
            let src = self.index(r.x0, y, 0);
            let dst = row * row_len;
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        out
    }

    /// Resample a sub-rectangle to the given zoom factor (0 < zoom <= 1)
    /// with a box filter. zoom == 1 is a plain crop.
    pub fn resample(&self, region: &Rect, zoom: f64) -> Result<SampleBuffer, String> {
        if !(zoom > 0.0 && zoom <= 1.0) {
            return Err(format!("Resample zoom must be in (0, 1], got {}", zoom));
        }
        let r = region.clipped_to(self.width, self.height);
        if r.is_empty() {
            return Err("Cannot resample an empty region".to_string());
        }
        if zoom == 1.0 {
            return Ok(self.crop(&r));
        }

        let out_w = ((f64::from(r.width()) * zoom).round() as u32).max(1);
        let out_h = ((f64::from(r.height()) * zoom).round() as u32).max(1);
        let mut out = SampleBuffer::new(out_w, out_h, self.channels);

        let sx = f64::from(r.width()) / f64::from(out_w);
        let sy = f64::from(r.height()) / f64::from(out_h);
        let ch = self.channels;

        for oy in 0..out_h {
            let y_lo = r.y0 + (f64::from(oy) * sy) as u32;
            let y_hi = (r.y0 + ((f64::from(oy) + 1.0) * sy).ceil() as u32).min(r.y1);
            for ox in 0..out_w {
                let x_lo = r.x0 + (f64::from(ox) * sx) as u32;
                let x_hi = (r.x0 + ((f64::from(ox) + 1.0) * sx).ceil() as u32).min(r.x1);
                let count = ((y_hi - y_lo) as f64 * (x_hi - x_lo) as f64).max(1.0);
                for c in 0..ch {
                    let mut acc = 0.0f64;
                    for y in y_lo..y_hi {
                        for x in x_lo..x_hi {
                            acc += f64::from(self.data[self.index(x, y, c)]);
                        }
                    }
                    out.set_sample(ox, oy, c, (acc / count) as f32);
                }
            }
        }
        Ok(out)
    }

    /// Collect the values of one channel over a region.
    pub fn region_values(&self, region: &Rect, channel: u8) -> Vec<f32> {
        let r = region.clipped_to(self.width, self.height);
        let mut out = Vec::with_capacity(r.width() as usize * r.height() as usize);
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                out.push(self.sample(x, y, channel));
            }
        }
        out
    }

    /// Mean/median/max/min over a region of one channel. Empty regions
    /// yield all-zero statistics.
    pub fn region_stats(&self, region: &Rect, channel: u8) -> RegionStats {
        stats_of(&self.region_values(region, channel))
    }
}

/// Statistics over a flat value slice. Even-length medians average the
/// two middle samples.
pub(crate) fn stats_of(values: &[f32]) -> RegionStats {
    if values.is_empty() {
        return RegionStats::zero();
    }
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    let mut sum = 0.0f64;
    for &v in values {
        let v = f64::from(v);
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let median = if n % 2 == 1 {
        f64::from(sorted[n / 2])
    } else {
        (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    };
    RegionStats {
        mean: sum / n as f64,
        median,
        max,
        min,
    }
}
